//! Pure Rust implementation of the secp256k1 elliptic curve and the
//! signature schemes built on it.
//!
//! ## About secp256k1
//!
//! Specified in Certicom's SECG in SEC 2: Recommended Elliptic Curve Domain
//! Parameters: <https://www.secg.org/sec2-v2.pdf>
//!
//! The curve's equation is `y² = x³ + 7` over a ~256-bit prime field. It is
//! primarily notable for its use in Bitcoin and other cryptocurrencies.
//!
//! ## What this crate provides
//!
//! - Constant-time field, scalar, and group arithmetic ([`arithmetic`]),
//!   including precomputed base-point tables built lazily behind a one-time
//!   gate (front-load with [`precompute`]).
//! - ECDSA signing with deterministic RFC 6979 nonces, verification, and
//!   public key recovery ([`ecdsa`]).
//! - Taproot Schnorr signatures per BIP340 ([`schnorr`]).
//! - Diffie-Hellman shared secret derivation ([`ecdh`]).
//! - SEC1, compact, and strict-DER codecs for keys and signatures, with
//!   hex-string constructors at the boundary.
//!
//! Operations on secret material (private scalars, nonces, and their
//! intermediates) have control flow and memory access patterns independent
//! of the secrets, and secret buffers are wiped on drop.
//!
//! ```
//! # fn main() -> Result<(), secp256k1_core::Error> {
//! use secp256k1_core::{ecdsa::SigningKey, SecretKey};
//!
//! let secret_key = SecretKey::random(rand_core::OsRng)?;
//! let public_key = secret_key.public_key();
//!
//! let signing_key = SigningKey::from(&secret_key);
//! let prehash = [0u8; 32]; // SHA-256 of the message, typically
//! let signature = signing_key.sign_prehash(&prehash)?;
//!
//! use secp256k1_core::ecdsa::VerifyingKey;
//! let verifying_key = VerifyingKey::from(public_key);
//! verifying_key.verify_prehash(&prehash, &signature)?;
//! # Ok(())
//! # }
//! ```

#![no_std]
#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

#[cfg(feature = "std")]
extern crate std;

pub mod arithmetic;
pub mod ecdh;
pub mod ecdsa;
pub mod schnorr;

mod encoding;
mod error;
mod public_key;
mod secret_key;

#[cfg(test)]
mod test_vectors;

pub use crate::{
    arithmetic::{AffinePoint, EncodedPoint, FieldElement, PointTables, ProjectivePoint, Scalar},
    error::{Error, Result},
    public_key::PublicKey,
    secret_key::SecretKey,
};

/// Builds the process-wide precomputed tables for the base point, if they
/// have not been built yet.
///
/// The tables are otherwise constructed on first use (the first
/// [`SecretKey::public_key`] call, signature, or key agreement); calling
/// this up front moves that cost to a predictable place. Safe to call from
/// multiple threads.
#[cfg(feature = "std")]
pub fn precompute() {
    arithmetic::mul::force_generator_tables();
}
