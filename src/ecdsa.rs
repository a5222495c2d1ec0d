//! Elliptic Curve Digital Signature Algorithm (ECDSA) over secp256k1.
//!
//! Signing is deterministic per [RFC 6979], with optional extra entropy
//! mixed into the nonce derivation, and always produces low-s ("canonical")
//! signatures. Verification is strict about low-s by default;
//! [`VerifyingKey::verify_prehash_lax`] accepts the high-s form for
//! interoperability with signatures produced elsewhere.
//!
//! Signatures carry an optional recovery id which allows the verifying key
//! to be reconstructed from a signature and the signed prehash.
//!
//! ```
//! # fn main() -> Result<(), secp256k1_core::Error> {
//! use secp256k1_core::ecdsa::{SigningKey, VerifyingKey};
//!
//! let signing_key = SigningKey::random(rand_core::OsRng)?;
//! let prehash = [0xab; 32]; // SHA-256 of the message, typically
//!
//! let signature = signing_key.sign_prehash(&prehash)?;
//! signing_key.verifying_key().verify_prehash(&prehash, &signature)?;
//! # Ok(())
//! # }
//! ```
//!
//! [RFC 6979]: https://datatracker.ietf.org/doc/html/rfc6979

mod der;
mod rfc6979;
mod signing;
mod verifying;

pub use self::{der::DerSignature, signing::SigningKey, verifying::VerifyingKey};

use crate::arithmetic::Scalar;
use crate::{encoding, Error, Result};
use core::fmt;
use subtle::{Choice, ConditionallySelectable};

/// An ECDSA/secp256k1 signature: the scalar pair `(r, s)`, both in `[1, n)`.
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct Signature {
    r: Scalar,
    s: Scalar,
}

impl Signature {
    /// Size of a compact signature in bytes.
    pub const BYTE_SIZE: usize = 64;

    /// Creates a signature from its scalar components, rejecting zeros.
    pub(crate) fn from_scalars(r: Scalar, s: Scalar) -> Result<Self> {
        if bool::from(r.is_zero() | s.is_zero()) {
            return Err(Error::InvalidSignature);
        }
        Ok(Self { r, s })
    }

    /// Parses a signature from its 64-byte compact encoding
    /// `r(32) || s(32)`, both big-endian.
    ///
    /// Components outside `[1, n)` are rejected.
    pub fn from_compact(bytes: &[u8; 64]) -> Result<Self> {
        let r_bytes: &[u8; 32] = bytes[..32].try_into().expect("32 bytes");
        let s_bytes: &[u8; 32] = bytes[32..].try_into().expect("32 bytes");

        let r = Option::<Scalar>::from(Scalar::from_bytes(r_bytes)).ok_or(Error::InvalidSignature)?;
        let s = Option::<Scalar>::from(Scalar::from_bytes(s_bytes)).ok_or(Error::InvalidSignature)?;
        Self::from_scalars(r, s)
    }

    /// Parses a compact signature from a byte slice, which must be exactly
    /// 64 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let bytes: &[u8; 64] = bytes.try_into().map_err(|_| Error::InvalidEncoding)?;
        Self::from_compact(bytes)
    }

    /// Parses a compact signature from a 128-character hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = encoding::decode_hex_array::<64>(s)?;
        Self::from_compact(&bytes)
    }

    /// Parses a signature from strict ASN.1 DER.
    pub fn from_der(bytes: &[u8]) -> Result<Self> {
        let (r, s) = der::decode(bytes)?;
        Self::from_scalars(r, s)
    }

    /// Returns the 64-byte compact encoding `r(32) || s(32)`.
    pub fn to_bytes(&self) -> [u8; 64] {
        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(&self.r.to_bytes());
        bytes[32..].copy_from_slice(&self.s.to_bytes());
        bytes
    }

    /// Returns the ASN.1 DER encoding.
    pub fn to_der(&self) -> DerSignature {
        der::encode(&self.r, &self.s)
    }

    /// The `r` component.
    pub fn r(&self) -> &Scalar {
        &self.r
    }

    /// The `s` component.
    pub fn s(&self) -> &Scalar {
        &self.s
    }

    /// Is the `s` component greater than n / 2?
    pub fn is_high(&self) -> Choice {
        self.s.is_high()
    }

    /// Returns the low-s normalized form if this signature is high-s, or
    /// `None` if it is already canonical.
    ///
    /// Both forms verify against the same message and key; canonicalizing
    /// removes that malleability.
    pub fn normalize_s(&self) -> Option<Self> {
        if self.is_high().into() {
            Some(Self {
                r: self.r,
                s: -self.s,
            })
        } else {
            None
        }
    }

    /// Conditionally negates `s` in constant time, for use during signing.
    pub(crate) fn normalize_s_ct(&self, negate: Choice) -> Self {
        Self {
            r: self.r,
            s: Scalar::conditional_select(&self.s, &-self.s, negate),
        }
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature {{ bytes: {:?} }}", self.to_bytes())
    }
}

/// Identifier used to recover the [`VerifyingKey`] from a [`Signature`].
///
/// The low bit records the parity of the y-coordinate of the nonce point R;
/// the high bit records whether `R.x` overflowed the curve order (a
/// vanishingly rare but valid case).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RecoveryId(u8);

impl RecoveryId {
    /// Maximum value of a recovery id.
    pub const MAX: u8 = 3;

    /// Creates a recovery id from its two bits.
    pub const fn new(is_y_odd: bool, is_x_reduced: bool) -> Self {
        Self((is_y_odd as u8) | ((is_x_reduced as u8) << 1))
    }

    /// Was the y-coordinate of R odd?
    pub const fn is_y_odd(self) -> bool {
        self.0 & 1 != 0
    }

    /// Did `R.x` overflow the curve order?
    pub const fn is_x_reduced(self) -> bool {
        self.0 & 2 != 0
    }

    /// The byte encoding, in the range `0..=3`.
    pub const fn to_byte(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for RecoveryId {
    type Error = Error;

    fn try_from(byte: u8) -> Result<Self> {
        if byte <= Self::MAX {
            Ok(Self(byte))
        } else {
            Err(Error::InvalidSignature)
        }
    }
}

impl From<RecoveryId> for u8 {
    fn from(id: RecoveryId) -> u8 {
        id.0
    }
}
