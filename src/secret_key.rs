//! Secret keys.

use crate::arithmetic::scalar::{Scalar, WideScalar};
use crate::{encoding, Error, PublicKey, Result};
use core::fmt;
use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroize;

/// Number of RNG draws attempted before concluding the RNG is broken.
///
/// Rejection sampling retries with probability below 2^-128 per draw, so a
/// single retry already signals something unusual.
const RANDOM_KEY_ATTEMPTS: usize = 64;

/// A secret scalar in the range `[1, n)`.
///
/// The inner scalar is wiped when the key is dropped.
#[derive(Clone)]
pub struct SecretKey {
    scalar: Scalar,
}

impl SecretKey {
    /// Parses a secret key from 32 big-endian bytes.
    ///
    /// Values outside `[1, n)` are rejected with
    /// [`Error::InvalidPrivateKey`].
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self> {
        let scalar =
            Option::<Scalar>::from(Scalar::from_bytes(bytes)).ok_or(Error::InvalidPrivateKey)?;

        if scalar.is_zero().into() {
            return Err(Error::InvalidPrivateKey);
        }

        Ok(Self { scalar })
    }

    /// Parses a secret key from a byte slice, which must be exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let bytes: &[u8; 32] = bytes.try_into().map_err(|_| Error::InvalidEncoding)?;
        Self::from_bytes(bytes)
    }

    /// Parses a secret key from a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        let mut bytes = encoding::decode_hex_array::<32>(s)?;
        let result = Self::from_bytes(&bytes);
        bytes.zeroize();
        result
    }

    /// Generates a random secret key by rejection sampling from the given
    /// CSPRNG, which keeps the distribution uniform.
    pub fn random(mut rng: impl CryptoRng + RngCore) -> Result<Self> {
        let mut bytes = [0u8; 32];

        for _ in 0..RANDOM_KEY_ATTEMPTS {
            rng.fill_bytes(&mut bytes);
            let result = Self::from_bytes(&bytes);
            bytes.zeroize();
            if let Ok(key) = result {
                return Ok(key);
            }
        }

        Err(Error::EntropyFailure)
    }

    /// Derives a secret key from 40 to 1024 bytes of hashed material, e.g.
    /// the output of a KDF.
    ///
    /// The material is interpreted as a big-endian integer and mapped to
    /// `(value mod (n - 1)) + 1`, which biases the result away from zero
    /// while keeping it in range.
    pub fn from_hashed_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 40 || bytes.len() > 1024 {
            return Err(Error::EntropyFailure);
        }

        // Horner fold over 32-byte chunks: acc = acc * 2^256 + chunk,
        // reduced modulo n - 1 at each step. The first chunk is left-padded
        // so every step works on full chunks.
        let mut acc = Scalar::ZERO;
        let first_len = bytes.len() % 32;
        let mut offset = 0;

        if first_len != 0 {
            let mut buf = [0u8; 64];
            buf[64 - first_len..].copy_from_slice(&bytes[..first_len]);
            acc = WideScalar::from_bytes(&buf).reduce_order_minus_one();
            offset = first_len;
        }

        while offset < bytes.len() {
            let mut buf = [0u8; 64];
            buf[..32].copy_from_slice(&acc.to_bytes());
            buf[32..].copy_from_slice(&bytes[offset..offset + 32]);
            acc = WideScalar::from_bytes(&buf).reduce_order_minus_one();
            offset += 32;
        }

        Ok(Self {
            scalar: acc + Scalar::ONE,
        })
    }

    /// Returns the big-endian encoding of this key.
    ///
    /// The returned buffer is key material; callers should wipe it when done.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.scalar.to_bytes()
    }

    /// Computes the public key corresponding to this secret key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_affine_unchecked(crate::arithmetic::mul::mul_base(&self.scalar).to_affine())
    }

    /// Borrows the secret scalar.
    pub(crate) fn to_scalar(&self) -> Scalar {
        self.scalar
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.scalar.zeroize();
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Key material stays out of debug output.
        f.write_str("SecretKey { ... }")
    }
}
