//! Taproot Schnorr signing keys.

use super::{challenge, tagged_hash, Signature, VerifyingKey, AUX_TAG, NONCE_TAG};
use crate::arithmetic::{mul, AffinePoint, Scalar};
use crate::{Error, Result, SecretKey};
use core::fmt;
use rand_core::{CryptoRng, RngCore};
use sha2::Digest;
use subtle::ConditionallySelectable;
use zeroize::Zeroize;

/// Taproot Schnorr signing key.
///
/// The secret scalar is stored pre-negated when the raw public point has an
/// odd y-coordinate, so the corresponding x-only public key always lifts to
/// an even-y point.
#[derive(Clone)]
pub struct SigningKey {
    secret_key: Scalar,
    verifying_key: VerifyingKey,
}

impl SigningKey {
    /// Parses a signing key from 32 big-endian bytes in `[1, n)`.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self> {
        SecretKey::from_bytes(bytes).map(|sk| Self::from(&sk))
    }

    /// Parses a signing key from a byte slice, which must be exactly 32
    /// bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        SecretKey::from_slice(bytes).map(|sk| Self::from(&sk))
    }

    /// Parses a signing key from a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        SecretKey::from_hex(s).map(|sk| Self::from(&sk))
    }

    /// Generates a random signing key.
    pub fn random(rng: impl CryptoRng + RngCore) -> Result<Self> {
        SecretKey::random(rng).map(|sk| Self::from(&sk))
    }

    /// The x-only [`VerifyingKey`] for this signing key.
    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    /// Returns the big-endian encoding of the (possibly negated) secret
    /// scalar.
    ///
    /// The returned buffer is key material; callers should wipe it when done.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.secret_key.to_bytes()
    }

    /// Computes a BIP340 signature over `msg` with the given auxiliary
    /// randomness.
    ///
    /// `msg` is signed as-is (BIP340 does not prehash); `aux_rand` should be
    /// fresh randomness but any fixed value is safe for the scheme.
    pub fn sign_raw(&self, msg: &[u8], aux_rand: &[u8; 32]) -> Result<Signature> {
        // t = d XOR taggedHash("BIP0340/aux", aux).
        let mut t: [u8; 32] = tagged_hash(AUX_TAG)
            .chain_update(aux_rand)
            .finalize()
            .into();
        for (a, b) in t.iter_mut().zip(self.secret_key.to_bytes().iter()) {
            *a ^= b;
        }

        let public_bytes = self.verifying_key.to_bytes();
        let rand: [u8; 32] = tagged_hash(NONCE_TAG)
            .chain_update(t)
            .chain_update(public_bytes)
            .chain_update(msg)
            .finalize()
            .into();
        t.zeroize();

        let k = Scalar::from_bytes_reduced(&rand);
        if k.is_zero().into() {
            return Err(Error::EntropyFailure);
        }

        // Negate k when R has an odd y, so x(R) always lifts back.
        let R = mul::mul_base(&k).to_affine();
        let k = Scalar::conditional_select(&k, &-k, R.y_is_odd());

        let e = challenge(&R.x_bytes(), &public_bytes, msg);
        let s = k + e * self.secret_key;
        if s.is_zero().into() {
            return Err(Error::EntropyFailure);
        }

        Ok(Signature { r: R.x, s })
    }

    /// Signs `msg` with zeroed auxiliary randomness (fully deterministic).
    pub fn sign(&self, msg: &[u8]) -> Result<Signature> {
        self.sign_raw(msg, &[0u8; 32])
    }

    /// Signs `msg` with 32 bytes of fresh auxiliary randomness from the
    /// given CSPRNG.
    pub fn sign_with_rng(&self, mut rng: impl CryptoRng + RngCore, msg: &[u8]) -> Result<Signature> {
        let mut aux_rand = [0u8; 32];
        rng.fill_bytes(&mut aux_rand);
        let result = self.sign_raw(msg, &aux_rand);
        aux_rand.zeroize();
        result
    }
}

impl From<&SecretKey> for SigningKey {
    fn from(secret_key: &SecretKey) -> Self {
        let scalar = secret_key.to_scalar();
        let point = mul::mul_base(&scalar).to_affine();

        // Flip to the even-y representative.
        let odd = point.y_is_odd();
        let secret_key = Scalar::conditional_select(&scalar, &-scalar, odd);
        let point = AffinePoint::conditional_select(&point, &-point, odd);

        Self {
            secret_key,
            verifying_key: VerifyingKey::from_affine_unchecked(point),
        }
    }
}

impl From<SecretKey> for SigningKey {
    fn from(secret_key: SecretKey) -> Self {
        Self::from(&secret_key)
    }
}

impl Drop for SigningKey {
    fn drop(&mut self) {
        self.secret_key.zeroize();
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("verifying_key", &self.verifying_key)
            .finish_non_exhaustive()
    }
}
