//! ECDSA signing keys.

use super::{rfc6979::HmacDrbg, RecoveryId, Signature, VerifyingKey};
use crate::arithmetic::{mul, Scalar};
use crate::{Error, Result, SecretKey};
use core::fmt;
use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroize;

/// Bound on RFC 6979 candidate draws. The DRBG produces an in-range nonce
/// on the first draw except with probability below 2^-128.
const NONCE_ATTEMPTS: usize = 128;

/// ECDSA/secp256k1 signing key.
#[derive(Clone)]
pub struct SigningKey {
    secret_scalar: Scalar,
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

    /// The [`VerifyingKey`] for this signing key.
    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    /// Returns the big-endian encoding of the secret scalar.
    ///
    /// The returned buffer is key material; callers should wipe it when done.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.secret_scalar.to_bytes()
    }

    /// Signs a 32-byte message prehash deterministically (RFC 6979),
    /// producing a low-s signature.
    pub fn sign_prehash(&self, prehash: &[u8; 32]) -> Result<Signature> {
        self.sign_prehash_with_entropy(prehash, None)
            .map(|(signature, _)| signature)
    }

    /// Signs a 32-byte message prehash, also returning the recovery id.
    pub fn sign_prehash_recoverable(&self, prehash: &[u8; 32]) -> Result<(Signature, RecoveryId)> {
        self.sign_prehash_with_entropy(prehash, None)
    }

    /// Signs a 32-byte message prehash with optional extra entropy folded
    /// into the RFC 6979 nonce derivation (§3.6).
    ///
    /// With `None` this is plain deterministic signing; byte-identical
    /// signatures across runs. The extra entropy is fixed at 32 bytes for
    /// interoperability.
    pub fn sign_prehash_with_entropy(
        &self,
        prehash: &[u8; 32],
        extra_entropy: Option<&[u8; 32]>,
    ) -> Result<(Signature, RecoveryId)> {
        let z = Scalar::from_bytes_reduced(prehash);
        let mut secret_bytes = self.secret_scalar.to_bytes();
        let additional: &[u8] = extra_entropy.map(|e| e.as_slice()).unwrap_or(&[]);

        let mut drbg = HmacDrbg::new(&secret_bytes, &z.to_bytes(), additional);
        secret_bytes.zeroize();

        for _ in 0..NONCE_ATTEMPTS {
            let candidate = drbg.next_candidate();
            let k = Option::<Scalar>::from(Scalar::from_bytes(&candidate));
            if let Some(k) = k.filter(|k| !bool::from(k.is_zero())) {
                if let Some(result) = self.sign_prehashed(&k, &z) {
                    return Ok(result);
                }
            }
            drbg.reject();
        }

        Err(Error::EntropyFailure)
    }

    /// Signs a 32-byte message prehash with 32 bytes of fresh entropy from
    /// the given CSPRNG mixed into the nonce derivation.
    pub fn sign_prehash_with_rng(
        &self,
        mut rng: impl CryptoRng + RngCore,
        prehash: &[u8; 32],
    ) -> Result<(Signature, RecoveryId)> {
        let mut added_entropy = [0u8; 32];
        rng.fill_bytes(&mut added_entropy);
        let result = self.sign_prehash_with_entropy(prehash, Some(&added_entropy));
        added_entropy.zeroize();
        result
    }

    /// One signing attempt with the nonce `k`; `None` means the nonce
    /// produced a degenerate `r` or `s` and the caller should draw the next
    /// candidate.
    fn sign_prehashed(&self, k: &Scalar, z: &Scalar) -> Option<(Signature, RecoveryId)> {
        let k_inv = Option::<Scalar>::from(k.invert())?;

        // R = k×G; r is R.x lifted into the scalar field.
        let big_r = mul::mul_base(k).to_affine();
        let r_bytes = big_r.x_bytes();
        let r = Scalar::from_bytes_reduced(&r_bytes);
        if r.is_zero().into() {
            return None;
        }

        let is_x_reduced = Option::<Scalar>::from(Scalar::from_bytes(&r_bytes)).is_none();

        let s = k_inv * (*z + r * self.secret_scalar);
        if s.is_zero().into() {
            return None;
        }

        let is_r_odd = big_r.y_is_odd();
        let is_s_high = s.is_high();

        let signature = Signature { r, s }.normalize_s_ct(is_s_high);
        let recovery_id = RecoveryId::new(bool::from(is_r_odd ^ is_s_high), is_x_reduced);

        Some((signature, recovery_id))
    }
}

impl From<&SecretKey> for SigningKey {
    fn from(secret_key: &SecretKey) -> Self {
        Self {
            secret_scalar: secret_key.to_scalar(),
            verifying_key: VerifyingKey::from(secret_key.public_key()),
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
        self.secret_scalar.zeroize();
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("verifying_key", &self.verifying_key)
            .finish_non_exhaustive()
    }
}
