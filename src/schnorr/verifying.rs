//! Taproot Schnorr verifying keys.

use super::{challenge, Signature};
use crate::arithmetic::{lincomb, AffinePoint, ProjectivePoint};
use crate::{encoding, Error, PublicKey, Result};

/// Taproot Schnorr verifying key: an x-only public key with an implicit
/// even y-coordinate.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct VerifyingKey {
    inner: PublicKey,
}

impl VerifyingKey {
    /// Wraps a point known to be finite, on the curve, and even-y.
    pub(super) fn from_affine_unchecked(point: AffinePoint) -> Self {
        debug_assert!(bool::from(!point.y_is_odd()));
        Self {
            inner: PublicKey::from_affine_unchecked(point),
        }
    }

    /// Parses an x-only verifying key, lifting it to the even-y curve point.
    ///
    /// Fails with [`Error::InvalidPoint`] if `bytes` is not the x-coordinate
    /// of a curve point.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self> {
        let point =
            Option::<AffinePoint>::from(AffinePoint::lift_x(bytes)).ok_or(Error::InvalidPoint)?;
        Ok(Self {
            inner: PublicKey::from_affine_unchecked(point),
        })
    }

    /// Parses an x-only verifying key from a byte slice, which must be
    /// exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let bytes: &[u8; 32] = bytes.try_into().map_err(|_| Error::InvalidEncoding)?;
        Self::from_bytes(bytes)
    }

    /// Parses an x-only verifying key from a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = encoding::decode_hex_array::<32>(s)?;
        Self::from_bytes(&bytes)
    }

    /// The 32-byte x-only encoding of this key.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.inner.as_affine().x_bytes()
    }

    /// Borrows the underlying (even-y) public key.
    pub fn as_public_key(&self) -> &PublicKey {
        &self.inner
    }

    /// Verifies a BIP340 signature over `msg`.
    ///
    /// `msg` is hashed into the challenge as-is; callers following BIP340
    /// conventions typically pass a 32-byte digest.
    pub fn verify(&self, msg: &[u8], signature: &Signature) -> Result<()> {
        let (r, s) = (signature.r(), signature.s());

        let e = challenge(&r.to_bytes(), &self.to_bytes(), msg);

        // R = s·G − e·P.
        let big_r = lincomb(
            &ProjectivePoint::GENERATOR,
            s,
            &self.inner.to_projective(),
            &-e,
        )
        .to_affine();

        if big_r.is_identity().into()
            || big_r.y_is_odd().into()
            || big_r.x != *r
        {
            return Err(Error::VerificationFailed);
        }

        Ok(())
    }
}

impl From<VerifyingKey> for PublicKey {
    fn from(verifying_key: VerifyingKey) -> PublicKey {
        verifying_key.inner
    }
}
