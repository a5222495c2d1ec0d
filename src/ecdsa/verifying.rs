//! ECDSA verification and public key recovery.

use super::{RecoveryId, Signature};
use crate::arithmetic::{lincomb, AffinePoint, EncodedPoint, ProjectivePoint, Scalar};
use crate::{Error, PublicKey, Result};
use subtle::Choice;

/// Big-endian bytes of the curve order n.
const ORDER_BYTES: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xfe, 0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b, 0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36,
    0x41, 0x41,
];

/// ECDSA/secp256k1 verifying key (i.e. public key).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct VerifyingKey {
    inner: PublicKey,
}

impl VerifyingKey {
    /// Parses a verifying key from SEC1-encoded bytes.
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self> {
        PublicKey::from_sec1_bytes(bytes).map(|inner| Self { inner })
    }

    /// Parses a SEC1-encoded verifying key from a hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        PublicKey::from_hex(s).map(|inner| Self { inner })
    }

    /// Borrows the inner public key.
    pub fn as_public_key(&self) -> &PublicKey {
        &self.inner
    }

    /// Returns the SEC1 encoding of this key.
    pub fn to_encoded_point(&self, compress: bool) -> EncodedPoint {
        self.inner.to_encoded_point(compress)
    }

    /// Verifies an ECDSA signature over a 32-byte message prehash.
    ///
    /// High-s signatures are rejected with [`Error::InvalidSignature`];
    /// a failed mathematical check yields [`Error::VerificationFailed`].
    pub fn verify_prehash(&self, prehash: &[u8; 32], signature: &Signature) -> Result<()> {
        if signature.is_high().into() {
            return Err(Error::InvalidSignature);
        }
        self.verify_prehash_lax(prehash, signature)
    }

    /// Verifies a signature without the low-s requirement, for
    /// interoperability with signers that do not canonicalize.
    pub fn verify_prehash_lax(&self, prehash: &[u8; 32], signature: &Signature) -> Result<()> {
        let z = Scalar::from_bytes_reduced(prehash);
        let r = signature.r();
        let s = signature.s();

        let s_inv = Option::<Scalar>::from(s.invert()).ok_or(Error::InvalidSignature)?;
        let u1 = z * &s_inv;
        let u2 = *r * s_inv;

        let big_r = lincomb(
            &ProjectivePoint::GENERATOR,
            &u1,
            &self.inner.to_projective(),
            &u2,
        )
        .to_affine();

        if big_r.is_identity().into() {
            return Err(Error::VerificationFailed);
        }

        if Scalar::from_bytes_reduced(&big_r.x_bytes()) == *r {
            Ok(())
        } else {
            Err(Error::VerificationFailed)
        }
    }

    /// Recovers the verifying key from a signature, the signed prehash, and
    /// the recovery id produced at signing time.
    pub fn recover_from_prehash(
        prehash: &[u8; 32],
        signature: &Signature,
        recovery_id: RecoveryId,
    ) -> Result<Self> {
        let r = signature.r();
        let s = signature.s();
        let z = Scalar::from_bytes_reduced(prehash);

        // Reconstruct R from r and the recovery bits; when the x-reduced bit
        // is set the original x-coordinate was r + n.
        let r_bytes = if recovery_id.is_x_reduced() {
            add_order(&r.to_bytes()).ok_or(Error::InvalidSignature)?
        } else {
            r.to_bytes()
        };

        let big_r = Option::<AffinePoint>::from(AffinePoint::decompress(
            &r_bytes,
            Choice::from(recovery_id.is_y_odd() as u8),
        ))
        .ok_or(Error::InvalidPoint)?;

        // Q = r⁻¹·(s·R − z·G).
        let r_inv = Option::<Scalar>::from(r.invert()).ok_or(Error::InvalidSignature)?;
        let u1 = -(r_inv * z);
        let u2 = r_inv * *s;
        let public_point = lincomb(
            &ProjectivePoint::GENERATOR,
            &u1,
            &ProjectivePoint::from(big_r),
            &u2,
        )
        .to_affine();

        PublicKey::from_affine(public_point).map(|inner| Self { inner })
    }
}

impl RecoveryId {
    /// Finds the recovery id for a signature known to have been produced by
    /// the given key, by trying each id in turn.
    pub fn trial_recovery_from_prehash(
        verifying_key: &VerifyingKey,
        prehash: &[u8; 32],
        signature: &Signature,
    ) -> Result<Self> {
        for byte in 0..=Self::MAX {
            let id = RecoveryId::try_from(byte)?;
            if let Ok(recovered) = VerifyingKey::recover_from_prehash(prehash, signature, id) {
                if recovered == *verifying_key {
                    return Ok(id);
                }
            }
        }
        Err(Error::VerificationFailed)
    }
}

impl From<PublicKey> for VerifyingKey {
    fn from(inner: PublicKey) -> Self {
        Self { inner }
    }
}

impl From<VerifyingKey> for PublicKey {
    fn from(verifying_key: VerifyingKey) -> PublicKey {
        verifying_key.inner
    }
}

/// Big-endian `bytes + n`, or `None` when the sum overflows 256 bits.
fn add_order(bytes: &[u8; 32]) -> Option<[u8; 32]> {
    let mut out = [0u8; 32];
    let mut carry = 0u16;
    for i in (0..32).rev() {
        let sum = bytes[i] as u16 + ORDER_BYTES[i] as u16 + carry;
        out[i] = sum as u8;
        carry = sum >> 8;
    }
    (carry == 0).then_some(out)
}
