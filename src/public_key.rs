//! Public keys.

use crate::arithmetic::{AffinePoint, EncodedPoint, ProjectivePoint};
use crate::{encoding, Error, Result, SecretKey};

/// A validated public key: a curve point that is never the identity.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PublicKey {
    point: AffinePoint,
}

impl PublicKey {
    /// Wraps a point known to be finite and on the curve.
    pub(crate) fn from_affine_unchecked(point: AffinePoint) -> Self {
        debug_assert!(!bool::from(point.is_identity()));
        Self { point }
    }

    /// Creates a public key from an affine point.
    ///
    /// The identity is rejected with [`Error::PointAtInfinity`] and
    /// off-curve coordinates with [`Error::InvalidPoint`].
    pub fn from_affine(point: AffinePoint) -> Result<Self> {
        if point.is_identity().into() {
            return Err(Error::PointAtInfinity);
        }
        if !bool::from(point.is_on_curve()) {
            return Err(Error::InvalidPoint);
        }
        Ok(Self { point })
    }

    /// Parses a SEC1-encoded public key (33-byte compressed or 65-byte
    /// uncompressed).
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self> {
        AffinePoint::from_sec1_bytes(bytes).map(|point| Self { point })
    }

    /// Parses a SEC1-encoded public key from a hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        let mut buf = [0u8; 65];
        let bytes = encoding::decode_hex_slice(s, &mut buf)?;
        Self::from_sec1_bytes(bytes)
    }

    /// Computes the public key for the given secret key.
    pub fn from_secret_key(secret_key: &SecretKey) -> Self {
        secret_key.public_key()
    }

    /// Borrows the inner affine point.
    pub fn as_affine(&self) -> &AffinePoint {
        &self.point
    }

    /// Converts to the projective representation for arithmetic.
    pub fn to_projective(&self) -> ProjectivePoint {
        ProjectivePoint::from(self.point)
    }

    /// Returns the SEC1 encoding of this key.
    pub fn to_encoded_point(&self, compress: bool) -> EncodedPoint {
        self.point
            .to_encoded_point(compress)
            .expect("public keys are never the identity")
    }
}

impl From<PublicKey> for AffinePoint {
    fn from(public_key: PublicKey) -> AffinePoint {
        public_key.point
    }
}

impl From<&PublicKey> for AffinePoint {
    fn from(public_key: &PublicKey) -> AffinePoint {
        public_key.point
    }
}

impl From<PublicKey> for ProjectivePoint {
    fn from(public_key: PublicKey) -> ProjectivePoint {
        public_key.to_projective()
    }
}

impl From<&PublicKey> for ProjectivePoint {
    fn from(public_key: &PublicKey) -> ProjectivePoint {
        public_key.to_projective()
    }
}

impl TryFrom<AffinePoint> for PublicKey {
    type Error = Error;

    fn try_from(point: AffinePoint) -> Result<PublicKey> {
        PublicKey::from_affine(point)
    }
}

#[cfg(test)]
mod tests {
    use super::PublicKey;
    use crate::{AffinePoint, Error, SecretKey};
    use hex_literal::hex;

    #[test]
    fn secret_key_one_yields_generator() {
        let mut one = [0u8; 32];
        one[31] = 1;
        let public_key = SecretKey::from_bytes(&one).unwrap().public_key();

        let encoded = public_key.to_encoded_point(false);
        assert_eq!(
            encoded.as_bytes(),
            &hex!(
                "0479BE667EF9DCBBAC55A06295CE870B07029BFCDB2DCE28D959F2815B16F81798"
                "483ADA7726A3C4655DA4FBFC0E1108A8FD17B448A68554199C47D08FFB10D4B8"
            )
        );
        assert_eq!(*public_key.as_affine(), AffinePoint::GENERATOR);
    }

    #[test]
    fn secret_key_two_yields_doubled_generator() {
        let mut two = [0u8; 32];
        two[31] = 2;
        let public_key = SecretKey::from_bytes(&two).unwrap().public_key();
        assert_eq!(
            public_key.as_affine().x_bytes(),
            hex!("C6047F9441ED7D6D3045406E95C07CD85C778E4B8CEF3CA7ABAC09B95C709EE5")
        );
    }

    #[test]
    fn identity_is_rejected() {
        assert_eq!(
            PublicKey::from_affine(AffinePoint::IDENTITY).unwrap_err(),
            Error::PointAtInfinity
        );
    }

    #[test]
    fn hex_round_trip() {
        let compressed = "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";
        let public_key = PublicKey::from_hex(compressed).unwrap();
        assert_eq!(*public_key.as_affine(), AffinePoint::GENERATOR);
        assert!(public_key.to_encoded_point(true).is_compressed());

        assert_eq!(
            PublicKey::from_hex("0279be6").unwrap_err(),
            Error::InvalidEncoding
        );
    }
}
