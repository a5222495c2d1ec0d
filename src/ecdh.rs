//! Elliptic Curve Diffie-Hellman shared secret derivation.
//!
//! ```
//! # fn main() -> Result<(), secp256k1_core::Error> {
//! use secp256k1_core::{ecdh, SecretKey};
//!
//! let alice = SecretKey::random(rand_core::OsRng)?;
//! let bob = SecretKey::random(rand_core::OsRng)?;
//!
//! let alice_view = ecdh::diffie_hellman(&alice, &bob.public_key());
//! let bob_view = ecdh::diffie_hellman(&bob, &alice.public_key());
//! assert_eq!(
//!     alice_view.to_encoded_point(true).as_bytes(),
//!     bob_view.to_encoded_point(true).as_bytes()
//! );
//! # Ok(())
//! # }
//! ```
//!
//! The shared point is returned whole; most protocols feed its encoding
//! through a KDF rather than using the coordinates directly.

use crate::arithmetic::{AffinePoint, EncodedPoint};
use crate::{PublicKey, SecretKey};
use zeroize::Zeroize;

/// The result of Diffie-Hellman key agreement: `d·Q`, a curve point known
/// only to the two parties.
///
/// Coordinates are wiped on drop.
pub struct SharedSecret {
    point: AffinePoint,
}

impl SharedSecret {
    /// The x-coordinate of the shared point, the usual KDF input.
    pub fn x_bytes(&self) -> [u8; 32] {
        self.point.x_bytes()
    }

    /// The SEC1 encoding of the shared point (33 or 65 bytes).
    pub fn to_encoded_point(&self, compress: bool) -> EncodedPoint {
        self.point
            .to_encoded_point(compress)
            .expect("shared secrets are never the identity")
    }
}

impl Drop for SharedSecret {
    fn drop(&mut self) {
        self.point.x.zeroize();
        self.point.y.zeroize();
    }
}

/// Computes the shared secret `d·Q` from one party's secret key and the
/// other's public key.
///
/// The multiplication is constant-time in the secret scalar. The result is
/// never the identity: `Q` has order n and `d ∈ [1, n)`.
pub fn diffie_hellman(secret_key: &SecretKey, public_key: &PublicKey) -> SharedSecret {
    let point = (public_key.to_projective() * secret_key.to_scalar()).to_affine();
    SharedSecret { point }
}

#[cfg(test)]
mod tests {
    use super::diffie_hellman;
    use crate::SecretKey;

    fn key_from_byte(b: u8) -> SecretKey {
        let mut bytes = [0u8; 32];
        bytes[31] = b;
        SecretKey::from_bytes(&bytes).unwrap()
    }

    #[test]
    fn symmetry_for_small_keys() {
        let d1 = key_from_byte(1);
        let d2 = key_from_byte(2);

        let s1 = diffie_hellman(&d1, &d2.public_key());
        let s2 = diffie_hellman(&d2, &d1.public_key());

        assert_eq!(
            s1.to_encoded_point(true).as_bytes(),
            s2.to_encoded_point(true).as_bytes()
        );
        assert_eq!(
            s1.to_encoded_point(false).as_bytes(),
            s2.to_encoded_point(false).as_bytes()
        );

        // 1 · (2·G) = 2·G, so the shared point is d2's public key.
        assert_eq!(
            s1.to_encoded_point(false).as_bytes(),
            d2.public_key().to_encoded_point(false).as_bytes()
        );
    }

    #[test]
    fn symmetry_for_random_keys() {
        let d1 = SecretKey::random(rand_core::OsRng).unwrap();
        let d2 = SecretKey::random(rand_core::OsRng).unwrap();

        let s1 = diffie_hellman(&d1, &d2.public_key());
        let s2 = diffie_hellman(&d2, &d1.public_key());
        assert_eq!(s1.x_bytes(), s2.x_bytes());
    }
}
