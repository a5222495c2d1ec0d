//! Deterministic nonce generation per [RFC 6979], using HMAC-SHA-256.
//!
//! [RFC 6979]: https://datatracker.ietf.org/doc/html/rfc6979

use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroize;

type HmacSha256 = Hmac<Sha256>;

fn hmac(key: &[u8; 32], chunks: &[&[u8]]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC takes keys of any length");
    for chunk in chunks {
        mac.update(chunk);
    }
    mac.finalize().into_bytes().into()
}

/// The HMAC-DRBG state (K, V) from RFC 6979 §3.2.
///
/// Candidates are drawn with [`HmacDrbg::next_candidate`]; when one falls
/// outside `[1, n)` or produces a degenerate signature, the caller mixes in
/// a rejection with [`HmacDrbg::reject`] and draws again.
pub(super) struct HmacDrbg {
    k: [u8; 32],
    v: [u8; 32],
}

impl HmacDrbg {
    /// Seeds the DRBG with the secret key bytes, the message representative
    /// `int2octets(bits2int(h) mod n)`, and optional extra entropy
    /// (RFC 6979 §3.6).
    pub fn new(secret: &[u8; 32], message: &[u8; 32], additional: &[u8]) -> Self {
        let mut k = [0x00u8; 32];
        let mut v = [0x01u8; 32];

        k = hmac(&k, &[&v, &[0x00], secret, message, additional]);
        v = hmac(&k, &[&v]);
        k = hmac(&k, &[&v, &[0x01], secret, message, additional]);
        v = hmac(&k, &[&v]);

        Self { k, v }
    }

    /// Produces the next 32-byte nonce candidate.
    pub fn next_candidate(&mut self) -> [u8; 32] {
        self.v = hmac(&self.k, &[&self.v]);
        self.v
    }

    /// Updates the state after a rejected candidate.
    pub fn reject(&mut self) {
        self.k = hmac(&self.k, &[&self.v, &[0x00]]);
        self.v = hmac(&self.k, &[&self.v]);
    }
}

impl Drop for HmacDrbg {
    fn drop(&mut self) {
        self.k.zeroize();
        self.v.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::HmacDrbg;
    use crate::arithmetic::Scalar;
    use hex_literal::hex;
    use sha2::{Digest, Sha256};

    /// Derives k the way signing does: reduce the prehash modulo n, seed the
    /// DRBG, and take the first in-range candidate.
    fn derive_k(secret: &[u8; 32], msg: &[u8]) -> [u8; 32] {
        let prehash: [u8; 32] = Sha256::digest(msg).into();
        let z = Scalar::from_bytes_reduced(&prehash);
        let mut drbg = HmacDrbg::new(secret, &z.to_bytes(), &[]);
        loop {
            let candidate = drbg.next_candidate();
            let scalar = Option::<Scalar>::from(Scalar::from_bytes(&candidate));
            match scalar {
                Some(k) if !bool::from(k.is_zero()) => return candidate,
                _ => drbg.reject(),
            }
        }
    }

    /// The widely used secp256k1/SHA-256 transplant of the RFC 6979 A.2.5
    /// test key.
    const SECRET: [u8; 32] =
        hex!("C9AFA9D845BA75166B5C215767B1D6934E50C3DB36E89B127B8A622B120F6721");

    #[test]
    fn nonce_for_sample() {
        assert_eq!(
            derive_k(&SECRET, b"sample"),
            hex!("A6E3C57DD01ABE90086538398355DD4C3B17AA873382B0F24D6129493D8AAD60")
        );
    }

    #[test]
    fn nonce_for_test() {
        assert_eq!(
            derive_k(&SECRET, b"test"),
            hex!("D16B6AE827F17175E040871A1C7EC3500192C4C92677336EC2537ACAEE0008E0")
        );
    }

    #[test]
    fn extra_entropy_changes_the_nonce() {
        let prehash: [u8; 32] = Sha256::digest(b"sample").into();
        let z = Scalar::from_bytes_reduced(&prehash).to_bytes();

        let plain = HmacDrbg::new(&SECRET, &z, &[]).next_candidate();
        let mixed = HmacDrbg::new(&SECRET, &z, &[0xaa; 32]).next_candidate();
        assert_ne!(plain, mixed);
    }
}
