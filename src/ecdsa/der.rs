//! Strict ASN.1 DER codec for ECDSA signatures.
//!
//! The encoding is `SEQUENCE { INTEGER r, INTEGER s }` with minimal-length
//! integers. The decoder enforces DER canonicality: definite short-form
//! lengths, no leading zero bytes except to clear a sign bit, no negative
//! integers, no trailing data.

use crate::arithmetic::Scalar;
use crate::{Error, Result};
use core::fmt;

/// Maximum length of a DER-encoded signature: 6 bytes of framing plus two
/// 33-byte integers (32 significant bytes and a sign padding byte each).
const MAX_LEN: usize = 72;

/// An ECDSA signature in ASN.1 DER form.
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct DerSignature {
    bytes: [u8; MAX_LEN],
    len: usize,
}

impl DerSignature {
    /// Borrows the encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Length of the encoding in bytes.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.len
    }
}

impl AsRef<[u8]> for DerSignature {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Debug for DerSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DerSignature {{ bytes: {:?} }}", self.as_bytes())
    }
}

/// Writes one minimal-length INTEGER into `out`, returning the bytes used.
fn encode_integer(scalar: &Scalar, out: &mut [u8]) -> usize {
    let bytes = scalar.to_bytes();
    let skip = bytes.iter().take_while(|&&b| b == 0).count();
    let body = &bytes[skip..];
    let pad = (body.first().copied().unwrap_or(0) & 0x80 != 0) as usize;

    out[0] = 0x02;
    out[1] = (body.len() + pad) as u8;
    if pad != 0 {
        out[2] = 0x00;
    }
    out[2 + pad..2 + pad + body.len()].copy_from_slice(body);
    2 + pad + body.len()
}

/// Encodes `(r, s)` as a DER SEQUENCE.
pub(super) fn encode(r: &Scalar, s: &Scalar) -> DerSignature {
    let mut bytes = [0u8; MAX_LEN];

    let r_len = encode_integer(r, &mut bytes[2..]);
    let s_len = encode_integer(s, &mut bytes[2 + r_len..]);

    bytes[0] = 0x30;
    bytes[1] = (r_len + s_len) as u8;

    DerSignature {
        bytes,
        len: 2 + r_len + s_len,
    }
}

/// Reads one INTEGER at the front of `bytes`, returning the scalar and the
/// remaining input.
fn decode_integer(bytes: &[u8]) -> Result<(Scalar, &[u8])> {
    if bytes.len() < 3 || bytes[0] != 0x02 {
        return Err(Error::InvalidEncoding);
    }

    let len = bytes[1] as usize;
    if bytes[1] & 0x80 != 0 || len == 0 || bytes.len() < 2 + len {
        return Err(Error::InvalidEncoding);
    }

    let body = &bytes[2..2 + len];

    // Negative integers never occur in valid signatures.
    if body[0] & 0x80 != 0 {
        return Err(Error::InvalidSignature);
    }

    // A leading zero is only allowed to clear the sign bit of the next byte.
    if body[0] == 0 && (body.len() == 1 || body[1] & 0x80 == 0) {
        return Err(Error::InvalidSignature);
    }

    let digits = if body[0] == 0 { &body[1..] } else { body };
    if digits.len() > 32 {
        return Err(Error::InvalidSignature);
    }

    let mut padded = [0u8; 32];
    padded[32 - digits.len()..].copy_from_slice(digits);
    let scalar =
        Option::<Scalar>::from(Scalar::from_bytes(&padded)).ok_or(Error::InvalidSignature)?;

    Ok((scalar, &bytes[2 + len..]))
}

/// Decodes a strict-DER signature into its `(r, s)` scalars.
pub(super) fn decode(bytes: &[u8]) -> Result<(Scalar, Scalar)> {
    if bytes.len() < 8 || bytes.len() > MAX_LEN || bytes[0] != 0x30 {
        return Err(Error::InvalidEncoding);
    }

    // Definite short form only; a valid signature body never reaches 128
    // bytes.
    if bytes[1] & 0x80 != 0 || bytes[1] as usize != bytes.len() - 2 {
        return Err(Error::InvalidEncoding);
    }

    let (r, rest) = decode_integer(&bytes[2..])?;
    let (s, rest) = decode_integer(rest)?;

    if !rest.is_empty() {
        return Err(Error::InvalidEncoding);
    }

    Ok((r, s))
}
