//! Error types.

use core::fmt;

/// Result type with this crate's [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

/// secp256k1 errors.
///
/// Verification APIs report a failed mathematical check as
/// [`Error::VerificationFailed`]; every other variant describes malformed
/// input and is raised before any curve arithmetic runs.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Malformed hex string, wrong byte length, or invalid DER framing.
    InvalidEncoding,

    /// Secret scalar outside the range `[1, n)`.
    InvalidPrivateKey,

    /// Point is not on the curve, has no square-root lift, or is a
    /// disallowed identity.
    InvalidPoint,

    /// Signature component out of range, or non-canonical where canonical
    /// form is required (high-s under strict verification, non-minimal DER,
    /// Schnorr `r ≥ p` or `s ≥ n`).
    InvalidSignature,

    /// Well-formed inputs for which the verification equation does not hold.
    VerificationFailed,

    /// Base field input not fully reduced modulo `p`.
    FieldOverflow,

    /// Scalar input not fully reduced modulo `n` where canonical form is
    /// required.
    ScalarOverflow,

    /// The point at infinity was encountered where a finite point is
    /// required (e.g. when serializing).
    PointAtInfinity,

    /// The RNG or hashed input material could not produce a valid secret
    /// scalar.
    EntropyFailure,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Error::InvalidEncoding => "invalid encoding",
            Error::InvalidPrivateKey => "private key out of range",
            Error::InvalidPoint => "invalid curve point",
            Error::InvalidSignature => "invalid signature",
            Error::VerificationFailed => "signature verification failed",
            Error::FieldOverflow => "field element exceeds the field modulus",
            Error::ScalarOverflow => "scalar exceeds the group order",
            Error::PointAtInfinity => "unexpected point at infinity",
            Error::EntropyFailure => "could not derive a valid secret scalar",
        })
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
