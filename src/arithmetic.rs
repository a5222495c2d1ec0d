//! A pure-Rust implementation of group operations on secp256k1.

pub(crate) mod affine;
pub(crate) mod field;
pub(crate) mod mul;
pub(crate) mod projective;
pub(crate) mod scalar;
pub(crate) mod util;

pub use affine::{AffinePoint, EncodedPoint};
pub use field::FieldElement;
pub use mul::{lincomb, PointTables};
pub use projective::ProjectivePoint;
pub use scalar::Scalar;

/// b = 7 in the curve equation y² = x³ + b, as a single limb for the cheap
/// `mul_single` path in the point formulas.
const CURVE_EQUATION_B_SINGLE: u32 = 7;

/// b = 7 as a field element.
pub(crate) const CURVE_EQUATION_B: FieldElement =
    FieldElement::from_u64(CURVE_EQUATION_B_SINGLE as u64);
