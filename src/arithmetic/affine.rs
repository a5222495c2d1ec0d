//! Affine points.

#![allow(clippy::op_ref)]

use super::{FieldElement, ProjectivePoint, Scalar, CURVE_EQUATION_B};
use crate::{Error, Result};
use core::ops::{Mul, Neg};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};

/// A SEC1-encoded point: 1 prefix byte plus one or two coordinates.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EncodedPoint {
    bytes: [u8; 65],
    len: usize,
}

impl EncodedPoint {
    /// Borrows the encoded bytes (33 or 65 of them).
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Length of the encoding in bytes.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Was this point compressed?
    pub fn is_compressed(&self) -> bool {
        self.len == 33
    }
}

impl AsRef<[u8]> for EncodedPoint {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// A point on the secp256k1 curve in affine coordinates, or the point at
/// infinity.
///
/// The identity is a tagged state rather than a magic coordinate pair; it has
/// no affine coordinates and no SEC1 encoding.
#[derive(Clone, Copy, Debug)]
pub struct AffinePoint {
    /// x-coordinate.
    pub(crate) x: FieldElement,

    /// y-coordinate.
    pub(crate) y: FieldElement,

    /// Is this the point at infinity? 0 = no, 1 = yes.
    ///
    /// Stands in for a [`Choice`] so the `IDENTITY` and `GENERATOR`
    /// constructors can be `const`.
    pub(super) infinity: u8,
}

impl AffinePoint {
    /// Additive identity of the group: the point at infinity.
    pub const IDENTITY: Self = Self {
        x: FieldElement::ZERO,
        y: FieldElement::ZERO,
        infinity: 1,
    };

    /// Base point of secp256k1.
    ///
    /// ```text
    /// Gₓ = 79be667e f9dcbbac 55a06295 ce870b07 029bfcdb 2dce28d9 59f2815b 16f81798
    /// Gᵧ = 483ada77 26a3c465 5da4fbfc 0e1108a8 fd17b448 a6855419 9c47d08f fb10d4b8
    /// ```
    pub const GENERATOR: Self = Self {
        x: FieldElement::from_bytes_unchecked(&[
            0x79, 0xbe, 0x66, 0x7e, 0xf9, 0xdc, 0xbb, 0xac, 0x55, 0xa0, 0x62, 0x95, 0xce, 0x87,
            0x0b, 0x07, 0x02, 0x9b, 0xfc, 0xdb, 0x2d, 0xce, 0x28, 0xd9, 0x59, 0xf2, 0x81, 0x5b,
            0x16, 0xf8, 0x17, 0x98,
        ]),
        y: FieldElement::from_bytes_unchecked(&[
            0x48, 0x3a, 0xda, 0x77, 0x26, 0xa3, 0xc4, 0x65, 0x5d, 0xa4, 0xfb, 0xfc, 0x0e, 0x11,
            0x08, 0xa8, 0xfd, 0x17, 0xb4, 0x48, 0xa6, 0x85, 0x54, 0x19, 0x9c, 0x47, 0xd0, 0x8f,
            0xfb, 0x10, 0xd4, 0xb8,
        ]),
        infinity: 0,
    };

    /// Creates a point from the given coordinates, which must satisfy the
    /// curve equation.
    pub(crate) const fn new(x: FieldElement, y: FieldElement) -> Self {
        Self { x, y, infinity: 0 }
    }

    /// Is this the point at infinity?
    pub fn is_identity(&self) -> Choice {
        Choice::from(self.infinity)
    }

    /// Big-endian bytes of the x-coordinate.
    pub fn x_bytes(&self) -> [u8; 32] {
        self.x.to_bytes()
    }

    /// Is the y-coordinate odd?
    pub fn y_is_odd(&self) -> Choice {
        self.y.is_odd()
    }

    /// Checks that a non-identity point satisfies the curve equation
    /// y² = x³ + 7. The identity is valid by definition.
    pub fn is_on_curve(&self) -> Choice {
        let lhs = (self.y * &self.y).negate(1);
        let rhs = self.x * &self.x * &self.x + &CURVE_EQUATION_B;
        self.is_identity() | (lhs + &rhs).normalizes_to_zero()
    }

    /// Decompresses a point from an x-coordinate and y parity.
    ///
    /// Computes y² = x³ + 7 and takes the root matching `y_is_odd`; fails if
    /// x is out of range or x³ + 7 is a non-residue.
    pub fn decompress(x_bytes: &[u8; 32], y_is_odd: Choice) -> CtOption<Self> {
        FieldElement::from_bytes(x_bytes).and_then(|x| {
            let alpha = (x * &x * &x) + &CURVE_EQUATION_B;
            let beta = alpha.sqrt();

            beta.map(|beta| {
                let beta = beta.normalize();
                let y = FieldElement::conditional_select(
                    &beta.negate(1),
                    &beta,
                    beta.is_odd().ct_eq(&y_is_odd),
                );

                Self::new(x, y.normalize())
            })
        })
    }

    /// Lifts an x-only (BIP340) public key to the curve point with even y.
    pub fn lift_x(x_bytes: &[u8; 32]) -> CtOption<Self> {
        Self::decompress(x_bytes, Choice::from(0))
    }

    /// Parses a SEC1-encoded point (compressed or uncompressed).
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self> {
        match bytes {
            [0x02, rest @ ..] | [0x03, rest @ ..] if rest.len() == 32 => {
                let x: &[u8; 32] = rest.try_into().expect("length checked");
                let y_is_odd = Choice::from(bytes[0] & 1);
                Option::from(Self::decompress(x, y_is_odd)).ok_or(Error::InvalidPoint)
            }
            [0x04, rest @ ..] if rest.len() == 64 => {
                let x: &[u8; 32] = rest[..32].try_into().expect("length checked");
                let y: &[u8; 32] = rest[32..].try_into().expect("length checked");

                let point = FieldElement::from_bytes(x).and_then(|x| {
                    FieldElement::from_bytes(y).and_then(|y| {
                        let point = Self::new(x, y);
                        CtOption::new(point, point.is_on_curve())
                    })
                });
                Option::from(point).ok_or(Error::InvalidPoint)
            }
            _ => Err(Error::InvalidEncoding),
        }
    }

    /// Returns the SEC1 encoding of this point.
    ///
    /// The identity has no SEC1 encoding and yields
    /// [`Error::PointAtInfinity`].
    pub fn to_encoded_point(&self, compress: bool) -> Result<EncodedPoint> {
        if self.is_identity().into() {
            return Err(Error::PointAtInfinity);
        }

        let mut bytes = [0u8; 65];
        let len = if compress {
            bytes[0] = u8::conditional_select(&0x02, &0x03, self.y.is_odd());
            bytes[1..33].copy_from_slice(&self.x.to_bytes());
            33
        } else {
            bytes[0] = 0x04;
            bytes[1..33].copy_from_slice(&self.x.to_bytes());
            bytes[33..65].copy_from_slice(&self.y.to_bytes());
            65
        };

        Ok(EncodedPoint { bytes, len })
    }
}

impl ConditionallySelectable for AffinePoint {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self {
            x: FieldElement::conditional_select(&a.x, &b.x, choice),
            y: FieldElement::conditional_select(&a.y, &b.y, choice),
            infinity: u8::conditional_select(&a.infinity, &b.infinity, choice),
        }
    }
}

impl ConstantTimeEq for AffinePoint {
    fn ct_eq(&self, other: &Self) -> Choice {
        (self.x.negate(1) + &other.x).normalizes_to_zero()
            & (self.y.negate(1) + &other.y).normalizes_to_zero()
            & self.infinity.ct_eq(&other.infinity)
    }
}

impl Default for AffinePoint {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl PartialEq for AffinePoint {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for AffinePoint {}

impl Mul<Scalar> for AffinePoint {
    type Output = ProjectivePoint;

    fn mul(self, scalar: Scalar) -> ProjectivePoint {
        ProjectivePoint::from(self) * scalar
    }
}

impl Mul<&Scalar> for AffinePoint {
    type Output = ProjectivePoint;

    fn mul(self, scalar: &Scalar) -> ProjectivePoint {
        ProjectivePoint::from(self) * scalar
    }
}

impl Neg for AffinePoint {
    type Output = AffinePoint;

    fn neg(self) -> Self::Output {
        Self {
            x: self.x,
            y: self.y.negate(1).normalize_weak(),
            infinity: self.infinity,
        }
    }
}
