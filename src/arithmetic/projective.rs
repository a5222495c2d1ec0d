//! Projective points.

#![allow(clippy::op_ref)]

use super::{AffinePoint, FieldElement, CURVE_EQUATION_B_SINGLE};
use core::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

/// The endomorphism constant β: a cube root of unity in the base field, with
/// λ·(x, y) = (β·x, y) for the matching cube root of unity λ modulo n.
#[rustfmt::skip]
const ENDOMORPHISM_BETA: FieldElement = FieldElement::from_bytes_unchecked(&[
    0x7a, 0xe9, 0x6a, 0x2b, 0x65, 0x7c, 0x07, 0x10,
    0x6e, 0x64, 0x47, 0x9e, 0xac, 0x34, 0x34, 0xe9,
    0x9c, 0xf0, 0x49, 0x75, 0x12, 0xf5, 0x89, 0x95,
    0xc1, 0x39, 0x6c, 0x28, 0x71, 0x95, 0x01, 0xee,
]);

/// A point on the secp256k1 curve in homogeneous projective coordinates,
/// with Z = 0 encoding the point at infinity.
#[derive(Clone, Copy, Debug)]
pub struct ProjectivePoint {
    x: FieldElement,
    y: FieldElement,
    pub(super) z: FieldElement,
}

impl ProjectivePoint {
    /// Additive identity of the group: the point at infinity.
    pub const IDENTITY: Self = Self {
        x: FieldElement::ZERO,
        y: FieldElement::ONE,
        z: FieldElement::ZERO,
    };

    /// Base point of secp256k1.
    pub const GENERATOR: Self = Self {
        x: AffinePoint::GENERATOR.x,
        y: AffinePoint::GENERATOR.y,
        z: FieldElement::ONE,
    };

    /// Is this the point at infinity?
    pub fn is_identity(&self) -> Choice {
        self.z.normalizes_to_zero()
    }

    /// Returns the affine representation of this point, with the identity
    /// mapping to [`AffinePoint::IDENTITY`].
    pub fn to_affine(&self) -> AffinePoint {
        self.z
            .invert()
            .map(|zinv| {
                let x = self.x * &zinv;
                let y = self.y * &zinv;
                AffinePoint::new(x.normalize(), y.normalize())
            })
            .unwrap_or_else(|| AffinePoint::IDENTITY)
    }

    /// Returns `-self`.
    fn neg(&self) -> Self {
        Self {
            x: self.x,
            y: self.y.negate(1).normalize_weak(),
            z: self.z,
        }
    }

    /// Returns `self + other`.
    ///
    /// Uses the complete addition formula for a = 0 short Weierstrass
    /// curves from Renes-Costello-Batina 2015
    /// (<https://eprint.iacr.org/2015/1060>, Algorithm 7):
    ///
    /// ```text
    /// X3 = (X1Y2 + X2Y1)(Y1Y2 − 3bZ1Z2) − 3b(Y1Z2 + Y2Z1)(X1Z2 + X2Z1)
    /// Y3 = (Y1Y2 + 3bZ1Z2)(Y1Y2 − 3bZ1Z2) + 9bX1X2(X1Z2 + X2Z1)
    /// Z3 = (Y1Z2 + Y2Z1)(Y1Y2 + 3bZ1Z2) + 3X1X2(X1Y2 + X2Y1)
    /// ```
    ///
    /// The coordinate sums (e.g. X1Y2 + X2Y1) come out of the usual
    /// (X1+Y1)(X2+Y2) cross-product trick. Since b = 7 fits in a limb, the
    /// 3b and 9b factors are applied with one `mul_single` and a weak
    /// normalization instead of double-and-add chains.
    fn add(&self, other: &Self) -> Self {
        let xx = self.x * &other.x;
        let yy = self.y * &other.y;
        let zz = self.z * &other.z;

        // Each cross sum stays at magnitude 4: two magnitude-1 products,
        // negated at magnitude 2.
        let sum_xy = ((self.x + &self.y) * &(other.x + &other.y)) + &(xx + &yy).negate(2);
        let sum_yz = ((self.y + &self.z) * &(other.y + &other.z)) + &(yy + &zz).negate(2);
        let sum_xz = ((self.x + &self.z) * &(other.x + &other.z)) + &(xx + &zz).negate(2);

        let zz_3b = zz.mul_single(3 * CURVE_EQUATION_B_SINGLE).normalize_weak();
        let yy_minus = yy + &zz_3b.negate(1);
        let yy_plus = yy + &zz_3b;

        let sum_yz_3b = sum_yz
            .mul_single(3 * CURVE_EQUATION_B_SINGLE)
            .normalize_weak();
        let xx_3 = xx.mul_single(3);
        let xx_9b = xx.mul_single(9 * CURVE_EQUATION_B_SINGLE).normalize_weak();

        Self {
            x: ((sum_xy * &yy_minus) + &(sum_yz_3b * &sum_xz).negate(1)).normalize_weak(),
            y: ((yy_plus * &yy_minus) + &(xx_9b * &sum_xz)).normalize_weak(),
            z: ((sum_yz * &yy_plus) + &(xx_3 * &sum_xy)).normalize_weak(),
        }
    }

    /// Returns `self + other` for affine `other`.
    ///
    /// Same formula as [`Self::add`] with Z2 = 1 substituted (Algorithm 8
    /// of the same paper), which turns the z cross sums into a single
    /// multiply-and-add each. The formula is only complete for finite
    /// `other`, so an identity `other` is patched up at the end.
    fn add_mixed(&self, other: &AffinePoint) -> Self {
        let xx = self.x * &other.x;
        let yy = self.y * &other.y;
        let sum_xy = ((self.x + &self.y) * &(other.x + &other.y)) + &(xx + &yy).negate(2);
        let sum_yz = (other.y * &self.z) + &self.y;
        let sum_xz = (other.x * &self.z) + &self.x;

        let z_3b = self
            .z
            .mul_single(3 * CURVE_EQUATION_B_SINGLE)
            .normalize_weak();
        let yy_minus = yy + &z_3b.negate(1);
        let yy_plus = yy + &z_3b;

        let sum_yz_3b = sum_yz
            .mul_single(3 * CURVE_EQUATION_B_SINGLE)
            .normalize_weak();
        let xx_3 = xx.mul_single(3);
        let xx_9b = xx.mul_single(9 * CURVE_EQUATION_B_SINGLE).normalize_weak();

        let mut ret = Self {
            x: ((sum_xy * &yy_minus) + &(sum_yz_3b * &sum_xz).negate(1)).normalize_weak(),
            y: ((yy_plus * &yy_minus) + &(xx_9b * &sum_xz)).normalize_weak(),
            z: ((sum_yz * &yy_plus) + &(xx_3 * &sum_xy)).normalize_weak(),
        };
        ret.conditional_assign(self, other.is_identity());
        ret
    }

    /// Doubles this point.
    ///
    /// Algorithm 9 of Renes-Costello-Batina 2015:
    ///
    /// ```text
    /// X3 = 2XY(Y² − 9bZ²)
    /// Y3 = (Y² − 9bZ²)(Y² + 3bZ²) + 24bY²Z²
    /// Z3 = 8Y³Z
    /// ```
    ///
    /// As in [`Self::add`], the small constant factors (9b, 24b, 8) are
    /// single-limb multiplications.
    #[inline]
    pub fn double(&self) -> Self {
        let yy = self.y.square();
        let zz = self.z.square();
        let xy_2 = (self.x * &self.y).double();

        let zz_3b = zz.mul_single(3 * CURVE_EQUATION_B_SINGLE).normalize_weak();
        let zz_9b = zz.mul_single(9 * CURVE_EQUATION_B_SINGLE).normalize_weak();

        let yy_minus = yy + &zz_9b.negate(1);
        let yy_plus = yy + &zz_3b;

        // Only ever added, so the large magnitude is fine unnormalized.
        let yy_zz_24b = (yy * &zz).mul_single(24 * CURVE_EQUATION_B_SINGLE);

        Self {
            x: xy_2 * &yy_minus,
            y: ((yy_minus * &yy_plus) + &yy_zz_24b).normalize_weak(),
            z: ((yy * &self.y) * &self.z).mul_single(8).normalize_weak(),
        }
    }

    /// Returns `self - other`.
    fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    /// Returns `self - other`.
    fn sub_mixed(&self, other: &AffinePoint) -> Self {
        self.add_mixed(&other.neg())
    }

    /// Maps the point through the curve's efficiently computable
    /// endomorphism φ(x, y) = (βx, y), which acts as multiplication by λ.
    pub fn endomorphism(&self) -> Self {
        Self {
            x: self.x.mul(&ENDOMORPHISM_BETA),
            y: self.y,
            z: self.z,
        }
    }

    /// Compares against an affine point without converting `self`.
    pub fn eq_affine(&self, other: &AffinePoint) -> Choice {
        // The cross-multiplied comparison from `ct_eq` with z2 = 1. The
        // affine identity carries no coordinates, so it has to be matched
        // on the identity flag instead.
        let x_eq = (other.x * &self.z + &self.x.negate(1)).normalizes_to_zero();
        let y_eq = (other.y * &self.z + &self.y.negate(1)).normalizes_to_zero();

        let both_identity = self.is_identity() & other.is_identity();
        both_identity | (!other.is_identity() & x_eq & y_eq)
    }
}

impl From<AffinePoint> for ProjectivePoint {
    fn from(p: AffinePoint) -> Self {
        let projective = Self {
            x: p.x,
            y: p.y,
            z: FieldElement::ONE,
        };
        Self::conditional_select(&projective, &Self::IDENTITY, p.is_identity())
    }
}

impl From<&AffinePoint> for ProjectivePoint {
    fn from(p: &AffinePoint) -> Self {
        Self::from(*p)
    }
}

impl From<ProjectivePoint> for AffinePoint {
    fn from(p: ProjectivePoint) -> AffinePoint {
        p.to_affine()
    }
}

impl From<&ProjectivePoint> for AffinePoint {
    fn from(p: &ProjectivePoint) -> AffinePoint {
        p.to_affine()
    }
}

impl ConditionallySelectable for ProjectivePoint {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self {
            x: FieldElement::conditional_select(&a.x, &b.x, choice),
            y: FieldElement::conditional_select(&a.y, &b.y, choice),
            z: FieldElement::conditional_select(&a.z, &b.z, choice),
        }
    }
}

impl ConstantTimeEq for ProjectivePoint {
    fn ct_eq(&self, other: &Self) -> Choice {
        // x1/z1 == x2/z2 exactly when x1·z2 == x2·z1 (likewise for y),
        // which avoids inversions. The identity (z = 0) degenerates
        // correctly: compared against a finite point, the y test becomes
        // y1·z2 == 0, and y·z of a finite point is never zero.
        let x12 = self.x * &other.z;
        let x21 = other.x * &self.z;
        let y12 = self.y * &other.z;
        let y21 = other.y * &self.z;

        (x12 + &x21.negate(1)).normalizes_to_zero()
            & (y12 + &y21.negate(1)).normalizes_to_zero()
    }
}

impl PartialEq for ProjectivePoint {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl PartialEq<AffinePoint> for ProjectivePoint {
    fn eq(&self, other: &AffinePoint) -> bool {
        self.eq_affine(other).into()
    }
}

impl PartialEq<ProjectivePoint> for AffinePoint {
    fn eq(&self, other: &ProjectivePoint) -> bool {
        other.eq_affine(self).into()
    }
}

impl Eq for ProjectivePoint {}

impl Default for ProjectivePoint {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Add<&ProjectivePoint> for &ProjectivePoint {
    type Output = ProjectivePoint;

    fn add(self, other: &ProjectivePoint) -> ProjectivePoint {
        ProjectivePoint::add(self, other)
    }
}

impl Add<ProjectivePoint> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn add(self, other: ProjectivePoint) -> ProjectivePoint {
        ProjectivePoint::add(&self, &other)
    }
}

impl Add<&ProjectivePoint> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn add(self, other: &ProjectivePoint) -> ProjectivePoint {
        ProjectivePoint::add(&self, other)
    }
}

impl AddAssign<ProjectivePoint> for ProjectivePoint {
    fn add_assign(&mut self, rhs: ProjectivePoint) {
        *self = ProjectivePoint::add(self, &rhs);
    }
}

impl AddAssign<&ProjectivePoint> for ProjectivePoint {
    fn add_assign(&mut self, rhs: &ProjectivePoint) {
        *self = ProjectivePoint::add(self, rhs);
    }
}

impl Add<AffinePoint> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn add(self, other: AffinePoint) -> ProjectivePoint {
        ProjectivePoint::add_mixed(&self, &other)
    }
}

impl Add<&AffinePoint> for &ProjectivePoint {
    type Output = ProjectivePoint;

    fn add(self, other: &AffinePoint) -> ProjectivePoint {
        ProjectivePoint::add_mixed(self, other)
    }
}

impl Add<&AffinePoint> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn add(self, other: &AffinePoint) -> ProjectivePoint {
        ProjectivePoint::add_mixed(&self, other)
    }
}

impl AddAssign<AffinePoint> for ProjectivePoint {
    fn add_assign(&mut self, rhs: AffinePoint) {
        *self = ProjectivePoint::add_mixed(self, &rhs);
    }
}

impl AddAssign<&AffinePoint> for ProjectivePoint {
    fn add_assign(&mut self, rhs: &AffinePoint) {
        *self = ProjectivePoint::add_mixed(self, rhs);
    }
}

impl Sub<ProjectivePoint> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn sub(self, other: ProjectivePoint) -> ProjectivePoint {
        ProjectivePoint::sub(&self, &other)
    }
}

impl Sub<&ProjectivePoint> for &ProjectivePoint {
    type Output = ProjectivePoint;

    fn sub(self, other: &ProjectivePoint) -> ProjectivePoint {
        ProjectivePoint::sub(self, other)
    }
}

impl Sub<&ProjectivePoint> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn sub(self, other: &ProjectivePoint) -> ProjectivePoint {
        ProjectivePoint::sub(&self, other)
    }
}

impl SubAssign<ProjectivePoint> for ProjectivePoint {
    fn sub_assign(&mut self, rhs: ProjectivePoint) {
        *self = ProjectivePoint::sub(self, &rhs);
    }
}

impl SubAssign<&ProjectivePoint> for ProjectivePoint {
    fn sub_assign(&mut self, rhs: &ProjectivePoint) {
        *self = ProjectivePoint::sub(self, rhs);
    }
}

impl Sub<AffinePoint> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn sub(self, other: AffinePoint) -> ProjectivePoint {
        ProjectivePoint::sub_mixed(&self, &other)
    }
}

impl Sub<&AffinePoint> for &ProjectivePoint {
    type Output = ProjectivePoint;

    fn sub(self, other: &AffinePoint) -> ProjectivePoint {
        ProjectivePoint::sub_mixed(self, other)
    }
}

impl Sub<&AffinePoint> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn sub(self, other: &AffinePoint) -> ProjectivePoint {
        ProjectivePoint::sub_mixed(&self, other)
    }
}

impl SubAssign<AffinePoint> for ProjectivePoint {
    fn sub_assign(&mut self, rhs: AffinePoint) {
        *self = ProjectivePoint::sub_mixed(self, &rhs);
    }
}

impl Neg for ProjectivePoint {
    type Output = ProjectivePoint;

    fn neg(self) -> ProjectivePoint {
        ProjectivePoint::neg(&self)
    }
}

impl<'a> Neg for &'a ProjectivePoint {
    type Output = ProjectivePoint;

    fn neg(self) -> ProjectivePoint {
        ProjectivePoint::neg(self)
    }
}

#[cfg(test)]
mod tests {
    use super::{AffinePoint, ProjectivePoint};
    use hex_literal::hex;

    #[test]
    fn affine_to_projective() {
        let basepoint_affine = AffinePoint::GENERATOR;
        let basepoint_projective = ProjectivePoint::GENERATOR;

        assert_eq!(ProjectivePoint::from(basepoint_affine), basepoint_projective);
        assert_eq!(basepoint_projective.to_affine(), basepoint_affine);
        assert!(!bool::from(basepoint_projective.to_affine().is_identity()));

        assert!(bool::from(
            ProjectivePoint::IDENTITY.to_affine().is_identity()
        ));
    }

    #[test]
    fn projective_identity_addition() {
        let identity = ProjectivePoint::IDENTITY;
        let generator = ProjectivePoint::GENERATOR;

        assert_eq!(identity + &generator, generator);
        assert_eq!(generator + &identity, generator);
    }

    #[test]
    fn projective_mixed_addition() {
        let identity = ProjectivePoint::IDENTITY;
        let basepoint_affine = AffinePoint::GENERATOR;
        let basepoint_projective = ProjectivePoint::GENERATOR;

        assert_eq!(identity + &basepoint_affine, basepoint_projective);
        assert_eq!(
            basepoint_projective + &basepoint_affine,
            basepoint_projective + &basepoint_projective
        );
    }

    #[test]
    fn mixed_addition_identity_rhs() {
        let generator = ProjectivePoint::GENERATOR;
        let p0 = generator + ProjectivePoint::IDENTITY;
        let p1 = generator + AffinePoint::IDENTITY;
        assert_eq!(p0, p1);
    }

    #[test]
    fn double_vs_known_value() {
        // x(2G) is a standard value; assert it without pinning y.
        let doubled = ProjectivePoint::GENERATOR.double().to_affine();
        assert_eq!(
            doubled.x_bytes(),
            hex!("C6047F9441ED7D6D3045406E95C07CD85C778E4B8CEF3CA7ABAC09B95C709EE5")
        );
    }

    #[test]
    fn projective_add_vs_double() {
        let generator = ProjectivePoint::GENERATOR;

        let r1 = generator + &generator;
        let r2 = generator.double();
        assert_eq!(r1, r2);

        let r1 = (generator + &generator) + &(generator + &generator);
        let r2 = generator.double().double();
        assert_eq!(r1, r2);
    }

    #[test]
    fn projective_add_and_sub() {
        let basepoint_affine = AffinePoint::GENERATOR;
        let basepoint_projective = ProjectivePoint::GENERATOR;

        assert_eq!(
            (basepoint_projective + &basepoint_projective) - &basepoint_projective,
            basepoint_projective
        );
        assert_eq!(
            (basepoint_projective + &basepoint_affine) - &basepoint_affine,
            basepoint_projective
        );
    }

    #[test]
    fn projective_double_and_sub() {
        let generator = ProjectivePoint::GENERATOR;
        assert_eq!(generator.double() - &generator, generator);
    }

    #[test]
    fn negated_point_cancels() {
        let generator = ProjectivePoint::GENERATOR;
        assert_eq!(generator + &(-generator), ProjectivePoint::IDENTITY);
    }

    #[test]
    fn projective_equality() {
        assert_ne!(ProjectivePoint::GENERATOR, ProjectivePoint::IDENTITY);
        assert_ne!(ProjectivePoint::IDENTITY, ProjectivePoint::GENERATOR);
        assert_eq!(ProjectivePoint::IDENTITY, ProjectivePoint::IDENTITY);
        assert_eq!(-ProjectivePoint::IDENTITY, ProjectivePoint::IDENTITY);
        assert_eq!(ProjectivePoint::GENERATOR, ProjectivePoint::GENERATOR);
        assert_ne!(ProjectivePoint::GENERATOR, -ProjectivePoint::GENERATOR);

        assert_ne!(ProjectivePoint::GENERATOR, AffinePoint::IDENTITY);
        assert_ne!(ProjectivePoint::IDENTITY, AffinePoint::GENERATOR);
        assert_eq!(ProjectivePoint::IDENTITY, AffinePoint::IDENTITY);
        assert_eq!(ProjectivePoint::GENERATOR, AffinePoint::GENERATOR);
        assert_eq!(-ProjectivePoint::GENERATOR, -AffinePoint::GENERATOR);
    }
}
