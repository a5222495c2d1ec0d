//! Scalar multiplication.
//!
//! Variable-base products use the curve's endomorphism: λ·(x, y) = (β·x, y)
//! where λ³ = 1 mod n and β³ = 1 mod p. A scalar k splits into k1 + k2·λ
//! with k1, k2 half-width ("An Alternate Decomposition of an Integer for
//! Faster Point Multiplication on Certain Elliptic Curves", Park, Jeong,
//! Kim, Lim), so one 256-step ladder becomes two interleaved 128-step
//! ladders over radix-16 digit tables.
//!
//! Every table access scans all entries and blends with a mask; neither the
//! control flow nor the memory access pattern depends on the scalars.

use super::{ProjectivePoint, Scalar};
use core::ops::{Mul, MulAssign};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

#[cfg(feature = "std")]
use std::sync::LazyLock;

/// Lookup table containing precomputed values `[p, 2p, 3p, ..., 8p]`.
#[derive(Copy, Clone, Default)]
struct LookupTable([ProjectivePoint; 8]);

impl From<&ProjectivePoint> for LookupTable {
    fn from(p: &ProjectivePoint) -> Self {
        let mut points = [*p; 8];
        for j in 0..7 {
            points[j + 1] = p + &points[j];
        }
        Self(points)
    }
}

impl LookupTable {
    /// Given -8 <= x <= 8, returns x * p in constant time by scanning the
    /// whole table and masking in the selected entry.
    fn select(&self, x: i8) -> ProjectivePoint {
        debug_assert!((-8..=8).contains(&x));

        // Split x into sign and |x| without branching.
        let sign = x >> 7;
        let abs = ((x ^ sign) - sign) as u8;

        let mut acc = ProjectivePoint::IDENTITY;
        for (i, point) in self.0.iter().enumerate() {
            acc.conditional_assign(point, abs.ct_eq(&(i as u8 + 1)));
        }
        // acc is now |x| * p; fold the sign back in.
        acc.conditional_assign(&-acc, Choice::from((sign & 1) as u8));

        acc
    }
}

const MINUS_LAMBDA: Scalar = Scalar::from_bytes_unchecked(&[
    0xac, 0x9c, 0x52, 0xb3, 0x3f, 0xa3, 0xcf, 0x1f, 0x5a, 0xd9, 0xe3, 0xfd, 0x77, 0xed, 0x9b,
    0xa4, 0xa8, 0x80, 0xb9, 0xfc, 0x8e, 0xc7, 0x39, 0xc2, 0xe0, 0xcf, 0xc8, 0x10, 0xb5, 0x12,
    0x83, 0xcf,
]);

const MINUS_B1: Scalar = Scalar::from_bytes_unchecked(&[
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0xe4, 0x43, 0x7e, 0xd6, 0x01, 0x0e, 0x88, 0x28, 0x6f, 0x54, 0x7f, 0xa9, 0x0a, 0xbf,
    0xe4, 0xc3,
]);

const MINUS_B2: Scalar = Scalar::from_bytes_unchecked(&[
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xfe, 0x8a, 0x28, 0x0a, 0xc5, 0x07, 0x74, 0x34, 0x6d, 0xd7, 0x65, 0xcd, 0xa8, 0x3d, 0xb1,
    0x56, 0x2c,
]);

const G1: Scalar = Scalar::from_bytes_unchecked(&[
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x30,
    0x86, 0xd2, 0x21, 0xa7, 0xd4, 0x6b, 0xcd, 0xe8, 0x6c, 0x90, 0xe4, 0x92, 0x84, 0xeb, 0x15,
    0x3d, 0xab,
]);

const G2: Scalar = Scalar::from_bytes_unchecked(&[
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xe4,
    0x43, 0x7e, 0xd6, 0x01, 0x0e, 0x88, 0x28, 0x6f, 0x54, 0x7f, 0xa9, 0x0a, 0xbf, 0xe4, 0xc4,
    0x22, 0x12,
]);

/// Finds k1 and k2 such that k1 + k2 * λ == k mod n, with both halves
/// roughly 128 bits wide. The rounded multiplications by g1/g2 stand in for
/// divisions by n; the shift amount is fixed, so the `_vartime` calls are
/// constant time here.
fn decompose_scalar(k: &Scalar) -> (Scalar, Scalar) {
    let q1 = k.mul_shift_vartime(&G1, 272);
    let q2 = k.mul_shift_vartime(&G2, 272);

    let k2 = q1 * MINUS_B1 + q2 * MINUS_B2;
    let k1 = *k + k2 * MINUS_LAMBDA;

    (k1, k2)
}

/// Signed radix-16 digits of a scalar: `sum(d[j] * 2^(4*j)) == x` with
/// `-8 <= d[j] <= 8`. `D` is 33 for the half-width scalars produced by the
/// GLV split and 65 for full 256-bit scalars.
#[derive(Copy, Clone)]
struct Radix16Decomposition<const D: usize>([i8; D]);

impl<const D: usize> Radix16Decomposition<D> {
    fn new(x: &Scalar) -> Self {
        debug_assert!((D - 1) % 2 == 0);
        debug_assert!(
            D == 65 || bool::from(x.shr_vartime((D - 1) * 4).is_zero())
        );

        let mut output = [0i8; D];

        // Convert from radix 256 (bytes) to radix 16 (nibbles).
        let bytes = x.to_bytes();
        for i in 0..(D - 1) / 2 {
            output[2 * i] = (bytes[31 - i] & 0xf) as i8;
            output[2 * i + 1] = ((bytes[31 - i] >> 4) & 0xf) as i8;
        }

        // Re-center the coefficients from [0,16) to [-8,8).
        for i in 0..(D - 1) {
            let carry = (output[i] + 8) >> 4;
            output[i] -= carry << 4;
            output[i + 1] += carry;
        }

        Self(output)
    }
}

impl<const D: usize> Default for Radix16Decomposition<D> {
    fn default() -> Self {
        Self([0i8; D])
    }
}

/// One term of a linear combination, prepared for the shared double-and-add
/// ladder: lookup tables for the point and its endomorphism image, plus the
/// signed digits of the two half-scalars from the GLV split.
#[derive(Copy, Clone, Default)]
struct LincombTerm {
    plain: LookupTable,
    endo: LookupTable,
    digits_plain: Radix16Decomposition<33>,
    digits_endo: Radix16Decomposition<33>,
}

impl LincombTerm {
    fn new(x: &ProjectivePoint, k: &Scalar) -> Self {
        let (k1, k2) = decompose_scalar(k);

        // A half-scalar in the upper range stands for a small negative
        // value; fold that sign into the table base so the digit
        // decomposition always sees a genuinely half-width scalar.
        let k1_neg = k1.is_high();
        let k2_neg = k2.is_high();
        let k1 = Scalar::conditional_select(&k1, &-k1, k1_neg);
        let k2 = Scalar::conditional_select(&k2, &-k2, k2_neg);

        let base = ProjectivePoint::conditional_select(x, &-x, k1_neg);
        let image = x.endomorphism();
        let image = ProjectivePoint::conditional_select(&image, &-image, k2_neg);

        Self {
            plain: LookupTable::from(&base),
            endo: LookupTable::from(&image),
            digits_plain: Radix16Decomposition::new(&k1),
            digits_endo: Radix16Decomposition::new(&k2),
        }
    }

    /// Adds this term's contribution for digit position `i` into `acc`.
    fn accumulate(&self, acc: &mut ProjectivePoint, i: usize) {
        *acc += &self.plain.select(self.digits_plain.0[i]);
        *acc += &self.endo.select(self.digits_endo.0[i]);
    }
}

/// Calculates the linear combination `sum(x[i] * k[i])` in constant time.
///
/// All terms share one ladder: four doublings per radix-16 digit position,
/// with every term's masked table lookups added in between.
#[inline(always)]
fn lincomb_generic<const N: usize>(xs: &[ProjectivePoint; N], ks: &[Scalar; N]) -> ProjectivePoint {
    let mut terms = [LincombTerm::default(); N];
    for i in 0..N {
        terms[i] = LincombTerm::new(&xs[i], &ks[i]);
    }

    let mut acc = ProjectivePoint::IDENTITY;
    for term in &terms {
        term.accumulate(&mut acc, 32);
    }

    for i in (0..32).rev() {
        for _ in 0..4 {
            acc = acc.double();
        }
        for term in &terms {
            term.accumulate(&mut acc, i);
        }
    }
    acc
}

#[inline(always)]
fn mul(x: &ProjectivePoint, k: &Scalar) -> ProjectivePoint {
    lincomb_generic(&[*x], &[*k])
}

/// Calculates `x * k + y * l`.
pub fn lincomb(
    x: &ProjectivePoint,
    k: &Scalar,
    y: &ProjectivePoint,
    l: &Scalar,
) -> ProjectivePoint {
    lincomb_generic(&[*x, *y], &[*k, *l])
}

/// Precomputed radix-16 multiples of a fixed base point.
///
/// Holds 33 lookup tables spaced by two radix-16 steps (8 doublings apart),
/// enough to multiply by any 256-bit scalar with no doublings of the base at
/// multiplication time. Tables are immutable once built; build one for a
/// point that is multiplied repeatedly.
#[derive(Clone)]
pub struct PointTables {
    tables: [LookupTable; 33],
}

impl PointTables {
    /// Precomputes the tables for the given base point.
    pub fn new(point: &ProjectivePoint) -> Self {
        let mut tables = [LookupTable::default(); 33];
        let mut base = *point;
        for table in tables.iter_mut() {
            *table = LookupTable::from(&base);
            for _ in 0..8 {
                base = base.double();
            }
        }
        Self { tables }
    }

    /// Multiplies the base point by `k` in constant time.
    ///
    /// With digits d of k in signed radix 16, the product is
    /// `sum(d[2j] * 16^(2j) * P) + 16 * sum(d[2j+1] * 16^(2j) * P)`, and
    /// table j holds the multiples of `16^(2j) * P`.
    pub fn mul(&self, k: &Scalar) -> ProjectivePoint {
        let digits = Radix16Decomposition::<65>::new(k);

        let mut acc = ProjectivePoint::IDENTITY;
        for j in 0..32 {
            acc += self.tables[j].select(digits.0[2 * j + 1]);
        }

        for _ in 0..4 {
            acc = acc.double();
        }

        for j in 0..33 {
            acc += self.tables[j].select(digits.0[2 * j]);
        }

        acc
    }
}

/// Process-wide tables for the generator, built on first use behind a
/// one-time gate and read-only afterwards.
#[cfg(feature = "std")]
static GENERATOR_TABLES: LazyLock<PointTables> =
    LazyLock::new(|| PointTables::new(&ProjectivePoint::GENERATOR));

/// Forces initialization of the generator tables.
#[cfg(feature = "std")]
pub(crate) fn force_generator_tables() {
    LazyLock::force(&GENERATOR_TABLES);
}

/// Multiplies the generator by `k` in constant time.
#[cfg(feature = "std")]
pub(crate) fn mul_base(k: &Scalar) -> ProjectivePoint {
    GENERATOR_TABLES.mul(k)
}

/// Multiplies the generator by `k` in constant time.
#[cfg(not(feature = "std"))]
pub(crate) fn mul_base(k: &Scalar) -> ProjectivePoint {
    mul(&ProjectivePoint::GENERATOR, k)
}

impl Mul<Scalar> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn mul(self, other: Scalar) -> ProjectivePoint {
        mul(&self, &other)
    }
}

impl Mul<&Scalar> for &ProjectivePoint {
    type Output = ProjectivePoint;

    fn mul(self, other: &Scalar) -> ProjectivePoint {
        mul(self, other)
    }
}

impl Mul<&Scalar> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn mul(self, other: &Scalar) -> ProjectivePoint {
        mul(&self, other)
    }
}

impl MulAssign<Scalar> for ProjectivePoint {
    fn mul_assign(&mut self, rhs: Scalar) {
        *self = mul(self, &rhs);
    }
}

impl MulAssign<&Scalar> for ProjectivePoint {
    fn mul_assign(&mut self, rhs: &Scalar) {
        *self = mul(self, rhs);
    }
}

#[cfg(test)]
mod tests {
    use super::{lincomb, mul_base, PointTables};
    use crate::arithmetic::{ProjectivePoint, Scalar};

    fn scalar_from_u64(k: u64) -> Scalar {
        Scalar::from(k)
    }

    #[test]
    fn mul_by_small_scalars() {
        let g = ProjectivePoint::GENERATOR;

        assert_eq!(g * scalar_from_u64(1), g);
        assert_eq!(g * scalar_from_u64(2), g.double());
        assert_eq!(g * scalar_from_u64(3), g.double() + &g);
        assert_eq!(g * Scalar::ZERO, ProjectivePoint::IDENTITY);
    }

    #[test]
    fn mul_by_order_minus_one() {
        let g = ProjectivePoint::GENERATOR;
        assert_eq!(g * (-Scalar::ONE), -g);
    }

    #[test]
    fn mul_is_associative_with_scalar_mul() {
        let g = ProjectivePoint::GENERATOR;
        let a = Scalar::from_bytes_reduced(&[0xa5; 32]);
        let b = Scalar::from_bytes_reduced(&[0x3c; 32]);

        assert_eq!((g * a) * b, g * (a * b));
    }

    #[test]
    fn lincomb_matches_separate_muls() {
        let x = ProjectivePoint::GENERATOR;
        let y = ProjectivePoint::GENERATOR.double() + &x;
        let k = Scalar::from_bytes_reduced(&[0x17; 32]);
        let l = Scalar::from_bytes_reduced(&[0xfe; 32]);

        let reference = &x * &k + &y * &l;
        assert_eq!(lincomb(&x, &k, &y, &l), reference);
    }

    #[test]
    fn base_tables_match_generic_mul() {
        let k = Scalar::from_bytes_reduced(&[0x42; 32]);
        assert_eq!(mul_base(&k), ProjectivePoint::GENERATOR * k);
        assert_eq!(mul_base(&Scalar::ZERO), ProjectivePoint::IDENTITY);
        assert_eq!(mul_base(&Scalar::ONE), ProjectivePoint::GENERATOR);
    }

    #[test]
    fn point_tables_for_arbitrary_base() {
        let base = ProjectivePoint::GENERATOR.double();
        let tables = PointTables::new(&base);
        let k = Scalar::from_bytes_reduced(&[0x99; 32]);

        assert_eq!(tables.mul(&k), base * k);
    }
}
