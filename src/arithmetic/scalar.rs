//! Scalar field arithmetic modulo the curve order n, using 4 64-bit limbs.
//! Ported from <https://github.com/bitcoin-core/secp256k1>.

use crate::arithmetic::util::{adc64, sbb64};
use crate::{Error, Result};
use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};
use zeroize::Zeroize;

/// Limbs of the secp256k1 order,
/// n = FFFFFFFF FFFFFFFF FFFFFFFF FFFFFFFE BAAEDCE6 AF48A03B BFD25E8C D0364141.
pub(crate) const MODULUS: [u64; 4] = [
    0xBFD2_5E8C_D036_4141,
    0xBAAE_DCE6_AF48_A03B,
    0xFFFF_FFFF_FFFF_FFFE,
    0xFFFF_FFFF_FFFF_FFFF,
];

/// Limbs of 2^256 minus the secp256k1 order.
const NEG_MODULUS: [u64; 4] = [!MODULUS[0] + 1, !MODULUS[1], !MODULUS[2], !MODULUS[3]];

/// Limbs of n / 2 (rounded down).
const FRAC_MODULUS_2: [u64; 4] = [
    0xDFE9_2F46_681B_20A0,
    0x5D57_6E73_57A4_501D,
    0xFFFF_FFFF_FFFF_FFFF,
    0x7FFF_FFFF_FFFF_FFFF,
];

/// Multi-limb subtraction returning the result and the raw borrow
/// (`0` or `u64::MAX`).
#[inline(always)]
fn sbb_array(lhs: &[u64; 4], rhs: &[u64; 4]) -> ([u64; 4], u64) {
    let borrow = 0;
    let (r0, borrow) = sbb64(lhs[0], rhs[0], borrow);
    let (r1, borrow) = sbb64(lhs[1], rhs[1], borrow);
    let (r2, borrow) = sbb64(lhs[2], rhs[2], borrow);
    let (r3, borrow) = sbb64(lhs[3], rhs[3], borrow);
    ([r0, r1, r2, r3], borrow)
}

/// Multi-limb subtraction returning the borrow as a [`Choice`].
#[inline(always)]
fn sbb_array_with_underflow(lhs: &[u64; 4], rhs: &[u64; 4]) -> ([u64; 4], Choice) {
    let (res, borrow) = sbb_array(lhs, rhs);
    (res, Choice::from((borrow >> 63) as u8))
}

/// Multi-limb addition returning the result and the carry (`0` or `1`).
#[inline(always)]
fn adc_array(lhs: &[u64; 4], rhs: &[u64; 4]) -> ([u64; 4], u64) {
    let carry = 0;
    let (r0, carry) = adc64(lhs[0], rhs[0], carry);
    let (r1, carry) = adc64(lhs[1], rhs[1], carry);
    let (r2, carry) = adc64(lhs[2], rhs[2], carry);
    let (r3, carry) = adc64(lhs[3], rhs[3], carry);
    ([r0, r1, r2, r3], carry)
}

/// Multi-limb addition returning the carry as a [`Choice`].
#[inline(always)]
fn adc_array_with_overflow(lhs: &[u64; 4], rhs: &[u64; 4]) -> ([u64; 4], Choice) {
    let (res, carry) = adc_array(lhs, rhs);
    (res, Choice::from(carry as u8))
}

#[inline(always)]
fn conditional_select(a: &[u64; 4], b: &[u64; 4], choice: Choice) -> [u64; 4] {
    [
        u64::conditional_select(&a[0], &b[0], choice),
        u64::conditional_select(&a[1], &b[1], choice),
        u64::conditional_select(&a[2], &b[2], choice),
        u64::conditional_select(&a[3], &b[3], choice),
    ]
}

/// Constant-time less-than on raw limbs (internal use only).
#[inline(always)]
fn ct_less(a: u64, b: u64) -> u64 {
    (a < b) as u64
}

/// Add a to the number defined by (c0,c1,c2). c2 must never overflow.
fn sumadd(a: u64, c0: u64, c1: u64, c2: u64) -> (u64, u64, u64) {
    let new_c0 = c0.wrapping_add(a);
    let over = ct_less(new_c0, a);
    let new_c1 = c1.wrapping_add(over);
    let new_c2 = c2 + ct_less(new_c1, over);
    (new_c0, new_c1, new_c2)
}

/// Add a to the number defined by (c0,c1). c1 must never overflow.
fn sumadd_fast(a: u64, c0: u64, c1: u64) -> (u64, u64) {
    let new_c0 = c0.wrapping_add(a);
    let new_c1 = c1 + ct_less(new_c0, a);
    debug_assert!((new_c1 != 0) | (new_c0 >= a));
    (new_c0, new_c1)
}

/// Add a*b to the number defined by (c0,c1,c2). c2 must never overflow.
fn muladd(a: u64, b: u64, c0: u64, c1: u64, c2: u64) -> (u64, u64, u64) {
    let t = (a as u128) * (b as u128);
    let th = (t >> 64) as u64; // at most 0xFFFFFFFFFFFFFFFE
    let tl = t as u64;

    let new_c0 = c0.wrapping_add(tl);
    let new_th = th + ct_less(new_c0, tl); // at most 0xFFFFFFFFFFFFFFFF
    let new_c1 = c1.wrapping_add(new_th);
    let new_c2 = c2 + ct_less(new_c1, new_th);
    debug_assert!((new_c1 >= new_th) || (new_c2 != 0));
    (new_c0, new_c1, new_c2)
}

/// Add a*b to the number defined by (c0,c1). c1 must never overflow.
fn muladd_fast(a: u64, b: u64, c0: u64, c1: u64) -> (u64, u64) {
    let t = (a as u128) * (b as u128);
    let th = (t >> 64) as u64; // at most 0xFFFFFFFFFFFFFFFE
    let tl = t as u64;

    let new_c0 = c0.wrapping_add(tl);
    let new_th = th + ct_less(new_c0, tl); // at most 0xFFFFFFFFFFFFFFFF
    let new_c1 = c1 + new_th;
    debug_assert!(new_c1 >= new_th);
    (new_c0, new_c1)
}

/// An element of the scalar field, i.e. an integer modulo the curve order n.
#[derive(Clone, Copy, Debug, Default)]
pub struct Scalar(pub(crate) [u64; 4]);

impl Scalar {
    /// Zero scalar.
    pub const ZERO: Self = Self([0, 0, 0, 0]);

    /// Multiplicative identity.
    pub const ONE: Self = Self([1, 0, 0, 0]);

    /// Parses a big-endian byte array without checking the range. Only for
    /// compile-time constants known to be in range.
    pub(crate) const fn from_bytes_unchecked(bytes: &[u8; 32]) -> Self {
        let w3 = ((bytes[0] as u64) << 56)
            | ((bytes[1] as u64) << 48)
            | ((bytes[2] as u64) << 40)
            | ((bytes[3] as u64) << 32)
            | ((bytes[4] as u64) << 24)
            | ((bytes[5] as u64) << 16)
            | ((bytes[6] as u64) << 8)
            | (bytes[7] as u64);
        let w2 = ((bytes[8] as u64) << 56)
            | ((bytes[9] as u64) << 48)
            | ((bytes[10] as u64) << 40)
            | ((bytes[11] as u64) << 32)
            | ((bytes[12] as u64) << 24)
            | ((bytes[13] as u64) << 16)
            | ((bytes[14] as u64) << 8)
            | (bytes[15] as u64);
        let w1 = ((bytes[16] as u64) << 56)
            | ((bytes[17] as u64) << 48)
            | ((bytes[18] as u64) << 40)
            | ((bytes[19] as u64) << 32)
            | ((bytes[20] as u64) << 24)
            | ((bytes[21] as u64) << 16)
            | ((bytes[22] as u64) << 8)
            | (bytes[23] as u64);
        let w0 = ((bytes[24] as u64) << 56)
            | ((bytes[25] as u64) << 48)
            | ((bytes[26] as u64) << 40)
            | ((bytes[27] as u64) << 32)
            | ((bytes[28] as u64) << 24)
            | ((bytes[29] as u64) << 16)
            | ((bytes[30] as u64) << 8)
            | (bytes[31] as u64);
        Self([w0, w1, w2, w3])
    }

    /// Parses a big-endian byte array as a canonical scalar.
    ///
    /// Returns `None` if the integer is not in the range `[0, n)`.
    pub fn from_bytes(bytes: &[u8; 32]) -> CtOption<Self> {
        let w = Self::words_from_be(bytes);

        // If w is in range then w - n underflows.
        let (_, underflow) = sbb_array_with_underflow(&w, &MODULUS);
        CtOption::new(Self(w), underflow)
    }

    /// Parses a big-endian byte array as a canonical scalar, reporting
    /// values greater than or equal to n as [`Error::ScalarOverflow`].
    ///
    /// This is the fallible boundary form of [`Self::from_bytes`] for
    /// callers working with `Result` rather than `CtOption`.
    pub fn from_bytes_be(bytes: &[u8; 32]) -> Result<Self> {
        Option::from(Self::from_bytes(bytes)).ok_or(Error::ScalarOverflow)
    }

    /// Parses a big-endian byte array, subtracting n if necessary.
    pub fn from_bytes_reduced(bytes: &[u8; 32]) -> Self {
        let w = Self::words_from_be(bytes);
        let (r, underflow) = sbb_array_with_underflow(&w, &MODULUS);
        Self(conditional_select(&w, &r, !underflow))
    }

    /// Parses a 64-byte big-endian value, fully reducing it modulo n.
    pub fn from_wide_bytes_reduced(bytes: &[u8; 64]) -> Self {
        WideScalar::from_bytes(bytes).reduce()
    }

    #[inline(always)]
    fn words_from_be(bytes: &[u8; 32]) -> [u64; 4] {
        let w3 = u64::from_be_bytes(bytes[0..8].try_into().expect("8 bytes"));
        let w2 = u64::from_be_bytes(bytes[8..16].try_into().expect("8 bytes"));
        let w1 = u64::from_be_bytes(bytes[16..24].try_into().expect("8 bytes"));
        let w0 = u64::from_be_bytes(bytes[24..32].try_into().expect("8 bytes"));
        [w0, w1, w2, w3]
    }

    /// Returns the big-endian encoding of this scalar.
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut ret = [0u8; 32];
        ret[0..8].copy_from_slice(&self.0[3].to_be_bytes());
        ret[8..16].copy_from_slice(&self.0[2].to_be_bytes());
        ret[16..24].copy_from_slice(&self.0[1].to_be_bytes());
        ret[24..32].copy_from_slice(&self.0[0].to_be_bytes());
        ret
    }

    /// Is this scalar greater than n / 2?
    pub fn is_high(&self) -> Choice {
        let (_, underflow) = sbb_array_with_underflow(&FRAC_MODULUS_2, &self.0);
        underflow
    }

    /// Is this scalar zero?
    pub fn is_zero(&self) -> Choice {
        Choice::from(((self.0[0] | self.0[1] | self.0[2] | self.0[3]) == 0) as u8)
    }

    /// Is this scalar odd?
    pub fn is_odd(&self) -> Choice {
        (self.0[0] as u8 & 1).into()
    }

    /// Returns -self mod n.
    pub fn negate(&self) -> Self {
        let (res, _) = sbb_array(&MODULUS, &self.0);
        Self::conditional_select(&Self(res), &Self::ZERO, self.is_zero())
    }

    /// Returns self + rhs mod n.
    pub fn add(&self, rhs: &Self) -> Self {
        let (res1, overflow) = adc_array_with_overflow(&self.0, &rhs.0);
        let (res2, underflow) = sbb_array_with_underflow(&res1, &MODULUS);
        Self(conditional_select(&res1, &res2, overflow | !underflow))
    }

    /// Returns self - rhs mod n.
    pub fn sub(&self, rhs: &Self) -> Self {
        let (res1, underflow) = sbb_array_with_underflow(&self.0, &rhs.0);
        let (res2, _) = adc_array(&res1, &MODULUS);
        Self(conditional_select(&res1, &res2, underflow))
    }

    /// Returns self * rhs mod n.
    pub fn mul(&self, rhs: &Self) -> Self {
        self.mul_wide(rhs).reduce()
    }

    /// Returns self * self mod n.
    pub fn square(&self) -> Self {
        self.mul(self)
    }

    /// Raises the scalar to the power 2^k.
    fn pow2k(&self, k: usize) -> Self {
        let mut x = *self;
        for _ in 0..k {
            x = x.square();
        }
        x
    }

    /// Returns the multiplicative inverse, if `self` is non-zero.
    pub fn invert(&self) -> CtOption<Self> {
        // Addition chain from
        // https://briansmith.org/ecc-inversion-addition-chains-01#secp256k1_scalar_inversion
        let x_1 = *self;
        let x_10 = self.pow2k(1);
        let x_11 = x_10.mul(&x_1);
        let x_101 = x_10.mul(&x_11);
        let x_111 = x_10.mul(&x_101);
        let x_1001 = x_10.mul(&x_111);
        let x_1011 = x_10.mul(&x_1001);
        let x_1101 = x_10.mul(&x_1011);

        let x6 = x_1101.pow2k(2).mul(&x_1011);
        let x8 = x6.pow2k(2).mul(&x_11);
        let x14 = x8.pow2k(6).mul(&x6);
        let x28 = x14.pow2k(14).mul(&x14);
        let x56 = x28.pow2k(28).mul(&x28);

        #[rustfmt::skip]
        let res = x56
            .pow2k(56).mul(&x56)
            .pow2k(14).mul(&x14)
            .pow2k(3).mul(&x_101)
            .pow2k(4).mul(&x_111)
            .pow2k(4).mul(&x_101)
            .pow2k(5).mul(&x_1011)
            .pow2k(4).mul(&x_1011)
            .pow2k(4).mul(&x_111)
            .pow2k(5).mul(&x_111)
            .pow2k(6).mul(&x_1101)
            .pow2k(4).mul(&x_101)
            .pow2k(3).mul(&x_111)
            .pow2k(5).mul(&x_1001)
            .pow2k(6).mul(&x_101)
            .pow2k(10).mul(&x_111)
            .pow2k(4).mul(&x_111)
            .pow2k(9).mul(&x8)
            .pow2k(5).mul(&x_1001)
            .pow2k(6).mul(&x_1011)
            .pow2k(4).mul(&x_1101)
            .pow2k(5).mul(&x_11)
            .pow2k(6).mul(&x_1101)
            .pow2k(10).mul(&x_1101)
            .pow2k(4).mul(&x_1001)
            .pow2k(6).mul(&x_1)
            .pow2k(8).mul(&x6);

        CtOption::new(res, !self.is_zero())
    }

    /// Right-shifts the scalar. Constant time in the scalar, variable time
    /// in the shift amount.
    pub fn shr_vartime(&self, shift: usize) -> Self {
        let full_shifts = shift >> 6;
        let small_shift = shift & 0x3f;

        let mut res = [0u64; 4];

        if shift > 256 {
            return Self(res);
        }

        if small_shift == 0 {
            res[..(4 - full_shifts)].copy_from_slice(&self.0[full_shifts..]);
        } else {
            for i in 0..(4 - full_shifts) {
                let mut lo = self.0[i + full_shifts] >> small_shift;
                if i < 3 - full_shifts {
                    lo |= self.0[i + full_shifts + 1] << (64 - small_shift);
                }
                res[i] = lo;
            }
        }

        Self(res)
    }

    /// Conditionally adds 2^bit to the scalar.
    fn conditional_add_bit(&self, bit: usize, flag: Choice) -> Self {
        debug_assert!(bit < 256);

        // Scalar(1 << bit): since bit 255 of n is set, the sum stays in range.
        let bit_lo = bit & 0x3F;
        let w = Self([
            (((bit >> 6) == 0) as u64) << bit_lo,
            (((bit >> 6) == 1) as u64) << bit_lo,
            (((bit >> 6) == 2) as u64) << bit_lo,
            (((bit >> 6) == 3) as u64) << bit_lo,
        ]);

        Self::conditional_select(self, &self.add(&w), flag)
    }

    /// Multiplies `self` by `b` without reduction, divides by `2^shift`, and
    /// rounds to the nearest integer. Variable time in `shift` only.
    pub(crate) fn mul_shift_vartime(&self, b: &Self, shift: usize) -> Self {
        debug_assert!(shift >= 256);

        fn ifelse(c: bool, x: u64, y: u64) -> u64 {
            if c {
                x
            } else {
                y
            }
        }

        let l = self.mul_wide(b).0;
        let shiftlimbs = shift >> 6;
        let shiftlow = shift & 0x3F;
        let shifthigh = 64 - shiftlow;
        let r0 = ifelse(
            shift < 512,
            (l[shiftlimbs] >> shiftlow)
                | ifelse(
                    shift < 448 && shiftlow != 0,
                    l[1 + shiftlimbs] << shifthigh,
                    0,
                ),
            0,
        );
        let r1 = ifelse(
            shift < 448,
            (l[1 + shiftlimbs] >> shiftlow)
                | ifelse(
                    shift < 384 && shiftlow != 0,
                    l[2 + shiftlimbs] << shifthigh,
                    0,
                ),
            0,
        );
        let r2 = ifelse(
            shift < 384,
            (l[2 + shiftlimbs] >> shiftlow)
                | ifelse(
                    shift < 320 && shiftlow != 0,
                    l[3 + shiftlimbs] << shifthigh,
                    0,
                ),
            0,
        );
        let r3 = ifelse(shift < 320, l[3 + shiftlimbs] >> shiftlow, 0);

        let res = Self([r0, r1, r2, r3]);

        // Round up if the highmost discarded bit is set.
        let c = (l[(shift - 1) >> 6] >> ((shift - 1) & 0x3f)) & 1;
        res.conditional_add_bit(0, Choice::from(c as u8))
    }

    /// Multiplies two scalars without reduction, producing a 512-bit value.
    #[inline(always)]
    fn mul_wide(&self, rhs: &Self) -> WideScalar {
        // 160-bit accumulator.
        let c0 = 0;
        let c1 = 0;
        let c2 = 0;

        // l[0..7] = a[0..3] * b[0..3].
        let (c0, c1) = muladd_fast(self.0[0], rhs.0[0], c0, c1);
        let (l0, c0, c1) = (c0, c1, 0);
        let (c0, c1, c2) = muladd(self.0[0], rhs.0[1], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[1], rhs.0[0], c0, c1, c2);
        let (l1, c0, c1, c2) = (c0, c1, c2, 0);
        let (c0, c1, c2) = muladd(self.0[0], rhs.0[2], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[1], rhs.0[1], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[2], rhs.0[0], c0, c1, c2);
        let (l2, c0, c1, c2) = (c0, c1, c2, 0);
        let (c0, c1, c2) = muladd(self.0[0], rhs.0[3], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[1], rhs.0[2], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[2], rhs.0[1], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[3], rhs.0[0], c0, c1, c2);
        let (l3, c0, c1, c2) = (c0, c1, c2, 0);
        let (c0, c1, c2) = muladd(self.0[1], rhs.0[3], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[2], rhs.0[2], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[3], rhs.0[1], c0, c1, c2);
        let (l4, c0, c1, c2) = (c0, c1, c2, 0);
        let (c0, c1, c2) = muladd(self.0[2], rhs.0[3], c0, c1, c2);
        let (c0, c1, c2) = muladd(self.0[3], rhs.0[2], c0, c1, c2);
        let (l5, c0, c1, _c2) = (c0, c1, c2, 0);
        let (c0, c1) = muladd_fast(self.0[3], rhs.0[3], c0, c1);
        let (l6, c0, _c1) = (c0, c1, 0);
        let l7 = c0;

        WideScalar([l0, l1, l2, l3, l4, l5, l6, l7])
    }
}

impl From<u32> for Scalar {
    fn from(k: u32) -> Self {
        Self([k as u64, 0, 0, 0])
    }
}

impl From<u64> for Scalar {
    fn from(k: u64) -> Self {
        Self([k, 0, 0, 0])
    }
}

impl ConditionallySelectable for Scalar {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self(conditional_select(&a.0, &b.0, choice))
    }
}

impl ConstantTimeEq for Scalar {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0[0].ct_eq(&other.0[0])
            & self.0[1].ct_eq(&other.0[1])
            & self.0[2].ct_eq(&other.0[2])
            & self.0[3].ct_eq(&other.0[3])
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for Scalar {}

impl Zeroize for Scalar {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl Neg for Scalar {
    type Output = Scalar;

    fn neg(self) -> Scalar {
        self.negate()
    }
}

impl Neg for &Scalar {
    type Output = Scalar;

    fn neg(self) -> Scalar {
        self.negate()
    }
}

impl Add<Scalar> for Scalar {
    type Output = Scalar;

    fn add(self, other: Scalar) -> Scalar {
        Scalar::add(&self, &other)
    }
}

impl Add<&Scalar> for &Scalar {
    type Output = Scalar;

    fn add(self, other: &Scalar) -> Scalar {
        Scalar::add(self, other)
    }
}

impl Add<&Scalar> for Scalar {
    type Output = Scalar;

    fn add(self, other: &Scalar) -> Scalar {
        Scalar::add(&self, other)
    }
}

impl AddAssign<Scalar> for Scalar {
    fn add_assign(&mut self, rhs: Scalar) {
        *self = Scalar::add(self, &rhs);
    }
}

impl Sub<Scalar> for Scalar {
    type Output = Scalar;

    fn sub(self, other: Scalar) -> Scalar {
        Scalar::sub(&self, &other)
    }
}

impl Sub<&Scalar> for &Scalar {
    type Output = Scalar;

    fn sub(self, other: &Scalar) -> Scalar {
        Scalar::sub(self, other)
    }
}

impl Sub<&Scalar> for Scalar {
    type Output = Scalar;

    fn sub(self, other: &Scalar) -> Scalar {
        Scalar::sub(&self, other)
    }
}

impl SubAssign<Scalar> for Scalar {
    fn sub_assign(&mut self, rhs: Scalar) {
        *self = Scalar::sub(self, &rhs);
    }
}

impl Mul<Scalar> for Scalar {
    type Output = Scalar;

    fn mul(self, other: Scalar) -> Scalar {
        Scalar::mul(&self, &other)
    }
}

impl Mul<&Scalar> for &Scalar {
    type Output = Scalar;

    fn mul(self, other: &Scalar) -> Scalar {
        Scalar::mul(self, other)
    }
}

impl Mul<&Scalar> for Scalar {
    type Output = Scalar;

    fn mul(self, other: &Scalar) -> Scalar {
        Scalar::mul(&self, other)
    }
}

impl MulAssign<Scalar> for Scalar {
    fn mul_assign(&mut self, rhs: Scalar) {
        *self = Scalar::mul(self, &rhs);
    }
}

/// A 512-bit scalar product awaiting reduction modulo n.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct WideScalar(pub(crate) [u64; 8]);

impl WideScalar {
    pub fn from_bytes(bytes: &[u8; 64]) -> Self {
        let mut w = [0u64; 8];
        for i in 0..8 {
            w[i] = u64::from_be_bytes(
                bytes[((7 - i) * 8)..((7 - i) * 8 + 8)]
                    .try_into()
                    .expect("8 bytes"),
            );
        }
        Self(w)
    }

    /// Fully reduces the value modulo n.
    #[inline(always)]
    pub fn reduce(&self) -> Scalar {
        self.reduce_impl(false)
    }

    /// Fully reduces the value modulo n - 1. Used when deriving secret
    /// scalars from hashed material, where the result is later shifted into
    /// `[1, n)` by adding one.
    pub fn reduce_order_minus_one(&self) -> Scalar {
        self.reduce_impl(true)
    }

    fn reduce_impl(&self, modulus_minus_one: bool) -> Scalar {
        let neg_modulus0 = if modulus_minus_one {
            NEG_MODULUS[0] + 1
        } else {
            NEG_MODULUS[0]
        };
        let modulus = if modulus_minus_one {
            let (m, _) = sbb_array(&MODULUS, &[1, 0, 0, 0]);
            m
        } else {
            MODULUS
        };

        let n0 = self.0[4];
        let n1 = self.0[5];
        let n2 = self.0[6];
        let n3 = self.0[7];

        // Reduce 512 bits into 385:
        // m[0..6] = self[0..3] + n[0..3] * neg_modulus.
        let c0 = self.0[0];
        let c1 = 0;
        let c2 = 0;
        let (c0, c1) = muladd_fast(n0, neg_modulus0, c0, c1);
        let (m0, c0, c1) = (c0, c1, 0);
        let (c0, c1) = sumadd_fast(self.0[1], c0, c1);
        let (c0, c1, c2) = muladd(n1, neg_modulus0, c0, c1, c2);
        let (c0, c1, c2) = muladd(n0, NEG_MODULUS[1], c0, c1, c2);
        let (m1, c0, c1, c2) = (c0, c1, c2, 0);
        let (c0, c1, c2) = sumadd(self.0[2], c0, c1, c2);
        let (c0, c1, c2) = muladd(n2, neg_modulus0, c0, c1, c2);
        let (c0, c1, c2) = muladd(n1, NEG_MODULUS[1], c0, c1, c2);
        let (c0, c1, c2) = sumadd(n0, c0, c1, c2);
        let (m2, c0, c1, c2) = (c0, c1, c2, 0);
        let (c0, c1, c2) = sumadd(self.0[3], c0, c1, c2);
        let (c0, c1, c2) = muladd(n3, neg_modulus0, c0, c1, c2);
        let (c0, c1, c2) = muladd(n2, NEG_MODULUS[1], c0, c1, c2);
        let (c0, c1, c2) = sumadd(n1, c0, c1, c2);
        let (m3, c0, c1, c2) = (c0, c1, c2, 0);
        let (c0, c1, c2) = muladd(n3, NEG_MODULUS[1], c0, c1, c2);
        let (c0, c1, c2) = sumadd(n2, c0, c1, c2);
        let (m4, c0, c1, _c2) = (c0, c1, c2, 0);
        let (c0, c1) = sumadd_fast(n3, c0, c1);
        let (m5, c0, _c1) = (c0, c1, 0);
        debug_assert!(c0 <= 1);
        let m6 = c0;

        // Reduce 385 bits into 258:
        // p[0..4] = m[0..3] + m[4..6] * neg_modulus.
        let c0 = m0;
        let c1 = 0;
        let c2 = 0;
        let (c0, c1) = muladd_fast(m4, neg_modulus0, c0, c1);
        let (p0, c0, c1) = (c0, c1, 0);
        let (c0, c1) = sumadd_fast(m1, c0, c1);
        let (c0, c1, c2) = muladd(m5, neg_modulus0, c0, c1, c2);
        let (c0, c1, c2) = muladd(m4, NEG_MODULUS[1], c0, c1, c2);
        let (p1, c0, c1) = (c0, c1, 0);
        let (c0, c1, c2) = sumadd(m2, c0, c1, c2);
        let (c0, c1, c2) = muladd(m6, neg_modulus0, c0, c1, c2);
        let (c0, c1, c2) = muladd(m5, NEG_MODULUS[1], c0, c1, c2);
        let (c0, c1, c2) = sumadd(m4, c0, c1, c2);
        let (p2, c0, c1, _c2) = (c0, c1, c2, 0);
        let (c0, c1) = sumadd_fast(m3, c0, c1);
        let (c0, c1) = muladd_fast(m6, NEG_MODULUS[1], c0, c1);
        let (c0, c1) = sumadd_fast(m5, c0, c1);
        let (p3, c0, _c1) = (c0, c1, 0);
        let p4 = c0 + m6;
        debug_assert!(p4 <= 2);

        // Reduce 258 bits into 256:
        // r[0..3] = p[0..3] + p[4] * neg_modulus.
        let mut c = (p0 as u128) + (neg_modulus0 as u128) * (p4 as u128);
        let r0 = (c & 0xFFFFFFFFFFFFFFFFu128) as u64;
        c >>= 64;
        c += (p1 as u128) + (NEG_MODULUS[1] as u128) * (p4 as u128);
        let r1 = (c & 0xFFFFFFFFFFFFFFFFu128) as u64;
        c >>= 64;
        c += (p2 as u128) + (p4 as u128);
        let r2 = (c & 0xFFFFFFFFFFFFFFFFu128) as u64;
        c >>= 64;
        c += p3 as u128;
        let r3 = (c & 0xFFFFFFFFFFFFFFFFu128) as u64;
        c >>= 64;

        // Final conditional subtraction.
        let r = [r0, r1, r2, r3];
        let (r2, underflow) = sbb_array_with_underflow(&r, &modulus);
        let high_bit = Choice::from(c as u8);
        Scalar(conditional_select(&r, &r2, !underflow | high_bit))
    }
}

#[cfg(test)]
mod tests {
    use super::{Scalar, WideScalar, MODULUS};
    use num_bigint::BigUint;
    use num_traits::{One, Zero};
    use proptest::prelude::*;

    pub(crate) fn modulus() -> BigUint {
        let mut bytes = [0u8; 32];
        bytes[0..8].copy_from_slice(&MODULUS[3].to_be_bytes());
        bytes[8..16].copy_from_slice(&MODULUS[2].to_be_bytes());
        bytes[16..24].copy_from_slice(&MODULUS[1].to_be_bytes());
        bytes[24..32].copy_from_slice(&MODULUS[0].to_be_bytes());
        BigUint::from_bytes_be(&bytes)
    }

    fn to_biguint(s: &Scalar) -> BigUint {
        BigUint::from_bytes_be(&s.to_bytes())
    }

    fn from_biguint(x: &BigUint) -> Scalar {
        let bytes = x.to_bytes_be();
        assert!(bytes.len() <= 32);
        let mut padded = [0u8; 32];
        padded[32 - bytes.len()..].copy_from_slice(&bytes);
        Scalar::from_bytes(&padded).unwrap()
    }

    #[test]
    fn is_high() {
        assert!(!bool::from(Scalar::ZERO.is_high()));
        assert!(!bool::from(Scalar::ONE.is_high()));

        let m = modulus();
        let m_by_2 = &m >> 1;
        let one = BigUint::one();

        // n/2 is not high, n/2 + 1 is.
        assert!(!bool::from(from_biguint(&m_by_2).is_high()));
        assert!(bool::from(from_biguint(&(&m_by_2 + &one)).is_high()));
        assert!(bool::from(from_biguint(&(&m - &one)).is_high()));
    }

    #[test]
    fn negate() {
        assert_eq!(-Scalar::ZERO, Scalar::ZERO);

        let m = modulus();
        let one = BigUint::one();
        assert_eq!(-Scalar::ONE, from_biguint(&(&m - &one)));
        assert_eq!(-from_biguint(&(&m - &one)), Scalar::ONE);
    }

    #[test]
    fn add_result_within_256_bits() {
        // Regression: reduction must also fire when the unreduced sum lands
        // in [n, 2^256).
        let t = BigUint::one() << 255u32;
        let one = BigUint::one();

        let a = from_biguint(&(&t - &one));
        let b = from_biguint(&t);
        let res = &a + &b;

        let m = modulus();
        let res_ref = from_biguint(&((&t + &t - &one) % &m));
        assert_eq!(res, res_ref);
    }

    #[test]
    fn from_bytes_rejects_order() {
        let n_bytes = {
            let bytes = modulus().to_bytes_be();
            let mut out = [0u8; 32];
            out.copy_from_slice(&bytes);
            out
        };
        assert!(bool::from(Scalar::from_bytes(&n_bytes).is_none()));
        assert!(bool::from(Scalar::from_bytes_reduced(&n_bytes).is_zero()));
    }

    #[test]
    fn from_bytes_be_reports_overflow() {
        use crate::Error;

        let n_bytes = {
            let bytes = modulus().to_bytes_be();
            let mut out = [0u8; 32];
            out.copy_from_slice(&bytes);
            out
        };
        assert_eq!(
            Scalar::from_bytes_be(&n_bytes).unwrap_err(),
            Error::ScalarOverflow
        );
        assert_eq!(
            Scalar::from_bytes_be(&[0xff; 32]).unwrap_err(),
            Error::ScalarOverflow
        );
        assert_eq!(Scalar::from_bytes_be(&[0; 32]).unwrap(), Scalar::ZERO);
    }

    #[test]
    fn wide_reduction() {
        let s = Scalar::from_wide_bytes_reduced(&[0xff; 64]);
        assert!(to_biguint(&s) < modulus());

        let s = Scalar::from_wide_bytes_reduced(&[0; 64]);
        assert!(to_biguint(&s).is_zero());
    }

    #[test]
    fn reduce_order_minus_one() {
        // n - 1 reduces to zero modulo n - 1.
        let mut wide = [0u8; 64];
        let n_minus_1 = modulus() - BigUint::one();
        wide[32..].copy_from_slice(&n_minus_1.to_bytes_be());
        let r = WideScalar::from_bytes(&wide).reduce_order_minus_one();
        assert!(bool::from(r.is_zero()));
    }

    prop_compose! {
        fn scalar()(bytes in any::<[u8; 32]>()) -> Scalar {
            Scalar::from_bytes_reduced(&bytes)
        }
    }

    proptest! {
        #[test]
        fn fuzzy_round_trip(a in scalar()) {
            prop_assert_eq!(Scalar::from_bytes(&a.to_bytes()).unwrap(), a);
        }

        #[test]
        fn fuzzy_add(a in scalar(), b in scalar()) {
            let res = (to_biguint(&a) + to_biguint(&b)) % modulus();
            prop_assert_eq!(to_biguint(&a.add(&b)), res);
        }

        #[test]
        fn fuzzy_sub(a in scalar(), b in scalar()) {
            let m = modulus();
            let res = (&m + to_biguint(&a) - to_biguint(&b)) % &m;
            prop_assert_eq!(to_biguint(&a.sub(&b)), res);
        }

        #[test]
        fn fuzzy_neg(a in scalar()) {
            let m = modulus();
            let res = (&m - to_biguint(&a)) % &m;
            prop_assert_eq!(to_biguint(&-a), res);
        }

        #[test]
        fn fuzzy_mul(a in scalar(), b in scalar()) {
            let res = (to_biguint(&a) * to_biguint(&b)) % modulus();
            prop_assert_eq!(to_biguint(&a.mul(&b)), res);
        }

        #[test]
        fn fuzzy_invert(a in scalar()) {
            let a = if bool::from(a.is_zero()) { Scalar::ONE } else { a };
            let inv = a.invert().unwrap();
            let m = modulus();
            prop_assert_eq!((to_biguint(&inv) * to_biguint(&a)) % &m, BigUint::one());
        }

        #[test]
        fn fuzzy_rshift(a in scalar(), b in 0usize..512) {
            let res = to_biguint(&a) >> b;
            prop_assert_eq!(to_biguint(&a.shr_vartime(b)), res);
        }

        #[test]
        fn fuzzy_wide_reduction(hi in any::<[u8; 32]>(), lo in any::<[u8; 32]>()) {
            let mut bytes = [0u8; 64];
            bytes[..32].copy_from_slice(&hi);
            bytes[32..].copy_from_slice(&lo);
            let s = Scalar::from_wide_bytes_reduced(&bytes);
            let expected = BigUint::from_bytes_be(&bytes) % modulus();
            prop_assert_eq!(to_biguint(&s), expected);
        }
    }
}
