//! Field arithmetic modulo p = 2^256 - 2^32 - 977.
//!
//! Limb layout follows the 64-bit backend of
//! <https://github.com/bitcoin-core/secp256k1>: 5 little-endian limbs, the
//! first four holding 52 bits each in normalized form and the last 48 bits.
//! Elements carry a *magnitude*: additions and negations accumulate into the
//! spare limb bits and are only brought back under the modulus by
//! [`FieldElement::normalize`] (or weakly by `normalize_weak`). `mul` and
//! `square` accept operands of magnitude up to 8 and produce magnitude 1.

use crate::{Error, Result};
use core::ops::{Add, AddAssign, Mul, MulAssign};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};
use zeroize::Zeroize;

/// An element of the secp256k1 base field.
#[derive(Clone, Copy, Debug)]
pub struct FieldElement(pub(crate) [u64; 5]);

impl FieldElement {
    /// Additive identity.
    pub const ZERO: Self = Self([0, 0, 0, 0, 0]);

    /// Multiplicative identity.
    pub const ONE: Self = Self([1, 0, 0, 0, 0]);

    /// Parses a big-endian byte array without checking the range.
    pub(crate) const fn from_bytes_unchecked(bytes: &[u8; 32]) -> Self {
        let w0 = (bytes[31] as u64)
            | ((bytes[30] as u64) << 8)
            | ((bytes[29] as u64) << 16)
            | ((bytes[28] as u64) << 24)
            | ((bytes[27] as u64) << 32)
            | ((bytes[26] as u64) << 40)
            | (((bytes[25] & 0xF) as u64) << 48);

        let w1 = ((bytes[25] >> 4) as u64)
            | ((bytes[24] as u64) << 4)
            | ((bytes[23] as u64) << 12)
            | ((bytes[22] as u64) << 20)
            | ((bytes[21] as u64) << 28)
            | ((bytes[20] as u64) << 36)
            | ((bytes[19] as u64) << 44);

        let w2 = (bytes[18] as u64)
            | ((bytes[17] as u64) << 8)
            | ((bytes[16] as u64) << 16)
            | ((bytes[15] as u64) << 24)
            | ((bytes[14] as u64) << 32)
            | ((bytes[13] as u64) << 40)
            | (((bytes[12] & 0xF) as u64) << 48);

        let w3 = ((bytes[12] >> 4) as u64)
            | ((bytes[11] as u64) << 4)
            | ((bytes[10] as u64) << 12)
            | ((bytes[9] as u64) << 20)
            | ((bytes[8] as u64) << 28)
            | ((bytes[7] as u64) << 36)
            | ((bytes[6] as u64) << 44);

        let w4 = (bytes[5] as u64)
            | ((bytes[4] as u64) << 8)
            | ((bytes[3] as u64) << 16)
            | ((bytes[2] as u64) << 24)
            | ((bytes[1] as u64) << 32)
            | ((bytes[0] as u64) << 40);

        Self([w0, w1, w2, w3, w4])
    }

    /// Parses a big-endian byte array as a field element.
    ///
    /// Returns `None` if the integer is not in the range `[0, p)`.
    pub fn from_bytes(bytes: &[u8; 32]) -> CtOption<Self> {
        let res = Self::from_bytes_unchecked(bytes);
        CtOption::new(res, !res.get_overflow())
    }

    /// Parses a big-endian byte array as a field element, reporting values
    /// greater than or equal to p as [`Error::FieldOverflow`].
    ///
    /// This is the fallible boundary form of [`Self::from_bytes`] for
    /// callers working with `Result` rather than `CtOption`.
    pub fn from_bytes_be(bytes: &[u8; 32]) -> Result<Self> {
        Option::from(Self::from_bytes(bytes)).ok_or(Error::FieldOverflow)
    }

    pub(crate) const fn from_u64(val: u64) -> Self {
        let w0 = val & 0xFFFFFFFFFFFFF;
        let w1 = val >> 52;
        Self([w0, w1, 0, 0, 0])
    }

    /// Returns the big-endian encoding of this field element.
    ///
    /// The element is normalized before serialization, so any magnitude is
    /// accepted.
    pub fn to_bytes(&self) -> [u8; 32] {
        let f = self.normalize();
        let mut ret = [0u8; 32];
        ret[0] = (f.0[4] >> 40) as u8;
        ret[1] = (f.0[4] >> 32) as u8;
        ret[2] = (f.0[4] >> 24) as u8;
        ret[3] = (f.0[4] >> 16) as u8;
        ret[4] = (f.0[4] >> 8) as u8;
        ret[5] = f.0[4] as u8;
        ret[6] = (f.0[3] >> 44) as u8;
        ret[7] = (f.0[3] >> 36) as u8;
        ret[8] = (f.0[3] >> 28) as u8;
        ret[9] = (f.0[3] >> 20) as u8;
        ret[10] = (f.0[3] >> 12) as u8;
        ret[11] = (f.0[3] >> 4) as u8;
        ret[12] = ((f.0[2] >> 48) as u8 & 0xF) | ((f.0[3] as u8 & 0xF) << 4);
        ret[13] = (f.0[2] >> 40) as u8;
        ret[14] = (f.0[2] >> 32) as u8;
        ret[15] = (f.0[2] >> 24) as u8;
        ret[16] = (f.0[2] >> 16) as u8;
        ret[17] = (f.0[2] >> 8) as u8;
        ret[18] = f.0[2] as u8;
        ret[19] = (f.0[1] >> 44) as u8;
        ret[20] = (f.0[1] >> 36) as u8;
        ret[21] = (f.0[1] >> 28) as u8;
        ret[22] = (f.0[1] >> 20) as u8;
        ret[23] = (f.0[1] >> 12) as u8;
        ret[24] = (f.0[1] >> 4) as u8;
        ret[25] = ((f.0[0] >> 48) as u8 & 0xF) | ((f.0[1] as u8 & 0xF) << 4);
        ret[26] = (f.0[0] >> 40) as u8;
        ret[27] = (f.0[0] >> 32) as u8;
        ret[28] = (f.0[0] >> 24) as u8;
        ret[29] = (f.0[0] >> 16) as u8;
        ret[30] = (f.0[0] >> 8) as u8;
        ret[31] = f.0[0] as u8;
        ret
    }

    /// Adds `x * (2^256 - p)`, propagating excess bits up the limbs.
    fn add_modulus_correction(&self, x: u64) -> Self {
        let t0 = self.0[0] + x * 0x1000003D1u64;

        let t1 = self.0[1] + (t0 >> 52);
        let t0 = t0 & 0xFFFFFFFFFFFFFu64;

        let t2 = self.0[2] + (t1 >> 52);
        let t1 = t1 & 0xFFFFFFFFFFFFFu64;

        let t3 = self.0[3] + (t2 >> 52);
        let t2 = t2 & 0xFFFFFFFFFFFFFu64;

        let t4 = self.0[4] + (t3 >> 52);
        let t3 = t3 & 0xFFFFFFFFFFFFFu64;

        Self([t0, t1, t2, t3, t4])
    }

    /// Strips the overflow above bit 256 from the last limb and returns it
    /// alongside the truncated element, i.e. subtracts a multiple of 2^256.
    fn subtract_modulus_approximation(&self) -> (Self, u64) {
        let x = self.0[4] >> 48;
        let t4 = self.0[4] & 0x0FFFFFFFFFFFFu64;
        (Self([self.0[0], self.0[1], self.0[2], self.0[3], t4]), x)
    }

    /// Is this (magnitude 1) value greater than or equal to p?
    fn get_overflow(&self) -> Choice {
        let m = self.0[1] & self.0[2] & self.0[3];
        let x = (self.0[4] >> 48 != 0)
            | ((self.0[4] == 0x0FFFFFFFFFFFFu64)
                & (m == 0xFFFFFFFFFFFFFu64)
                & (self.0[0] >= 0xFFFFEFFFFFC2Fu64));
        Choice::from(x as u8)
    }

    /// Brings the magnitude down to 1 without fully reducing below p.
    pub fn normalize_weak(&self) -> Self {
        // Reduce t4 first so at most a single carry results from the pass.
        let (t, x) = self.subtract_modulus_approximation();
        let res = t.add_modulus_correction(x);

        // Only a possible carry at bit 48 of the last limb remains.
        debug_assert!(res.0[4] >> 49 == 0);

        res
    }

    /// Fully normalizes the element: magnitude 1 and value below p.
    pub fn normalize(&self) -> Self {
        let res = self.normalize_weak();
        let overflow = res.get_overflow();

        // The final reduction runs unconditionally to stay constant-time.
        let res_corrected = res.add_modulus_correction(1u64);
        let (res_corrected, x) = res_corrected.subtract_modulus_approximation();
        debug_assert!(x == (overflow.unwrap_u8() as u64));

        Self::conditional_select(&res, &res_corrected, overflow)
    }

    /// Does this element become zero when normalized?
    pub fn normalizes_to_zero(&self) -> Choice {
        let res = self.normalize_weak();

        let t0 = res.0[0];
        let t1 = res.0[1];
        let t2 = res.0[2];
        let t3 = res.0[3];
        let t4 = res.0[4];

        // z0 tracks a raw value of 0, z1 a raw value of p.
        let z0 = t0 | t1 | t2 | t3 | t4;
        let z1 = (t0 ^ 0x1000003D0u64) & t1 & t2 & t3 & (t4 ^ 0xF000000000000u64);

        Choice::from(((z0 == 0) | (z1 == 0xFFFFFFFFFFFFFu64)) as u8)
    }

    /// Is this element zero? Accepts operands of any magnitude.
    pub fn is_zero(&self) -> Choice {
        self.normalizes_to_zero()
    }

    /// Is this element odd, as an integer in `[0, p)`?
    pub fn is_odd(&self) -> Choice {
        (self.normalize().0[0] as u8 & 1).into()
    }

    /// Is this element even?
    pub fn is_even(&self) -> Choice {
        !self.is_odd()
    }

    /// Returns -self, treating it as a value of the given magnitude, which
    /// must be at least the actual magnitude of `self`. Raises the magnitude
    /// by 1.
    pub const fn negate(&self, magnitude: u32) -> Self {
        let m = (magnitude + 1) as u64;
        let r0 = 0xFFFFEFFFFFC2Fu64 * 2 * m - self.0[0];
        let r1 = 0xFFFFFFFFFFFFFu64 * 2 * m - self.0[1];
        let r2 = 0xFFFFFFFFFFFFFu64 * 2 * m - self.0[2];
        let r3 = 0xFFFFFFFFFFFFFu64 * 2 * m - self.0[3];
        let r4 = 0x0FFFFFFFFFFFFu64 * 2 * m - self.0[4];
        Self([r0, r1, r2, r3, r4])
    }

    /// Returns self + rhs. Sums the magnitudes.
    pub const fn add(&self, rhs: &Self) -> Self {
        Self([
            self.0[0] + rhs.0[0],
            self.0[1] + rhs.0[1],
            self.0[2] + rhs.0[2],
            self.0[3] + rhs.0[3],
            self.0[4] + rhs.0[4],
        ])
    }

    /// Returns 2 * self. Doubles the magnitude.
    pub const fn double(&self) -> Self {
        self.add(self)
    }

    /// Multiplies by a small integer. Multiplies the magnitude by it.
    pub const fn mul_single(&self, rhs: u32) -> Self {
        let rhs = rhs as u64;
        Self([
            self.0[0] * rhs,
            self.0[1] * rhs,
            self.0[2] * rhs,
            self.0[3] * rhs,
            self.0[4] * rhs,
        ])
    }

    /// Shared body of `mul` and `square`, inlined so the compiler can exploit
    /// equal arguments in the squaring case.
    #[inline(always)]
    fn mul_inner(&self, rhs: &Self) -> Self {
        let a0 = self.0[0] as u128;
        let a1 = self.0[1] as u128;
        let a2 = self.0[2] as u128;
        let a3 = self.0[3] as u128;
        let a4 = self.0[4] as u128;
        let b0 = rhs.0[0] as u128;
        let b1 = rhs.0[1] as u128;
        let b2 = rhs.0[2] as u128;
        let b3 = rhs.0[3] as u128;
        let b4 = rhs.0[4] as u128;
        let m = 0xFFFFFFFFFFFFFu128;
        let r = 0x1000003D10u128;

        debug_assert!(a0 >> 56 == 0);
        debug_assert!(a1 >> 56 == 0);
        debug_assert!(a2 >> 56 == 0);
        debug_assert!(a3 >> 56 == 0);
        debug_assert!(a4 >> 52 == 0);

        debug_assert!(b0 >> 56 == 0);
        debug_assert!(b1 >> 56 == 0);
        debug_assert!(b2 >> 56 == 0);
        debug_assert!(b3 >> 56 == 0);
        debug_assert!(b4 >> 52 == 0);

        // [... a b c] is shorthand for ... + a<<104 + b<<52 + c modulo p;
        // px is the sum of products a[i]*b[x-i] contributing at position x.
        // Note that [x 0 0 0 0 0] = [x*r].

        let mut d = a0 * b3 + a1 * b2 + a2 * b1 + a3 * b0;
        debug_assert!(d >> 114 == 0);
        let mut c = a4 * b4;
        debug_assert!(c >> 112 == 0);
        d += (c & m) * r;
        c >>= 52;
        debug_assert!(d >> 115 == 0);
        debug_assert!(c >> 60 == 0);
        let c64 = c as u64;
        let t3 = (d & m) as u64;
        d >>= 52;
        debug_assert!(t3 >> 52 == 0);
        debug_assert!(d >> 63 == 0);
        let d64 = d as u64;

        d = d64 as u128 + a0 * b4 + a1 * b3 + a2 * b2 + a3 * b1 + a4 * b0;
        debug_assert!(d >> 115 == 0);
        d += c64 as u128 * r;
        debug_assert!(d >> 116 == 0);
        let t4 = (d & m) as u64;
        d >>= 52;
        debug_assert!(t4 >> 52 == 0);
        debug_assert!(d >> 64 == 0);
        let d64 = d as u64;
        let tx = t4 >> 48;
        let t4 = t4 & ((m as u64) >> 4);
        debug_assert!(tx >> 4 == 0);
        debug_assert!(t4 >> 48 == 0);

        c = a0 * b0;
        debug_assert!(c >> 112 == 0);
        d = d64 as u128 + a1 * b4 + a2 * b3 + a3 * b2 + a4 * b1;
        debug_assert!(d >> 115 == 0);
        let u0 = (d & m) as u64;
        d >>= 52;
        debug_assert!(u0 >> 52 == 0);
        debug_assert!(d >> 63 == 0);
        let d64 = d as u64;
        let u0 = (u0 << 4) | tx;
        debug_assert!(u0 >> 56 == 0);
        c += u0 as u128 * ((r as u64) >> 4) as u128;
        debug_assert!(c >> 115 == 0);
        let r0 = (c & m) as u64;
        c >>= 52;
        debug_assert!(r0 >> 52 == 0);
        debug_assert!(c >> 61 == 0);
        let c64 = c as u64;

        c = c64 as u128 + a0 * b1 + a1 * b0;
        debug_assert!(c >> 114 == 0);
        d = d64 as u128 + a2 * b4 + a3 * b3 + a4 * b2;
        debug_assert!(d >> 114 == 0);
        c += (d & m) * r;
        d >>= 52;
        debug_assert!(c >> 115 == 0);
        debug_assert!(d >> 62 == 0);
        let d64 = d as u64;
        let r1 = (c & m) as u64;
        c >>= 52;
        debug_assert!(r1 >> 52 == 0);
        debug_assert!(c >> 63 == 0);
        let c64 = c as u64;

        c = c64 as u128 + a0 * b2 + a1 * b1 + a2 * b0;
        debug_assert!(c >> 114 == 0);
        d = d64 as u128 + a3 * b4 + a4 * b3;
        debug_assert!(d >> 114 == 0);
        c += (d & m) * r;
        d >>= 52;
        debug_assert!(c >> 115 == 0);
        debug_assert!(d >> 62 == 0);
        let d64 = d as u64;

        let r2 = (c & m) as u64;
        c >>= 52;
        debug_assert!(r2 >> 52 == 0);
        debug_assert!(c >> 63 == 0);
        let c64 = c as u64;
        c = c64 as u128 + (d64 as u128) * r + t3 as u128;
        debug_assert!(c >> 100 == 0);
        let r3 = (c & m) as u64;
        c >>= 52;
        debug_assert!(r3 >> 52 == 0);
        debug_assert!(c >> 48 == 0);
        let c64 = c as u64;
        c = c64 as u128 + t4 as u128;
        debug_assert!(c >> 49 == 0);
        let r4 = c as u64;
        debug_assert!(r4 >> 49 == 0);

        Self([r0, r1, r2, r3, r4])
    }

    /// Returns self * rhs. Operand magnitudes must be at most 8; the result
    /// has magnitude 1 but is not normalized.
    #[inline(always)]
    pub fn mul(&self, rhs: &Self) -> Self {
        self.mul_inner(rhs)
    }

    /// Returns self * self, with the same magnitude contract as [`Self::mul`].
    pub fn square(&self) -> Self {
        self.mul_inner(self)
    }

    /// Returns the multiplicative inverse, if `self` is non-zero.
    pub fn invert(&self) -> CtOption<Self> {
        // The binary representation of p - 2 has 5 blocks of 1s, with lengths
        // in { 1, 2, 22, 223 }. Use an addition chain to calculate 2^n - 1
        // for each block: [1], [2], 3, 6, 9, 11, [22], 44, 88, 176, 220, [223].

        let x2 = self.square().mul(self);
        let x3 = x2.square().mul(self);

        let mut x6 = x3;
        for _ in 0..3 {
            x6 = x6.square();
        }
        x6 = x6.mul(&x3);

        let mut x9 = x6;
        for _ in 0..3 {
            x9 = x9.square();
        }
        x9 = x9.mul(&x3);

        let mut x11 = x9;
        for _ in 0..2 {
            x11 = x11.square();
        }
        x11 = x11.mul(&x2);

        let mut x22 = x11;
        for _ in 0..11 {
            x22 = x22.square();
        }
        x22 = x22.mul(&x11);

        let mut x44 = x22;
        for _ in 0..22 {
            x44 = x44.square();
        }
        x44 = x44.mul(&x22);

        let mut x88 = x44;
        for _ in 0..44 {
            x88 = x88.square();
        }
        x88 = x88.mul(&x44);

        let mut x176 = x88;
        for _ in 0..88 {
            x176 = x176.square();
        }
        x176 = x176.mul(&x88);

        let mut x220 = x176;
        for _ in 0..44 {
            x220 = x220.square();
        }
        x220 = x220.mul(&x44);

        let mut x223 = x220;
        for _ in 0..3 {
            x223 = x223.square();
        }
        x223 = x223.mul(&x3);

        // The result is assembled with a sliding window over the blocks.
        let mut t1 = x223;
        for _ in 0..23 {
            t1 = t1.square();
        }
        t1 = t1.mul(&x22);
        for _ in 0..5 {
            t1 = t1.square();
        }
        t1 = t1.mul(self);
        for _ in 0..3 {
            t1 = t1.square();
        }
        t1 = t1.mul(&x2);
        for _ in 0..2 {
            t1 = t1.square();
        }
        t1 = t1.mul(self);

        CtOption::new(t1, !self.normalizes_to_zero())
    }

    /// Returns a square root of self, if one exists.
    ///
    /// Since p ≡ 3 (mod 4) the candidate root is self^((p+1)/4); squaring it
    /// back distinguishes residues from non-residues. When a root exists the
    /// other one is its negation; callers pick by parity.
    pub fn sqrt(&self) -> CtOption<Self> {
        // (p + 1)/4 has 3 blocks of 1s, with lengths in { 2, 22, 223 },
        // reusing the same 2^n - 1 chain as `invert`.

        let x2 = self.square().mul(self);
        let x3 = x2.square().mul(self);

        let mut x6 = x3;
        for _ in 0..3 {
            x6 = x6.square();
        }
        x6 = x6.mul(&x3);

        let mut x9 = x6;
        for _ in 0..3 {
            x9 = x9.square();
        }
        x9 = x9.mul(&x3);

        let mut x11 = x9;
        for _ in 0..2 {
            x11 = x11.square();
        }
        x11 = x11.mul(&x2);

        let mut x22 = x11;
        for _ in 0..11 {
            x22 = x22.square();
        }
        x22 = x22.mul(&x11);

        let mut x44 = x22;
        for _ in 0..22 {
            x44 = x44.square();
        }
        x44 = x44.mul(&x22);

        let mut x88 = x44;
        for _ in 0..44 {
            x88 = x88.square();
        }
        x88 = x88.mul(&x44);

        let mut x176 = x88;
        for _ in 0..88 {
            x176 = x176.square();
        }
        x176 = x176.mul(&x88);

        let mut x220 = x176;
        for _ in 0..44 {
            x220 = x220.square();
        }
        x220 = x220.mul(&x44);

        let mut x223 = x220;
        for _ in 0..3 {
            x223 = x223.square();
        }
        x223 = x223.mul(&x3);

        let mut t1 = x223;
        for _ in 0..23 {
            t1 = t1.square();
        }
        t1 = t1.mul(&x22);
        for _ in 0..6 {
            t1 = t1.square();
        }
        t1 = t1.mul(&x2);
        t1 = t1.square();
        let sqrt = t1.square();

        CtOption::new(sqrt, (&sqrt * &sqrt).normalize().ct_eq(&self.normalize()))
    }

    /// Raises the element to the power of the given little-endian limbed
    /// exponent. Variable time in the exponent, which must be public.
    pub fn pow_vartime(&self, exp: &[u64; 4]) -> Self {
        let mut res = Self::ONE;
        for limb in exp.iter().rev() {
            for i in (0..64).rev() {
                res = res.square();
                if (limb >> i) & 1 == 1 {
                    res = res.mul(self);
                }
            }
        }
        res
    }
}

impl Default for FieldElement {
    fn default() -> Self {
        Self::ZERO
    }
}

impl ConditionallySelectable for FieldElement {
    #[inline(always)]
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self([
            u64::conditional_select(&a.0[0], &b.0[0], choice),
            u64::conditional_select(&a.0[1], &b.0[1], choice),
            u64::conditional_select(&a.0[2], &b.0[2], choice),
            u64::conditional_select(&a.0[3], &b.0[3], choice),
            u64::conditional_select(&a.0[4], &b.0[4], choice),
        ])
    }
}

impl ConstantTimeEq for FieldElement {
    /// Limb-wise comparison; both operands must be normalized.
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0[0].ct_eq(&other.0[0])
            & self.0[1].ct_eq(&other.0[1])
            & self.0[2].ct_eq(&other.0[2])
            & self.0[3].ct_eq(&other.0[3])
            & self.0[4].ct_eq(&other.0[4])
    }
}

impl PartialEq for FieldElement {
    fn eq(&self, other: &Self) -> bool {
        self.normalize().ct_eq(&other.normalize()).into()
    }
}

impl Eq for FieldElement {}

impl Zeroize for FieldElement {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl Add<&FieldElement> for &FieldElement {
    type Output = FieldElement;

    fn add(self, other: &FieldElement) -> FieldElement {
        FieldElement::add(self, other)
    }
}

impl Add<&FieldElement> for FieldElement {
    type Output = FieldElement;

    fn add(self, other: &FieldElement) -> FieldElement {
        FieldElement::add(&self, other)
    }
}

impl AddAssign<FieldElement> for FieldElement {
    fn add_assign(&mut self, rhs: FieldElement) {
        *self = FieldElement::add(self, &rhs);
    }
}

impl Mul<&FieldElement> for &FieldElement {
    type Output = FieldElement;

    fn mul(self, other: &FieldElement) -> FieldElement {
        FieldElement::mul(self, other)
    }
}

impl Mul<&FieldElement> for FieldElement {
    type Output = FieldElement;

    fn mul(self, other: &FieldElement) -> FieldElement {
        FieldElement::mul(&self, other)
    }
}

impl MulAssign<FieldElement> for FieldElement {
    fn mul_assign(&mut self, rhs: FieldElement) {
        *self = FieldElement::mul(self, &rhs);
    }
}
