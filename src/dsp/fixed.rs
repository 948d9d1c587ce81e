use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Shl, Shr, Sub, SubAssign};

/*
Q-format fixed point
====================

Every signal in the engine is an `i32` with an implied binary point:
`Fixed<FRAC>` stores value * 2^FRAC. Two scales carry almost everything:

  Fixed<14> (Audio)   bipolar signals and control values, unity = 16384.
                      Comfortable headroom: +-2^17 before the i32 overflows.

  Fixed<24> (Phase)   envelope phase in [0, 1]. The extra fractional bits
                      keep slow ramps (a one-second attack is a delta of
                      2^24 / 40000 = 419 bits per tick) from quantizing
                      audibly.

Arithmetic keeps the binary point of the LEFT operand. Multiplication and
division go through an i64 intermediate and shift back down by FRAC, so

    Fixed<14>(0.5) * Fixed<14>(0.5) == Fixed<14>(0.25)

Overflow wraps with two's-complement semantics. There is no saturation:
callers pick widths and scales so the expected signal range fits. Conversions to and from f32 are lossy and exist
for the UI and calibration boundaries only; nothing on the tick path touches
a float.
*/

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Fixed<const FRAC: u32>(i32);

/// Bipolar audio/control scale, unity at 2^14.
pub type Audio = Fixed<14>;

/// Envelope phase scale, unity at 2^24.
pub type Phase = Fixed<24>;

impl<const FRAC: u32> Fixed<FRAC> {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(1 << FRAC);

    #[inline]
    pub const fn from_bits(bits: i32) -> Self {
        Self(bits)
    }

    #[inline]
    pub const fn to_bits(self) -> i32 {
        self.0
    }

    #[inline]
    pub const fn from_int(v: i32) -> Self {
        Self(v.wrapping_shl(FRAC))
    }

    /// Lossy; UI and calibration boundaries only.
    #[inline]
    pub fn from_f32(v: f32) -> Self {
        Self((v * (1i64 << FRAC) as f32) as i32)
    }

    /// Lossy; UI and calibration boundaries only.
    #[inline]
    pub fn to_f32(self) -> f32 {
        self.0 as f32 / (1i64 << FRAC) as f32
    }

    /// Integer part, truncated toward negative infinity.
    #[inline]
    pub const fn floor(self) -> i32 {
        self.0 >> FRAC
    }

    /// Fractional bits below the binary point.
    #[inline]
    pub const fn frac_bits(self) -> i32 {
        self.0 & ((1 << FRAC) - 1)
    }

    /// Move the binary point, shifting bits to preserve the value.
    #[inline]
    pub fn rescale<const TO: u32>(self) -> Fixed<TO> {
        if TO >= FRAC {
            Fixed::<TO>(self.0.wrapping_shl(TO - FRAC))
        } else {
            Fixed::<TO>(self.0 >> (FRAC - TO))
        }
    }

    #[inline]
    pub const fn abs(self) -> Self {
        Self(self.0.wrapping_abs())
    }

    #[inline]
    pub fn clamp(self, lo: Self, hi: Self) -> Self {
        Self(self.0.clamp(lo.0, hi.0))
    }
}

impl<const FRAC: u32> Add for Fixed<FRAC> {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0.wrapping_add(rhs.0))
    }
}

impl<const FRAC: u32> Sub for Fixed<FRAC> {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(self.0.wrapping_sub(rhs.0))
    }
}

impl<const FRAC: u32> AddAssign for Fixed<FRAC> {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.wrapping_add(rhs.0);
    }
}

impl<const FRAC: u32> SubAssign for Fixed<FRAC> {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.0 = self.0.wrapping_sub(rhs.0);
    }
}

impl<const FRAC: u32> Neg for Fixed<FRAC> {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self(self.0.wrapping_neg())
    }
}

impl<const FRAC: u32> Mul for Fixed<FRAC> {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self(((self.0 as i64 * rhs.0 as i64) >> FRAC) as i32)
    }
}

impl<const FRAC: u32> Div for Fixed<FRAC> {
    type Output = Self;
    #[inline]
    fn div(self, rhs: Self) -> Self {
        Self((((self.0 as i64) << FRAC) / rhs.0 as i64) as i32)
    }
}

/// Scalar scale without moving the binary point.
impl<const FRAC: u32> Mul<i32> for Fixed<FRAC> {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: i32) -> Self {
        Self(self.0.wrapping_mul(rhs))
    }
}

/// Scalar divide without moving the binary point.
impl<const FRAC: u32> Div<i32> for Fixed<FRAC> {
    type Output = Self;
    #[inline]
    fn div(self, rhs: i32) -> Self {
        Self(self.0 / rhs)
    }
}

impl<const FRAC: u32> Shl<u32> for Fixed<FRAC> {
    type Output = Self;
    #[inline]
    fn shl(self, rhs: u32) -> Self {
        Self(self.0.wrapping_shl(rhs))
    }
}

impl<const FRAC: u32> Shr<u32> for Fixed<FRAC> {
    type Output = Self;
    #[inline]
    fn shr(self, rhs: u32) -> Self {
        Self(self.0 >> rhs)
    }
}

impl<const FRAC: u32> fmt::Debug for Fixed<FRAC> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}q{}", self.to_f32(), FRAC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplication_rescales() {
        let half = Audio::from_f32(0.5);
        let quarter = half * half;
        assert_eq!(quarter, Audio::from_f32(0.25));
    }

    #[test]
    fn division_rescales() {
        let three = Audio::from_int(3);
        let two = Audio::from_int(2);
        assert_eq!(three / two, Audio::from_f32(1.5));
    }

    #[test]
    fn rescale_preserves_value_across_scales() {
        let p = Phase::from_f32(0.375);
        let a: Audio = p.rescale();
        assert_eq!(a, Audio::from_f32(0.375));
        let back: Phase = a.rescale();
        assert_eq!(back, p);
    }

    #[test]
    fn arithmetic_wraps_not_saturates() {
        let big = Audio::from_bits(i32::MAX);
        let one = Audio::from_bits(1);
        assert_eq!((big + one).to_bits(), i32::MIN);
    }

    #[test]
    fn floor_truncates_toward_negative_infinity() {
        assert_eq!(Audio::from_f32(2.75).floor(), 2);
        assert_eq!(Audio::from_f32(-0.25).floor(), -1);
    }

    #[test]
    fn scalar_ops_keep_the_point() {
        let v = Audio::from_f32(0.25) * 3;
        assert_eq!(v, Audio::from_f32(0.75));
        assert_eq!(v / 3, Audio::from_f32(0.25));
    }
}
