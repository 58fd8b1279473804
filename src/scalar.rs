//! Scalar algebra shared by every kernel.
//!
//! Kernels are written once against [`ComplexField`] and instantiated for `f32`, `f64`, [`c32`]
//! and [`c64`]. Real types implement the trait with a zero imaginary part, so the conjugate
//! transpose degenerates to the plain transpose.

use bytemuck::Pod;
use core::{
    fmt::Debug,
    ops::{Add, Div, Mul, Neg, Sub},
};

#[allow(non_camel_case_types)]
pub type c32 = num_complex::Complex32;
#[allow(non_camel_case_types)]
pub type c64 = num_complex::Complex64;

/// Unified trait for real and complex numbers.
pub trait ComplexField:
    Copy
    + PartialEq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + Send
    + Sync
    + Debug
    + Pod
    + 'static
{
    type Real: RealField;

    /// `true` for the complex types.
    const IS_COMPLEX: bool;

    /// Returns a complex number whose real part is equal to `real`, and a zero imaginary part.
    fn from_real(real: Self::Real) -> Self;
    /// Returns a complex number with the given real and imaginary parts.
    ///
    /// The imaginary part is ignored for real types.
    fn from_real_imag(real: Self::Real, imag: Self::Real) -> Self;
    /// Returns the real and imaginary part.
    fn into_real_imag(self) -> (Self::Real, Self::Real);
    /// Returns the real part.
    #[inline(always)]
    fn real(self) -> Self::Real {
        self.into_real_imag().0
    }
    /// Returns the imaginary part.
    #[inline(always)]
    fn imag(self) -> Self::Real {
        self.into_real_imag().1
    }

    /// Returns the value representing `0.0`.
    fn zero() -> Self;
    /// Returns the value representing `1.0`.
    fn one() -> Self;

    /// Returns the inverse of the number.
    fn inv(self) -> Self;
    /// Returns the conjugate of the number.
    fn conj(self) -> Self;

    /// Returns the input, scaled by `factor`.
    #[inline(always)]
    fn scale_real(self, factor: Self::Real) -> Self {
        let (re, im) = self.into_real_imag();
        Self::from_real_imag(re * factor, im * factor)
    }

    /// Returns the squared norm of the number.
    #[inline(always)]
    fn abs2(self) -> Self::Real {
        let (re, im) = self.into_real_imag();
        re * re + im * im
    }

    /// Returns the norm of the number.
    fn abs(self) -> Self::Real;

    /// Converts a double precision constant, truncating it for single precision types.
    fn from_f64(value: f64) -> Self;

    #[inline(always)]
    fn is_zero(self) -> bool {
        self == Self::zero()
    }
}

/// Unified trait for real numbers.
pub trait RealField: ComplexField<Real = Self> + PartialOrd {
    fn sqrt(self) -> Self;
    /// Machine epsilon.
    fn epsilon() -> Self;
    /// Smallest positive normal number.
    fn min_positive() -> Self;
    fn to_f64(self) -> f64;

    #[inline(always)]
    fn max(self, other: Self) -> Self {
        if self >= other {
            self
        } else {
            other
        }
    }
}

macro_rules! impl_real {
    ($real: ty) => {
        impl ComplexField for $real {
            type Real = $real;
            const IS_COMPLEX: bool = false;

            #[inline(always)]
            fn from_real(real: Self::Real) -> Self {
                real
            }
            #[inline(always)]
            fn from_real_imag(real: Self::Real, _imag: Self::Real) -> Self {
                real
            }
            #[inline(always)]
            fn into_real_imag(self) -> (Self::Real, Self::Real) {
                (self, 0.0)
            }
            #[inline(always)]
            fn zero() -> Self {
                0.0
            }
            #[inline(always)]
            fn one() -> Self {
                1.0
            }
            #[inline(always)]
            fn inv(self) -> Self {
                1.0 / self
            }
            #[inline(always)]
            fn conj(self) -> Self {
                self
            }
            #[inline(always)]
            fn abs2(self) -> Self::Real {
                self * self
            }
            #[inline(always)]
            fn abs(self) -> Self::Real {
                <$real>::abs(self)
            }
            #[inline(always)]
            fn from_f64(value: f64) -> Self {
                value as $real
            }
        }

        impl RealField for $real {
            #[inline(always)]
            fn sqrt(self) -> Self {
                <$real>::sqrt(self)
            }
            #[inline(always)]
            fn epsilon() -> Self {
                <$real>::EPSILON
            }
            #[inline(always)]
            fn min_positive() -> Self {
                <$real>::MIN_POSITIVE
            }
            #[inline(always)]
            fn to_f64(self) -> f64 {
                self as f64
            }
        }
    };
}

macro_rules! impl_complex {
    ($complex: ty, $real: ty) => {
        impl ComplexField for $complex {
            type Real = $real;
            const IS_COMPLEX: bool = true;

            #[inline(always)]
            fn from_real(real: Self::Real) -> Self {
                Self { re: real, im: 0.0 }
            }
            #[inline(always)]
            fn from_real_imag(real: Self::Real, imag: Self::Real) -> Self {
                Self { re: real, im: imag }
            }
            #[inline(always)]
            fn into_real_imag(self) -> (Self::Real, Self::Real) {
                (self.re, self.im)
            }
            #[inline(always)]
            fn zero() -> Self {
                Self { re: 0.0, im: 0.0 }
            }
            #[inline(always)]
            fn one() -> Self {
                Self { re: 1.0, im: 0.0 }
            }
            #[inline(always)]
            fn inv(self) -> Self {
                Self::one() / self
            }
            #[inline(always)]
            fn conj(self) -> Self {
                Self {
                    re: self.re,
                    im: -self.im,
                }
            }
            #[inline(always)]
            fn abs(self) -> Self::Real {
                <$real>::hypot(self.re, self.im)
            }
            #[inline(always)]
            fn from_f64(value: f64) -> Self {
                Self {
                    re: value as $real,
                    im: 0.0,
                }
            }
        }
    };
}

impl_real!(f32);
impl_real!(f64);
impl_complex!(c32, f32);
impl_complex!(c64, f64);

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn complex_inverse_and_norm() {
        let z = c64::new(3.0, 4.0);
        assert_approx_eq!(z.abs(), 5.0);
        assert_approx_eq!(z.abs2(), 25.0);

        let w = z * z.inv();
        assert_approx_eq!(w.re, 1.0);
        assert_approx_eq!(w.im, 0.0);
        assert_eq!(z.conj(), c64::new(3.0, -4.0));
    }

    #[test]
    fn real_types_drop_imaginary_part() {
        assert_eq!(f32::from_real_imag(2.0, 7.0), 2.0);
        assert_eq!(2.5f64.imag(), 0.0);
        assert_eq!((-2.0f64).scale_real(0.5), -1.0);
        assert!(!f64::IS_COMPLEX);
        assert!(c32::IS_COMPLEX);
    }
}
