//! Element types an [`Array`](crate::Array) can hold.
//!
//! Only the two types the GPU kernels understand are supported: `f32`
//! ([`DataType::Float`]) and `i32` ([`DataType::Integer`]). Integer arithmetic
//! mirrors WGSL semantics so both backends agree bit for bit: add, subtract
//! and multiply wrap, and division by zero yields the dividend.

use core::fmt::{Debug, Display};

use crate::approx::RelativeEq;

/// Data type tag passed to the GPU kernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum DataType {
    /// 32-bit IEEE float.
    Float = 0,
    /// 32-bit signed integer.
    Integer = 1,
}

impl DataType {
    /// Name used by [`Array::info`](crate::Array::info).
    pub const fn name(self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::Integer => "int",
        }
    }

    /// WGSL scalar type spelled in shader source.
    pub const fn wgsl(self) -> &'static str {
        match self {
            Self::Float => "f32",
            Self::Integer => "i32",
        }
    }
}

/// Binary elementwise operation codes.
///
/// `Add` through `Div` share their numeric codes with the GPU kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Operation {
    /// `a + b`
    Add = 0,
    /// `a - b`
    Sub = 1,
    /// `a * b`
    Mul = 2,
    /// `a / b`
    Div = 3,
    /// `a ^ b`, CPU only.
    Pow = 4,
}

impl Operation {
    /// Whether the GPU kernel implements this operation.
    pub const fn gpu_supported(self) -> bool {
        !matches!(self, Self::Pow)
    }

    /// Applies the operation to a pair of elements.
    #[inline]
    pub fn apply<T: Element>(self, a: T, b: T) -> T {
        match self {
            Self::Add => a.add(b),
            Self::Sub => a.sub(b),
            Self::Mul => a.mul(b),
            Self::Div => a.div(b),
            Self::Pow => a.pow(b),
        }
    }
}

/// Scalar element of an array.
pub trait Element:
    Copy
    + PartialEq
    + PartialOrd
    + Default
    + Debug
    + Display
    + Send
    + Sync
    + RelativeEq
    + bytemuck::Pod
    + 'static
{
    /// Tag forwarded to the GPU kernels.
    const DTYPE: DataType;

    /// Additive identity.
    fn zero() -> Self;
    /// Multiplicative identity.
    fn one() -> Self;

    /// `self + rhs`
    fn add(self, rhs: Self) -> Self;
    /// `self - rhs`
    fn sub(self, rhs: Self) -> Self;
    /// `self * rhs`
    fn mul(self, rhs: Self) -> Self;
    /// `self / rhs`
    fn div(self, rhs: Self) -> Self;
    /// `self ^ rhs`
    fn pow(self, rhs: Self) -> Self;

    /// Lossy conversion used by float-valued results (`mean`, `sigmoid`, ...).
    fn to_f32(self) -> f32;
    /// Lossy conversion back from `f32` (truncates for integers).
    fn from_f32(x: f32) -> Self;

    /// Whether the element counts as `true` for [`Array::count`](crate::Array::count).
    fn is_truthy(self) -> bool {
        self != Self::zero()
    }

    /// Uniform sample from `[0, 1)` (integers always sample `0`).
    fn sample<R: rand::Rng>(rng: &mut R) -> Self;
}

impl Element for f32 {
    const DTYPE: DataType = DataType::Float;

    fn zero() -> Self {
        0.0
    }

    fn one() -> Self {
        1.0
    }

    #[inline]
    fn add(self, rhs: Self) -> Self {
        self + rhs
    }

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self - rhs
    }

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        self * rhs
    }

    #[inline]
    fn div(self, rhs: Self) -> Self {
        self / rhs
    }

    #[inline]
    fn pow(self, rhs: Self) -> Self {
        self.powf(rhs)
    }

    fn to_f32(self) -> f32 {
        self
    }

    fn from_f32(x: f32) -> Self {
        x
    }

    fn sample<R: rand::Rng>(rng: &mut R) -> Self {
        rng.random::<f32>()
    }
}

impl Element for i32 {
    const DTYPE: DataType = DataType::Integer;

    fn zero() -> Self {
        0
    }

    fn one() -> Self {
        1
    }

    #[inline]
    fn add(self, rhs: Self) -> Self {
        self.wrapping_add(rhs)
    }

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self.wrapping_sub(rhs)
    }

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        self.wrapping_mul(rhs)
    }

    #[inline]
    fn div(self, rhs: Self) -> Self {
        // WGSL: a zero divisor (or MIN / -1) evaluates to the dividend
        self.checked_div(rhs).unwrap_or(self)
    }

    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    fn pow(self, rhs: Self) -> Self {
        f64::from(self).powf(f64::from(rhs)) as i32
    }

    #[allow(clippy::cast_precision_loss)]
    fn to_f32(self) -> f32 {
        self as f32
    }

    #[allow(clippy::cast_possible_truncation)]
    fn from_f32(x: f32) -> Self {
        x as i32
    }

    fn sample<R: rand::Rng>(_rng: &mut R) -> Self {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_division_matches_gpu_semantics() {
        assert_eq!(Operation::Div.apply(7_i32, 2), 3);
        assert_eq!(Operation::Div.apply(7_i32, 0), 7);
        assert_eq!(Operation::Div.apply(i32::MIN, -1), i32::MIN);
        assert_eq!(Operation::Add.apply(i32::MAX, 1), i32::MIN);
    }

    #[test]
    fn float_division_by_zero_is_infinite() {
        assert!(Operation::Div.apply(1.0_f32, 0.0).is_infinite());
        assert!(Operation::Div.apply(0.0_f32, 0.0).is_nan());
    }

    #[test]
    fn pow_on_both_types() {
        assert_eq!(Operation::Pow.apply(2_i32, 10), 1024);
        assert_eq!(Operation::Pow.apply(3.0_f32, 2.0), 9.0);
        assert!(!Operation::Pow.gpu_supported());
        assert!(Operation::Div.gpu_supported());
    }
}
