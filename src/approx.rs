//! Utilities to approximate equality of array elements.
//!
//! Floats are graded by the absolute distance between them; integers only
//! ever compare exactly.

/// Tolerance used by [`Array::allclose`](crate::Array::allclose).
///
/// [`Array::grade`](crate::Array::grade) reports the finer grades below it.
pub const DEFAULT_TOLERANCE: f32 = 1e-3;

/// The expected epsilon after a handful of `f32` operations.
pub const F32_AVG_ERROR: f32 = 1e-5;

/// The best expected epsilon accepted on `f32`s.
pub const F32_MIN_ERROR: f32 = 1e-6;

/// The approximated equality enumerated, best first.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ApproxEquality {
    /// Within [`F32_MIN_ERROR`].
    Precise = 0,
    /// Within [`F32_AVG_ERROR`].
    Partial = 1,
    /// Within [`DEFAULT_TOLERANCE`].
    Relative = 2,
    /// No relative equality.
    Scarce = 3,
}

/// Checks the distance between two values.
pub trait RelativeEq {
    /// Grades the equality of `self` and `rhs`.
    fn approx_eq(&self, rhs: &Self) -> ApproxEquality;

    /// Whether `self` and `rhs` are within `tolerance` of each other.
    fn is_close(&self, rhs: &Self, tolerance: f32) -> bool;
}

impl RelativeEq for f32 {
    fn approx_eq(&self, rhs: &Self) -> ApproxEquality {
        let dif = (self - rhs).abs();

        if dif < F32_MIN_ERROR {
            ApproxEquality::Precise
        } else if dif < F32_AVG_ERROR {
            ApproxEquality::Partial
        } else if dif < DEFAULT_TOLERANCE {
            ApproxEquality::Relative
        } else {
            ApproxEquality::Scarce
        }
    }

    fn is_close(&self, rhs: &Self, tolerance: f32) -> bool {
        // equal infinities have a NaN distance
        self == rhs || (self - rhs).abs() <= tolerance
    }
}

impl RelativeEq for i32 {
    fn approx_eq(&self, rhs: &Self) -> ApproxEquality {
        if self == rhs {
            ApproxEquality::Precise
        } else {
            ApproxEquality::Scarce
        }
    }

    fn is_close(&self, rhs: &Self, _tolerance: f32) -> bool {
        self == rhs
    }
}

/// Grades a whole slice by its worst element.
///
/// Slices of different lengths are [`ApproxEquality::Scarce`].
pub fn grade_slice<T: RelativeEq>(lhs: &[T], rhs: &[T]) -> ApproxEquality {
    if lhs.len() != rhs.len() {
        return ApproxEquality::Scarce;
    }
    lhs.iter()
        .zip(rhs)
        .map(|(a, b)| a.approx_eq(b))
        .max()
        .unwrap_or(ApproxEquality::Precise)
}
