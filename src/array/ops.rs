//! Arithmetic operators and comparisons.
//!
//! `+ - * /` dispatch through [`ops::dispatch`](crate::ops::dispatch) and
//! panic on failure; the `try_*` methods return the error instead. Scalars on
//! either side are promoted to 0-d arrays and broadcast.

use core::ops::{Add, Div, Mul, Sub};

use super::Array;
use crate::approx::{ApproxEquality, DEFAULT_TOLERANCE, RelativeEq, grade_slice};
use crate::element::{Element, Operation};
use crate::error::Result;
use crate::ops::dispatch::binary_op;

impl<T: Element> Array<T> {
    /// Elementwise `self + rhs` with broadcasting.
    ///
    /// # Errors
    ///
    /// See [`binary_op_on`](crate::ops::dispatch::binary_op_on).
    pub fn try_add(&self, rhs: &Self) -> Result<Self> {
        binary_op(self, rhs, Operation::Add)
    }

    /// Elementwise `self - rhs` with broadcasting.
    ///
    /// # Errors
    ///
    /// See [`binary_op_on`](crate::ops::dispatch::binary_op_on).
    pub fn try_sub(&self, rhs: &Self) -> Result<Self> {
        binary_op(self, rhs, Operation::Sub)
    }

    /// Elementwise `self * rhs` with broadcasting.
    ///
    /// # Errors
    ///
    /// See [`binary_op_on`](crate::ops::dispatch::binary_op_on).
    pub fn try_mul(&self, rhs: &Self) -> Result<Self> {
        binary_op(self, rhs, Operation::Mul)
    }

    /// Elementwise `self / rhs` with broadcasting.
    ///
    /// # Errors
    ///
    /// See [`binary_op_on`](crate::ops::dispatch::binary_op_on).
    pub fn try_div(&self, rhs: &Self) -> Result<Self> {
        binary_op(self, rhs, Operation::Div)
    }

    /// Elementwise `self ^ rhs` with broadcasting; always computed on the CPU.
    ///
    /// # Errors
    ///
    /// See [`binary_op_on`](crate::ops::dispatch::binary_op_on).
    pub fn pow(&self, rhs: &Self) -> Result<Self> {
        binary_op(self, rhs, Operation::Pow)
    }

    /// Raises every element to `exponent`.
    ///
    /// # Errors
    ///
    /// [`Error::Allocation`](crate::Error::Allocation) if the result cannot be
    /// allocated.
    pub fn pow_scalar(&self, exponent: T) -> Result<Self> {
        self.pow(&Self::scalar(exponent))
    }

    /// Shape equality plus element closeness within `1e-3` (exact for
    /// integers).
    pub fn allclose(&self, other: &Self) -> bool {
        self.allclose_with(other, DEFAULT_TOLERANCE)
    }

    /// Grades how closely `other` matches, by the worst element.
    ///
    /// Arrays of different shapes are [`ApproxEquality::Scarce`].
    ///
    /// ```
    /// use briny_array::{array, approx::ApproxEquality};
    ///
    /// let a = array![1.0_f32, 2.0];
    /// assert_eq!(a.grade(&array![1.0, 2.0005]), ApproxEquality::Relative);
    /// assert_eq!(a.grade(&array![1.0, 2.5]), ApproxEquality::Scarce);
    /// ```
    pub fn grade(&self, other: &Self) -> ApproxEquality {
        if self.shape != other.shape {
            return ApproxEquality::Scarce;
        }
        grade_slice(&self.to_vec(), &other.to_vec())
    }

    /// Shape equality plus element closeness within `tolerance`.
    pub fn allclose_with(&self, other: &Self, tolerance: f32) -> bool {
        self.shape == other.shape
            && self
                .to_vec()
                .iter()
                .zip(&other.to_vec())
                .all(|(a, b)| a.is_close(b, tolerance))
    }
}

impl<T: Element> PartialEq for Array<T> {
    /// Exact equality of shapes and of every element.
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape && self.to_vec() == other.to_vec()
    }
}

macro_rules! impl_binary_operator {
    ($trait:ident, $method:ident, $op:expr) => {
        impl<T: Element> $trait<&Array<T>> for &Array<T> {
            type Output = Array<T>;

            fn $method(self, rhs: &Array<T>) -> Array<T> {
                match binary_op(self, rhs, $op) {
                    Ok(out) => out,
                    Err(e) => panic!("{e}"),
                }
            }
        }

        impl<T: Element> $trait<Array<T>> for Array<T> {
            type Output = Array<T>;

            fn $method(self, rhs: Array<T>) -> Array<T> {
                (&self).$method(&rhs)
            }
        }

        impl<T: Element> $trait<&Array<T>> for Array<T> {
            type Output = Array<T>;

            fn $method(self, rhs: &Array<T>) -> Array<T> {
                (&self).$method(rhs)
            }
        }

        impl<T: Element> $trait<Array<T>> for &Array<T> {
            type Output = Array<T>;

            fn $method(self, rhs: Array<T>) -> Array<T> {
                self.$method(&rhs)
            }
        }

        impl<T: Element> $trait<T> for &Array<T> {
            type Output = Array<T>;

            fn $method(self, rhs: T) -> Array<T> {
                self.$method(&Array::scalar(rhs))
            }
        }

        impl<T: Element> $trait<T> for Array<T> {
            type Output = Array<T>;

            fn $method(self, rhs: T) -> Array<T> {
                (&self).$method(&Array::scalar(rhs))
            }
        }
    };
}

impl_binary_operator!(Add, add, Operation::Add);
impl_binary_operator!(Sub, sub, Operation::Sub);
impl_binary_operator!(Mul, mul, Operation::Mul);
impl_binary_operator!(Div, div, Operation::Div);

macro_rules! impl_scalar_lhs {
    ($($t:ty),*) => {
        $(
            impl Add<&Array<$t>> for $t {
                type Output = Array<$t>;

                fn add(self, rhs: &Array<$t>) -> Array<$t> {
                    &Array::scalar(self) + rhs
                }
            }

            impl Add<Array<$t>> for $t {
                type Output = Array<$t>;

                fn add(self, rhs: Array<$t>) -> Array<$t> {
                    &Array::scalar(self) + &rhs
                }
            }

            impl Sub<&Array<$t>> for $t {
                type Output = Array<$t>;

                fn sub(self, rhs: &Array<$t>) -> Array<$t> {
                    &Array::scalar(self) - rhs
                }
            }

            impl Sub<Array<$t>> for $t {
                type Output = Array<$t>;

                fn sub(self, rhs: Array<$t>) -> Array<$t> {
                    &Array::scalar(self) - &rhs
                }
            }

            impl Mul<&Array<$t>> for $t {
                type Output = Array<$t>;

                fn mul(self, rhs: &Array<$t>) -> Array<$t> {
                    &Array::scalar(self) * rhs
                }
            }

            impl Mul<Array<$t>> for $t {
                type Output = Array<$t>;

                fn mul(self, rhs: Array<$t>) -> Array<$t> {
                    &Array::scalar(self) * &rhs
                }
            }

            impl Div<&Array<$t>> for $t {
                type Output = Array<$t>;

                fn div(self, rhs: &Array<$t>) -> Array<$t> {
                    &Array::scalar(self) / rhs
                }
            }

            impl Div<Array<$t>> for $t {
                type Output = Array<$t>;

                fn div(self, rhs: Array<$t>) -> Array<$t> {
                    &Array::scalar(self) / &rhs
                }
            }
        )*
    };
}

impl_scalar_lhs!(f32, i32);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array;
    use crate::backend::{Device, with_device};
    use crate::error::Error;

    #[test]
    fn operators_broadcast_and_allocate() {
        with_device(Device::Cpu, || {
            let a = array![[1, 2, 3], [4, 5, 6]];
            let b = array![1, 2, 3];
            let c = &a + &b;
            assert_eq!(c, array![[2, 4, 6], [5, 7, 9]]);
            assert!(!c.shares_storage(&a));
            assert_eq!(&a - 1, array![[0, 1, 2], [3, 4, 5]]);
            assert_eq!(10_i32 - &b, array![9, 8, 7]);
            assert_eq!(a.clone() * 2, array![[2, 4, 6], [8, 10, 12]]);
        });
    }

    #[test]
    fn float_scalar_arithmetic() {
        with_device(Device::Cpu, || {
            let a = array![0.25_f32, 0.5, 0.75];
            let b = &a * 2.0 - 1.0;
            assert!(b.allclose(&array![-0.5, 0.0, 0.5]));
            assert_eq!(1.0_f32 / &array![2.0_f32, 4.0], array![0.5, 0.25]);
        });
    }

    #[test]
    #[should_panic(expected = "shape error")]
    fn mismatched_operator_panics() {
        let _ = &array![1, 2] + &array![1, 2, 3];
    }

    #[test]
    fn try_forms_report_shape_errors() {
        let err = array![1, 2].try_add(&array![1, 2, 3]).unwrap_err();
        assert!(matches!(err, Error::Shape(_)));
        assert!(array![[1, 2]].try_mul(&array![[1], [2]]).is_err());
    }

    #[test]
    fn integer_division_by_zero_yields_dividend() {
        with_device(Device::Cpu, || {
            assert_eq!(array![7, -8, 9] / 0, array![7, -8, 9]);
            assert_eq!(array![7, -8, 9] / 2, array![3, -4, 4]);
        });
    }

    #[test]
    fn pow_runs_elementwise() {
        let a = array![1.0_f32, 2.0, 3.0];
        assert_eq!(a.pow_scalar(2.0).unwrap(), array![1.0, 4.0, 9.0]);
        assert_eq!(a.pow(&array![0.0, 1.0, 2.0]).unwrap(), array![1.0, 2.0, 9.0]);
    }

    #[test]
    fn equality_is_exact_and_allclose_tolerant() {
        let a = array![1.0_f32, 2.0];
        let b = array![1.0005, 2.0];
        assert_ne!(a, b);
        assert!(a.allclose(&b));
        assert!(!a.allclose_with(&b, 1e-4));
        assert!(!a.allclose(&array![[1.0, 2.0]]));
        assert_ne!(a, array![[1.0, 2.0]]);
    }

    #[test]
    fn grade_takes_the_worst_element() {
        let a = array![1.0_f32, 2.0, 3.0];
        assert_eq!(a.grade(&a.clone()), ApproxEquality::Precise);
        assert_eq!(a.grade(&array![1.0, 2.000_002, 3.0]), ApproxEquality::Partial);
        assert_eq!(a.grade(&array![1.0, 2.0, 3.1]), ApproxEquality::Scarce);
        assert_eq!(a.grade(&array![[1.0, 2.0, 3.0]]), ApproxEquality::Scarce);
        assert_eq!(array![1, 2].grade(&array![1, 3]), ApproxEquality::Scarce);
    }
}
