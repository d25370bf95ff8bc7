//! Nested literals and the `array!` macro.

use super::Array;
use crate::element::Element;
use crate::error::{Error, Result};
use crate::shape::element_count;

/// A nested list of scalars describing an array by value.
///
/// Usually built with [`literal!`](crate::literal) rather than by hand.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal<T> {
    /// A single element.
    Scalar(T),
    /// One level of nesting; siblings must agree on their own shape.
    List(Vec<Literal<T>>),
}

impl<T: Copy> Literal<T> {
    /// Infers the shape of the literal.
    ///
    /// An empty list has shape `[0]`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidLiteral`] if siblings differ in length or depth.
    pub fn shape(&self) -> Result<Vec<usize>> {
        let Self::List(items) = self else {
            return Ok(Vec::new());
        };
        let Some((first, rest)) = items.split_first() else {
            return Ok(vec![0]);
        };

        let inner = first.shape()?;
        for (i, item) in rest.iter().enumerate() {
            let other = item.shape()?;
            if other != inner {
                return Err(Error::InvalidLiteral(format!(
                    "item {} has shape {other:?}, its first sibling has {inner:?}",
                    i + 1
                )));
            }
        }

        let mut shape = Vec::with_capacity(inner.len() + 1);
        shape.push(items.len());
        shape.extend(inner);
        Ok(shape)
    }

    fn flatten_into(&self, out: &mut Vec<T>) {
        match self {
            Self::Scalar(x) => out.push(*x),
            Self::List(items) => items.iter().for_each(|item| item.flatten_into(out)),
        }
    }
}

impl<T: Element> Array<T> {
    /// Builds an array from a nested literal, inferring its shape.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidLiteral`] for ragged or mixed-depth input.
    pub fn from_literal(literal: &Literal<T>) -> Result<Self> {
        let shape = literal.shape()?;
        let mut data = Vec::with_capacity(element_count(&shape));
        literal.flatten_into(&mut data);
        Self::from_shape_vec(&shape, data)
    }
}

impl<T: Element> TryFrom<Literal<T>> for Array<T> {
    type Error = Error;

    fn try_from(literal: Literal<T>) -> Result<Self> {
        Self::from_literal(&literal)
    }
}

/// Builds a [`Literal`] from bracketed, comma-separated elements.
///
/// ```
/// use briny_array::{literal, Literal};
///
/// let lit = literal!([[1, 2], [3, 4]]);
/// assert_eq!(lit.shape().unwrap(), vec![2, 2]);
/// assert_eq!(literal!(7), Literal::Scalar(7));
/// ```
#[macro_export]
macro_rules! literal {
    ([ $( [ $($inner:tt)* ] ),+ $(,)? ]) => {
        $crate::Literal::List(vec![ $( $crate::literal!([ $($inner)* ]) ),+ ])
    };
    ([ $($x:expr),* $(,)? ]) => {
        $crate::Literal::List(vec![ $( $crate::Literal::Scalar($x) ),* ])
    };
    ($x:expr) => {
        $crate::Literal::Scalar($x)
    };
}

/// Builds an [`Array`](crate::Array) from nested bracketed elements.
///
/// ```
/// use briny_array::array;
///
/// let a = array![[1.0_f32, 2.0], [3.0, 4.0]];
/// assert_eq!(a.shape(), &[2, 2]);
/// ```
///
/// # Panics
///
/// If the nesting is ragged; use [`Array::from_literal`](crate::Array::from_literal)
/// to handle that as an error.
#[macro_export]
macro_rules! array {
    ($($t:tt)*) => {
        match $crate::Array::from_literal(&$crate::literal!([ $($t)* ])) {
            Ok(array) => array,
            Err(e) => panic!("{e}"),
        }
    };
}
