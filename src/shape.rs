//! Shape and stride bookkeeping.
//!
//! Pure functions over dimension lists: element counts, row-major strides and
//! the library's broadcasting rule.
//!
//! # Broadcasting
//!
//! Broadcasting here only *prepends* leading dimensions. The shorter shape is
//! right-aligned under the longer one and every aligned dimension must match
//! exactly; size-1 dimensions are not stretched. The new leading dimensions
//! get a stride of `0`, so a broadcast view reads its physical span over and
//! over.
//!
//! ```
//! use briny_array::shape::{broadcast, derive_strides};
//!
//! assert_eq!(derive_strides(&[2, 3, 4]), vec![12, 4, 1]);
//!
//! let (shape, strides) = broadcast(&[3], &[2, 3]).unwrap();
//! assert_eq!(shape, vec![2, 3]);
//! assert_eq!(strides, vec![0, 1]);
//! ```

use crate::error::{Result, shape_err};

/// Number of elements described by `shape`; a scalar (empty) shape has one.
///
/// The shape must already have passed [`try_element_count`].
pub fn element_count(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// Number of elements described by `shape`, checked against `usize` overflow.
///
/// A shape with a zero dimension holds no elements, however large the others.
///
/// # Errors
///
/// [`Error::Shape`](crate::Error::Shape) if the product does not fit a `usize`.
pub fn try_element_count(shape: &[usize]) -> Result<usize> {
    if shape.contains(&0) {
        return Ok(0);
    }
    shape
        .iter()
        .try_fold(1_usize, |acc, &dim| acc.checked_mul(dim))
        .ok_or_else(|| shape_err!("shape {shape:?} has more elements than fit in memory"))
}

/// Row-major strides for `shape`, in elements.
///
/// Strides of an empty shape saturate instead of overflowing; they never
/// address an element.
pub fn derive_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1_usize; shape.len()];
    for i in (0..shape.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1].saturating_mul(shape[i + 1]);
    }
    strides
}

/// Broadcasts `shape` up to `target`, returning the target shape and the
/// strides a view of the original data needs to present it.
///
/// # Errors
///
/// [`Error::Shape`](crate::Error::Shape) if `target` has fewer dimensions than
/// `shape`, any right-aligned dimension differs, or `target` overflows the
/// element count.
pub fn broadcast(shape: &[usize], target: &[usize]) -> Result<(Vec<usize>, Vec<usize>)> {
    if target.len() < shape.len() {
        return Err(shape_err!(
            "cannot broadcast {shape:?} to {target:?}: target has fewer dimensions"
        ));
    }

    let lead = target.len() - shape.len();
    if target[lead..] != *shape {
        return Err(shape_err!(
            "cannot broadcast {shape:?} to {target:?}: trailing dimensions differ"
        ));
    }

    try_element_count(target)?;

    let mut strides = vec![0; lead];
    strides.extend(derive_strides(shape));
    Ok((target.to_vec(), strides))
}

/// Which operand of a binary operation needs to be broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Broadcast {
    /// The shapes are already equal.
    None,
    /// The left operand is broadcast up to the right's shape.
    Lhs,
    /// The right operand is broadcast up to the left's shape.
    Rhs,
}

/// Resolves the broadcast for a binary operation.
///
/// Equal shapes pass through; otherwise the operand of lower rank is
/// broadcast to the other's shape.
///
/// # Errors
///
/// [`Error::Shape`](crate::Error::Shape) if the ranks are equal but the shapes
/// differ, or the lower-rank shape does not right-align with the other.
pub fn broadcast_pair(lhs: &[usize], rhs: &[usize]) -> Result<(Vec<usize>, Broadcast)> {
    if lhs == rhs {
        return Ok((lhs.to_vec(), Broadcast::None));
    }
    match lhs.len().cmp(&rhs.len()) {
        core::cmp::Ordering::Less => broadcast(lhs, rhs).map(|(s, _)| (s, Broadcast::Lhs)),
        core::cmp::Ordering::Greater => broadcast(rhs, lhs).map(|(s, _)| (s, Broadcast::Rhs)),
        core::cmp::Ordering::Equal => Err(shape_err!(
            "incompatible shapes {lhs:?} and {rhs:?}"
        )),
    }
}
