//! The N-dimensional [`Array`] value type.
//!
//! An array is a view: a shape, its strides, and an `(offset, length)` window
//! into a shared [`Storage`]. Row slices and broadcasts build new views over
//! the same storage without copying; [`Clone`] is the only deep copy.
//!
//! ```
//! use briny_array::{array, Array};
//!
//! let m = array![[1, 2, 3], [4, 5, 6]];
//! let row = m.row(1).unwrap();
//! row.zeros();
//! assert_eq!(m, array![[1, 2, 3], [0, 0, 0]]);
//! ```

use std::sync::Arc;

use crate::element::Element;
use crate::error::{Error, Result, index_err, shape_err};
use crate::shape::{self, derive_strides, element_count, try_element_count};
use crate::storage::Storage;

mod fmt;
mod iter;
mod linalg;
pub(crate) mod literal;
mod ops;
mod reduce;

pub use self::iter::{Elements, RowTuples, Rows};
pub use self::literal::Literal;

/// An N-dimensional array of `T` sharing its buffer with every view of it.
pub struct Array<T: Element> {
    shape: Vec<usize>,
    strides: Vec<usize>,
    storage: Arc<Storage<T>>,
    /// First element of the view, in elements.
    offset: usize,
    /// Physical elements the view spans; smaller than the logical element
    /// count for broadcast views.
    len: usize,
}

impl<T: Element> Array<T> {
    fn from_parts(
        shape: Vec<usize>,
        strides: Vec<usize>,
        storage: Arc<Storage<T>>,
        offset: usize,
        len: usize,
    ) -> Self {
        debug_assert!(offset + len <= storage.len());
        Self {
            shape,
            strides,
            storage,
            offset,
            len,
        }
    }

    /// Allocates a zero-filled array of `shape`.
    ///
    /// # Errors
    ///
    /// [`Error::Shape`] if the element count overflows, [`Error::Allocation`]
    /// if the buffer cannot be allocated.
    pub fn empty(shape: &[usize]) -> Result<Self> {
        let len = try_element_count(shape)?;
        let storage = Storage::allocate(len)?;
        Ok(Self::from_parts(shape.to_vec(), derive_strides(shape), storage, 0, len))
    }

    /// Allocates an array of `shape` with every element set to `value`.
    ///
    /// # Errors
    ///
    /// [`Error::Allocation`] if the buffer cannot be allocated.
    pub fn full(shape: &[usize], value: T) -> Result<Self> {
        let array = Self::empty(shape)?;
        array.constants(value);
        Ok(array)
    }

    /// Builds an array of `shape` from a row-major `Vec` without copying.
    ///
    /// # Errors
    ///
    /// [`Error::Shape`] if `data.len()` differs from the shape's element count.
    pub fn from_shape_vec(shape: &[usize], data: Vec<T>) -> Result<Self> {
        let len = try_element_count(shape)?;
        if data.len() != len {
            return Err(shape_err!(
                "shape {shape:?} needs {len} elements, got {}",
                data.len()
            ));
        }
        Ok(Self::from_parts(
            shape.to_vec(),
            derive_strides(shape),
            Storage::from_vec(data),
            0,
            len,
        ))
    }

    /// Builds an array of `shape` from the first elements of `source`.
    ///
    /// Exactly as many elements as the shape holds are taken, so unbounded
    /// sources such as `1..` are fine.
    ///
    /// # Errors
    ///
    /// [`Error::Shape`] if `source` runs out early, [`Error::Allocation`] if
    /// the buffer cannot be allocated.
    pub fn from_shape_iter(shape: &[usize], source: impl IntoIterator<Item = T>) -> Result<Self> {
        let wanted = try_element_count(shape)?;
        let mut data = Vec::new();
        data.try_reserve_exact(wanted)
            .map_err(|_| Error::Allocation {
                bytes: wanted.saturating_mul(size_of::<T>()),
            })?;
        data.extend(source.into_iter().take(wanted));
        if data.len() < wanted {
            return Err(shape_err!(
                "shape {shape:?} needs {wanted} elements, source yielded {}",
                data.len()
            ));
        }
        Self::from_shape_vec(shape, data)
    }

    /// A zero-dimensional array holding `value`.
    pub fn scalar(value: T) -> Self {
        Self::from_parts(Vec::new(), Vec::new(), Storage::from_vec(vec![value]), 0, 1)
    }

    /// Dimension sizes.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Per-dimension element steps; `0` marks a broadcast axis.
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Number of dimensions (rank).
    pub fn dimension(&self) -> usize {
        self.shape.len()
    }

    /// Logical number of elements.
    pub fn element_count(&self) -> usize {
        element_count(&self.shape)
    }

    /// Size of the first dimension.
    ///
    /// # Errors
    ///
    /// [`Error::Unsupported`] for a zero-dimensional array.
    pub fn length(&self) -> Result<usize> {
        self.shape
            .first()
            .copied()
            .ok_or_else(|| Error::Unsupported("length() of a 0-d array".into()))
    }

    /// Number of physical elements the view spans.
    pub fn buffer_element_count(&self) -> usize {
        self.len
    }

    /// Number of physical bytes the view spans.
    pub fn buffer_bytes(&self) -> usize {
        self.len * size_of::<T>()
    }

    /// Whether the view repeats a smaller physical span.
    pub fn is_broadcast(&self) -> bool {
        self.len < self.element_count()
    }

    /// Whether `self` and `other` are views of the same storage.
    pub fn shares_storage(&self, other: &Self) -> bool {
        Storage::same(&self.storage, &other.storage)
    }

    /// A new handle to the same view; writes through either are visible in
    /// both.
    #[must_use]
    pub fn share(&self) -> Self {
        Self::from_parts(
            self.shape.clone(),
            self.strides.clone(),
            Arc::clone(&self.storage),
            self.offset,
            self.len,
        )
    }

    /// Deep copy into fresh, dense storage.
    ///
    /// # Errors
    ///
    /// [`Error::Allocation`] if the buffer cannot be allocated.
    pub fn try_clone(&self) -> Result<Self> {
        let copy = Self::empty(&self.shape)?;
        let values = self.to_vec();
        copy.storage.write(|buf| buf.copy_from_slice(&values));
        Ok(copy)
    }

    /// `self` if it is dense, otherwise a dense copy.
    pub(crate) fn contiguous(&self) -> Result<Self> {
        if self.is_broadcast() {
            self.try_clone()
        } else {
            Ok(self.share())
        }
    }

    /// Storage index of logical element `index`; broadcast views wrap over
    /// their physical span.
    #[inline]
    fn physical(&self, index: usize) -> usize {
        if self.len == 0 {
            self.offset
        } else {
            self.offset + index % self.len
        }
    }

    fn check_flat(&self, index: usize) -> Result<()> {
        let count = self.element_count();
        if index >= count {
            return Err(index_err!(
                "index {index} out of bounds for {count} elements"
            ));
        }
        Ok(())
    }

    fn position_address(&self, position: &[usize]) -> Result<usize> {
        if position.len() != self.dimension() {
            return Err(index_err!(
                "{} indices given for a {}-d array",
                position.len(),
                self.dimension()
            ));
        }
        let mut address = self.offset;
        for (axis, ((&p, &dim), &stride)) in position
            .iter()
            .zip(&self.shape)
            .zip(&self.strides)
            .enumerate()
        {
            if p >= dim {
                return Err(index_err!(
                    "index {p} out of bounds for axis {axis} of size {dim}"
                ));
            }
            address += p * stride;
        }
        Ok(address)
    }

    /// Element at row-major position `index`, regardless of rank.
    ///
    /// # Errors
    ///
    /// [`Error::Index`] if `index` is not below the element count.
    pub fn at(&self, index: usize) -> Result<T> {
        self.check_flat(index)?;
        Ok(self.storage.get(self.physical(index)))
    }

    /// Element `(x, y)` of a 2-d array.
    ///
    /// # Errors
    ///
    /// [`Error::Index`] if the array is not 2-d or a coordinate is out of range.
    pub fn at2(&self, x: usize, y: usize) -> Result<T> {
        self.at_position(&[x, y])
    }

    /// Element `(x, y, z)` of a 3-d array.
    ///
    /// # Errors
    ///
    /// [`Error::Index`] if the array is not 3-d or a coordinate is out of range.
    pub fn at3(&self, x: usize, y: usize, z: usize) -> Result<T> {
        self.at_position(&[x, y, z])
    }

    /// Element at `position`, one coordinate per dimension.
    ///
    /// # Errors
    ///
    /// [`Error::Index`] on an arity mismatch or an out-of-range coordinate.
    pub fn at_position(&self, position: &[usize]) -> Result<T> {
        let address = self.position_address(position)?;
        Ok(self.storage.get(address))
    }

    /// Overwrites the element at row-major position `index`.
    ///
    /// # Errors
    ///
    /// [`Error::Index`] if `index` is not below the element count.
    pub fn set(&self, index: usize, value: T) -> Result<()> {
        self.check_flat(index)?;
        self.storage.set(self.physical(index), value);
        Ok(())
    }

    /// Overwrites element `(x, y)` of a 2-d array.
    ///
    /// # Errors
    ///
    /// See [`Array::at2`].
    pub fn set2(&self, x: usize, y: usize, value: T) -> Result<()> {
        self.set_position(&[x, y], value)
    }

    /// Overwrites element `(x, y, z)` of a 3-d array.
    ///
    /// # Errors
    ///
    /// See [`Array::at3`].
    pub fn set3(&self, x: usize, y: usize, z: usize, value: T) -> Result<()> {
        self.set_position(&[x, y, z], value)
    }

    /// Overwrites the element at `position`.
    ///
    /// # Errors
    ///
    /// See [`Array::at_position`].
    pub fn set_position(&self, position: &[usize], value: T) -> Result<()> {
        let address = self.position_address(position)?;
        self.storage.set(address, value);
        Ok(())
    }

    /// The single element of a one-element array.
    ///
    /// # Errors
    ///
    /// [`Error::Shape`] if the array does not hold exactly one element.
    pub fn scalar_value(&self) -> Result<T> {
        match self.element_count() {
            1 => self.at(0),
            n => Err(shape_err!("expected a single element, array has {n}")),
        }
    }

    /// View of row `row`, one rank lower, sharing storage.
    ///
    /// # Errors
    ///
    /// [`Error::Index`] for a 0-d array or `row >= shape[0]`.
    pub fn row(&self, row: usize) -> Result<Self> {
        let rows = *self
            .shape
            .first()
            .ok_or_else(|| index_err!("cannot take a row of a 0-d array"))?;
        if row >= rows {
            return Err(index_err!("row {row} out of bounds for {rows} rows"));
        }
        let shape = self.shape[1..].to_vec();
        let len = element_count(&shape).min(self.len);
        Ok(Self::from_parts(
            shape,
            self.strides[1..].to_vec(),
            Arc::clone(&self.storage),
            self.offset + row * self.strides[0],
            len,
        ))
    }

    /// Reinterprets the view with `shape`, recomputing row-major strides.
    ///
    /// A broadcast view is first materialized into its own storage, since its
    /// physical span cannot present the new shape.
    ///
    /// # Errors
    ///
    /// [`Error::Shape`] if the element counts differ or `shape` overflows.
    pub fn reshape(&mut self, shape: &[usize]) -> Result<()> {
        let (from, to) = (self.element_count(), try_element_count(shape)?);
        if from != to {
            return Err(shape_err!(
                "cannot reshape {:?} ({from} elements) to {shape:?} ({to} elements)",
                self.shape
            ));
        }
        if self.is_broadcast() {
            *self = self.try_clone()?;
        }
        self.shape = shape.to_vec();
        self.strides = derive_strides(shape);
        Ok(())
    }

    /// View of `self` broadcast up to `target`, sharing storage.
    ///
    /// # Errors
    ///
    /// [`Error::Shape`] if the shapes are not broadcast-compatible (see
    /// [`shape::broadcast`]).
    pub fn broadcast(&self, target: &[usize]) -> Result<Self> {
        let (shape, _) = shape::broadcast(&self.shape, target)?;
        let mut strides = vec![0; shape.len() - self.shape.len()];
        strides.extend_from_slice(&self.strides);
        Ok(Self::from_parts(
            shape,
            strides,
            Arc::clone(&self.storage),
            self.offset,
            self.len,
        ))
    }

    /// Every element in row-major order.
    pub fn to_vec(&self) -> Vec<T> {
        let count = self.element_count();
        self.storage.read(|buf| {
            let span = &buf[self.offset..self.offset + self.len];
            if self.len == count {
                span.to_vec()
            } else {
                (0..count).map(|i| span[i % self.len]).collect()
            }
        })
    }

    /// Runs `f` over the view's physical span.
    pub(crate) fn with_span<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        self.storage
            .read(|buf| f(&buf[self.offset..self.offset + self.len]))
    }

    /// Runs `f` over the view's physical span with exclusive access.
    pub(crate) fn with_span_mut<R>(&self, f: impl FnOnce(&mut [T]) -> R) -> R {
        self.storage
            .write(|buf| f(&mut buf[self.offset..self.offset + self.len]))
    }

    /// Runs `f` over the physical spans of two arrays, which may alias.
    pub(crate) fn with_spans<R>(&self, other: &Self, f: impl FnOnce(&[T], &[T]) -> R) -> R {
        if self.shares_storage(other) {
            self.storage.read(|buf| {
                f(
                    &buf[self.offset..self.offset + self.len],
                    &buf[other.offset..other.offset + other.len],
                )
            })
        } else {
            self.with_span(|a| other.with_span(|b| f(a, b)))
        }
    }

    /// Sets every element of the view to `value`.
    pub fn constants(&self, value: T) {
        self.with_span_mut(|span| span.fill(value));
    }

    /// Sets every element of the view to zero.
    pub fn zeros(&self) {
        self.constants(T::zero());
    }

    /// Sets every element of the view to one.
    pub fn ones(&self) {
        self.constants(T::one());
    }

    /// Fills the view with uniform samples from `[0, 1)`.
    pub fn fill_random(&self) {
        let mut rng = rand::rng();
        self.with_span_mut(|span| span.iter_mut().for_each(|x| *x = T::sample(&mut rng)));
    }
}

impl<T: Element> Clone for Array<T> {
    /// Deep copy; use [`Array::share`] for a view of the same storage.
    ///
    /// # Panics
    ///
    /// If the copy cannot be allocated; [`Array::try_clone`] reports that as
    /// an error instead.
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(copy) => copy,
            Err(e) => panic!("failed to clone array: {e}"),
        }
    }
}

impl<T: Element> From<Vec<T>> for Array<T> {
    /// A 1-d array owning `data`.
    fn from(data: Vec<T>) -> Self {
        let len = data.len();
        Self::from_parts(vec![len], vec![1], Storage::from_vec(data), 0, len)
    }
}

/// A zero-filled array of `shape`.
///
/// # Errors
///
/// [`Error::Allocation`] if the buffer cannot be allocated.
pub fn empty<T: Element>(shape: &[usize]) -> Result<Array<T>> {
    Array::empty(shape)
}

/// An array of `shape` filled with `value`.
///
/// # Errors
///
/// [`Error::Allocation`] if the buffer cannot be allocated.
pub fn constants<T: Element>(shape: &[usize], value: T) -> Result<Array<T>> {
    Array::full(shape, value)
}

/// An array of `shape` filled with zeros.
///
/// # Errors
///
/// [`Error::Allocation`] if the buffer cannot be allocated.
pub fn zeros<T: Element>(shape: &[usize]) -> Result<Array<T>> {
    Array::full(shape, T::zero())
}

/// An array of `shape` filled with ones.
///
/// # Errors
///
/// [`Error::Allocation`] if the buffer cannot be allocated.
pub fn ones<T: Element>(shape: &[usize]) -> Result<Array<T>> {
    Array::full(shape, T::one())
}

/// An `f32` array of `shape` with uniform samples from `[0, 1)`.
///
/// # Errors
///
/// [`Error::Allocation`] if the buffer cannot be allocated.
pub fn random(shape: &[usize]) -> Result<Array<f32>> {
    let array = Array::empty(shape)?;
    array.fill_random();
    Ok(array)
}
