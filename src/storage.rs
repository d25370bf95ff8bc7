//! Reference-counted element buffers.
//!
//! A [`Storage`] is allocated once, zero-initialized, and never resized. Every
//! [`Array`](crate::Array) view into it holds an `Arc<Storage<T>>`, so the
//! buffer lives as long as its longest-lived view.
//!
//! Writes through one view are visible through every other view of the same
//! storage. The buffer sits behind an `RwLock`, so aliasing writes from several
//! threads cannot tear an element, but their ordering is left to the caller.
//! Accessors take the lock for the duration of a closure only and never
//! call back into user code while holding it.

use std::sync::{Arc, PoisonError, RwLock};

use crate::element::Element;
use crate::error::{Error, Result};

/// A fixed-size, zero-initialized buffer of `T`.
#[derive(Debug)]
pub struct Storage<T> {
    data: RwLock<Box<[T]>>,
    len: usize,
}

impl<T: Element> Storage<T> {
    /// Allocates `len` zeroed elements.
    ///
    /// # Errors
    ///
    /// [`Error::Allocation`] if the host allocator refuses the request.
    pub fn allocate(len: usize) -> Result<Arc<Self>> {
        let bytes = len.saturating_mul(size_of::<T>());
        let mut buf = Vec::new();
        buf.try_reserve_exact(len)
            .map_err(|_| Error::Allocation { bytes })?;
        buf.resize(len, T::zero());
        log::trace!("allocated storage of {len} elements ({bytes} bytes)");
        Ok(Arc::new(Self {
            data: RwLock::new(buf.into_boxed_slice()),
            len,
        }))
    }

    /// Wraps an existing buffer without copying.
    pub fn from_vec(data: Vec<T>) -> Arc<Self> {
        let len = data.len();
        Arc::new(Self {
            data: RwLock::new(data.into_boxed_slice()),
            len,
        })
    }

    /// Number of elements in the buffer.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Size of the buffer in bytes.
    pub fn byte_len(&self) -> usize {
        self.len * size_of::<T>()
    }

    /// Runs `f` over the whole buffer with shared access.
    pub fn read<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        let guard = self.data.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Runs `f` over the whole buffer with exclusive access.
    pub fn write<R>(&self, f: impl FnOnce(&mut [T]) -> R) -> R {
        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Reads one element.
    pub fn get(&self, index: usize) -> T {
        self.read(|buf| buf[index])
    }

    /// Overwrites one element.
    pub fn set(&self, index: usize, value: T) {
        self.write(|buf| buf[index] = value);
    }

    /// Whether two handles point to the same buffer.
    pub fn same(a: &Arc<Self>, b: &Arc<Self>) -> bool {
        Arc::ptr_eq(a, b)
    }
}
