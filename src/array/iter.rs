//! Row, element and fixed-width row iterators.
//!
//! Each iterator holds its own handle to the array's storage and reads one
//! item at a time, so the loop body is free to write through any view of the
//! same array.

use super::Array;
use crate::element::Element;
use crate::error::{Result, shape_err};

/// Iterator over the row views of an array; see [`Array::rows`].
pub struct Rows<T: Element> {
    array: Array<T>,
    next: usize,
    end: usize,
}

impl<T: Element> Iterator for Rows<T> {
    type Item = Array<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let row = self.array.row(self.next).ok()?;
        self.next += 1;
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.end - self.next;
        (n, Some(n))
    }
}

impl<T: Element> ExactSizeIterator for Rows<T> {}

/// Iterator over every element in row-major order; see [`Array::elements`].
pub struct Elements<T: Element> {
    array: Array<T>,
    next: usize,
    end: usize,
}

impl<T: Element> Iterator for Elements<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.next >= self.end {
            return None;
        }
        let value = self.array.storage.get(self.array.physical(self.next));
        self.next += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.end - self.next;
        (n, Some(n))
    }
}

impl<T: Element> ExactSizeIterator for Elements<T> {}

/// Iterator yielding the first `N` elements of each row as an array; see
/// [`Array::row_tuples`].
pub struct RowTuples<T: Element, const N: usize> {
    rows: Rows<T>,
}

impl<T: Element, const N: usize> Iterator for RowTuples<T, N> {
    type Item = [T; N];

    fn next(&mut self) -> Option<[T; N]> {
        let row = self.rows.next()?;
        let mut out = [T::zero(); N];
        for (j, slot) in out.iter_mut().enumerate() {
            *slot = row.storage.get(row.physical(j));
        }
        Some(out)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl<T: Element, const N: usize> ExactSizeIterator for RowTuples<T, N> {}

impl<T: Element> Array<T> {
    /// Iterates over the rows along the first dimension as views.
    ///
    /// A 0-d array has no rows.
    pub fn rows(&self) -> Rows<T> {
        Rows {
            array: self.share(),
            next: 0,
            end: self.shape.first().copied().unwrap_or(0),
        }
    }

    /// Iterates over every element in row-major order.
    pub fn elements(&self) -> Elements<T> {
        Elements {
            array: self.share(),
            next: 0,
            end: self.element_count(),
        }
    }

    /// Iterates over rows, yielding the first `N` elements of each.
    ///
    /// ```
    /// use briny_array::array;
    ///
    /// let a = array![[0, 0, 1], [1, 1, 0]];
    /// let tuples: Vec<[i32; 2]> = a.row_tuples::<2>().unwrap().collect();
    /// assert_eq!(tuples, vec![[0, 0], [1, 1]]);
    /// ```
    ///
    /// # Errors
    ///
    /// [`Error::Shape`](crate::Error::Shape) if the array has fewer than two
    /// dimensions or its rows hold fewer than `N` elements.
    pub fn row_tuples<const N: usize>(&self) -> Result<RowTuples<T, N>> {
        if self.dimension() < 2 {
            return Err(shape_err!(
                "row tuples need at least 2 dimensions, array has {}",
                self.dimension()
            ));
        }
        let width: usize = self.shape[1..].iter().product();
        if N > width {
            return Err(shape_err!("cannot take {} elements from rows of {width}", N));
        }
        Ok(RowTuples { rows: self.rows() })
    }
}

impl<'a, T: Element> IntoIterator for &'a Array<T> {
    type Item = T;
    type IntoIter = Elements<T>;

    fn into_iter(self) -> Elements<T> {
        self.elements()
    }
}
