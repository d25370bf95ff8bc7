//! Reductions and row-wise activations.
//!
//! These run on the host regardless of the selected device.

use super::Array;
use crate::element::Element;
use crate::error::{Result, shape_err};
use crate::ops::cpu;

impl<T: Element> Array<T> {
    /// Sum of all elements.
    pub fn sum(&self) -> T {
        self.to_vec().into_iter().fold(T::zero(), T::add)
    }

    /// Sums along `axis`, removing that dimension.
    ///
    /// # Errors
    ///
    /// [`Error::Shape`](crate::Error::Shape) if `axis` is not below the rank.
    pub fn sum_axis(&self, axis: usize) -> Result<Self> {
        let (outer, len, inner, shape) = self.split_axis(axis)?;
        let values = self.to_vec();
        let out = Self::empty(&shape)?;
        out.with_span_mut(|o| {
            for i in 0..outer {
                for j in 0..inner {
                    o[i * inner + j] = (0..len)
                        .map(|k| values[(i * len + k) * inner + j])
                        .fold(T::zero(), T::add);
                }
            }
        });
        Ok(out)
    }

    /// Arithmetic mean of all elements, computed in `f32`.
    ///
    /// An empty array has a `NaN` mean.
    pub fn mean(&self) -> f32 {
        #[allow(clippy::cast_precision_loss)]
        let n = self.element_count() as f32;
        self.to_vec().into_iter().map(T::to_f32).sum::<f32>() / n
    }

    /// Mean along `axis`, computed in `f32`.
    ///
    /// # Errors
    ///
    /// [`Error::Shape`](crate::Error::Shape) if `axis` is not below the rank.
    pub fn mean_axis(&self, axis: usize) -> Result<Array<f32>> {
        let (outer, len, inner, shape) = self.split_axis(axis)?;
        let values = self.to_vec();
        #[allow(clippy::cast_precision_loss)]
        let n = len as f32;
        let out = Array::<f32>::empty(&shape)?;
        out.with_span_mut(|o| {
            for i in 0..outer {
                for j in 0..inner {
                    let sum: f32 = (0..len)
                        .map(|k| values[(i * len + k) * inner + j].to_f32())
                        .sum();
                    o[i * inner + j] = sum / n;
                }
            }
        });
        Ok(out)
    }

    /// Smallest element.
    ///
    /// # Errors
    ///
    /// [`Error::Shape`](crate::Error::Shape) if the array is empty.
    pub fn min(&self) -> Result<T> {
        self.to_vec()
            .into_iter()
            .reduce(|a, b| if b < a { b } else { a })
            .ok_or_else(|| shape_err!("min of an empty array"))
    }

    /// Largest element.
    ///
    /// # Errors
    ///
    /// [`Error::Shape`](crate::Error::Shape) if the array is empty.
    pub fn max(&self) -> Result<T> {
        self.to_vec()
            .into_iter()
            .reduce(|a, b| if b > a { b } else { a })
            .ok_or_else(|| shape_err!("max of an empty array"))
    }

    /// Number of non-zero elements.
    pub fn count(&self) -> usize {
        self.to_vec().into_iter().filter(|x| x.is_truthy()).count()
    }

    /// Whether `pred` holds for every element; `true` when empty.
    pub fn all(&self, mut pred: impl FnMut(T) -> bool) -> bool {
        self.to_vec().into_iter().all(|x| pred(x))
    }

    /// Logistic function `1 / (1 + e^-x)` of every element.
    ///
    /// # Errors
    ///
    /// [`Error::Allocation`](crate::Error::Allocation) if the result cannot be allocated.
    pub fn sigmoid(&self) -> Result<Array<f32>> {
        let src = self.contiguous()?;
        let out = Array::<f32>::empty(&self.shape)?;
        src.with_span(|input| {
            out.with_span_mut(|o| {
                cpu::map(input, o, |x: T| 1.0 / (1.0 + (-x.to_f32()).exp()));
            });
        });
        Ok(out)
    }

    /// Softmax of a vector, or of every row of a matrix.
    ///
    /// Each row is shifted by its minimum before exponentiation, and every
    /// output row sums to one.
    ///
    /// # Errors
    ///
    /// [`Error::Shape`](crate::Error::Shape) unless the array is 1-d or 2-d.
    pub fn softmax(&self) -> Result<Array<f32>> {
        let width = match self.shape.as_slice() {
            &[n] | &[_, n] => n,
            shape => return Err(shape_err!("softmax of a {}-d array", shape.len())),
        };
        let values: Vec<f32> = self.to_vec().into_iter().map(T::to_f32).collect();
        let out = Array::<f32>::empty(&self.shape)?;
        if width == 0 {
            return Ok(out);
        }
        out.with_span_mut(|o| {
            for (row, dst) in values.chunks(width).zip(o.chunks_mut(width)) {
                let shift = row.iter().copied().fold(f32::INFINITY, f32::min);
                for (d, &x) in dst.iter_mut().zip(row) {
                    *d = (x - shift).exp();
                }
                let total: f32 = dst.iter().sum();
                dst.iter_mut().for_each(|d| *d /= total);
            }
        });
        Ok(out)
    }

    /// Column index of the largest element of each row of a matrix.
    ///
    /// Ties resolve to the first occurrence.
    ///
    /// # Errors
    ///
    /// [`Error::Shape`](crate::Error::Shape) unless the array is 2-d with non-empty rows.
    pub fn argmax(&self) -> Result<Array<i32>> {
        let (rows, cols) = match self.shape.as_slice() {
            &[r, c] => (r, c),
            shape => return Err(shape_err!("argmax of a {}-d array", shape.len())),
        };
        if cols == 0 && rows > 0 {
            return Err(shape_err!("argmax of rows with no elements"));
        }
        let values = self.to_vec();
        let mut indices = Vec::with_capacity(rows);
        for row in values.chunks(cols.max(1)).take(rows) {
            let mut best = 0;
            for (j, x) in row.iter().enumerate().skip(1) {
                if *x > row[best] {
                    best = j;
                }
            }
            let best = i32::try_from(best)
                .map_err(|_| shape_err!("column index {best} does not fit an i32"))?;
            indices.push(best);
        }
        Array::from_shape_vec(&[rows], indices)
    }

    /// Mean of the squared elementwise difference, `mean((self - rhs)^2)`.
    ///
    /// # Errors
    ///
    /// As for [`Array::try_sub`].
    pub fn mean_square_error(&self, rhs: &Self) -> Result<f32> {
        let diff = self.try_sub(rhs)?;
        Ok(diff.try_mul(&diff)?.mean())
    }

    /// `(outer, len, inner, remaining shape)` for a reduction over `axis`.
    fn split_axis(&self, axis: usize) -> Result<(usize, usize, usize, Vec<usize>)> {
        if axis >= self.dimension() {
            return Err(shape_err!(
                "axis {axis} out of range for a {}-d array",
                self.dimension()
            ));
        }
        let outer = self.shape[..axis].iter().product();
        let inner = self.shape[axis + 1..].iter().product();
        let mut shape = self.shape.clone();
        let len = shape.remove(axis);
        Ok((outer, len, inner, shape))
    }
}
