use super::Array;
use crate::element::Element;
use crate::error::{Error, Result};
use crate::ops::dispatch;

impl<T: Element> Array<T> {
    /// Reverses the axes.
    ///
    /// - `[n]` becomes the row `[1, n]`, sharing storage.
    /// - `[1, n]` becomes the vector `[n]`, sharing storage.
    /// - `[r, c]` becomes `[c, r]` in fresh storage.
    /// - `[a, b, c]` becomes `[c, b, a]` in fresh storage.
    ///
    /// Since `[1, n]` always becomes `[n]`, a column `[n, 1]` transposes to
    /// `[1, n]` and back to `[n]`, not to `[n, 1]`. A one-row batch hits the
    /// same rule: for `x` of shape `[1, k]`, `x.transpose()` is the vector
    /// `[k]`; reshape it to `[k, 1]` when a column is needed.
    ///
    /// Broadcast views are materialized first.
    ///
    /// # Errors
    ///
    /// [`Error::Unsupported`] for 0-d arrays and ranks above 3.
    pub fn transpose(&self) -> Result<Self> {
        match *self.shape.as_slice() {
            [n] => {
                let mut row = self.contiguous()?;
                row.shape = vec![1, n];
                row.strides = vec![n, 1];
                Ok(row)
            }
            [1, n] => {
                let mut vector = self.contiguous()?;
                vector.shape = vec![n];
                vector.strides = vec![1];
                Ok(vector)
            }
            [r, c] => {
                let values = self.to_vec();
                let out = Self::empty(&[c, r])?;
                out.with_span_mut(|o| {
                    for i in 0..r {
                        for j in 0..c {
                            o[j * r + i] = values[i * c + j];
                        }
                    }
                });
                Ok(out)
            }
            [a, b, c] => {
                let values = self.to_vec();
                let out = Self::empty(&[c, b, a])?;
                out.with_span_mut(|o| {
                    for i in 0..a {
                        for j in 0..b {
                            for k in 0..c {
                                o[(k * b + j) * a + i] = values[(i * b + j) * c + k];
                            }
                        }
                    }
                });
                Ok(out)
            }
            _ => Err(Error::Unsupported(format!(
                "transpose of a {}-d array",
                self.dimension()
            ))),
        }
    }

    /// Inner, matrix, vector-matrix or matrix-vector product on the current
    /// device.
    ///
    /// ```
    /// use briny_array::array;
    ///
    /// let x = array![1, 2, 3];
    /// let w = array![[1, 2], [3, 4], [5, 6]];
    /// assert_eq!(x.dot(&w).unwrap(), array![22, 28]);
    /// ```
    ///
    /// # Errors
    ///
    /// See [`dispatch::dot_on`].
    pub fn dot(&self, rhs: &Self) -> Result<Self> {
        dispatch::dot(self, rhs)
    }

    /// Affine map `self.dot(weights) + bias`.
    ///
    /// # Errors
    ///
    /// As for [`Array::dot`] and [`Array::try_add`].
    pub fn linear(&self, weights: &Self, bias: &Self) -> Result<Self> {
        self.dot(weights)?.try_add(bias)
    }
}

#[cfg(test)]
mod tests {
    use crate::array;
    use crate::array::Array;
    use crate::backend::{Device, with_device};
    use crate::error::Error;

    #[test]
    fn vector_transposes_to_a_row_and_back() {
        let v = array![1, 2, 3, 4];
        let row = v.transpose().unwrap();
        assert_eq!(row.shape(), &[1, 4]);
        assert!(row.shares_storage(&v));
        let back = row.transpose().unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn matrix_and_cube_transposes_are_involutions() {
        let m = Array::from_shape_iter(&[2, 3], 1..).unwrap();
        let t = m.transpose().unwrap();
        assert_eq!(t, array![[1, 4], [2, 5], [3, 6]]);
        assert!(!t.shares_storage(&m));
        assert_eq!(t.transpose().unwrap(), m);

        let c = Array::from_shape_iter(&[2, 3, 4], 0..).unwrap();
        let ct = c.transpose().unwrap();
        assert_eq!(ct.shape(), &[4, 3, 2]);
        assert_eq!(ct.at3(3, 1, 0).unwrap(), c.at3(0, 1, 3).unwrap());
        assert_eq!(ct.transpose().unwrap(), c);
    }

    #[test]
    fn column_transposes_to_a_row_then_a_vector() {
        let col = array![[1], [2], [3]];
        let row = col.transpose().unwrap();
        assert_eq!(row, array![[1, 2, 3]]);
        assert_eq!(row.transpose().unwrap().shape(), &[3]);
    }

    #[test]
    fn transpose_rejects_other_ranks() {
        assert!(matches!(Array::scalar(1).transpose(), Err(Error::Unsupported(_))));
        let hyper = crate::zeros::<i32>(&[1, 1, 1, 1]).unwrap();
        assert!(matches!(hyper.transpose(), Err(Error::Unsupported(_))));
    }

    #[test]
    fn transpose_materializes_broadcasts() {
        let b = array![1, 2].broadcast(&[3, 2]).unwrap();
        assert_eq!(b.transpose().unwrap(), array![[1, 1, 1], [2, 2, 2]]);
    }

    #[test]
    fn linear_is_dot_plus_bias() {
        with_device(Device::Cpu, || {
            let x = array![[1.0_f32, 2.0]];
            let w = array![[1.0, 0.0, 2.0], [0.0, 1.0, 1.0]];
            let b = array![0.5, 0.5, 0.5];
            assert_eq!(x.linear(&w, &b).unwrap(), array![[1.5, 2.5, 4.5]]);
            assert!(matches!(x.linear(&b, &b), Err(Error::Shape(_))));
        });
    }
}
