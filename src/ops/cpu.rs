//! Parallel CPU kernels
//!
//! These are the default implementations behind `ops::dispatch` and the
//! fallback for anything the GPU kernels do not cover.
//!
//! Operands arrive as the physical spans of their views. A span shorter than
//! the output is a broadcast operand and is read modulo its own length, which
//! matches how the GPU kernel addresses its buffers.
//!
//! Work is split across threads with [`rayon`](https://docs.rs/rayon).

use rayon::prelude::*;

use crate::element::{Element, Operation};

/// Writes `op(a[i % a.len()], b[i % b.len()])` into every `out[i]`.
///
/// Both inputs must be non-empty unless `out` is empty.
pub fn elementwise<T: Element>(op: Operation, a: &[T], b: &[T], out: &mut [T]) {
    if out.is_empty() {
        return;
    }
    let (a_len, b_len) = (a.len(), b.len());
    debug_assert!(a_len > 0 && b_len > 0);

    if a_len == out.len() && b_len == out.len() {
        out.par_iter_mut()
            .zip(a.par_iter().zip(b.par_iter()))
            .for_each(|(o, (&x, &y))| *o = op.apply(x, y));
    } else {
        out.par_iter_mut()
            .enumerate()
            .for_each(|(i, o)| *o = op.apply(a[i % a_len], b[i % b_len]));
    }
}

/// Row-major matrix product `out[rows x cols] = a[rows x inner] * b[inner x cols]`.
///
/// Each output row is computed on its own task; the inner sum runs in index
/// order.
pub fn matmul<T: Element>(a: &[T], b: &[T], out: &mut [T], rows: usize, cols: usize, inner: usize) {
    debug_assert_eq!(a.len(), rows * inner);
    debug_assert_eq!(b.len(), inner * cols);
    debug_assert_eq!(out.len(), rows * cols);
    if rows == 0 || cols == 0 {
        return;
    }

    out.par_chunks_mut(cols)
        .enumerate()
        .for_each(|(i, row)| {
            let a_row = &a[i * inner..(i + 1) * inner];
            for (j, o) in row.iter_mut().enumerate() {
                let mut sum = T::zero();
                for (l, &x) in a_row.iter().enumerate() {
                    sum = sum.add(x.mul(b[l * cols + j]));
                }
                *o = sum;
            }
        });
}

/// Maps every element through `f` into `out`.
pub fn map<T: Element, U: Element>(input: &[T], out: &mut [U], f: impl Fn(T) -> U + Sync) {
    out.par_iter_mut()
        .zip(input.par_iter())
        .for_each(|(o, &x)| *o = f(x));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elementwise_wraps_short_operands() {
        let a = [1, 2, 3, 4, 5, 6];
        let b = [1, 2, 3];
        let mut out = [0; 6];
        elementwise(Operation::Add, &a, &b, &mut out);
        assert_eq!(out, [2, 4, 6, 5, 7, 9]);

        elementwise(Operation::Mul, &a, &[10], &mut out);
        assert_eq!(out, [10, 20, 30, 40, 50, 60]);
    }

    #[test]
    fn matmul_matches_hand_computed_product() {
        let a = [1.0_f32, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
        let b = [1.0_f32, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let mut out = [0.0_f32; 6];
        matmul(&a, &b, &mut out, 3, 2, 4);
        assert_eq!(out, [50.0, 60.0, 114.0, 140.0, 178.0, 220.0]);
    }

    #[test]
    fn matmul_with_empty_inner_dimension_is_zero() {
        let mut out = [7; 4];
        matmul::<i32>(&[], &[], &mut out, 2, 2, 0);
        assert_eq!(out, [0; 4]);
    }

    #[test]
    fn map_converts_types() {
        let mut out = [0.0_f32; 3];
        map(&[1, 2, 3], &mut out, |x: i32| x as f32 * 0.5);
        assert_eq!(out, [0.5, 1.0, 1.5]);
    }
}
