//! Operation Dispatch Layer
//!
//! Validates and broadcasts operands, allocates the output, and hands the
//! physical spans to the kernel of the selected [`Device`].
//!
//! Operations the GPU kernels do not implement ([`Operation::Pow`]) always run
//! on the CPU. Selecting [`Device::Gpu`] without the `wgpu` feature is a
//! [`Error::Backend`] rather than a silent fallback.
//!
//! # Example
//! ```rust
//! use briny_array::{array, Device, Operation};
//! use briny_array::ops::dispatch::binary_op_on;
//!
//! let a = array![[1, 2, 3], [4, 5, 6]];
//! let b = array![1, 2, 3];
//! let sum = binary_op_on(Device::Cpu, &a, &b, Operation::Add).unwrap();
//! assert_eq!(sum, array![[2, 4, 6], [5, 7, 9]]);
//! ```

use crate::array::Array;
use crate::backend::{Device, get_device};
use crate::element::{Element, Operation};
use crate::error::{Error, Result, shape_err};
use crate::shape::{Broadcast, broadcast_pair};

/// Applies `op` elementwise on the current device; see [`binary_op_on`].
///
/// # Errors
///
/// See [`binary_op_on`].
pub fn binary_op<T: Element>(lhs: &Array<T>, rhs: &Array<T>, op: Operation) -> Result<Array<T>> {
    binary_op_on(get_device(), lhs, rhs, op)
}

/// Applies `op` elementwise on `device`, broadcasting the lower-rank operand.
///
/// The result is a fresh array; neither operand is modified, and the operands
/// may be views of the same storage.
///
/// # Errors
///
/// - [`Error::Shape`] if the shapes are not broadcast-compatible.
/// - [`Error::Allocation`] if the output cannot be allocated.
/// - [`Error::Backend`] if the GPU is selected but unavailable or fails.
pub fn binary_op_on<T: Element>(
    device: Device,
    lhs: &Array<T>,
    rhs: &Array<T>,
    op: Operation,
) -> Result<Array<T>> {
    let (shape, side) = broadcast_pair(lhs.shape(), rhs.shape())?;
    let (lhs, rhs) = match side {
        Broadcast::None => (lhs.share(), rhs.share()),
        Broadcast::Lhs => (lhs.broadcast(&shape)?, rhs.share()),
        Broadcast::Rhs => (lhs.share(), rhs.broadcast(&shape)?),
    };

    let device = if op.gpu_supported() { device } else { Device::Cpu };
    log::debug!("{op:?} on {device}: {shape:?} ({})", T::DTYPE.name());

    let out = Array::<T>::empty(&shape)?;
    lhs.with_spans(&rhs, |a, b| {
        out.with_span_mut(|o| match device {
            Device::Cpu => {
                super::cpu::elementwise(op, a, b, o);
                Ok(())
            }
            Device::Gpu => gpu_elementwise(op, a, b, o),
        })
    })?;
    Ok(out)
}

/// Contracts `lhs` and `rhs` on the current device; see [`dot_on`].
///
/// # Errors
///
/// See [`dot_on`].
pub fn dot<T: Element>(lhs: &Array<T>, rhs: &Array<T>) -> Result<Array<T>> {
    dot_on(get_device(), lhs, rhs)
}

/// Matrix/vector product on `device`.
///
/// | `lhs`    | `rhs`    | result  |
/// |----------|----------|---------|
/// | `[n]`    | `[n]`    | `[]`    |
/// | `[m, k]` | `[k, n]` | `[m, n]`|
/// | `[k]`    | `[k, n]` | `[n]`   |
/// | `[m, k]` | `[k]`    | `[m]`   |
///
/// # Errors
///
/// - [`Error::Shape`] for any other rank pair or a contraction mismatch.
/// - [`Error::Allocation`] and [`Error::Backend`] as for [`binary_op_on`].
pub fn dot_on<T: Element>(device: Device, lhs: &Array<T>, rhs: &Array<T>) -> Result<Array<T>> {
    let (a, b) = (lhs.shape(), rhs.shape());
    let (rows, inner, inner_rhs, cols, shape) = match (a, b) {
        (&[n], &[m]) => (1, n, m, 1, Vec::new()),
        (&[r, k], &[l, c]) => (r, k, l, c, vec![r, c]),
        (&[k], &[l, c]) => (1, k, l, c, vec![c]),
        (&[r, k], &[l]) => (r, k, l, 1, vec![r]),
        _ => {
            return Err(shape_err!(
                "dot is defined for 1-d and 2-d operands, got {a:?} and {b:?}"
            ));
        }
    };
    if inner != inner_rhs {
        return Err(shape_err!(
            "dot of {a:?} and {b:?}: contracted dimensions {inner} and {inner_rhs} differ"
        ));
    }

    let mut out = matmul_on(device, lhs, rhs, rows, cols, inner)?;
    out.reshape(&shape)?;
    Ok(out)
}

/// Row-major `[rows x inner] * [inner x cols]` product of two arrays holding
/// exactly those element counts, returned with shape `[rows, cols]`.
///
/// # Errors
///
/// [`Error::Shape`] if the element counts do not match the dimensions,
/// otherwise as for [`binary_op_on`].
pub fn matmul_on<T: Element>(
    device: Device,
    lhs: &Array<T>,
    rhs: &Array<T>,
    rows: usize,
    cols: usize,
    inner: usize,
) -> Result<Array<T>> {
    if lhs.element_count() != rows * inner || rhs.element_count() != inner * cols {
        return Err(shape_err!(
            "matmul of {rows}x{inner} by {inner}x{cols} got {} and {} elements",
            lhs.element_count(),
            rhs.element_count()
        ));
    }
    let (lhs, rhs) = (lhs.contiguous()?, rhs.contiguous()?);
    log::debug!("matmul on {device}: {rows}x{inner} * {inner}x{cols} ({})", T::DTYPE.name());

    let out = Array::<T>::empty(&[rows, cols])?;
    lhs.with_spans(&rhs, |a, b| {
        out.with_span_mut(|o| match device {
            Device::Cpu => {
                super::cpu::matmul(a, b, o, rows, cols, inner);
                Ok(())
            }
            Device::Gpu => gpu_matmul(a, b, o, rows, cols, inner),
        })
    })?;
    Ok(out)
}

#[cfg(feature = "wgpu")]
fn gpu_elementwise<T: Element>(op: Operation, a: &[T], b: &[T], out: &mut [T]) -> Result<()> {
    super::wgpu::elementwise(op, a, b, out).map_err(backend_error)
}

#[cfg(feature = "wgpu")]
fn gpu_matmul<T: Element>(
    a: &[T],
    b: &[T],
    out: &mut [T],
    rows: usize,
    cols: usize,
    inner: usize,
) -> Result<()> {
    super::wgpu::matmul(a, b, out, rows, cols, inner).map_err(backend_error)
}

#[cfg(feature = "wgpu")]
fn backend_error(e: super::wgpu::GpuError) -> Error {
    log::warn!("GPU kernel failed: {e}");
    Error::Backend(e.to_string())
}

#[cfg(not(feature = "wgpu"))]
fn gpu_elementwise<T: Element>(_: Operation, _: &[T], _: &[T], _: &mut [T]) -> Result<()> {
    Err(gpu_disabled())
}

#[cfg(not(feature = "wgpu"))]
fn gpu_matmul<T: Element>(
    _: &[T],
    _: &[T],
    _: &mut [T],
    _: usize,
    _: usize,
    _: usize,
) -> Result<()> {
    Err(gpu_disabled())
}

#[cfg(not(feature = "wgpu"))]
fn gpu_disabled() -> Error {
    Error::Backend("the GPU device needs the `wgpu` feature".into())
}
