//! # Kernel Dispatch Layer
//!
//! Elementwise arithmetic and matrix products run on one of two backends:
//!
//! - [`cpu`]: `rayon`-parallel loops (default, always available)
//! - [`wgpu`] *(opt-in)*: WGSL compute kernels through `wgpu`
//!
//! [`dispatch`] checks shapes, broadcasts operands and routes each call to the
//! backend chosen by [`get_device`](crate::backend::get_device). Both
//! backends receive the physical spans of the operands and address them the
//! same way, so a result does not depend on where it was computed beyond
//! floating-point rounding.
//!
//! ## Feature Flags
//!
//! - `wgpu`: enables the GPU backend

pub mod cpu;
pub mod dispatch;
#[cfg(feature = "wgpu")]
pub mod wgpu;
