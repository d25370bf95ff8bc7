//! briny_array: N-dimensional arrays with zero-copy views and CPU/GPU
//! dispatched arithmetic.
//!
//! An [`Array`] is a shape, its strides and a window into reference-counted
//! storage. Row slices, broadcasts and [`Array::share`] build new views over
//! the same buffer; writes through one are visible through all of them.
//! [`Clone`] is the only deep copy.
//!
//! # Features
//!
//! - `f32` and `i32` elements, built from nested literals with [`array!`].
//! - Elementwise `+ - * /` with prefix broadcasting, scalar promotion and
//!   fallible `try_*` forms.
//! - Matrix/vector products, transposition, reductions, softmax and argmax.
//! - A runtime-selectable compute [`Device`]: `rayon`-parallel CPU loops, or
//!   WGSL kernels through `wgpu` with the `wgpu` feature.
//!
//! # Modules
//!
//! - [`array`]: the [`Array`] type, its views, operators and reductions.
//! - [`backend`]: device selection.
//! - [`ops`]: kernel dispatch and the CPU/GPU kernels.
//! - [`shape`]: strides and the broadcasting rule.
//! - [`storage`]: the shared element buffers.
//! - [`approx`]: tolerance-based comparison.
//!
//! # Example
//!
//! ```rust
//! use briny_array::{array, Array};
//!
//! let a = array![[1, 2, 3], [4, 5, 6]];
//! let b = array![1, 2, 3];
//! assert_eq!(&a + &b, array![[2, 4, 6], [5, 7, 9]]);
//!
//! let w = Array::from_shape_iter(&[3, 2], 1..).unwrap();
//! assert_eq!(b.dot(&w).unwrap(), array![22, 28]);
//! ```

pub mod approx;
pub mod array;
pub mod backend;
pub mod element;
pub mod error;
pub mod ops;
pub mod shape;
pub mod storage;

pub use array::{Array, Elements, Literal, RowTuples, Rows, constants, empty, ones, random, zeros};
pub use backend::{Device, get_device, set_device, use_cpu, use_gpu, with_device};
pub use element::{DataType, Element, Operation};
pub use error::{Error, Result};
