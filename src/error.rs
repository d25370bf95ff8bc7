//! Error types shared by every array operation.

/// Errors raised by array construction, indexing and computation.
///
/// Arithmetic edge cases (division by zero, overflow) are not errors; they
/// follow the element type's native semantics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Incompatible shapes for broadcast, a binary operation or `dot`, or an
    /// unsupported rank for a shape-sensitive reduction.
    #[error("shape error: {0}")]
    Shape(String),

    /// Out-of-range element, row or position access.
    #[error("index error: {0}")]
    Index(String),

    /// A nested literal whose sub-lists disagree on length or depth.
    #[error("invalid literal: {0}")]
    InvalidLiteral(String),

    /// The host allocator could not provide a buffer of the requested size.
    #[error("failed to allocate {bytes} bytes")]
    Allocation {
        /// Size of the rejected request.
        bytes: usize,
    },

    /// The GPU backend failed to initialize, compile or execute.
    #[error("backend error: {0}")]
    Backend(String),

    /// The operation is not defined for this array's rank.
    #[error("unsupported operation: {0}")]
    Unsupported(String),
}

/// Convenience alias for `Result<T, briny_array::Error>`.
pub type Result<T> = core::result::Result<T, Error>;

macro_rules! shape_err {
    ($($arg:tt)*) => { $crate::error::Error::Shape(format!($($arg)*)) };
}

macro_rules! index_err {
    ($($arg:tt)*) => { $crate::error::Error::Index(format!($($arg)*)) };
}

pub(crate) use index_err;
pub(crate) use shape_err;
