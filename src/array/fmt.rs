use core::fmt;

use super::Array;
use crate::element::Element;

impl<T: Element> Array<T> {
    /// One-line summary of type and layout.
    ///
    /// ```
    /// use briny_array::array;
    ///
    /// let a = array![[1.0_f32, 2.0], [3.0, 4.0], [5.0, 6.0]];
    /// assert_eq!(a.info(), "dtype: float, dim: 2, shape: {3, 2}, strides: {2, 1}");
    /// ```
    pub fn info(&self) -> String {
        format!(
            "dtype: {}, dim: {}, shape: {}, strides: {}",
            T::DTYPE.name(),
            self.dimension(),
            braced(&self.shape),
            braced(&self.strides)
        )
    }
}

fn braced(values: &[usize]) -> String {
    let inner: Vec<String> = values.iter().map(ToString::to_string).collect();
    format!("{{{}}}", inner.join(", "))
}

/// Writes `values` (row-major, of `shape`) as nested braces. Sibling blocks of
/// rank `r` are separated by `r` newlines and indented to their depth.
fn write_nested<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    values: &[T],
    shape: &[usize],
    depth: usize,
) -> fmt::Result {
    let Some((&len, rest)) = shape.split_first() else {
        return write!(f, "{}", values[0]);
    };
    if rest.is_empty() {
        write!(f, "{{")?;
        for (i, x) in values.iter().take(len).enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{x}")?;
        }
        return write!(f, "}}");
    }

    let stride: usize = rest.iter().product();
    write!(f, "{{")?;
    for i in 0..len {
        if i > 0 {
            write!(f, ",")?;
            for _ in 0..rest.len() {
                writeln!(f)?;
            }
            write!(f, "{:indent$}", "", indent = depth + 1)?;
        }
        write_nested(f, &values[i * stride..(i + 1) * stride], rest, depth + 1)?;
    }
    write!(f, "}}")
}

impl<T: Element> fmt::Display for Array<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_nested(f, &self.to_vec(), &self.shape, 0)
    }
}

impl<T: Element> fmt::Debug for Array<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Array")
            .field("dtype", &T::DTYPE)
            .field("shape", &self.shape)
            .field("strides", &self.strides)
            .field("offset", &self.offset)
            .field("len", &self.len)
            .field("data", &self.to_vec())
            .finish()
    }
}
