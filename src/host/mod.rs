//! Host array types.
//!
//! The dispatch core only needs the capability traits of
//! [`operand`](crate::operand); this module provides the types that
//! implement them:
//!
//! - [`Matrix`]: owned dense storage with compile-time extents and storage
//!   order, plus the usual `VectorXd`/`MatrixXd` aliases.
//! - [`Transpose`]: a borrowed view that swaps rows and columns without
//!   moving data, flipping the storage order.
//! - [`LinSpaced`]: a lazy sequence with no backing buffer.
//! - `ndarray` adapters for one- and two-dimensional arrays.

mod matrix;
mod nd;

pub use matrix::{
    FixedVector, Matrix, MatrixX, MatrixXd, MatrixXf, RowMatrixX, RowMatrixXd, RowMatrixXf,
    RowVectorX, RowVectorXd, RowVectorXf, VectorX, VectorXd, VectorXf,
};

use crate::operand::{DenseOperand, Element, Extent, StaticLayout};

/// Transposed view of an operand.
///
/// Coefficient `(r, c)` of the view is coefficient `(c, r)` of the inner
/// operand. The buffer is shared as is, so a column-major inner operand
/// yields a row-major view and vice versa.
#[derive(Debug)]
pub struct Transpose<'a, M> {
    inner: &'a M,
}

impl<M> Clone for Transpose<'_, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M> Copy for Transpose<'_, M> {}

impl<'a, M: DenseOperand> Transpose<'a, M> {
    pub fn new(inner: &'a M) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &'a M {
        self.inner
    }
}

impl<M: StaticLayout> StaticLayout for Transpose<'_, M> {
    type Elem = M::Elem;
    const DIRECT_ACCESS: bool = M::DIRECT_ACCESS;
    const ROW_MAJOR: bool = !M::ROW_MAJOR;
    const ROWS: Extent = M::COLS;
    const COLS: Extent = M::ROWS;
}

impl<M: DenseOperand> DenseOperand for Transpose<'_, M> {
    fn rows(&self) -> usize {
        self.inner.cols()
    }

    fn cols(&self) -> usize {
        self.inner.rows()
    }

    fn data(&self) -> Option<&[M::Elem]> {
        self.inner.data()
    }

    fn coeff(&self, row: usize, col: usize) -> M::Elem {
        self.inner.coeff(col, row)
    }
}

/// Lazy column vector of evenly spaced values.
///
/// Values are computed on access, so the operand has no memory to hand to a
/// native routine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinSpaced<T> {
    len: usize,
    low: T,
    high: T,
    step: T,
}

impl<T: Element> LinSpaced<T> {
    /// `len` values from `low` to `high`, both included. A single value is
    /// `high`.
    pub fn new(len: usize, low: T, high: T) -> Self {
        let step = if len > 1 {
            (high - low) / to_float::<T>(len - 1)
        } else {
            T::zero()
        };

        Self {
            len,
            low,
            high,
            step,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The `i`-th value.
    ///
    /// # Panics
    ///
    /// Panics if `i >= len`.
    pub fn value(&self, i: usize) -> T {
        assert!(i < self.len, "index {i} out of bounds for length {}", self.len);
        if i + 1 == self.len {
            self.high
        } else {
            self.low + self.step * to_float::<T>(i)
        }
    }
}

#[inline(always)]
fn to_float<T: Element>(n: usize) -> T {
    T::from(n).unwrap_or_else(T::nan)
}

impl<T: Element> StaticLayout for LinSpaced<T> {
    type Elem = T;
    const DIRECT_ACCESS: bool = false;
    const ROW_MAJOR: bool = false;
    const ROWS: Extent = Extent::Dynamic;
    const COLS: Extent = Extent::Fixed(1);
}

impl<T: Element> DenseOperand for LinSpaced<T> {
    fn rows(&self) -> usize {
        self.len
    }

    fn cols(&self) -> usize {
        1
    }

    fn data(&self) -> Option<&[T]> {
        None
    }

    fn coeff(&self, row: usize, _col: usize) -> T {
        self.value(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transpose_swaps_extents_and_order() {
        let m = MatrixXd::from_fn(2, 3, |r, c| (r * 3 + c) as f64);
        let t = m.transpose();

        assert_eq!((t.rows(), t.cols()), (3, 2));
        assert!(<Transpose<'_, MatrixXd> as StaticLayout>::ROW_MAJOR);
        assert_eq!(t.coeff(2, 1), m[(1, 2)]);
        assert_eq!(t.data(), Some(m.as_slice()));
    }

    #[test]
    fn test_transposed_buffer_is_row_major_of_view() {
        let m = MatrixXd::from_fn(3, 2, |r, c| (r * 10 + c) as f64);
        let t = m.transpose();
        let data = t.data().unwrap();

        for r in 0..t.rows() {
            for c in 0..t.cols() {
                assert_eq!(data[r * t.cols() + c], t.coeff(r, c));
            }
        }
    }

    #[test]
    fn test_lin_spaced_is_lazy() {
        let s = LinSpaced::new(3, -1.0f64, 1.0);
        assert!(s.data().is_none());
        assert!(!s.has_direct_access());
        assert_eq!([s.coeff(0, 0), s.coeff(1, 0), s.coeff(2, 0)], [-1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_lin_spaced_single_value_is_high() {
        let s = LinSpaced::new(1, 2.0f32, 5.0);
        assert_eq!(s.value(0), 5.0);
    }
}
