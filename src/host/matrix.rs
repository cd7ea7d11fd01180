//! Dense owned matrix with compile-time extents and storage order.

use std::ops::{Index, IndexMut};

use crate::error::{invalid_shape, DispatchError, Result};
use crate::operand::{DenseOperand, DenseOperandMut, Element, Extent, StaticLayout, DYNAMIC};

use super::Transpose;

/// Dense matrix stored in one contiguous buffer.
///
/// `R` and `C` are compile-time row and column counts, or [`DYNAMIC`] when
/// the extent is chosen at run time. `ROW_MAJOR` selects the storage order.
/// Every value has direct memory access.
///
/// ```
/// use vml_dispatch::{MatrixXd, VectorXd};
///
/// let v = VectorXd::from_column(vec![1.0, 2.0, 3.0]);
/// assert_eq!(v.rows(), 3);
/// assert_eq!(v[(2, 0)], 3.0);
///
/// // Column-major: the buffer is walked column by column.
/// let m = MatrixXd::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
/// assert_eq!(m[(0, 1)], 3.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T, const R: usize, const C: usize, const ROW_MAJOR: bool> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

/// Dynamically sized column vector.
pub type VectorX<T> = Matrix<T, DYNAMIC, 1, false>;
/// Dynamically sized row vector.
pub type RowVectorX<T> = Matrix<T, 1, DYNAMIC, true>;
/// Column vector with a compile-time length.
pub type FixedVector<T, const N: usize> = Matrix<T, N, 1, false>;
/// Dynamically sized column-major matrix.
pub type MatrixX<T> = Matrix<T, DYNAMIC, DYNAMIC, false>;
/// Dynamically sized row-major matrix.
pub type RowMatrixX<T> = Matrix<T, DYNAMIC, DYNAMIC, true>;

pub type VectorXd = VectorX<f64>;
pub type VectorXf = VectorX<f32>;
pub type RowVectorXd = RowVectorX<f64>;
pub type RowVectorXf = RowVectorX<f32>;
pub type MatrixXd = MatrixX<f64>;
pub type MatrixXf = MatrixX<f32>;
pub type RowMatrixXd = RowMatrixX<f64>;
pub type RowMatrixXf = RowMatrixX<f32>;

impl<T: Element, const R: usize, const C: usize, const ROW_MAJOR: bool> Matrix<T, R, C, ROW_MAJOR> {
    fn check_shape(rows: usize, cols: usize) -> Result<()> {
        if !Extent::from_const(R).admits(rows) {
            return Err(invalid_shape(rows, cols, format!("row count is fixed at {R}")));
        }
        if !Extent::from_const(C).admits(cols) {
            return Err(invalid_shape(rows, cols, format!("column count is fixed at {C}")));
        }
        if rows.checked_mul(cols).is_none() {
            return Err(invalid_shape(rows, cols, "element count overflows usize"));
        }
        Ok(())
    }

    /// Wraps a buffer laid out in this type's storage order.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Result<Self> {
        Self::check_shape(rows, cols)?;

        let expected = rows * cols;
        if data.len() != expected {
            return Err(DispatchError::BufferLength {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self { data, rows, cols })
    }

    /// Builds a matrix from a function of `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if the extents contradict the compile-time extents.
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        if let Err(err) = Self::check_shape(rows, cols) {
            panic!("{err}");
        }

        let mut data = Vec::with_capacity(rows * cols);
        if ROW_MAJOR {
            for r in 0..rows {
                for c in 0..cols {
                    data.push(f(r, c));
                }
            }
        } else {
            for c in 0..cols {
                for r in 0..rows {
                    data.push(f(r, c));
                }
            }
        }

        Self { data, rows, cols }
    }

    /// All-zero matrix.
    ///
    /// # Panics
    ///
    /// Panics if the extents contradict the compile-time extents.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::from_fn(rows, cols, |_, _| T::zero())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The buffer in storage order.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Borrowed view with rows and columns swapped.
    ///
    /// The view shares this buffer, so its storage order is the opposite one.
    pub fn transpose(&self) -> Transpose<'_, Self> {
        Transpose::new(self)
    }

    #[inline(always)]
    fn offset(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.rows && col < self.cols,
            "index ({row}, {col}) out of bounds for {}x{} matrix",
            self.rows,
            self.cols
        );
        if ROW_MAJOR {
            row * self.cols + col
        } else {
            col * self.rows + row
        }
    }
}

impl<T: Element, const R: usize> Matrix<T, R, 1, false> {
    /// Column vector owning `data`.
    ///
    /// # Panics
    ///
    /// Panics if `R` is fixed and differs from `data.len()`.
    pub fn from_column(data: Vec<T>) -> Self {
        match Self::from_vec(data.len(), 1, data) {
            Ok(v) => v,
            Err(err) => panic!("{err}"),
        }
    }

    /// `n` evenly spaced values from `low` to `high` inclusive.
    pub fn lin_spaced(n: usize, low: T, high: T) -> Self {
        let spaced = super::LinSpaced::new(n, low, high);
        Self::from_fn(n, 1, |r, _| spaced.value(r))
    }
}

impl<T: Element, const C: usize> Matrix<T, 1, C, true> {
    /// Row vector owning `data`.
    ///
    /// # Panics
    ///
    /// Panics if `C` is fixed and differs from `data.len()`.
    pub fn from_row(data: Vec<T>) -> Self {
        match Self::from_vec(1, data.len(), data) {
            Ok(v) => v,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<T: Element, const R: usize, const C: usize, const ROW_MAJOR: bool> Index<(usize, usize)>
    for Matrix<T, R, C, ROW_MAJOR>
{
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        &self.data[self.offset(row, col)]
    }
}

impl<T: Element, const R: usize, const C: usize, const ROW_MAJOR: bool> IndexMut<(usize, usize)>
    for Matrix<T, R, C, ROW_MAJOR>
{
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        let offset = self.offset(row, col);
        &mut self.data[offset]
    }
}

impl<T: Element, const R: usize, const C: usize, const ROW_MAJOR: bool> StaticLayout
    for Matrix<T, R, C, ROW_MAJOR>
{
    type Elem = T;
    const DIRECT_ACCESS: bool = true;
    const ROW_MAJOR: bool = ROW_MAJOR;
    const ROWS: Extent = Extent::from_const(R);
    const COLS: Extent = Extent::from_const(C);
}

impl<T: Element, const R: usize, const C: usize, const ROW_MAJOR: bool> DenseOperand
    for Matrix<T, R, C, ROW_MAJOR>
{
    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn data(&self) -> Option<&[T]> {
        Some(&self.data)
    }

    fn coeff(&self, row: usize, col: usize) -> T {
        self[(row, col)]
    }
}

impl<T: Element, const R: usize, const C: usize, const ROW_MAJOR: bool> DenseOperandMut
    for Matrix<T, R, C, ROW_MAJOR>
{
    fn data_mut(&mut self) -> Option<&mut [T]> {
        Some(&mut self.data)
    }

    fn set_coeff(&mut self, row: usize, col: usize, value: T) {
        self[(row, col)] = value;
    }
}
