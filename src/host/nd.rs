//! Operand adapters for `ndarray`.
//!
//! One-dimensional arrays are column vectors. Two-dimensional arrays are
//! row-major with dynamic extents, which is `ndarray`'s standard layout. An
//! array only exposes its buffer when it is contiguous in that layout; a
//! sliced, strided or Fortran-order array reports no buffer and is assigned
//! through the generic path.

use ndarray::{ArrayBase, Data, DataMut, Ix1, Ix2};

use crate::operand::{DenseOperand, DenseOperandMut, Element, Extent, StaticLayout};

impl<A: Element, S: Data<Elem = A>> StaticLayout for ArrayBase<S, Ix1> {
    type Elem = A;
    const DIRECT_ACCESS: bool = true;
    const ROW_MAJOR: bool = false;
    const ROWS: Extent = Extent::Dynamic;
    const COLS: Extent = Extent::Fixed(1);
}

impl<A: Element, S: Data<Elem = A>> DenseOperand for ArrayBase<S, Ix1> {
    fn rows(&self) -> usize {
        self.len()
    }

    fn cols(&self) -> usize {
        1
    }

    fn data(&self) -> Option<&[A]> {
        self.as_slice()
    }

    fn coeff(&self, row: usize, _col: usize) -> A {
        self[row]
    }
}

impl<A: Element, S: DataMut<Elem = A>> DenseOperandMut for ArrayBase<S, Ix1> {
    fn data_mut(&mut self) -> Option<&mut [A]> {
        self.as_slice_mut()
    }

    fn set_coeff(&mut self, row: usize, _col: usize, value: A) {
        self[row] = value;
    }
}

impl<A: Element, S: Data<Elem = A>> StaticLayout for ArrayBase<S, Ix2> {
    type Elem = A;
    const DIRECT_ACCESS: bool = true;
    const ROW_MAJOR: bool = true;
    const ROWS: Extent = Extent::Dynamic;
    const COLS: Extent = Extent::Dynamic;
}

impl<A: Element, S: Data<Elem = A>> DenseOperand for ArrayBase<S, Ix2> {
    fn rows(&self) -> usize {
        self.nrows()
    }

    fn cols(&self) -> usize {
        self.ncols()
    }

    fn data(&self) -> Option<&[A]> {
        self.as_slice()
    }

    fn coeff(&self, row: usize, col: usize) -> A {
        self[[row, col]]
    }
}

impl<A: Element, S: DataMut<Elem = A>> DenseOperandMut for ArrayBase<S, Ix2> {
    fn data_mut(&mut self) -> Option<&mut [A]> {
        self.as_slice_mut()
    }

    fn set_coeff(&mut self, row: usize, col: usize, value: A) {
        self[[row, col]] = value;
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{s, Array1, Array2, ShapeBuilder};

    use super::*;

    #[test]
    fn test_standard_layout_exposes_buffer() {
        let a = Array2::<f64>::zeros((3, 4));
        assert_eq!(DenseOperand::data(&a).map(<[f64]>::len), Some(12));
        assert_eq!((DenseOperand::rows(&a), DenseOperand::cols(&a)), (3, 4));
    }

    #[test]
    fn test_fortran_layout_hides_buffer() {
        let a = Array2::<f64>::zeros((3, 4).f());
        assert!(DenseOperand::data(&a).is_none());
    }

    #[test]
    fn test_strided_view_hides_buffer() {
        let a = Array1::from_iter((0..10).map(f64::from));
        let view = a.slice(s![..;2]);
        assert!(DenseOperand::data(&view).is_none());
        assert_eq!(view.coeff(3, 0), 6.0);
    }
}
