//! Coefficient-wise expressions.
//!
//! An expression borrows its operands and records the operation; nothing is
//! evaluated until it is assigned to a destination through a
//! [`Router`](crate::Router) (or [`assign`](crate::assign)).
//!
//! ```
//! use vml_dispatch::{assign, ArrayMath, DispatchPath, VectorXd};
//!
//! let a = VectorXd::lin_spaced(1000, 0.0, 1.0);
//! let mut b = VectorXd::zeros(1000, 1);
//!
//! assert_eq!(assign(&mut b, &a.exp()), DispatchPath::Vectorized);
//! assert_eq!(b[(999, 0)], 1f64.exp());
//! ```

use std::ops::Add;

use crate::config::DispatchConfig;
use crate::error::Result;
use crate::host::Matrix;
use crate::native::NativeLibrary;
use crate::operand::{DenseOperand, DenseOperandMut, Element};
use crate::router::{DispatchPath, Router};
use crate::routing::{BinaryOp, UnaryOp};

/// An unevaluated expression that can be assigned to a destination.
pub trait Expression {
    type Elem: Element;

    fn rows(&self) -> usize;

    fn cols(&self) -> usize;

    /// Evaluates into `dst` through `router`.
    fn try_assign_to<D, L, C>(&self, router: &Router<L, C>, dst: &mut D) -> Result<DispatchPath>
    where
        D: DenseOperandMut<Elem = Self::Elem>,
        L: NativeLibrary,
        C: DispatchConfig;
}

/// `op(src)`, coefficient by coefficient.
#[derive(Debug)]
pub struct CwiseUnary<'a, S> {
    op: UnaryOp,
    src: &'a S,
}

impl<'a, S: DenseOperand> CwiseUnary<'a, S> {
    pub fn new(op: UnaryOp, src: &'a S) -> Self {
        Self { op, src }
    }

    pub fn op(&self) -> UnaryOp {
        self.op
    }

    pub fn src(&self) -> &'a S {
        self.src
    }
}

impl<S: DenseOperand> Expression for CwiseUnary<'_, S> {
    type Elem = S::Elem;

    fn rows(&self) -> usize {
        self.src.rows()
    }

    fn cols(&self) -> usize {
        self.src.cols()
    }

    fn try_assign_to<D, L, C>(&self, router: &Router<L, C>, dst: &mut D) -> Result<DispatchPath>
    where
        D: DenseOperandMut<Elem = S::Elem>,
        L: NativeLibrary,
        C: DispatchConfig,
    {
        router.try_assign_unary(dst, self.op, self.src)
    }
}

/// `op(lhs, rhs)`, coefficient by coefficient.
#[derive(Debug)]
pub struct CwiseBinary<'a, Lhs, Rhs> {
    op: BinaryOp,
    lhs: &'a Lhs,
    rhs: &'a Rhs,
}

impl<'a, Lhs, Rhs> CwiseBinary<'a, Lhs, Rhs>
where
    Lhs: DenseOperand,
    Rhs: DenseOperand<Elem = Lhs::Elem>,
{
    pub fn new(op: BinaryOp, lhs: &'a Lhs, rhs: &'a Rhs) -> Self {
        Self { op, lhs, rhs }
    }

    pub fn op(&self) -> BinaryOp {
        self.op
    }

    pub fn lhs(&self) -> &'a Lhs {
        self.lhs
    }

    pub fn rhs(&self) -> &'a Rhs {
        self.rhs
    }
}

impl<Lhs, Rhs> Expression for CwiseBinary<'_, Lhs, Rhs>
where
    Lhs: DenseOperand,
    Rhs: DenseOperand<Elem = Lhs::Elem>,
{
    type Elem = Lhs::Elem;

    fn rows(&self) -> usize {
        self.lhs.rows()
    }

    fn cols(&self) -> usize {
        self.lhs.cols()
    }

    fn try_assign_to<D, L, C>(&self, router: &Router<L, C>, dst: &mut D) -> Result<DispatchPath>
    where
        D: DenseOperandMut<Elem = Lhs::Elem>,
        L: NativeLibrary,
        C: DispatchConfig,
    {
        router.try_assign_binary(dst, self.op, self.lhs, self.rhs)
    }
}

/// Builds coefficient-wise expressions from any operand.
///
/// `ndarray` arrays have inherent methods with the same names, which take
/// precedence; build their expressions with [`CwiseUnary::new`] and
/// [`CwiseBinary::new`] instead.
pub trait ArrayMath: DenseOperand + Sized {
    fn exp(&self) -> CwiseUnary<'_, Self> {
        CwiseUnary::new(UnaryOp::Exp, self)
    }

    fn sin(&self) -> CwiseUnary<'_, Self> {
        CwiseUnary::new(UnaryOp::Sin, self)
    }

    fn cos(&self) -> CwiseUnary<'_, Self> {
        CwiseUnary::new(UnaryOp::Cos, self)
    }

    fn sqrt(&self) -> CwiseUnary<'_, Self> {
        CwiseUnary::new(UnaryOp::Sqrt, self)
    }

    /// Natural logarithm.
    fn log(&self) -> CwiseUnary<'_, Self> {
        CwiseUnary::new(UnaryOp::Log, self)
    }

    fn log10(&self) -> CwiseUnary<'_, Self> {
        CwiseUnary::new(UnaryOp::Log10, self)
    }

    fn asin(&self) -> CwiseUnary<'_, Self> {
        CwiseUnary::new(UnaryOp::Asin, self)
    }

    fn sinh(&self) -> CwiseUnary<'_, Self> {
        CwiseUnary::new(UnaryOp::Sinh, self)
    }

    fn acos(&self) -> CwiseUnary<'_, Self> {
        CwiseUnary::new(UnaryOp::Acos, self)
    }

    fn cosh(&self) -> CwiseUnary<'_, Self> {
        CwiseUnary::new(UnaryOp::Cosh, self)
    }

    fn tan(&self) -> CwiseUnary<'_, Self> {
        CwiseUnary::new(UnaryOp::Tan, self)
    }

    fn atan(&self) -> CwiseUnary<'_, Self> {
        CwiseUnary::new(UnaryOp::Atan, self)
    }

    fn tanh(&self) -> CwiseUnary<'_, Self> {
        CwiseUnary::new(UnaryOp::Tanh, self)
    }

    fn log2(&self) -> CwiseUnary<'_, Self> {
        CwiseUnary::new(UnaryOp::Log2, self)
    }

    /// Coefficient-wise sum.
    fn plus<'a, R>(&'a self, rhs: &'a R) -> CwiseBinary<'a, Self, R>
    where
        R: DenseOperand<Elem = Self::Elem>,
    {
        CwiseBinary::new(BinaryOp::Sum, self, rhs)
    }

    /// Coefficient-wise `self[i].powf(exponent[i])`.
    fn pow<'a, R>(&'a self, exponent: &'a R) -> CwiseBinary<'a, Self, R>
    where
        R: DenseOperand<Elem = Self::Elem>,
    {
        CwiseBinary::new(BinaryOp::Pow, self, exponent)
    }
}

impl<T: DenseOperand> ArrayMath for T {}

impl<'a, T, Rhs, const R: usize, const C: usize, const ROW_MAJOR: bool> Add<&'a Rhs>
    for &'a Matrix<T, R, C, ROW_MAJOR>
where
    T: Element,
    Rhs: DenseOperand<Elem = T>,
{
    type Output = CwiseBinary<'a, Matrix<T, R, C, ROW_MAJOR>, Rhs>;

    fn add(self, rhs: &'a Rhs) -> Self::Output {
        CwiseBinary::new(BinaryOp::Sum, self, rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{RowVectorXd, VectorXd, VectorXf};

    #[test]
    fn test_unary_builders_record_op() {
        let v = VectorXd::zeros(4, 1);
        assert_eq!(v.exp().op(), UnaryOp::Exp);
        assert_eq!(v.log().op(), UnaryOp::Log);
        assert_eq!(v.log2().op(), UnaryOp::Log2);
        assert_eq!(Expression::rows(&v.tanh()), 4);
    }

    #[test]
    fn test_binary_builders_record_op() {
        let a = VectorXf::zeros(3, 1);
        let b = VectorXf::zeros(3, 1);
        assert_eq!(a.plus(&b).op(), BinaryOp::Sum);
        assert_eq!(a.pow(&b).op(), BinaryOp::Pow);
        assert_eq!((&a + &b).op(), BinaryOp::Sum);
    }

    #[test]
    fn test_expression_extent_follows_lhs() {
        let a = RowVectorXd::zeros(1, 5);
        let e = a.pow(&a);
        assert_eq!((Expression::rows(&e), Expression::cols(&e)), (1, 5));
    }
}
