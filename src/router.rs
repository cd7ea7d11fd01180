//! Operation router.
//!
//! [`Router`] carries out `dst := op(src)` and `dst := op(lhs, rhs)`:
//!
//! 1. The extents of every operand are checked against the destination.
//! 2. The eligibility verdict for the concrete types (a compile-time
//!    constant) and the element type pick a [`Strategy`] from the routing
//!    table.
//! 3. The strategy runs over the operands' flat buffers, or over their
//!    coefficients when no buffer can be obtained at run time.
//!
//! # Unary block split
//!
//! A vectorized unary assignment over `n` elements is split by the configured
//! SIMD width `w` into `n / w` full batches and `n % w` trailing elements. The
//! batches go to the native routine in a single call over the first
//! `(n / w) * w` elements; the trailing elements are computed with the
//! routing table's scalar reference. Binary assignments make one native call
//! over all `n` elements.

use std::marker::PhantomData;

use log::{debug, trace};

use crate::config::{DefaultConfig, DispatchConfig};
use crate::eligibility::{BinaryEligibility, UnaryEligibility};
use crate::error::{shape_mismatch, Result};
use crate::expr::Expression;
use crate::native::{Linked, NativeLibrary};
use crate::operand::{DenseOperand, DenseOperandMut, Element, StaticLayout};
use crate::routing::{select, BinaryOp, BinaryRoute, Operation, Strategy, UnaryOp, UnaryRoute};

/// How an assignment was actually carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchPath {
    /// Native routine over the flat buffers (unary remainders included).
    Vectorized,
    /// Flat scalar loop over the flat buffers.
    ScalarFallback,
    /// Coefficient-by-coefficient loop through the operand accessors.
    Generic,
}

/// Batches and trailing elements of a vectorized unary assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockPlan {
    /// Number of full batches.
    pub simd_blocks: usize,
    /// Elements left after the last full batch.
    pub remainder: usize,
    /// Elements covered by the native call.
    pub vector_len: usize,
}

impl BlockPlan {
    /// # Panics
    ///
    /// Panics if `width` is zero.
    pub const fn new(n: usize, width: usize) -> Self {
        assert!(width > 0, "SIMD width must be greater than zero");

        let simd_blocks = n / width;
        let vector_len = simd_blocks * width;

        Self {
            simd_blocks,
            remainder: n - vector_len,
            vector_len,
        }
    }
}

/// Dispatches coefficient-wise assignments.
///
/// `L` is the native library the vectorized strategy calls into and `C` the
/// compile-time configuration. A router holds no other state, so one can be
/// created per call or shared freely.
#[derive(Debug, Clone, Copy, Default)]
pub struct Router<L = Linked, C = DefaultConfig> {
    library: L,
    _config: PhantomData<fn() -> C>,
}

impl Router {
    /// Router over the linked routines with the build's configuration.
    pub const fn new() -> Self {
        Self {
            library: Linked,
            _config: PhantomData,
        }
    }
}

impl<L: NativeLibrary, C: DispatchConfig> Router<L, C> {
    pub fn with_library(library: L) -> Self {
        Self {
            library,
            _config: PhantomData,
        }
    }

    pub fn library(&self) -> &L {
        &self.library
    }

    pub fn into_library(self) -> L {
        self.library
    }

    /// Strategy this router uses for `D := op(S)`.
    pub fn unary_strategy<D, S>(op: UnaryOp) -> Strategy
    where
        D: StaticLayout,
        S: StaticLayout<Elem = D::Elem>,
    {
        select(
            Operation::Unary(op),
            <D::Elem as Element>::KIND,
            UnaryEligibility::<D, S, C>::ENABLED,
        )
    }

    /// Strategy this router uses for `D := op(Lhs, Rhs)`.
    pub fn binary_strategy<D, Lhs, Rhs>(op: BinaryOp) -> Strategy
    where
        D: StaticLayout,
        Lhs: StaticLayout<Elem = D::Elem>,
        Rhs: StaticLayout<Elem = D::Elem>,
    {
        select(
            Operation::Binary(op),
            <D::Elem as Element>::KIND,
            BinaryEligibility::<D, Lhs, Rhs, C>::ENABLED,
        )
    }

    /// Evaluates `expr` into `dst`.
    pub fn try_assign<D, E>(&self, dst: &mut D, expr: &E) -> Result<DispatchPath>
    where
        D: DenseOperandMut,
        E: Expression<Elem = D::Elem>,
    {
        expr.try_assign_to(self, dst)
    }

    /// Evaluates `expr` into `dst`.
    ///
    /// # Panics
    ///
    /// Panics if the extents of `dst` and `expr` differ.
    pub fn assign<D, E>(&self, dst: &mut D, expr: &E) -> DispatchPath
    where
        D: DenseOperandMut,
        E: Expression<Elem = D::Elem>,
    {
        unwrap_or_panic(self.try_assign(dst, expr))
    }

    /// `dst := op(src)`.
    pub fn try_assign_unary<D, S>(&self, dst: &mut D, op: UnaryOp, src: &S) -> Result<DispatchPath>
    where
        D: DenseOperandMut,
        S: DenseOperand<Elem = D::Elem>,
    {
        check_extents(&*dst, src)?;

        let strategy = Self::unary_strategy::<D, S>(op);
        trace!(
            "{}<{}>: {}x{} destination, strategy {:?}",
            op.name(),
            <D::Elem as Element>::KIND.name(),
            dst.rows(),
            dst.cols(),
            strategy
        );

        let path = match strategy {
            Strategy::VectorizedCall(_) => self.vectorized_unary(dst, op, src),
            Strategy::ScalarFallback => flat_unary(dst, op, src),
            Strategy::Unspecialized => generic_unary(dst, op, src),
        };
        Ok(path)
    }

    /// `dst := op(src)`.
    ///
    /// # Panics
    ///
    /// Panics if the extents of `dst` and `src` differ.
    pub fn assign_unary<D, S>(&self, dst: &mut D, op: UnaryOp, src: &S) -> DispatchPath
    where
        D: DenseOperandMut,
        S: DenseOperand<Elem = D::Elem>,
    {
        unwrap_or_panic(self.try_assign_unary(dst, op, src))
    }

    /// `dst := op(lhs, rhs)`.
    pub fn try_assign_binary<D, Lhs, Rhs>(
        &self,
        dst: &mut D,
        op: BinaryOp,
        lhs: &Lhs,
        rhs: &Rhs,
    ) -> Result<DispatchPath>
    where
        D: DenseOperandMut,
        Lhs: DenseOperand<Elem = D::Elem>,
        Rhs: DenseOperand<Elem = D::Elem>,
    {
        check_extents(&*dst, lhs)?;
        check_extents(&*dst, rhs)?;

        let strategy = Self::binary_strategy::<D, Lhs, Rhs>(op);
        trace!(
            "{}<{}>: {}x{} destination, strategy {:?}",
            op.name(),
            <D::Elem as Element>::KIND.name(),
            dst.rows(),
            dst.cols(),
            strategy
        );

        let path = match strategy {
            Strategy::VectorizedCall(_) => self.vectorized_binary(dst, op, lhs, rhs),
            Strategy::ScalarFallback => flat_binary(dst, op, lhs, rhs),
            Strategy::Unspecialized => generic_binary(dst, op, lhs, rhs),
        };
        Ok(path)
    }

    /// `dst := op(lhs, rhs)`.
    ///
    /// # Panics
    ///
    /// Panics if the extents of the operands differ.
    pub fn assign_binary<D, Lhs, Rhs>(
        &self,
        dst: &mut D,
        op: BinaryOp,
        lhs: &Lhs,
        rhs: &Rhs,
    ) -> DispatchPath
    where
        D: DenseOperandMut,
        Lhs: DenseOperand<Elem = D::Elem>,
        Rhs: DenseOperand<Elem = D::Elem>,
    {
        unwrap_or_panic(self.try_assign_binary(dst, op, lhs, rhs))
    }

    fn vectorized_unary<D, S>(&self, dst: &mut D, op: UnaryOp, src: &S) -> DispatchPath
    where
        D: DenseOperandMut,
        S: DenseOperand<Elem = D::Elem>,
    {
        let n = dst.size();
        let input = src.data().and_then(<S::Elem as Element>::as_f64);
        let output = dst.data_mut().and_then(<D::Elem as Element>::as_f64_mut);

        let done = match (input, output) {
            (Some(input), Some(output)) if input.len() == n && output.len() == n => {
                self.run_unary_blocks(op.route(), input, output);
                true
            }
            _ => false,
        };

        if done {
            DispatchPath::Vectorized
        } else {
            debug!("{}: no contiguous buffer, using the generic path", op.name());
            generic_unary(dst, op, src)
        }
    }

    fn run_unary_blocks(&self, route: &UnaryRoute, input: &[f64], output: &mut [f64]) {
        let plan = BlockPlan::new(output.len(), C::SIMD_WIDTH);
        let (head_in, tail_in) = input.split_at(plan.vector_len);
        let (head_out, tail_out) = output.split_at_mut(plan.vector_len);

        if plan.simd_blocks > 0 {
            trace!(
                "{}: {} blocks of {} through {}, {} trailing",
                route.name,
                plan.simd_blocks,
                C::SIMD_WIDTH,
                route.native_symbol,
                plan.remainder
            );
            self.library.unary(route, head_in, head_out);
        }

        for (out, &x) in tail_out.iter_mut().zip(tail_in) {
            *out = (route.scalar)(x);
        }
    }

    fn vectorized_binary<D, Lhs, Rhs>(
        &self,
        dst: &mut D,
        op: BinaryOp,
        lhs: &Lhs,
        rhs: &Rhs,
    ) -> DispatchPath
    where
        D: DenseOperandMut,
        Lhs: DenseOperand<Elem = D::Elem>,
        Rhs: DenseOperand<Elem = D::Elem>,
    {
        let n = dst.size();
        let lhs_buf = lhs.data().and_then(<Lhs::Elem as Element>::as_f64);
        let rhs_buf = rhs.data().and_then(<Rhs::Elem as Element>::as_f64);
        let output = dst.data_mut().and_then(<D::Elem as Element>::as_f64_mut);

        let done = match (lhs_buf, rhs_buf, output) {
            (Some(a), Some(b), Some(out)) if a.len() == n && b.len() == n && out.len() == n => {
                self.run_binary(op.route(), a, b, out);
                true
            }
            _ => false,
        };

        if done {
            DispatchPath::Vectorized
        } else {
            debug!("{}: no contiguous buffer, using the generic path", op.name());
            generic_binary(dst, op, lhs, rhs)
        }
    }

    fn run_binary(&self, route: &BinaryRoute, lhs: &[f64], rhs: &[f64], output: &mut [f64]) {
        if output.is_empty() {
            return;
        }
        trace!(
            "{}: {} elements through {}",
            route.name,
            output.len(),
            route.native_symbol
        );
        self.library.binary(route, lhs, rhs, output);
    }
}

fn unwrap_or_panic(result: Result<DispatchPath>) -> DispatchPath {
    match result {
        Ok(path) => path,
        Err(err) => panic!("{err}"),
    }
}

fn check_extents<D, S>(dst: &D, src: &S) -> Result<()>
where
    D: DenseOperand + ?Sized,
    S: DenseOperand + ?Sized,
{
    if dst.rows() == src.rows() && dst.cols() == src.cols() {
        Ok(())
    } else {
        Err(shape_mismatch(
            (dst.rows(), dst.cols()),
            (src.rows(), src.cols()),
        ))
    }
}

fn flat_unary<D, S>(dst: &mut D, op: UnaryOp, src: &S) -> DispatchPath
where
    D: DenseOperandMut,
    S: DenseOperand<Elem = D::Elem>,
{
    let n = dst.size();
    let done = match (src.data(), dst.data_mut()) {
        (Some(input), Some(output)) if input.len() == n && output.len() == n => {
            for (out, &x) in output.iter_mut().zip(input) {
                *out = D::Elem::unary(op, x);
            }
            true
        }
        _ => false,
    };

    if done {
        DispatchPath::ScalarFallback
    } else {
        debug!("{}: no contiguous buffer, using the generic path", op.name());
        generic_unary(dst, op, src)
    }
}

fn flat_binary<D, Lhs, Rhs>(dst: &mut D, op: BinaryOp, lhs: &Lhs, rhs: &Rhs) -> DispatchPath
where
    D: DenseOperandMut,
    Lhs: DenseOperand<Elem = D::Elem>,
    Rhs: DenseOperand<Elem = D::Elem>,
{
    let n = dst.size();
    let done = match (lhs.data(), rhs.data(), dst.data_mut()) {
        (Some(a), Some(b), Some(out)) if a.len() == n && b.len() == n && out.len() == n => {
            for ((out, &x), &y) in out.iter_mut().zip(a).zip(b) {
                *out = D::Elem::binary(op, x, y);
            }
            true
        }
        _ => false,
    };

    if done {
        DispatchPath::ScalarFallback
    } else {
        debug!("{}: no contiguous buffer, using the generic path", op.name());
        generic_binary(dst, op, lhs, rhs)
    }
}

/// Visits every coefficient of a `rows x cols` destination in its storage
/// order.
#[inline(always)]
fn for_each_coeff(rows: usize, cols: usize, row_major: bool, mut f: impl FnMut(usize, usize)) {
    if row_major {
        for r in 0..rows {
            for c in 0..cols {
                f(r, c);
            }
        }
    } else {
        for c in 0..cols {
            for r in 0..rows {
                f(r, c);
            }
        }
    }
}

fn generic_unary<D, S>(dst: &mut D, op: UnaryOp, src: &S) -> DispatchPath
where
    D: DenseOperandMut,
    S: DenseOperand<Elem = D::Elem>,
{
    let (rows, cols) = (dst.rows(), dst.cols());
    for_each_coeff(rows, cols, D::ROW_MAJOR, |r, c| {
        dst.set_coeff(r, c, D::Elem::unary(op, src.coeff(r, c)));
    });
    DispatchPath::Generic
}

fn generic_binary<D, Lhs, Rhs>(dst: &mut D, op: BinaryOp, lhs: &Lhs, rhs: &Rhs) -> DispatchPath
where
    D: DenseOperandMut,
    Lhs: DenseOperand<Elem = D::Elem>,
    Rhs: DenseOperand<Elem = D::Elem>,
{
    let (rows, cols) = (dst.rows(), dst.cols());
    for_each_coeff(rows, cols, D::ROW_MAJOR, |r, c| {
        dst.set_coeff(r, c, D::Elem::binary(op, lhs.coeff(r, c), rhs.coeff(r, c)));
    });
    DispatchPath::Generic
}
