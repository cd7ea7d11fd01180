//! Capability interface consumed from the host array abstraction.
//!
//! The dispatch core never inspects array contents to decide anything. It
//! reads two layers of information from an operand:
//!
//! - **Static layout** ([`StaticLayout`]): associated constants describing
//!   direct memory access, storage order and compile-time extents. These feed
//!   the eligibility evaluator and are folded away by the compiler.
//! - **Run-time accessors** ([`DenseOperand`], [`DenseOperandMut`]): row and
//!   column counts, the contiguous buffer (when one exists) and coefficient
//!   access for the generic path.
//!
//! [`OperandDescriptor`] condenses the static layer into a plain value that
//! can be built in const context.

use std::fmt::Debug;

use num::Float;

use crate::routing::{scalar_binary, scalar_unary, BinaryOp, UnaryOp};

/// Marker for a dimension whose extent is only known at run time.
///
/// Used as the const generic argument of [`Matrix`](crate::host::Matrix).
pub const DYNAMIC: usize = usize::MAX;

/// Element types the dispatch core understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Float64,
    Float32,
}

impl ElementKind {
    pub const ALL: [ElementKind; 2] = [ElementKind::Float64, ElementKind::Float32];

    pub const fn name(self) -> &'static str {
        match self {
            ElementKind::Float64 => "f64",
            ElementKind::Float32 => "f32",
        }
    }
}

/// Floating-point scalar stored in host arrays.
///
/// Besides naming its [`ElementKind`], an element knows how to evaluate every
/// supported operation on a single value and how to expose its buffers as
/// `f64` when it is the double-precision type. The latter is how the router
/// reaches the native routines without any pointer casts.
pub trait Element: Float + Default + Debug + Send + Sync + 'static {
    const KIND: ElementKind;

    /// Reinterprets a buffer as `f64` when `Self` is `f64`.
    fn as_f64(buf: &[Self]) -> Option<&[f64]>;

    /// Mutable counterpart of [`Element::as_f64`].
    fn as_f64_mut(buf: &mut [Self]) -> Option<&mut [f64]>;

    /// Scalar evaluation of a unary operation.
    #[inline(always)]
    fn unary(op: UnaryOp, x: Self) -> Self {
        scalar_unary(op, x)
    }

    /// Scalar evaluation of a binary operation.
    #[inline(always)]
    fn binary(op: BinaryOp, lhs: Self, rhs: Self) -> Self {
        scalar_binary(op, lhs, rhs)
    }
}

impl Element for f64 {
    const KIND: ElementKind = ElementKind::Float64;

    #[inline(always)]
    fn as_f64(buf: &[f64]) -> Option<&[f64]> {
        Some(buf)
    }

    #[inline(always)]
    fn as_f64_mut(buf: &mut [f64]) -> Option<&mut [f64]> {
        Some(buf)
    }
}

impl Element for f32 {
    const KIND: ElementKind = ElementKind::Float32;

    #[inline(always)]
    fn as_f64(_buf: &[f32]) -> Option<&[f64]> {
        None
    }

    #[inline(always)]
    fn as_f64_mut(_buf: &mut [f32]) -> Option<&mut [f64]> {
        None
    }
}

/// Compile-time extent of one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extent {
    Fixed(usize),
    Dynamic,
}

impl Extent {
    /// Maps a const generic dimension (possibly [`DYNAMIC`]) to an extent.
    pub const fn from_const(n: usize) -> Self {
        if n == DYNAMIC {
            Extent::Dynamic
        } else {
            Extent::Fixed(n)
        }
    }

    pub const fn is_dynamic(self) -> bool {
        matches!(self, Extent::Dynamic)
    }

    pub const fn is_fixed(self, n: usize) -> bool {
        match self {
            Extent::Fixed(m) => m == n,
            Extent::Dynamic => false,
        }
    }

    /// Product of two extents; dynamic if either side is.
    pub const fn times(self, other: Extent) -> Extent {
        match (self, other) {
            (Extent::Fixed(a), Extent::Fixed(b)) => Extent::Fixed(a.saturating_mul(b)),
            _ => Extent::Dynamic,
        }
    }

    /// Whether a run-time extent is compatible with this compile-time one.
    pub const fn admits(self, n: usize) -> bool {
        match self {
            Extent::Fixed(m) => m == n,
            Extent::Dynamic => true,
        }
    }
}

/// Compile-time layout flags of a host operand type.
pub trait StaticLayout {
    type Elem: Element;

    /// Elements occupy one contiguous, pointer-addressable buffer.
    const DIRECT_ACCESS: bool;

    /// Elements are laid out row by row.
    const ROW_MAJOR: bool;

    const ROWS: Extent;
    const COLS: Extent;
}

/// Run-time accessors of a readable host operand.
pub trait DenseOperand: StaticLayout {
    fn rows(&self) -> usize;

    fn cols(&self) -> usize;

    fn size(&self) -> usize {
        self.rows() * self.cols()
    }

    fn has_direct_access(&self) -> bool {
        Self::DIRECT_ACCESS
    }

    fn is_row_major(&self) -> bool {
        Self::ROW_MAJOR
    }

    /// The contiguous buffer in storage order, or `None` when this value has
    /// no such buffer (lazy operands, non-standard strides).
    fn data(&self) -> Option<&[Self::Elem]>;

    /// Coefficient at `(row, col)`, independent of storage order.
    fn coeff(&self, row: usize, col: usize) -> Self::Elem;
}

/// Run-time accessors of a writable host operand.
pub trait DenseOperandMut: DenseOperand {
    fn data_mut(&mut self) -> Option<&mut [Self::Elem]>;

    fn set_coeff(&mut self, row: usize, col: usize, value: Self::Elem);
}

/// Static description of an operand type.
///
/// All fields derive from [`StaticLayout`] constants, so a descriptor is
/// available in const context without touching any array value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperandDescriptor {
    pub element_type: ElementKind,
    pub has_direct_memory_access: bool,
    pub is_row_major_layout: bool,
    pub is_vector_shaped: bool,
    /// Length along the contiguous dimension: the total size for vectors,
    /// otherwise the column count (row-major) or row count (column-major).
    pub static_inner_extent: Extent,
}

impl OperandDescriptor {
    pub const fn of<O: StaticLayout + ?Sized>() -> Self {
        let is_vector_shaped = O::ROWS.is_fixed(1) || O::COLS.is_fixed(1);

        let static_inner_extent = if is_vector_shaped {
            O::ROWS.times(O::COLS)
        } else if O::ROW_MAJOR {
            O::COLS
        } else {
            O::ROWS
        };

        Self {
            element_type: <O::Elem as Element>::KIND,
            has_direct_memory_access: O::DIRECT_ACCESS,
            is_row_major_layout: O::ROW_MAJOR,
            is_vector_shaped,
            static_inner_extent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedColMajor;
    impl StaticLayout for FixedColMajor {
        type Elem = f64;
        const DIRECT_ACCESS: bool = true;
        const ROW_MAJOR: bool = false;
        const ROWS: Extent = Extent::Fixed(300);
        const COLS: Extent = Extent::Fixed(4);
    }

    struct DynamicRowVector;
    impl StaticLayout for DynamicRowVector {
        type Elem = f32;
        const DIRECT_ACCESS: bool = true;
        const ROW_MAJOR: bool = true;
        const ROWS: Extent = Extent::Fixed(1);
        const COLS: Extent = Extent::Dynamic;
    }

    struct FixedRowMajor;
    impl StaticLayout for FixedRowMajor {
        type Elem = f64;
        const DIRECT_ACCESS: bool = false;
        const ROW_MAJOR: bool = true;
        const ROWS: Extent = Extent::Fixed(512);
        const COLS: Extent = Extent::Fixed(16);
    }

    #[test]
    fn test_extent_from_const() {
        assert_eq!(Extent::from_const(DYNAMIC), Extent::Dynamic);
        assert_eq!(Extent::from_const(7), Extent::Fixed(7));
    }

    #[test]
    fn test_extent_times() {
        assert_eq!(Extent::Fixed(3).times(Extent::Fixed(5)), Extent::Fixed(15));
        assert_eq!(Extent::Fixed(3).times(Extent::Dynamic), Extent::Dynamic);
        assert_eq!(Extent::Dynamic.times(Extent::Fixed(1)), Extent::Dynamic);
    }

    #[test]
    fn test_extent_admits() {
        assert!(Extent::Dynamic.admits(0));
        assert!(Extent::Fixed(4).admits(4));
        assert!(!Extent::Fixed(4).admits(5));
    }

    #[test]
    fn test_descriptor_matrix_column_major_uses_rows() {
        const D: OperandDescriptor = OperandDescriptor::of::<FixedColMajor>();
        assert_eq!(D.element_type, ElementKind::Float64);
        assert!(!D.is_vector_shaped);
        assert_eq!(D.static_inner_extent, Extent::Fixed(300));
    }

    #[test]
    fn test_descriptor_matrix_row_major_uses_cols() {
        let d = OperandDescriptor::of::<FixedRowMajor>();
        assert!(!d.has_direct_memory_access);
        assert_eq!(d.static_inner_extent, Extent::Fixed(16));
    }

    #[test]
    fn test_descriptor_vector_uses_size() {
        let d = OperandDescriptor::of::<DynamicRowVector>();
        assert_eq!(d.element_type, ElementKind::Float32);
        assert!(d.is_vector_shaped);
        assert!(d.is_row_major_layout);
        assert_eq!(d.static_inner_extent, Extent::Dynamic);
    }

    #[test]
    fn test_as_f64_only_for_double() {
        let doubles = [1.0f64, 2.0];
        let singles = [1.0f32, 2.0];
        assert_eq!(f64::as_f64(&doubles), Some(&doubles[..]));
        assert!(f32::as_f64(&singles).is_none());
    }
}
