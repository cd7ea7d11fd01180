//! # vml-dispatch
//!
//! Compile-time dispatch of coefficient-wise array math to vectorized native
//! routines.
//!
//! Assigning an expression such as `b = a.exp()` normally walks the
//! operands one coefficient at a time. When the destination and sources are
//! plain contiguous `f64` buffers of a compatible layout, this crate instead
//! hands the whole buffer to a batched native routine, and keeps the
//! coefficient-wise path for everything else.
//!
//! ## Supported operations
//!
//! Unary: `exp`, `sin`, `cos`, `sqrt`, `log` (natural), `log10`, `asin`,
//! `sinh`, `acos`, `cosh`, `tan`, `atan`, `tanh`, `log2`.
//!
//! Binary: `sum` and `pow`.
//!
//! ## How a path is chosen
//!
//! 1. **Eligibility** ([`eligibility`]): every operand must have direct
//!    memory access and the destination's storage order, and the
//!    destination's static inner extent must be dynamic or at least
//!    [`VML_THRESHOLD`]. The verdict is a compile-time constant per type
//!    combination.
//! 2. **Routing** ([`routing`]): eligible `f64` assignments call the native
//!    routine named in the routing table, eligible `f32` assignments run a
//!    flat scalar loop, and ineligible ones are left to the generic path.
//! 3. **Execution** ([`router`]): unary calls are split into full batches of
//!    [`SIMD_WIDTH`] elements (one native call) and a scalar tail; binary
//!    calls cover the whole buffer at once.
//!
//! ## Example
//!
//! ```
//! use vml_dispatch::{assign, ArrayMath, DispatchPath, RowMatrixXd, VectorXd};
//!
//! let a = VectorXd::lin_spaced(4096, 0.0, 1.0);
//! let mut b = VectorXd::zeros(4096, 1);
//! assert_eq!(assign(&mut b, &a.sin()), DispatchPath::Vectorized);
//!
//! // A storage-order mismatch keeps the coefficient-wise path.
//! let m = RowMatrixXd::from_fn(3, 3, |r, c| (r + c) as f64);
//! let mut col_major = vml_dispatch::MatrixXd::zeros(3, 3);
//! assert_eq!(assign(&mut col_major, &m.sqrt()), DispatchPath::Generic);
//! assert_eq!(col_major[(2, 1)], 3f64.sqrt());
//! ```
//!
//! ## Build configuration
//!
//! `build.rs` forwards two environment variables as compile-time constants:
//! `VML_DISPATCH_THRESHOLD` ([`VML_THRESHOLD`], default 128) and
//! `VML_DISPATCH_SIMD_WIDTH` ([`SIMD_WIDTH`], default 8). It also detects
//! AVX2 or NEON for the built-in kernels. The `aocl` feature links
//! `libamdlibm` and routes the native calls to its `amd_vrda_*` routines.

pub mod config;
pub mod eligibility;
pub mod error;
pub mod expr;
pub mod host;
pub mod native;
pub mod operand;
pub mod router;
pub mod routing;

pub use config::{DefaultConfig, DispatchConfig};
pub use eligibility::{BinaryEligibility, EligibilityDecision, Traversal, UnaryEligibility};
pub use error::{DispatchError, Result};
pub use expr::{ArrayMath, CwiseBinary, CwiseUnary, Expression};
pub use host::{
    FixedVector, LinSpaced, Matrix, MatrixX, MatrixXd, MatrixXf, RowMatrixX, RowMatrixXd,
    RowMatrixXf, RowVectorX, RowVectorXd, RowVectorXf, Transpose, VectorX, VectorXd, VectorXf,
};
pub use native::{Linked, NativeLibrary};
pub use operand::{
    DenseOperand, DenseOperandMut, Element, ElementKind, Extent, OperandDescriptor, StaticLayout,
    DYNAMIC,
};
pub use router::{BlockPlan, DispatchPath, Router};
pub use routing::{
    routing_table, select, BinaryOp, Operation, RoutingTableEntry, Strategy, UnaryOp,
};

/// Static inner extents below this value never take the vectorized path.
pub const VML_THRESHOLD: usize = config::parse_knob(
    option_env!("VML_DISPATCH_THRESHOLD"),
    config::DEFAULT_THRESHOLD,
);

/// Number of elements per native batch in the unary block split.
pub const SIMD_WIDTH: usize = config::parse_knob(
    option_env!("VML_DISPATCH_SIMD_WIDTH"),
    config::DEFAULT_SIMD_WIDTH,
);

const _: () = assert!(SIMD_WIDTH > 0, "VML_DISPATCH_SIMD_WIDTH must be positive");

/// Buffers of at least this many elements are processed on the rayon pool
/// by the built-in routines.
pub const PARALLEL_THRESHOLD: usize = 131_072;

/// Target chunk length for the parallel split.
pub const PARALLEL_CHUNK_SIZE: usize = 16_384;

/// `dst := expr` through the default [`Router`].
///
/// # Panics
///
/// Panics if the extents of `dst` and `expr` differ.
pub fn assign<D, E>(dst: &mut D, expr: &E) -> DispatchPath
where
    D: DenseOperandMut,
    E: Expression<Elem = D::Elem>,
{
    Router::new().assign(dst, expr)
}

/// `dst := expr` through the default [`Router`], reporting shape errors.
pub fn try_assign<D, E>(dst: &mut D, expr: &E) -> Result<DispatchPath>
where
    D: DenseOperandMut,
    E: Expression<Elem = D::Elem>,
{
    Router::new().try_assign(dst, expr)
}
