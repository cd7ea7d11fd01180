//! Eligibility evaluator for the vectorized path.
//!
//! For a destination and its source operand(s), the vectorized path is
//! allowed only when all of the following hold:
//!
//! 1. **Direct memory access**: every operand exposes a contiguous,
//!    pointer-addressable buffer. When this fails nothing else is looked at.
//! 2. **Storage-order agreement**: every source has the destination's
//!    row-major/column-major orientation, so flat buffers correspond element
//!    for element.
//! 3. **Size threshold**: the destination's static inner extent is dynamic,
//!    or at least the configured threshold. Small fixed extents are cheaper
//!    through the scalar path than through a native call.
//!
//! The rules only read [`OperandDescriptor`]s, which are compile-time
//! values. [`UnaryEligibility`] and [`BinaryEligibility`] expose the verdict
//! as an associated constant, so each distinct type combination is evaluated
//! once during compilation and every branch on it folds away.
//!
//! ```
//! use vml_dispatch::{DefaultConfig, FixedVector, UnaryEligibility, VectorXd};
//!
//! // Dynamic extents are never rejected statically.
//! assert!(UnaryEligibility::<VectorXd, VectorXd, DefaultConfig>::ENABLED);
//!
//! // A fixed extent below the threshold is.
//! assert!(!UnaryEligibility::<FixedVector<f64, 100>, FixedVector<f64, 100>, DefaultConfig>::ENABLED);
//! ```

use std::marker::PhantomData;

use crate::config::DispatchConfig;
use crate::operand::{Extent, OperandDescriptor, StaticLayout};

/// Iteration order used by the vectorized path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    /// One flat pass over the storage-order buffer.
    Linear,
}

/// Outcome of the eligibility rules for one type combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EligibilityDecision {
    pub vectorized_path_allowed: bool,
    pub traversal_order: Traversal,
}

impl EligibilityDecision {
    const fn from_verdict(allowed: bool) -> Self {
        Self {
            vectorized_path_allowed: allowed,
            traversal_order: Traversal::Linear,
        }
    }

    /// Rules for `dst := f(src)`.
    pub const fn unary(dst: OperandDescriptor, src: OperandDescriptor, threshold: usize) -> Self {
        let allowed = dst.has_direct_memory_access
            && src.has_direct_memory_access
            && dst.is_row_major_layout == src.is_row_major_layout
            && large_enough(dst.static_inner_extent, threshold);

        Self::from_verdict(allowed)
    }

    /// Rules for `dst := f(lhs, rhs)`.
    pub const fn binary(
        dst: OperandDescriptor,
        lhs: OperandDescriptor,
        rhs: OperandDescriptor,
        threshold: usize,
    ) -> Self {
        let allowed = dst.has_direct_memory_access
            && lhs.has_direct_memory_access
            && rhs.has_direct_memory_access
            && dst.is_row_major_layout == lhs.is_row_major_layout
            && dst.is_row_major_layout == rhs.is_row_major_layout
            && large_enough(dst.static_inner_extent, threshold);

        Self::from_verdict(allowed)
    }
}

/// Dynamic extents always pass; fixed extents must reach the threshold.
pub const fn large_enough(inner_extent: Extent, threshold: usize) -> bool {
    match inner_extent {
        Extent::Dynamic => true,
        Extent::Fixed(n) => n >= threshold,
    }
}

/// Eligibility of `D := f(S)` under configuration `C`.
pub struct UnaryEligibility<D: ?Sized, S: ?Sized, C> {
    _marker: PhantomData<(fn() -> *const D, fn() -> *const S, C)>,
}

impl<D, S, C> UnaryEligibility<D, S, C>
where
    D: StaticLayout + ?Sized,
    S: StaticLayout + ?Sized,
    C: DispatchConfig,
{
    pub const DECISION: EligibilityDecision = EligibilityDecision::unary(
        OperandDescriptor::of::<D>(),
        OperandDescriptor::of::<S>(),
        C::THRESHOLD,
    );

    pub const ENABLED: bool = Self::DECISION.vectorized_path_allowed;
}

/// Eligibility of `D := f(L, R)` under configuration `C`.
pub struct BinaryEligibility<D: ?Sized, L: ?Sized, R: ?Sized, C> {
    _marker: PhantomData<(fn() -> *const D, fn() -> *const L, fn() -> *const R, C)>,
}

impl<D, L, R, C> BinaryEligibility<D, L, R, C>
where
    D: StaticLayout + ?Sized,
    L: StaticLayout + ?Sized,
    R: StaticLayout + ?Sized,
    C: DispatchConfig,
{
    pub const DECISION: EligibilityDecision = EligibilityDecision::binary(
        OperandDescriptor::of::<D>(),
        OperandDescriptor::of::<L>(),
        OperandDescriptor::of::<R>(),
        C::THRESHOLD,
    );

    pub const ENABLED: bool = Self::DECISION.vectorized_path_allowed;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operand::ElementKind;

    fn descriptor(direct: bool, row_major: bool, inner: Extent) -> OperandDescriptor {
        OperandDescriptor {
            element_type: ElementKind::Float64,
            has_direct_memory_access: direct,
            is_row_major_layout: row_major,
            is_vector_shaped: true,
            static_inner_extent: inner,
        }
    }

    #[test]
    fn test_all_rules_hold() {
        let d = descriptor(true, false, Extent::Dynamic);
        let decision = EligibilityDecision::unary(d, d, 128);
        assert!(decision.vectorized_path_allowed);
        assert_eq!(decision.traversal_order, Traversal::Linear);
    }

    #[test]
    fn test_direct_access_required_on_every_operand() {
        let ok = descriptor(true, false, Extent::Dynamic);
        let lazy = descriptor(false, false, Extent::Dynamic);
        assert!(!EligibilityDecision::unary(lazy, ok, 128).vectorized_path_allowed);
        assert!(!EligibilityDecision::unary(ok, lazy, 128).vectorized_path_allowed);
        assert!(!EligibilityDecision::binary(ok, ok, lazy, 128).vectorized_path_allowed);
        assert!(!EligibilityDecision::binary(ok, lazy, ok, 128).vectorized_path_allowed);
    }

    #[test]
    fn test_storage_orders_must_agree() {
        let col = descriptor(true, false, Extent::Fixed(4096));
        let row = descriptor(true, true, Extent::Fixed(4096));
        assert!(!EligibilityDecision::unary(col, row, 128).vectorized_path_allowed);
        assert!(!EligibilityDecision::binary(row, row, col, 128).vectorized_path_allowed);
        assert!(EligibilityDecision::binary(row, row, row, 128).vectorized_path_allowed);
    }

    #[test]
    fn test_threshold_applies_to_fixed_extents_only() {
        assert!(large_enough(Extent::Dynamic, 128));
        assert!(large_enough(Extent::Fixed(128), 128));
        assert!(large_enough(Extent::Fixed(130), 128));
        assert!(!large_enough(Extent::Fixed(127), 128));
        assert!(!large_enough(Extent::Fixed(100), 128));
        assert!(large_enough(Extent::Fixed(0), 0));
    }

    #[test]
    fn test_threshold_reads_destination_extent() {
        let small = descriptor(true, false, Extent::Fixed(16));
        let dynamic = descriptor(true, false, Extent::Dynamic);
        assert!(!EligibilityDecision::unary(small, dynamic, 128).vectorized_path_allowed);
        assert!(EligibilityDecision::unary(dynamic, small, 128).vectorized_path_allowed);
    }
}
