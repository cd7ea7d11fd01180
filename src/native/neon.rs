//! NEON 2-lane f64 kernels for AArch64.
//!
//! Mirrors the AVX kernels: addition and square root over `float64x2_t`,
//! with a scalar tail for odd lengths.

use std::arch::aarch64::*;

/// Number of f64 elements in a 128-bit register.
pub(crate) const LANE_COUNT: usize = 2;

#[derive(Copy, Clone, Debug)]
pub(crate) struct F64x2 {
    elements: float64x2_t,
}

impl F64x2 {
    /// # Safety
    ///
    /// `ptr` must be valid for reading 2 consecutive f64 values.
    #[inline(always)]
    unsafe fn load(ptr: *const f64) -> Self {
        Self {
            elements: vld1q_f64(ptr),
        }
    }

    /// # Safety
    ///
    /// `ptr` must be valid for writing 2 consecutive f64 values.
    #[inline(always)]
    unsafe fn store_at(&self, ptr: *mut f64) {
        vst1q_f64(ptr, self.elements)
    }

    #[inline(always)]
    unsafe fn add(self, rhs: Self) -> Self {
        Self {
            elements: vaddq_f64(self.elements, rhs.elements),
        }
    }

    #[inline(always)]
    unsafe fn sqrt(self) -> Self {
        Self {
            elements: vsqrtq_f64(self.elements),
        }
    }
}

/// Square root of every element.
///
/// # Safety
///
/// The CPU must support NEON. `input` and `output` must have equal length.
#[target_feature(enable = "neon")]
pub(crate) unsafe fn sqrt(input: &[f64], output: &mut [f64]) {
    debug_assert_eq!(input.len(), output.len());

    let size = input.len().min(output.len());
    let complete_lanes = size - (size % LANE_COUNT);

    for i in (0..complete_lanes).step_by(LANE_COUNT) {
        let a = F64x2::load(input.as_ptr().add(i));
        a.sqrt().store_at(output.as_mut_ptr().add(i));
    }

    for i in complete_lanes..size {
        output[i] = input[i].sqrt();
    }
}

/// Elementwise sum.
///
/// # Safety
///
/// The CPU must support NEON. All three buffers must have equal length.
#[target_feature(enable = "neon")]
pub(crate) unsafe fn add(lhs: &[f64], rhs: &[f64], output: &mut [f64]) {
    debug_assert_eq!(lhs.len(), output.len());
    debug_assert_eq!(rhs.len(), output.len());

    let size = output.len().min(lhs.len()).min(rhs.len());
    let complete_lanes = size - (size % LANE_COUNT);

    for i in (0..complete_lanes).step_by(LANE_COUNT) {
        let a = F64x2::load(lhs.as_ptr().add(i));
        let b = F64x2::load(rhs.as_ptr().add(i));
        a.add(b).store_at(output.as_mut_ptr().add(i));
    }

    for i in complete_lanes..size {
        output[i] = lhs[i] + rhs[i];
    }
}
