//! AVX 4-lane f64 kernels.
//!
//! `F64x4` wraps a `__m256d` register holding four packed doubles. Only the
//! operations the built-in routines accelerate are provided: unaligned
//! load/store, addition and square root. Both are correctly rounded IEEE
//! operations, so results are bit-identical to the scalar reference.

#[cfg(target_arch = "x86")]
use std::arch::x86::*;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

/// Number of f64 elements in a 256-bit register.
pub(crate) const LANE_COUNT: usize = 4;

#[derive(Copy, Clone, Debug)]
pub(crate) struct F64x4 {
    elements: __m256d,
}

impl F64x4 {
    /// # Safety
    ///
    /// `ptr` must be valid for reading 4 consecutive f64 values and the CPU
    /// must support AVX.
    #[inline(always)]
    unsafe fn load_unaligned(ptr: *const f64) -> Self {
        Self {
            elements: _mm256_loadu_pd(ptr),
        }
    }

    /// # Safety
    ///
    /// `ptr` must be valid for writing 4 consecutive f64 values and the CPU
    /// must support AVX.
    #[inline(always)]
    unsafe fn store_unaligned_at(&self, ptr: *mut f64) {
        _mm256_storeu_pd(ptr, self.elements)
    }

    /// # Safety
    ///
    /// The CPU must support AVX.
    #[inline(always)]
    unsafe fn add(self, rhs: Self) -> Self {
        Self {
            elements: _mm256_add_pd(self.elements, rhs.elements),
        }
    }

    /// # Safety
    ///
    /// The CPU must support AVX.
    #[inline(always)]
    unsafe fn sqrt(self) -> Self {
        Self {
            elements: _mm256_sqrt_pd(self.elements),
        }
    }
}

/// Square root of every element.
///
/// # Safety
///
/// The CPU must support AVX. `input` and `output` must have equal length.
#[target_feature(enable = "avx")]
pub(crate) unsafe fn sqrt(input: &[f64], output: &mut [f64]) {
    debug_assert_eq!(input.len(), output.len());

    let size = input.len().min(output.len());
    let complete_lanes = size - (size % LANE_COUNT);

    for i in (0..complete_lanes).step_by(LANE_COUNT) {
        let a = F64x4::load_unaligned(input.as_ptr().add(i));
        a.sqrt().store_unaligned_at(output.as_mut_ptr().add(i));
    }

    for i in complete_lanes..size {
        output[i] = input[i].sqrt();
    }
}

/// Elementwise sum.
///
/// # Safety
///
/// The CPU must support AVX. All three buffers must have equal length.
#[target_feature(enable = "avx")]
pub(crate) unsafe fn add(lhs: &[f64], rhs: &[f64], output: &mut [f64]) {
    debug_assert_eq!(lhs.len(), output.len());
    debug_assert_eq!(rhs.len(), output.len());

    let size = output.len().min(lhs.len()).min(rhs.len());
    let complete_lanes = size - (size % LANE_COUNT);

    for i in (0..complete_lanes).step_by(LANE_COUNT) {
        let a = F64x4::load_unaligned(lhs.as_ptr().add(i));
        let b = F64x4::load_unaligned(rhs.as_ptr().add(i));
        a.add(b).store_unaligned_at(output.as_mut_ptr().add(i));
    }

    for i in complete_lanes..size {
        output[i] = lhs[i] + rhs[i];
    }
}
