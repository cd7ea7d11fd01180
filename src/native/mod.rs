//! Native vectorized math routines.
//!
//! The dispatch core treats these as black boxes with a fixed contract:
//!
//! - **Unary** ([`UnaryRoutine`]): for every `i` in `0..input.len()`,
//!   `output[i] = f(input[i])`. `input` and `output` have equal length.
//! - **Binary** ([`BinaryRoutine`]): for every `i`,
//!   `output[i] = f(lhs[i], rhs[i])`. All three buffers have equal length.
//!
//! Routines never write to their inputs, and the borrow rules guarantee that
//! inputs never overlap the output. Routines are total over their domain and
//! report nothing; out-of-domain inputs produce whatever IEEE value the
//! underlying implementation yields (typically NaN).
//!
//! # Backends
//!
//! - **Built-in** ([`builtin`]): portable batched routines, always compiled.
//!   Square root and addition use AVX (x86) or NEON (AArch64) `f64` kernels
//!   when the build detected them; large buffers are split across rayon
//!   threads.
//! - **AOCL** (`aocl` feature): bindings to the `amd_vrda_*` routines of
//!   AMD's vector math library. When enabled, the routing table's native
//!   column points at these instead of the built-in routines.
//!
//! # Instrumentation
//!
//! The router does not call table entries directly; it goes through a
//! [`NativeLibrary`]. [`Linked`] forwards to the routing table, while tests
//! substitute implementations that count or record calls.

use crate::routing::{BinaryRoute, UnaryRoute};

pub mod builtin;

#[cfg(all(avx2, any(target_arch = "x86", target_arch = "x86_64")))]
pub(crate) mod avx;

#[cfg(all(neon, target_arch = "aarch64"))]
pub(crate) mod neon;

#[cfg(feature = "aocl")]
pub mod aocl;

/// Unary native routine: `output[i] = f(input[i])`.
pub type UnaryRoutine = fn(input: &[f64], output: &mut [f64]);

/// Binary native routine: `output[i] = f(lhs[i], rhs[i])`.
pub type BinaryRoutine = fn(lhs: &[f64], rhs: &[f64], output: &mut [f64]);

#[cfg(not(feature = "aocl"))]
pub use builtin::{
    acos, add, asin, atan, cos, cosh, exp, log, log10, log2, pow, sin, sinh, sqrt, tan, tanh,
};

#[cfg(feature = "aocl")]
pub use aocl::{
    acos, add, asin, atan, cos, cosh, exp, log, log10, log2, pow, sin, sinh, sqrt, tan, tanh,
};

/// The seam between the router and the native routines.
///
/// Both methods receive the routing table row being executed and buffers of
/// equal length. The default implementations invoke the row's native routine.
pub trait NativeLibrary {
    #[inline(always)]
    fn unary(&self, route: &UnaryRoute, input: &[f64], output: &mut [f64]) {
        (route.native)(input, output)
    }

    #[inline(always)]
    fn binary(&self, route: &BinaryRoute, lhs: &[f64], rhs: &[f64], output: &mut [f64]) {
        (route.native)(lhs, rhs, output)
    }
}

/// The routines linked into this build (built-in or AOCL).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Linked;

impl NativeLibrary for Linked {}

impl<L: NativeLibrary + ?Sized> NativeLibrary for &L {
    #[inline(always)]
    fn unary(&self, route: &UnaryRoute, input: &[f64], output: &mut [f64]) {
        (**self).unary(route, input, output)
    }

    #[inline(always)]
    fn binary(&self, route: &BinaryRoute, lhs: &[f64], rhs: &[f64], output: &mut [f64]) {
        (**self).binary(route, lhs, rhs, output)
    }
}
