//! Bindings to AMD's vector math library (AOCL-LibM).
//!
//! The `amd_vrda_*` entry points take a C `int` element count followed by
//! input and output pointers. Their prototypes are not const-correct, so
//! inputs are passed as `*mut f64`; the library only reads them.
//!
//! Buffers longer than `i32::MAX` elements are processed in successive
//! chunks.

use std::os::raw::c_int;

type RawUnary = unsafe extern "C" fn(c_int, *mut f64, *mut f64);
type RawBinary = unsafe extern "C" fn(c_int, *mut f64, *mut f64, *mut f64);

const MAX_COUNT: usize = c_int::MAX as usize;

extern "C" {
    fn amd_vrda_exp(n: c_int, x: *mut f64, y: *mut f64);
    fn amd_vrda_sin(n: c_int, x: *mut f64, y: *mut f64);
    fn amd_vrda_cos(n: c_int, x: *mut f64, y: *mut f64);
    fn amd_vrda_sqrt(n: c_int, x: *mut f64, y: *mut f64);
    fn amd_vrda_log(n: c_int, x: *mut f64, y: *mut f64);
    fn amd_vrda_log10(n: c_int, x: *mut f64, y: *mut f64);
    fn amd_vrda_asin(n: c_int, x: *mut f64, y: *mut f64);
    fn amd_vrda_sinh(n: c_int, x: *mut f64, y: *mut f64);
    fn amd_vrda_acos(n: c_int, x: *mut f64, y: *mut f64);
    fn amd_vrda_cosh(n: c_int, x: *mut f64, y: *mut f64);
    fn amd_vrda_tan(n: c_int, x: *mut f64, y: *mut f64);
    fn amd_vrda_atan(n: c_int, x: *mut f64, y: *mut f64);
    fn amd_vrda_tanh(n: c_int, x: *mut f64, y: *mut f64);
    fn amd_vrda_log2(n: c_int, x: *mut f64, y: *mut f64);
    fn amd_vrda_add(n: c_int, x: *mut f64, y: *mut f64, z: *mut f64);
    fn amd_vrda_pow(n: c_int, x: *mut f64, y: *mut f64, z: *mut f64);
}

#[inline(always)]
fn call_unary(routine: RawUnary, input: &[f64], output: &mut [f64]) {
    assert_eq!(input.len(), output.len(), "buffers must be the same length");

    for (in_chunk, out_chunk) in input.chunks(MAX_COUNT).zip(output.chunks_mut(MAX_COUNT)) {
        // SAFETY: both chunks hold `len` elements, `len <= c_int::MAX`, and the
        // routine reads only from the first pointer and writes only `len`
        // elements through the second. The borrows are disjoint.
        unsafe {
            routine(
                in_chunk.len() as c_int,
                in_chunk.as_ptr() as *mut f64,
                out_chunk.as_mut_ptr(),
            )
        };
    }
}

#[inline(always)]
fn call_binary(routine: RawBinary, lhs: &[f64], rhs: &[f64], output: &mut [f64]) {
    assert_eq!(lhs.len(), output.len(), "buffers must be the same length");
    assert_eq!(rhs.len(), output.len(), "buffers must be the same length");

    for ((lhs_chunk, rhs_chunk), out_chunk) in lhs
        .chunks(MAX_COUNT)
        .zip(rhs.chunks(MAX_COUNT))
        .zip(output.chunks_mut(MAX_COUNT))
    {
        // SAFETY: as in `call_unary`; both inputs are read-only.
        unsafe {
            routine(
                out_chunk.len() as c_int,
                lhs_chunk.as_ptr() as *mut f64,
                rhs_chunk.as_ptr() as *mut f64,
                out_chunk.as_mut_ptr(),
            )
        };
    }
}

macro_rules! unary_bindings {
    ($($name:ident => $symbol:ident),* $(,)?) => {
        $(
            #[doc = concat!("Safe wrapper over `", stringify!($symbol), "`.")]
            pub fn $name(input: &[f64], output: &mut [f64]) {
                call_unary($symbol, input, output)
            }
        )*
    };
}

unary_bindings! {
    exp => amd_vrda_exp,
    sin => amd_vrda_sin,
    cos => amd_vrda_cos,
    sqrt => amd_vrda_sqrt,
    log => amd_vrda_log,
    log10 => amd_vrda_log10,
    asin => amd_vrda_asin,
    sinh => amd_vrda_sinh,
    acos => amd_vrda_acos,
    cosh => amd_vrda_cosh,
    tan => amd_vrda_tan,
    atan => amd_vrda_atan,
    tanh => amd_vrda_tanh,
    log2 => amd_vrda_log2,
}

/// Safe wrapper over `amd_vrda_add`.
pub fn add(lhs: &[f64], rhs: &[f64], output: &mut [f64]) {
    call_binary(amd_vrda_add, lhs, rhs, output)
}

/// Safe wrapper over `amd_vrda_pow`.
pub fn pow(lhs: &[f64], rhs: &[f64], output: &mut [f64]) {
    call_binary(amd_vrda_pow, lhs, rhs, output)
}
