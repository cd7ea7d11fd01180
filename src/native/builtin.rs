//! Portable batched implementations of the native routine contract.
//!
//! Each routine walks its buffers in blocks of [`LANE_COUNT`] elements with a
//! scalar tail, the shape LLVM vectorizes well. Square root and addition
//! switch to explicit AVX / NEON `f64` kernels when the build detected the
//! instruction set and the running CPU reports it. Transcendental functions
//! evaluate `std` per lane, so they agree with the scalar reference to the
//! last bit.
//!
//! Buffers of at least [`PARALLEL_THRESHOLD`] elements are cut into chunks of
//! roughly [`PARALLEL_CHUNK_SIZE`] elements (rounded to a multiple of the
//! lane count) and processed on the rayon thread pool. Every element is
//! computed independently, so the split never changes results.

use rayon::prelude::*;

use crate::{PARALLEL_CHUNK_SIZE, PARALLEL_THRESHOLD};

/// Elements per block in the lanewise loops.
pub const LANE_COUNT: usize = 8;

#[inline(always)]
fn chunk_size() -> usize {
    ((PARALLEL_CHUNK_SIZE / LANE_COUNT) * LANE_COUNT).max(LANE_COUNT)
}

/// Runs a unary block kernel, in parallel chunks for large buffers.
#[inline(always)]
fn run_unary<K>(input: &[f64], output: &mut [f64], kernel: K)
where
    K: Fn(&[f64], &mut [f64]) + Sync + Send,
{
    debug_assert_eq!(input.len(), output.len(), "buffers must be the same length");

    if output.len() < PARALLEL_THRESHOLD {
        kernel(input, output);
        return;
    }

    let chunk = chunk_size();
    output
        .par_chunks_mut(chunk)
        .zip(input.par_chunks(chunk))
        .for_each(|(out_chunk, in_chunk)| kernel(in_chunk, out_chunk));
}

/// Runs a binary block kernel, in parallel chunks for large buffers.
#[inline(always)]
fn run_binary<K>(lhs: &[f64], rhs: &[f64], output: &mut [f64], kernel: K)
where
    K: Fn(&[f64], &[f64], &mut [f64]) + Sync + Send,
{
    debug_assert_eq!(lhs.len(), output.len(), "buffers must be the same length");
    debug_assert_eq!(rhs.len(), output.len(), "buffers must be the same length");

    if output.len() < PARALLEL_THRESHOLD {
        kernel(lhs, rhs, output);
        return;
    }

    let chunk = chunk_size();
    output
        .par_chunks_mut(chunk)
        .zip(lhs.par_chunks(chunk).zip(rhs.par_chunks(chunk)))
        .for_each(|(out_chunk, (lhs_chunk, rhs_chunk))| kernel(lhs_chunk, rhs_chunk, out_chunk));
}

#[inline(always)]
fn lanewise_unary(input: &[f64], output: &mut [f64], f: fn(f64) -> f64) {
    let mut out_blocks = output.chunks_exact_mut(LANE_COUNT);
    let mut in_blocks = input.chunks_exact(LANE_COUNT);

    for (out_block, in_block) in (&mut out_blocks).zip(&mut in_blocks) {
        for lane in 0..LANE_COUNT {
            out_block[lane] = f(in_block[lane]);
        }
    }

    for (out, &x) in out_blocks
        .into_remainder()
        .iter_mut()
        .zip(in_blocks.remainder())
    {
        *out = f(x);
    }
}

#[inline(always)]
fn lanewise_binary(lhs: &[f64], rhs: &[f64], output: &mut [f64], f: fn(f64, f64) -> f64) {
    let mut out_blocks = output.chunks_exact_mut(LANE_COUNT);
    let mut lhs_blocks = lhs.chunks_exact(LANE_COUNT);
    let mut rhs_blocks = rhs.chunks_exact(LANE_COUNT);

    for ((out_block, lhs_block), rhs_block) in (&mut out_blocks)
        .zip(&mut lhs_blocks)
        .zip(&mut rhs_blocks)
    {
        for lane in 0..LANE_COUNT {
            out_block[lane] = f(lhs_block[lane], rhs_block[lane]);
        }
    }

    for ((out, &a), &b) in out_blocks
        .into_remainder()
        .iter_mut()
        .zip(lhs_blocks.remainder())
        .zip(rhs_blocks.remainder())
    {
        *out = f(a, b);
    }
}

macro_rules! lanewise_routines {
    ($($name:ident => $f:path),* $(,)?) => {
        $(
            #[doc = concat!("Lanewise `", stringify!($f), "` over the whole buffer.")]
            pub fn $name(input: &[f64], output: &mut [f64]) {
                run_unary(input, output, |i, o| lanewise_unary(i, o, $f));
            }
        )*
    };
}

lanewise_routines! {
    exp => f64::exp,
    sin => f64::sin,
    cos => f64::cos,
    log => f64::ln,
    log10 => f64::log10,
    asin => f64::asin,
    sinh => f64::sinh,
    acos => f64::acos,
    cosh => f64::cosh,
    tan => f64::tan,
    atan => f64::atan,
    tanh => f64::tanh,
    log2 => f64::log2,
}

fn sqrt_block(input: &[f64], output: &mut [f64]) {
    #[cfg(all(avx2, any(target_arch = "x86", target_arch = "x86_64")))]
    {
        if std::is_x86_feature_detected!("avx") {
            // SAFETY: AVX support was just confirmed on the running CPU.
            unsafe { super::avx::sqrt(input, output) };
            return;
        }
    }

    #[cfg(all(neon, target_arch = "aarch64"))]
    {
        if std::arch::is_aarch64_feature_detected!("neon") {
            // SAFETY: NEON support was just confirmed on the running CPU.
            unsafe { super::neon::sqrt(input, output) };
            return;
        }
    }

    lanewise_unary(input, output, f64::sqrt);
}

fn add_block(lhs: &[f64], rhs: &[f64], output: &mut [f64]) {
    #[cfg(all(avx2, any(target_arch = "x86", target_arch = "x86_64")))]
    {
        if std::is_x86_feature_detected!("avx") {
            // SAFETY: AVX support was just confirmed on the running CPU.
            unsafe { super::avx::add(lhs, rhs, output) };
            return;
        }
    }

    #[cfg(all(neon, target_arch = "aarch64"))]
    {
        if std::arch::is_aarch64_feature_detected!("neon") {
            // SAFETY: NEON support was just confirmed on the running CPU.
            unsafe { super::neon::add(lhs, rhs, output) };
            return;
        }
    }

    lanewise_binary(lhs, rhs, output, |a, b| a + b);
}

/// Square root over the whole buffer.
pub fn sqrt(input: &[f64], output: &mut [f64]) {
    run_unary(input, output, sqrt_block);
}

/// Elementwise `lhs + rhs` over the whole buffer.
pub fn add(lhs: &[f64], rhs: &[f64], output: &mut [f64]) {
    run_binary(lhs, rhs, output, add_block);
}

/// Elementwise `lhs.powf(rhs)` over the whole buffer.
pub fn pow(lhs: &[f64], rhs: &[f64], output: &mut [f64]) {
    run_binary(lhs, rhs, output, |l, r, o| lanewise_binary(l, r, o, f64::powf));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(n: usize) -> Vec<f64> {
        // Stays inside [0.05, 0.95] so every routine is in its domain
        (0..n).map(|i| 0.05 + 0.9 * ((i * 37) % 101) as f64 / 100.0).collect()
    }

    #[test]
    fn test_unary_routines_match_std() {
        let routines: [(UnaryFn, fn(f64) -> f64); 14] = [
            (exp, f64::exp),
            (sin, f64::sin),
            (cos, f64::cos),
            (sqrt, f64::sqrt),
            (log, f64::ln),
            (log10, f64::log10),
            (asin, f64::asin),
            (sinh, f64::sinh),
            (acos, f64::acos),
            (cosh, f64::cosh),
            (tan, f64::tan),
            (atan, f64::atan),
            (tanh, f64::tanh),
            (log2, f64::log2),
        ];

        for n in [0, 1, 7, 8, 9, 64, 131] {
            let input = inputs(n);
            for (routine, reference) in routines {
                let mut output = vec![0.0; n];
                routine(&input, &mut output);
                for (i, (&x, &y)) in input.iter().zip(&output).enumerate() {
                    assert_eq!(y, reference(x), "n={n} index={i}");
                }
            }
        }
    }

    type UnaryFn = fn(&[f64], &mut [f64]);

    #[test]
    fn test_add_and_pow_match_std() {
        for n in [0, 1, 3, 8, 10, 17, 100] {
            let lhs = inputs(n);
            let rhs: Vec<f64> = lhs.iter().map(|x| 2.0 - x).collect();

            let mut sum = vec![0.0; n];
            add(&lhs, &rhs, &mut sum);
            let mut power = vec![0.0; n];
            pow(&lhs, &rhs, &mut power);

            for i in 0..n {
                assert_eq!(sum[i], lhs[i] + rhs[i]);
                assert_eq!(power[i], lhs[i].powf(rhs[i]));
            }
        }
    }

    #[test]
    fn test_parallel_split_matches_sequential() {
        let n = PARALLEL_THRESHOLD + 3 * LANE_COUNT + 5;
        let input = inputs(n);
        let mut output = vec![0.0; n];
        sqrt(&input, &mut output);

        for (i, (&x, &y)) in input.iter().zip(&output).enumerate() {
            assert_eq!(y, x.sqrt(), "index {i}");
        }

        let mut sum = vec![0.0; n];
        add(&input, &output, &mut sum);
        for i in 0..n {
            assert_eq!(sum[i], input[i] + output[i], "index {i}");
        }
    }
}
