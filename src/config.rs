//! Compile-time dispatch knobs.
//!
//! Two integers steer dispatch: the vectorization threshold (static inner
//! extents below it never take the vectorized path) and the SIMD batch width
//! (the granularity of the native call in the unary block/remainder split).
//!
//! The crate-wide defaults come from `build.rs`, which forwards the
//! `VML_DISPATCH_THRESHOLD` and `VML_DISPATCH_SIMD_WIDTH` environment
//! variables (or 128 and 8 when unset). A [`Router`](crate::Router) can be
//! instantiated with any other [`DispatchConfig`], which keeps the knobs
//! compile-time constants while letting tests pick different values.

/// Vectorization threshold used when the build does not override it.
pub const DEFAULT_THRESHOLD: usize = 128;

/// SIMD batch width used when the build does not override it.
pub const DEFAULT_SIMD_WIDTH: usize = 8;

/// Compile-time dispatch configuration.
pub trait DispatchConfig {
    /// Static inner extents below this value disable the vectorized path.
    const THRESHOLD: usize;

    /// Number of elements per native batch. Must be greater than zero.
    const SIMD_WIDTH: usize;
}

/// Configuration taken from the build environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultConfig;

impl DispatchConfig for DefaultConfig {
    const THRESHOLD: usize = crate::VML_THRESHOLD;
    const SIMD_WIDTH: usize = crate::SIMD_WIDTH;
}

/// Parses a decimal knob forwarded by `build.rs`, falling back to `default`
/// when the variable was not provided at compile time.
///
/// Evaluated in const context, so a malformed value fails the build.
pub(crate) const fn parse_knob(raw: Option<&str>, default: usize) -> usize {
    let bytes = match raw {
        Some(raw) => raw.as_bytes(),
        None => return default,
    };

    assert!(!bytes.is_empty(), "empty dispatch knob");

    let mut value: usize = 0;
    let mut i = 0;
    while i < bytes.len() {
        let digit = bytes[i];
        assert!(digit.is_ascii_digit(), "dispatch knob must be decimal");
        value = match value.checked_mul(10) {
            Some(v) => match v.checked_add((digit - b'0') as usize) {
                Some(v) => v,
                None => panic!("dispatch knob overflows usize"),
            },
            None => panic!("dispatch knob overflows usize"),
        };
        i += 1;
    }

    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_knob_default() {
        assert_eq!(parse_knob(None, 128), 128);
    }

    #[test]
    fn test_parse_knob_value() {
        assert_eq!(parse_knob(Some("0"), 128), 0);
        assert_eq!(parse_knob(Some("256"), 128), 256);
        assert_eq!(parse_knob(Some("16"), 8), 16);
    }

    #[test]
    #[should_panic(expected = "dispatch knob must be decimal")]
    fn test_parse_knob_rejects_garbage() {
        parse_knob(Some("12a"), 8);
    }

    #[test]
    fn test_default_config_is_positive_width() {
        assert!(<DefaultConfig as DispatchConfig>::SIMD_WIDTH > 0);
    }
}
