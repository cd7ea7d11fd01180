//! Error types for vml-dispatch operations.
//!
//! Dispatch itself has a narrow failure surface: ineligibility for the
//! vectorized path and zero-length operands are not errors, and the native
//! routines expose no error channel. What remains are shape problems, which
//! the panicking entry points treat as assertion failures and the `try_*`
//! entry points report through [`DispatchError`].

use thiserror::Error;

/// Errors that can occur while building operands or assigning expressions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Destination and source extents differ.
    #[error(
        "shape mismatch: destination is {dst_rows}x{dst_cols} but source is {src_rows}x{src_cols}"
    )]
    ShapeMismatch {
        dst_rows: usize,
        dst_cols: usize,
        src_rows: usize,
        src_cols: usize,
    },

    /// Requested extents contradict the operand's compile-time extents.
    #[error("invalid shape {rows}x{cols}: {message}")]
    InvalidShape {
        rows: usize,
        cols: usize,
        message: String,
    },

    /// A backing buffer does not hold exactly `rows * cols` elements.
    #[error("buffer holds {actual} elements but {expected} are required")]
    BufferLength { expected: usize, actual: usize },
}

/// Result type alias for vml-dispatch operations.
pub type Result<T> = std::result::Result<T, DispatchError>;

/// Creates a shape mismatch error from destination and source extents.
pub fn shape_mismatch(dst: (usize, usize), src: (usize, usize)) -> DispatchError {
    DispatchError::ShapeMismatch {
        dst_rows: dst.0,
        dst_cols: dst.1,
        src_rows: src.0,
        src_cols: src.1,
    }
}

/// Creates an invalid shape error.
pub fn invalid_shape(rows: usize, cols: usize, message: impl Into<String>) -> DispatchError {
    DispatchError::InvalidShape {
        rows,
        cols,
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_mismatch_display() {
        let error = shape_mismatch((4, 1), (3, 1));
        let display = format!("{error}");
        assert!(display.contains("shape mismatch"));
        assert!(display.contains("4x1"));
        assert!(display.contains("3x1"));
    }

    #[test]
    fn test_invalid_shape_display() {
        let error = invalid_shape(3, 2, "fixed row count is 4");
        let display = format!("{error}");
        assert!(display.contains("invalid shape 3x2"));
        assert!(display.contains("fixed row count is 4"));
    }

    #[test]
    fn test_buffer_length_display() {
        let error = DispatchError::BufferLength {
            expected: 6,
            actual: 5,
        };
        assert_eq!(
            format!("{error}"),
            "buffer holds 5 elements but 6 are required"
        );
    }

    #[test]
    fn test_error_equality() {
        assert_eq!(shape_mismatch((2, 2), (2, 3)), shape_mismatch((2, 2), (2, 3)));
        assert_ne!(shape_mismatch((2, 2), (2, 3)), shape_mismatch((2, 2), (3, 2)));
    }

    #[test]
    fn test_error_trait_implementation() {
        let error = shape_mismatch((1, 1), (2, 2));
        let _: &dyn std::error::Error = &error;
        assert!(std::error::Error::source(&error).is_none());
    }
}
