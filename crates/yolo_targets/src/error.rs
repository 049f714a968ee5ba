//! See [`Error`].

use miette::Diagnostic;
use thiserror::Error;

/// Error types for this crate.
///
/// Errors for which [`Error::is_per_ground_truth`] holds only invalidate a single box, the
/// assigner skips that box and continues. Every other variant aborts the whole call.
#[derive(Debug, Error, Diagnostic, Clone, PartialEq)]
pub enum Error {
    #[error("Shape mismatch: expected {expected}, got {actual}")]
    #[diagnostic(code(yolo_targets::shape_mismatch))]
    ShapeMismatch { expected: String, actual: String },

    #[error("Anchor {index} has a non-positive size ({width}, {height})")]
    #[diagnostic(
        code(yolo_targets::invalid_anchor),
        help("anchor sizes are given in grid cells and must be strictly positive")
    )]
    InvalidAnchor {
        index: usize,
        width: f32,
        height: f32,
    },

    #[error("Matching threshold {threshold} is outside of [0, 1]")]
    #[diagnostic(code(yolo_targets::invalid_threshold))]
    InvalidThreshold { threshold: f32 },

    #[error("Degenerate box with width {width} and height {height}")]
    #[diagnostic(code(yolo_targets::degenerate_box))]
    DegenerateBox { width: f32, height: f32 },

    #[error("Box centre ({cx}, {cy}) lies outside the {height}x{width} grid")]
    #[diagnostic(code(yolo_targets::out_of_range))]
    OutOfRangeCoordinate {
        cx: f32,
        cy: f32,
        height: usize,
        width: usize,
    },

    #[error("Cannot take the logarithm of size ratio {ratio}")]
    #[diagnostic(code(yolo_targets::numeric_domain))]
    NumericDomain { ratio: f32 },

    #[error("Class id {class_id} is outside of 0..{num_classes}")]
    #[diagnostic(code(yolo_targets::invalid_class))]
    InvalidClass { class_id: u32, num_classes: usize },

    #[error("Failed to parse anchor list: {reason}")]
    #[diagnostic(
        code(yolo_targets::anchor_parse),
        help("anchors are written as `w0,h0,w1,h1,...`")
    )]
    AnchorParse { reason: String },
}

impl Error {
    pub(crate) fn shape_mismatch(expected: impl ToString, actual: impl ToString) -> Self {
        Error::ShapeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Whether this error only invalidates a single ground truth.
    #[must_use]
    pub fn is_per_ground_truth(&self) -> bool {
        matches!(
            self,
            Error::DegenerateBox { .. }
                | Error::OutOfRangeCoordinate { .. }
                | Error::NumericDomain { .. }
        )
    }
}

/// Type alias for [`Result<T, Error>`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_ground_truth_errors() {
        assert!(Error::DegenerateBox { width: 0.0, height: 1.0 }.is_per_ground_truth());
        assert!(Error::NumericDomain { ratio: 0.0 }.is_per_ground_truth());
        assert!(
            Error::OutOfRangeCoordinate { cx: 14.0, cy: 0.5, height: 13, width: 13 }
                .is_per_ground_truth()
        );

        assert!(!Error::shape_mismatch("1 anchor", "2 anchors").is_per_ground_truth());
        assert!(!Error::InvalidThreshold { threshold: f32::NAN }.is_per_ground_truth());
        assert!(
            !Error::InvalidAnchor { index: 0, width: 0.0, height: 1.0 }.is_per_ground_truth()
        );
    }
}
