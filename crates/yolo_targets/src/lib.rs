//! Training targets for single-stage, grid-based object detectors.
//!
//! Given the ground truth boxes of an image and a fixed set of anchor shapes, the
//! [`TargetAssigner`] matches every ground truth to its best anchor in the prediction grid and
//! produces a [`TargetBundle`]: an object mask, box regression targets, class targets and
//! the per-anchor weights of the confidence loss.
//!
//! ```
//! use yolo_targets::{AnchorShape, GroundTruth, PredictionShape, Slot, TargetAssigner};
//!
//! let assigner = TargetAssigner::new(vec![AnchorShape::new(1.3221, 1.73145)])
//!     .unwrap()
//!     .with_threshold(0.3);
//!
//! let assignment = assigner
//!     .assign(
//!         PredictionShape::new(13, 13, 1),
//!         &[GroundTruth::new(0.4, 0.4, 0.6, 0.6, 3)],
//!     )
//!     .unwrap();
//!
//! assert_eq!(assignment.bundle.class_at(Slot::new(6, 6, 0)), Some(3));
//! ```

pub mod anchor;
pub mod assign;
pub mod bbox;
pub mod box_coder;
pub mod bundle;
pub mod config;
pub mod error;
pub mod loss;
pub mod overlap;

pub use anchor::{AnchorGrid, AnchorShape};
pub use assign::{
    build_target, validate_threshold, Assignment, ConflictPolicy, GroundTruth, MaskWeights,
    Outcome, PredictionShape, TargetAssigner, DEFAULT_THRESHOLD,
};
pub use box_coder::{BoxCoder, BoxTarget};
pub use bundle::{Positive, Slot, TargetBundle};
pub use config::TargetConfig;
pub use error::{Error, Result};
pub use overlap::{iou_grid, OverlapGate};
