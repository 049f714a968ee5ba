use ndarray::Array3;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::anchor::{validate_anchors, AnchorGrid, AnchorShape};
use crate::bbox::{Bbox, ConvertBbox, Cxcywh};
use crate::box_coder::{BoxCoder, BoxTarget};
use crate::bundle::{Slot, TargetBundle};
use crate::config::TargetConfig;
use crate::error::{Error, Result};
use crate::overlap::{iou_grid, OverlapGate};

/// Default IOU a best match has to exceed to become a positive.
pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// A ground truth box, normalized to `[0, 1]` relative to the image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundTruth {
    pub xmin: f32,
    pub ymin: f32,
    pub xmax: f32,
    pub ymax: f32,
    pub class_id: u32,
}

impl GroundTruth {
    #[must_use]
    pub const fn new(xmin: f32, ymin: f32, xmax: f32, ymax: f32, class_id: u32) -> Self {
        GroundTruth {
            xmin,
            ymin,
            xmax,
            ymax,
            class_id,
        }
    }

    /// The box in centre form, scaled to grid cells.
    #[must_use]
    pub fn to_grid(&self, height: usize, width: usize) -> Bbox<Cxcywh> {
        Bbox::xyxy(self.xmin, self.ymin, self.xmax, self.ymax)
            .scaled(width as f32, height as f32)
            .convert()
    }
}

/// Shape of the raw bounding box prediction, `(batch, height, width, num_anchors, 4)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictionShape {
    pub batch: usize,
    pub height: usize,
    pub width: usize,
    pub num_anchors: usize,
    pub coords: usize,
}

impl PredictionShape {
    /// Shape of a single image prediction.
    #[must_use]
    pub const fn new(height: usize, width: usize, num_anchors: usize) -> Self {
        PredictionShape {
            batch: 1,
            height,
            width,
            num_anchors,
            coords: 4,
        }
    }

    /// Read the shape from the dimensions of a prediction tensor.
    pub fn from_dims(dims: &[usize]) -> Result<Self> {
        match *dims {
            [batch, height, width, num_anchors, coords] => Ok(PredictionShape {
                batch,
                height,
                width,
                num_anchors,
                coords,
            }),
            _ => Err(Error::shape_mismatch(
                "(1, height, width, num_anchors, 4)",
                format!("{dims:?}"),
            )),
        }
    }

    fn validate(&self, anchors: &[AnchorShape]) -> Result<()> {
        if self.batch != 1 || self.coords != 4 {
            return Err(Error::shape_mismatch(
                "(1, height, width, num_anchors, 4)",
                format!(
                    "({}, {}, {}, {}, {})",
                    self.batch, self.height, self.width, self.num_anchors, self.coords
                ),
            ));
        }

        if self.num_anchors != anchors.len() {
            return Err(Error::shape_mismatch(
                format!("{} anchors per cell", anchors.len()),
                format!("{} anchors per cell", self.num_anchors),
            ));
        }

        Ok(())
    }
}

/// What happens when two ground truths pick the same slot as their best match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// The ground truth processed last owns the slot.
    #[default]
    LastWriteWins,
    /// The ground truth with the highest IOU owns the slot, the first one on a tie.
    HighestIouWins,
}

/// Confidence loss weights written into the IOU mask.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MaskWeights {
    /// Weight of anchors whose IOU with a matched ground truth is below the threshold.
    pub background: f32,
    /// Weight of the best matching anchor.
    pub positive: f32,
}

impl Default for MaskWeights {
    fn default() -> Self {
        MaskWeights {
            background: 0.1,
            positive: 5.0,
        }
    }
}

/// Result of processing a single ground truth.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The ground truth now owns `slot`. `replaced` is set if another ground truth owned it before.
    Assigned { slot: Slot, iou: f32, replaced: bool },
    /// The best match was already owned by a ground truth with an equal or higher IOU.
    Contested { slot: Slot, iou: f32, owner_iou: f32 },
    /// The best match did not exceed the threshold, nothing was written.
    BelowThreshold { slot: Slot, iou: f32 },
    /// The ground truth was invalid and skipped, nothing was written.
    Skipped(Error),
}

impl Outcome {
    #[must_use]
    pub fn is_assigned(&self) -> bool {
        matches!(self, Outcome::Assigned { .. })
    }
}

/// Training targets for one image, together with the outcome of every ground truth.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub bundle: TargetBundle,
    /// One entry per ground truth, in input order.
    pub outcomes: Vec<Outcome>,
}

/// Best anchor for a ground truth.
struct Candidate {
    gt: Bbox<Cxcywh>,
    ious: Array3<f32>,
    slot: Slot,
    iou: f32,
}

/// Builds [`TargetBundle`]s by matching ground truths against a grid of anchors.
///
/// The assigner holds no per-image state, a single instance can be shared between threads.
#[derive(Debug, Clone)]
pub struct TargetAssigner {
    coder: BoxCoder,
    threshold: f32,
    weights: MaskWeights,
    conflict_policy: ConflictPolicy,
    overlap_gate: OverlapGate,
}

impl TargetAssigner {
    /// Create an assigner with the default threshold, weights and policies.
    pub fn new(anchors: Vec<AnchorShape>) -> Result<Self> {
        if anchors.is_empty() {
            return Err(Error::shape_mismatch("at least one anchor", "no anchors"));
        }
        validate_anchors(&anchors)?;

        Ok(TargetAssigner {
            coder: BoxCoder::new(anchors),
            threshold: DEFAULT_THRESHOLD,
            weights: MaskWeights::default(),
            conflict_policy: ConflictPolicy::default(),
            overlap_gate: OverlapGate::default(),
        })
    }

    pub fn from_config(config: &TargetConfig) -> Result<Self> {
        Ok(Self::new(config.anchors.clone())?
            .with_threshold(config.threshold)
            .with_weights(config.weights)
            .with_conflict_policy(config.conflict_policy)
            .with_overlap_gate(config.overlap_gate))
    }

    /// Set the matching threshold. It is checked against `[0, 1]` by [`Self::assign`].
    #[must_use]
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_weights(mut self, weights: MaskWeights) -> Self {
        self.weights = weights;
        self
    }

    #[must_use]
    pub fn with_conflict_policy(mut self, conflict_policy: ConflictPolicy) -> Self {
        self.conflict_policy = conflict_policy;
        self
    }

    #[must_use]
    pub fn with_overlap_gate(mut self, overlap_gate: OverlapGate) -> Self {
        self.overlap_gate = overlap_gate;
        self
    }

    #[must_use]
    pub fn anchors(&self) -> &[AnchorShape] {
        self.coder.anchors()
    }

    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Build the training targets for one image.
    ///
    /// Ground truths are folded into the bundle strictly in input order. An invalid ground
    /// truth is skipped and reported in [`Assignment::outcomes`]. A threshold outside of
    /// `[0, 1]` or a prediction shape that does not fit the anchors fails the whole call.
    pub fn assign(
        &self,
        shape: PredictionShape,
        ground_truths: &[GroundTruth],
    ) -> Result<Assignment> {
        validate_threshold(self.threshold)?;
        shape.validate(self.anchors())?;

        let grid = AnchorGrid::new(shape.height, shape.width, self.anchors());
        let empty = TargetBundle::new(shape.height, shape.width, shape.num_anchors);

        let (bundle, outcomes) = ground_truths.iter().enumerate().try_fold(
            (empty, Vec::with_capacity(ground_truths.len())),
            |(bundle, mut outcomes), (index, gt)| {
                let (bundle, outcome) = self.step(&grid, bundle, gt)?;
                log_outcome(index, &outcome);
                outcomes.push(outcome);
                Ok::<_, Error>((bundle, outcomes))
            },
        )?;

        Ok(Assignment { bundle, outcomes })
    }

    /// Fold a single ground truth into `bundle`, returning the next bundle.
    ///
    /// Errors that only concern this ground truth become [`Outcome::Skipped`] and leave the
    /// bundle untouched, any other error is returned.
    pub fn step(
        &self,
        grid: &AnchorGrid,
        bundle: TargetBundle,
        gt: &GroundTruth,
    ) -> Result<(TargetBundle, Outcome)> {
        let candidate = match self.best_match(grid, gt) {
            Ok(candidate) => candidate,
            Err(error) => return skip(bundle, error),
        };

        let Candidate {
            gt: grid_box,
            ious,
            slot,
            iou,
        } = candidate;
        if iou <= self.threshold {
            return Ok((bundle, Outcome::BelowThreshold { slot, iou }));
        }

        let target = match self.coder.encode(slot.anchor, &grid_box) {
            Ok(target) => target,
            Err(error) => return skip(bundle, error),
        };

        let owner_iou = bundle.owner_iou(slot);
        let bundle = bundle.down_weight(&ious, self.threshold, self.weights.background);

        match (self.conflict_policy, owner_iou) {
            (ConflictPolicy::HighestIouWins, Some(owner_iou)) if owner_iou >= iou => Ok((
                bundle,
                Outcome::Contested {
                    slot,
                    iou,
                    owner_iou,
                },
            )),
            _ => Ok((
                self.claim(bundle, slot, target, gt.class_id, iou),
                Outcome::Assigned {
                    slot,
                    iou,
                    replaced: owner_iou.is_some(),
                },
            )),
        }
    }

    fn claim(
        &self,
        bundle: TargetBundle,
        slot: Slot,
        target: BoxTarget,
        class_id: u32,
        iou: f32,
    ) -> TargetBundle {
        bundle.with_positive(slot, target, class_id, iou, self.weights.positive)
    }

    fn best_match(&self, grid: &AnchorGrid, gt: &GroundTruth) -> Result<Candidate> {
        let (height, width, num_anchors) = grid.dim();
        let grid_box = gt.to_grid(height, width);
        let (cx, cy, w, h) = grid_box.inner;

        if !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
            return Err(Error::DegenerateBox {
                width: w,
                height: h,
            });
        }

        if !((0.0..width as f32).contains(&cx) && (0.0..height as f32).contains(&cy)) {
            return Err(Error::OutOfRangeCoordinate {
                cx,
                cy,
                height,
                width,
            });
        }

        let ious = iou_grid(grid, &grid_box, self.overlap_gate)?;
        let (index, iou) = argmax(&ious).ok_or_else(|| {
            Error::shape_mismatch("at least one anchor", format!("{:?}", ious.dim()))
        })?;

        Ok(Candidate {
            gt: grid_box,
            slot: Slot::from_flat_index(index, width, num_anchors),
            iou,
            ious,
        })
    }
}

/// Skip the ground truth if `error` only concerns it, abort otherwise.
fn skip(bundle: TargetBundle, error: Error) -> Result<(TargetBundle, Outcome)> {
    if error.is_per_ground_truth() {
        Ok((bundle, Outcome::Skipped(error)))
    } else {
        Err(error)
    }
}

/// Check that a matching threshold lies in `[0, 1]`.
pub fn validate_threshold(threshold: f32) -> Result<()> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(())
    } else {
        Err(Error::InvalidThreshold { threshold })
    }
}

/// Row-major argmax, the first occurrence wins on a tie.
fn argmax(values: &Array3<f32>) -> Option<(usize, f32)> {
    values
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best, (index, value)| match best {
            Some((_, best_value)) if value <= best_value => best,
            _ => Some((index, value)),
        })
}

fn log_outcome(index: usize, outcome: &Outcome) {
    match outcome {
        Outcome::Assigned { slot, iou, replaced } => {
            debug!(index, ?slot, iou, replaced, "assigned ground truth");
        }
        Outcome::Contested { slot, iou, owner_iou } => {
            debug!(index, ?slot, iou, owner_iou, "ground truth lost its slot to a better match");
        }
        Outcome::BelowThreshold { slot, iou } => {
            debug!(index, ?slot, iou, "best match below threshold, dropping ground truth");
        }
        Outcome::Skipped(error) => {
            warn!(index, %error, "skipping invalid ground truth");
        }
    }
}

/// Build the training targets for one image with the default policies.
///
/// `threshold` has to lie in `[0, 1]`. Returns only the bundle, see
/// [`TargetAssigner::assign`] for per ground truth outcomes.
pub fn build_target(
    shape: PredictionShape,
    ground_truths: &[GroundTruth],
    anchors: &[AnchorShape],
    threshold: f32,
) -> Result<TargetBundle> {
    let assignment = TargetAssigner::new(anchors.to_vec())?
        .with_threshold(threshold)
        .assign(shape, ground_truths)?;

    Ok(assignment.bundle)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn unit_assigner() -> TargetAssigner {
        TargetAssigner::new(vec![AnchorShape::new(1.0, 1.0)]).unwrap()
    }

    /// A ground truth exactly covering cell `(row, col)` of a `size x size` grid.
    fn cell_box(row: usize, col: usize, size: usize, class_id: u32) -> GroundTruth {
        let s = size as f32;
        GroundTruth::new(
            col as f32 / s,
            row as f32 / s,
            (col + 1) as f32 / s,
            (row + 1) as f32 / s,
            class_id,
        )
    }

    #[test]
    fn argmax_prefers_first_occurrence() {
        let values = Array3::from_shape_vec((1, 2, 2), vec![0.2, 0.8, 0.8, 0.1]).unwrap();

        assert_eq!(argmax(&values), Some((1, 0.8)));
        assert_eq!(argmax(&Array3::zeros((0, 2, 2))), None);
    }

    #[test]
    fn exact_match_becomes_single_positive() {
        let assignment = unit_assigner()
            .assign(PredictionShape::new(4, 4, 1), &[cell_box(2, 1, 4, 9)])
            .unwrap();
        let bundle = &assignment.bundle;
        let slot = Slot::new(2, 1, 0);

        assert_eq!(bundle.num_positives(), 1);
        assert_eq!(bundle.class_at(slot), Some(9));
        assert_eq!(bundle.iou_mask()[[2, 1, 0]], 5.0);
        assert!(matches!(
            assignment.outcomes[..],
            [Outcome::Assigned { slot: s, replaced: false, .. }] if s == slot
        ));

        let target = bundle.target_at(slot).unwrap();
        assert_abs_diff_eq!(target.tx, 0.5, epsilon = 1e-5);
        assert_abs_diff_eq!(target.ty, 0.5, epsilon = 1e-5);
        assert_abs_diff_eq!(target.tw, 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(target.th, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn background_anchors_are_down_weighted() {
        let bundle = build_target(
            PredictionShape::new(4, 4, 1),
            &[cell_box(0, 0, 4, 1)],
            &[AnchorShape::new(1.0, 1.0)],
            DEFAULT_THRESHOLD,
        )
        .unwrap();

        for ((row, col, _), &weight) in bundle.iou_mask().indexed_iter() {
            if (row, col) == (0, 0) {
                assert_eq!(weight, 5.0);
            } else {
                assert_eq!(weight, 0.1);
            }
        }
    }

    #[test]
    fn well_overlapping_anchors_are_ignored() {
        // two identical anchors: the second has the same IOU but is not the winner
        let assigner = TargetAssigner::new(vec![AnchorShape::new(1.0, 1.0); 2]).unwrap();
        let assignment = assigner
            .assign(PredictionShape::new(2, 2, 2), &[cell_box(1, 1, 2, 0)])
            .unwrap();
        let mask = assignment.bundle.iou_mask();

        assert_eq!(mask[[1, 1, 0]], 5.0);
        assert_eq!(mask[[1, 1, 1]], 0.0);
        assert_eq!(mask[[0, 0, 0]], 0.1);
        assert_eq!(assignment.bundle.num_positives(), 1);
    }

    #[test]
    fn below_threshold_writes_nothing() {
        // a tiny box cannot reach an IOU above 0.5 with a unit anchor
        let gt = GroundTruth::new(0.30, 0.30, 0.32, 0.32, 4);
        let assignment = unit_assigner()
            .assign(PredictionShape::new(4, 4, 1), &[gt])
            .unwrap();

        assert_eq!(assignment.bundle, TargetBundle::new(4, 4, 1));
        assert!(matches!(assignment.outcomes[..], [Outcome::BelowThreshold { .. }]));
    }

    #[test]
    fn iou_equal_to_threshold_is_dropped() {
        // anchor and box share a centre, the box covers half of the anchor
        let gt = GroundTruth::new(0.25, 0.0, 0.5, 0.25, 0);
        let assignment = TargetAssigner::new(vec![AnchorShape::new(2.0, 1.0)])
            .unwrap()
            .with_overlap_gate(OverlapGate::AnyAxisNegative)
            .assign(PredictionShape::new(4, 4, 1), &[gt])
            .unwrap();

        assert!(matches!(
            assignment.outcomes[..],
            [Outcome::BelowThreshold { iou, .. }] if (iou - 0.5).abs() < 1e-6
        ));
    }

    #[test]
    fn invalid_ground_truths_are_skipped() {
        let ground_truths = [
            GroundTruth::new(0.5, 0.5, 0.5, 0.7, 1),
            GroundTruth::new(0.6, 0.2, 0.4, 0.4, 1),
            GroundTruth::new(1.0, 0.0, 1.5, 0.25, 1),
            cell_box(3, 3, 4, 2),
        ];
        let assignment = unit_assigner()
            .assign(PredictionShape::new(4, 4, 1), &ground_truths)
            .unwrap();

        assert!(matches!(
            assignment.outcomes[0],
            Outcome::Skipped(Error::DegenerateBox { .. })
        ));
        assert!(matches!(
            assignment.outcomes[1],
            Outcome::Skipped(Error::DegenerateBox { .. })
        ));
        assert!(matches!(
            assignment.outcomes[2],
            Outcome::Skipped(Error::OutOfRangeCoordinate { .. })
        ));
        assert!(assignment.outcomes[3].is_assigned());
        assert_eq!(assignment.bundle.class_at(Slot::new(3, 3, 0)), Some(2));
        assert_eq!(assignment.bundle.num_positives(), 1);
    }

    #[test]
    fn non_finite_ground_truth_is_skipped() {
        let assignment = unit_assigner()
            .assign(
                PredictionShape::new(4, 4, 1),
                &[GroundTruth::new(f32::NAN, 0.0, 0.5, 0.5, 0)],
            )
            .unwrap();

        assert!(matches!(assignment.outcomes[0], Outcome::Skipped(_)));
    }

    #[test]
    fn invalid_threshold_is_fatal() {
        for threshold in [f32::NAN, f32::INFINITY, 1.5, -0.1] {
            assert!(matches!(
                unit_assigner()
                    .with_threshold(threshold)
                    .assign(PredictionShape::new(4, 4, 1), &[cell_box(0, 0, 4, 1)]),
                Err(Error::InvalidThreshold { .. })
            ));
        }

        assert!(matches!(
            build_target(
                PredictionShape::new(4, 4, 1),
                &[],
                &[AnchorShape::new(1.0, 1.0)],
                f32::NAN
            ),
            Err(Error::InvalidThreshold { .. })
        ));
        assert!(
            unit_assigner()
                .with_threshold(0.0)
                .assign(PredictionShape::new(4, 4, 1), &[])
                .is_ok()
        );
    }

    #[test]
    fn step_skips_invalid_ground_truth() {
        let grid = AnchorGrid::new(4, 4, &[AnchorShape::new(1.0, 1.0)]);
        let bundle = TargetBundle::new(4, 4, 1);

        let (next, outcome) = unit_assigner()
            .step(&grid, bundle.clone(), &GroundTruth::new(0.5, 0.5, 0.5, 0.7, 1))
            .unwrap();

        assert_eq!(next, bundle);
        assert!(matches!(
            outcome,
            Outcome::Skipped(Error::DegenerateBox { .. })
        ));
    }

    #[test]
    fn step_returns_structural_errors() {
        // the grid has a second anchor the coder does not know about, and it is the best match
        let grid = AnchorGrid::new(
            4,
            4,
            &[AnchorShape::new(0.5, 0.5), AnchorShape::new(1.0, 1.0)],
        );
        let result = unit_assigner().step(&grid, TargetBundle::new(4, 4, 2), &cell_box(1, 1, 4, 0));

        assert!(matches!(result, Err(Error::ShapeMismatch { .. })));
    }

    #[test]
    fn shape_mismatch_is_fatal() {
        let assigner = unit_assigner();

        assert!(matches!(
            assigner.assign(PredictionShape::new(4, 4, 2), &[cell_box(0, 0, 4, 0)]),
            Err(Error::ShapeMismatch { .. })
        ));

        let batched = PredictionShape::from_dims(&[2, 4, 4, 1, 4]).unwrap();
        assert!(matches!(
            assigner.assign(batched, &[]),
            Err(Error::ShapeMismatch { .. })
        ));
        assert!(matches!(
            PredictionShape::from_dims(&[4, 4, 1, 4]),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn invalid_anchor_is_fatal() {
        assert!(matches!(
            TargetAssigner::new(vec![AnchorShape::new(1.0, -1.0)]),
            Err(Error::InvalidAnchor { index: 0, .. })
        ));
    }

    #[test]
    fn last_write_wins_on_shared_slot() {
        let first = GroundTruth::new(0.25, 0.25, 0.5, 0.5, 1);
        let second = GroundTruth::new(0.26, 0.26, 0.5, 0.5, 2);
        let assignment = unit_assigner()
            .assign(PredictionShape::new(4, 4, 1), &[first, second])
            .unwrap();
        let slot = Slot::new(1, 1, 0);
        let bundle = &assignment.bundle;

        assert!(matches!(
            assignment.outcomes[1],
            Outcome::Assigned { replaced: true, .. }
        ));
        assert_eq!(bundle.num_positives(), 1);
        assert_eq!(bundle.class_at(slot), Some(2));

        let target = bundle.target_at(slot).unwrap();
        assert_abs_diff_eq!(target.tx, (0.76 * 2.0) - 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(target.tw, (0.24_f32 * 4.0).ln(), epsilon = 1e-5);
    }

    #[test]
    fn highest_iou_wins_keeps_the_better_match() {
        let exact = GroundTruth::new(0.25, 0.25, 0.5, 0.5, 1);
        let worse = GroundTruth::new(0.26, 0.26, 0.5, 0.5, 2);
        let assigner = unit_assigner().with_conflict_policy(ConflictPolicy::HighestIouWins);

        let assignment = assigner
            .assign(PredictionShape::new(4, 4, 1), &[exact, worse])
            .unwrap();
        assert_eq!(assignment.bundle.class_at(Slot::new(1, 1, 0)), Some(1));
        assert!(matches!(assignment.outcomes[1], Outcome::Contested { .. }));

        let assignment = assigner
            .assign(PredictionShape::new(4, 4, 1), &[worse, exact])
            .unwrap();
        assert_eq!(assignment.bundle.class_at(Slot::new(1, 1, 0)), Some(1));
        assert!(matches!(
            assignment.outcomes[1],
            Outcome::Assigned { replaced: true, .. }
        ));
    }

    #[test]
    fn later_ground_truth_down_weights_earlier_positive() {
        let assignment = unit_assigner()
            .assign(
                PredictionShape::new(4, 4, 1),
                &[cell_box(0, 0, 4, 1), cell_box(3, 3, 4, 2)],
            )
            .unwrap();
        let bundle = &assignment.bundle;

        // the second box overlaps nothing near (0, 0), so its background weight lands there
        assert_eq!(bundle.iou_mask()[[0, 0, 0]], 0.1);
        assert_eq!(bundle.iou_mask()[[3, 3, 0]], 5.0);
        assert_eq!(bundle.class_at(Slot::new(0, 0, 0)), Some(1));
        assert_eq!(bundle.num_positives(), 2);
    }

    #[test]
    fn custom_weights() {
        let assignment = unit_assigner()
            .with_weights(MaskWeights {
                background: 0.5,
                positive: 1.0,
            })
            .assign(PredictionShape::new(2, 2, 1), &[cell_box(0, 1, 2, 0)])
            .unwrap();

        assert_eq!(assignment.bundle.iou_mask()[[0, 1, 0]], 1.0);
        assert_eq!(assignment.bundle.iou_mask()[[1, 0, 0]], 0.5);
    }

    #[test]
    fn no_ground_truths_gives_empty_bundle() {
        let assignment = unit_assigner()
            .assign(PredictionShape::new(3, 3, 1), &[])
            .unwrap();

        assert_eq!(assignment.bundle, TargetBundle::new(3, 3, 1));
        assert!(assignment.outcomes.is_empty());
    }
}
