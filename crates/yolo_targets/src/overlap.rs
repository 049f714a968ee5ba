use ndarray::Array3;
use serde::{Deserialize, Serialize};

use crate::anchor::AnchorGrid;
use crate::bbox::{Bbox, ConvertBbox, Cxcywh, Xyxy};
use crate::error::{Error, Result};

/// Rule deciding when the intersection of an anchor and a ground truth is forced to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapGate {
    /// Only zero the intersection when the boxes are separated along both axes.
    ///
    /// Pairs separated along a single axis get a negative intersection, and therefore a
    /// negative IOU. Those anchors always fall below the matching threshold.
    #[default]
    BothAxesNegative,
    /// Zero the intersection as soon as the boxes are separated along either axis.
    AnyAxisNegative,
}

impl OverlapGate {
    fn intersection(self, overlap_x: f32, overlap_y: f32) -> f32 {
        let gated = match self {
            OverlapGate::BothAxesNegative => overlap_x < 0.0 && overlap_y < 0.0,
            OverlapGate::AnyAxisNegative => overlap_x < 0.0 || overlap_y < 0.0,
        };

        if gated { 0.0 } else { overlap_x * overlap_y }
    }
}

/// Compute the IOU between every anchor in `grid` and `gt`, both in grid cells.
///
/// Anchor corners are clipped to the grid bounds before intersecting, the ground truth is
/// not. The anchor area in the union uses the unclipped anchor size.
///
/// Returns a `(height, width, num_anchors)` array.
pub fn iou_grid(grid: &AnchorGrid, gt: &Bbox<Cxcywh>, gate: OverlapGate) -> Result<Array3<f32>> {
    let (height, width, num_anchors) = grid.dim();
    let gt_corners: Bbox<Xyxy> = gt.convert();
    let gt_area = gt.area();

    let mut ious = Array3::<f32>::zeros((height, width, num_anchors));
    for ((row, col, a), iou) in ious.indexed_iter_mut() {
        let anchor = grid.anchor(row, col, a);
        let clipped = ConvertBbox::<Xyxy>::convert(&anchor).clamp(width as f32, height as f32);

        let (overlap_x, overlap_y) = clipped.axis_overlap(&gt_corners);
        let intersection = gate.intersection(overlap_x, overlap_y);
        let union = anchor.area() + gt_area - intersection;

        if !(union.is_finite() && union > 0.0) {
            let (width, height) = gt.size();
            return Err(Error::DegenerateBox { width, height });
        }

        *iou = intersection / union;
    }

    Ok(ious)
}
