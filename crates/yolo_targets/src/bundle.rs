use ndarray::{arr1, s, Array1, Array3, Array4, ArrayView3, ArrayView4, Zip};
use serde::Serialize;

use crate::box_coder::BoxTarget;

/// Position of a single anchor in the `(height, width, num_anchors)` grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Slot {
    pub row: usize,
    pub col: usize,
    pub anchor: usize,
}

impl Slot {
    #[must_use]
    pub const fn new(row: usize, col: usize, anchor: usize) -> Self {
        Slot { row, col, anchor }
    }

    /// Decode a row-major flat index over `(height, width, num_anchors)`.
    #[must_use]
    pub const fn from_flat_index(index: usize, width: usize, num_anchors: usize) -> Self {
        Slot {
            row: index / (width * num_anchors),
            col: (index / num_anchors) % width,
            anchor: index % num_anchors,
        }
    }

    /// Row-major flat index over `(height, width, num_anchors)`.
    #[must_use]
    pub const fn flat_index(&self, width: usize, num_anchors: usize) -> usize {
        (self.row * width + self.col) * num_anchors + self.anchor
    }

    fn index(self) -> [usize; 3] {
        [self.row, self.col, self.anchor]
    }
}

/// A positive slot of a [`TargetBundle`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Positive {
    pub slot: Slot,
    pub class_id: u32,
    pub target: BoxTarget,
}

/// Training targets for one image, indexed by `(row, col, anchor)`.
///
/// The class target is only defined where the object mask is set. It is stored as
/// `Option<u32>` so that an empty slot can never be mistaken for class `0`.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetBundle {
    object_mask: Array3<f32>,
    bbox_target: Array4<f32>,
    class_target: Array3<Option<u32>>,
    iou_mask: Array3<f32>,
    // IOU of the ground truth that currently owns a positive slot
    owner_iou: Array3<f32>,
}

impl TargetBundle {
    /// An empty bundle: no positives, every IOU mask weight at `0.0`.
    #[must_use]
    pub fn new(height: usize, width: usize, num_anchors: usize) -> Self {
        let dim = (height, width, num_anchors);
        TargetBundle {
            object_mask: Array3::zeros(dim),
            bbox_target: Array4::zeros((height, width, num_anchors, 4)),
            class_target: Array3::from_elem(dim, None),
            iou_mask: Array3::zeros(dim),
            owner_iou: Array3::zeros(dim),
        }
    }

    /// `(height, width, num_anchors)` of the bundle.
    #[must_use]
    pub fn dim(&self) -> (usize, usize, usize) {
        self.object_mask.dim()
    }

    /// `1.0` for positive slots, `0.0` elsewhere.
    #[must_use]
    pub fn object_mask(&self) -> ArrayView3<'_, f32> {
        self.object_mask.view()
    }

    /// `(tx, ty, tw, th)` per slot. Only meaningful where [`Self::object_mask`] is set.
    #[must_use]
    pub fn bbox_target(&self) -> ArrayView4<'_, f32> {
        self.bbox_target.view()
    }

    #[must_use]
    pub fn class_target(&self) -> ArrayView3<'_, Option<u32>> {
        self.class_target.view()
    }

    /// Confidence loss weight per slot.
    #[must_use]
    pub fn iou_mask(&self) -> ArrayView3<'_, f32> {
        self.iou_mask.view()
    }

    #[must_use]
    pub fn is_positive(&self, slot: Slot) -> bool {
        self.object_mask[slot.index()] > 0.0
    }

    /// Class of a positive slot, `None` for every other slot.
    #[must_use]
    pub fn class_at(&self, slot: Slot) -> Option<u32> {
        if self.is_positive(slot) {
            self.class_target[slot.index()]
        } else {
            None
        }
    }

    /// Regression target of a positive slot.
    #[must_use]
    pub fn target_at(&self, slot: Slot) -> Option<BoxTarget> {
        if !self.is_positive(slot) {
            return None;
        }

        let t = self.bbox_target.slice(s![slot.row, slot.col, slot.anchor, ..]);
        Some(BoxTarget {
            tx: t[0],
            ty: t[1],
            tw: t[2],
            th: t[3],
        })
    }

    /// IOU of the ground truth currently assigned to `slot`.
    #[must_use]
    pub fn owner_iou(&self, slot: Slot) -> Option<f32> {
        self.is_positive(slot).then(|| self.owner_iou[slot.index()])
    }

    /// All positive slots in row-major order.
    #[must_use]
    pub fn positives(&self) -> Vec<Positive> {
        self.object_mask
            .indexed_iter()
            .filter(|&(_, &mask)| mask > 0.0)
            .filter_map(|((row, col, anchor), _)| {
                let slot = Slot::new(row, col, anchor);
                Some(Positive {
                    slot,
                    class_id: self.class_at(slot)?,
                    target: self.target_at(slot)?,
                })
            })
            .collect()
    }

    #[must_use]
    pub fn num_positives(&self) -> usize {
        self.object_mask.iter().filter(|&&mask| mask > 0.0).count()
    }

    /// Row-major flat class ids for a cross-entropy loss.
    ///
    /// Slots without an object are filled with `0`, so the result must only be read
    /// together with the object mask.
    #[must_use]
    pub fn dense_class_target(&self) -> Array1<i64> {
        self.class_target
            .iter()
            .map(|&class| class.map_or(0, i64::from))
            .collect()
    }

    /// Set the background weight on every slot whose IOU is below `threshold`.
    #[must_use]
    pub(crate) fn down_weight(mut self, ious: &Array3<f32>, threshold: f32, weight: f32) -> Self {
        Zip::from(&mut self.iou_mask).and(ious).for_each(|mask, &iou| {
            if iou < threshold {
                *mask = weight;
            }
        });

        self
    }

    /// Mark `slot` as positive for a ground truth, replacing any previous assignment.
    #[must_use]
    pub(crate) fn with_positive(
        mut self,
        slot: Slot,
        target: BoxTarget,
        class_id: u32,
        iou: f32,
        weight: f32,
    ) -> Self {
        let index = slot.index();
        self.object_mask[index] = 1.0;
        self.iou_mask[index] = weight;
        self.class_target[index] = Some(class_id);
        self.owner_iou[index] = iou;
        self.bbox_target
            .slice_mut(s![slot.row, slot.col, slot.anchor, ..])
            .assign(&arr1(&<[f32; 4]>::from(target)));

        self
    }
}
