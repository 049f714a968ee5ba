//! Combines a [`TargetBundle`] with raw network outputs into the three loss terms used to
//! train the detector.

use ndarray::{s, ArrayView1, ArrayView4, ArrayView5, Zip};
use serde::Serialize;

use crate::bundle::{Slot, TargetBundle};
use crate::error::{Error, Result};

/// Raw network outputs for a single image.
#[derive(Debug, Clone, Copy)]
pub struct Predictions<'a> {
    /// `(1, height, width, num_anchors, 4)` raw box offsets.
    pub bbox: ArrayView5<'a, f32>,
    /// `(1, height, width, num_anchors)` predicted objectness.
    pub confidence: ArrayView4<'a, f32>,
    /// `(1, height, width, num_anchors, num_classes)` unnormalized class scores.
    pub class_logits: ArrayView5<'a, f32>,
}

/// Summed loss terms for one image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LossTerms {
    pub bbox: f32,
    pub class: f32,
    pub confidence: f32,
}

impl LossTerms {
    #[must_use]
    pub fn total(&self) -> f32 {
        self.bbox + self.class + self.confidence
    }
}

/// Compute the loss terms of `predictions` against `bundle`.
///
/// - bbox: L1 distance to the regression target, on positive slots only
/// - class: cross entropy against the class target, on positive slots only
/// - confidence: L1 distance to the object mask, weighted by the IOU mask
pub fn compute(predictions: &Predictions<'_>, bundle: &TargetBundle) -> Result<LossTerms> {
    let (height, width, num_anchors) = bundle.dim();
    check_dim(
        predictions.bbox.shape(),
        &[1, height, width, num_anchors, 4],
    )?;
    check_dim(
        predictions.confidence.shape(),
        &[1, height, width, num_anchors],
    )?;
    let num_classes = predictions.class_logits.dim().4;
    check_dim(
        predictions.class_logits.shape(),
        &[1, height, width, num_anchors, num_classes],
    )?;

    let mut terms = LossTerms::default();

    for positive in bundle.positives() {
        let Slot { row, col, anchor } = positive.slot;

        let pred = predictions.bbox.slice(s![0, row, col, anchor, ..]);
        let target = <[f32; 4]>::from(positive.target);
        terms.bbox += pred
            .iter()
            .zip(target)
            .map(|(p, t)| (p - t).abs())
            .sum::<f32>();

        let logits = predictions.class_logits.slice(s![0, row, col, anchor, ..]);
        terms.class += cross_entropy(logits, positive.class_id, num_classes)?;
    }

    terms.confidence = Zip::from(predictions.confidence.slice(s![0, .., .., ..]))
        .and(bundle.object_mask())
        .and(bundle.iou_mask())
        .fold(0.0, |acc, &pred, &object, &weight| {
            acc + weight * (pred - object).abs()
        });

    Ok(terms)
}

fn cross_entropy(logits: ArrayView1<'_, f32>, class_id: u32, num_classes: usize) -> Result<f32> {
    let class = class_id as usize;
    if class >= num_classes {
        return Err(Error::InvalidClass {
            class_id,
            num_classes,
        });
    }

    let max = logits.fold(f32::NEG_INFINITY, |acc, &x| acc.max(x));
    let log_sum_exp = max + logits.mapv(|x| (x - max).exp()).sum().ln();

    Ok(log_sum_exp - logits[class])
}

fn check_dim(actual: &[usize], expected: &[usize]) -> Result<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(Error::shape_mismatch(format!("{expected:?}"), format!("{actual:?}")))
    }
}
