use ndarray::{Array4, ArrayView5};

use crate::anchor::AnchorShape;
use crate::bbox::{Bbox, Cxcywh};
use crate::error::{Error, Result};

/// Regression target `(tx, ty, tw, th)` of a matched anchor.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct BoxTarget {
    pub tx: f32,
    pub ty: f32,
    pub tw: f32,
    pub th: f32,
}

impl From<BoxTarget> for [f32; 4] {
    fn from(t: BoxTarget) -> Self {
        [t.tx, t.ty, t.tw, t.th]
    }
}

/// Encodes ground truths into anchor-relative regression targets, and decodes raw
/// network offsets back into normalized image coordinates.
///
/// Raw predictions are laid out as `(batch, height, width, num_anchors, 2)`.
#[derive(Debug, Clone)]
pub struct BoxCoder {
    anchors: Vec<AnchorShape>,
}

impl BoxCoder {
    #[must_use]
    pub fn new(anchors: Vec<AnchorShape>) -> Self {
        BoxCoder { anchors }
    }

    #[must_use]
    pub fn anchors(&self) -> &[AnchorShape] {
        &self.anchors
    }

    /// Encode a ground truth, in grid cells, relative to the anchor with index `anchor`.
    ///
    /// The centre is encoded as its offset inside the cell it falls in, the size as the log
    /// ratio to the anchor size.
    pub fn encode(&self, anchor: usize, gt: &Bbox<Cxcywh>) -> Result<BoxTarget> {
        let shape = self.anchors.get(anchor).ok_or_else(|| {
            Error::shape_mismatch(
                format!("anchor index below {}", self.anchors.len()),
                format!("anchor index {anchor}"),
            )
        })?;
        let (cx, cy, w, h) = gt.inner;

        Ok(BoxTarget {
            tx: cx - cx.floor(),
            ty: cy - cy.floor(),
            tw: log_ratio(w, shape.width)?,
            th: log_ratio(h, shape.height)?,
        })
    }

    /// Decode raw centre offsets into normalized image coordinates.
    ///
    /// `x = (raw_x + col) / width` and `y = (raw_y + row) / height`.
    pub fn decode_center(&self, raw: ArrayView5<'_, f32>) -> Result<(Array4<f32>, Array4<f32>)> {
        let (batch, height, width, num_anchors) = leading_dim(&raw)?;
        let dim = (batch, height, width, num_anchors);

        let x = Array4::from_shape_fn(dim, |(b, row, col, a)| {
            (raw[[b, row, col, a, 0]] + col as f32) / width as f32
        });
        let y = Array4::from_shape_fn(dim, |(b, row, col, a)| {
            (raw[[b, row, col, a, 1]] + row as f32) / height as f32
        });

        Ok((x, y))
    }

    /// Decode raw log-scale sizes into normalized widths and heights.
    ///
    /// `w = exp(raw_w) * anchor_w / width` and `h = exp(raw_h) * anchor_h / height`.
    pub fn decode_size(&self, raw: ArrayView5<'_, f32>) -> Result<(Array4<f32>, Array4<f32>)> {
        let (batch, height, width, num_anchors) = leading_dim(&raw)?;
        if num_anchors != self.anchors.len() {
            return Err(Error::shape_mismatch(
                format!("{} anchors", self.anchors.len()),
                format!("{num_anchors} anchors"),
            ));
        }
        let dim = (batch, height, width, num_anchors);

        let w = Array4::from_shape_fn(dim, |(b, row, col, a)| {
            raw[[b, row, col, a, 0]].exp() * self.anchors[a].width / width as f32
        });
        let h = Array4::from_shape_fn(dim, |(b, row, col, a)| {
            raw[[b, row, col, a, 1]].exp() * self.anchors[a].height / height as f32
        });

        Ok((w, h))
    }
}

fn leading_dim(raw: &ArrayView5<'_, f32>) -> Result<(usize, usize, usize, usize)> {
    let (batch, height, width, num_anchors, coords) = raw.dim();
    if coords != 2 {
        return Err(Error::shape_mismatch(
            "trailing dimension of 2",
            format!("trailing dimension of {coords}"),
        ));
    }

    Ok((batch, height, width, num_anchors))
}

fn log_ratio(size: f32, anchor_size: f32) -> Result<f32> {
    let ratio = size / anchor_size;
    if !(ratio.is_finite() && ratio > 0.0) {
        return Err(Error::NumericDomain { ratio });
    }

    Ok(ratio.ln())
}
