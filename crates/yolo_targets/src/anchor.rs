use ndarray::{s, Array, Array1, Array4, ArrayView4, Axis};
use serde::{Deserialize, Serialize};

use crate::bbox::{Bbox, Cxcywh};
use crate::error::{Error, Result};

/// Width and height of an anchor, in grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 2]", into = "[f32; 2]")]
pub struct AnchorShape {
    pub width: f32,
    pub height: f32,
}

impl AnchorShape {
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// The five anchors YOLOv2 clustered on Pascal VOC.
    #[must_use]
    pub fn voc() -> Vec<AnchorShape> {
        vec![
            AnchorShape::new(1.3221, 1.731_45),
            AnchorShape::new(3.192_75, 4.009_44),
            AnchorShape::new(5.055_87, 8.098_92),
            AnchorShape::new(9.471_12, 4.840_53),
            AnchorShape::new(11.2364, 10.0071),
        ]
    }

    /// Parse a flat `w0,h0,w1,h1,...` list.
    ///
    /// ```
    /// use yolo_targets::AnchorShape;
    ///
    /// let anchors = AnchorShape::parse_list("1.5, 2.0, 3.0,4.0").unwrap();
    /// assert_eq!(anchors, vec![AnchorShape::new(1.5, 2.0), AnchorShape::new(3.0, 4.0)]);
    /// ```
    pub fn parse_list(list: &str) -> Result<Vec<AnchorShape>> {
        let values = list
            .split(',')
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| {
                value.parse::<f32>().map_err(|_| Error::AnchorParse {
                    reason: format!("`{value}` is not a number"),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        if values.is_empty() || values.len() % 2 != 0 {
            return Err(Error::AnchorParse {
                reason: format!(
                    "expected an even, non-zero amount of values, got {}",
                    values.len()
                ),
            });
        }

        Ok(values
            .chunks_exact(2)
            .map(|pair| AnchorShape::new(pair[0], pair[1]))
            .collect())
    }

    fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

impl From<[f32; 2]> for AnchorShape {
    fn from([width, height]: [f32; 2]) -> Self {
        AnchorShape::new(width, height)
    }
}

impl From<AnchorShape> for [f32; 2] {
    fn from(shape: AnchorShape) -> Self {
        [shape.width, shape.height]
    }
}

/// Check that every anchor has a strictly positive, finite size.
pub fn validate_anchors(anchors: &[AnchorShape]) -> Result<()> {
    match anchors.iter().position(|anchor| !anchor.is_valid()) {
        Some(index) => Err(Error::InvalidAnchor {
            index,
            width: anchors[index].width,
            height: anchors[index].height,
        }),
        None => Ok(()),
    }
}

/// Dense grid of anchors, one for every cell and anchor shape.
///
/// Stored as a `(height, width, num_anchors, 4)` array of `(cx, cy, w, h)` in grid cells,
/// where the centre of cell `(row, col)` is `(col + 0.5, row + 0.5)`.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorGrid {
    boxes: Array4<f32>,
}

impl AnchorGrid {
    /// Build the anchor grid for a `height x width` feature map.
    ///
    /// The grid is a pure function of its inputs.
    #[must_use]
    pub fn new(height: usize, width: usize, anchors: &[AnchorShape]) -> Self {
        let num_anchors = anchors.len();
        let mut boxes = Array4::<f32>::zeros((height, width, num_anchors, 4));

        let shifts_x = Array::range(0.0, width as f32, 1.0) + 0.5;
        let shifts_y = Array::range(0.0, height as f32, 1.0) + 0.5;

        let anchor_w: Array1<f32> = anchors.iter().map(|a| a.width).collect();
        let anchor_h: Array1<f32> = anchors.iter().map(|a| a.height).collect();

        // (width, 1) broadcasts over rows and anchors, (height, 1, 1) over columns and anchors
        boxes
            .slice_mut(s![.., .., .., 0])
            .assign(&shifts_x.insert_axis(Axis(1)));
        boxes
            .slice_mut(s![.., .., .., 1])
            .assign(&shifts_y.insert_axis(Axis(1)).insert_axis(Axis(2)));
        boxes.slice_mut(s![.., .., .., 2]).assign(&anchor_w);
        boxes.slice_mut(s![.., .., .., 3]).assign(&anchor_h);

        tracing::trace!(height, width, num_anchors, "built anchor grid");

        AnchorGrid { boxes }
    }

    /// `(height, width, num_anchors)` of the grid.
    #[must_use]
    pub fn dim(&self) -> (usize, usize, usize) {
        let (height, width, num_anchors, _) = self.boxes.dim();
        (height, width, num_anchors)
    }

    /// The anchor at the given cell, in centre form.
    #[must_use]
    pub fn anchor(&self, row: usize, col: usize, anchor: usize) -> Bbox<Cxcywh> {
        let b = self.boxes.slice(s![row, col, anchor, ..]);
        Bbox::cxcywh(b[0], b[1], b[2], b[3])
    }

    #[must_use]
    pub fn view(&self) -> ArrayView4<'_, f32> {
        self.boxes.view()
    }
}
