use std::fs;
use std::path::Path;
use std::str::FromStr;

use yolo_targets::GroundTruth;

use crate::error::{Error, Result};

/// Size of the prediction grid, parsed from `<height>x<width>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    pub height: usize,
    pub width: usize,
}

impl FromStr for Grid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidGrid(s.to_string());

        let (height, width) = s.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
        let height: usize = height.trim().parse().map_err(|_| invalid())?;
        let width: usize = width.trim().parse().map_err(|_| invalid())?;

        if height == 0 || width == 0 {
            return Err(invalid());
        }

        Ok(Grid { height, width })
    }
}

/// Read ground truths from a JSON file of `[xmin, ymin, xmax, ymax, class]` rows.
pub fn read_labels(path: &Path, num_classes: usize) -> Result<Vec<GroundTruth>> {
    let contents = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let rows: Vec<[f32; 5]> = serde_json::from_str(&contents).map_err(|source| Error::Labels {
        path: path.to_path_buf(),
        source,
    })?;

    ground_truths(&rows, num_classes)
}

/// Convert label rows, rejecting classes that are not an integer in `0..num_classes`.
///
/// Box coordinates are passed through as is, invalid boxes are reported by the assigner.
pub fn ground_truths(rows: &[[f32; 5]], num_classes: usize) -> Result<Vec<GroundTruth>> {
    rows.iter()
        .enumerate()
        .map(|(index, &[xmin, ymin, xmax, ymax, class])| {
            let valid = class.fract() == 0.0 && class >= 0.0 && (class as usize) < num_classes;
            if !valid {
                return Err(Error::InvalidClass {
                    index,
                    class,
                    num_classes,
                });
            }

            Ok(GroundTruth::new(xmin, ymin, xmax, ymax, class as u32))
        })
        .collect()
}
