use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::Parser;
use itertools::Itertools;
use serde::Serialize;
use yolo_targets::{
    AnchorShape, GroundTruth, Outcome, Positive, PredictionShape, Slot, TargetAssigner,
};

use crate::cli::ConfigArgs;
use crate::error::{Error, Result};
use crate::labels::{read_labels, Grid};

/// Assign the labels of a single image to the anchor grid
#[derive(Parser)]
pub struct Assign {
    #[clap(flatten)]
    pub config: ConfigArgs,

    /// Size of the prediction grid, as `<height>x<width>`
    #[clap(long, default_value = "13x13")]
    pub grid: Grid,

    /// JSON file with `[xmin, ymin, xmax, ymax, class]` rows
    #[clap(long)]
    pub labels: PathBuf,

    /// Write the positive slots as JSON to this file
    #[clap(long)]
    pub output: Option<PathBuf>,
}

#[derive(Serialize)]
struct Summary<'a> {
    grid: [usize; 2],
    threshold: f32,
    anchors: &'a [AnchorShape],
    num_ground_truths: usize,
    positives: Vec<Positive>,
}

impl Assign {
    pub fn assign(self) -> Result<()> {
        let config = self.config.load()?;
        let assigner = TargetAssigner::from_config(&config)?;
        let ground_truths = read_labels(&self.labels, config.num_classes)?;
        let Grid { height, width } = self.grid;

        let anchors = config
            .anchors
            .iter()
            .map(|a| format!("{}x{}", a.width, a.height))
            .join(", ");
        tracing::info!(
            height,
            width,
            threshold = config.threshold,
            anchors,
            "assigning {} ground truths",
            ground_truths.len()
        );

        let shape = PredictionShape::new(height, width, config.anchors.len());
        let assignment = assigner.assign(shape, &ground_truths)?;

        for (index, (gt, outcome)) in ground_truths.iter().zip(&assignment.outcomes).enumerate() {
            println!("{}", describe(index, gt, outcome, assigner.threshold()));
        }

        let positives = assignment.bundle.positives();
        println!(
            "{} of {} ground truths own a slot",
            positives.len(),
            ground_truths.len()
        );

        if let Some(path) = self.output {
            let summary = Summary {
                grid: [height, width],
                threshold: config.threshold,
                anchors: &config.anchors,
                num_ground_truths: ground_truths.len(),
                positives,
            };

            let file = File::create(&path).map_err(|source| Error::Io {
                path: path.clone(),
                source,
            })?;
            serde_json::to_writer_pretty(BufWriter::new(file), &summary).map_err(Error::Summary)?;

            tracing::info!(path = %path.display(), "wrote summary");
        }

        Ok(())
    }
}

fn slot_name(slot: &Slot) -> String {
    format!("row {}, col {}, anchor {}", slot.row, slot.col, slot.anchor)
}

/// One line report of what happened to a ground truth.
fn describe(index: usize, gt: &GroundTruth, outcome: &Outcome, threshold: f32) -> String {
    let label = format!("#{index} (class {})", gt.class_id);

    match outcome {
        Outcome::Assigned {
            slot,
            iou,
            replaced,
        } => {
            let replaced = if *replaced {
                ", replacing an earlier box"
            } else {
                ""
            };
            format!("{label}: {} with iou {iou:.3}{replaced}", slot_name(slot))
        }
        Outcome::Contested {
            slot,
            iou,
            owner_iou,
        } => format!(
            "{label}: lost {} (iou {iou:.3}) to an earlier box with iou {owner_iou:.3}",
            slot_name(slot)
        ),
        Outcome::BelowThreshold { slot, iou } => format!(
            "{label}: dropped, best match {} has iou {iou:.3} <= {threshold}",
            slot_name(slot)
        ),
        Outcome::Skipped(error) => format!("{label}: skipped, {error}"),
    }
}
