use std::path::PathBuf;

use clap::{Args, Parser};
use odal::Config;
use yolo_targets::TargetConfig;

use crate::error::Result;

pub mod assign;
pub mod config;

/// `forseti` - inspect the training targets of a detector
///
/// `forseti` matches the labelled boxes of an image against the anchor grid of the detector,
/// exactly like training does, and reports which anchor each box was assigned to.
///
/// # Assigning labels
/// ```sh
/// forseti assign --config-dir config --grid 13x13 --labels labels.json
/// ```
/// The labels file holds a JSON list of `[xmin, ymin, xmax, ymax, class]` rows, normalized
/// to the image size.
///
/// # Inspecting the config
/// ```sh
/// forseti config --config-dir config --overlay config/overlay/strict
/// ```
#[derive(Parser)]
#[clap(name = "forseti", version)]
pub struct Cli {
    #[clap(subcommand)]
    pub action: Commands,
}

/// All possible commands for the cli, used for clap derive macros.
#[derive(Parser)]
pub enum Commands {
    Assign(assign::Assign),
    Config(config::ShowConfig),
}

/// Location of the target config.
#[derive(Args, Clone, Debug)]
pub struct ConfigArgs {
    /// Directory containing `targets.toml`
    #[clap(long, default_value = "config")]
    pub config_dir: PathBuf,

    /// Directory with a partial `targets.toml` applied on top of the main one
    #[clap(long)]
    pub overlay: Option<PathBuf>,
}

impl ConfigArgs {
    pub fn load(&self) -> Result<TargetConfig> {
        let config = match &self.overlay {
            Some(overlay) => TargetConfig::load_with_overlay(&self.config_dir, overlay)?,
            None => TargetConfig::load(&self.config_dir)?,
        };

        tracing::debug!(
            config_dir = %self.config_dir.display(),
            overlay = ?self.overlay,
            "loaded target config"
        );

        Ok(config)
    }
}
