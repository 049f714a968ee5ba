use clap::Parser;
use yolo_targets::TargetConfig;

use crate::cli::ConfigArgs;
use crate::error::{Error, Result};

/// Print the effective target config, after applying the overlay
#[derive(Parser)]
pub struct ShowConfig {
    #[clap(flatten)]
    pub config: ConfigArgs,
}

impl ShowConfig {
    pub fn show(self) -> Result<()> {
        let config = self.config.load()?;
        print!("{}", render(&config)?);

        Ok(())
    }
}

fn render(config: &TargetConfig) -> Result<String> {
    toml::to_string_pretty(config).map_err(Error::Serialize)
}
