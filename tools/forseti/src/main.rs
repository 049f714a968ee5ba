use clap::Parser;
use forseti::cli::{Cli, Commands};
use miette::Result;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    miette::set_panic_hook();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();

    match args.action {
        Commands::Assign(opts) => opts.assign()?,
        Commands::Config(opts) => opts.show()?,
    }

    Ok(())
}
