//! P3 Analysis command line entry point.

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use p3_analysis::cli::{self, Cli};
use p3_analysis::telemetry;

fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    telemetry::init_logging(cli.verbose)?;
    debug!(?cli, "Parsed arguments");

    cli::run(cli)
}
