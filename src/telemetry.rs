//! Logging setup
//!
//! Structured logs go to stderr so that reports written to stdout stay
//! machine-readable. `RUST_LOG` wins over the verbosity flag.

use anyhow::{anyhow, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

pub const DEFAULT_FILTER: &str = "p3_analysis=info";
pub const VERBOSE_FILTER: &str = "p3_analysis=debug";

pub fn filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER })
    })
}

pub fn init_logging(verbose: bool) -> Result<()> {
    Registry::default()
        .with(filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(|e| anyhow!("failed to install tracing subscriber: {}", e))
}
