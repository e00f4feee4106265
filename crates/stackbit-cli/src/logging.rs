use std::io;

use anyhow::Context as _;
use tracing::Level;
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*};

/// Installs the global subscriber: plain fmt output on stderr, so stdout
/// carries only the game output.
pub(crate) fn init(level: Level) -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(LevelFilter::from_level(level))
        .try_init()
        .context("Failed to initialize logging")?;
    tracing::debug!(%level, "logging initialized");
    Ok(())
}
