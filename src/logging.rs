//! env_logger setup shared by the console and the server.

use std::fs::OpenOptions;
use std::path::Path;

use anyhow::{Context, Result};
use log::LevelFilter;

/// Install the global logger.
///
/// With `file`, records are appended there. Without one, `to_stderr` decides
/// whether to log at all; the TUI passes `false` so stderr does not draw over
/// the screen.
pub fn init(level: &str, file: Option<&Path>, to_stderr: bool) -> Result<()> {
    let level_filter = level.parse().unwrap_or(LevelFilter::Info);
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level_filter);

    match file {
        Some(path) => {
            let f = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            builder.target(env_logger::Target::Pipe(Box::new(f)));
            builder.write_style(env_logger::WriteStyle::Never);
        }
        None if !to_stderr => {
            builder.filter_level(LevelFilter::Off);
        }
        None => {}
    }

    builder.try_init().context("logger already initialised")?;
    Ok(())
}
