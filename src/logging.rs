use anyhow::{Context, Result, anyhow};
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

/// Filter used when `RUST_LOG` is unset or invalid.
const DEFAULT_FILTER: &str = "info";

/// Installs the global subscriber, writing to `path`.
///
/// Without a path nothing is installed: the chart owns the terminal, so
/// diagnostics can only go to a file.
pub fn init(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };

    let file = open_log_file(path)?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| anyhow!(e))
        .context("failed to install log subscriber")?;

    tracing::info!(
        "termchart v{} logging to {}",
        env!("CARGO_PKG_VERSION"),
        path.display()
    );
    Ok(())
}

/// Opens the log for appending, creating it owner-only.
fn open_log_file(path: &Path) -> Result<File> {
    let mut opts = OpenOptions::new();
    opts.create(true).append(true);
    #[cfg(unix)]
    opts.mode(0o600);

    opts.open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}
