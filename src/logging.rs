use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_ENV: &str = "JOBVIEW_LOG";
pub const FALLBACK_LOG_FILE: &str = "jobview.log";

pub fn log_path() -> PathBuf {
    if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "jobview") {
        proj_dirs.data_dir().join("jobview.log")
    } else {
        PathBuf::from(FALLBACK_LOG_FILE)
    }
}

fn open_log(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))
}

/// Opens `primary`, or `fallback` when that fails. The primary error is
/// returned alongside so it can be logged once the subscriber is up.
fn open_with_fallback(
    primary: PathBuf,
    fallback: PathBuf,
) -> Result<(File, PathBuf, Option<anyhow::Error>)> {
    match open_log(&primary) {
        Ok(file) => Ok((file, primary, None)),
        Err(e) => {
            let file = open_log(&fallback)?;
            Ok((file, fallback, Some(e)))
        }
    }
}

/// Logs go to a file; the terminal belongs to the interactive view.
pub fn init() -> Result<PathBuf> {
    let (file, path, primary_error) =
        open_with_fallback(log_path(), PathBuf::from(FALLBACK_LOG_FILE))?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(file).with_ansi(false))
        .with(filter)
        .try_init()
        .context("Failed to install log subscriber")?;

    if let Some(e) = primary_error {
        tracing::warn!(error = %format!("{:#}", e), path = %path.display(), "Using fallback log file");
    }

    Ok(path)
}
