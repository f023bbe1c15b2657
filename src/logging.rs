//! Tracing setup. The terminal belongs to the UI, so events go to a file.

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{AppError, Result};

/// Build the filter: `RUST_LOG` when set, otherwise `fallback`.
pub fn env_filter(fallback: &str) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .map_err(|e| AppError::Logging(format!("invalid filter {fallback:?}: {e}")))
}

/// Install a global subscriber appending plain-text events to `path`.
pub fn init_tracing(path: &Path, filter: &str) -> Result<()> {
    let file = File::options().create(true).append(true).open(path)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(env_filter(filter)?)
        .try_init()
        .map_err(|e| AppError::Logging(e.to_string()))?;

    tracing::info!(log = %path.display(), "tracing initialised");
    Ok(())
}
