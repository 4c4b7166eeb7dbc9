//! JSON output for a finished analysis run.
//!
//! The document is pretty-printed with two-space indentation and keeps
//! non-ASCII text as-is. Each run fully replaces the previous file.

use crate::error::PersistError;
use crate::models::AnalysisRun;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Write `run` to `path`, creating the parent directory when needed.
///
/// # Arguments
///
/// * `run` - The finished run: metadata plus every analyzed article
/// * `path` - Target file; any existing content is replaced
///
/// # Returns
///
/// `Ok(())` on success, or a [`PersistError`] if serialization, directory
/// creation or the write fails.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_analysis(run: &AnalysisRun, path: &Path) -> Result<(), PersistError> {
    let json = serde_json::to_string_pretty(run)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| PersistError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    fs::write(path, json)
        .await
        .map_err(|source| PersistError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    info!(articles = run.articles.len(), "Analysis results saved");
    Ok(())
}
