//! Result persistence.
//!
//! Writes the model's validated response to the results file, overwriting
//! whatever an earlier run left there. Content is written byte-for-byte as
//! received; it is never re-serialized.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// What an Empty outcome does to the results file.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmptyPolicy {
    /// Leave the file system untouched.
    #[default]
    Skip,
    /// Truncate an existing results file to zero bytes.
    Truncate,
}

/// Overwrite `path` with `content`.
pub fn save_results(content: &str, path: &Path) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write results to {}", path.display()))?;
    debug!(path = %path.display(), bytes = content.len(), "Results saved");
    Ok(())
}

/// Apply `policy` for a run that found nothing.
pub fn clear_results(path: &Path, policy: EmptyPolicy) -> Result<()> {
    match policy {
        EmptyPolicy::Skip => Ok(()),
        EmptyPolicy::Truncate => {
            if path.exists() {
                std::fs::write(path, "")
                    .with_context(|| format!("Failed to truncate {}", path.display()))?;
                info!(path = %path.display(), "Stale results truncated");
            }
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
