//! Local fixture files.
//!
//! A slug names `<fixture_dir>/<slug>.<extension>`. Matching is done over
//! the directory's entries by exact, case-sensitive comparison of the file
//! stem, so a slug can never name anything outside the directory.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::ffi::OsStr;
use std::path::PathBuf;
use tracing::{debug, info};

use super::OpinionSource;
use crate::types::{ExtractError, Identifier, RawDocument};

pub struct FixtureSource {
    dir: PathBuf,
    extension: String,
}

impl FixtureSource {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into().trim_start_matches('.').to_string(),
        }
    }

    /// Path of the fixture whose name (sans extension) equals `slug`.
    pub fn locate(&self, slug: &str) -> Result<PathBuf> {
        if !self.dir.is_dir() {
            return Err(ExtractError::FixtureDirMissing(self.dir.clone()).into());
        }

        let entries = std::fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to list fixture directory {}", self.dir.display()))?;

        for entry in entries {
            let path = entry
                .with_context(|| format!("Failed to read entry in {}", self.dir.display()))?
                .path();
            if path.extension() == Some(OsStr::new(&self.extension))
                && path.file_stem() == Some(OsStr::new(slug))
                && path.is_file()
            {
                debug!(slug, path = %path.display(), "Fixture located");
                return Ok(path);
            }
        }

        Err(ExtractError::NotFound {
            slug: slug.to_string(),
            dir: self.dir.clone(),
        }
        .into())
    }
}

#[async_trait]
impl OpinionSource for FixtureSource {
    async fn fetch(&self, identifier: &Identifier) -> Result<RawDocument> {
        let slug = match identifier {
            Identifier::Slug(s) => s,
            Identifier::Id(id) => {
                return Err(ExtractError::Usage(format!(
                    "fixture source needs a slug, got id {id}"
                ))
                .into())
            }
        };

        let path = self.locate(slug)?;
        info!(slug = %slug, path = %path.display(), "Reading fixture");

        let bytes = tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read fixture {}", path.display()))?;

        Ok(RawDocument {
            origin: path.display().to_string(),
            html: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }

    fn name(&self) -> &str {
        "fixture"
    }
}
