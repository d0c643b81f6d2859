//! Shared types for the negative-treatment extractor.
//!
//! Everything here is transient: values are created for a single run and
//! dropped once the result has been classified and persisted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Identifier
// ---------------------------------------------------------------------------

/// A user-supplied handle for an opinion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    /// Numeric case id, interpolated into a remote URL.
    Id(u64),
    /// Opaque slug naming a remote page or a local fixture file.
    Slug(String),
}

impl Identifier {
    /// Parse a raw CLI argument as a numeric id.
    pub fn parse_id(raw: &str) -> Result<Self, ExtractError> {
        raw.trim()
            .parse::<u64>()
            .map(Identifier::Id)
            .map_err(|_| ExtractError::Usage(format!("'{raw}' is not a numeric case id")))
    }

    /// Wrap a raw CLI argument as a slug. Empty slugs are rejected.
    pub fn parse_slug(raw: &str) -> Result<Self, ExtractError> {
        if raw.trim().is_empty() {
            return Err(ExtractError::Usage("slug must not be empty".into()));
        }
        Ok(Identifier::Slug(raw.to_string()))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Id(id) => write!(f, "{id}"),
            Identifier::Slug(slug) => write!(f, "{slug}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// Raw HTML of an opinion, as fetched or read from disk.
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// URL or file path the HTML came from (for logging).
    pub origin: String,
    pub html: String,
}

// ---------------------------------------------------------------------------
// Model output
// ---------------------------------------------------------------------------

/// One negatively-treated case, as reported by the model.
///
/// Only used to validate the shape of the response; the result file keeps
/// the model's text exactly as received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NegativeTreatment {
    pub case_name: String,
    pub jurisdiction: String,
    pub citation: String,
    pub nature: String,
    pub quoted_text: String,
    pub explanation: String,
}

impl fmt::Display for NegativeTreatment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {}): {}", self.case_name, self.citation, self.jurisdiction, self.nature)
    }
}

/// Terminal state of a pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The model returned the empty sentinel (or an empty array).
    Empty,
    /// The model reported at least one case; `raw` was written to `path`.
    Found {
        path: PathBuf,
        records: Vec<NegativeTreatment>,
        raw: String,
    },
}

impl Outcome {
    pub fn is_empty(&self) -> bool {
        matches!(self, Outcome::Empty)
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific failures. Carried inside `anyhow::Error` and recovered
/// with `downcast_ref` where callers need to branch on them.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Usage error: {0}")]
    Usage(String),

    #[error("Failed to fetch {url}{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Fetch {
        url: String,
        status: Option<u16>,
        message: String,
    },

    #[error("The directory '{}' does not exist or is not a directory", .0.display())]
    FixtureDirMissing(PathBuf),

    #[error("No HTML file matching slug '{slug}' found in '{}'", .dir.display())]
    NotFound { slug: String, dir: PathBuf },

    #[error("Opinion text is {chars} characters, over the {limit}-character limit")]
    PromptTooLarge { chars: usize, limit: usize },

    #[error("Model error ({model}): {message}")]
    Model { model: String, message: String },

    #[error("Invalid model response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
