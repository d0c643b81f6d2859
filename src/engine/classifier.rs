//! Model response classification.
//!
//! Two independent checks: the literal empty sentinel first, then a parse
//! of the text as an array of `NegativeTreatment` records. Only text that
//! passes the second check is ever written to disk.

use crate::llm::prompt::EMPTY_SENTINEL;
use crate::types::{ExtractError, NegativeTreatment};

/// Longest response excerpt quoted in an error message.
const EXCERPT_CHARS: usize = 120;

#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Empty,
    Found(Vec<NegativeTreatment>),
}

/// True when the response is exactly the empty sentinel, ignoring
/// surrounding whitespace.
pub fn is_sentinel(text: &str) -> bool {
    text.trim() == EMPTY_SENTINEL
}

pub fn classify(text: &str) -> Result<Verdict, ExtractError> {
    if is_sentinel(text) {
        return Ok(Verdict::Empty);
    }

    let records: Vec<NegativeTreatment> = serde_json::from_str(text).map_err(|e| {
        ExtractError::InvalidResponse(format!("{e} (response began: {:?})", excerpt(text)))
    })?;

    if records.is_empty() {
        Ok(Verdict::Empty)
    } else {
        Ok(Verdict::Found(records))
    }
}

fn excerpt(text: &str) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(EXCERPT_CHARS) {
        Some((idx, _)) => format!("{}…", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
