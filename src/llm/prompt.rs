//! Prompt templates for negative-treatment extraction.
//!
//! The instruction wording is fixed. The only variable part is the opinion
//! text, which is subject to a [`PromptPolicy`] before it is embedded.

use serde::Deserialize;
use tracing::warn;

use super::InstructionMessage;
use crate::types::ExtractError;

/// Literal reply the model is told to give when nothing is found.
pub const EMPTY_SENTINEL: &str = "[]";

/// Default opinion length cap, sized for the default model's context window
/// (roughly 4 characters per token, leaving room for instructions and reply).
pub const DEFAULT_MAX_OPINION_CHARS: usize = 56_000;

const TASK_INSTRUCTIONS: &str = "You are an expert legal analyst. \
A case is treated negatively if the opinion expresses disapproval or disagreement with the case, or ignores it as precedent. \
Below is the text of a legal opinion that references other cases. \
DO NOT CONSIDER THE OPINION ITSELF AS A REFERENCED CASE AND DO NOT RETURN IT IN THE RESULTS. \
Identify any of the referenced cases that are treated negatively in the opinion. \
For each of such cases, determine the nature of the treatment, quote the text of the negative treatment, \
and give an explanation of why the treatment was determined to be negative. \
If there are cases that are treated negatively, return a JSON encoded list where each negatively-treated case \
is a JSON object with the following keys: ['caseName', 'jurisdiction', 'citation', 'nature', 'quotedText', 'explanation']. \
If there are no cases treated negatively, respond EXACTLY with '[]'.";

/// What to do with an opinion longer than the configured limit.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OversizePolicy {
    /// Fail before any model call.
    #[default]
    Reject,
    /// Keep the leading `max_opinion_chars` characters.
    Truncate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptPolicy {
    /// `None` means unlimited.
    pub max_opinion_chars: Option<usize>,
    pub oversize: OversizePolicy,
}

impl Default for PromptPolicy {
    fn default() -> Self {
        Self {
            max_opinion_chars: Some(DEFAULT_MAX_OPINION_CHARS),
            oversize: OversizePolicy::Reject,
        }
    }
}

impl PromptPolicy {
    /// Apply the size limit to `opinion_text`, returning the text to embed.
    pub fn apply<'a>(&self, opinion_text: &'a str) -> Result<&'a str, ExtractError> {
        let Some(limit) = self.max_opinion_chars else {
            return Ok(opinion_text);
        };

        // Byte offset of the first char past the limit, if there is one.
        let cut = match opinion_text.char_indices().nth(limit) {
            Some((idx, _)) => idx,
            None => return Ok(opinion_text),
        };

        match self.oversize {
            OversizePolicy::Reject => Err(ExtractError::PromptTooLarge {
                chars: opinion_text.chars().count(),
                limit,
            }),
            OversizePolicy::Truncate => {
                warn!(limit, "Opinion text over limit, truncating");
                Ok(&opinion_text[..cut])
            }
        }
    }
}

/// Fixed role-tagged instructions sent ahead of the prompt.
pub fn system_instructions() -> Vec<InstructionMessage> {
    [
        "You are a helpful lawyer.",
        "Your response will consist ONLY of a list.",
        "You will NOT wrap the response with JSON md markers.",
        "The response JSON will have NO top-level keys.",
    ]
    .into_iter()
    .map(InstructionMessage::system)
    .collect()
}

/// Embed the opinion text in the task instructions.
pub fn build_prompt(opinion_text: &str) -> String {
    let mut prompt = String::with_capacity(TASK_INSTRUCTIONS.len() + opinion_text.len() + 32);
    prompt.push_str(TASK_INSTRUCTIONS);
    prompt.push('\n');
    prompt.push_str("Legal Opinion Text:\n");
    prompt.push_str(opinion_text);
    prompt.push('\n');
    prompt
}
