//! The extraction pipeline.
//!
//! fetch → extract → prompt → model → classify → persist, each stage
//! awaited before the next. Any failure ends the run before later stages
//! execute; in particular the model is never called when the fetch fails.

use anyhow::Result;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use super::classifier::{classify, Verdict};
use crate::extract::extract_text;
use crate::llm::prompt::{build_prompt, system_instructions, PromptPolicy};
use crate::llm::CompletionModel;
use crate::sources::OpinionSource;
use crate::storage::{self, EmptyPolicy};
use crate::types::{Identifier, Outcome};

pub struct Pipeline<S, M> {
    source: S,
    model: M,
    results_path: PathBuf,
    prompt_policy: PromptPolicy,
    on_empty: EmptyPolicy,
}

impl<S: OpinionSource, M: CompletionModel> Pipeline<S, M> {
    pub fn new(source: S, model: M, results_path: impl Into<PathBuf>) -> Self {
        Self {
            source,
            model,
            results_path: results_path.into(),
            prompt_policy: PromptPolicy::default(),
            on_empty: EmptyPolicy::default(),
        }
    }

    pub fn with_prompt_policy(mut self, policy: PromptPolicy) -> Self {
        self.prompt_policy = policy;
        self
    }

    pub fn with_empty_policy(mut self, policy: EmptyPolicy) -> Self {
        self.on_empty = policy;
        self
    }

    /// Run the whole pipeline once for `identifier`.
    pub async fn run(&self, identifier: &Identifier) -> Result<Outcome> {
        info!(source = self.source.name(), identifier = %identifier, "Fetching legal decision text");
        let document = self.source.fetch(identifier).await?;

        let opinion = extract_text(&document.html);
        info!(origin = %document.origin, chars = opinion.chars().count(), "Opinion text extracted");
        if opinion.is_empty() {
            warn!(origin = %document.origin, "Document contained no visible text");
        }
        drop(document);

        let opinion = self.prompt_policy.apply(&opinion)?;
        let prompt = build_prompt(opinion);

        info!(model = self.model.model_name(), "Analyzing legal decision for negative treatment");
        let response = self.model.complete(&system_instructions(), &prompt).await?;

        match classify(&response)? {
            Verdict::Empty => {
                storage::clear_results(&self.results_path, self.on_empty)?;
                info!("No negatively-treated cases found");
                Ok(Outcome::Empty)
            }
            Verdict::Found(records) => {
                storage::save_results(&response, &self.results_path)?;
                for record in &records {
                    debug!(%record, "Negative treatment");
                }
                info!(
                    count = records.len(),
                    path = %self.results_path.display(),
                    "Negatively-treated cases saved"
                );
                Ok(Outcome::Found {
                    path: self.results_path.clone(),
                    records,
                    raw: response,
                })
            }
        }
    }
}

/// Console summary of an outcome.
pub fn render(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Empty => "NO NEGATIVELY-TREATED CASES FOUND!".to_string(),
        Outcome::Found { path, raw, .. } => format!(
            "\nFOUND NEGATIVELY-TREATED CASE(S) (see '{}'):\n{raw}",
            path.display()
        ),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
