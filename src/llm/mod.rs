//! LLM integration for negative-treatment extraction.
//!
//! Defines the `CompletionModel` trait, the role-tagged message type sent
//! to it, and the OpenAI implementation.

pub mod openai;
pub mod prompt;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// A single role-tagged message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionMessage {
    pub role: Role,
    pub content: String,
}

impl InstructionMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Abstraction over text-completion endpoints.
///
/// One call per run: the implementor sends the instructions followed by
/// the prompt and returns the model's plain-text output untouched.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionModel: Send + Sync {
    async fn complete(&self, instructions: &[InstructionMessage], prompt: &str) -> Result<String>;

    /// Model identifier string.
    fn model_name(&self) -> &str;
}
