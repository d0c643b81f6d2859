//! OpenAI Responses API integration.
//!
//! Implements `CompletionModel` with a single `POST /responses` call.
//! No retries: any transport or API failure is reported as
//! `ExtractError::Model` and ends the run.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::{CompletionModel, InstructionMessage};
use crate::config::LlmConfig;
use crate::types::ExtractError;

// ---------------------------------------------------------------------------
// API types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: Vec<InstructionMessage>,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Deserialize)]
struct ResponsesBody {
    #[serde(default)]
    output: Vec<OutputItem>,
    #[serde(default)]
    error: Option<ApiError>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

impl ResponsesBody {
    /// Concatenate every `output_text` part of every `message` item.
    fn output_text(&self) -> String {
        self.output
            .iter()
            .filter(|item| item.kind == "message")
            .flat_map(|item| item.content.iter())
            .filter(|part| part.kind == "output_text")
            .filter_map(|part| part.text.as_deref())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct OpenAiClient {
    http: Client,
    api_key: SecretString,
    endpoint: String,
    model: String,
    temperature: f32,
    top_p: f32,
}

impl OpenAiClient {
    pub fn new(api_key: SecretString, model: String, cfg: &LlmConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = cfg.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().context("Failed to build OpenAI HTTP client")?;

        Ok(Self {
            http,
            api_key,
            endpoint: format!("{}/responses", cfg.base_url.trim_end_matches('/')),
            model,
            temperature: cfg.temperature,
            top_p: cfg.top_p,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn model_error(&self, message: impl Into<String>) -> anyhow::Error {
        ExtractError::Model {
            model: self.model.clone(),
            message: message.into(),
        }
        .into()
    }
}

#[async_trait]
impl CompletionModel for OpenAiClient {
    async fn complete(&self, instructions: &[InstructionMessage], prompt: &str) -> Result<String> {
        let mut input = instructions.to_vec();
        input.push(InstructionMessage::user(prompt));

        let request = ResponsesRequest {
            model: &self.model,
            input,
            temperature: self.temperature,
            top_p: self.top_p,
        };

        debug!(model = %self.model, prompt_chars = prompt.len(), "Sending OpenAI request");

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| self.model_error(format!("request failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.model_error(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|env| env.error.message)
                .unwrap_or(text);
            return Err(self.model_error(format!("HTTP {status}: {detail}")));
        }

        let body: ResponsesBody = serde_json::from_str(&text)
            .map_err(|e| self.model_error(format!("unparsable response: {e}")))?;

        if let Some(err) = body.error.as_ref() {
            return Err(self.model_error(err.message.clone()));
        }

        let output = body.output_text();
        if output.is_empty() {
            return Err(self.model_error("response contained no output text"));
        }

        if let Some(usage) = &body.usage {
            info!(
                model = %self.model,
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "OpenAI response received"
            );
        }

        Ok(output)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
