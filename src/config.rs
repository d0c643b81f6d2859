//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `negtreat.toml` (optional: every field has a default) and
//! deserializes into strongly-typed structs. Secrets are referenced by
//! env-var name in the config and resolved once at startup into
//! [`Credentials`], which is handed to the model client explicitly.

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::llm::prompt::{OversizePolicy, PromptPolicy};
use crate::storage::EmptyPolicy;
use crate::types::ExtractError;

/// Default config file, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "negtreat.toml";

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub llm: LlmConfig,
    pub prompt: PromptConfig,
    pub output: OutputConfig,
}

/// Where opinion HTML comes from.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Remote page addressed by numeric case id.
    #[default]
    Scholar,
    /// Remote page addressed by slug.
    Casetext,
    /// Local fixture file addressed by slug.
    Fixture,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    /// URL template for id lookups; `{id}` is replaced.
    pub id_url_template: String,
    /// URL template for slug lookups; `{slug}` is replaced.
    pub slug_url_template: String,
    pub fixture_dir: PathBuf,
    /// Extension (without the dot) fixture files must carry.
    pub fixture_extension: String,
    /// Unset means the HTTP client's defaults apply.
    pub request_timeout_secs: Option<u64>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            id_url_template: "https://scholar.google.com/scholar_case?case={id}".into(),
            slug_url_template: "https://casetext.com/{slug}/html".into(),
            fixture_dir: PathBuf::from("test_data"),
            fixture_extension: "html".into(),
            request_timeout_secs: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    /// Env var that overrides `model` when set.
    pub model_env: String,
    pub api_key_env: String,
    pub temperature: f32,
    pub top_p: f32,
    pub request_timeout_secs: Option<u64>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".into(),
            model: "gpt-3.5-turbo".into(),
            model_env: "CHAT_GPT_MODEL".into(),
            api_key_env: "OPENAI_API_KEY".into(),
            temperature: 0.1,
            top_p: 1.0,
            request_timeout_secs: None,
        }
    }
}

impl LlmConfig {
    /// The model id to use: the `model_env` variable if set, else `model`.
    pub fn resolve_model(&self) -> String {
        self.resolve_model_with(|name| std::env::var(name).ok())
    }

    pub fn resolve_model_with(&self, lookup: impl Fn(&str) -> Option<String>) -> String {
        match lookup(&self.model_env) {
            Some(m) if !m.trim().is_empty() => m.trim().to_string(),
            _ => self.model.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PromptConfig {
    /// Zero disables the limit.
    pub max_opinion_chars: usize,
    pub oversize: OversizePolicy,
}

impl Default for PromptConfig {
    fn default() -> Self {
        let policy = PromptPolicy::default();
        Self {
            max_opinion_chars: policy.max_opinion_chars.unwrap_or(0),
            oversize: policy.oversize,
        }
    }
}

impl PromptConfig {
    pub fn policy(&self) -> PromptPolicy {
        PromptPolicy {
            max_opinion_chars: (self.max_opinion_chars > 0).then_some(self.max_opinion_chars),
            oversize: self.oversize,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub results_path: PathBuf,
    pub on_empty: EmptyPolicy,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_path: PathBuf::from("results.json"),
            on_empty: EmptyPolicy::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file. A missing file yields defaults;
    /// an unreadable or malformed one is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "No config file found, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: AppConfig = toml::from_str(&contents)
            .map_err(|e| ExtractError::Config(format!("{}: {e}", path.display())))?;
        debug!(path = %path.display(), "Config loaded");
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Secrets resolved once at startup.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_key: SecretString,
}

impl Credentials {
    /// Read the API key from the configured env var, prompting on stdin
    /// when it is missing or blank.
    pub fn resolve(cfg: &LlmConfig) -> Result<Self> {
        let env_name = cfg.api_key_env.clone();
        Self::resolve_with(std::env::var(&env_name).ok(), || {
            prompt_for_key(&env_name, &mut std::io::stdin().lock(), &mut std::io::stderr())
        })
    }

    pub fn resolve_with(
        env_value: Option<String>,
        prompt: impl FnOnce() -> Result<String>,
    ) -> Result<Self> {
        let key = match env_value {
            Some(v) if !v.trim().is_empty() => v.trim().to_string(),
            _ => prompt()?,
        };
        if key.is_empty() {
            return Err(ExtractError::Config("no API key provided".into()).into());
        }
        Ok(Self {
            api_key: SecretString::new(key),
        })
    }
}

/// Ask for the key interactively. Reads a single line.
fn prompt_for_key(env_name: &str, input: &mut impl BufRead, out: &mut impl Write) -> Result<String> {
    write!(out, "{env_name} is not set. Please enter your OpenAI API key: ")?;
    out.flush()?;
    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("Failed to read API key from stdin")?;
    Ok(line.trim().to_string())
}
