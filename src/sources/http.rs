//! Remote opinion pages.
//!
//! Builds a URL from a template and the identifier, then issues a single
//! GET. Non-2xx responses are failures; there is no retry.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use super::OpinionSource;
use crate::types::{ExtractError, Identifier, RawDocument};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq)]
enum UrlTemplate {
    /// Contains `{id}`.
    ById(String),
    /// Contains `{slug}`.
    BySlug(String),
}

pub struct HttpSource {
    http: Client,
    template: UrlTemplate,
    name: &'static str,
}

impl HttpSource {
    /// Source for numeric ids, e.g. `https://scholar.google.com/scholar_case?case={id}`.
    pub fn by_id(template: impl Into<String>, timeout_secs: Option<u64>) -> Result<Self> {
        Self::build(UrlTemplate::ById(template.into()), "scholar", timeout_secs)
    }

    /// Source for slugs, e.g. `https://casetext.com/{slug}/html`.
    pub fn by_slug(template: impl Into<String>, timeout_secs: Option<u64>) -> Result<Self> {
        Self::build(UrlTemplate::BySlug(template.into()), "casetext", timeout_secs)
    }

    fn build(template: UrlTemplate, name: &'static str, timeout_secs: Option<u64>) -> Result<Self> {
        let (raw, placeholder) = match &template {
            UrlTemplate::ById(t) => (t, "{id}"),
            UrlTemplate::BySlug(t) => (t, "{slug}"),
        };
        if !raw.contains(placeholder) {
            return Err(ExtractError::Config(format!(
                "{name} URL template '{raw}' has no {placeholder} placeholder"
            ))
            .into());
        }

        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().context("Failed to build opinion HTTP client")?;
        Ok(Self { http, template, name })
    }

    /// Interpolate the identifier into the template. Slugs are
    /// percent-encoded so they stay a single path segment.
    pub fn url_for(&self, identifier: &Identifier) -> Result<String, ExtractError> {
        match (&self.template, identifier) {
            (UrlTemplate::ById(t), Identifier::Id(id)) => Ok(t.replace("{id}", &id.to_string())),
            (UrlTemplate::BySlug(t), Identifier::Slug(slug)) => {
                Ok(t.replace("{slug}", &urlencoding::encode(slug)))
            }
            (UrlTemplate::ById(_), Identifier::Slug(s)) => Err(ExtractError::Usage(format!(
                "source '{}' needs a numeric id, got slug '{s}'",
                self.name
            ))),
            (UrlTemplate::BySlug(_), Identifier::Id(id)) => Err(ExtractError::Usage(format!(
                "source '{}' needs a slug, got id {id}",
                self.name
            ))),
        }
    }
}

#[async_trait]
impl OpinionSource for HttpSource {
    async fn fetch(&self, identifier: &Identifier) -> Result<RawDocument> {
        let url = self.url_for(identifier)?;
        info!(source = self.name, url = %url, "Fetching opinion");

        let response = self.http.get(&url).send().await.map_err(|e| ExtractError::Fetch {
            url: url.clone(),
            status: None,
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::Fetch {
                url,
                status: Some(status.as_u16()),
                message: status.canonical_reason().unwrap_or("request failed").to_string(),
            }
            .into());
        }

        let html = response.text().await.map_err(|e| ExtractError::Fetch {
            url: url.clone(),
            status: Some(status.as_u16()),
            message: format!("failed to read body: {e}"),
        })?;

        debug!(url = %url, bytes = html.len(), "Opinion fetched");
        Ok(RawDocument { origin: url, html })
    }

    fn name(&self) -> &str {
        self.name
    }
}
