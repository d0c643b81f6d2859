//! Opinion sources.
//!
//! Defines the `OpinionSource` trait and provides implementations for:
//! - remote pages addressed by numeric id or by slug (`HttpSource`)
//! - local fixture files addressed by slug (`FixtureSource`)

pub mod fixture;
pub mod http;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{Identifier, RawDocument};

/// Abstraction over places opinion HTML can be loaded from.
///
/// Implementors either return the complete document or fail; a partial or
/// empty document is never returned silently.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OpinionSource: Send + Sync {
    async fn fetch(&self, identifier: &Identifier) -> Result<RawDocument>;

    /// Source name for logging and identification.
    fn name(&self) -> &str;
}
