//! negtreat: finds negatively-treated cited cases in a legal opinion.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod sources;
pub mod extract;
pub mod llm;
pub mod engine;
pub mod storage;
