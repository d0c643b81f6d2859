//! Core extraction engine: response classification and the
//! fetch→extract→prompt→model→persist pipeline.

pub mod classifier;
pub mod pipeline;

pub use pipeline::{render, Pipeline};
