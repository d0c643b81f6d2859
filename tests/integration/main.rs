//! Integration tests: the pipeline end to end against stub HTTP servers
//! and a scripted model.

mod pipeline;
mod stubs;
