//! Test doubles shared by the integration tests.
//!
//! `StubModel` is a deterministic `CompletionModel` that replays scripted
//! responses and records every prompt it receives. `spawn_server` serves an
//! axum router on an ephemeral local port.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::Router;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use negtreat::llm::{CompletionModel, InstructionMessage};

pub const ROE: &str = r#"[{"caseName":"Roe v. Wade","jurisdiction":"US","citation":"410 U.S. 113","nature":"overruled","quotedText":"...","explanation":"..."}]"#;

pub const OPINION_HTML: &str = "<html><head><title>Dobbs v. Jackson</title>\
    <script>trackPageView()</script></head>\
    <body><h1>Dobbs v. Jackson Women's Health Organization</h1>\
    <p>We hold that <i>Roe</i> and <i>Casey</i> must be overruled.</p></body></html>";

/// A scripted model. Clones share state, so a test can keep a handle
/// while the pipeline owns another.
#[derive(Clone, Default)]
pub struct StubModel {
    responses: Arc<Mutex<VecDeque<String>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl StubModel {
    pub fn new(responses: &[&str]) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.iter().map(|r| r.to_string()).collect())),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of completion calls made so far.
    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionModel for StubModel {
    async fn complete(&self, instructions: &[InstructionMessage], prompt: &str) -> Result<String> {
        assert!(!instructions.is_empty(), "pipeline sent no instructions");
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow!("no scripted response left"))
    }

    fn model_name(&self) -> &str {
        "stub"
    }
}

/// Serve `app` on 127.0.0.1 and return its base URL.
pub async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

pub fn temp_path(prefix: &str, ext: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!("{prefix}_{}{ext}", uuid::Uuid::new_v4()));
    p
}
