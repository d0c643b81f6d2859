//! negtreat: negative-treatment extractor CLI.
//!
//! Entry point. Parses arguments, loads configuration and credentials,
//! initialises structured logging, then runs the extraction pipeline once
//! with the selected opinion source.

use anyhow::Result;
use clap::{CommandFactory, Parser};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

use negtreat::config::{self, AppConfig, Credentials, SourceKind};
use negtreat::engine::{render, Pipeline};
use negtreat::llm::openai::OpenAiClient;
use negtreat::sources::fixture::FixtureSource;
use negtreat::sources::http::HttpSource;
use negtreat::sources::OpinionSource;
use negtreat::types::{ExtractError, Identifier, Outcome};

/// Find cited cases that a legal opinion treats negatively.
#[derive(Parser, Debug)]
#[command(name = "negtreat", version, about)]
struct Cli {
    /// Numeric case id (scholar source) or slug (casetext, fixture sources)
    identifier: String,

    /// Where to load the opinion from [default: from config, else scholar]
    #[arg(short, long, value_enum)]
    source: Option<SourceKind>,

    /// Config file
    #[arg(short, long, default_value = config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Results file [default: results.json]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Fixture directory for the fixture source [default: test_data]
    #[arg(long)]
    fixture_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => e.exit(),
            _ => {
                let _ = e.print();
                return ExitCode::from(1);
            }
        },
    };

    init_logging();
    info!(version = env!("CARGO_PKG_VERSION"), "negtreat starting");

    match run(cli).await {
        Ok(outcome) => {
            println!("{}", render(&outcome));
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %format!("{e:#}"), "Run failed");
            if let Some(ExtractError::Usage(_)) = e.downcast_ref::<ExtractError>() {
                eprintln!("Error: {e:#}\n\n{}", Cli::command().render_usage());
            } else {
                eprintln!("Error: {e:#}");
            }
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> Result<Outcome> {
    let mut cfg = AppConfig::load(&cli.config)?;
    if let Some(kind) = cli.source {
        cfg.source.kind = kind;
    }
    if let Some(path) = cli.output {
        cfg.output.results_path = path;
    }
    if let Some(dir) = cli.fixture_dir {
        cfg.source.fixture_dir = dir;
    }

    let identifier = match cfg.source.kind {
        SourceKind::Scholar => Identifier::parse_id(&cli.identifier)?,
        SourceKind::Casetext | SourceKind::Fixture => Identifier::parse_slug(&cli.identifier)?,
    };

    let credentials = Credentials::resolve(&cfg.llm)?;
    let model = OpenAiClient::new(credentials.api_key, cfg.llm.resolve_model(), &cfg.llm)?;

    let timeout = cfg.source.request_timeout_secs;
    match cfg.source.kind {
        SourceKind::Scholar => {
            let source = HttpSource::by_id(cfg.source.id_url_template.clone(), timeout)?;
            execute(source, model, &cfg, &identifier).await
        }
        SourceKind::Casetext => {
            let source = HttpSource::by_slug(cfg.source.slug_url_template.clone(), timeout)?;
            execute(source, model, &cfg, &identifier).await
        }
        SourceKind::Fixture => {
            let source = FixtureSource::new(
                cfg.source.fixture_dir.clone(),
                cfg.source.fixture_extension.clone(),
            );
            execute(source, model, &cfg, &identifier).await
        }
    }
}

async fn execute<S: OpinionSource>(
    source: S,
    model: OpenAiClient,
    cfg: &AppConfig,
    identifier: &Identifier,
) -> Result<Outcome> {
    Pipeline::new(source, model, cfg.output.results_path.clone())
        .with_prompt_policy(cfg.prompt.policy())
        .with_empty_policy(cfg.output.on_empty)
        .run(identifier)
        .await
}

/// Initialise the `tracing` subscriber. Logs go to stderr; stdout is
/// reserved for the result summary.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("negtreat=info"));

    let json_logging = std::env::var("NEGTREAT_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}
