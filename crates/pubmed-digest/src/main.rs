//! PubMed Digest - Entry Point
//!
//! Runs once: builds every recipient's digest and delivers it, then exits.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use pubmed_digest::config::{Config, api};
use pubmed_digest::mailer::{DryRunMailer, Mailer, SmtpMailer};
use pubmed_digest::registry::Registry;
use pubmed_digest::summarizer::ChatSummarizer;
use pubmed_digest::{DigestRunner, IngestionPipeline, PubMedClient};

#[derive(Parser, Debug)]
#[command(name = "pubmed-digest")]
#[command(about = "Daily PubMed keyword digests with AI summaries, delivered by email")]
#[command(version)]
struct Cli {
    /// Tab-separated recipient registry (name, keywords, counts, email)
    #[arg(long, default_value = api::REGISTRY_PATH, env = "DIGEST_REGISTRY")]
    registry: PathBuf,

    /// Chat completion API key (required)
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Chat completion base URL
    #[arg(long, default_value = api::LLM_BASE_URL, env = "OPENAI_BASE_URL")]
    llm_base_url: String,

    /// Chat completion model
    #[arg(long, default_value = api::LLM_MODEL, env = "OPENAI_MODEL")]
    model: String,

    /// Sender address, also the SMTP login
    #[arg(long, env = "SENDER_EMAIL")]
    sender_email: Option<String>,

    /// Sender password or authorization code
    #[arg(long, env = "SENDER_PASSWORD", hide_env_values = true)]
    sender_password: Option<String>,

    /// SMTP server (implicit TLS)
    #[arg(long, default_value = api::SMTP_SERVER, env = "SMTP_SERVER")]
    smtp_server: String,

    /// SMTP port
    #[arg(long, default_value_t = api::SMTP_PORT, env = "SMTP_PORT")]
    smtp_port: u16,

    /// Print digests to stdout instead of sending them
    #[arg(long)]
    dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

impl Cli {
    fn into_config(self) -> Config {
        let mut config = Config::new(self.api_key);
        config.llm.base_url = self.llm_base_url;
        config.llm.model = self.model;
        config.smtp.server = self.smtp_server;
        config.smtp.port = self.smtp_port;
        config.smtp.sender_email = self.sender_email;
        config.smtp.sender_password = self.sender_password;
        config.registry_path = self.registry;
        config
    }
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so that --dry-run output on stdout stays clean.
    if json {
        subscriber
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.json_logs);

    let dry_run = cli.dry_run;
    let config = cli.into_config();

    if dry_run {
        config.validate()?;
    } else {
        config.validate_for_delivery()?;
    }

    let registry = Registry::load(&config.registry_path)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        recipients = registry.recipients().len(),
        rows = registry.rows().len(),
        dry_run,
        "Starting daily PubMed digest run"
    );

    let pipeline = IngestionPipeline::new(PubMedClient::new(config.pubmed.clone())?);
    let summarizer = Arc::new(ChatSummarizer::new(&config.llm)?);
    let mailer: Arc<dyn Mailer> = if dry_run {
        Arc::new(DryRunMailer)
    } else {
        Arc::new(SmtpMailer::new(config.smtp.clone()))
    };

    let today = chrono::Local::now().date_naive();
    let runner = DigestRunner::new(pipeline, summarizer, mailer, today);
    let report = runner.run(&registry).await;

    tracing::info!(
        recipients = report.recipients,
        delivered = report.delivered,
        failed = report.failed,
        papers = report.papers,
        "Run complete"
    );

    Ok(())
}
