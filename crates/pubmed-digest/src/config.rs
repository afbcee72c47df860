//! Configuration for the PubMed digest run.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// API configuration constants.
pub mod api {
    use std::time::Duration;

    /// E-utilities search endpoint.
    pub const ESEARCH_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/esearch.fcgi";

    /// E-utilities detail fetch endpoint.
    pub const EFETCH_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/efetch.fcgi";

    /// Public article page prefix; a PMID is appended to form the link.
    pub const ARTICLE_BASE_URL: &str = "https://pubmed.ncbi.nlm.nih.gov";

    /// Database queried by both stages.
    pub const DATABASE: &str = "pubmed";

    /// Recency window in days.
    pub const RECENCY_DAYS: u32 = 1;

    /// Date field the recency window applies to (publication date).
    pub const DATE_TYPE: &str = "pdat";

    /// Default chat completion base URL.
    pub const LLM_BASE_URL: &str = "https://api.deepseek.com";

    /// Default completion model.
    pub const LLM_MODEL: &str = "deepseek-chat";

    /// Sampling temperature for summaries.
    pub const LLM_TEMPERATURE: f32 = 0.2;

    /// Default SMTP server (implicit TLS).
    pub const SMTP_SERVER: &str = "smtp.qq.com";

    /// Default SMTP port (implicit TLS).
    pub const SMTP_PORT: u16 = 465;

    /// Request timeout for E-utilities calls.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    /// Request timeout for a single completion (long abstracts take a while).
    pub const LLM_TIMEOUT: Duration = Duration::from_secs(120);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Registry file read when no path is given.
    pub const REGISTRY_PATH: &str = "info.txt";
}

/// E-utilities settings.
#[derive(Debug, Clone)]
pub struct PubMedConfig {
    /// Search endpoint.
    pub esearch_url: String,

    /// Fetch endpoint.
    pub efetch_url: String,

    /// Prefix for public article links.
    pub article_base_url: String,

    /// Database name.
    pub database: String,

    /// Recency window in days.
    pub recency_days: u32,

    /// Date field for the recency window.
    pub date_type: String,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Skip certificate validation for E-utilities calls.
    pub accept_invalid_certs: bool,
}

impl Default for PubMedConfig {
    fn default() -> Self {
        Self {
            esearch_url: api::ESEARCH_URL.to_string(),
            efetch_url: api::EFETCH_URL.to_string(),
            article_base_url: api::ARTICLE_BASE_URL.to_string(),
            database: api::DATABASE.to_string(),
            recency_days: api::RECENCY_DAYS,
            date_type: api::DATE_TYPE.to_string(),
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            accept_invalid_certs: true,
        }
    }
}

/// Chat completion settings.
#[derive(Clone)]
pub struct LlmConfig {
    /// Bearer key (required).
    pub api_key: Option<String>,

    /// Base URL; `/chat/completions` is appended.
    pub base_url: String,

    /// Model name.
    pub model: String,

    /// Sampling temperature.
    pub temperature: f32,

    /// Request timeout.
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: api::LLM_BASE_URL.to_string(),
            model: api::LLM_MODEL.to_string(),
            temperature: api::LLM_TEMPERATURE,
            timeout: api::LLM_TIMEOUT,
        }
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("has_api_key", &self.api_key.is_some())
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

/// Outgoing mail settings.
#[derive(Clone)]
pub struct SmtpConfig {
    /// SMTP server host.
    pub server: String,

    /// SMTP port (implicit TLS).
    pub port: u16,

    /// Sender address, also the login name.
    pub sender_email: Option<String>,

    /// Sender password or authorization code.
    pub sender_password: Option<String>,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            server: api::SMTP_SERVER.to_string(),
            port: api::SMTP_PORT,
            sender_email: None,
            sender_password: None,
        }
    }
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("sender_email", &self.sender_email)
            .finish()
    }
}

/// Run configuration, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// E-utilities settings.
    pub pubmed: PubMedConfig,

    /// Summarizer settings.
    pub llm: LlmConfig,

    /// Mail settings.
    pub smtp: SmtpConfig,

    /// Recipient registry path.
    pub registry_path: PathBuf,
}

impl Config {
    /// Create a configuration with the summarizer key set and defaults elsewhere.
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            llm: LlmConfig {
                api_key,
                ..LlmConfig::default()
            },
            registry_path: PathBuf::from(api::REGISTRY_PATH),
            ..Self::default()
        }
    }

    /// Create a test configuration pointing every endpoint at a mock server.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            pubmed: PubMedConfig {
                esearch_url: format!("{base_url}/entrez/eutils/esearch.fcgi"),
                efetch_url: format!("{base_url}/entrez/eutils/efetch.fcgi"),
                request_timeout: Duration::from_secs(5),
                connect_timeout: Duration::from_secs(2),
                accept_invalid_certs: false,
                ..PubMedConfig::default()
            },
            llm: LlmConfig {
                api_key: Some("test-key".to_string()),
                base_url: base_url.to_string(),
                timeout: Duration::from_secs(5),
                ..LlmConfig::default()
            },
            smtp: SmtpConfig::default(),
            registry_path: PathBuf::from(api::REGISTRY_PATH),
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Reads `OPENAI_API_KEY`, `OPENAI_BASE_URL`, `SENDER_EMAIL` and `SENDER_PASSWORD`.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::new(non_empty_var("OPENAI_API_KEY"));
        if let Some(base_url) = non_empty_var("OPENAI_BASE_URL") {
            config.llm.base_url = base_url;
        }
        config.smtp.sender_email = non_empty_var("SENDER_EMAIL");
        config.smtp.sender_password = non_empty_var("SENDER_PASSWORD");
        config
    }

    /// Check that the summarizer key is present and every endpoint parses.
    ///
    /// Runs before any network activity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.api_key.as_deref().is_none_or(|k| k.trim().is_empty()) {
            return Err(ConfigError::Missing("OPENAI_API_KEY"));
        }

        for (name, value) in [
            ("esearch_url", &self.pubmed.esearch_url),
            ("efetch_url", &self.pubmed.efetch_url),
            ("article_base_url", &self.pubmed.article_base_url),
            ("llm_base_url", &self.llm.base_url),
        ] {
            url::Url::parse(value).map_err(|source| ConfigError::InvalidUrl { name, source })?;
        }

        Ok(())
    }

    /// Additionally require sender credentials, for runs that really deliver mail.
    pub fn validate_for_delivery(&self) -> Result<(), ConfigError> {
        self.validate()?;
        if self.smtp.sender_email.is_none() {
            return Err(ConfigError::Missing("SENDER_EMAIL"));
        }
        if self.smtp.sender_password.is_none() {
            return Err(ConfigError::Missing("SENDER_PASSWORD"));
        }
        Ok(())
    }

    /// Check if a summarizer key is configured.
    #[must_use]
    pub const fn has_api_key(&self) -> bool {
        self.llm.api_key.is_some()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
