//! PubMed E-utilities client.
//!
//! Provides the two remote stages of ingestion:
//! - `search`: esearch for identifiers published within the recency window
//! - `fetch`: efetch for the full records of those identifiers
//!
//! Both stages are single-attempt and degrade to an empty result on failure.

pub mod xml;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::PubMedConfig;
use crate::error::{ClientError, ClientResult};
use crate::normalize::{lookup, structured_items, text_items};

/// PubMed E-utilities client.
#[derive(Clone)]
pub struct PubMedClient {
    /// HTTP client.
    client: Client,

    /// Endpoint and query settings.
    config: PubMedConfig,
}

impl PubMedClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: PubMedConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .gzip(true)
            .build()?;

        Ok(Self { client, config })
    }

    /// Prefix for public article links.
    #[must_use]
    pub fn article_base_url(&self) -> &str {
        &self.config.article_base_url
    }

    /// Search for identifiers matching `keyword` within the recency window.
    ///
    /// Returns at most `result_count_bound` identifiers in response order.
    /// Transport and parse failures are logged and yield an empty list.
    #[instrument(skip(self))]
    pub async fn search(&self, keyword: &str, result_count_bound: u32) -> Vec<String> {
        match self.try_search(keyword, result_count_bound).await {
            Ok(ids) => {
                debug!(count = ids.len(), "esearch returned identifiers");
                ids
            }
            Err(error) => {
                warn!(%error, "esearch failed, treating as no results");
                Vec::new()
            }
        }
    }

    /// Fetch full records for `identifiers` in one batched request.
    ///
    /// Returns one raw `PubmedArticle` tree per record. An empty identifier
    /// list makes no request. Failures are logged and yield an empty list.
    #[instrument(skip(self, identifiers), fields(count = identifiers.len()))]
    pub async fn fetch(&self, identifiers: &[String]) -> Vec<Value> {
        if identifiers.is_empty() {
            return Vec::new();
        }

        match self.try_fetch(identifiers).await {
            Ok(articles) => {
                debug!(articles = articles.len(), "efetch returned articles");
                articles
            }
            Err(error) => {
                warn!(%error, "efetch failed, dropping batch");
                Vec::new()
            }
        }
    }

    async fn try_search(
        &self,
        keyword: &str,
        result_count_bound: u32,
    ) -> ClientResult<Vec<String>> {
        let params = [
            ("db", self.config.database.clone()),
            ("term", keyword.to_string()),
            ("reldate", self.config.recency_days.to_string()),
            ("datetype", self.config.date_type.clone()),
            ("retmax", result_count_bound.to_string()),
            ("retmode", "xml".to_string()),
        ];

        let tree = self.get_xml(&self.config.esearch_url, &params).await?;
        Ok(text_items(lookup(&tree, &["eSearchResult", "IdList", "Id"])))
    }

    async fn try_fetch(&self, identifiers: &[String]) -> ClientResult<Vec<Value>> {
        let params = [
            ("db", self.config.database.clone()),
            ("id", identifiers.join(",")),
            ("retmode", "xml".to_string()),
        ];

        let tree = self.get_xml(&self.config.efetch_url, &params).await?;
        Ok(structured_items(lookup(&tree, &["PubmedArticleSet", "PubmedArticle"])))
    }

    /// Make a GET request and parse the body as an XML value tree.
    async fn get_xml(&self, url: &str, params: &[(&str, String)]) -> ClientResult<Value> {
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ClientError::status(status.as_u16(), text));
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;
        Ok(xml::parse(&body)?)
    }

    fn classify(&self, error: reqwest::Error) -> ClientError {
        if error.is_timeout() {
            ClientError::Timeout(self.config.request_timeout)
        } else {
            ClientError::Http(error)
        }
    }
}

impl std::fmt::Debug for PubMedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PubMedClient")
            .field("esearch_url", &self.config.esearch_url)
            .field("efetch_url", &self.config.efetch_url)
            .finish()
    }
}
