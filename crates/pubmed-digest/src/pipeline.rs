//! Keyword ingestion: search, fetch, parse.

use tracing::{info, instrument};

use crate::client::PubMedClient;
use crate::models::Paper;
use crate::parser;

/// Composes the search and fetch stages with the article parser.
#[derive(Debug, Clone)]
pub struct IngestionPipeline {
    client: PubMedClient,
}

impl IngestionPipeline {
    /// Create a pipeline over an E-utilities client.
    #[must_use]
    pub fn new(client: PubMedClient) -> Self {
        Self { client }
    }

    /// Papers published within the recency window for `keyword`.
    ///
    /// Fetch and parse only run when the search returned identifiers. Every
    /// failure along the way shows up as fewer (or zero) papers, never as an
    /// error.
    #[instrument(skip(self))]
    pub async fn run(&self, keyword: &str, result_count_bound: u32) -> Vec<Paper> {
        let identifiers = self.client.search(keyword, result_count_bound).await;
        if identifiers.is_empty() {
            info!("No new papers");
            return Vec::new();
        }

        info!(count = identifiers.len(), "Found new papers, fetching details");
        let raw = self.client.fetch(&identifiers).await;
        parser::parse_batch(&raw, self.client.article_base_url())
    }
}
