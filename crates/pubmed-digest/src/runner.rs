//! One digest run over every registered recipient.
//!
//! Recipients, keywords and papers are processed strictly in order. A failure
//! for one recipient is logged and never affects the next one.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{Instrument, error, info, info_span, warn};

use crate::formatters::{Digest, DigestComposer};
use crate::mailer::Mailer;
use crate::models::Recipient;
use crate::pipeline::IngestionPipeline;
use crate::registry::Registry;
use crate::summarizer::Summarizer;

/// Outcome counts for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Recipients processed.
    pub recipients: usize,

    /// Digests handed to the mailer successfully.
    pub delivered: usize,

    /// Digests whose delivery failed.
    pub failed: usize,

    /// Papers rendered across all digests.
    pub papers: usize,
}

/// Drives ingestion, summarization, composition and delivery.
pub struct DigestRunner {
    pipeline: IngestionPipeline,
    summarizer: Arc<dyn Summarizer>,
    mailer: Arc<dyn Mailer>,
    date: NaiveDate,
}

impl DigestRunner {
    /// Create a runner for the given run date.
    #[must_use]
    pub fn new(
        pipeline: IngestionPipeline,
        summarizer: Arc<dyn Summarizer>,
        mailer: Arc<dyn Mailer>,
        date: NaiveDate,
    ) -> Self {
        Self {
            pipeline,
            summarizer,
            mailer,
            date,
        }
    }

    /// Build one recipient's digest.
    ///
    /// Keywords without papers contribute no section. Papers the composer
    /// would reject are not summarized.
    pub async fn compose(&self, recipient: &Recipient) -> Digest {
        let mut composer = DigestComposer::new(self.date);

        for (keyword, bound) in &recipient.queries {
            let papers = self.pipeline.run(keyword, *bound).await;
            if papers.is_empty() {
                info!(keyword = %keyword, "No papers for keyword");
                continue;
            }

            let mut entries = Vec::with_capacity(papers.len());
            for (index, paper) in papers.into_iter().enumerate() {
                if !paper.is_renderable() {
                    warn!(url = %paper.url, "Skipping paper with malformed title or abstract");
                    continue;
                }
                info!(
                    keyword = %keyword,
                    index = index + 1,
                    pmid = %paper.pmid,
                    "Summarizing paper"
                );
                let summary = self.summarizer.summarize(keyword, &paper).await;
                entries.push((paper, summary));
            }

            composer.add_section(keyword, &entries);
        }

        composer.finish()
    }

    /// Compose and deliver a digest for every recipient in the registry.
    pub async fn run(&self, registry: &Registry) -> RunReport {
        let mut report = RunReport::default();

        for recipient in registry.recipients() {
            let span = info_span!("recipient", name = %recipient.name);
            async {
                let digest = self.compose(&recipient).await;
                report.recipients += 1;
                report.papers += digest.paper_count;

                match self.mailer.send(&recipient.email, &digest).await {
                    Ok(()) => {
                        info!(to = %recipient.email, papers = digest.paper_count, "Digest sent");
                        report.delivered += 1;
                    }
                    Err(e) => {
                        error!(to = %recipient.email, error = %e, "Digest delivery failed");
                        report.failed += 1;
                    }
                }
            }
            .instrument(span)
            .await;
        }

        report
    }
}

impl std::fmt::Debug for DigestRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DigestRunner")
            .field("pipeline", &self.pipeline)
            .field("date", &self.date)
            .finish()
    }
}
