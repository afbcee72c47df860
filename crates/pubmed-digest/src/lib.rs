//! PubMed Digest
//!
//! Daily literature monitoring: for every registered recipient and keyword,
//! search PubMed for records published in the last day, normalize the
//! E-utilities XML into [`models::Paper`] records, summarize each paper with a
//! chat completion model, and mail one HTML digest per recipient.
//!
//! # Features
//!
//! - **Shape-tolerant ingestion**: fields that arrive as a scalar, a mapping or
//!   a list are normalized in one place ([`normalize`])
//! - **Fault isolation**: one malformed article never loses its batch, one
//!   failed keyword never loses a digest, one failed delivery never stops the run
//! - **Explicit configuration**: validated before any network activity
//!
//! # Example
//!
//! ```no_run
//! use pubmed_digest::{client::PubMedClient, config::Config, pipeline::IngestionPipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     config.validate()?;
//!
//!     let pipeline = IngestionPipeline::new(PubMedClient::new(config.pubmed)?);
//!     for paper in pipeline.run("sepsis", 10).await {
//!         println!("{} {}", paper.title, paper.url);
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod formatters;
pub mod mailer;
pub mod models;
pub mod normalize;
pub mod parser;
pub mod pipeline;
pub mod registry;
pub mod runner;
pub mod summarizer;

pub use client::PubMedClient;
pub use config::Config;
pub use error::{ClientError, ParseError};
pub use pipeline::IngestionPipeline;
pub use runner::{DigestRunner, RunReport};
