//! Paper summaries from an OpenAI-compatible chat completion endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::LlmConfig;
use crate::error::SummaryError;
use crate::models::Paper;

/// System message for every summary request.
const SYSTEM_PROMPT: &str =
    "You are an expert at writing high-quality summaries of research papers.";

/// Prefix of the inline text that replaces a summary when the request fails.
pub const SUMMARY_FAILED_PREFIX: &str = "AI summary failed";

/// Produces the summary text shown under each paper in a digest.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize `paper` for a reader following `keyword`.
    ///
    /// Never fails: errors are rendered into the returned text.
    async fn summarize(&self, keyword: &str, paper: &Paper) -> String;
}

/// Build the user prompt for one paper.
#[must_use]
pub fn build_prompt(keyword: &str, paper: &Paper) -> String {
    format!(
        "You are a senior scientist working on {keyword}. Based on the title and abstract of the \
PubMed article below, write a summary in a rigorous, objective and concise style.
Title: {title}
Abstract: {abstract_text}

Follow this format strictly:

[Core summary]
- One or two sentences capturing the most important finding or contribution.

[Journal]
- Journal: {journal}
- Give the latest impact factor and ranking of {journal}.

[Key points]
1) Methods
   - What data, experiments, models or analyses were used (do not invent anything the text does not say).

2) Results
   - The most important results and findings (do not invent anything the text does not say).

3) Significance
   - Importance for the field and potential clinical or biological impact (do not invent anything the text does not say).

Base the summary strictly on the abstract. Do not speculate.",
        title = paper.title,
        abstract_text = paper.r#abstract,
        journal = paper.journal,
    )
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat completion summarizer (DeepSeek, OpenAI or any compatible server).
#[derive(Clone)]
pub struct ChatSummarizer {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
}

impl ChatSummarizer {
    /// Create a summarizer from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the key is missing or HTTP client initialization fails.
    pub fn new(config: &LlmConfig) -> anyhow::Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| anyhow::anyhow!("summarizer API key is not configured"))?;

        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    /// Request one completion.
    pub async fn complete(&self, prompt: &str) -> Result<String, SummaryError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SummaryError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let chat: ChatResponse = response.json().await?;
        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(SummaryError::EmptyCompletion)
    }
}

#[async_trait]
impl Summarizer for ChatSummarizer {
    async fn summarize(&self, keyword: &str, paper: &Paper) -> String {
        let prompt = build_prompt(keyword, paper);
        match self.complete(&prompt).await {
            Ok(summary) => {
                debug!(pmid = %paper.pmid, chars = summary.len(), "Summarized paper");
                summary
            }
            Err(error) => {
                warn!(pmid = %paper.pmid, %error, "Summary request failed");
                format!("{SUMMARY_FAILED_PREFIX}: {error}")
            }
        }
    }
}

impl std::fmt::Debug for ChatSummarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSummarizer")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}
