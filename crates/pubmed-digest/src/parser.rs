//! Mapping raw `PubmedArticle` trees onto [`Paper`] records.
//!
//! Each article is parsed on its own. A malformed article is logged and
//! dropped; the rest of its batch is unaffected.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ParseError, ParseResult};
use crate::models::{NO_ABSTRACT, Paper};
use crate::normalize::{lookup, structured_items, text_items, text_of};

/// Identifier type that marks a DOI entry in `ArticleIdList`.
const DOI_ID_TYPE: &str = "doi";

/// Parse one `PubmedArticle` into a [`Paper`].
///
/// `MedlineCitation`, its `Article`, and a non-empty `PMID` are required.
/// Title, journal, abstract and DOI fall back to defaults.
pub fn parse_article(raw: &Value, article_base_url: &str) -> ParseResult<Paper> {
    let citation = raw
        .get("MedlineCitation")
        .ok_or(ParseError::MissingField("MedlineCitation"))?;
    if !citation.is_object() {
        return Err(ParseError::shape("MedlineCitation", "a mapping"));
    }

    let article = citation
        .get("Article")
        .ok_or(ParseError::MissingField("MedlineCitation.Article"))?;
    if !article.is_object() {
        return Err(ParseError::shape("MedlineCitation.Article", "a mapping"));
    }

    let pmid = citation
        .get("PMID")
        .and_then(text_of)
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .ok_or(ParseError::MissingField("MedlineCitation.PMID"))?;

    let title = article.get("ArticleTitle").and_then(text_of).unwrap_or_default();

    let journal = lookup(article, &["Journal", "Title"]).and_then(text_of).unwrap_or_default();

    let segments = text_items(lookup(article, &["Abstract", "AbstractText"]));
    let r#abstract = if segments.is_empty() {
        NO_ABSTRACT.to_string()
    } else {
        segments.join(" ")
    };

    let doi = extract_doi(raw);

    Ok(Paper {
        url: Paper::article_url(article_base_url, &pmid),
        pmid,
        title: title.trim().to_string(),
        journal: journal.trim().to_string(),
        r#abstract,
        doi,
    })
}

/// First `ArticleId` whose `@IdType` is `doi`; empty when there is none.
///
/// A missing `PubmedData` or `ArticleIdList` means "no DOI", not a failure.
fn extract_doi(raw: &Value) -> String {
    let ids = structured_items(lookup(raw, &["PubmedData", "ArticleIdList", "ArticleId"]));

    ids.iter()
        .find(|id| id.get("@IdType").and_then(Value::as_str) == Some(DOI_ID_TYPE))
        .and_then(text_of)
        .map(|d| d.trim().to_string())
        .unwrap_or_default()
}

/// Parse every article in a batch, keeping the ones that succeed.
///
/// Failures are logged with their position in the batch and skipped.
#[must_use]
pub fn parse_batch(raw: &[Value], article_base_url: &str) -> Vec<Paper> {
    let results: Vec<(usize, ParseResult<Paper>)> = raw
        .iter()
        .enumerate()
        .map(|(index, article)| (index, parse_article(article, article_base_url)))
        .collect();

    let papers: Vec<Paper> = results
        .into_iter()
        .filter_map(|(index, result)| match result {
            Ok(paper) => Some(paper),
            Err(error) => {
                warn!(index, %error, "Skipping article that failed to parse");
                None
            }
        })
        .collect();

    debug!(parsed = papers.len(), total = raw.len(), "Parsed article batch");
    papers
}
