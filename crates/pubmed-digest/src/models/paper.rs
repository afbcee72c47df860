//! Canonical paper record.

/// Abstract text used when a record carries no abstract segment.
pub const NO_ABSTRACT: &str = "No Abstract Available.";

/// A PubMed record normalized for the digest.
///
/// Constructed only by [`crate::parser::parse_article`], fully populated with
/// best-effort defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paper {
    /// PubMed identifier.
    pub pmid: String,

    /// Article title (empty when the record has none).
    pub title: String,

    /// Journal title (empty when the record has none).
    pub journal: String,

    /// Abstract segments joined with a space, or [`NO_ABSTRACT`].
    pub r#abstract: String,

    /// Public article page, `<base>/<pmid>/`.
    pub url: String,

    /// DOI, empty when the record lists none.
    pub doi: String,
}

impl Paper {
    /// Build the public article link for an identifier.
    #[must_use]
    pub fn article_url(base_url: &str, pmid: &str) -> String {
        format!("{}/{}/", base_url.trim_end_matches('/'), pmid)
    }

    /// Whether the record carries a real abstract rather than the sentinel.
    #[must_use]
    pub fn has_abstract(&self) -> bool {
        self.r#abstract != NO_ABSTRACT
    }

    /// Get the DOI if available.
    #[must_use]
    pub fn doi(&self) -> Option<&str> {
        (!self.doi.is_empty()).then_some(self.doi.as_str())
    }

    /// Whether title and abstract are usable text for a digest entry.
    #[must_use]
    pub fn is_renderable(&self) -> bool {
        !self.title.trim().is_empty() && !self.r#abstract.trim().is_empty()
    }
}
