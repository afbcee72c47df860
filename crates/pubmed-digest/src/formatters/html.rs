//! HTML digest composition.

use chrono::NaiveDate;
use tracing::warn;

use crate::models::Paper;

/// A composed digest ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    /// Subject line, including the run date and paper count.
    pub subject: String,

    /// Full HTML body.
    pub html: String,

    /// Papers rendered across all keyword sections.
    pub paper_count: usize,
}

/// Builds one recipient's digest, one keyword section at a time.
#[derive(Debug, Clone)]
pub struct DigestComposer {
    date: String,
    html: String,
    paper_count: usize,
}

impl DigestComposer {
    /// Start a digest for the run date.
    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        let date = date.format("%Y-%m-%d").to_string();
        let html = format!("<h2>PubMed literature update - {date}</h2><hr>");
        Self {
            date,
            html,
            paper_count: 0,
        }
    }

    /// Append a section for `keyword`.
    ///
    /// Entries whose paper is not renderable are skipped with a log line. A
    /// keyword with no renderable entries gets no section.
    pub fn add_section(&mut self, keyword: &str, entries: &[(Paper, String)]) {
        let renderable: Vec<&(Paper, String)> = entries
            .iter()
            .filter(|(paper, _)| {
                let ok = paper.is_renderable();
                if !ok {
                    warn!(url = %paper.url, "Skipping paper with malformed title or abstract");
                }
                ok
            })
            .collect();

        if renderable.is_empty() {
            return;
        }

        self.html.push_str(&format!(
            r#"
<h2 style="color:#1a73e8; margin-top:30px; margin-bottom:10px; font-family:Arial, sans-serif;">
    Keyword: {keyword}
</h2>
<hr style="border:0; border-top:2px solid #1a73e8; margin-bottom:20px;">
"#,
            keyword = escape_html(keyword),
        ));

        self.paper_count += renderable.len();
        for (index, (paper, summary)) in renderable.into_iter().enumerate() {
            self.html.push_str(&format_entry(index + 1, paper, summary));
        }
    }

    /// Papers rendered so far.
    #[must_use]
    pub const fn paper_count(&self) -> usize {
        self.paper_count
    }

    /// Finish the digest and compute its subject line.
    #[must_use]
    pub fn finish(self) -> Digest {
        Digest {
            subject: format!("PubMed daily digest: {} papers ({})", self.paper_count, self.date),
            html: self.html,
            paper_count: self.paper_count,
        }
    }
}

/// Format one paper entry.
fn format_entry(index: usize, paper: &Paper, summary: &str) -> String {
    let url = escape_html(&paper.url);
    let doi_line = paper
        .doi()
        .map(|doi| {
            let doi = escape_html(doi);
            format!(
                r#"
    <p><b>DOI:</b> <a href="https://doi.org/{doi}" target="_blank">{doi}</a></p>"#
            )
        })
        .unwrap_or_default();

    format!(
        r#"
<div style="margin-bottom: 20px;">
    <h3 style="color: #2c3e50;">{index}. {title}</h3>
    <p><b>Journal:</b> {journal}</p>
    <p><b>Link:</b> <a href="{url}" target="_blank">{url}</a></p>{doi_line}
    <div style="background-color: #f8f9fa; padding: 15px; border-left: 4px solid #007bff; border-radius: 4px;">
        <b>AI summary:</b><br>
        <pre style="white-space: pre-wrap; font-family: Arial, sans-serif; color: #333;">{summary}</pre>
    </div>
</div>
<hr style="border: 0; border-top: 1px solid #eee;">
"#,
        title = escape_html(&paper.title),
        journal = escape_html(&paper.journal),
        summary = escape_html(summary),
    )
}

/// Escape text for inclusion in HTML content or a quoted attribute.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
