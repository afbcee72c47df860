//! Recipient registry: a tab-separated table of keyword subscriptions.
//!
//! The header row must contain `name`, `keywords` and `counts`; the last
//! column holds the recipient's address whatever its header says. A recipient
//! with several keywords appears on several rows.
//!
//! ```text
//! name	keywords	counts	email
//! Alice	sepsis	5	alice@example.org
//! Alice	~ARDS AND ventilation~	3	alice@example.org
//! ```

use std::io::Read;
use std::path::Path;

use tracing::warn;

use crate::error::RegistryError;
use crate::models::{Recipient, RecipientQuery};

/// Quote character; keywords may contain tabs or quotes of their own.
const QUOTE: u8 = b'~';

/// Loaded registry rows, in file order.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    rows: Vec<RecipientQuery>,
}

impl Registry {
    /// Load the registry from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| RegistryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_reader(file)
    }

    /// Parse a registry from any reader.
    ///
    /// Rows with a blank name, keyword or address, or with a count that is not
    /// a non-negative integer, are skipped with a warning.
    pub fn from_reader(reader: impl Read) -> Result<Self, RegistryError> {
        let mut table = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .quote(QUOTE)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = table.headers()?.clone();
        let column = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or(RegistryError::MissingColumn(name))
        };
        let name_col = column("name")?;
        let keyword_col = column("keywords")?;
        let count_col = column("counts")?;
        let email_col = headers
            .len()
            .checked_sub(1)
            .filter(|col| ![name_col, keyword_col, count_col].contains(col))
            .ok_or(RegistryError::MissingColumn("email"))?;

        let mut rows = Vec::new();
        for (index, record) in table.records().enumerate() {
            let record = record?;
            let line = index + 2;
            let field = |col: usize| record.get(col).unwrap_or_default().to_string();

            let (recipient_name, keyword, recipient_email) =
                (field(name_col), field(keyword_col), field(email_col));
            if recipient_name.is_empty() || keyword.is_empty() || recipient_email.is_empty() {
                warn!(line, "Skipping incomplete registry row");
                continue;
            }

            let Ok(result_count_bound) = field(count_col).parse::<u32>() else {
                warn!(
                    line,
                    count = %field(count_col),
                    "Skipping registry row with invalid count"
                );
                continue;
            };

            rows.push(RecipientQuery {
                recipient_name,
                recipient_email,
                keyword,
                result_count_bound,
            });
        }

        Ok(Self { rows })
    }

    /// Build a registry directly from rows.
    #[must_use]
    pub fn from_rows(rows: Vec<RecipientQuery>) -> Self {
        Self { rows }
    }

    /// All rows, in file order.
    #[must_use]
    pub fn rows(&self) -> &[RecipientQuery] {
        &self.rows
    }

    /// Whether the registry has no usable rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows grouped by recipient name, in order of first appearance.
    ///
    /// A recipient's address comes from its first row.
    #[must_use]
    pub fn recipients(&self) -> Vec<Recipient> {
        let mut recipients: Vec<Recipient> = Vec::new();
        for row in &self.rows {
            let query = (row.keyword.clone(), row.result_count_bound);
            match recipients.iter_mut().find(|r| r.name == row.recipient_name) {
                Some(recipient) => recipient.queries.push(query),
                None => recipients.push(Recipient {
                    name: row.recipient_name.clone(),
                    email: row.recipient_email.clone(),
                    queries: vec![query],
                }),
            }
        }
        recipients
    }
}
