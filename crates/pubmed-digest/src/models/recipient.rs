//! Registry rows and the recipients grouped from them.

/// One registry row: a keyword subscription for one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientQuery {
    /// Recipient display name, the grouping key.
    pub recipient_name: String,

    /// Delivery address.
    pub recipient_email: String,

    /// Search term.
    pub keyword: String,

    /// Maximum number of identifiers to request.
    pub result_count_bound: u32,
}

/// A recipient with every keyword registered for it, in registry order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    /// Display name.
    pub name: String,

    /// Delivery address (taken from the recipient's first row).
    pub email: String,

    /// `(keyword, result_count_bound)` pairs.
    pub queries: Vec<(String, u32)>,
}

impl Recipient {
    /// Keywords in registry order.
    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.queries.iter().map(|(k, _)| k.as_str())
    }
}
