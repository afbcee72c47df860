//! Error types for the PubMed digest pipeline.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.
//! None of these escape their originating stage at run time: each stage degrades
//! to an empty result, a skipped item, or placeholder text.

use std::time::Duration;

/// Errors from the E-utilities HTTP client layer.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// HTTP transport error (connection, DNS, TLS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not a usable XML document
    #[error("Failed to parse response: {0}")]
    Xml(#[from] XmlError),

    /// Request timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Non-success HTTP status
    #[error("Unexpected status {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },
}

impl ClientError {
    /// Create a status error.
    #[must_use]
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Returns true if the failure happened before any response arrived.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Timeout(_))
    }
}

/// Errors from building a value tree out of an XML document.
#[derive(thiserror::Error, Debug)]
pub enum XmlError {
    /// Tokenizer rejected the document
    #[error("malformed XML at byte {position}: {message}")]
    Malformed {
        /// Byte offset reported by the reader
        position: u64,
        /// Reader error message
        message: String,
    },

    /// Document had no root element
    #[error("document has no root element")]
    Empty,

    /// Document ended with open elements
    #[error("unclosed element <{0}>")]
    Unclosed(String),
}

/// Errors from mapping one raw article onto a [`crate::models::Paper`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A required key is absent
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    /// A key is present but its value has the wrong shape
    #[error("field '{field}' is not {expected}")]
    UnexpectedShape {
        /// Path of the offending field
        field: &'static str,
        /// Expected shape
        expected: &'static str,
    },
}

impl ParseError {
    /// Create an unexpected-shape error.
    #[must_use]
    pub const fn shape(field: &'static str, expected: &'static str) -> Self {
        Self::UnexpectedShape { field, expected }
    }
}

/// Errors from the chat completion endpoint.
#[derive(thiserror::Error, Debug)]
pub enum SummaryError {
    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("completion endpoint returned {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// Reply carried no usable message
    #[error("completion contained no message")]
    EmptyCompletion,
}

/// Errors from digest delivery.
#[derive(thiserror::Error, Debug)]
pub enum MailError {
    /// Sender or recipient address could not be parsed
    #[error("invalid address '{address}': {source}")]
    Address {
        /// The rejected address
        address: String,
        /// Parser error
        source: lettre::address::AddressError,
    },

    /// Message could not be assembled
    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    /// SMTP session failed
    #[error("SMTP error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// Sender credentials are not configured
    #[error("sender credentials are not configured")]
    MissingCredentials,

    /// Dry-run output could not be written
    #[error("failed to write digest: {0}")]
    Output(#[from] std::io::Error),
}

/// Errors from loading the recipient registry.
#[derive(thiserror::Error, Debug)]
pub enum RegistryError {
    /// File could not be opened
    #[error("cannot read registry {path}: {source}")]
    Io {
        /// Registry path
        path: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Table could not be parsed
    #[error("malformed registry: {0}")]
    Csv(#[from] csv::Error),

    /// Header row lacks a required column
    #[error("registry has no '{0}' column")]
    MissingColumn(&'static str),
}

/// Errors from startup configuration checks.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// A required value is absent
    #[error("{0} is not set")]
    Missing(&'static str),

    /// An endpoint is not a valid absolute URL
    #[error("invalid URL for {name}: {source}")]
    InvalidUrl {
        /// Setting name
        name: &'static str,
        /// Parser error
        source: url::ParseError,
    },
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type alias for article parsing.
pub type ParseResult<T> = Result<T, ParseError>;
