//! Fuzzing library for pubmed-digest.
//!
//! Targets cover the XML value-tree builder and article parsing over
//! arbitrary value trees.
//!
//! # Usage
//!
//! ```bash
//! cd crates/sentinel-fuzz
//! cargo +nightly fuzz run fuzz_xml_tree -- -max_total_time=60
//! ```

pub use pubmed_digest::client::xml;
pub use pubmed_digest::{normalize, parser};
