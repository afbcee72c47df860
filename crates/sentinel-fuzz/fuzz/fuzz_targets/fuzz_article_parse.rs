#![no_main]

use libfuzzer_sys::fuzz_target;
use pubmed_digest::parser::parse_article;

fuzz_target!(|data: &[u8]| {
    // Arbitrary JSON stands in for any shape the tree builder might produce.
    if let Ok(raw) = serde_json::from_slice::<serde_json::Value>(data) {
        let _ = parse_article(&raw, "https://pubmed.ncbi.nlm.nih.gov");
    }
});
