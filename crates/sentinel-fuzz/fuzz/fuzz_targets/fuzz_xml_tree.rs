#![no_main]

use libfuzzer_sys::fuzz_target;
use pubmed_digest::client::xml;
use pubmed_digest::normalize::{structured_items, text_items};

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    // Never panics, only Ok or Err; normalization accepts any resulting shape.
    if let Ok(tree) = xml::parse(input) {
        let _ = text_items(tree.pointer("/eSearchResult/IdList/Id"));
        let _ = structured_items(tree.pointer("/PubmedArticleSet/PubmedArticle"));
    }
});
