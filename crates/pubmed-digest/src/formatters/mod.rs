//! Output formatting for digests.

mod html;

pub use html::{Digest, DigestComposer, escape_html};
