//! Data models for the digest pipeline.
//!
//! Everything here is built fresh for each run and dropped at its end.

mod paper;
mod recipient;

pub use paper::{NO_ABSTRACT, Paper};
pub use recipient::{Recipient, RecipientQuery};
