//! ChainCred Core: canonical field types and errors shared by every
//! ChainCred crate.

pub mod error;
pub mod types;

pub use error::CoreError;
pub use types::{ContentDigest, Identity, IssuanceTimestamp, SourceFields};
