//! ChainCred Credentials: records, issuer, ledger anchoring, and the
//! fingerprint verifier.

pub mod anchor;
pub mod error;
pub mod issuer;
pub mod metadata;
pub mod record;
pub mod store;
pub mod verifier;

pub use anchor::{AnchorLedger, AnchorReader, AnchorReceipt, CredentialAnchorer, InMemoryAnchorLedger};
pub use error::CredentialError;
pub use issuer::{CredentialIssuer, IssueRequest};
pub use metadata::{CredentialMetadata, InMemoryMetadataStore, MetadataSource, MetadataStore};
pub use record::CredentialRecord;
pub use store::{InMemoryRecordStore, RecordStore};
pub use verifier::{
    verify_record, CredentialVerifier, MismatchReason, VerificationCheck, VerificationResult,
};
