use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use chaincred_crypto::{content_digest, generate};

use crate::anchor::AnchorReader;
use crate::error::CredentialError;
use crate::metadata::{CredentialMetadata, MetadataSource};
use crate::record::CredentialRecord;
use crate::store::RecordStore;

/// Why a credential failed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MismatchReason {
    /// The recomputed fingerprint differs from the stored one.
    CorruptRecord,
    /// The published metadata carries a different fingerprint.
    MetadataMismatch,
    /// The ledger anchor differs from the recomputed fingerprint.
    AnchorMismatch,
}

impl fmt::Display for MismatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CorruptRecord => write!(f, "CorruptRecord"),
            Self::MetadataMismatch => write!(f, "MetadataMismatch"),
            Self::AnchorMismatch => write!(f, "AnchorMismatch"),
        }
    }
}

/// An individual verification check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationCheck {
    /// Name of the check.
    pub name: String,
    /// Whether the check passed.
    pub passed: bool,
    /// Optional detail message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl VerificationCheck {
    fn pass(name: &str) -> Self {
        Self {
            name: name.into(),
            passed: true,
            detail: None,
        }
    }

    fn fail(name: &str, detail: String) -> Self {
        Self {
            name: name.into(),
            passed: false,
            detail: Some(detail),
        }
    }
}

/// Result of credential verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Identifier of the verified record (its stored fingerprint).
    pub record_id: String,
    /// Whether every check that ran passed.
    pub valid: bool,
    /// First failing check, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<MismatchReason>,
    /// Fingerprint recomputed from the record's source fields. `None` when
    /// the stored fields cannot be hashed at all.
    pub fingerprint: Option<String>,
    /// Checks that ran, in order. Stops at the first failure.
    pub checks: Vec<VerificationCheck>,
}

pub const CHECK_RECORD: &str = "record_fingerprint";
pub const CHECK_METADATA: &str = "metadata_fingerprint";
pub const CHECK_ANCHOR: &str = "anchor_fingerprint";

/// Verify a record against its stored fingerprint and, when supplied, its
/// published metadata and ledger anchor.
///
/// Checks run in that order and stop at the first failure. Mismatches are
/// reported in the result, never as errors.
pub fn verify_record(
    record: &CredentialRecord,
    metadata: Option<&CredentialMetadata>,
    anchor: Option<&str>,
) -> VerificationResult {
    let mut checks = Vec::with_capacity(3);
    let [subject, issuer, digest, issued_at] = record.source_parts();

    let recomputed = match generate(subject, issuer, digest, issued_at) {
        Ok(fp) => fp,
        Err(e) => {
            checks.push(VerificationCheck::fail(
                CHECK_RECORD,
                format!("source fields cannot be hashed: {}", e),
            ));
            return failed(record, None, MismatchReason::CorruptRecord, checks);
        }
    };

    if recomputed != record.fingerprint() {
        checks.push(VerificationCheck::fail(
            CHECK_RECORD,
            format!(
                "stored fingerprint {} does not match recomputed {}",
                record.fingerprint(),
                recomputed
            ),
        ));
        return failed(record, Some(recomputed), MismatchReason::CorruptRecord, checks);
    }
    checks.push(VerificationCheck::pass(CHECK_RECORD));

    if let Some(meta) = metadata {
        if meta.fingerprint != recomputed {
            checks.push(VerificationCheck::fail(
                CHECK_METADATA,
                format!("metadata carries fingerprint {}", meta.fingerprint),
            ));
            return failed(record, Some(recomputed), MismatchReason::MetadataMismatch, checks);
        }
        checks.push(VerificationCheck::pass(CHECK_METADATA));
    }

    if let Some(anchor) = anchor {
        if anchor.as_bytes() != recomputed.as_bytes() {
            checks.push(VerificationCheck::fail(
                CHECK_ANCHOR,
                format!("ledger anchor is {}", anchor),
            ));
            return failed(record, Some(recomputed), MismatchReason::AnchorMismatch, checks);
        }
        checks.push(VerificationCheck::pass(CHECK_ANCHOR));
    }

    VerificationResult {
        record_id: record.id().to_string(),
        valid: true,
        reason: None,
        fingerprint: Some(recomputed),
        checks,
    }
}

fn failed(
    record: &CredentialRecord,
    fingerprint: Option<String>,
    reason: MismatchReason,
    checks: Vec<VerificationCheck>,
) -> VerificationResult {
    tracing::warn!(credential_id = record.id(), %reason, "credential failed verification");
    VerificationResult {
        record_id: record.id().to_string(),
        valid: false,
        reason: Some(reason),
        fingerprint,
        checks,
    }
}

/// Fetches a record and its optional metadata and anchor, then verifies it.
pub struct CredentialVerifier {
    records: Arc<dyn RecordStore>,
    anchors: Option<Arc<dyn AnchorReader>>,
    metadata: Option<Arc<dyn MetadataSource>>,
}

impl CredentialVerifier {
    /// Create a verifier that only checks records against their own
    /// fingerprint.
    pub fn new(records: Arc<dyn RecordStore>) -> Self {
        Self {
            records,
            anchors: None,
            metadata: None,
        }
    }

    /// Also compare against ledger anchors.
    pub fn with_anchor_reader(mut self, anchors: Arc<dyn AnchorReader>) -> Self {
        self.anchors = Some(anchors);
        self
    }

    /// Also compare against published metadata.
    pub fn with_metadata_source(mut self, metadata: Arc<dyn MetadataSource>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Verify the record stored under `id`.
    pub async fn verify_by_id(&self, id: &str) -> Result<VerificationResult, CredentialError> {
        let record = self
            .records
            .get(id)
            .await?
            .ok_or_else(|| CredentialError::NotFound(id.to_string()))?;
        self.verify(&record).await
    }

    /// Verify a presented document: hash it, find the record issued for it,
    /// and verify that record.
    pub async fn verify_document(
        &self,
        document: &[u8],
    ) -> Result<VerificationResult, CredentialError> {
        if document.is_empty() {
            return Err(CredentialError::InvalidDocument("document is empty".into()));
        }
        let digest = content_digest(document);
        let record = self
            .records
            .find_by_content_digest(digest.as_str())
            .await?
            .ok_or_else(|| {
                CredentialError::NotFound(format!("no credential for document {}", digest))
            })?;
        self.verify(&record).await
    }

    /// Verify an already-fetched record, reading its anchor and metadata.
    pub async fn verify(
        &self,
        record: &CredentialRecord,
    ) -> Result<VerificationResult, CredentialError> {
        let metadata = match &self.metadata {
            Some(source) => source.fetch_metadata(record.id()).await?,
            None => None,
        };
        let anchor = match &self.anchors {
            Some(reader) => reader.read_anchor(record.id()).await?,
            None => None,
        };

        let result = verify_record(record, metadata.as_ref(), anchor.as_deref());
        tracing::info!(
            credential_id = record.id(),
            valid = result.valid,
            anchored = anchor.is_some(),
            "credential verified"
        );
        Ok(result)
    }
}
