//! Ledger anchoring.
//!
//! An anchor is an annotation beside a record, never a mutation of it: the
//! ledger maps a record id to the fingerprint that was current when the
//! record was anchored, and that entry can never be rewritten.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::CredentialError;
use crate::metadata::{CredentialMetadata, MetadataStore};
use crate::store::RecordStore;
use crate::verifier::verify_record;

/// Read side of an external ledger.
#[async_trait]
pub trait AnchorReader: Send + Sync {
    /// The anchored value for a record, or `None` if it was never anchored.
    async fn read_anchor(&self, record_id: &str) -> Result<Option<String>, CredentialError>;
}

/// Write side of an external ledger. Entries are write-once.
#[async_trait]
pub trait AnchorLedger: AnchorReader {
    async fn write_anchor(&self, record_id: &str, anchor: &str) -> Result<(), CredentialError>;
}

/// In-memory ledger.
#[derive(Default)]
pub struct InMemoryAnchorLedger {
    entries: DashMap<String, String>,
}

impl InMemoryAnchorLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of anchored records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl AnchorReader for InMemoryAnchorLedger {
    async fn read_anchor(&self, record_id: &str) -> Result<Option<String>, CredentialError> {
        Ok(self.entries.get(record_id).map(|e| e.value().clone()))
    }
}

#[async_trait]
impl AnchorLedger for InMemoryAnchorLedger {
    async fn write_anchor(&self, record_id: &str, anchor: &str) -> Result<(), CredentialError> {
        match self.entries.entry(record_id.to_string()) {
            Entry::Occupied(_) => Err(CredentialError::AlreadyAnchored(record_id.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(anchor.to_string());
                Ok(())
            }
        }
    }
}

/// Proof that a record was anchored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorReceipt {
    pub record_id: String,
    pub anchor: String,
    pub anchored_at: DateTime<Utc>,
}

/// Publishes metadata for a record and writes its fingerprint to the ledger.
pub struct CredentialAnchorer {
    records: Arc<dyn RecordStore>,
    ledger: Arc<dyn AnchorLedger>,
    metadata: Arc<dyn MetadataStore>,
}

impl CredentialAnchorer {
    pub fn new(
        records: Arc<dyn RecordStore>,
        ledger: Arc<dyn AnchorLedger>,
        metadata: Arc<dyn MetadataStore>,
    ) -> Self {
        Self {
            records,
            ledger,
            metadata,
        }
    }

    /// Anchor the record stored under `record_id`.
    ///
    /// The record is verified first; a record whose fingerprint no longer
    /// matches its fields is refused rather than anchored.
    pub async fn anchor(&self, record_id: &str) -> Result<AnchorReceipt, CredentialError> {
        let record = self
            .records
            .get(record_id)
            .await?
            .ok_or_else(|| CredentialError::NotFound(record_id.to_string()))?;

        if self.ledger.read_anchor(record_id).await?.is_some() {
            return Err(CredentialError::AlreadyAnchored(record_id.to_string()));
        }

        let check = verify_record(&record, None, None);
        let fingerprint = match (check.valid, check.fingerprint) {
            (true, Some(fp)) => fp,
            _ => {
                let reason = check
                    .reason
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| "unknown".into());
                return Err(CredentialError::VerificationFailed(format!(
                    "refusing to anchor {}: {}",
                    record_id, reason
                )));
            }
        };

        self.metadata
            .publish_metadata(record_id, CredentialMetadata::from_record(&record))
            .await?;
        self.ledger.write_anchor(record_id, &fingerprint).await?;

        let receipt = AnchorReceipt {
            record_id: record_id.to_string(),
            anchor: fingerprint,
            anchored_at: Utc::now(),
        };

        tracing::info!(
            credential_id = record_id,
            subject = record.subject(),
            issuer = record.issuer(),
            "credential anchored"
        );

        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{InMemoryMetadataStore, MetadataSource};
    use crate::record::CredentialRecord;
    use crate::store::InMemoryRecordStore;
    use chaincred_core::SourceFields;
    use chaincred_crypto::sha256_hex;

    struct Fixture {
        records: Arc<InMemoryRecordStore>,
        ledger: Arc<InMemoryAnchorLedger>,
        metadata: Arc<InMemoryMetadataStore>,
        anchorer: CredentialAnchorer,
    }

    fn fixture() -> Fixture {
        let records = Arc::new(InMemoryRecordStore::new());
        let ledger = Arc::new(InMemoryAnchorLedger::new());
        let metadata = Arc::new(InMemoryMetadataStore::new());
        let anchorer = CredentialAnchorer::new(records.clone(), ledger.clone(), metadata.clone());
        Fixture {
            records,
            ledger,
            metadata,
            anchorer,
        }
    }

    fn record(doc: &[u8]) -> CredentialRecord {
        let fields = SourceFields::parse(
            "0xalice",
            "0xuniversity",
            &sha256_hex(doc),
            "2024-01-01T00:00:00Z",
        )
        .unwrap();
        CredentialRecord::new(fields).unwrap()
    }

    #[tokio::test]
    async fn test_ledger_write_once() {
        let ledger = InMemoryAnchorLedger::new();
        ledger.write_anchor("r1", "aa").await.unwrap();
        let err = ledger.write_anchor("r1", "bb").await.unwrap_err();
        assert!(matches!(err, CredentialError::AlreadyAnchored(_)));
        assert_eq!(ledger.read_anchor("r1").await.unwrap().as_deref(), Some("aa"));
        assert_eq!(ledger.len(), 1);
    }

    #[tokio::test]
    async fn test_read_absent_anchor() {
        let ledger = InMemoryAnchorLedger::new();
        assert!(ledger.read_anchor("none").await.unwrap().is_none());
        assert!(ledger.is_empty());
    }

    #[tokio::test]
    async fn test_anchor_writes_fingerprint_and_metadata() {
        let fx = fixture();
        let r = record(b"diploma");
        fx.records.insert(r.clone()).await.unwrap();

        let receipt = fx.anchorer.anchor(r.id()).await.unwrap();
        assert_eq!(receipt.anchor, r.fingerprint());
        assert_eq!(
            fx.ledger.read_anchor(r.id()).await.unwrap().as_deref(),
            Some(r.fingerprint())
        );
        let meta = fx.metadata.fetch_metadata(r.id()).await.unwrap().unwrap();
        assert_eq!(meta.fingerprint, r.fingerprint());
    }

    #[tokio::test]
    async fn test_anchor_twice_rejected() {
        let fx = fixture();
        let r = record(b"diploma");
        fx.records.insert(r.clone()).await.unwrap();
        fx.anchorer.anchor(r.id()).await.unwrap();
        let err = fx.anchorer.anchor(r.id()).await.unwrap_err();
        assert!(matches!(err, CredentialError::AlreadyAnchored(_)));
    }

    #[tokio::test]
    async fn test_anchor_missing_record() {
        let fx = fixture();
        let err = fx.anchorer.anchor("missing").await.unwrap_err();
        assert!(matches!(err, CredentialError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_anchor_refuses_corrupt_record() {
        let fx = fixture();
        let r = record(b"diploma");
        let mut json = serde_json::to_value(&r).unwrap();
        json["subject"] = serde_json::Value::String("0xmallory".into());
        let tampered: CredentialRecord = serde_json::from_value(json).unwrap();
        fx.records.insert(tampered).await.unwrap();

        let err = fx.anchorer.anchor(r.id()).await.unwrap_err();
        assert!(matches!(err, CredentialError::VerificationFailed(_)));
        assert!(fx.ledger.is_empty());
        assert!(fx.metadata.fetch_metadata(r.id()).await.unwrap().is_none());
    }
}
