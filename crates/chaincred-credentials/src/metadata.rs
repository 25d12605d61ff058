use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::error::CredentialError;
use crate::record::CredentialRecord;

const DEFAULT_NAME: &str = "ChainCred Credential";

/// Token metadata published when a credential is anchored.
///
/// This is the blob a ledger token points at. Its embedded `fingerprint` is
/// checked against the recomputed one during verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialMetadata {
    pub name: String,
    pub description: String,
    pub fingerprint: String,
    pub content_digest: String,
    pub subject: String,
    pub issuer: String,
    pub issued_at: String,
}

impl CredentialMetadata {
    /// Build the metadata blob describing a record.
    pub fn from_record(record: &CredentialRecord) -> Self {
        Self {
            name: record.title().unwrap_or(DEFAULT_NAME).to_string(),
            description: format!(
                "Credential issued by {} to {}",
                record.issuer(),
                record.subject()
            ),
            fingerprint: record.fingerprint().to_string(),
            content_digest: record.content_digest().to_string(),
            subject: record.subject().to_string(),
            issuer: record.issuer().to_string(),
            issued_at: record.issued_at().to_string(),
        }
    }
}

/// Read access to published metadata.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn fetch_metadata(
        &self,
        record_id: &str,
    ) -> Result<Option<CredentialMetadata>, CredentialError>;
}

/// Where metadata is published. Publishing again replaces the blob.
#[async_trait]
pub trait MetadataStore: MetadataSource {
    async fn publish_metadata(
        &self,
        record_id: &str,
        metadata: CredentialMetadata,
    ) -> Result<(), CredentialError>;
}

/// In-memory metadata host.
#[derive(Default)]
pub struct InMemoryMetadataStore {
    blobs: DashMap<String, CredentialMetadata>,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MetadataSource for InMemoryMetadataStore {
    async fn fetch_metadata(
        &self,
        record_id: &str,
    ) -> Result<Option<CredentialMetadata>, CredentialError> {
        Ok(self.blobs.get(record_id).map(|e| e.value().clone()))
    }
}

#[async_trait]
impl MetadataStore for InMemoryMetadataStore {
    async fn publish_metadata(
        &self,
        record_id: &str,
        metadata: CredentialMetadata,
    ) -> Result<(), CredentialError> {
        self.blobs.insert(record_id.to_string(), metadata);
        tracing::debug!(credential_id = record_id, "metadata published");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chaincred_core::SourceFields;
    use chaincred_crypto::sha256_hex;

    fn record() -> CredentialRecord {
        let fields = SourceFields::parse(
            "0xalice",
            "0xuniversity",
            &sha256_hex(b"transcript"),
            "2024-05-20T10:00:00Z",
        )
        .unwrap();
        CredentialRecord::new(fields).unwrap()
    }

    #[test]
    fn test_from_record_copies_fingerprint() {
        let r = record();
        let meta = CredentialMetadata::from_record(&r);
        assert_eq!(meta.fingerprint, r.fingerprint());
        assert_eq!(meta.content_digest, r.content_digest());
        assert_eq!(meta.name, DEFAULT_NAME);
        assert!(meta.description.contains("0xuniversity"));
    }

    #[test]
    fn test_from_record_uses_title() {
        let r = record().with_title("Transcript of Records");
        assert_eq!(CredentialMetadata::from_record(&r).name, "Transcript of Records");
    }

    #[tokio::test]
    async fn test_publish_and_fetch() {
        let store = InMemoryMetadataStore::new();
        let r = record();
        assert!(store.fetch_metadata(r.id()).await.unwrap().is_none());

        store
            .publish_metadata(r.id(), CredentialMetadata::from_record(&r))
            .await
            .unwrap();
        let fetched = store.fetch_metadata(r.id()).await.unwrap().unwrap();
        assert_eq!(fetched.fingerprint, r.fingerprint());
    }

    #[tokio::test]
    async fn test_publish_replaces() {
        let store = InMemoryMetadataStore::new();
        let r = record();
        let mut meta = CredentialMetadata::from_record(&r);
        store.publish_metadata(r.id(), meta.clone()).await.unwrap();
        meta.name = "Renamed".into();
        store.publish_metadata(r.id(), meta).await.unwrap();
        let fetched = store.fetch_metadata(r.id()).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Renamed");
    }
}
