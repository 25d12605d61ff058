use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::error::CredentialError;
use crate::record::CredentialRecord;

/// Persistence for credential records.
///
/// Records are write-once: `insert` fails with
/// [`CredentialError::AlreadyExists`] if either the fingerprint or the
/// document's content digest is already registered. Stores do not validate
/// fingerprints; that is the verifier's job.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch a record by identifier (its fingerprint).
    async fn get(&self, id: &str) -> Result<Option<CredentialRecord>, CredentialError>;

    /// Persist a new record.
    async fn insert(&self, record: CredentialRecord) -> Result<(), CredentialError>;

    /// Look up the record issued for a given document digest.
    async fn find_by_content_digest(
        &self,
        digest: &str,
    ) -> Result<Option<CredentialRecord>, CredentialError>;

    /// All records issued to a subject, oldest first.
    async fn list_by_subject(&self, subject: &str)
        -> Result<Vec<CredentialRecord>, CredentialError>;
}

/// In-memory record store backed by `DashMap`.
#[derive(Default)]
pub struct InMemoryRecordStore {
    /// Fingerprint → record.
    records: DashMap<String, CredentialRecord>,
    /// Content digest → fingerprint.
    content_index: DashMap<String, String>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn get(&self, id: &str) -> Result<Option<CredentialRecord>, CredentialError> {
        Ok(self.records.get(id).map(|e| e.value().clone()))
    }

    async fn insert(&self, record: CredentialRecord) -> Result<(), CredentialError> {
        let id = record.id().to_string();
        if self.records.contains_key(&id) {
            return Err(CredentialError::AlreadyExists(id));
        }

        match self.content_index.entry(record.content_digest().to_string()) {
            Entry::Occupied(existing) => {
                return Err(CredentialError::AlreadyExists(format!(
                    "document {} is already registered as {}",
                    existing.key(),
                    existing.get()
                )));
            }
            Entry::Vacant(slot) => {
                slot.insert(id.clone());
            }
        }

        self.records.insert(id.clone(), record);
        tracing::debug!(credential_id = %id, "record stored");
        Ok(())
    }

    async fn find_by_content_digest(
        &self,
        digest: &str,
    ) -> Result<Option<CredentialRecord>, CredentialError> {
        let Some(id) = self.content_index.get(digest).map(|e| e.value().clone()) else {
            return Ok(None);
        };
        self.get(&id).await
    }

    async fn list_by_subject(
        &self,
        subject: &str,
    ) -> Result<Vec<CredentialRecord>, CredentialError> {
        let mut found: Vec<CredentialRecord> = self
            .records
            .iter()
            .filter(|e| e.subject() == subject)
            .map(|e| e.value().clone())
            .collect();
        found.sort_by(|a, b| a.issued_at().cmp(b.issued_at()));
        Ok(found)
    }
}
