//! Shared fixtures for the cross-crate integration tests.

use std::sync::Arc;

use chaincred_credentials::{
    CredentialAnchorer, CredentialIssuer, CredentialRecord, CredentialVerifier,
    InMemoryAnchorLedger, InMemoryMetadataStore, InMemoryRecordStore, IssueRequest,
};

/// One set of in-memory backends with every service wired over them.
pub struct Deployment {
    pub records: Arc<InMemoryRecordStore>,
    pub ledger: Arc<InMemoryAnchorLedger>,
    pub metadata: Arc<InMemoryMetadataStore>,
    pub issuer: CredentialIssuer,
    pub verifier: CredentialVerifier,
    pub anchorer: CredentialAnchorer,
}

impl Deployment {
    pub fn new() -> Self {
        let records = Arc::new(InMemoryRecordStore::new());
        let ledger = Arc::new(InMemoryAnchorLedger::new());
        let metadata = Arc::new(InMemoryMetadataStore::new());

        let issuer = CredentialIssuer::new(records.clone());
        let verifier = CredentialVerifier::new(records.clone())
            .with_anchor_reader(ledger.clone())
            .with_metadata_source(metadata.clone());
        let anchorer = CredentialAnchorer::new(records.clone(), ledger.clone(), metadata.clone());

        Self {
            records,
            ledger,
            metadata,
            issuer,
            verifier,
            anchorer,
        }
    }
}

impl Default for Deployment {
    fn default() -> Self {
        Self::new()
    }
}

/// An issue request for a diploma with a fixed timestamp.
pub fn diploma_request(subject: &str, document: &[u8]) -> IssueRequest {
    IssueRequest {
        subject: subject.into(),
        issuer: "0xUniversity".into(),
        issued_at: Some("2024-06-30T12:00:00Z".into()),
        title: Some("BSc Computer Science".into()),
        document_name: Some("diploma.pdf".into()),
        document: document.to_vec(),
        expected_fingerprint: None,
    }
}

/// Copy a record with one serialized field replaced, keeping its stored
/// fingerprint. Simulates an edited database row.
pub fn tamper(record: &CredentialRecord, field: &str, value: &str) -> CredentialRecord {
    let mut json = serde_json::to_value(record).expect("serialize record");
    json[field] = serde_json::Value::String(value.into());
    serde_json::from_value(json).expect("deserialize record")
}
