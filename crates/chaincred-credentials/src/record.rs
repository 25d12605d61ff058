use serde::{Deserialize, Serialize};

use chaincred_core::SourceFields;
use chaincred_crypto::generate_from;

use crate::error::CredentialError;

/// A persisted credential record.
///
/// The fingerprint is computed once, in [`CredentialRecord::new`], and is
/// the record's primary identifier. There are no setters for the source
/// fields or the fingerprint: a record read back from storage keeps
/// whatever fingerprint was stored, so any later change to the source
/// fields shows up as a mismatch at verification time instead of being
/// silently re-hashed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    fingerprint: String,
    subject: String,
    issuer: String,
    content_digest: String,
    issued_at: String,
    /// Display title (e.g. "BSc Computer Science"). Not hashed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    /// Original file name of the uploaded document. Not hashed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    document_name: Option<String>,
}

impl CredentialRecord {
    /// Build a record from canonical source fields, computing its fingerprint.
    pub fn new(fields: SourceFields) -> Result<Self, CredentialError> {
        let fingerprint = generate_from(&fields)?;
        let SourceFields {
            subject,
            issuer,
            content_digest,
            issued_at,
        } = fields;

        Ok(Self {
            fingerprint,
            subject: subject.as_str().to_string(),
            issuer: issuer.as_str().to_string(),
            content_digest: content_digest.as_str().to_string(),
            issued_at: issued_at.as_str().to_string(),
            title: None,
            document_name: None,
        })
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_document_name(mut self, name: impl Into<String>) -> Self {
        self.document_name = Some(name.into());
        self
    }

    /// The record identifier, which is its fingerprint.
    pub fn id(&self) -> &str {
        &self.fingerprint
    }

    /// The fingerprint as stored.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn content_digest(&self) -> &str {
        &self.content_digest
    }

    pub fn issued_at(&self) -> &str {
        &self.issued_at
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn document_name(&self) -> Option<&str> {
        self.document_name.as_deref()
    }

    /// Source fields in hashing order, as stored.
    pub fn source_parts(&self) -> [&str; 4] {
        [
            &self.subject,
            &self.issuer,
            &self.content_digest,
            &self.issued_at,
        ]
    }

    /// Serialize for persistence.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CredentialError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Deserialize a persisted record. The stored fingerprint is kept as is.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CredentialError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
