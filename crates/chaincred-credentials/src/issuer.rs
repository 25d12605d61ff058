use std::collections::HashSet;
use std::sync::Arc;

use chaincred_core::{Identity, IssuanceTimestamp, SourceFields};
use chaincred_crypto::content_digest;

use crate::error::CredentialError;
use crate::record::CredentialRecord;
use crate::store::RecordStore;

/// A request to issue a credential for an uploaded document.
#[derive(Debug, Clone, Default)]
pub struct IssueRequest {
    /// Identity of the credential holder.
    pub subject: String,
    /// Identity of the issuing institute.
    pub issuer: String,
    /// Issuance time. Defaults to now.
    pub issued_at: Option<String>,
    pub title: Option<String>,
    pub document_name: Option<String>,
    /// Raw document bytes (typically a PDF).
    pub document: Vec<u8>,
    /// Fingerprint the uploader computed on their side. When present, the
    /// upload is refused unless it matches.
    pub expected_fingerprint: Option<String>,
}

/// Issues credential records into a record store.
pub struct CredentialIssuer {
    records: Arc<dyn RecordStore>,
    /// Institutes allowed to issue. Empty means anyone may issue.
    allowed_issuers: HashSet<Identity>,
}

impl CredentialIssuer {
    /// Create an issuer with no allow-list.
    pub fn new(records: Arc<dyn RecordStore>) -> Self {
        Self {
            records,
            allowed_issuers: HashSet::new(),
        }
    }

    /// Restrict issuance to the given institutes.
    pub fn with_allowed_issuers<I, S>(mut self, issuers: I) -> Result<Self, CredentialError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for raw in issuers {
            self.allowed_issuers.insert(Identity::parse(raw.as_ref())?);
        }
        Ok(self)
    }

    /// Whether an issuer identity may issue credentials.
    pub fn is_allowed(&self, issuer: &Identity) -> bool {
        self.allowed_issuers.is_empty() || self.allowed_issuers.contains(issuer)
    }

    /// Number of allow-listed issuers.
    pub fn allowed_issuer_count(&self) -> usize {
        self.allowed_issuers.len()
    }

    /// Hash the document, canonicalize the fields, compute the fingerprint,
    /// and persist the new record.
    pub async fn issue(&self, request: IssueRequest) -> Result<CredentialRecord, CredentialError> {
        let issuer = Identity::parse(&request.issuer)?;
        if !self.is_allowed(&issuer) {
            return Err(CredentialError::UnauthorizedIssuer(issuer.to_string()));
        }
        let subject = Identity::parse(&request.subject)?;

        if request.document.is_empty() {
            return Err(CredentialError::InvalidDocument("document is empty".into()));
        }
        let digest = content_digest(&request.document);

        let issued_at = match request.issued_at.as_deref() {
            Some(raw) => IssuanceTimestamp::parse(raw)?,
            None => IssuanceTimestamp::now(),
        };

        let mut record =
            CredentialRecord::new(SourceFields::new(subject, issuer, digest, issued_at))?;
        if let Some(title) = request.title {
            record = record.with_title(title);
        }
        if let Some(name) = request.document_name {
            record = record.with_document_name(name);
        }

        if let Some(expected) = request.expected_fingerprint {
            if expected.trim().to_ascii_lowercase() != record.fingerprint() {
                return Err(CredentialError::VerificationFailed(format!(
                    "uploaded fingerprint {} does not match computed {}",
                    expected,
                    record.fingerprint()
                )));
            }
        }

        self.records.insert(record.clone()).await?;

        tracing::info!(
            credential_id = record.id(),
            issuer = record.issuer(),
            subject = record.subject(),
            issued_at = record.issued_at(),
            "credential issued"
        );

        Ok(record)
    }
}
