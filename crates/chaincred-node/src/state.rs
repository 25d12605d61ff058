//! Shared node state for the HTTP handlers.

use std::sync::Arc;
use std::time::Instant;

use chaincred_credentials::{
    AnchorLedger, CredentialAnchorer, CredentialError, CredentialIssuer, CredentialVerifier,
    MetadataSource, MetadataStore, RecordStore,
};

/// Services shared by every request handler.
pub struct NodeState {
    /// When the node started.
    pub start_time: Instant,
    pub records: Arc<dyn RecordStore>,
    pub metadata: Arc<dyn MetadataSource>,
    pub issuer: CredentialIssuer,
    pub verifier: CredentialVerifier,
    pub anchorer: CredentialAnchorer,
    /// Upper bound on decoded document size.
    pub max_document_bytes: usize,
}

impl NodeState {
    /// Wire the issuer, verifier, and anchorer over the given backends.
    pub fn new<R, L, M>(
        records: Arc<R>,
        ledger: Arc<L>,
        metadata: Arc<M>,
        allowed_issuers: &[String],
        max_document_bytes: usize,
    ) -> Result<Self, CredentialError>
    where
        R: RecordStore + 'static,
        L: AnchorLedger + 'static,
        M: MetadataStore + 'static,
    {
        let issuer =
            CredentialIssuer::new(records.clone()).with_allowed_issuers(allowed_issuers)?;
        let verifier = CredentialVerifier::new(records.clone())
            .with_anchor_reader(ledger.clone())
            .with_metadata_source(metadata.clone());
        let anchorer = CredentialAnchorer::new(records.clone(), ledger, metadata.clone());

        Ok(Self {
            start_time: Instant::now(),
            records,
            metadata,
            issuer,
            verifier,
            anchorer,
            max_document_bytes,
        })
    }
}
