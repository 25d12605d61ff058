/// Credential system errors.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("credential not found: {0}")]
    NotFound(String),

    #[error("credential already exists: {0}")]
    AlreadyExists(String),

    #[error("credential already anchored: {0}")]
    AlreadyAnchored(String),

    #[error("issuer not authorized: {0}")]
    UnauthorizedIssuer(String),

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("verification failed: {0}")]
    VerificationFailed(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("core error: {0}")]
    Core(#[from] chaincred_core::CoreError),

    #[error("crypto error: {0}")]
    Crypto(#[from] chaincred_crypto::CryptoError),
}

impl From<serde_json::Error> for CredentialError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
