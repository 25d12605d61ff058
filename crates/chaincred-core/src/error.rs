/// Core validation errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid identity: {0}")]
    InvalidIdentity(String),

    #[error("invalid issuance timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("invalid content digest: {0}")]
    InvalidDigest(String),
}
