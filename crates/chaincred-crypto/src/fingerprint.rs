//! Credential fingerprint generation.
//!
//! A fingerprint is `sha256(subject ++ issuer ++ content_digest ++ issued_at)`
//! over the four fields exactly as given, with no separator, rendered as
//! lowercase hex. Inputs must already be canonical; nothing here trims or
//! lowercases.

use chaincred_core::SourceFields;
use sha2::{Digest, Sha256};

use crate::error::CryptoError;

/// Length of a fingerprint in hex characters.
pub const FINGERPRINT_HEX_LEN: usize = 64;

const FIELD_NAMES: [&str; 4] = ["subject", "issuer", "content_digest", "issued_at"];

/// Compute the fingerprint of a credential's source fields.
///
/// Fails with [`CryptoError::InvalidInput`] naming the first empty field.
pub fn generate(
    subject: &str,
    issuer: &str,
    content_digest: &str,
    issued_at: &str,
) -> Result<String, CryptoError> {
    let parts = [subject, issuer, content_digest, issued_at];
    if let Some(idx) = parts.iter().position(|p| p.is_empty()) {
        tracing::debug!(field = FIELD_NAMES[idx], "fingerprint input rejected");
        return Err(CryptoError::InvalidInput(format!(
            "{} must not be empty",
            FIELD_NAMES[idx]
        )));
    }

    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Compute the fingerprint of already-canonical [`SourceFields`].
pub fn generate_from(fields: &SourceFields) -> Result<String, CryptoError> {
    let [subject, issuer, digest, issued_at] = fields.as_parts();
    generate(subject, issuer, digest, issued_at)
}
