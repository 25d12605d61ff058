use chaincred_core::ContentDigest;
use sha2::{Digest, Sha256};

/// SHA-256 hash (32 bytes).
pub type Hash = [u8; 32];

/// Hash arbitrary data using SHA-256.
pub fn sha256(data: &[u8]) -> Hash {
    let digest = Sha256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// SHA-256 rendered as lowercase hex.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// Content digest of an uploaded document's raw bytes.
pub fn content_digest(document: &[u8]) -> ContentDigest {
    ContentDigest::from_bytes(&sha256(document))
}
