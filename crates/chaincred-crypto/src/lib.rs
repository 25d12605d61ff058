pub mod error;
pub mod fingerprint;
pub mod hashing;

pub use error::CryptoError;
pub use fingerprint::{generate, generate_from, FINGERPRINT_HEX_LEN};
pub use hashing::{content_digest, sha256, sha256_hex, Hash};
