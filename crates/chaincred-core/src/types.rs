use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// Length of a SHA-256 digest rendered as hex.
pub const HEX_DIGEST_LEN: usize = 64;

/// A subject or issuer identity (wallet address, DID, institute handle).
///
/// Canonical form is trimmed and ASCII-lowercased, so `0xABC` and ` 0xabc `
/// name the same identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity(String);

impl Identity {
    /// Parse and canonicalize an identity.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidIdentity("identity is empty".into()));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(CoreError::InvalidIdentity(format!(
                "identity must not contain whitespace, got: {}",
                trimmed
            )));
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Identity {
    type Error = CoreError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<Identity> for String {
    fn from(value: Identity) -> Self {
        value.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Issuance time in the one canonical textual form used for hashing:
/// UTC, millisecond precision, `Z` suffix (`2024-01-01T00:00:00.000Z`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IssuanceTimestamp(String);

impl IssuanceTimestamp {
    /// Parse an RFC 3339 timestamp (any offset) or a bare `YYYY-MM-DD` date,
    /// which is taken as midnight UTC. Timestamps without an offset are
    /// rejected because their instant is ambiguous.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidTimestamp("timestamp is empty".into()));
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(Self::from_datetime(dt.with_timezone(&Utc)));
        }

        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
                return Ok(Self::from_datetime(midnight.and_utc()));
            }
        }

        Err(CoreError::InvalidTimestamp(format!(
            "expected RFC 3339 with offset or YYYY-MM-DD, got: {}",
            trimmed
        )))
    }

    /// Render a UTC instant in canonical form. Sub-millisecond precision is
    /// truncated.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    /// The current time in canonical form.
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the canonical string back into an instant.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.0)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

impl TryFrom<String> for IssuanceTimestamp {
    type Error = CoreError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<IssuanceTimestamp> for String {
    fn from(value: IssuanceTimestamp) -> Self {
        value.0
    }
}

impl fmt::Display for IssuanceTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lowercase hex SHA-256 of a document's raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentDigest(String);

impl ContentDigest {
    /// Parse a 64-character hex digest, accepting either case.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if trimmed.len() != HEX_DIGEST_LEN {
            return Err(CoreError::InvalidDigest(format!(
                "expected {} hex characters, got {}",
                HEX_DIGEST_LEN,
                trimmed.len()
            )));
        }
        hex::decode(trimmed).map_err(|e| CoreError::InvalidDigest(e.to_string()))?;
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    /// Wrap 32 raw digest bytes.
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ContentDigest {
    type Error = CoreError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<ContentDigest> for String {
    fn from(value: ContentDigest) -> Self {
        value.0
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The four immutable inputs of a credential fingerprint, already in
/// canonical form.
///
/// This is the only place canonicalization happens. Everything downstream
/// (fingerprint generation, storage, verification) consumes these strings
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFields {
    pub subject: Identity,
    pub issuer: Identity,
    pub content_digest: ContentDigest,
    pub issued_at: IssuanceTimestamp,
}

impl SourceFields {
    pub fn new(
        subject: Identity,
        issuer: Identity,
        content_digest: ContentDigest,
        issued_at: IssuanceTimestamp,
    ) -> Self {
        Self {
            subject,
            issuer,
            content_digest,
            issued_at,
        }
    }

    /// Canonicalize raw caller input.
    pub fn parse(
        subject: &str,
        issuer: &str,
        content_digest: &str,
        issued_at: &str,
    ) -> Result<Self, CoreError> {
        let fields = Self::new(
            Identity::parse(subject)?,
            Identity::parse(issuer)?,
            ContentDigest::parse(content_digest)?,
            IssuanceTimestamp::parse(issued_at)?,
        );
        tracing::trace!(
            subject = %fields.subject,
            issuer = %fields.issuer,
            issued_at = %fields.issued_at,
            "canonical source fields assembled"
        );
        Ok(fields)
    }

    /// The fields in hashing order: subject, issuer, digest, timestamp.
    pub fn as_parts(&self) -> [&str; 4] {
        [
            self.subject.as_str(),
            self.issuer.as_str(),
            self.content_digest.as_str(),
            self.issued_at.as_str(),
        ]
    }
}
