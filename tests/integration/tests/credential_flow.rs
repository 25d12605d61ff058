//! Integration test: full credential lifecycle across crates.
//!
//! Exercises issue → anchor → verify using chaincred-core, chaincred-crypto,
//! and chaincred-credentials together.

use chaincred_core::SourceFields;
use chaincred_credentials::{AnchorReader, CredentialError, MetadataSource, RecordStore};
use chaincred_crypto::{generate, generate_from, sha256_hex};
use chaincred_integration_tests::{diploma_request, Deployment};

// =========================================================================
// Fingerprint generation
// =========================================================================

#[test]
fn test_reference_fingerprint() {
    let fp = generate("0xabc", "0xdef", "deadbeef", "2024-01-01T00:00:00.000Z").unwrap();
    assert_eq!(
        fp,
        "28b3711bb4762bec353ce85d6b61d3faad967088406aab5cc4ff5ed68850cd17"
    );
}

#[test]
fn test_canonical_fields_agree_with_raw_generation() {
    let digest = sha256_hex(b"%PDF-1.4 sample diploma");
    let fields = SourceFields::parse(
        "  0xABC",
        "0xDEF ",
        &digest.to_uppercase(),
        "2024-01-01T02:00:00+02:00",
    )
    .unwrap();
    assert_eq!(
        generate_from(&fields).unwrap(),
        generate("0xabc", "0xdef", &digest, "2024-01-01T00:00:00.000Z").unwrap()
    );
}

// =========================================================================
// Issue → anchor → verify
// =========================================================================

#[tokio::test]
async fn test_issue_anchor_verify() {
    let deployment = Deployment::new();
    let document = b"%PDF-1.4 sample diploma";

    let record = deployment
        .issuer
        .issue(diploma_request("0xAlice", document))
        .await
        .expect("issuance should succeed");
    assert_eq!(record.content_digest(), sha256_hex(document));
    assert_eq!(record.issued_at(), "2024-06-30T12:00:00.000Z");

    // Unanchored records verify on the record check alone.
    let result = deployment.verifier.verify_by_id(record.id()).await.unwrap();
    assert!(result.valid);
    assert_eq!(result.checks.len(), 1);

    let receipt = deployment.anchorer.anchor(record.id()).await.unwrap();
    assert_eq!(receipt.anchor, record.fingerprint());
    assert_eq!(
        deployment.ledger.read_anchor(record.id()).await.unwrap(),
        Some(record.fingerprint().to_string())
    );
    let metadata = deployment
        .metadata
        .fetch_metadata(record.id())
        .await
        .unwrap()
        .expect("metadata published");
    assert_eq!(metadata.fingerprint, record.fingerprint());
    assert_eq!(metadata.name, "BSc Computer Science");

    let result = deployment.verifier.verify_by_id(record.id()).await.unwrap();
    assert!(result.valid);
    assert_eq!(result.reason, None);
    assert_eq!(result.fingerprint.as_deref(), Some(record.fingerprint()));
    assert_eq!(result.checks.len(), 3);
    assert!(result.checks.iter().all(|c| c.passed));
}

#[tokio::test]
async fn test_verify_by_presented_document() {
    let deployment = Deployment::new();
    let record = deployment
        .issuer
        .issue(diploma_request("0xAlice", b"diploma bytes"))
        .await
        .unwrap();
    deployment.anchorer.anchor(record.id()).await.unwrap();

    let result = deployment
        .verifier
        .verify_document(b"diploma bytes")
        .await
        .unwrap();
    assert!(result.valid);
    assert_eq!(result.record_id, record.id());

    // A doctored copy hashes differently and finds no credential.
    let err = deployment
        .verifier
        .verify_document(b"diploma bytes, edited")
        .await
        .unwrap_err();
    assert!(matches!(err, CredentialError::NotFound(_)));
}

#[tokio::test]
async fn test_subject_listing() {
    let deployment = Deployment::new();
    for doc in [&b"first"[..], b"second", b"third"] {
        deployment
            .issuer
            .issue(diploma_request("0xAlice", doc))
            .await
            .unwrap();
    }
    deployment
        .issuer
        .issue(diploma_request("0xBob", b"bob's"))
        .await
        .unwrap();

    let alice = deployment.records.list_by_subject("0xalice").await.unwrap();
    assert_eq!(alice.len(), 3);
    assert!(alice.iter().all(|r| r.subject() == "0xalice"));
    assert_eq!(deployment.records.len(), 4);
}

#[tokio::test]
async fn test_anchor_is_write_once() {
    let deployment = Deployment::new();
    let record = deployment
        .issuer
        .issue(diploma_request("0xAlice", b"once"))
        .await
        .unwrap();
    deployment.anchorer.anchor(record.id()).await.unwrap();
    let err = deployment.anchorer.anchor(record.id()).await.unwrap_err();
    assert!(matches!(err, CredentialError::AlreadyAnchored(_)));
}

#[tokio::test]
async fn test_unknown_record() {
    let deployment = Deployment::new();
    assert!(matches!(
        deployment.verifier.verify_by_id("missing").await,
        Err(CredentialError::NotFound(_))
    ));
    assert!(matches!(
        deployment.anchorer.anchor("missing").await,
        Err(CredentialError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_expected_fingerprint_on_upload() {
    let deployment = Deployment::new();
    let document = b"uploaded diploma";
    let expected = generate(
        "0xalice",
        "0xuniversity",
        &sha256_hex(document),
        "2024-06-30T12:00:00.000Z",
    )
    .unwrap();

    let mut request = diploma_request("0xAlice", document);
    request.expected_fingerprint = Some(expected.clone());
    let record = deployment.issuer.issue(request).await.unwrap();
    assert_eq!(record.fingerprint(), expected);

    let mut request = diploma_request("0xAlice", b"another diploma");
    request.expected_fingerprint = Some(expected);
    let err = deployment.issuer.issue(request).await.unwrap_err();
    assert!(matches!(err, CredentialError::VerificationFailed(_)));
    assert_eq!(deployment.records.len(), 1);
}
