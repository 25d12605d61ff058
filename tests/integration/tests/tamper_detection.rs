//! Integration test: tampering with any stored copy is detected.
//!
//! Each test edits one of the three places a fingerprint lives (the record,
//! the published metadata, the ledger anchor) and checks the verifier names
//! the right one.

use chaincred_credentials::{
    AnchorLedger, CredentialError, MetadataStore, MismatchReason, RecordStore,
};
use chaincred_integration_tests::{diploma_request, tamper, Deployment};

#[tokio::test]
async fn test_edited_record_is_corrupt() {
    let source = Deployment::new();
    let record = source
        .issuer
        .issue(diploma_request("0xAlice", b"diploma"))
        .await
        .unwrap();

    for (field, value) in [
        ("subject", "0xmallory"),
        ("issuer", "0xdiplomamill"),
        ("issued_at", "2020-01-01T00:00:00.000Z"),
        (
            "content_digest",
            "0000000000000000000000000000000000000000000000000000000000000000",
        ),
    ] {
        let edited = Deployment::new();
        edited
            .records
            .insert(tamper(&record, field, value))
            .await
            .unwrap();

        let result = edited.verifier.verify_by_id(record.id()).await.unwrap();
        assert!(!result.valid, "edit to {} went unnoticed", field);
        assert_eq!(result.reason, Some(MismatchReason::CorruptRecord));
        assert_ne!(result.fingerprint.as_deref(), Some(record.fingerprint()));
    }
}

#[tokio::test]
async fn test_emptied_field_is_corrupt() {
    let source = Deployment::new();
    let record = source
        .issuer
        .issue(diploma_request("0xAlice", b"diploma"))
        .await
        .unwrap();

    let edited = Deployment::new();
    edited
        .records
        .insert(tamper(&record, "subject", ""))
        .await
        .unwrap();
    let result = edited.verifier.verify_by_id(record.id()).await.unwrap();
    assert!(!result.valid);
    assert_eq!(result.reason, Some(MismatchReason::CorruptRecord));
    assert_eq!(result.fingerprint, None);
}

#[tokio::test]
async fn test_corrupt_record_is_not_anchored() {
    let source = Deployment::new();
    let record = source
        .issuer
        .issue(diploma_request("0xAlice", b"diploma"))
        .await
        .unwrap();

    let edited = Deployment::new();
    edited
        .records
        .insert(tamper(&record, "subject", "0xmallory"))
        .await
        .unwrap();
    let err = edited.anchorer.anchor(record.id()).await.unwrap_err();
    assert!(matches!(err, CredentialError::VerificationFailed(_)));
    assert!(edited.ledger.is_empty());
}

#[tokio::test]
async fn test_replaced_metadata_is_detected() {
    let deployment = Deployment::new();
    let record = deployment
        .issuer
        .issue(diploma_request("0xAlice", b"diploma"))
        .await
        .unwrap();
    deployment.anchorer.anchor(record.id()).await.unwrap();

    let other = deployment
        .issuer
        .issue(diploma_request("0xBob", b"someone else's diploma"))
        .await
        .unwrap();
    let mut forged = chaincred_credentials::CredentialMetadata::from_record(&record);
    forged.fingerprint = other.fingerprint().to_string();
    deployment
        .metadata
        .publish_metadata(record.id(), forged)
        .await
        .unwrap();

    let result = deployment.verifier.verify_by_id(record.id()).await.unwrap();
    assert!(!result.valid);
    assert_eq!(result.reason, Some(MismatchReason::MetadataMismatch));
    assert_eq!(result.checks.len(), 2);
}

#[tokio::test]
async fn test_wrong_anchor_is_detected() {
    let deployment = Deployment::new();
    let record = deployment
        .issuer
        .issue(diploma_request("0xAlice", b"diploma"))
        .await
        .unwrap();

    // Written directly, bypassing the anchorer.
    deployment
        .ledger
        .write_anchor(record.id(), &"f".repeat(64))
        .await
        .unwrap();

    let result = deployment.verifier.verify_by_id(record.id()).await.unwrap();
    assert!(!result.valid);
    assert_eq!(result.reason, Some(MismatchReason::AnchorMismatch));
    assert_eq!(result.fingerprint.as_deref(), Some(record.fingerprint()));
}

#[tokio::test]
async fn test_record_check_runs_first() {
    // Both the record and the anchor are wrong; the record is reported.
    let source = Deployment::new();
    let record = source
        .issuer
        .issue(diploma_request("0xAlice", b"diploma"))
        .await
        .unwrap();

    let edited = Deployment::new();
    edited
        .records
        .insert(tamper(&record, "issuer", "0xdiplomamill"))
        .await
        .unwrap();
    edited
        .ledger
        .write_anchor(record.id(), &"0".repeat(64))
        .await
        .unwrap();

    let result = edited.verifier.verify_by_id(record.id()).await.unwrap();
    assert_eq!(result.reason, Some(MismatchReason::CorruptRecord));
    assert_eq!(result.checks.len(), 1);
}
