//! `chaincred issue`: issue a credential for a document.

use anyhow::Context;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use clap::Args;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::{print_unreachable, request_failed, DEFAULT_ENDPOINT};

#[derive(Args, Debug)]
pub struct IssueArgs {
    /// Identity of the credential holder.
    #[arg(short, long)]
    pub subject: String,

    /// Identity of the issuing institute.
    #[arg(short, long)]
    pub issuer: String,

    /// Path to the credential document (typically a PDF).
    #[arg(short, long)]
    pub document: PathBuf,

    /// Issuance timestamp. Defaults to the node's current time.
    #[arg(short = 't', long)]
    pub issued_at: Option<String>,

    /// Human-readable credential title.
    #[arg(long)]
    pub title: Option<String>,

    /// Fingerprint computed beforehand; the node refuses the upload if it differs.
    #[arg(long)]
    pub expected_fingerprint: Option<String>,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Serialize)]
struct IssueRequest {
    subject: String,
    issuer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    issued_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    document_name: Option<String>,
    document_base64: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    expected_fingerprint: Option<String>,
}

#[derive(Deserialize)]
struct CredentialResponse {
    fingerprint: String,
    subject: String,
    issuer: String,
    content_digest: String,
    issued_at: String,
}

pub async fn run(args: &IssueArgs) -> anyhow::Result<()> {
    let document = std::fs::read(&args.document)
        .with_context(|| format!("reading {}", args.document.display()))?;
    let document_name = args
        .document
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());

    let url = format!("{}/api/v1/credentials", args.endpoint);
    let body = IssueRequest {
        subject: args.subject.clone(),
        issuer: args.issuer.clone(),
        issued_at: args.issued_at.clone(),
        title: args.title.clone(),
        document_name,
        document_base64: STANDARD.encode(&document),
        expected_fingerprint: args.expected_fingerprint.clone(),
    };
    tracing::debug!(%url, bytes = document.len(), "uploading document");

    let client = reqwest::Client::new();
    let resp = client.post(&url).json(&body).send().await;

    match resp {
        Ok(r) if r.status().is_success() => {
            let data: CredentialResponse = r.json().await?;
            println!("Credential issued!");
            println!("  Fingerprint: {}", data.fingerprint);
            println!("  Subject:     {}", data.subject);
            println!("  Issuer:      {}", data.issuer);
            println!("  Digest:      {}", data.content_digest);
            println!("  Issued at:   {}", data.issued_at);
        }
        Ok(r) => return Err(request_failed("issuance", r).await),
        Err(e) => print_unreachable(&args.endpoint, &e),
    }

    Ok(())
}
