//! `chaincred verify` / `chaincred verify-document`: verify a credential.

use anyhow::Context;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use clap::Args;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::{print_unreachable, request_failed, DEFAULT_ENDPOINT};

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Credential id (its fingerprint).
    pub id: String,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Args, Debug)]
pub struct VerifyDocumentArgs {
    /// Path to the document to look up and verify.
    #[arg(short, long)]
    pub document: PathBuf,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Serialize)]
struct VerifyDocumentRequest {
    document_base64: String,
}

#[derive(Deserialize)]
struct VerifyResponse {
    record_id: String,
    valid: bool,
    reason: Option<String>,
    checks: Vec<VerifyCheck>,
}

#[derive(Deserialize)]
struct VerifyCheck {
    name: String,
    passed: bool,
    detail: Option<String>,
}

fn print_result(data: &VerifyResponse) {
    if data.valid {
        println!("Credential {} is VALID", data.record_id);
    } else {
        println!(
            "Credential {} is INVALID ({})",
            data.record_id,
            data.reason.as_deref().unwrap_or("unknown")
        );
    }
    println!();
    for check in &data.checks {
        let icon = if check.passed { "PASS" } else { "FAIL" };
        print!("  [{}] {}", icon, check.name);
        if let Some(ref detail) = check.detail {
            print!(": {}", detail);
        }
        println!();
    }
}

async fn handle(endpoint: &str, resp: reqwest::Result<reqwest::Response>) -> anyhow::Result<()> {
    match resp {
        Ok(r) if r.status().is_success() => {
            let data: VerifyResponse = r.json().await?;
            print_result(&data);
        }
        Ok(r) => return Err(request_failed("verification", r).await),
        Err(e) => print_unreachable(endpoint, &e),
    }
    Ok(())
}

pub async fn run(args: &VerifyArgs) -> anyhow::Result<()> {
    let url = format!("{}/api/v1/credentials/{}/verify", args.endpoint, args.id);
    handle(&args.endpoint, reqwest::get(&url).await).await
}

pub async fn run_document(args: &VerifyDocumentArgs) -> anyhow::Result<()> {
    let document = std::fs::read(&args.document)
        .with_context(|| format!("reading {}", args.document.display()))?;
    let url = format!("{}/api/v1/credentials/verify-document", args.endpoint);
    let body = VerifyDocumentRequest {
        document_base64: STANDARD.encode(&document),
    };

    let client = reqwest::Client::new();
    handle(&args.endpoint, client.post(&url).json(&body).send().await).await
}
