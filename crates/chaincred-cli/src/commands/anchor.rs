//! `chaincred anchor`: anchor a credential's fingerprint on the ledger.

use clap::Args;
use serde::Deserialize;

use super::{print_unreachable, request_failed, DEFAULT_ENDPOINT};

#[derive(Args, Debug)]
pub struct AnchorArgs {
    /// Credential id (its fingerprint).
    pub id: String,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Deserialize)]
struct AnchorReceipt {
    record_id: String,
    anchor: String,
    anchored_at: String,
}

pub async fn run(args: &AnchorArgs) -> anyhow::Result<()> {
    let url = format!("{}/api/v1/credentials/{}/anchor", args.endpoint, args.id);
    let client = reqwest::Client::new();

    match client.post(&url).send().await {
        Ok(r) if r.status().is_success() => {
            let receipt: AnchorReceipt = r.json().await?;
            println!("Credential anchored!");
            println!("  ID:          {}", receipt.record_id);
            println!("  Anchor:      {}", receipt.anchor);
            println!("  Anchored at: {}", receipt.anchored_at);
        }
        Ok(r) => return Err(request_failed("anchoring", r).await),
        Err(e) => print_unreachable(&args.endpoint, &e),
    }

    Ok(())
}
