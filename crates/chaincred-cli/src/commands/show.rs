//! `chaincred show`: show a stored credential record.

use clap::Args;

use super::{print_unreachable, request_failed, DEFAULT_ENDPOINT};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Credential id (its fingerprint).
    pub id: String,

    /// Also fetch the published metadata.
    #[arg(short, long)]
    pub metadata: bool,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

async fn fetch(
    endpoint: &str,
    path: &str,
    action: &str,
) -> anyhow::Result<Option<serde_json::Value>> {
    let url = format!("{}{}", endpoint, path);
    match reqwest::get(&url).await {
        Ok(r) if r.status().is_success() => Ok(Some(r.json().await?)),
        Ok(r) => Err(request_failed(action, r).await),
        Err(e) => {
            print_unreachable(endpoint, &e);
            Ok(None)
        }
    }
}

pub async fn run(args: &ShowArgs) -> anyhow::Result<()> {
    let path = format!("/api/v1/credentials/{}", args.id);
    let Some(record) = fetch(&args.endpoint, &path, "lookup").await? else {
        return Ok(());
    };
    println!("{}", serde_json::to_string_pretty(&record)?);

    if args.metadata {
        let path = format!("/api/v1/credentials/{}/metadata", args.id);
        if let Some(metadata) = fetch(&args.endpoint, &path, "metadata lookup").await? {
            println!();
            println!("Metadata:");
            println!("{}", serde_json::to_string_pretty(&metadata)?);
        }
    }

    Ok(())
}
