//! `chaincred status`: query the status of a running ChainCred node.

use clap::Args;
use serde::Deserialize;

use super::{print_unreachable, DEFAULT_ENDPOINT};

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Deserialize)]
struct StatusResponse {
    version: String,
    uptime_secs: u64,
    allowed_issuers: usize,
}

pub async fn run(args: &StatusArgs) -> anyhow::Result<()> {
    let url = format!("{}/api/v1/status", args.endpoint);
    let resp = reqwest::get(&url).await;

    match resp {
        Ok(r) if r.status().is_success() => {
            let status: StatusResponse = r.json().await?;
            println!("Node Status:");
            println!("  Version:    {}", status.version);
            println!("  Uptime:     {}s", status.uptime_secs);
            if status.allowed_issuers == 0 {
                println!("  Issuers:    any");
            } else {
                println!("  Issuers:    {} allow-listed", status.allowed_issuers);
            }
        }
        Ok(r) => {
            anyhow::bail!("node returned HTTP {}", r.status());
        }
        Err(e) => print_unreachable(&args.endpoint, &e),
    }

    Ok(())
}
