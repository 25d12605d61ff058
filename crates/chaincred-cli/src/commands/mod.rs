//! Subcommand implementations.

pub mod anchor;
pub mod digest;
pub mod fingerprint;
pub mod issue;
pub mod show;
pub mod status;
pub mod verify;

use serde::Deserialize;

/// Default node API endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8080";

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Turn a non-success response into an error carrying the node's message.
pub(crate) async fn request_failed(action: &str, resp: reqwest::Response) -> anyhow::Error {
    let status = resp.status();
    match resp.json::<ErrorResponse>().await {
        Ok(err) => anyhow::anyhow!("{} failed (HTTP {}): {}", action, status, err.error),
        Err(_) => anyhow::anyhow!("{} failed (HTTP {})", action, status),
    }
}

pub(crate) fn print_unreachable(endpoint: &str, e: &reqwest::Error) {
    println!("Could not reach node at {}", endpoint);
    println!("  Error: {}", e);
    println!();
    println!("Is the node running? Start it with: chaincred-node");
}
