//! ChainCred CLI: compute credential fingerprints and talk to a node.
//!
//! Subcommands: fingerprint, digest, issue, show, verify, verify-document,
//! anchor, status.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// ChainCred: tamper-evident academic credentials.
#[derive(Parser, Debug)]
#[command(name = "chaincred", version, about, long_about = None)]
struct Cli {
    /// Log level for diagnostics on stderr.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute a credential fingerprint locally.
    Fingerprint(commands::fingerprint::FingerprintArgs),
    /// Compute the content digest of a document.
    Digest(commands::digest::DigestArgs),
    /// Issue a credential for a document.
    Issue(commands::issue::IssueArgs),
    /// Show a stored credential record.
    Show(commands::show::ShowArgs),
    /// Verify a credential by id.
    Verify(commands::verify::VerifyArgs),
    /// Verify a credential by its document.
    VerifyDocument(commands::verify::VerifyDocumentArgs),
    /// Anchor a credential on the ledger.
    Anchor(commands::anchor::AnchorArgs),
    /// Query the status of a running node.
    Status(commands::status::StatusArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Fingerprint(args) => commands::fingerprint::run(args),
        Commands::Digest(args) => commands::digest::run(args),
        Commands::Issue(args) => commands::issue::run(args).await,
        Commands::Show(args) => commands::show::run(args).await,
        Commands::Verify(args) => commands::verify::run(args).await,
        Commands::VerifyDocument(args) => commands::verify::run_document(args).await,
        Commands::Anchor(args) => commands::anchor::run(args).await,
        Commands::Status(args) => commands::status::run(args).await,
    }
}
