//! `chaincred fingerprint`: compute a credential fingerprint locally.

use anyhow::Context;
use clap::Args;
use std::path::PathBuf;

use chaincred_core::SourceFields;
use chaincred_crypto::{content_digest, generate, generate_from};

#[derive(Args, Debug)]
pub struct FingerprintArgs {
    /// Identity of the credential holder.
    #[arg(short, long)]
    pub subject: String,

    /// Identity of the issuing institute.
    #[arg(short, long)]
    pub issuer: String,

    /// Hex SHA-256 digest of the document.
    #[arg(short, long, required_unless_present = "document", conflicts_with = "document")]
    pub digest: Option<String>,

    /// Document to digest instead of passing --digest.
    #[arg(long)]
    pub document: Option<PathBuf>,

    /// Issuance timestamp (RFC 3339 or YYYY-MM-DD).
    #[arg(short = 't', long)]
    pub issued_at: String,

    /// Hash the fields exactly as given, without canonicalizing them.
    #[arg(long)]
    pub raw: bool,
}

pub fn compute(args: &FingerprintArgs) -> anyhow::Result<String> {
    let digest = match (&args.digest, &args.document) {
        (Some(digest), _) => digest.clone(),
        (None, Some(path)) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("reading {}", path.display()))?;
            content_digest(&bytes).to_string()
        }
        (None, None) => anyhow::bail!("either --digest or --document is required"),
    };

    if args.raw {
        return Ok(generate(&args.subject, &args.issuer, &digest, &args.issued_at)?);
    }
    let fields = SourceFields::parse(&args.subject, &args.issuer, &digest, &args.issued_at)?;
    tracing::debug!(issued_at = %fields.issued_at, "fields canonicalized");
    Ok(generate_from(&fields)?)
}

pub fn run(args: &FingerprintArgs) -> anyhow::Result<()> {
    println!("{}", compute(args)?);
    Ok(())
}
