//! `chaincred digest`: compute the content digest of a document.

use anyhow::Context;
use clap::Args;
use std::path::PathBuf;

use chaincred_crypto::content_digest;

#[derive(Args, Debug)]
pub struct DigestArgs {
    /// Document to hash.
    pub path: PathBuf,
}

pub fn run(args: &DigestArgs) -> anyhow::Result<()> {
    let bytes =
        std::fs::read(&args.path).with_context(|| format!("reading {}", args.path.display()))?;
    println!("{}", content_digest(&bytes));
    Ok(())
}
