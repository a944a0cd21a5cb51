//! API key hashing command implementation.

use anyhow::{bail, Result};
use signals_core::hash_token;

use crate::cli::HashKeyArgs;

pub async fn run(args: HashKeyArgs) -> Result<()> {
    let token = args.token.trim();
    if token.is_empty() {
        bail!("API key must not be empty");
    }
    println!("{}", hash_token(token));
    Ok(())
}
