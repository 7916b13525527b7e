//! Config command implementation.

use anyhow::Result;

use crate::config::Config;

pub async fn run(config: &Config) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
