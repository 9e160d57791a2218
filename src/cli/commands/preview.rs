//! Preview command implementation.

use std::path::Path;

use colored::Colorize;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::loader;
use crate::sync::{self, transform};

/// Print the Notion properties a recipe file would be written with.
///
/// Nothing is sent to Notion.
///
/// # Errors
///
/// Returns an error if the file cannot be loaded or the recipe cannot be
/// transformed.
pub fn execute(file: &Path, config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = Config::load(config_path)?;
    let record = loader::load_file(file)?;
    let hash_ok = sync::verify(&record)?;
    let target = transform(&record).map_err(|e| Error::Sync(e.into()))?;
    let properties = target.to_properties(&config.properties);

    if json {
        let output = serde_json::json!({
            "file": file.display().to_string(),
            "identity_key": target.identity_key,
            "hash_verified": hash_ok,
            "properties": properties,
        });
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("{} {}", "Recipe:".cyan().bold(), target.title.bold());
    println!("{} {}", "Hash:".cyan().bold(), target.identity_key.dimmed());
    if !hash_ok {
        println!("{}", "Warning: stored hash does not match the recipe content".yellow());
    }
    println!();
    println!("{}", serde_json::to_string_pretty(&properties)?);
    Ok(())
}
