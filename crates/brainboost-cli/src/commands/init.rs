//! The `brainboost init` command.

use anyhow::Result;

use brainboost_store::config::DEFAULT_CONFIG_TOML;

pub fn execute() -> Result<()> {
    if std::path::Path::new("brainboost.toml").exists() {
        println!("brainboost.toml already exists, skipping.");
    } else {
        std::fs::write("brainboost.toml", DEFAULT_CONFIG_TOML)?;
        println!("Created brainboost.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: brainboost register --username <name>");
    println!("  2. Run: brainboost play result-keeper --username <name>");
    println!("  3. Run: brainboost play recall --username <name>");

    Ok(())
}
