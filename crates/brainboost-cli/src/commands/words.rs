//! The `brainboost words` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use brainboost_core::recall::{MAX_SIZE, START_SIZE};
use brainboost_core::words::{validate_word_text, LevelSupport, WordList};

pub fn execute(file: PathBuf) -> Result<()> {
    let content = std::fs::read_to_string(&file)
        .with_context(|| format!("failed to read word list: {}", file.display()))?;

    let warnings = validate_word_text(&content);
    for w in &warnings {
        println!("  line {}: WARNING: {}", w.line, w.message);
    }

    let list = WordList::from_text(&content);
    println!("{}: {} distinct nouns", file.display(), list.len());
    match list.level_support() {
        LevelSupport::All => println!("Supports every level ({MAX_SIZE} nouns per play at most)."),
        LevelSupport::UpTo(level) => println!("Supports levels 1 to {level}."),
        LevelSupport::None => println!("Too short: level 1 needs {START_SIZE} nouns."),
    }

    if !warnings.is_empty() {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
