//! The `brainboost register` command.

use anyhow::Result;

use super::{parse_language, Paths};

pub fn execute(paths: &Paths, username: String, language: Option<String>) -> Result<()> {
    let (config, mut manager) = paths.open()?;
    let language = parse_language(language.as_deref(), config.language)?;

    let user = manager.register_user(&username, language)?;
    println!(
        "Registered {} (language: {}, points: {})",
        user.username, user.language, user.points
    );
    Ok(())
}
