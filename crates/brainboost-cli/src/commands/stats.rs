//! The `brainboost stats` command.

use anyhow::{anyhow, Result};
use comfy_table::{Cell, Table};

use brainboost_core::model::GameKind;
use brainboost_core::results::{RoundDetails, StoredRound};
use brainboost_core::traits::GameStore;

use super::Paths;

pub fn execute(paths: &Paths, username: String, limit: usize, format: String) -> Result<()> {
    let (_, manager) = paths.open()?;
    let store = manager.store();

    let user = store
        .find_user_by_name(username.trim())?
        .ok_or_else(|| anyhow!("no user named '{}'", username.trim()))?;
    let rounds = store.recent_rounds(user.id, limit)?;

    let mut levels = Vec::new();
    for game in GameKind::ALL {
        let level = store.find_game_level(user.id, game)?.map(|r| r.level);
        levels.push((game, level));
    }

    match format.as_str() {
        "json" => {
            let json = serde_json::json!({
                "username": user.username,
                "points": user.points,
                "language": user.language,
                "levels": levels
                    .iter()
                    .map(|(game, level)| serde_json::json!({ "game": game, "level": level }))
                    .collect::<Vec<_>>(),
                "recent_rounds": rounds,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        _ => {
            println!(
                "{} ({}): {} points",
                user.username, user.language, user.points
            );

            let mut table = Table::new();
            table.set_header(vec!["Game", "Level"]);
            for (game, level) in &levels {
                table.add_row(vec![
                    Cell::new(game),
                    Cell::new(level.map_or_else(|| "-".to_string(), |l| l.to_string())),
                ]);
            }
            println!("\n{table}");

            if rounds.is_empty() {
                println!("\nNo rounds played yet.");
            } else {
                println!("\n{}", rounds_table(&rounds));
            }
        }
    }

    Ok(())
}

fn rounds_table(rounds: &[StoredRound]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "Finished",
        "Game",
        "Levels",
        "Points",
        "Correct",
        "Wrong",
        "Time",
        "Details",
    ]);

    for round in rounds {
        let result = &round.result;
        let details = match &result.details {
            RoundDetails::ResultKeeper {
                range_min,
                range_max,
                steps,
            } => format!("{steps} steps, range {range_min}..={range_max}"),
            RoundDetails::AssociativeChaining {
                amt_words,
                skip_answers,
                memorization_time,
                language,
                ..
            } => format!(
                "{amt_words} words ({language}), {skip_answers} skipped, {memorization_time}s memorizing"
            ),
        };
        table.add_row(vec![
            Cell::new(round.finished_at.format("%Y-%m-%d %H:%M")),
            Cell::new(result.game()),
            Cell::new(format!("{} -> {}", result.started_level, result.finished_level)),
            Cell::new(format!("{:+}", result.points_earned)),
            Cell::new(result.correct_answers),
            Cell::new(result.wrong_answers),
            Cell::new(format!("{}s", result.duration)),
            Cell::new(details),
        ]);
    }

    table
}
