//! The `brainboost play` commands.
//!
//! Both games read answers line by line from stdin. Closing stdin ends a
//! Result Keeper play early; the play so far is still recorded. The same
//! holds when the next round's chain cannot be generated.

use std::io::{self, BufRead, IsTerminal, Write};
use std::time::Instant;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

use brainboost_core::arithmetic::{ResultKeeper, ResultKeeperConfig, Turn};
use brainboost_core::model::{GameKind, PointsCategory};
use brainboost_core::recall::{parse_answer_line, Absence, AnswerTag, AssociativeChaining};
use brainboost_core::results::RoundResult;
use brainboost_core::session::{RoundOutcome, Session};
use brainboost_core::timer::{Countdown, Stopwatch};

use super::{parse_language, Paths};

pub fn result_keeper(paths: &Paths, username: String, seed: Option<u64>) -> Result<()> {
    let (config, mut manager) = paths.open()?;
    let mut out = io::stdout().lock();

    let session = manager.login_by_name(&username)?;
    greet(&mut out, session)?;
    let level = manager.get_level(GameKind::ResultKeeper)?;

    let game = start_result_keeper(level, &config.result_keeper, seed)?;

    let mut input = io::stdin().lock();
    let (game, duration) = drive_result_keeper(game, &mut input, &mut out)?;

    let result = game.into_result(duration);
    let outcome = manager.record_round(&result)?;
    print_outcome(&mut out, &result, &outcome)
}

/// Start a play, retrying with fresh entropy when chain generation gives up.
/// A fixed seed would fail the same way again, so it is not retried.
fn start_result_keeper(
    level: u32,
    config: &ResultKeeperConfig,
    seed: Option<u64>,
) -> Result<ResultKeeper> {
    const ATTEMPTS: u32 = 3;

    let mut attempt = 1;
    loop {
        let started = match seed {
            Some(seed) => ResultKeeper::start_seeded(level, config.clone(), seed),
            None => ResultKeeper::start(level, config.clone()),
        };
        match started {
            Err(e) if e.is_retryable() && seed.is_none() && attempt < ATTEMPTS => {
                tracing::warn!("{e}, retrying with a fresh seed");
                attempt += 1;
            }
            other => return other.context("failed to start Result Keeper"),
        }
    }
}

fn drive_result_keeper<R: BufRead, W: Write>(
    mut game: ResultKeeper,
    input: &mut R,
    out: &mut W,
) -> Result<(ResultKeeper, u32)> {
    let started = Instant::now();
    let mut countdown = Countdown::new(game.config().time_limit_secs);

    writeln!(
        out,
        "Result Keeper, level {}. Keep every result between 0 and {}.",
        game.level(),
        game.range_size()
    )?;
    writeln!(out, "{} lives, {} on the clock.\n", game.lives(), countdown)?;

    let mut prompt = game.prompt();
    loop {
        write!(out, "[{countdown}] {prompt}")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(out, "\nInput closed, ending play.")?;
            break;
        }

        let now = started.elapsed().as_secs() as u32;
        if countdown.advance(now.saturating_sub(countdown.elapsed())) {
            writeln!(out, "Time's up!")?;
            break;
        }

        let turn = match game.submit_text(&line) {
            Ok(turn) => turn,
            Err(e) if e.is_retryable() => {
                tracing::warn!("{e}, ending play");
                writeln!(out, "Could not build the next round, ending play.")?;
                break;
            }
            Err(e) => return Err(e.into()),
        };
        match turn {
            Turn::Answered {
                prompt: next,
                correct,
            } => {
                if correct {
                    writeln!(out, "Correct!")?;
                } else {
                    writeln!(out, "Wrong! Lives left: {}", game.lives())?;
                }
                prompt = next;
            }
            Turn::RoundComplete {
                prompt: next,
                level_up,
            } => {
                if level_up {
                    writeln!(out, "Round complete! Level up: {}", game.level())?;
                } else {
                    writeln!(out, "Round complete.")?;
                }
                prompt = next;
            }
            Turn::NotANumber { prompt: next } => {
                writeln!(out, "Please enter a whole number.")?;
                prompt = next;
            }
            Turn::Defeated => {
                let (left, op, right) = game.current_step();
                let answer = op.apply(left, right)?;
                writeln!(out, "Game over! {left} {op} {right} = {answer}")?;
                break;
            }
        }
    }

    Ok((game, countdown.elapsed()))
}

pub fn recall(
    paths: &Paths,
    username: String,
    seed: Option<u64>,
    language: Option<String>,
) -> Result<()> {
    let (config, mut manager) = paths.open()?;
    let mut out = io::stdout().lock();

    let session = manager.login_by_name(&username)?;
    greet(&mut out, session)?;
    let language = parse_language(language.as_deref(), session.language)?;
    let level = manager.get_level(GameKind::AssociativeChaining)?;

    let words = config.associative_chaining.word_list(language)?;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let game = AssociativeChaining::start(level, language, &words, &mut rng)
        .context("failed to start Associative Chaining")?;

    let clear_screen = io::stdout().is_terminal();
    let mut input = io::stdin().lock();
    let (game, duration) = drive_recall(game, &mut input, &mut out, clear_screen)?;

    let result = game.into_result(duration);
    let outcome = manager.record_round(&result)?;
    print_outcome(&mut out, &result, &outcome)
}

fn drive_recall<R: BufRead, W: Write>(
    mut game: AssociativeChaining,
    input: &mut R,
    out: &mut W,
    clear_screen: bool,
) -> Result<(AssociativeChaining, u32)> {
    let started = Instant::now();
    let mut watch = Stopwatch::new();

    writeln!(
        out,
        "Associative Chaining, level {} ({}). Memorize these {} words:\n",
        game.level(),
        game.language(),
        game.payload().len()
    )?;
    for (idx, word) in game.payload().iter().enumerate() {
        writeln!(out, "{:>3}. {word}", idx + 1)?;
    }
    write!(out, "\nPress Enter when you are ready.")?;
    out.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    watch.advance(started.elapsed().as_secs() as u32);
    game.set_memorization_time(watch.lap());

    if clear_screen {
        write!(out, "\x1b[2J\x1b[H")?;
    }
    write!(
        out,
        "\nType the words in order, separated by commas ('-' skips one): "
    )?;
    out.flush()?;

    line.clear();
    input.read_line(&mut line)?;
    let answers = parse_answer_line(&line);
    let sheet = game.submit(&answers)?;

    writeln!(out)?;
    for (idx, scored) in sheet.answers.iter().enumerate() {
        let answer = scored.answer.as_deref().unwrap_or("(none)");
        let expected = scored.expected.as_deref().unwrap_or("");
        let verdict = match scored.tag {
            AnswerTag::Exact => "exact".to_string(),
            AnswerTag::Misplaced => format!("misplaced, expected {expected}"),
            AnswerTag::Absent(Absence::Skipped) => format!("skipped, was {expected}"),
            AnswerTag::Absent(Absence::Missing) => format!("missing, was {expected}"),
            AnswerTag::Absent(Absence::Wrong) => format!("wrong, was {expected}"),
            AnswerTag::Absent(Absence::Extra) => "extra".to_string(),
        };
        writeln!(out, "{:>3}. {answer:<16} {verdict}", idx + 1)?;
    }
    writeln!(
        out,
        "\nExact: {}  Misplaced: {}  Wrong: {}  Skipped: {}  Missing: {}  Extra: {}",
        sheet.exact, sheet.misplaced, sheet.wrong, sheet.skipped, sheet.missing, sheet.extra
    )?;

    let total = started.elapsed().as_secs() as u32;
    watch.advance(total.saturating_sub(watch.elapsed()));
    Ok((game, watch.elapsed()))
}

fn greet<W: Write>(out: &mut W, session: &Session) -> Result<()> {
    writeln!(out, "Welcome {}! Points: {}", session.username, session.points)?;
    for bonus in &session.login_bonuses {
        let amount = bonus.fixed_points().unwrap_or(0);
        let label = match bonus {
            PointsCategory::DailyLogin => "Daily login bonus",
            PointsCategory::WeeklyLogin => "Weekly login bonus",
            other => other.label(),
        };
        writeln!(out, "{label}: +{amount}")?;
    }
    writeln!(out)?;
    Ok(())
}

fn print_outcome<W: Write>(out: &mut W, result: &RoundResult, outcome: &RoundOutcome) -> Result<()> {
    writeln!(
        out,
        "\nCorrect answers: {}  Wrong answers: {}  Time: {}s",
        result.correct_answers, result.wrong_answers, result.duration
    )?;
    writeln!(out, "Points earned: {:+}", result.points_earned)?;
    if outcome.first_play {
        let bonus = result.game().first_play_category();
        writeln!(
            out,
            "First play bonus: +{}",
            bonus.fixed_points().unwrap_or(0)
        )?;
    }
    if outcome.levels_gained > 0 {
        writeln!(
            out,
            "Level {} -> {}",
            result.started_level, outcome.level
        )?;
    }
    writeln!(
        out,
        "Total points: {}  {} level: {}",
        outcome.total_points,
        result.game(),
        outcome.level
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use brainboost_core::model::Language;
    use std::io::Cursor;

    #[test]
    fn defeat_after_three_wrong_answers() {
        let game = ResultKeeper::start_seeded(1, ResultKeeperConfig::default(), 3).unwrap();
        let mut input = Cursor::new("-1\nabc\n-1\n-1\n");
        let mut out = Vec::new();
        let (game, _) = drive_result_keeper(game, &mut input, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Please enter a whole number."));
        assert!(text.contains("Game over!"));
        assert!(game.is_finished());
        assert_eq!(game.lives(), 0);
    }

    #[test]
    fn closed_input_ends_play() {
        let game = ResultKeeper::start_seeded(1, ResultKeeperConfig::default(), 3).unwrap();
        let mut input = Cursor::new("");
        let mut out = Vec::new();
        let (game, _) = drive_result_keeper(game, &mut input, &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("Input closed"));
        assert_eq!(game.lives(), 3);
    }

    #[test]
    fn failed_rollover_ends_play_with_progress() {
        let config = ResultKeeperConfig {
            operators: vec![brainboost_core::arithmetic::Operator::Add],
            max_repairs: 0,
            ..ResultKeeperConfig::default()
        };
        let game = ResultKeeper::from_payload(
            1,
            config,
            vec![0, 1, 1, 1, 1, 1, 1, 1, 1, 1],
            StdRng::seed_from_u64(7),
        )
        .unwrap();
        let mut input = Cursor::new("1\n2\n3\n4\n5\n6\n7\n8\n9\n10\n");
        let mut out = Vec::new();
        let (game, _) = drive_result_keeper(game, &mut input, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Could not build the next round, ending play."));
        assert!(!text.contains("Round complete"));
        assert!(game.is_finished());

        let result = game.into_result(5);
        assert_eq!(result.finished_level, 2);
        assert_eq!(result.correct_answers, 9);
        assert_eq!(result.points_earned, 9);
    }

    #[test]
    fn recall_reports_every_position() {
        let game = AssociativeChaining::with_payload(
            1,
            Language::En,
            vec!["owl".into(), "fox".into(), "cat".into()],
        )
        .unwrap();
        let mut input = Cursor::new("\nowl, cat, -, emu\n");
        let mut out = Vec::new();
        let (game, _) = drive_recall(game, &mut input, &mut out, false).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("misplaced, expected fox"));
        assert!(text.contains("skipped, was cat"));
        assert!(text.contains("Extra: 1"));
        assert_eq!(game.ledger().points(), 2 + 1 - 1);
    }
}
