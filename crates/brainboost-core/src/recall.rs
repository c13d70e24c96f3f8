//! Associative Chaining: memorize a list of nouns, then recall it in order.
//!
//! Recall is single-shot. The whole answer list is scored position by
//! position against the payload:
//!
//! | answer                              | tag                  | points        |
//! |-------------------------------------|----------------------|---------------|
//! | beyond the payload length           | absent (extra)       | `-level`      |
//! | right noun, right position          | exact                | `+2 * level`  |
//! | `-`                                 | absent (skipped)     | none          |
//! | noun from the payload, elsewhere    | misplaced            | `+level`      |
//! | nothing given for this position     | absent (missing)     | none, counted wrong |
//! | anything else                       | absent (wrong)       | `-level`      |

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::ledger::ScoringLedger;
use crate::model::Language;
use crate::results::{RoundDetails, RoundResult};
use crate::words::WordList;

/// Payload size at level 1.
pub const START_SIZE: usize = 10;

/// Payload size cap.
pub const MAX_SIZE: usize = 100;

/// What a player types to skip a position.
pub const SKIP_MARK: &str = "-";

/// Nouns to memorize at `level`: `min(100, 10 + level - 1)`.
pub fn payload_size(level: u32) -> usize {
    (START_SIZE - 1)
        .saturating_add(level as usize)
        .min(MAX_SIZE)
}

/// Split a typed answer line (`"dog, -, fan"`) into answers. An empty line
/// gives no answers at all.
pub fn parse_answer_line(line: &str) -> Vec<String> {
    if line.trim().is_empty() {
        return Vec::new();
    }
    line.split(',').map(|a| a.trim().to_string()).collect()
}

/// How one answer position was judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerTag {
    Exact,
    Misplaced,
    Absent(Absence),
}

/// The ways an answer position can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Absence {
    /// A noun that is not in the payload.
    Wrong,
    /// The explicit skip mark.
    Skipped,
    /// No answer for this position.
    Missing,
    /// More answers than payload nouns.
    Extra,
}

/// One judged answer position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredAnswer {
    /// Normalized answer, `None` when the player gave none.
    pub answer: Option<String>,
    /// Payload noun at this position, `None` past the payload.
    pub expected: Option<String>,
    pub tag: AnswerTag,
}

/// Every judged position plus per-tag counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSheet {
    pub answers: Vec<ScoredAnswer>,
    pub exact: u32,
    pub misplaced: u32,
    pub wrong: u32,
    pub skipped: u32,
    pub missing: u32,
    pub extra: u32,
}

impl ScoreSheet {
    /// Net points the sheet is worth at `level`.
    pub fn point_delta(&self, level: u32) -> i64 {
        let level = i64::from(level);
        level * (2 * i64::from(self.exact) + i64::from(self.misplaced))
            - level * i64::from(self.wrong + self.extra)
    }

    /// True when every payload noun was recalled at its position.
    pub fn is_perfect(&self, payload_len: usize) -> bool {
        payload_len > 0 && self.exact as usize == payload_len
    }
}

fn normalize(answer: &str) -> String {
    answer.trim().to_lowercase()
}

/// Judge `answers` against `payload`. Pure: the same inputs always give the
/// same sheet.
pub fn score_answers<S: AsRef<str>>(payload: &[String], answers: &[S]) -> ScoreSheet {
    let mut sheet = ScoreSheet::default();
    let len = payload.len().max(answers.len());

    for idx in 0..len {
        let answer = answers.get(idx).map(|a| normalize(a.as_ref()));
        let expected = payload.get(idx).cloned();

        let tag = match (&answer, &expected) {
            (_, None) => {
                sheet.extra += 1;
                AnswerTag::Absent(Absence::Extra)
            }
            (Some(a), Some(e)) if a == e => {
                sheet.exact += 1;
                AnswerTag::Exact
            }
            (Some(a), Some(_)) if a == SKIP_MARK => {
                sheet.skipped += 1;
                AnswerTag::Absent(Absence::Skipped)
            }
            (Some(a), Some(_)) if payload.contains(a) => {
                sheet.misplaced += 1;
                AnswerTag::Misplaced
            }
            (None, Some(_)) => {
                sheet.missing += 1;
                AnswerTag::Absent(Absence::Missing)
            }
            (Some(_), Some(_)) => {
                sheet.wrong += 1;
                AnswerTag::Absent(Absence::Wrong)
            }
        };

        sheet.answers.push(ScoredAnswer {
            answer,
            expected,
            tag,
        });
    }

    sheet
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Memorizing,
    Scored,
}

/// An Associative Chaining play: one payload, one answer submission.
#[derive(Debug, Clone)]
pub struct AssociativeChaining {
    level: u32,
    level_start: u32,
    language: Language,
    payload: Vec<String>,
    user_answers: Vec<String>,
    skip_answers: u32,
    memorization_time: u32,
    ledger: ScoringLedger,
    phase: Phase,
}

impl AssociativeChaining {
    /// Start a play at `level`, sampling the payload from `words`.
    pub fn start<R: Rng + ?Sized>(
        level: u32,
        language: Language,
        words: &WordList,
        rng: &mut R,
    ) -> Result<Self, GameError> {
        if level == 0 {
            return Err(GameError::PreconditionViolation(
                "level must be at least 1".into(),
            ));
        }
        let payload = words.sample(payload_size(level), rng)?;
        Self::with_payload(level, language, payload)
    }

    /// Start a play with a fixed payload.
    pub fn with_payload(
        level: u32,
        language: Language,
        payload: Vec<String>,
    ) -> Result<Self, GameError> {
        if level == 0 {
            return Err(GameError::PreconditionViolation(
                "level must be at least 1".into(),
            ));
        }
        if payload.is_empty() {
            return Err(GameError::PreconditionViolation(
                "payload must contain at least one noun".into(),
            ));
        }

        Ok(Self {
            level,
            level_start: level,
            language,
            payload: payload.iter().map(|w| normalize(w)).collect(),
            user_answers: Vec::new(),
            skip_answers: 0,
            memorization_time: 0,
            ledger: ScoringLedger::new(level),
            phase: Phase::Memorizing,
        })
    }

    /// Nouns to memorize, in order.
    pub fn payload(&self) -> &[String] {
        &self.payload
    }

    /// Record how long the player looked at the payload before answering.
    pub fn set_memorization_time(&mut self, secs: u32) {
        self.memorization_time = secs;
    }

    /// Score the player's answers. Allowed once per play.
    pub fn submit<S: AsRef<str>>(&mut self, answers: &[S]) -> Result<ScoreSheet, GameError> {
        if self.phase == Phase::Scored {
            return Err(GameError::PreconditionViolation(
                "answers were already submitted for this play".into(),
            ));
        }

        let sheet = score_answers(&self.payload, answers);
        for scored in &sheet.answers {
            match scored.tag {
                AnswerTag::Exact => self.ledger.update_points(false, 2),
                AnswerTag::Misplaced => self.ledger.update_points(false, 1),
                AnswerTag::Absent(Absence::Skipped) => self.skip_answers += 1,
                AnswerTag::Absent(Absence::Missing) => self.ledger.record_missing(),
                AnswerTag::Absent(Absence::Wrong) | AnswerTag::Absent(Absence::Extra) => {
                    self.ledger.update_points(true, 1)
                }
            }
        }

        self.user_answers = answers.iter().map(|a| normalize(a.as_ref())).collect();
        if sheet.is_perfect(self.payload.len()) {
            self.level += 1;
        }
        self.phase = Phase::Scored;
        Ok(sheet)
    }

    /// True once answers have been scored.
    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Scored
    }

    /// Project the finished play into its persisted shape. Consumes the play.
    pub fn into_result(self, duration_secs: u32) -> RoundResult {
        RoundResult {
            points_earned: self.ledger.points(),
            started_level: self.level_start,
            finished_level: self.level,
            duration: duration_secs,
            correct_answers: self.ledger.correct_answers(),
            wrong_answers: self.ledger.wrong_answers(),
            details: RoundDetails::AssociativeChaining {
                amt_words: self.payload.len() as u32,
                words: self.payload,
                user_answers: self.user_answers,
                skip_answers: self.skip_answers,
                memorization_time: self.memorization_time,
                language: self.language,
            },
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn level_start(&self) -> u32 {
        self.level_start
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Payload size for the starting level.
    pub fn size(&self) -> usize {
        payload_size(self.level_start)
    }

    pub fn skip_answers(&self) -> u32 {
        self.skip_answers
    }

    pub fn ledger(&self) -> &ScoringLedger {
        &self.ledger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn abc(level: u32) -> AssociativeChaining {
        AssociativeChaining::with_payload(
            level,
            Language::En,
            vec!["a".into(), "b".into(), "c".into()],
        )
        .unwrap()
    }

    #[test]
    fn payload_size_by_level() {
        for (level, expected) in [
            (1, 10),
            (2, 11),
            (20, 29),
            (90, 99),
            (91, 100),
            (92, 100),
            (200, 100),
            (u32::MAX, 100),
        ] {
            assert_eq!(payload_size(level), expected, "level {level}");
        }
    }

    #[test]
    fn payload_size_is_monotonic() {
        let mut previous = 0;
        for level in 1..300 {
            let size = payload_size(level);
            assert!(size >= previous);
            assert!(size <= MAX_SIZE);
            previous = size;
        }
    }

    #[test]
    fn start_samples_level_sized_payload() {
        let words = WordList::builtin(Language::En);
        let mut rng = StdRng::seed_from_u64(5);
        for level in [1, 2, 50, 91, 200] {
            let game = AssociativeChaining::start(level, Language::En, &words, &mut rng).unwrap();
            assert_eq!(game.payload().len(), payload_size(level));
            assert_eq!(game.size(), payload_size(level));
        }
    }

    #[test]
    fn perfect_recall_scores_double_and_levels_up() {
        let mut game = abc(1);
        let sheet = game.submit(&["a", "b", "c"]).unwrap();
        assert!(sheet.answers.iter().all(|s| s.tag == AnswerTag::Exact));
        assert_eq!(game.ledger().points(), 6);
        assert_eq!(game.level(), 2);
    }

    #[test]
    fn exact_points_scale_with_level() {
        let mut game = abc(3);
        game.submit(&["a", "b", "c"]).unwrap();
        assert_eq!(game.ledger().points(), 3 * 2 * 3);
    }

    #[test]
    fn rotated_recall_is_misplaced() {
        let mut game = abc(1);
        let sheet = game.submit(&["b", "c", "a"]).unwrap();
        assert!(sheet.answers.iter().all(|s| s.tag == AnswerTag::Misplaced));
        assert_eq!(game.ledger().points(), 3);
        assert_eq!(game.level(), 1);
    }

    #[test]
    fn skips_are_absent_without_points() {
        let mut game = abc(1);
        let sheet = game.submit(&["-", "-", "-"]).unwrap();
        assert!(sheet
            .answers
            .iter()
            .all(|s| s.tag == AnswerTag::Absent(Absence::Skipped)));
        assert_eq!(game.ledger().points(), 0);
        assert_eq!(game.skip_answers(), 3);
        assert_eq!(game.ledger().wrong_answers(), 0);
    }

    #[test]
    fn unknown_nouns_are_penalized() {
        let mut game = AssociativeChaining::with_payload(
            1,
            Language::En,
            vec!["d".into(), "e".into(), "f".into()],
        )
        .unwrap();
        let sheet = game.submit(&["a", "b", "c"]).unwrap();
        assert_eq!(sheet.wrong, 3);
        assert_eq!(game.ledger().points(), -3);
        assert_eq!(game.ledger().wrong_answers(), 3);
    }

    #[test]
    fn mixed_answers_get_mixed_tags() {
        let mut game = AssociativeChaining::with_payload(
            1,
            Language::En,
            ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect(),
        )
        .unwrap();
        let sheet = game.submit(&["z", "c", "b", "d"]).unwrap();
        let tags: Vec<_> = sheet.answers.iter().map(|s| s.tag).collect();
        assert_eq!(
            tags,
            vec![
                AnswerTag::Absent(Absence::Wrong),
                AnswerTag::Misplaced,
                AnswerTag::Misplaced,
                AnswerTag::Exact,
            ]
        );
        assert_eq!(game.ledger().points(), -1 + 1 + 1 + 2);
    }

    #[test]
    fn short_answer_list_counts_missing_as_wrong_without_points() {
        let mut game = abc(1);
        let sheet = game.submit(&["a"]).unwrap();
        assert_eq!(sheet.exact, 1);
        assert_eq!(sheet.missing, 2);
        assert_eq!(sheet.answers[1].answer, None);
        assert_eq!(game.ledger().points(), 2);
        assert_eq!(game.ledger().wrong_answers(), 2);
        assert_eq!(game.skip_answers(), 0);
    }

    #[test]
    fn extra_answers_are_penalized() {
        let mut game = abc(2);
        let sheet = game.submit(&["a", "b", "c", "a", "-"]).unwrap();
        assert_eq!(sheet.extra, 2);
        assert_eq!(sheet.answers[3].expected, None);
        assert_eq!(game.ledger().points(), 2 * 2 * 3 - 2 * 2);
    }

    #[test]
    fn answers_are_normalized() {
        let mut game = abc(1);
        let sheet = game.submit(&[" A ", "B", "c"]).unwrap();
        assert_eq!(sheet.exact, 3);
    }

    #[test]
    fn second_submission_is_rejected() {
        let mut game = abc(1);
        game.submit(&["a"]).unwrap();
        assert!(matches!(
            game.submit(&["a"]),
            Err(GameError::PreconditionViolation(_))
        ));
    }

    #[test]
    fn rescoring_is_idempotent() {
        let payload: Vec<String> = ["owl", "fox", "cat", "dog"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let answers = ["fox", "-", "cat", "emu", "owl"];
        let first = score_answers(&payload, &answers);
        let second = score_answers(&payload, &answers);
        assert_eq!(first, second);
        assert_eq!(first.point_delta(4), second.point_delta(4));
    }

    #[test]
    fn point_delta_matches_ledger() {
        let mut game = abc(3);
        let sheet = game.submit(&["c", "b", "x", "y"]).unwrap();
        assert_eq!(sheet.point_delta(3), game.ledger().points());
    }

    #[test]
    fn parse_answer_line_splits_and_trims() {
        assert_eq!(parse_answer_line("dog, -,fan "), vec!["dog", "-", "fan"]);
        assert!(parse_answer_line("   ").is_empty());
    }

    #[test]
    fn projection_carries_words_and_answers() {
        let mut game = abc(1);
        game.set_memorization_time(12);
        game.submit(&["a", "-", "q"]).unwrap();
        let result = game.into_result(30);

        assert_eq!(result.started_level, 1);
        assert_eq!(result.finished_level, 1);
        assert_eq!(result.duration, 30);
        assert_eq!(result.correct_answers, 1);
        assert_eq!(result.wrong_answers, 1);
        assert_eq!(result.points_earned, 2 - 1);
        match result.details {
            RoundDetails::AssociativeChaining {
                words,
                user_answers,
                amt_words,
                skip_answers,
                memorization_time,
                language,
            } => {
                assert_eq!(words, vec!["a", "b", "c"]);
                assert_eq!(user_answers, vec!["a", "-", "q"]);
                assert_eq!(amt_words, 3);
                assert_eq!(skip_answers, 1);
                assert_eq!(memorization_time, 12);
                assert_eq!(language, Language::En);
            }
            other => panic!("unexpected details: {other:?}"),
        }
    }
}
