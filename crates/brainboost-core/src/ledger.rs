//! Per-round point accounting.

use serde::{Deserialize, Serialize};

/// Points and answer counters for one play of one game.
///
/// `points` changes only through [`ScoringLedger::update_points`], always by
/// exactly `level * bonus` in either direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringLedger {
    level: u32,
    points: i64,
    correct_answers: u32,
    wrong_answers: u32,
    answers_status: Vec<bool>,
}

impl ScoringLedger {
    pub fn new(level: u32) -> Self {
        Self {
            level,
            points: 0,
            correct_answers: 0,
            wrong_answers: 0,
            answers_status: Vec::new(),
        }
    }

    /// Award (`is_wrong == false`) or deduct `level * bonus` points and bump
    /// the matching counter.
    pub fn update_points(&mut self, is_wrong: bool, bonus: u32) {
        let delta = i64::from(self.level) * i64::from(bonus);
        if is_wrong {
            self.points -= delta;
            self.wrong_answers += 1;
        } else {
            self.points += delta;
            self.correct_answers += 1;
        }
    }

    /// Count a wrong answer without touching points.
    pub fn record_missing(&mut self) {
        self.wrong_answers += 1;
    }

    /// Append an answer outcome to the current round's status list.
    pub fn record_status(&mut self, correct: bool) {
        self.answers_status.push(correct);
    }

    /// True when every answer recorded this round was correct.
    pub fn all_correct(&self) -> bool {
        self.answers_status.iter().all(|&ok| ok)
    }

    pub fn clear_status(&mut self) {
        self.answers_status.clear();
    }

    pub fn set_level(&mut self, level: u32) {
        self.level = level;
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn points(&self) -> i64 {
        self.points
    }

    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    pub fn wrong_answers(&self) -> u32 {
        self.wrong_answers
    }

    pub fn answers_status(&self) -> &[bool] {
        &self.answers_status
    }
}
