//! Finished-round snapshots handed to the persistence layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{GameKind, Language, RecordId, UserId};

/// Immutable record of one finished play, produced exactly once when the
/// play ends (success, defeat or time-up).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    pub points_earned: i64,
    pub started_level: u32,
    pub finished_level: u32,
    /// Wall-clock duration in seconds.
    pub duration: u32,
    pub correct_answers: u32,
    pub wrong_answers: u32,
    /// Game-specific fields.
    #[serde(flatten)]
    pub details: RoundDetails,
}

/// The per-game part of a [`RoundResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "game", rename_all = "snake_case")]
pub enum RoundDetails {
    ResultKeeper {
        range_min: i64,
        range_max: i64,
        steps: u32,
    },
    AssociativeChaining {
        words: Vec<String>,
        user_answers: Vec<String>,
        amt_words: u32,
        skip_answers: u32,
        /// Seconds spent memorizing before answering started.
        memorization_time: u32,
        language: Language,
    },
}

impl RoundResult {
    pub fn game(&self) -> GameKind {
        match self.details {
            RoundDetails::ResultKeeper { .. } => GameKind::ResultKeeper,
            RoundDetails::AssociativeChaining { .. } => GameKind::AssociativeChaining,
        }
    }

    /// Levels gained during the play.
    pub fn levels_gained(&self) -> u32 {
        self.finished_level.saturating_sub(self.started_level)
    }
}

/// A [`RoundResult`] as kept by a store: stamped with an id, its owner and
/// the time it was persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRound {
    pub id: Uuid,
    pub user_id: UserId,
    pub record_id: RecordId,
    pub finished_at: DateTime<Utc>,
    pub result: RoundResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattened_serde_uses_column_names() {
        let result = RoundResult {
            points_earned: 12,
            started_level: 2,
            finished_level: 3,
            duration: 60,
            correct_answers: 9,
            wrong_answers: 1,
            details: RoundDetails::ResultKeeper {
                range_min: 0,
                range_max: 15,
                steps: 9,
            },
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["game"], "result_keeper");
        assert_eq!(json["points_earned"], 12);
        assert_eq!(json["range_max"], 15);

        let back: RoundResult = serde_json::from_value(json).unwrap();
        assert_eq!(back.game(), GameKind::ResultKeeper);
        assert_eq!(back.levels_gained(), 1);
    }
}
