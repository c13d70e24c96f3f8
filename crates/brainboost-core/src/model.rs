//! Core data model types for brainboost.
//!
//! These are the identifiers, enums and persisted record shapes that the
//! generators, the session manager and the stores share.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a persisted user.
pub type UserId = i64;

/// Identifier of a persisted per-user game record.
pub type RecordId = i64;

/// The mini-games. Closed set: every lookup over it is an exhaustive match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    /// Chained arithmetic: keep the running result in range.
    ResultKeeper,
    /// Noun memorization and ordered recall.
    AssociativeChaining,
}

impl GameKind {
    /// Every game, in menu order.
    pub const ALL: [GameKind; 2] = [GameKind::ResultKeeper, GameKind::AssociativeChaining];

    /// Points category for the dynamic per-round points.
    pub fn round_category(self) -> PointsCategory {
        match self {
            GameKind::ResultKeeper => PointsCategory::GameResultKeeper,
            GameKind::AssociativeChaining => PointsCategory::GameAssociativeChaining,
        }
    }

    /// Points category for the one-off bonus on the first finished play.
    pub fn first_play_category(self) -> PointsCategory {
        match self {
            GameKind::ResultKeeper => PointsCategory::FirstResultKeeper,
            GameKind::AssociativeChaining => PointsCategory::FirstAssociativeChaining,
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameKind::ResultKeeper => write!(f, "Result Keeper"),
            GameKind::AssociativeChaining => write!(f, "Associative Chaining"),
        }
    }
}

impl FromStr for GameKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', ' '], "_").as_str() {
            "result_keeper" | "arithmetic" => Ok(GameKind::ResultKeeper),
            "associative_chaining" | "recall" => Ok(GameKind::AssociativeChaining),
            other => Err(format!("unknown game: {other}")),
        }
    }
}

/// Word-list languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Pl,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::En => write!(f, "en"),
            Language::Pl => write!(f, "pl"),
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "pl" | "polish" => Ok(Language::Pl),
            other => Err(format!("unknown language: {other}")),
        }
    }
}

/// Why points were awarded. Each award is persisted under one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointsCategory {
    CreateAccount,
    DailyLogin,
    WeeklyLogin,
    GameResultKeeper,
    FirstResultKeeper,
    GameAssociativeChaining,
    FirstAssociativeChaining,
}

impl PointsCategory {
    /// Fixed award for this category, or `None` when the amount is computed
    /// by a round.
    pub fn fixed_points(self) -> Option<i64> {
        match self {
            PointsCategory::CreateAccount => Some(10),
            PointsCategory::DailyLogin => Some(5),
            PointsCategory::WeeklyLogin => Some(10),
            PointsCategory::FirstResultKeeper => Some(10),
            PointsCategory::FirstAssociativeChaining => Some(10),
            PointsCategory::GameResultKeeper | PointsCategory::GameAssociativeChaining => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PointsCategory::CreateAccount => "Create Account",
            PointsCategory::DailyLogin => "Daily",
            PointsCategory::WeeklyLogin => "Weekly",
            PointsCategory::GameResultKeeper => "Game Result Keeper",
            PointsCategory::FirstResultKeeper => "First Game Result Keeper",
            PointsCategory::GameAssociativeChaining => "Game Associative Chaining",
            PointsCategory::FirstAssociativeChaining => "First Game Associative Chaining",
        }
    }
}

/// A persisted user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    /// Cumulative points over every category.
    pub points: i64,
    #[serde(default)]
    pub language: Language,
    pub created_at: DateTime<Utc>,
}

/// A persisted per-user, per-game level record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: RecordId,
    pub user_id: UserId,
    pub game: GameKind,
    pub level: u32,
}
