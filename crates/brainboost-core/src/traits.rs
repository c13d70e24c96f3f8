//! The persistence collaborator the session manager talks to.
//!
//! Implemented by the `brainboost-store` crate. The core treats every method as
//! an opaque synchronous call and does not care how records are stored.

use chrono::{DateTime, Utc};

use crate::model::{GameKind, GameRecord, Language, PointsCategory, RecordId, UserId, UserRecord};
use crate::results::{RoundResult, StoredRound};

/// Storage for users, per-game levels, round history and points.
pub trait GameStore {
    /// Human-readable backend name (e.g. "memory").
    fn name(&self) -> &str;

    // -- users --------------------------------------------------------------

    fn find_user(&self, id: UserId) -> anyhow::Result<Option<UserRecord>>;

    fn find_user_by_name(&self, username: &str) -> anyhow::Result<Option<UserRecord>>;

    /// Create a user with zero points. Fails when the username is taken.
    fn create_user(
        &mut self,
        username: &str,
        language: Language,
        created_at: DateTime<Utc>,
    ) -> anyhow::Result<UserRecord>;

    fn set_language(&mut self, user_id: UserId, language: Language) -> anyhow::Result<()>;

    /// Record a login and return the previous one, if any.
    fn record_login(
        &mut self,
        user_id: UserId,
        at: DateTime<Utc>,
    ) -> anyhow::Result<Option<DateTime<Utc>>>;

    // -- levels -------------------------------------------------------------

    fn find_game_level(&self, user_id: UserId, game: GameKind)
        -> anyhow::Result<Option<GameRecord>>;

    fn create_game_level(
        &mut self,
        user_id: UserId,
        game: GameKind,
        level: u32,
    ) -> anyhow::Result<GameRecord>;

    fn update_game_level(&mut self, record_id: RecordId, level: u32) -> anyhow::Result<()>;

    // -- rounds -------------------------------------------------------------

    fn insert_round_result(
        &mut self,
        user_id: UserId,
        record_id: RecordId,
        result: &RoundResult,
    ) -> anyhow::Result<StoredRound>;

    /// Number of rounds persisted against a game record.
    fn round_count(&self, record_id: RecordId) -> anyhow::Result<usize>;

    /// Most recent rounds of a user, newest first.
    fn recent_rounds(&self, user_id: UserId, limit: usize) -> anyhow::Result<Vec<StoredRound>>;

    // -- points -------------------------------------------------------------

    /// Persist a points entry and return the user's new total.
    fn add_points(
        &mut self,
        user_id: UserId,
        amount: i64,
        category: PointsCategory,
    ) -> anyhow::Result<i64>;
}
