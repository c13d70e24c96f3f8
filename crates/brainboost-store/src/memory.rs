//! In-memory store, and the record tables the JSON-file store persists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use brainboost_core::model::{
    GameKind, GameRecord, Language, PointsCategory, RecordId, UserId, UserRecord,
};
use brainboost_core::results::{RoundResult, StoredRound};
use brainboost_core::traits::GameStore;

use crate::error::StoreError;

/// One persisted points award.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsEntry {
    pub user_id: UserId,
    pub amount: i64,
    pub category: PointsCategory,
    pub awarded_at: DateTime<Utc>,
}

/// One persisted login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginEntry {
    pub user_id: UserId,
    pub at: DateTime<Utc>,
}

/// Every table a store keeps. Serialized as a whole by the JSON-file store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreData {
    #[serde(default)]
    pub users: Vec<UserRecord>,
    #[serde(default)]
    pub games: Vec<GameRecord>,
    #[serde(default)]
    pub rounds: Vec<StoredRound>,
    #[serde(default)]
    pub points: Vec<PointsEntry>,
    #[serde(default)]
    pub logins: Vec<LoginEntry>,
}

impl StoreData {
    fn next_user_id(&self) -> UserId {
        self.users.iter().map(|u| u.id).max().unwrap_or(0) + 1
    }

    fn next_record_id(&self) -> RecordId {
        self.games.iter().map(|g| g.id).max().unwrap_or(0) + 1
    }

    fn user_mut(&mut self, id: UserId) -> Result<&mut UserRecord, StoreError> {
        self.users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(StoreError::UserNotFound(id))
    }

    pub fn find_user(&self, id: UserId) -> Option<&UserRecord> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn find_user_by_name(&self, username: &str) -> Option<&UserRecord> {
        self.users.iter().find(|u| u.username == username)
    }

    pub fn create_user(
        &mut self,
        username: &str,
        language: Language,
        created_at: DateTime<Utc>,
    ) -> Result<UserRecord, StoreError> {
        if self.find_user_by_name(username).is_some() {
            return Err(StoreError::UsernameTaken(username.to_string()));
        }
        let user = UserRecord {
            id: self.next_user_id(),
            username: username.to_string(),
            points: 0,
            language,
            created_at,
        };
        self.users.push(user.clone());
        Ok(user)
    }

    pub fn set_language(&mut self, user_id: UserId, language: Language) -> Result<(), StoreError> {
        self.user_mut(user_id)?.language = language;
        Ok(())
    }

    pub fn record_login(
        &mut self,
        user_id: UserId,
        at: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        self.user_mut(user_id)?;
        let previous = self
            .logins
            .iter()
            .filter(|l| l.user_id == user_id)
            .map(|l| l.at)
            .max();
        self.logins.push(LoginEntry { user_id, at });
        Ok(previous)
    }

    pub fn find_game_level(&self, user_id: UserId, game: GameKind) -> Option<&GameRecord> {
        self.games
            .iter()
            .find(|g| g.user_id == user_id && g.game == game)
    }

    pub fn create_game_level(
        &mut self,
        user_id: UserId,
        game: GameKind,
        level: u32,
    ) -> Result<GameRecord, StoreError> {
        self.user_mut(user_id)?;
        if self.find_game_level(user_id, game).is_some() {
            return Err(StoreError::DuplicateGameRecord { user_id, game });
        }
        let record = GameRecord {
            id: self.next_record_id(),
            user_id,
            game,
            level,
        };
        self.games.push(record.clone());
        Ok(record)
    }

    pub fn update_game_level(&mut self, record_id: RecordId, level: u32) -> Result<(), StoreError> {
        let record = self
            .games
            .iter_mut()
            .find(|g| g.id == record_id)
            .ok_or(StoreError::RecordNotFound(record_id))?;
        record.level = level;
        Ok(())
    }

    pub fn insert_round_result(
        &mut self,
        user_id: UserId,
        record_id: RecordId,
        result: &RoundResult,
        finished_at: DateTime<Utc>,
    ) -> Result<StoredRound, StoreError> {
        self.user_mut(user_id)?;
        if !self.games.iter().any(|g| g.id == record_id) {
            return Err(StoreError::RecordNotFound(record_id));
        }
        let stored = StoredRound {
            id: Uuid::new_v4(),
            user_id,
            record_id,
            finished_at,
            result: result.clone(),
        };
        self.rounds.push(stored.clone());
        Ok(stored)
    }

    pub fn round_count(&self, record_id: RecordId) -> usize {
        self.rounds.iter().filter(|r| r.record_id == record_id).count()
    }

    /// Rounds of a user, newest first.
    pub fn recent_rounds(&self, user_id: UserId, limit: usize) -> Vec<StoredRound> {
        let mut rounds: Vec<StoredRound> = self
            .rounds
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        // reversed first so ties stay newest-first through the stable sort
        rounds.reverse();
        rounds.sort_by(|a, b| b.finished_at.cmp(&a.finished_at));
        rounds.truncate(limit);
        rounds
    }

    pub fn add_points(
        &mut self,
        user_id: UserId,
        amount: i64,
        category: PointsCategory,
        awarded_at: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        let user = self.user_mut(user_id)?;
        user.points += amount;
        let total = user.points;
        self.points.push(PointsEntry {
            user_id,
            amount,
            category,
            awarded_at,
        });
        Ok(total)
    }

    /// Points entries of a user, oldest first.
    pub fn points_history(&self, user_id: UserId) -> impl Iterator<Item = &PointsEntry> {
        self.points.iter().filter(move |p| p.user_id == user_id)
    }
}

/// A store that lives only as long as the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: StoreData,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_data(data: StoreData) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &StoreData {
        &self.data
    }
}

impl GameStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn find_user(&self, id: UserId) -> anyhow::Result<Option<UserRecord>> {
        Ok(self.data.find_user(id).cloned())
    }

    fn find_user_by_name(&self, username: &str) -> anyhow::Result<Option<UserRecord>> {
        Ok(self.data.find_user_by_name(username).cloned())
    }

    fn create_user(
        &mut self,
        username: &str,
        language: Language,
        created_at: DateTime<Utc>,
    ) -> anyhow::Result<UserRecord> {
        Ok(self.data.create_user(username, language, created_at)?)
    }

    fn set_language(&mut self, user_id: UserId, language: Language) -> anyhow::Result<()> {
        Ok(self.data.set_language(user_id, language)?)
    }

    fn record_login(
        &mut self,
        user_id: UserId,
        at: DateTime<Utc>,
    ) -> anyhow::Result<Option<DateTime<Utc>>> {
        Ok(self.data.record_login(user_id, at)?)
    }

    fn find_game_level(
        &self,
        user_id: UserId,
        game: GameKind,
    ) -> anyhow::Result<Option<GameRecord>> {
        Ok(self.data.find_game_level(user_id, game).cloned())
    }

    fn create_game_level(
        &mut self,
        user_id: UserId,
        game: GameKind,
        level: u32,
    ) -> anyhow::Result<GameRecord> {
        Ok(self.data.create_game_level(user_id, game, level)?)
    }

    fn update_game_level(&mut self, record_id: RecordId, level: u32) -> anyhow::Result<()> {
        Ok(self.data.update_game_level(record_id, level)?)
    }

    fn insert_round_result(
        &mut self,
        user_id: UserId,
        record_id: RecordId,
        result: &RoundResult,
    ) -> anyhow::Result<StoredRound> {
        Ok(self
            .data
            .insert_round_result(user_id, record_id, result, Utc::now())?)
    }

    fn round_count(&self, record_id: RecordId) -> anyhow::Result<usize> {
        Ok(self.data.round_count(record_id))
    }

    fn recent_rounds(&self, user_id: UserId, limit: usize) -> anyhow::Result<Vec<StoredRound>> {
        Ok(self.data.recent_rounds(user_id, limit))
    }

    fn add_points(
        &mut self,
        user_id: UserId,
        amount: i64,
        category: PointsCategory,
    ) -> anyhow::Result<i64> {
        Ok(self.data.add_points(user_id, amount, category, Utc::now())?)
    }
}
