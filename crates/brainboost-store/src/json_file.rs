//! A store persisted as one pretty-printed JSON document.
//!
//! The whole document is rewritten after every mutation. Good enough for a
//! single local player; not meant for concurrent writers.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use brainboost_core::model::{
    GameKind, GameRecord, Language, PointsCategory, RecordId, UserId, UserRecord,
};
use brainboost_core::results::{RoundResult, StoredRound};
use brainboost_core::traits::GameStore;

use crate::memory::StoreData;

/// A [`GameStore`] backed by a JSON file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    data: StoreData,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store; the file
    /// is created on the first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = if path.exists() {
            load_json(&path)?
        } else {
            tracing::debug!("{} does not exist yet, starting empty", path.display());
            StoreData::default()
        };
        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn data(&self) -> &StoreData {
        &self.data
    }

    /// Apply `op` to a copy of the tables and keep it only once it is on
    /// disk, so a failed op or save leaves memory and file as they were.
    fn write<T>(&mut self, op: impl FnOnce(&mut StoreData) -> Result<T>) -> Result<T> {
        let mut staged = self.data.clone();
        let value = op(&mut staged)?;
        save_json(&staged, &self.path)?;
        tracing::debug!("saved store to {}", self.path.display());
        self.data = staged;
        Ok(value)
    }
}

fn save_json(data: &StoreData, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(data).context("failed to serialize store")?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, json)
        .with_context(|| format!("failed to write store to {}", path.display()))?;
    Ok(())
}

fn load_json(path: &Path) -> Result<StoreData> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read store from {}", path.display()))?;
    let data: StoreData = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse store JSON: {}", path.display()))?;
    Ok(data)
}

impl GameStore for JsonFileStore {
    fn name(&self) -> &str {
        "json-file"
    }

    fn find_user(&self, id: UserId) -> Result<Option<UserRecord>> {
        Ok(self.data.find_user(id).cloned())
    }

    fn find_user_by_name(&self, username: &str) -> Result<Option<UserRecord>> {
        Ok(self.data.find_user_by_name(username).cloned())
    }

    fn create_user(
        &mut self,
        username: &str,
        language: Language,
        created_at: DateTime<Utc>,
    ) -> Result<UserRecord> {
        self.write(|data| Ok(data.create_user(username, language, created_at)?))
    }

    fn set_language(&mut self, user_id: UserId, language: Language) -> Result<()> {
        self.write(|data| Ok(data.set_language(user_id, language)?))
    }

    fn record_login(&mut self, user_id: UserId, at: DateTime<Utc>) -> Result<Option<DateTime<Utc>>> {
        self.write(|data| Ok(data.record_login(user_id, at)?))
    }

    fn find_game_level(&self, user_id: UserId, game: GameKind) -> Result<Option<GameRecord>> {
        Ok(self.data.find_game_level(user_id, game).cloned())
    }

    fn create_game_level(
        &mut self,
        user_id: UserId,
        game: GameKind,
        level: u32,
    ) -> Result<GameRecord> {
        self.write(|data| Ok(data.create_game_level(user_id, game, level)?))
    }

    fn update_game_level(&mut self, record_id: RecordId, level: u32) -> Result<()> {
        self.write(|data| Ok(data.update_game_level(record_id, level)?))
    }

    fn insert_round_result(
        &mut self,
        user_id: UserId,
        record_id: RecordId,
        result: &RoundResult,
    ) -> Result<StoredRound> {
        self.write(|data| Ok(data.insert_round_result(user_id, record_id, result, Utc::now())?))
    }

    fn round_count(&self, record_id: RecordId) -> Result<usize> {
        Ok(self.data.round_count(record_id))
    }

    fn recent_rounds(&self, user_id: UserId, limit: usize) -> Result<Vec<StoredRound>> {
        Ok(self.data.recent_rounds(user_id, limit))
    }

    fn add_points(&mut self, user_id: UserId, amount: i64, category: PointsCategory) -> Result<i64> {
        self.write(|data| Ok(data.add_points(user_id, amount, category, Utc::now())?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brainboost_core::results::RoundDetails;

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("data.json")).unwrap();
        assert!(store.data().users.is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn writes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        let user = store.create_user("ada", Language::Pl, Utc::now()).unwrap();
        let record = store
            .create_game_level(user.id, GameKind::ResultKeeper, 1)
            .unwrap();
        store.update_game_level(record.id, 3).unwrap();
        store
            .add_points(user.id, 10, PointsCategory::CreateAccount)
            .unwrap();
        let result = RoundResult {
            points_earned: 4,
            started_level: 3,
            finished_level: 3,
            duration: 60,
            correct_answers: 4,
            wrong_answers: 0,
            details: RoundDetails::ResultKeeper {
                range_min: 0,
                range_max: 20,
                steps: 4,
            },
        };
        let stored = store.insert_round_result(user.id, record.id, &result).unwrap();
        assert!(path.exists());

        let reopened = JsonFileStore::open(&path).unwrap();
        let user = reopened.find_user_by_name("ada").unwrap().unwrap();
        assert_eq!(user.points, 10);
        assert_eq!(user.language, Language::Pl);
        assert_eq!(
            reopened
                .find_game_level(user.id, GameKind::ResultKeeper)
                .unwrap()
                .unwrap()
                .level,
            3
        );
        let rounds = reopened.recent_rounds(user.id, 10).unwrap();
        assert_eq!(rounds.len(), 1);
        assert_eq!(rounds[0].id, stored.id);
        assert_eq!(rounds[0].result, result);
    }

    #[test]
    fn failed_write_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        let mut store = JsonFileStore::open(&path).unwrap();
        store.create_user("ada", Language::En, Utc::now()).unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        assert!(store.create_user("ada", Language::En, Utc::now()).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn failed_save_keeps_memory_in_sync_with_disk() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let mut store = JsonFileStore::open(blocker.join("data.json")).unwrap();
        assert!(store.create_user("ada", Language::En, Utc::now()).is_err());
        assert!(store.data().users.is_empty());
        assert!(store.find_user_by_name("ada").unwrap().is_none());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = JsonFileStore::open(&path).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse store JSON"));
    }
}
