//! The session manager: one logged-in user's identity, points and per-game
//! levels, mirrored from the store.
//!
//! There is no ambient "current session". A [`SessionManager`] owns the store
//! and at most one [`Session`]; every mutation goes through it so the cache and
//! the store never diverge. Mutators called with nobody logged in fail with
//! [`SessionError::Unauthenticated`].

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::SessionError;
use crate::model::{GameKind, Language, PointsCategory, RecordId, UserId, UserRecord};
use crate::results::RoundResult;
use crate::traits::GameStore;

/// Level a game starts at when a user has never played it.
pub const START_LEVEL: u32 = 1;

/// A user's record id and cached level for one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameSlot {
    pub record_id: RecordId,
    pub level: u32,
}

/// The authenticated user as seen by the games.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub id: UserId,
    pub username: String,
    /// Cumulative points, login bonuses included.
    pub points: i64,
    pub language: Language,
    /// Bonuses awarded by the login that opened this session.
    pub login_bonuses: Vec<PointsCategory>,
    games: BTreeMap<GameKind, GameSlot>,
}

impl Session {
    pub fn slot(&self, game: GameKind) -> Option<&GameSlot> {
        self.games.get(&game)
    }

    pub fn games(&self) -> impl Iterator<Item = (GameKind, &GameSlot)> {
        self.games.iter().map(|(game, slot)| (*game, slot))
    }
}

/// What persisting a finished round changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundOutcome {
    pub round_id: Uuid,
    /// Level now cached and persisted for the game.
    pub level: u32,
    pub levels_gained: u32,
    /// True when this was the user's first finished play of the game.
    pub first_play: bool,
    /// Session points after every award of this round.
    pub total_points: i64,
}

/// Daily and weekly bonuses earned by a login at `now`, given the previous
/// login time.
pub fn login_bonuses(previous: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Vec<PointsCategory> {
    let mut bonuses = Vec::new();
    let new_day = previous.map_or(true, |prev| prev.date_naive() < now.date_naive());
    let new_week = previous.map_or(true, |prev| {
        prev.iso_week() != now.iso_week() && prev < now
    });
    if new_day {
        bonuses.push(PointsCategory::DailyLogin);
    }
    if new_week {
        bonuses.push(PointsCategory::WeeklyLogin);
    }
    bonuses
}

/// Owns the store and the single active session.
pub struct SessionManager<S: GameStore> {
    store: S,
    current: Option<Session>,
}

impl<S: GameStore> SessionManager<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            current: None,
        }
    }

    /// Create a user and award the account-creation bonus. Does not log in.
    pub fn register_user(
        &mut self,
        username: &str,
        language: Language,
    ) -> Result<UserRecord, SessionError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(SessionError::InvalidUsername(username.to_string()));
        }
        if self.store.find_user_by_name(username)?.is_some() {
            return Err(SessionError::UsernameTaken(username.to_string()));
        }

        let mut user = self.store.create_user(username, language, Utc::now())?;
        let category = PointsCategory::CreateAccount;
        user.points = self
            .store
            .add_points(user.id, category.fixed_points().unwrap_or(0), category)?;

        tracing::info!(user_id = user.id, username, "registered user");
        Ok(user)
    }

    /// Log in as `user_id` now. See [`SessionManager::login_at`].
    pub fn login(&mut self, user_id: UserId) -> Result<&Session, SessionError> {
        self.login_at(user_id, Utc::now())
    }

    pub fn login_by_name(&mut self, username: &str) -> Result<&Session, SessionError> {
        let user = self
            .store
            .find_user_by_name(username.trim())?
            .ok_or_else(|| SessionError::UnknownUsername(username.trim().to_string()))?;
        self.login_at(user.id, Utc::now())
    }

    /// Load the user's game levels, creating missing ones at level 1, award
    /// login bonuses and install the session. Replaces any active session.
    pub fn login_at(
        &mut self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<&Session, SessionError> {
        let user = self
            .store
            .find_user(user_id)?
            .ok_or(SessionError::UserNotFound(user_id))?;

        let mut games = BTreeMap::new();
        for game in GameKind::ALL {
            let record = match self.store.find_game_level(user_id, game)? {
                Some(record) => record,
                None => {
                    tracing::debug!(user_id, %game, "creating missing game record");
                    self.store.create_game_level(user_id, game, START_LEVEL)?
                }
            };
            games.insert(
                game,
                GameSlot {
                    record_id: record.id,
                    level: record.level,
                },
            );
        }

        let previous = self.store.record_login(user_id, now)?;
        let bonuses = login_bonuses(previous, now);
        let mut points = user.points;
        for category in &bonuses {
            let amount = category.fixed_points().unwrap_or(0);
            points = self.store.add_points(user_id, amount, *category)?;
            tracing::debug!(user_id, bonus = category.label(), amount, "login bonus");
        }

        if let Some(old) = &self.current {
            tracing::info!(previous = %old.username, "replacing active session");
        }
        tracing::info!(user_id, username = %user.username, points, "logged in");

        let session = Session {
            id: user.id,
            username: user.username,
            points,
            language: user.language,
            login_bonuses: bonuses,
            games,
        };
        Ok(self.current.insert(session))
    }

    /// Drop the active session, returning it.
    pub fn logout(&mut self) -> Option<Session> {
        let session = self.current.take();
        if let Some(session) = &session {
            tracing::info!(username = %session.username, "logged out");
        }
        session
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    fn session(&self) -> Result<&Session, SessionError> {
        self.current.as_ref().ok_or(SessionError::Unauthenticated)
    }

    fn slot(&self, game: GameKind) -> Result<GameSlot, SessionError> {
        let session = self.session()?;
        session.slot(game).copied().ok_or_else(|| {
            SessionError::Store(anyhow::anyhow!(
                "session for '{}' has no record for {game}",
                session.username
            ))
        })
    }

    pub fn get_level(&self, game: GameKind) -> Result<u32, SessionError> {
        Ok(self.slot(game)?.level)
    }

    pub fn get_record_id(&self, game: GameKind) -> Result<RecordId, SessionError> {
        Ok(self.slot(game)?.record_id)
    }

    /// Persist a points entry and mirror the new total into the session.
    pub fn add_points(
        &mut self,
        amount: i64,
        category: PointsCategory,
    ) -> Result<i64, SessionError> {
        let session = self.current.as_mut().ok_or(SessionError::Unauthenticated)?;
        let total = self.store.add_points(session.id, amount, category)?;
        session.points = total;
        tracing::debug!(user_id = session.id, amount, category = category.label(), total, "points added");
        Ok(total)
    }

    /// Raise the level of `game`. Equal levels are a no-op; lower ones fail.
    pub fn set_level(&mut self, game: GameKind, level: u32) -> Result<(), SessionError> {
        let session = self.current.as_mut().ok_or(SessionError::Unauthenticated)?;
        let Some(slot) = session.games.get_mut(&game) else {
            return Err(SessionError::Store(anyhow::anyhow!(
                "session for '{}' has no record for {game}",
                session.username
            )));
        };

        if level < slot.level {
            return Err(SessionError::LevelDecrease {
                game,
                current: slot.level,
                requested: level,
            });
        }
        if level == slot.level {
            return Ok(());
        }

        self.store.update_game_level(slot.record_id, level)?;
        tracing::info!(user_id = session.id, %game, from = slot.level, to = level, "level up");
        slot.level = level;
        Ok(())
    }

    pub fn set_language(&mut self, language: Language) -> Result<(), SessionError> {
        let session = self.current.as_mut().ok_or(SessionError::Unauthenticated)?;
        self.store.set_language(session.id, language)?;
        session.language = language;
        Ok(())
    }

    /// Persist a finished round and apply it to the session: the round's
    /// points, the first-play bonus, and the level delta
    /// (`finished_level - started_level`) on top of the cached level.
    pub fn record_round(&mut self, result: &RoundResult) -> Result<RoundOutcome, SessionError> {
        let game = result.game();
        let user_id = self.session()?.id;
        let slot = self.slot(game)?;

        let first_play = self.store.round_count(slot.record_id)? == 0;
        let stored = self.store.insert_round_result(user_id, slot.record_id, result)?;
        tracing::debug!(user_id, %game, round_id = %stored.id, "round persisted");

        let mut total_points = self.session()?.points;
        if result.points_earned != 0 {
            total_points = self.add_points(result.points_earned, game.round_category())?;
        }
        if first_play {
            let category = game.first_play_category();
            total_points = self.add_points(category.fixed_points().unwrap_or(0), category)?;
        }

        let levels_gained = result.levels_gained();
        let level = slot.level.saturating_add(levels_gained);
        self.set_level(game, level)?;

        Ok(RoundOutcome {
            round_id: stored.id,
            level,
            levels_gained,
            first_play,
            total_points,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GameRecord;
    use crate::results::{RoundDetails, StoredRound};
    use chrono::TimeZone;
    use std::collections::HashMap;

    /// Minimal store for exercising the manager.
    #[derive(Default)]
    struct FakeStore {
        users: Vec<UserRecord>,
        records: Vec<GameRecord>,
        rounds: Vec<StoredRound>,
        points: Vec<(UserId, i64, PointsCategory)>,
        logins: HashMap<UserId, DateTime<Utc>>,
    }

    impl FakeStore {
        fn with_user(username: &str) -> Self {
            let mut store = Self::default();
            store
                .create_user(username, Language::En, Utc::now())
                .unwrap();
            store
        }
    }

    impl GameStore for FakeStore {
        fn name(&self) -> &str {
            "fake"
        }

        fn find_user(&self, id: UserId) -> anyhow::Result<Option<UserRecord>> {
            Ok(self.users.iter().find(|u| u.id == id).cloned())
        }

        fn find_user_by_name(&self, username: &str) -> anyhow::Result<Option<UserRecord>> {
            Ok(self.users.iter().find(|u| u.username == username).cloned())
        }

        fn create_user(
            &mut self,
            username: &str,
            language: Language,
            created_at: DateTime<Utc>,
        ) -> anyhow::Result<UserRecord> {
            let user = UserRecord {
                id: self.users.len() as i64 + 1,
                username: username.to_string(),
                points: 0,
                language,
                created_at,
            };
            self.users.push(user.clone());
            Ok(user)
        }

        fn set_language(&mut self, user_id: UserId, language: Language) -> anyhow::Result<()> {
            if let Some(user) = self.users.iter_mut().find(|u| u.id == user_id) {
                user.language = language;
            }
            Ok(())
        }

        fn record_login(
            &mut self,
            user_id: UserId,
            at: DateTime<Utc>,
        ) -> anyhow::Result<Option<DateTime<Utc>>> {
            Ok(self.logins.insert(user_id, at))
        }

        fn find_game_level(
            &self,
            user_id: UserId,
            game: GameKind,
        ) -> anyhow::Result<Option<GameRecord>> {
            Ok(self
                .records
                .iter()
                .find(|r| r.user_id == user_id && r.game == game)
                .cloned())
        }

        fn create_game_level(
            &mut self,
            user_id: UserId,
            game: GameKind,
            level: u32,
        ) -> anyhow::Result<GameRecord> {
            let record = GameRecord {
                id: self.records.len() as i64 + 1,
                user_id,
                game,
                level,
            };
            self.records.push(record.clone());
            Ok(record)
        }

        fn update_game_level(&mut self, record_id: RecordId, level: u32) -> anyhow::Result<()> {
            let record = self
                .records
                .iter_mut()
                .find(|r| r.id == record_id)
                .ok_or_else(|| anyhow::anyhow!("no record {record_id}"))?;
            record.level = level;
            Ok(())
        }

        fn insert_round_result(
            &mut self,
            user_id: UserId,
            record_id: RecordId,
            result: &RoundResult,
        ) -> anyhow::Result<StoredRound> {
            let stored = StoredRound {
                id: Uuid::new_v4(),
                user_id,
                record_id,
                finished_at: Utc::now(),
                result: result.clone(),
            };
            self.rounds.push(stored.clone());
            Ok(stored)
        }

        fn round_count(&self, record_id: RecordId) -> anyhow::Result<usize> {
            Ok(self.rounds.iter().filter(|r| r.record_id == record_id).count())
        }

        fn recent_rounds(
            &self,
            user_id: UserId,
            limit: usize,
        ) -> anyhow::Result<Vec<StoredRound>> {
            Ok(self
                .rounds
                .iter()
                .rev()
                .filter(|r| r.user_id == user_id)
                .take(limit)
                .cloned()
                .collect())
        }

        fn add_points(
            &mut self,
            user_id: UserId,
            amount: i64,
            category: PointsCategory,
        ) -> anyhow::Result<i64> {
            self.points.push((user_id, amount, category));
            let user = self
                .users
                .iter_mut()
                .find(|u| u.id == user_id)
                .ok_or_else(|| anyhow::anyhow!("no user {user_id}"))?;
            user.points += amount;
            Ok(user.points)
        }
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    fn keeper_result(started: u32, finished: u32, points: i64) -> RoundResult {
        RoundResult {
            points_earned: points,
            started_level: started,
            finished_level: finished,
            duration: 60,
            correct_answers: 9,
            wrong_answers: 0,
            details: RoundDetails::ResultKeeper {
                range_min: 0,
                range_max: 10,
                steps: 9,
            },
        }
    }

    #[test]
    fn login_synthesizes_missing_records() {
        let mut manager = SessionManager::new(FakeStore::with_user("ada"));
        let session = manager.login(1).unwrap();
        assert_eq!(session.username, "ada");
        for game in GameKind::ALL {
            assert_eq!(session.slot(game).unwrap().level, START_LEVEL);
        }
        assert_eq!(manager.store().records.len(), 2);
        assert_eq!(manager.get_level(GameKind::ResultKeeper).unwrap(), 1);
    }

    #[test]
    fn login_keeps_existing_levels() {
        let mut store = FakeStore::with_user("ada");
        store
            .create_game_level(1, GameKind::AssociativeChaining, 7)
            .unwrap();
        let mut manager = SessionManager::new(store);
        manager.login(1).unwrap();
        assert_eq!(manager.get_level(GameKind::AssociativeChaining).unwrap(), 7);
        assert_eq!(manager.get_level(GameKind::ResultKeeper).unwrap(), 1);
        assert_eq!(manager.store().records.len(), 2);
    }

    #[test]
    fn unknown_user_fails_login() {
        let mut manager = SessionManager::new(FakeStore::default());
        assert!(matches!(
            manager.login(42),
            Err(SessionError::UserNotFound(42))
        ));
        assert!(!manager.is_authenticated());
    }

    #[test]
    fn second_login_replaces_session() {
        let mut store = FakeStore::with_user("ada");
        store.create_user("bob", Language::Pl, Utc::now()).unwrap();
        let mut manager = SessionManager::new(store);

        manager.login(1).unwrap();
        manager.set_level(GameKind::ResultKeeper, 3).unwrap();
        let session = manager.login(2).unwrap();
        assert_eq!(session.username, "bob");
        assert_eq!(session.language, Language::Pl);
        assert_eq!(manager.get_level(GameKind::ResultKeeper).unwrap(), 1);
    }

    #[test]
    fn mutators_require_a_session() {
        let mut manager = SessionManager::new(FakeStore::with_user("ada"));
        assert!(matches!(
            manager.add_points(5, PointsCategory::GameResultKeeper),
            Err(SessionError::Unauthenticated)
        ));
        assert!(matches!(
            manager.set_level(GameKind::ResultKeeper, 2),
            Err(SessionError::Unauthenticated)
        ));
        assert!(matches!(
            manager.get_level(GameKind::ResultKeeper),
            Err(SessionError::Unauthenticated)
        ));
        assert!(matches!(
            manager.record_round(&keeper_result(1, 2, 9)),
            Err(SessionError::Unauthenticated)
        ));

        manager.login(1).unwrap();
        manager.logout();
        assert!(matches!(
            manager.set_language(Language::Pl),
            Err(SessionError::Unauthenticated)
        ));
    }

    #[test]
    fn level_never_decreases() {
        let mut manager = SessionManager::new(FakeStore::with_user("ada"));
        manager.login(1).unwrap();
        manager.set_level(GameKind::ResultKeeper, 4).unwrap();
        let err = manager.set_level(GameKind::ResultKeeper, 2).unwrap_err();
        assert!(matches!(
            err,
            SessionError::LevelDecrease {
                current: 4,
                requested: 2,
                ..
            }
        ));
        manager.set_level(GameKind::ResultKeeper, 4).unwrap();
        assert_eq!(manager.store().records[0].level, 4);
    }

    #[test]
    fn add_points_mirrors_store_total() {
        let mut manager = SessionManager::new(FakeStore::with_user("ada"));
        let before = manager.login(1).unwrap().points;
        let total = manager
            .add_points(-3, PointsCategory::GameAssociativeChaining)
            .unwrap();
        assert_eq!(total, before - 3);
        assert_eq!(manager.current().unwrap().points, total);
        assert_eq!(manager.store().users[0].points, total);
    }

    #[test]
    fn daily_and_weekly_bonuses() {
        // 2024-03-04 is a Monday
        assert_eq!(
            login_bonuses(None, at(4, 9)),
            vec![PointsCategory::DailyLogin, PointsCategory::WeeklyLogin]
        );
        assert!(login_bonuses(Some(at(4, 9)), at(4, 18)).is_empty());
        assert_eq!(
            login_bonuses(Some(at(4, 9)), at(5, 9)),
            vec![PointsCategory::DailyLogin]
        );
        assert_eq!(
            login_bonuses(Some(at(10, 9)), at(11, 9)),
            vec![PointsCategory::DailyLogin, PointsCategory::WeeklyLogin]
        );
    }

    #[test]
    fn login_awards_bonuses_once_per_day() {
        let mut manager = SessionManager::new(FakeStore::with_user("ada"));
        let first = manager.login_at(1, at(4, 9)).unwrap();
        assert_eq!(first.points, 15);
        assert_eq!(first.login_bonuses.len(), 2);

        let again = manager.login_at(1, at(4, 12)).unwrap();
        assert_eq!(again.points, 15);
        assert!(again.login_bonuses.is_empty());
    }

    #[test]
    fn record_round_applies_points_bonus_and_level() {
        let mut manager = SessionManager::new(FakeStore::with_user("ada"));
        let start = manager.login_at(1, at(4, 9)).unwrap().points;

        let outcome = manager.record_round(&keeper_result(1, 2, 9)).unwrap();
        assert!(outcome.first_play);
        assert_eq!(outcome.level, 2);
        assert_eq!(outcome.levels_gained, 1);
        assert_eq!(outcome.total_points, start + 9 + 10);
        assert_eq!(manager.get_level(GameKind::ResultKeeper).unwrap(), 2);

        let outcome = manager.record_round(&keeper_result(2, 2, -2)).unwrap();
        assert!(!outcome.first_play);
        assert_eq!(outcome.level, 2);
        assert_eq!(outcome.total_points, start + 9 + 10 - 2);
        assert_eq!(manager.store().rounds.len(), 2);
        assert_eq!(manager.store().records[0].level, 2);
    }

    #[test]
    fn register_validates_and_awards_bonus() {
        let mut manager = SessionManager::new(FakeStore::default());
        let user = manager.register_user("  ada ", Language::Pl).unwrap();
        assert_eq!(user.username, "ada");
        assert_eq!(user.points, 10);

        assert!(matches!(
            manager.register_user("ada", Language::En),
            Err(SessionError::UsernameTaken(_))
        ));
        assert!(matches!(
            manager.register_user("   ", Language::En),
            Err(SessionError::InvalidUsername(_))
        ));
        assert!(!manager.is_authenticated());

        let session = manager.login_by_name("ada").unwrap();
        assert_eq!(session.language, Language::Pl);
        assert!(matches!(
            manager.login_by_name("zed"),
            Err(SessionError::UnknownUsername(_))
        ));
    }

    #[test]
    fn set_language_persists() {
        let mut manager = SessionManager::new(FakeStore::with_user("ada"));
        manager.login(1).unwrap();
        manager.set_language(Language::Pl).unwrap();
        assert_eq!(manager.current().unwrap().language, Language::Pl);
        assert_eq!(manager.store().users[0].language, Language::Pl);
    }
}
