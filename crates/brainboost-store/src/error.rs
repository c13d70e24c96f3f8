//! Store error types.
//!
//! Store methods return `anyhow::Result` through the `GameStore` trait; these
//! are the typed failures underneath, recoverable with `downcast_ref`.

use brainboost_core::model::{GameKind, RecordId, UserId};
use thiserror::Error;

/// Errors raised by the bundled stores.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A user with this name already exists.
    #[error("username '{0}' is already taken")]
    UsernameTaken(String),

    /// No user with this id.
    #[error("user with id '{0}' not found")]
    UserNotFound(UserId),

    /// No game record with this id.
    #[error("game record with id '{0}' not found")]
    RecordNotFound(RecordId),

    /// Each user has at most one record per game.
    #[error("user '{user_id}' already has a {game} record")]
    DuplicateGameRecord { user_id: UserId, game: GameKind },
}
