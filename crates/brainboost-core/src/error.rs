//! Error types for game rounds and the session manager.
//!
//! Round errors indicate caller ordering bugs or generation bugs; they are
//! returned to the caller and never swallowed. A non-numeric arithmetic
//! answer is not an error at all: the round re-presents the prompt.

use thiserror::Error;

use crate::model::{GameKind, UserId};

/// Errors raised by the round generators and the operator arithmetic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    /// An answer could not be interpreted.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The operation was called in a state where it is not allowed.
    #[error("precondition violated: {0}")]
    PreconditionViolation(String),

    /// An operator outside `{+, -, *, /}` reached the calculator.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Division with a zero divisor.
    #[error("division by zero: {0} / 0")]
    DivisionByZero(i64),

    /// The operator chain could not be completed within the repair budget.
    #[error("no valid operator chain after {repairs} repairs (range 0..={range_size})")]
    ExhaustedSearch { repairs: u32, range_size: i64 },
}

impl GameError {
    /// Returns `true` if retrying `start` with a fresh random seed may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GameError::ExhaustedSearch { .. })
    }
}

/// Errors raised by the session manager.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A session operation was attempted while nobody is logged in.
    #[error("no active session: login required")]
    Unauthenticated,

    /// Usernames must be non-empty after trimming.
    #[error("invalid username: {0:?}")]
    InvalidUsername(String),

    /// Usernames are unique.
    #[error("username '{0}' is already taken")]
    UsernameTaken(String),

    /// The persistence collaborator has no user with this id.
    #[error("user with id '{0}' not found")]
    UserNotFound(UserId),

    /// No user is registered under this name.
    #[error("no user named '{0}'")]
    UnknownUsername(String),

    /// Levels only ever go up.
    #[error("level of {game} cannot decrease from {current} to {requested}")]
    LevelDecrease {
        game: GameKind,
        current: u32,
        requested: u32,
    },

    /// The persistence collaborator failed.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}
