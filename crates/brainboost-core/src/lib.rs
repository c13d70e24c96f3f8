//! brainboost-core: Game-round engine, scoring and session model.
//!
//! This crate holds the two mini-games (Result Keeper and Associative
//! Chaining), the per-round scoring ledger, the finished-round projection, the
//! cooperative timers, the persistence trait and the session manager that the
//! store and CLI crates build on.

pub mod arithmetic;
pub mod error;
pub mod ledger;
pub mod model;
pub mod recall;
pub mod results;
pub mod session;
pub mod timer;
pub mod traits;
pub mod words;
