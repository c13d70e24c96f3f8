//! brainboost-store: Persistence collaborators and configuration.
//!
//! Implements the `GameStore` trait with an in-memory store and a JSON-file
//! store, and loads `brainboost.toml`.

pub mod config;
pub mod error;
pub mod json_file;
pub mod memory;

pub use config::{load_config, load_config_from, BrainBoostConfig, RecallConfig};
pub use error::StoreError;
pub use json_file::JsonFileStore;
pub use memory::{MemoryStore, StoreData};
