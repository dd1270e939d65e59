//! # cue-store
//!
//! SQLite persistence for profiles, their files and research, and recorded
//! sessions with their interactions.
//!
//! - **[`connection`]**: r2d2 pool with WAL, foreign keys and busy timeout
//! - **[`migrations`]**: versioned, embedded schema migrations
//! - **[`relations`]**: cascade/nullify rules applied on delete
//! - **[`repositories`]**: per-table statements over the `Record` boundary
//! - **[`StorageManager`]**: the transactional facade applications use

#![deny(unsafe_code)]

pub mod connection;
pub mod error;
pub mod migrations;
pub mod relations;
pub mod repositories;
mod row;
mod store;

pub use error::{Result, StoreError};
pub use repositories::ListSessionsOptions;
pub use store::{StorageManager, StoreConfig, StoreStats};
