//! # cue-core
//!
//! Shared types for the cue workspace:
//!
//! - **[`ids`]**: branded, prefixed UUIDv7 identifiers for every entity
//! - **[`time`]**: the single timestamp text format used at the storage boundary
//! - **[`record`]**: the flat key-value [`Record`] mapping and the [`Entity`] trait
//! - **[`models`]**: `Profile`, `ProfileFile`, `ResearchRecord`, `Session`,
//!   `SessionInteraction`

#![deny(unsafe_code)]

pub mod ids;
pub mod models;
pub mod record;
pub mod time;

pub use ids::{InteractionId, ProfileFileId, ProfileId, ResearchId, SessionId};
pub use models::{
    InteractionType, Profile, ProfileFile, ProfileType, ResearchRecord, Session,
    SessionInteraction,
};
pub use record::{Entity, Record, RecordExt};
