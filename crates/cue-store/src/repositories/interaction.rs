use cue_core::SessionInteraction;

use super::Stored;

/// Oldest first, for chronological replay.
impl Stored for SessionInteraction {
    const TABLE: &'static str = "session_interactions";
    const OWNER_COLUMN: Option<&'static str> = Some("session_id");
    const ORDER_BY: &'static str = "timestamp ASC, id ASC";
}
