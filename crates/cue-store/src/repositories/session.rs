use cue_core::{ProfileId, Session};
use rusqlite::{params, Connection};

use super::Stored;
use crate::error::Result;

impl Stored for Session {
    const TABLE: &'static str = "sessions";
    const OWNER_COLUMN: Option<&'static str> = Some("profile_id");
    const ORDER_BY: &'static str = "start_time DESC, id DESC";
}

/// Purge filter selecting sessions that started before the `?1` timestamp.
/// Fixed-width timestamp text compares in chronological order.
pub const SESSION_START_BEFORE: &str = "start_time < ?1";

#[derive(Clone, Debug, Default)]
pub struct ListSessionsOptions {
    /// Only sessions linked to this profile.
    pub profile_id: Option<ProfileId>,
    /// At most this many sessions. `None` and `Some(0)` return all of them.
    pub limit: Option<u32>,
}

/// Set end time and duration on a stored session, leaving other columns as
/// they are. Returns `false` when no session has this id.
pub fn finalize(conn: &Connection, id: &str) -> Result<bool> {
    let Some(mut session) = super::get::<Session>(conn, id)? else {
        return Ok(false);
    };
    session.finalize();
    let changed = conn.execute(
        "UPDATE sessions SET end_time = ?1, duration_seconds = ?2 WHERE id = ?3",
        params![
            session.end_time.as_ref().map(cue_core::time::format_timestamp),
            session.duration_seconds,
            id
        ],
    )?;
    Ok(changed > 0)
}
