use cue_core::ResearchRecord;
use rusqlite::{params, Connection};

use super::Stored;
use crate::error::Result;

impl Stored for ResearchRecord {
    const TABLE: &'static str = "research_records";
    const OWNER_COLUMN: Option<&'static str> = Some("profile_id");
    const ORDER_BY: &'static str = "conducted_at DESC, id DESC";
}

/// Flip the appended-to-context flag without touching other columns.
pub fn set_appended(conn: &Connection, id: &str, appended: bool) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE research_records SET appended_to_context = ?1 WHERE id = ?2",
        params![appended, id],
    )?;
    Ok(changed > 0)
}
