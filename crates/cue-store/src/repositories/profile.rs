use cue_core::Profile;

use super::Stored;

impl Stored for Profile {
    const TABLE: &'static str = "profiles";
    const OWNER_COLUMN: Option<&'static str> = None;
    const ORDER_BY: &'static str = "created_at DESC, id DESC";
}
