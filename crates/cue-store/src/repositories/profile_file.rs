use cue_core::ProfileFile;

use super::Stored;

impl Stored for ProfileFile {
    const TABLE: &'static str = "profile_files";
    const OWNER_COLUMN: Option<&'static str> = Some("profile_id");
    const ORDER_BY: &'static str = "uploaded_at DESC, id DESC";
}
