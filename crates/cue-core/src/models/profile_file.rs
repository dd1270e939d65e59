use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::{ProfileFileId, ProfileId};
use crate::record::{opt_text_value, timestamp_value, Entity, Record, RecordExt};
use crate::time;

/// A file uploaded to a profile, with the text extracted from it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileFile {
    pub id: ProfileFileId,
    pub profile_id: ProfileId,
    pub filename: String,
    pub storage_path: String,
    pub mime_type: String,
    pub extracted_text: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

impl ProfileFile {
    pub fn new(
        profile_id: &ProfileId,
        filename: impl Into<String>,
        storage_path: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            id: ProfileFileId::new(),
            profile_id: profile_id.clone(),
            filename: filename.into(),
            storage_path: storage_path.into(),
            mime_type: mime_type.into(),
            extracted_text: None,
            uploaded_at: time::now(),
        }
    }

    pub fn with_extracted_text(mut self, text: impl Into<String>) -> Self {
        self.extracted_text = Some(text.into());
        self
    }
}

impl Entity for ProfileFile {
    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn to_record(&self) -> Record {
        let mut r = Record::new();
        r.insert("id".into(), Value::String(self.id.to_string()));
        r.insert("profile_id".into(), Value::String(self.profile_id.to_string()));
        r.insert("filename".into(), Value::String(self.filename.clone()));
        r.insert("storage_path".into(), Value::String(self.storage_path.clone()));
        r.insert("mime_type".into(), Value::String(self.mime_type.clone()));
        r.insert(
            "extracted_text".into(),
            opt_text_value(self.extracted_text.as_deref()),
        );
        r.insert("uploaded_at".into(), timestamp_value(&self.uploaded_at));
        r
    }

    fn from_record(r: &Record) -> Self {
        Self {
            id: r
                .opt_text("id")
                .map_or_else(ProfileFileId::new, ProfileFileId::from_raw),
            profile_id: ProfileId::from_raw(r.text("profile_id")),
            filename: r.text("filename"),
            storage_path: r.text("storage_path"),
            mime_type: r.text("mime_type"),
            extracted_text: r.opt_text("extracted_text"),
            uploaded_at: r.timestamp("uploaded_at"),
        }
    }
}
