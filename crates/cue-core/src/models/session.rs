use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::{ProfileId, SessionId};
use crate::record::{
    opt_text_value, opt_timestamp_value, string_list_value, timestamp_value, Entity, Record,
    RecordExt,
};
use crate::time;

/// One timed usage period, optionally linked to a profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    /// Back-reference only; cleared when the profile is deleted.
    pub profile_id: Option<ProfileId>,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_seconds: Option<i64>,
    pub tags: BTreeSet<String>,
}

impl Session {
    pub fn new(title: impl Into<String>, profile_id: Option<&ProfileId>) -> Self {
        Self {
            id: SessionId::new(),
            profile_id: profile_id.cloned(),
            title: title.into(),
            start_time: time::now(),
            end_time: None,
            duration_seconds: None,
            tags: BTreeSet::new(),
        }
    }

    /// Whole seconds between start and end, truncated. `None` until ended.
    pub fn calculate_duration(&self) -> Option<i64> {
        self.end_time
            .map(|end| (end - self.start_time).num_seconds())
    }

    /// End the session now. Calling it again overwrites both fields.
    pub fn finalize(&mut self) {
        self.finalize_at(time::now());
    }

    pub fn finalize_at(&mut self, now: DateTime<Utc>) {
        self.end_time = Some(now);
        self.duration_seconds = self.calculate_duration();
    }

    pub fn is_finished(&self) -> bool {
        self.end_time.is_some()
    }
}

impl Entity for Session {
    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn to_record(&self) -> Record {
        let mut r = Record::new();
        r.insert("id".into(), Value::String(self.id.to_string()));
        r.insert(
            "profile_id".into(),
            opt_text_value(self.profile_id.as_ref().map(ProfileId::as_str)),
        );
        r.insert("title".into(), Value::String(self.title.clone()));
        r.insert("start_time".into(), timestamp_value(&self.start_time));
        r.insert("end_time".into(), opt_timestamp_value(self.end_time.as_ref()));
        r.insert(
            "duration_seconds".into(),
            self.duration_seconds.map_or(Value::Null, Value::from),
        );
        r.insert("tags".into(), string_list_value(&self.tags));
        r
    }

    fn from_record(r: &Record) -> Self {
        Self {
            id: r.opt_text("id").map_or_else(SessionId::new, SessionId::from_raw),
            profile_id: r.opt_text("profile_id").map(ProfileId::from_raw),
            title: r.text("title"),
            start_time: r.timestamp("start_time"),
            end_time: r.opt_timestamp("end_time"),
            duration_seconds: r.opt_int("duration_seconds"),
            tags: r.string_list("tags"),
        }
    }
}
