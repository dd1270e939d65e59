use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::ProfileId;
use crate::record::{opt_text_value, timestamp_value, Entity, Record, RecordExt};
use crate::time;

pub const DEFAULT_ACCENT_COLOR: &str = "#00BCD4";

/// Scenario a profile prepares the assistant for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileType {
    #[default]
    Interview,
    Sales,
    Meeting,
    Presentation,
    Negotiation,
    Exam,
}

impl ProfileType {
    pub const ALL: [ProfileType; 6] = [
        Self::Interview,
        Self::Sales,
        Self::Meeting,
        Self::Presentation,
        Self::Negotiation,
        Self::Exam,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Interview => "interview",
            Self::Sales => "sales",
            Self::Meeting => "meeting",
            Self::Presentation => "presentation",
            Self::Negotiation => "negotiation",
            Self::Exam => "exam",
        }
    }
}

impl std::fmt::Display for ProfileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProfileType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown profile type: {s}"))
    }
}

/// A reusable bundle of purpose, behavior and context text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub name: String,
    pub profile_type: ProfileType,
    pub description: String,
    pub purpose: String,
    pub behavior_instructions: String,
    pub additional_context: String,
    /// Free-text instructions appended last in the composed prompt.
    pub custom_system_prompt: Option<String>,
    pub accent_color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(name: impl Into<String>, profile_type: ProfileType) -> Self {
        let now = time::now();
        Self {
            id: ProfileId::new(),
            name: name.into(),
            profile_type,
            description: String::new(),
            purpose: String::new(),
            behavior_instructions: String::new(),
            additional_context: String::new(),
            custom_system_prompt: None,
            accent_color: DEFAULT_ACCENT_COLOR.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Mark the profile as modified now. Never moves `updated_at` before
    /// `created_at`.
    pub fn touch(&mut self) {
        self.updated_at = time::now().max(self.created_at);
    }
}

impl Entity for Profile {
    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn to_record(&self) -> Record {
        let mut r = Record::new();
        r.insert("id".into(), Value::String(self.id.to_string()));
        r.insert("name".into(), Value::String(self.name.clone()));
        r.insert("profile_type".into(), Value::String(self.profile_type.to_string()));
        r.insert("description".into(), Value::String(self.description.clone()));
        r.insert("purpose".into(), Value::String(self.purpose.clone()));
        r.insert(
            "behavior_instructions".into(),
            Value::String(self.behavior_instructions.clone()),
        );
        r.insert(
            "additional_context".into(),
            Value::String(self.additional_context.clone()),
        );
        r.insert(
            "custom_system_prompt".into(),
            opt_text_value(self.custom_system_prompt.as_deref()),
        );
        r.insert("accent_color".into(), Value::String(self.accent_color.clone()));
        r.insert("created_at".into(), timestamp_value(&self.created_at));
        r.insert("updated_at".into(), timestamp_value(&self.updated_at));
        r
    }

    fn from_record(r: &Record) -> Self {
        let created_at = r.timestamp("created_at");
        let updated_at = r.opt_timestamp("updated_at").unwrap_or(created_at);
        Self {
            id: r.opt_text("id").map_or_else(ProfileId::new, ProfileId::from_raw),
            name: r.text("name"),
            profile_type: r.parse_or_default("profile_type"),
            description: r.text("description"),
            purpose: r.text("purpose"),
            behavior_instructions: r.text("behavior_instructions"),
            additional_context: r.text("additional_context"),
            custom_system_prompt: r.opt_text("custom_system_prompt"),
            accent_color: r
                .opt_text("accent_color")
                .unwrap_or_else(|| DEFAULT_ACCENT_COLOR.to_string()),
            created_at,
            updated_at: updated_at.max(created_at),
        }
    }
}
