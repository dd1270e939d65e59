use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::{InteractionId, SessionId};
use crate::record::{opt_text_value, timestamp_value, Entity, Record, RecordExt};
use crate::time;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    /// Transcribed speech.
    #[default]
    Voice,
    /// Typed prompt.
    UserPrompt,
}

impl std::fmt::Display for InteractionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Voice => write!(f, "voice"),
            Self::UserPrompt => write!(f, "user_prompt"),
        }
    }
}

impl std::str::FromStr for InteractionType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "voice" => Ok(Self::Voice),
            "user_prompt" => Ok(Self::UserPrompt),
            other => Err(format!("unknown interaction type: {other}")),
        }
    }
}

/// One exchange within a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInteraction {
    pub id: InteractionId,
    pub session_id: SessionId,
    pub timestamp: DateTime<Utc>,
    pub interaction_type: InteractionType,
    /// Transcript or typed message.
    pub content: String,
    pub ai_response: String,
    pub screenshot_path: Option<String>,
    pub audio_path: Option<String>,
}

impl SessionInteraction {
    pub fn new(
        session_id: &SessionId,
        interaction_type: InteractionType,
        content: impl Into<String>,
        ai_response: impl Into<String>,
    ) -> Self {
        Self {
            id: InteractionId::new(),
            session_id: session_id.clone(),
            timestamp: time::now(),
            interaction_type,
            content: content.into(),
            ai_response: ai_response.into(),
            screenshot_path: None,
            audio_path: None,
        }
    }
}

impl Entity for SessionInteraction {
    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn to_record(&self) -> Record {
        let mut r = Record::new();
        r.insert("id".into(), Value::String(self.id.to_string()));
        r.insert("session_id".into(), Value::String(self.session_id.to_string()));
        r.insert("timestamp".into(), timestamp_value(&self.timestamp));
        r.insert(
            "interaction_type".into(),
            Value::String(self.interaction_type.to_string()),
        );
        r.insert("content".into(), Value::String(self.content.clone()));
        r.insert("ai_response".into(), Value::String(self.ai_response.clone()));
        r.insert(
            "screenshot_path".into(),
            opt_text_value(self.screenshot_path.as_deref()),
        );
        r.insert("audio_path".into(), opt_text_value(self.audio_path.as_deref()));
        r
    }

    fn from_record(r: &Record) -> Self {
        Self {
            id: r
                .opt_text("id")
                .map_or_else(InteractionId::new, InteractionId::from_raw),
            session_id: SessionId::from_raw(r.text("session_id")),
            timestamp: r.timestamp("timestamp"),
            interaction_type: r.parse_or_default("interaction_type"),
            content: r.text("content"),
            ai_response: r.text("ai_response"),
            screenshot_path: r.opt_text("screenshot_path"),
            audio_path: r.opt_text("audio_path"),
        }
    }
}
