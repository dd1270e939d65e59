use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::{ProfileId, ResearchId};
use crate::record::{string_list_value, timestamp_value, Entity, Record, RecordExt};
use crate::time;

/// A question/answer/sources triple from an external research service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchRecord {
    pub id: ResearchId,
    pub profile_id: ProfileId,
    pub question: String,
    pub answer: String,
    /// Source URLs in the order the service returned them.
    pub sources: Vec<String>,
    pub conducted_at: DateTime<Utc>,
    pub appended_to_context: bool,
}

impl ResearchRecord {
    pub fn new(
        profile_id: &ProfileId,
        question: impl Into<String>,
        answer: impl Into<String>,
        sources: Vec<String>,
    ) -> Self {
        Self {
            id: ResearchId::new(),
            profile_id: profile_id.clone(),
            question: question.into(),
            answer: answer.into(),
            sources,
            conducted_at: time::now(),
            appended_to_context: false,
        }
    }

    /// Fixed textual form folded into composed prompts.
    pub fn render(&self) -> String {
        let mut out = format!("**RESEARCH: {}**\n{}", self.question, self.answer);
        if !self.sources.is_empty() {
            out.push_str("\nSources: ");
            out.push_str(&self.sources.join(", "));
        }
        out
    }
}

impl Entity for ResearchRecord {
    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn to_record(&self) -> Record {
        let mut r = Record::new();
        r.insert("id".into(), Value::String(self.id.to_string()));
        r.insert("profile_id".into(), Value::String(self.profile_id.to_string()));
        r.insert("question".into(), Value::String(self.question.clone()));
        r.insert("answer".into(), Value::String(self.answer.clone()));
        r.insert("sources".into(), string_list_value(&self.sources));
        r.insert("conducted_at".into(), timestamp_value(&self.conducted_at));
        r.insert(
            "appended_to_context".into(),
            Value::Bool(self.appended_to_context),
        );
        r
    }

    fn from_record(r: &Record) -> Self {
        Self {
            id: r
                .opt_text("id")
                .map_or_else(ResearchId::new, ResearchId::from_raw),
            profile_id: ProfileId::from_raw(r.text("profile_id")),
            question: r.text("question"),
            answer: r.text("answer"),
            sources: r.string_list("sources"),
            conducted_at: r.timestamp("conducted_at"),
            appended_to_context: r.flag("appended_to_context"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(sources: Vec<String>) -> ResearchRecord {
        ResearchRecord::new(
            &ProfileId::new(),
            "What does Acme sell?",
            "Industrial anvils.",
            sources,
        )
    }

    #[test]
    fn render_with_sources() {
        let r = sample(vec!["https://acme.test".into(), "https://wiki.test/acme".into()]);
        assert_eq!(
            r.render(),
            "**RESEARCH: What does Acme sell?**\nIndustrial anvils.\nSources: https://acme.test, https://wiki.test/acme"
        );
    }

    #[test]
    fn render_without_sources_has_no_trailer() {
        let r = sample(Vec::new());
        assert_eq!(r.render(), "**RESEARCH: What does Acme sell?**\nIndustrial anvils.");
    }

    #[test]
    fn record_roundtrip_keeps_source_order() {
        let mut r = sample(vec!["b".into(), "a".into()]);
        r.appended_to_context = true;
        let back = ResearchRecord::from_record(&r.to_record());
        assert_eq!(back, r);
        assert_eq!(back.sources, vec!["b", "a"]);
    }
}
