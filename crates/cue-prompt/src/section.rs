use serde::Serialize;

/// Prompt sections, in the order they are emitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Universal,
    PersonalContext,
    ProfilePurpose,
    BehaviorInstructions,
    AdditionalContext,
    UploadedFiles,
    ResearchFindings,
    CustomInstructions,
}

impl SectionKind {
    pub const ALL: [SectionKind; 8] = [
        Self::Universal,
        Self::PersonalContext,
        Self::ProfilePurpose,
        Self::BehaviorInstructions,
        Self::AdditionalContext,
        Self::UploadedFiles,
        Self::ResearchFindings,
        Self::CustomInstructions,
    ];

    /// Header line placed above the body. The universal block has none.
    pub fn header(self) -> Option<&'static str> {
        match self {
            Self::Universal => None,
            Self::PersonalContext => Some("**PERSONAL CONTEXT:**"),
            Self::ProfilePurpose => Some("**PROFILE PURPOSE:**"),
            Self::BehaviorInstructions => Some("**BEHAVIOR INSTRUCTIONS:**"),
            Self::AdditionalContext => Some("**ADDITIONAL CONTEXT:**"),
            Self::UploadedFiles => Some("**UPLOADED FILES:**"),
            Self::ResearchFindings => Some("**RESEARCH FINDINGS:**"),
            Self::CustomInstructions => Some("**CUSTOM INSTRUCTIONS:**"),
        }
    }
}

/// A rendered, non-empty section: header (if any) and trimmed body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PromptSection {
    pub kind: SectionKind,
    pub text: String,
}

impl PromptSection {
    /// `None` when the body is blank.
    pub(crate) fn build(kind: SectionKind, body: &str) -> Option<Self> {
        let body = body.trim();
        if body.is_empty() {
            return None;
        }
        let text = match kind.header() {
            Some(header) => format!("{header}\n{body}"),
            None => body.to_string(),
        };
        Some(Self { kind, text })
    }
}

/// Which sections a composition would contain, for display before sending.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SectionPreview {
    pub included: Vec<SectionKind>,
}

impl SectionPreview {
    pub fn includes(&self, kind: SectionKind) -> bool {
        self.included.contains(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_in_emission_order() {
        let mut sorted = SectionKind::ALL;
        sorted.sort();
        assert_eq!(sorted, SectionKind::ALL);
    }

    #[test]
    fn only_universal_is_headerless() {
        let headerless: Vec<_> = SectionKind::ALL
            .into_iter()
            .filter(|k| k.header().is_none())
            .collect();
        assert_eq!(headerless, [SectionKind::Universal]);
    }

    #[test]
    fn blank_body_builds_nothing() {
        assert!(PromptSection::build(SectionKind::ProfilePurpose, " \n\t ").is_none());
    }

    #[test]
    fn preview_serializes_snake_case() {
        let preview = SectionPreview {
            included: vec![SectionKind::Universal, SectionKind::ResearchFindings],
        };
        assert_eq!(
            serde_json::to_value(&preview).unwrap(),
            serde_json::json!({"included": ["universal", "research_findings"]})
        );
    }

    #[test]
    fn body_is_trimmed_under_header() {
        let s = PromptSection::build(SectionKind::ProfilePurpose, "  Ace it \n").unwrap();
        assert_eq!(s.text, "**PROFILE PURPOSE:**\nAce it");
    }
}
