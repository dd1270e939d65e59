use cue_core::{Profile, ProfileFile, ResearchRecord};
use tracing::debug;

use crate::section::{PromptSection, SectionKind, SectionPreview};

/// Closing line every composed prompt ends with, exactly once.
pub const READY_SENTINEL: &str = "I'm ready to help!";

/// Everything one composition reads. Borrowed so callers can compose from
/// whatever they already loaded.
#[derive(Clone, Copy, Debug)]
pub struct ProfilePrompt<'a> {
    pub profile: &'a Profile,
    pub files: &'a [ProfileFile],
    pub research: &'a [ResearchRecord],
    pub personal_context: &'a str,
}

impl<'a> ProfilePrompt<'a> {
    pub fn new(profile: &'a Profile) -> Self {
        Self {
            profile,
            files: &[],
            research: &[],
            personal_context: "",
        }
    }

    pub fn with_files(mut self, files: &'a [ProfileFile]) -> Self {
        self.files = files;
        self
    }

    pub fn with_research(mut self, research: &'a [ResearchRecord]) -> Self {
        self.research = research;
        self
    }

    pub fn with_personal_context(mut self, personal_context: &'a str) -> Self {
        self.personal_context = personal_context;
        self
    }
}

/// Builds system prompts around a fixed universal prompt.
#[derive(Clone, Debug)]
pub struct PromptComposer {
    universal: String,
}

impl PromptComposer {
    /// A trailing [`READY_SENTINEL`] on the universal prompt is dropped; the
    /// composed prompt appends its own.
    pub fn new(universal_prompt: impl Into<String>) -> Self {
        Self {
            universal: strip_sentinel(universal_prompt.into()),
        }
    }

    pub fn universal_prompt(&self) -> &str {
        &self.universal
    }

    /// The non-empty sections of a full composition, in emission order.
    pub fn sections(&self, input: &ProfilePrompt<'_>) -> Vec<PromptSection> {
        let profile = input.profile;

        let files = input
            .files
            .iter()
            .filter_map(|f| {
                let text = f.extracted_text.as_deref()?.trim();
                (!text.is_empty()).then(|| format!("**FILE: {}**\n{text}", f.filename))
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        let research = input
            .research
            .iter()
            .filter(|r| !r.answer.trim().is_empty())
            .map(|r| {
                let mut r = r.clone();
                r.answer = r.answer.trim().to_string();
                r.render()
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        [
            (SectionKind::Universal, self.universal.as_str()),
            (SectionKind::PersonalContext, input.personal_context),
            (SectionKind::ProfilePurpose, profile.purpose.as_str()),
            (
                SectionKind::BehaviorInstructions,
                profile.behavior_instructions.as_str(),
            ),
            (SectionKind::AdditionalContext, profile.additional_context.as_str()),
            (SectionKind::UploadedFiles, files.as_str()),
            (SectionKind::ResearchFindings, research.as_str()),
            (
                SectionKind::CustomInstructions,
                profile.custom_system_prompt.as_deref().unwrap_or_default(),
            ),
        ]
        .into_iter()
        .filter_map(|(kind, body)| PromptSection::build(kind, body))
        .collect()
    }

    /// Full composition for a profile.
    pub fn compose(&self, input: &ProfilePrompt<'_>) -> String {
        let sections = self.sections(input);
        let prompt = finish(&sections);
        debug!(
            profile_id = %input.profile.id,
            sections = sections.len(),
            chars = prompt.chars().count(),
            "composed system prompt"
        );
        prompt
    }

    /// Universal prompt plus personal context, for when no profile is active.
    pub fn compose_basic(&self, personal_context: &str) -> String {
        let sections: Vec<_> = [
            (SectionKind::Universal, self.universal.as_str()),
            (SectionKind::PersonalContext, personal_context),
        ]
        .into_iter()
        .filter_map(|(kind, body)| PromptSection::build(kind, body))
        .collect();
        finish(&sections)
    }

    pub fn preview(&self, input: &ProfilePrompt<'_>) -> SectionPreview {
        SectionPreview {
            included: self.sections(input).into_iter().map(|s| s.kind).collect(),
        }
    }

    /// Rough character count of [`PromptComposer::compose`] without building
    /// the prompt. Header overheads are fixed allowances, so treat the result
    /// as an estimate for budgeting, not a bound.
    pub fn estimate_length(&self, input: &ProfilePrompt<'_>) -> usize {
        crate::estimate::estimate(&self.universal, input)
    }

    /// Same as [`PromptComposer::estimate_length`], for
    /// [`PromptComposer::compose_basic`].
    pub fn estimate_basic_length(&self, personal_context: &str) -> usize {
        crate::estimate::estimate_basic(&self.universal, personal_context)
    }
}

fn strip_sentinel(universal: String) -> String {
    let trimmed = universal.trim_end();
    match trimmed.strip_suffix(READY_SENTINEL) {
        Some(rest) => rest.trim_end().to_string(),
        None => universal,
    }
}

fn finish(sections: &[PromptSection]) -> String {
    let mut prompt = sections
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    if !prompt.ends_with(READY_SENTINEL) {
        if !prompt.is_empty() {
            prompt.push_str("\n\n");
        }
        prompt.push_str(READY_SENTINEL);
    }
    prompt
}
