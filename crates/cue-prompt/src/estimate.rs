//! Length estimate for a composed prompt.
//!
//! Each present field contributes its length plus a fixed allowance for its
//! header and separators. The allowances are tuning knobs, not derived from
//! the exact header text.

use crate::composer::ProfilePrompt;

const PERSONAL_CONTEXT_OVERHEAD: usize = 30;
const PURPOSE_OVERHEAD: usize = 25;
const BEHAVIOR_OVERHEAD: usize = 35;
const ADDITIONAL_CONTEXT_OVERHEAD: usize = 30;
const FILE_OVERHEAD: usize = 20;
const RESEARCH_OVERHEAD: usize = 30;
const SOURCES_OVERHEAD: usize = 20;
const CUSTOM_OVERHEAD: usize = 35;
const CLOSING_OVERHEAD: usize = 25;

fn len(s: &str) -> usize {
    s.chars().count()
}

fn field(s: &str, overhead: usize) -> usize {
    if s.is_empty() {
        0
    } else {
        len(s) + overhead
    }
}

pub(crate) fn estimate(universal: &str, input: &ProfilePrompt<'_>) -> usize {
    let profile = input.profile;
    let mut total = len(universal);

    total += field(input.personal_context, PERSONAL_CONTEXT_OVERHEAD);
    total += field(&profile.purpose, PURPOSE_OVERHEAD);
    total += field(&profile.behavior_instructions, BEHAVIOR_OVERHEAD);
    total += field(&profile.additional_context, ADDITIONAL_CONTEXT_OVERHEAD);

    total += input
        .files
        .iter()
        .filter_map(|f| {
            let text = f.extracted_text.as_deref().filter(|t| !t.is_empty())?;
            Some(len(text) + len(&f.filename) + FILE_OVERHEAD)
        })
        .sum::<usize>();

    total += input
        .research
        .iter()
        .map(|r| {
            let sources = if r.sources.is_empty() {
                0
            } else {
                r.sources.iter().map(|s| len(s)).sum::<usize>() + SOURCES_OVERHEAD
            };
            len(&r.question) + len(&r.answer) + RESEARCH_OVERHEAD + sources
        })
        .sum::<usize>();

    total += field(
        profile.custom_system_prompt.as_deref().unwrap_or_default(),
        CUSTOM_OVERHEAD,
    );

    total + CLOSING_OVERHEAD
}

pub(crate) fn estimate_basic(universal: &str, personal_context: &str) -> usize {
    len(universal) + field(personal_context, PERSONAL_CONTEXT_OVERHEAD) + CLOSING_OVERHEAD
}
