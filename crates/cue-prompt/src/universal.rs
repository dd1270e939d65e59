//! The bundled universal prompt.
//!
//! `prompts/universal.md` carries a documentation preamble above the
//! `## Core Identity and Purpose` heading. Only the text after that heading
//! reaches the model.

use std::sync::OnceLock;

use tracing::warn;

const DOCUMENT: &str = include_str!("../prompts/universal.md");

const BODY_MARKER: &str = "## Core Identity and Purpose";

/// The universal prompt used when settings leave it empty.
pub fn default_universal_prompt() -> &'static str {
    static PROMPT: OnceLock<String> = OnceLock::new();
    PROMPT.get_or_init(|| {
        extract_body(DOCUMENT).unwrap_or_else(|| {
            warn!("bundled universal prompt has no body marker, sending it whole");
            DOCUMENT.trim().to_string()
        })
    })
}

/// `configured` when it has content, otherwise the bundled default.
pub fn resolve_universal_prompt(configured: &str) -> String {
    let configured = configured.trim();
    if configured.is_empty() {
        default_universal_prompt().to_string()
    } else {
        configured.to_string()
    }
}

/// Text after the marker line, minus single-`#` title lines.
fn extract_body(document: &str) -> Option<String> {
    let mut lines = document.lines();
    lines.by_ref().find(|line| line.trim() == BODY_MARKER)?;

    let body = lines
        .filter(|line| !(line.starts_with('#') && !line.starts_with("##")))
        .collect::<Vec<_>>()
        .join("\n");
    let body = body.trim();
    (!body.is_empty()).then(|| body.to_string())
}
