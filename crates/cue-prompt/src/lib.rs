//! # cue-prompt
//!
//! Assembles a profile, its uploaded files, its research and the user's
//! personal context into one system prompt with a fixed section order.
//!
//! - **[`PromptComposer`]**: composition, section listing, preview, length estimate
//! - **[`universal`]**: the bundled default universal prompt

#![deny(unsafe_code)]

mod composer;
mod estimate;
mod section;
pub mod universal;

pub use composer::{ProfilePrompt, PromptComposer, READY_SENTINEL};
pub use section::{PromptSection, SectionKind, SectionPreview};
pub use universal::{default_universal_prompt, resolve_universal_prompt};
