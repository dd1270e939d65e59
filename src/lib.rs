//! # cue
//!
//! Profile-driven prompt context. Re-exports the workspace crates and wires
//! storage to the prompt composer.
//!
//! ```text
//! CueSettings ──► StorageManager ──► PromptService ──► system prompt
//!                                      ▲
//!                      PromptComposer ─┘
//! ```

#![deny(unsafe_code)]

pub use cue_core as core;
pub use cue_prompt as prompt;
pub use cue_settings as settings;
pub use cue_store as store;
pub use cue_telemetry as telemetry;

use cue_core::{Profile, ProfileFile, ProfileId, ResearchRecord};
use cue_prompt::{resolve_universal_prompt, ProfilePrompt, PromptComposer};
use cue_settings::CueSettings;
use cue_store::StorageManager;
use tracing::{debug, info};

/// Builds system prompts from stored profiles and applies data retention.
#[derive(Clone, Debug)]
pub struct PromptService {
    store: StorageManager,
    composer: PromptComposer,
    personal_context: String,
    retention_days: Option<u32>,
}

/// A profile with everything composition reads for it.
struct Loaded {
    profile: Profile,
    files: Vec<ProfileFile>,
    research: Vec<ResearchRecord>,
}

impl PromptService {
    pub fn new(store: StorageManager, settings: &CueSettings) -> Self {
        Self {
            store,
            composer: PromptComposer::new(resolve_universal_prompt(
                &settings.universal_system_prompt,
            )),
            personal_context: settings.personal_context.clone(),
            retention_days: settings.data.auto_delete_sessions_days,
        }
    }

    pub fn store(&self) -> &StorageManager {
        &self.store
    }

    pub fn composer(&self) -> &PromptComposer {
        &self.composer
    }

    /// Full composition for an existing profile, otherwise the universal
    /// prompt with personal context only.
    pub fn system_prompt(&self, profile_id: Option<&ProfileId>) -> String {
        match self.load(profile_id) {
            Some(loaded) => self.composer.compose(&self.input(&loaded)),
            None => self.composer.compose_basic(&self.personal_context),
        }
    }

    /// Length estimate over the same inputs as [`PromptService::system_prompt`].
    pub fn estimate(&self, profile_id: Option<&ProfileId>) -> usize {
        match self.load(profile_id) {
            Some(loaded) => self.composer.estimate_length(&self.input(&loaded)),
            None => self.composer.estimate_basic_length(&self.personal_context),
        }
    }

    /// Delete sessions older than the configured retention window.
    /// Returns how many were removed; 0 when retention is off.
    pub fn apply_retention(&self) -> cue_store::Result<usize> {
        let Some(days) = self.retention_days else {
            debug!("session retention disabled");
            return Ok(0);
        };
        let removed = self.store.cleanup_old_sessions(days)?;
        if removed > 0 {
            info!(days, removed, "retention removed old sessions");
        }
        Ok(removed)
    }

    fn load(&self, profile_id: Option<&ProfileId>) -> Option<Loaded> {
        let id = profile_id?;
        let Some(profile) = self.store.get_profile(id) else {
            debug!(profile_id = %id, "profile not found, composing basic prompt");
            return None;
        };
        Some(Loaded {
            files: self.store.list_profile_files(Some(id)),
            research: self.store.list_research(Some(id)),
            profile,
        })
    }

    fn input<'a>(&'a self, loaded: &'a Loaded) -> ProfilePrompt<'a> {
        ProfilePrompt::new(&loaded.profile)
            .with_files(&loaded.files)
            .with_research(&loaded.research)
            .with_personal_context(&self.personal_context)
    }
}
