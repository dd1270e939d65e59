//! Settings → storage → composition, through the public surface only.

use chrono::Duration;
use cue::core::{
    InteractionType, Profile, ProfileFile, ProfileId, ProfileType, ResearchRecord, Session,
    SessionInteraction,
};
use cue::prompt::{SectionKind, READY_SENTINEL};
use cue::settings::{load_settings_from_path, save_settings_to_path, CueSettings};
use cue::store::{ListSessionsOptions, StorageManager, StoreConfig};
use cue::PromptService;

struct Harness {
    _dir: tempfile::TempDir,
    settings: CueSettings,
    store: StorageManager,
}

fn harness(configure: impl FnOnce(&mut CueSettings)) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = CueSettings::default();
    settings.database.path = dir.path().join("data").join("cue.db");
    configure(&mut settings);

    let path = dir.path().join("settings.json");
    save_settings_to_path(&settings, &path).unwrap();
    let settings = load_settings_from_path(&path).unwrap();
    let store = StorageManager::open(&StoreConfig::from_settings(&settings.database)).unwrap();
    Harness {
        _dir: dir,
        settings,
        store,
    }
}

fn interview_profile() -> Profile {
    let mut p = Profile::new("Backend interview", ProfileType::Interview);
    p.purpose = "Ace the interview".into();
    p.behavior_instructions = "Answer with STAR stories.".into();
    p
}

#[test]
fn full_prompt_from_stored_profile() {
    let h = harness(|s| {
        s.personal_context = "5 years backend experience".into();
        s.universal_system_prompt = "You are Cue.".into();
    });
    let profile = interview_profile();
    h.store.create_profile(&profile).unwrap();
    h.store
        .create_profile_file(
            &ProfileFile::new(&profile.id, "resume.txt", "/files/resume.txt", "text/plain")
                .with_extracted_text("Rust, Postgres, Kafka"),
        )
        .unwrap();
    h.store
        .create_research(&ResearchRecord::new(
            &profile.id,
            "What does the company build?",
            "Payments infrastructure.",
            vec!["https://example.test/about".into()],
        ))
        .unwrap();

    let service = PromptService::new(h.store.clone(), &h.settings);
    let prompt = service.system_prompt(Some(&profile.id));

    let order: Vec<usize> = [
        "You are Cue.",
        "**PERSONAL CONTEXT:**\n5 years backend experience",
        "**PROFILE PURPOSE:**\nAce the interview",
        "**BEHAVIOR INSTRUCTIONS:**",
        "**UPLOADED FILES:**\n**FILE: resume.txt**\nRust, Postgres, Kafka",
        "**RESEARCH FINDINGS:**\n**RESEARCH: What does the company build?**",
        "Sources: https://example.test/about",
    ]
    .iter()
    .map(|needle| prompt.find(needle).unwrap_or_else(|| panic!("missing {needle:?}")))
    .collect();
    assert!(order.windows(2).all(|w| w[0] < w[1]), "{order:?}");
    assert!(!prompt.contains("**ADDITIONAL CONTEXT:**"));
    assert!(!prompt.contains("**CUSTOM INSTRUCTIONS:**"));
    assert_eq!(prompt.matches(READY_SENTINEL).count(), 1);
    assert!(prompt.ends_with(READY_SENTINEL));

    let estimate = service.estimate(Some(&profile.id));
    assert!(estimate >= prompt.chars().count() / 2, "{estimate}");
}

#[test]
fn unknown_or_missing_profile_gets_basic_prompt() {
    let h = harness(|s| s.personal_context = "Prefers bullet points".into());
    let service = PromptService::new(h.store.clone(), &h.settings);

    let basic = service.system_prompt(None);
    assert_eq!(service.system_prompt(Some(&ProfileId::new())), basic);
    assert!(basic.contains("**PERSONAL CONTEXT:**\nPrefers bullet points"));
    assert!(!basic.contains("**PROFILE PURPOSE:**"));
    assert!(basic.ends_with(READY_SENTINEL));
    let estimate = service.estimate(None);
    assert_eq!(estimate, service.composer().estimate_basic_length("Prefers bullet points"));
    assert!(estimate >= basic.chars().count(), "{estimate}");
}

#[test]
fn blank_universal_setting_uses_bundled_prompt() {
    let h = harness(|s| s.personal_context = "5 years backend experience".into());
    let profile = interview_profile();
    h.store.create_profile(&profile).unwrap();
    let service = PromptService::new(h.store.clone(), &h.settings);

    for prompt in [service.system_prompt(None), service.system_prompt(Some(&profile.id))] {
        assert!(prompt.starts_with("You are Cue"));
        assert_eq!(prompt.matches(READY_SENTINEL).count(), 1, "{prompt}");
        assert!(prompt.ends_with("\n\nI'm ready to help!"));
    }
}

#[test]
fn deleting_profile_updates_its_prompt_and_keeps_sessions() {
    let h = harness(|s| s.universal_system_prompt = "U".into());
    let profile = interview_profile();
    h.store.create_profile(&profile).unwrap();
    let session = Session::new("Mock interview", Some(&profile.id));
    h.store.create_session(&session).unwrap();

    let service = PromptService::new(h.store.clone(), &h.settings);
    let preview = service.composer().preview(&cue::prompt::ProfilePrompt::new(&profile));
    assert!(preview.includes(SectionKind::ProfilePurpose));

    assert!(h.store.delete_profile(&profile.id).unwrap());
    assert_eq!(service.system_prompt(Some(&profile.id)), "U\n\nI'm ready to help!");

    let orphan = h.store.get_session(&session.id).unwrap();
    assert_eq!(orphan.profile_id, None);
    let listed = h.store.list_sessions(&ListSessionsOptions::default());
    assert_eq!(listed.len(), 1);
}

#[test]
fn retention_removes_only_expired_sessions() {
    let h = harness(|s| s.data.auto_delete_sessions_days = Some(30));
    let mut old = Session::new("last quarter", None);
    old.start_time -= Duration::days(45);
    let mut recent = Session::new("last week", None);
    recent.start_time -= Duration::days(5);
    h.store.create_session(&old).unwrap();
    h.store.create_session(&recent).unwrap();
    h.store
        .create_interaction(&SessionInteraction::new(
            &old.id,
            InteractionType::UserPrompt,
            "How did it go?",
            "Well.",
        ))
        .unwrap();

    let service = PromptService::new(h.store.clone(), &h.settings);
    assert_eq!(service.apply_retention().unwrap(), 1);
    assert!(h.store.get_session(&old.id).is_none());
    assert!(h.store.get_session(&recent.id).is_some());
    assert!(h.store.list_interactions(Some(&old.id)).is_empty());
    assert_eq!(service.apply_retention().unwrap(), 0);
}

#[test]
fn retention_disabled_by_default() {
    let h = harness(|_| {});
    let mut ancient = Session::new("ancient", None);
    ancient.start_time -= Duration::days(4000);
    h.store.create_session(&ancient).unwrap();

    let service = PromptService::new(h.store.clone(), &h.settings);
    assert_eq!(service.apply_retention().unwrap(), 0);
    assert_eq!(h.store.stats().sessions, 1);
}

#[test]
fn session_lifecycle_through_store() {
    let h = harness(|_| {});
    let mut session = Session::new("Standup", None);
    session.start_time -= Duration::seconds(125);
    h.store.create_session(&session).unwrap();
    for (i, text) in ["first", "second"].into_iter().enumerate() {
        let mut interaction =
            SessionInteraction::new(&session.id, InteractionType::Voice, text, "ok");
        interaction.timestamp = session.start_time + Duration::seconds(i as i64 + 1);
        h.store.create_interaction(&interaction).unwrap();
    }

    assert!(h.store.finalize_session(&session.id).unwrap());
    let done = h.store.get_session(&session.id).unwrap();
    assert!(done.is_finished());
    let duration = done.duration_seconds.unwrap();
    assert!((125..=130).contains(&duration), "{duration}");

    let contents: Vec<_> = h
        .store
        .list_interactions(Some(&session.id))
        .into_iter()
        .map(|i| i.content)
        .collect();
    assert_eq!(contents, ["first", "second"]);
}
