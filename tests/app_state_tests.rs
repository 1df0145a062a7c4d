//! End-to-end flows through the window state, without rendering

mod common;

use common::{test_context, Answer, FakeClipboard, FakeDevice, FakeElement, FakeShareSheet};
use prose_pause::config::AppConfig;
use prose_pause::context::AppContext;
use prose_pause::drafts::{draft_key, WritingDraft};
use prose_pause::notices::NoticeLevel;
use prose_pause::playback::{Transport, TransportKey};
use prose_pause::share::ShareOutcome;
use prose_pause::ui::{AppState, DraftForm, Platform, RecoveryChoice};
use prose_pause::ProseError;
use std::time::Duration;

fn state_with(context: AppContext, sheet: FakeShareSheet, clipboard: FakeClipboard) -> (AppState, common::MicProbe) {
    let (device, mic) = FakeDevice::new(Answer::Grant);
    let (element, _probe) = FakeElement::new();
    let platform = Platform {
        device: Box::new(device),
        element: Box::new(element),
        share_sheet: Box::new(sheet),
        clipboard: Box::new(clipboard),
    };
    (AppState::new(context, platform), mic)
}

fn record(state: &mut AppState, mic: &common::MicProbe, topic: &str) {
    state.speech.value_mut().topic = topic.to_string();
    state.toggle_recording();
    mic.push(vec![0.2; 1600]);
    state.poll();
    state.toggle_recording();
}

#[test]
fn test_recovery_offered_after_restart() {
    let (context, _store, _clock) = test_context(AppConfig::default());
    {
        let mut state = AppState::headless(context.clone());
        state.writing.value_mut().title = "Unfinished".into();
        state.window_focus_changed(false);
    }

    let mut state = AppState::headless(context.clone());
    assert!(state.has_pending_recovery());
    assert_eq!(state.recovered_writing.as_ref().unwrap().payload.title, "Unfinished");
    assert!(state.recovered_speech.is_none());

    state.resolve_recovery(DraftForm::Writing, RecoveryChoice::Keep);
    assert_eq!(state.writing.value().title, "Unfinished");
    assert!(!state.writing.has_unsaved_changes());
    assert!(!state.has_pending_recovery());
}

#[test]
fn test_discard_clears_stored_draft() {
    let (context, _store, _clock) = test_context(AppConfig::default());
    {
        let mut state = AppState::headless(context.clone());
        state.writing.value_mut().content = "Throwaway".into();
    }

    let mut state = AppState::headless(context.clone());
    state.resolve_recovery(DraftForm::Writing, RecoveryChoice::Discard);
    assert!(state.writing.value().content.is_empty());
    assert!(context.drafts().recover::<WritingDraft>(&draft_key("writing", None)).is_none());
}

#[test]
fn test_edits_made_before_discard_survive_restart() {
    let config = AppConfig::default().with_autosave_interval(Duration::from_secs(10));
    let (context, _store, clock) = test_context(config);
    {
        let mut state = AppState::headless(context.clone());
        state.writing.value_mut().content = "Old draft".into();
        state.window_focus_changed(false);
    }

    let mut state = AppState::headless(context.clone());
    assert!(state.has_pending_recovery());

    // The user types while the recovery banner is still open
    state.writing.value_mut().content = "brand new paragraph".into();
    clock.advance(Duration::from_secs(11));
    state.poll();

    state.resolve_recovery(DraftForm::Writing, RecoveryChoice::Discard);
    assert_eq!(state.writing.value().content, "brand new paragraph");
    assert!(state.writing.has_unsaved_changes());

    state.shutdown();
    drop(state);

    let state = AppState::headless(context.clone());
    let recovered = state.recovered_writing.as_ref().expect("typed text was kept");
    assert_eq!(recovered.payload.content, "brand new paragraph");
}

#[test]
fn test_kept_draft_replaces_newer_stored_edits() {
    let config = AppConfig::default().with_autosave_interval(Duration::from_secs(10));
    let (context, _store, clock) = test_context(config);
    {
        let mut state = AppState::headless(context.clone());
        state.writing.value_mut().title = "Old title".into();
        state.window_focus_changed(false);
    }

    let mut state = AppState::headless(context.clone());
    state.writing.value_mut().title = "Typed meanwhile".into();
    clock.advance(Duration::from_secs(11));
    state.poll();

    state.resolve_recovery(DraftForm::Writing, RecoveryChoice::Keep);
    assert_eq!(state.writing.value().title, "Old title");

    let stored = context.drafts().recover::<WritingDraft>(state.writing.key()).unwrap();
    assert_eq!(stored.payload.title, "Old title");
}

#[test]
fn test_interval_autosave_runs_from_poll() {
    let config = AppConfig::default().with_autosave_interval(Duration::from_secs(30));
    let (context, _store, clock) = test_context(config);
    let mut state = AppState::headless(context.clone());

    state.writing.value_mut().content = "Draft".into();
    clock.advance(Duration::from_secs(30));
    state.poll();

    assert!(state.writing.last_saved().is_some());
    assert!(context.drafts().recover::<WritingDraft>(state.writing.key()).is_some());
}

#[test]
fn test_recording_loads_into_player() {
    let (context, _store, _clock) = test_context(AppConfig::default());
    let (mut state, mic) = state_with(context, FakeShareSheet::answering(Ok(())), FakeClipboard::default());

    record(&mut state, &mic, "My hometown");

    let session = state.recorder.library().latest().unwrap().clone();
    assert_eq!(session.source_label, "My hometown");
    assert_eq!(state.player.asset().map(|a| a.id()), Some(session.asset.id()));
    assert_eq!(state.player.transport(), Transport::Paused);

    assert!(state.handle_key(TransportKey::Space, false));
    assert_eq!(state.player.transport(), Transport::Playing);
    assert!(!state.handle_key(TransportKey::Space, true));
}

#[test]
fn test_untitled_recording_label() {
    let (context, _store, _clock) = test_context(AppConfig::default());
    let (mut state, mic) = state_with(context, FakeShareSheet::answering(Ok(())), FakeClipboard::default());

    record(&mut state, &mic, "   ");
    assert_eq!(state.recorder.library().latest().unwrap().source_label, "Untitled recording");
}

#[test]
fn test_deleting_loaded_session_unloads_player() {
    let (context, _store, _clock) = test_context(AppConfig::default());
    let (mut state, mic) = state_with(context.clone(), FakeShareSheet::answering(Ok(())), FakeClipboard::default());

    record(&mut state, &mic, "Short");
    let id = state.recorder.library().latest().unwrap().id;
    state.play_session(id);
    assert!(state.player.is_playing());

    assert!(state.delete_session(id));
    assert_eq!(state.player.transport(), Transport::Empty);
    assert_eq!(context.assets.live_count(), 0);
}

#[test]
fn test_share_falls_back_to_copy_with_info_notice() {
    let (context, _store, _clock) = test_context(AppConfig::default());
    let clipboard = FakeClipboard::default();
    let writes = clipboard.writes.clone();
    let (mut state, mic) = state_with(
        context.clone(),
        FakeShareSheet::answering(Err(ProseError::ShareFailure("no".into()))),
        clipboard,
    );

    record(&mut state, &mic, "Shared take");
    let id = state.recorder.library().latest().unwrap().id;

    assert_eq!(state.share_session(id), Some(ShareOutcome::Copied));
    assert_eq!(writes.borrow().len(), 1);
    assert_eq!(context.notices.latest().unwrap().level, NoticeLevel::Info);
}

#[test]
fn test_export_and_save_writing() {
    let dir = tempfile::tempdir().unwrap();
    let (context, _store, _clock) = test_context(AppConfig::default());
    let (mut state, mic) = state_with(context.clone(), FakeShareSheet::answering(Ok(())), FakeClipboard::default());
    state.export_dir = dir.path().to_path_buf();

    record(&mut state, &mic, "Closing remarks");
    let id = state.recorder.library().latest().unwrap().id;
    let wav = state.export_session(id).expect("exported");
    assert!(wav.exists());
    assert!(wav.file_name().unwrap().to_string_lossy().starts_with("closing-remarks-"));

    state.writing.value_mut().title = "On Rivers".into();
    state.writing.value_mut().content = "They bend.".into();
    state.writing.save_now();
    let md = state.save_writing().expect("saved");
    assert_eq!(md.file_name().unwrap(), "on-rivers.md");
    assert!(std::fs::read_to_string(&md).unwrap().contains("They bend."));

    // The draft is no longer needed
    assert!(!state.writing.has_unsaved_changes());
    assert!(context.drafts().recover::<WritingDraft>(state.writing.key()).is_none());
}

#[test]
fn test_shutdown_saves_and_releases() {
    let (context, _store, _clock) = test_context(AppConfig::default());
    let (mut state, mic) = state_with(context.clone(), FakeShareSheet::answering(Ok(())), FakeClipboard::default());

    state.speech.value_mut().topic = "Mid-recording".into();
    state.toggle_recording();
    assert_eq!(mic.live_streams(), 1);

    state.shutdown();
    assert_eq!(mic.live_streams(), 0);
    assert!(state.recorder.library().is_empty());
    assert!(context.drafts().recover::<prose_pause::drafts::SpeechDraft>("draft:speech:new").is_some());

    // A second call is harmless
    state.shutdown();
}
