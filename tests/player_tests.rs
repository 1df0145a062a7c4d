//! Playback controller scenarios with a scripted media element

mod common;

use common::{test_context, ElementProbe, FakeElement, PlayAnswer};
use prose_pause::assets::{AssetHandle, AudioClip};
use prose_pause::config::AppConfig;
use prose_pause::context::AppContext;
use prose_pause::notices::NoticeLevel;
use prose_pause::playback::{MediaEvent, Player, TimelineElement, Transport, TransportKey};
use prose_pause::ProseError;
use std::time::Duration;

/// A silent clip of `seconds` at 1 kHz
fn clip(context: &AppContext, seconds: usize) -> AssetHandle {
    context.assets.create(AudioClip::new(vec![0.0; seconds * 1000], 1000, 1))
}

fn player(context: &AppContext) -> (Player, ElementProbe) {
    let (element, probe) = FakeElement::new();
    (context.player(Box::new(element)), probe)
}

#[test]
fn test_load_then_play_and_pause() {
    let (context, _store, _clock) = test_context(AppConfig::default());
    let (mut player, probe) = player(&context);
    assert_eq!(player.transport(), Transport::Empty);
    assert!(!player.play());

    let asset = clip(&context, 10);
    player.load(asset.clone());
    assert_eq!(player.transport(), Transport::Paused);
    assert_eq!(player.duration_secs(), 10.0);
    assert_eq!(player.state().asset_ref.as_deref(), Some(asset.reference()));

    assert!(player.play());
    assert_eq!(player.transport(), Transport::Playing);
    player.pause();
    assert_eq!(player.transport(), Transport::Paused);
    assert_eq!(probe.count("play"), 1);
    assert_eq!(probe.count("pause"), 1);
}

#[test]
fn test_volume_is_clamped() {
    let (context, _store, _clock) = test_context(AppConfig::default());
    let (mut player, probe) = player(&context);

    player.set_volume(1.7);
    assert_eq!(player.volume(), 1.0);
    player.set_volume(-0.3);
    assert_eq!(player.volume(), 0.0);
    player.set_volume(f32::NAN);
    assert_eq!(player.volume(), 0.0);
    player.set_volume(0.4);
    assert_eq!(probe.last_call().as_deref(), Some("volume 0.40"));
}

#[test]
fn test_mute_restores_previous_volume() {
    let (context, _store, _clock) = test_context(AppConfig::default());
    let (mut player, _probe) = player(&context);

    player.set_volume(0.6);
    player.toggle_mute();
    assert_eq!(player.volume(), 0.0);
    player.toggle_mute();
    assert!((player.volume() - 0.6).abs() < f32::EPSILON);
}

#[test]
fn test_seek_is_clamped_to_duration() {
    let (context, _store, _clock) = test_context(AppConfig::default());
    let (mut player, _probe) = player(&context);
    player.load(clip(&context, 10));

    assert_eq!(player.seek(-4.0), 0.0);
    assert_eq!(player.seek(25.0), 10.0);
    assert_eq!(player.seek(f64::NAN), 10.0);
    assert_eq!(player.seek_fraction(0.25), 2.5);
    assert_eq!(player.step(5.0), 7.5);
    assert_eq!(player.step(5.0), 10.0);
    assert_eq!(player.step(-20.0), 0.0);
}

#[test]
fn test_loading_new_asset_releases_previous_once() {
    let (context, _store, _clock) = test_context(AppConfig::default());
    let (mut player, probe) = player(&context);

    let first = clip(&context, 10);
    let first_id = first.id();
    player.load(first.clone());
    player.play();
    assert_eq!(first.holders(), 2);

    let second = clip(&context, 4);
    player.load(second.clone());

    assert_eq!(probe.count("unload"), 1);
    assert_eq!(probe.count("pause"), 1);
    assert_eq!(first.holders(), 1);
    assert_eq!(player.asset().map(|a| a.id()), Some(second.id()));
    assert_eq!(player.transport(), Transport::Paused);
    assert_eq!(player.duration_secs(), 4.0);

    drop(first);
    assert!(!context.assets.is_live(first_id));
    assert!(context.assets.is_live(second.id()));
}

#[test]
fn test_stale_events_from_previous_asset_are_ignored() {
    let (context, _store, _clock) = test_context(AppConfig::default());
    let (mut player, probe) = player(&context);

    let first = clip(&context, 10);
    player.load(first.clone());
    player.play();
    let second = clip(&context, 4);
    player.load(second.clone());

    probe.emit(&first, MediaEvent::TimeUpdate { position_secs: 9.0 });
    probe.emit(&first, MediaEvent::Ended);
    player.poll();

    assert_eq!(player.position_secs(), 0.0);
    assert_eq!(player.duration_secs(), 4.0);
    assert!(context.notices.is_empty());
}

#[test]
fn test_rejected_play_reverts_to_paused() {
    let (context, _store, _clock) = test_context(AppConfig::default());
    let (mut player, probe) = player(&context);
    probe.set_play_answer(PlayAnswer::Reject);

    player.load(clip(&context, 3));
    assert!(!player.play());
    assert_eq!(player.transport(), Transport::Paused);

    let notice = context.notices.latest().expect("a notice");
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.message, ProseError::PlaybackFailure(String::new()).user_message());
}

#[test]
fn test_deferred_play_rejection_applies_on_poll() {
    let (context, _store, _clock) = test_context(AppConfig::default());
    let (mut player, probe) = player(&context);
    probe.set_play_answer(PlayAnswer::Defer);

    player.load(clip(&context, 3));
    assert!(player.play());
    assert!(player.is_playing());

    probe.resolve_play(Err(ProseError::PlaybackFailure("blocked".into())));
    player.poll();
    assert!(!player.is_playing());
    assert_eq!(context.notices.len(), 1);
}

#[test]
fn test_end_of_media_pauses_at_duration() {
    let (context, _store, _clock) = test_context(AppConfig::default());
    let (mut player, probe) = player(&context);
    let asset = clip(&context, 5);
    player.load(asset.clone());
    player.play();

    probe.emit(&asset, MediaEvent::TimeUpdate { position_secs: 2.0 });
    player.poll();
    assert_eq!(player.position_secs(), 2.0);
    assert!(player.is_playing());

    probe.emit(&asset, MediaEvent::Ended);
    player.poll();
    assert_eq!(player.transport(), Transport::Paused);
    assert_eq!(player.position_secs(), 5.0);

    // Playing again starts over
    assert!(player.play());
    assert_eq!(player.position_secs(), 0.0);
}

#[test]
fn test_element_error_reports_notice() {
    let (context, _store, _clock) = test_context(AppConfig::default());
    let (mut player, probe) = player(&context);
    let asset = clip(&context, 5);
    player.load(asset.clone());
    player.play();

    probe.emit(&asset, MediaEvent::Error("decode error".into()));
    player.poll();
    assert!(!player.is_playing());
    assert_eq!(context.notices.latest().unwrap().level, NoticeLevel::Error);
}

#[test]
fn test_failed_load_leaves_player_empty() {
    let (context, _store, _clock) = test_context(AppConfig::default());
    let (mut player, probe) = player(&context);
    probe.set_fail_load(true);

    let asset = clip(&context, 5);
    player.load(asset.clone());
    assert_eq!(player.transport(), Transport::Empty);
    assert_eq!(asset.holders(), 1);
    assert_eq!(context.notices.len(), 1);
}

#[test]
fn test_keys_ignored_while_typing() {
    let (context, _store, _clock) = test_context(AppConfig::default());
    let (mut player, _probe) = player(&context);

    // Nothing loaded yet
    assert!(!player.handle_key(TransportKey::Space, false));

    player.load(clip(&context, 30));
    assert!(!player.handle_key(TransportKey::Space, true));
    assert!(!player.handle_key(TransportKey::ArrowRight, true));
    assert_eq!(player.transport(), Transport::Paused);
    assert_eq!(player.position_secs(), 0.0);

    assert!(player.handle_key(TransportKey::ArrowRight, false));
    assert_eq!(player.position_secs(), 5.0);
    assert!(player.handle_key(TransportKey::ArrowLeft, false));
    assert!(player.handle_key(TransportKey::ArrowLeft, false));
    assert_eq!(player.position_secs(), 0.0);
    assert!(player.handle_key(TransportKey::Space, false));
    assert_eq!(player.transport(), Transport::Playing);
}

#[test]
fn test_drop_releases_loaded_asset() {
    let (context, _store, _clock) = test_context(AppConfig::default());
    let (mut player, probe) = player(&context);
    let asset = clip(&context, 5);
    player.load(asset.clone());
    player.play();

    drop(player);
    assert_eq!(probe.count("unload"), 1);
    assert_eq!(asset.holders(), 1);
}

#[test]
fn test_timeline_element_plays_through() {
    let (context, _store, clock) = test_context(AppConfig::default());
    let mut player = context.player(Box::new(TimelineElement::new(context.clock.clone())));
    player.load(clip(&context, 2));
    player.play();

    clock.advance(Duration::from_millis(1500));
    player.poll();
    assert!((player.position_secs() - 1.5).abs() < 1e-6);
    assert!(player.is_playing());

    clock.advance(Duration::from_secs(1));
    player.poll();
    assert!(!player.is_playing());
    assert_eq!(player.position_secs(), 2.0);
}
