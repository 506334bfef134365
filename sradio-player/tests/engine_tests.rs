//! Integration tests for the PlaybackEngine state machine
//!
//! Drives the engine through a scripted FakeSource and checks the state it
//! reports, the calls it makes on the primitive and the notifications it
//! sends.

mod helpers;

use helpers::{settle, stream_url, test_config, Call, FakeSource, Notification, RecordingDelegate};
use sradio_common::{PlaybackState, PlayerState, RadioEvent, Station};
use sradio_player::{EngineConfig, Error, Interruption, ItemEvent, PlayableAsset, PlaybackEngine};

fn start(source: &FakeSource, delegate: &RecordingDelegate, config: EngineConfig) -> PlaybackEngine {
    PlaybackEngine::builder(source.clone())
        .config(config)
        .delegate(delegate.clone())
        .start()
        .unwrap()
}

fn surf_fm() -> Station {
    Station {
        name: "Surf FM".to_string(),
        stream_url: "http://radio.example.com/surf".to_string(),
        image_url: "https://cdn.example.com/surf.png".to_string(),
        short_desc: "Waves and beats".to_string(),
        long_desc: "Round-the-clock surf rock".to_string(),
    }
}

#[tokio::test]
async fn test_initial_state() {
    let source = FakeSource::new();
    let delegate = RecordingDelegate::new();
    let engine = start(&source, &delegate, test_config());

    let snapshot = settle(&engine).await;
    assert_eq!(snapshot.player_state, PlayerState::UrlNotSet);
    assert_eq!(snapshot.playback_state, PlaybackState::Stopped);
    assert_eq!(snapshot.stream, None);
    assert_eq!(snapshot.track, None);
    assert_eq!(snapshot.volume, 1.0);
    assert!(snapshot.connected);
    assert!(delegate.notifications().is_empty());
}

#[tokio::test]
async fn test_set_stream_none_resets_everything() {
    let source = FakeSource::new();
    let delegate = RecordingDelegate::new();
    let engine = start(&source, &delegate, test_config());

    engine.set_station(Some(surf_fm())).unwrap();
    let snapshot = settle(&engine).await;
    assert!(snapshot.track.is_some());
    assert!(snapshot.is_playing());

    engine.set_stream(None).unwrap();
    let snapshot = settle(&engine).await;
    assert_eq!(snapshot.player_state, PlayerState::UrlNotSet);
    assert_eq!(snapshot.playback_state, PlaybackState::Stopped);
    assert_eq!(snapshot.stream, None);
    assert_eq!(snapshot.track, None);
    assert!(!snapshot.item_attached);
    assert_eq!(source.max_live_items(), 1);
    assert_eq!(delegate.notifications().last(), Some(&Notification::PlayerState(PlayerState::UrlNotSet)));
}

#[tokio::test]
async fn test_set_stream_loads_attaches_and_autoplays() {
    let source = FakeSource::new();
    let delegate = RecordingDelegate::new();
    let engine = start(&source, &delegate, test_config());
    let url = stream_url("live");

    engine.set_stream(Some(url.clone())).unwrap();
    let snapshot = settle(&engine).await;

    assert_eq!(snapshot.stream, Some(url.clone()));
    assert_eq!(snapshot.player_state, PlayerState::Loading);
    assert_eq!(snapshot.playback_state, PlaybackState::Playing);
    assert!(snapshot.item_attached);
    assert_eq!(snapshot.track, None);

    let calls = source.calls();
    assert_eq!(calls.first(), Some(&Call::Load(url.clone())));
    assert!(calls.contains(&Call::Attach(url.clone())));
    assert_eq!(calls.last(), Some(&Call::Play));

    source.emit(ItemEvent::Ready);
    assert_eq!(settle(&engine).await.player_state, PlayerState::ReadyToPlay);

    source.emit(ItemEvent::BufferOk(true));
    assert_eq!(settle(&engine).await.player_state, PlayerState::LoadingFinished);

    assert_eq!(
        delegate.player_states(),
        vec![PlayerState::Loading, PlayerState::ReadyToPlay, PlayerState::LoadingFinished]
    );
    assert_eq!(delegate.playback_states(), vec![PlaybackState::Playing]);
    assert!(delegate.notifications().contains(&Notification::Stream(Some(url))));
}

#[tokio::test]
async fn test_no_duplicate_notifications() {
    let source = FakeSource::new();
    let delegate = RecordingDelegate::new();
    let engine = start(&source, &delegate, test_config());

    engine.set_stream(Some(stream_url("live"))).unwrap();
    settle(&engine).await;

    source.emit(ItemEvent::Ready);
    source.emit(ItemEvent::Ready);
    engine.play().unwrap();
    engine.play().unwrap();
    settle(&engine).await;

    assert_eq!(delegate.player_states(), vec![PlayerState::Loading, PlayerState::ReadyToPlay]);
    assert_eq!(delegate.playback_states(), vec![PlaybackState::Playing]);
}

#[tokio::test]
async fn test_auto_play_off_waits_for_play() {
    let source = FakeSource::new();
    let delegate = RecordingDelegate::new();
    let config = EngineConfig {
        auto_play: false,
        ..test_config()
    };
    let engine = start(&source, &delegate, config);

    engine.set_stream(Some(stream_url("live"))).unwrap();
    let snapshot = settle(&engine).await;
    assert!(snapshot.item_attached);
    assert_eq!(snapshot.playback_state, PlaybackState::Stopped);
    assert!(!source.calls().contains(&Call::Play));

    engine.play().unwrap();
    assert_eq!(settle(&engine).await.playback_state, PlaybackState::Playing);
    assert_eq!(source.calls().last(), Some(&Call::Play));
}

#[tokio::test]
async fn test_set_auto_play_at_runtime() {
    let source = FakeSource::new();
    let delegate = RecordingDelegate::new();
    let engine = start(&source, &delegate, test_config());

    engine.set_auto_play(false).unwrap();
    engine.set_stream(Some(stream_url("live"))).unwrap();
    let snapshot = settle(&engine).await;
    assert!(!snapshot.auto_play);
    assert_eq!(snapshot.playback_state, PlaybackState::Stopped);
}

#[tokio::test]
async fn test_play_without_stream_is_ignored() {
    let source = FakeSource::new();
    let delegate = RecordingDelegate::new();
    let engine = start(&source, &delegate, test_config());

    engine.play().unwrap();
    engine.pause().unwrap();
    engine.toggle_playing().unwrap();
    let snapshot = settle(&engine).await;

    assert_eq!(snapshot.playback_state, PlaybackState::Stopped);
    assert!(delegate.playback_states().is_empty());
    assert_eq!(source.count(|c| matches!(c, Call::Play | Call::Pause)), 0);
}

#[tokio::test]
async fn test_load_failure_sets_error() {
    let source = FakeSource::new();
    let delegate = RecordingDelegate::new();
    let engine = start(&source, &delegate, test_config());
    let url = stream_url("broken");
    source.fail_url(&url);

    engine.set_stream(Some(url.clone())).unwrap();
    let snapshot = settle(&engine).await;

    assert_eq!(snapshot.player_state, PlayerState::Error);
    assert_eq!(snapshot.playback_state, PlaybackState::Stopped);
    assert_eq!(snapshot.stream, Some(url));
    assert!(!snapshot.item_attached);
    assert_eq!(source.attach_count(), 0);
}

#[tokio::test]
async fn test_item_failure_sets_error() {
    let source = FakeSource::new();
    let delegate = RecordingDelegate::new();
    let engine = start(&source, &delegate, test_config());

    engine.set_stream(Some(stream_url("live"))).unwrap();
    settle(&engine).await;
    source.emit(ItemEvent::Failed("decoder gave up".to_string()));

    assert_eq!(settle(&engine).await.player_state, PlayerState::Error);
}

#[tokio::test]
async fn test_rapid_switch_ignores_late_load() {
    let source = FakeSource::manual();
    let delegate = RecordingDelegate::new();
    let engine = start(&source, &delegate, test_config());
    let a = stream_url("a");
    let b = stream_url("b");

    engine.set_stream(Some(a.clone())).unwrap();
    engine.set_stream(Some(b.clone())).unwrap();
    settle(&engine).await;

    source.complete_load(&b, Ok(PlayableAsset::new(b.clone())));
    settle(&engine).await;
    source.complete_load(&a, Ok(PlayableAsset::new(a.clone())));
    let snapshot = settle(&engine).await;

    assert_eq!(snapshot.stream, Some(b.clone()));
    assert!(snapshot.is_playing());
    assert_eq!(source.attach_count(), 1);
    assert!(source.calls().contains(&Call::Attach(b)));
    assert!(!source.calls().contains(&Call::Attach(a)));
}

#[tokio::test]
async fn test_rapid_switch_ignores_late_failure() {
    let source = FakeSource::manual();
    let delegate = RecordingDelegate::new();
    let engine = start(&source, &delegate, test_config());
    let a = stream_url("a");
    let b = stream_url("b");

    engine.set_stream(Some(a.clone())).unwrap();
    engine.set_stream(Some(b.clone())).unwrap();
    settle(&engine).await;

    source.complete_load(&a, Err(Error::AssetUnplayable("gone".to_string())));
    let snapshot = settle(&engine).await;

    assert_eq!(snapshot.player_state, PlayerState::Loading);
    assert!(!delegate.player_states().contains(&PlayerState::Error));
}

#[tokio::test]
async fn test_switching_keeps_one_live_item() {
    let source = FakeSource::new();
    let delegate = RecordingDelegate::new();
    let engine = start(&source, &delegate, test_config());

    for name in ["a", "b", "c", "d"] {
        engine.set_stream(Some(stream_url(name))).unwrap();
        settle(&engine).await;
    }

    assert_eq!(source.attach_count(), 4);
    assert_eq!(source.max_live_items(), 1);
}

#[tokio::test]
async fn test_events_from_detached_item_are_ignored() {
    let source = FakeSource::new();
    let delegate = RecordingDelegate::new();
    let engine = start(&source, &delegate, test_config());

    engine.set_stream(Some(stream_url("a"))).unwrap();
    settle(&engine).await;
    let stale = source.sink().unwrap();

    engine.set_stream(Some(stream_url("b"))).unwrap();
    settle(&engine).await;

    stale.emit(ItemEvent::Failed("old item".to_string()));
    stale.emit(ItemEvent::TimedMetadata(Some("Old - News".to_string())));
    let snapshot = settle(&engine).await;

    assert_eq!(snapshot.player_state, PlayerState::Loading);
    assert_eq!(snapshot.track, None);
}

#[tokio::test]
async fn test_pause_then_play() {
    let source = FakeSource::new();
    let delegate = RecordingDelegate::new();
    let engine = start(&source, &delegate, test_config());

    engine.set_stream(Some(stream_url("live"))).unwrap();
    settle(&engine).await;

    engine.pause().unwrap();
    assert_eq!(settle(&engine).await.playback_state, PlaybackState::Paused);
    assert_eq!(source.calls().last(), Some(&Call::Pause));

    engine.toggle_playing().unwrap();
    assert_eq!(settle(&engine).await.playback_state, PlaybackState::Playing);

    engine.toggle_playing().unwrap();
    assert_eq!(settle(&engine).await.playback_state, PlaybackState::Paused);

    assert_eq!(
        delegate.playback_states(),
        vec![
            PlaybackState::Playing,
            PlaybackState::Paused,
            PlaybackState::Playing,
            PlaybackState::Paused
        ]
    );
}

#[tokio::test]
async fn test_stop_detaches_and_play_reattaches() {
    let source = FakeSource::new();
    let delegate = RecordingDelegate::new();
    let engine = start(&source, &delegate, test_config());
    let url = stream_url("live");

    engine.set_stream(Some(url.clone())).unwrap();
    settle(&engine).await;

    engine.stop().unwrap();
    let snapshot = settle(&engine).await;
    assert_eq!(snapshot.playback_state, PlaybackState::Stopped);
    assert_eq!(snapshot.stream, Some(url.clone()));
    assert!(!snapshot.item_attached);
    assert_eq!(source.calls().last(), Some(&Call::Detach));

    engine.play().unwrap();
    let snapshot = settle(&engine).await;
    assert!(snapshot.is_playing());
    assert!(snapshot.item_attached);
    assert_eq!(source.attach_count(), 2);
    assert_eq!(source.max_live_items(), 1);
}

#[tokio::test]
async fn test_interruption_pauses_and_resumes_only_on_hint() {
    let source = FakeSource::new();
    let delegate = RecordingDelegate::new();
    let engine = start(&source, &delegate, test_config());

    engine.set_stream(Some(stream_url("live"))).unwrap();
    settle(&engine).await;

    engine.interrupt(Interruption::Began).unwrap();
    assert_eq!(settle(&engine).await.playback_state, PlaybackState::Paused);

    engine
        .interrupt(Interruption::Ended { should_resume: false })
        .unwrap();
    assert_eq!(settle(&engine).await.playback_state, PlaybackState::Paused);

    engine.interrupt(Interruption::Began).unwrap();
    engine
        .interrupt(Interruption::Ended { should_resume: true })
        .unwrap();
    assert_eq!(settle(&engine).await.playback_state, PlaybackState::Playing);
}

#[tokio::test]
async fn test_volume_range_is_enforced() {
    let source = FakeSource::new();
    let delegate = RecordingDelegate::new();
    let engine = start(&source, &delegate, test_config());

    engine.set_volume(0.5).unwrap();
    assert_eq!(settle(&engine).await.volume, 0.5);
    assert!(source.calls().contains(&Call::SetVolume(0.5)));

    for bad in [1.5, -0.1, f32::NAN, f32::INFINITY] {
        engine.set_volume(bad).unwrap();
    }
    assert_eq!(settle(&engine).await.volume, 0.5);
    assert_eq!(source.count(|c| matches!(c, Call::SetVolume(v) if *v > 1.0 || *v < 0.0 || v.is_nan())), 0);

    engine.set_volume(0.0).unwrap();
    engine.set_volume(1.0).unwrap();
    assert_eq!(settle(&engine).await.volume, 1.0);
}

#[tokio::test]
async fn test_set_station_uses_station_defaults() {
    let source = FakeSource::new();
    let delegate = RecordingDelegate::new();
    let engine = start(&source, &delegate, test_config());
    let station = surf_fm();

    engine.set_station(Some(station.clone())).unwrap();
    let snapshot = settle(&engine).await;

    assert_eq!(snapshot.station, Some(station.clone()));
    assert_eq!(snapshot.stream, Some(station.parse_stream_url().unwrap()));
    let track = snapshot.track.unwrap();
    assert_eq!(track.title, "Surf FM");
    assert_eq!(track.artist, "Waves and beats");
    assert_eq!(track.artwork_url, station.remote_image_url());
    assert!(!track.artwork_loaded);
    assert!(delegate.notifications().contains(&Notification::Metadata(
        Some("Waves and beats".to_string()),
        Some("Surf FM".to_string())
    )));
}

#[tokio::test]
async fn test_station_with_invalid_url() {
    let source = FakeSource::new();
    let delegate = RecordingDelegate::new();
    let engine = start(&source, &delegate, test_config());
    let station = Station {
        stream_url: "not a url".to_string(),
        ..surf_fm()
    };

    engine.set_station(Some(station)).unwrap();
    let snapshot = settle(&engine).await;

    assert_eq!(snapshot.player_state, PlayerState::UrlNotSet);
    assert_eq!(snapshot.stream, None);
    assert_eq!(snapshot.track, None);
    assert_eq!(source.count(|c| matches!(c, Call::Load(_))), 0);
}

#[tokio::test]
async fn test_clearing_station_clears_track() {
    let source = FakeSource::new();
    let delegate = RecordingDelegate::new();
    let engine = start(&source, &delegate, test_config());

    engine.set_station(Some(surf_fm())).unwrap();
    settle(&engine).await;
    engine.set_station(None).unwrap();
    let snapshot = settle(&engine).await;

    assert_eq!(snapshot.station, None);
    assert_eq!(snapshot.stream, None);
    assert_eq!(snapshot.track, None);
    assert_eq!(snapshot.player_state, PlayerState::UrlNotSet);
}

#[tokio::test]
async fn test_timed_metadata_updates_track() {
    let source = FakeSource::new();
    let delegate = RecordingDelegate::new();
    let engine = start(&source, &delegate, test_config());

    engine.set_station(Some(surf_fm())).unwrap();
    settle(&engine).await;

    source.emit(ItemEvent::TimedMetadata(Some("Artist X - Track Y".to_string())));
    let track = settle(&engine).await.track.unwrap();
    assert_eq!(track.artist, "Artist X");
    assert_eq!(track.title, "Track Y");
    assert_eq!(
        delegate.notifications().last(),
        Some(&Notification::Metadata(
            Some("Artist X".to_string()),
            Some("Track Y".to_string())
        ))
    );

    source.emit(ItemEvent::TimedMetadata(Some("   ".to_string())));
    let track = settle(&engine).await.track.unwrap();
    assert_eq!(track.title, "Surf FM");
    assert_eq!(track.artist, "Waves and beats");
}

#[tokio::test]
async fn test_metadata_without_station_creates_track() {
    let source = FakeSource::new();
    let delegate = RecordingDelegate::new();
    let engine = start(&source, &delegate, test_config());

    engine.set_stream(Some(stream_url("live"))).unwrap();
    settle(&engine).await;

    source.emit(ItemEvent::TimedMetadata(Some("Just a title".to_string())));
    let track = settle(&engine).await.track.unwrap();
    assert_eq!(track.title, "Just a title");
    assert_eq!(track.artist, "");
}

#[tokio::test]
async fn test_events_reach_bus_subscribers() {
    let source = FakeSource::new();
    let delegate = RecordingDelegate::new();
    let engine = start(&source, &delegate, test_config());
    let mut events = engine.subscribe();
    assert_eq!(engine.event_bus().subscriber_count(), 1);

    engine.set_stream(Some(stream_url("live"))).unwrap();
    settle(&engine).await;

    let first = events.recv().await.unwrap();
    assert!(matches!(
        first,
        RadioEvent::PlayerStateChanged {
            old_state: PlayerState::UrlNotSet,
            new_state: PlayerState::Loading,
            ..
        }
    ));

    let mut saw_playing = false;
    while let Ok(event) = events.try_recv() {
        if let RadioEvent::PlaybackStateChanged { new_state, .. } = event {
            saw_playing |= new_state == PlaybackState::Playing;
        }
    }
    assert!(saw_playing);
}

#[tokio::test]
async fn test_shutdown_closes_engine() {
    let source = FakeSource::new();
    let delegate = RecordingDelegate::new();
    let engine = start(&source, &delegate, test_config());

    engine.set_stream(Some(stream_url("live"))).unwrap();
    settle(&engine).await;

    engine.shutdown().await.unwrap();
    assert_eq!(source.calls().last(), Some(&Call::Detach));
    assert!(matches!(engine.play(), Err(Error::EngineClosed)));
    assert!(matches!(engine.snapshot().await, Err(Error::EngineClosed)));
}
