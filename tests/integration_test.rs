// Integration tests for sfx-pool
// These drive the public API end to end on a SilentDevice, so no audio
// hardware is needed.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use sfx_pool::device::SilentVoiceHandle;
use sfx_pool::settings::{MUTE_KEY, VOLUME_KEY};
use sfx_pool::{
    ChannelId, Clip, JsonSettingsStore, MemorySettingsStore, PlaybackEvent, PlaybackManager,
    SettingsStore, SfxConfig, SilentDevice, Ticker, VoiceState,
};

fn clip(name: &str) -> Clip {
    Clip::from_bytes(name, vec![0u8; 64])
}

fn setup() -> (PlaybackManager<SilentDevice>, SilentDevice) {
    let device = SilentDevice::new();
    let manager = PlaybackManager::new(device.clone(), MemorySettingsStore::new());
    (manager, device)
}

/// Channel ids follow voice creation order
fn voice(device: &SilentDevice, id: ChannelId) -> SilentVoiceHandle {
    device.voices()[id.0 as usize].clone()
}

fn assert_disjoint(manager: &PlaybackManager<SilentDevice>) {
    let stats = manager.stats();
    assert_eq!(
        stats.alive(),
        (stats.idle + stats.active) as u64,
        "channel lost or duplicated: {:?}",
        stats
    );

    let idle = manager.idle_channel_ids();
    for info in manager.active_channels() {
        assert!(!idle.contains(&info.id), "{} is both idle and active", info.id);
        assert!(info.state.is_active());
    }
}

#[test]
fn test_disjointness_under_random_operations() {
    let (manager, device) = setup();
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let keys = ["", "ui", "engine", "music"];

    for _ in 0..500 {
        match rng.gen_range(0..9) {
            0 | 1 => {
                manager.play(&clip("shot")).unwrap();
            }
            2 => {
                let key = keys[rng.gen_range(0..keys.len())];
                let looping = rng.gen_bool(0.5);
                manager.play_keyed(&clip("keyed"), key, looping).unwrap();
            }
            3 => {
                manager.stop(keys[rng.gen_range(0..keys.len())]);
            }
            4 => manager.pause_all(),
            5 => manager.unpause_all(),
            6 => {
                let voices = device.voices();
                if !voices.is_empty() {
                    voices[rng.gen_range(0..voices.len())].finish();
                }
            }
            7 => {
                manager.stop_all();
            }
            _ => {
                manager.tick();
            }
        }
        assert_disjoint(&manager);
    }

    manager.unpause_all();
    manager.stop_all();
    manager.tick();
    assert_eq!(manager.active_count(), 0);
    assert_disjoint(&manager);
}

#[test]
fn test_released_channel_is_inert() {
    let (manager, device) = setup();
    let id = manager.play_keyed(&clip("alarm"), "alarm", true).unwrap();

    manager.stop("alarm");
    manager.tick();

    assert_eq!(manager.idle_channel_ids(), vec![id]);
    let handle = voice(&device, id);
    assert!(!handle.is_playing());
    assert!(!handle.is_looping());

    // Reused without the old key
    let again = manager.play(&clip("beep")).unwrap();
    assert_eq!(again, id);
    assert_eq!(manager.active_channels()[0].key, "");
}

#[test]
fn test_keyed_replay_stops_previous() {
    let (manager, device) = setup();
    let first = manager.play_keyed(&clip("step1"), "sfx", false).unwrap();
    let second = manager.play_keyed(&clip("step2"), "sfx", false).unwrap();

    assert!(!voice(&device, first).is_playing());
    assert!(voice(&device, second).is_playing());

    manager.tick();
    voice(&device, second).finish();
    manager.tick();

    assert!(!manager.is_key_active("sfx"));
    assert_eq!(manager.active_count(), 0);
}

#[test]
fn test_pause_blocks_reclaim_until_unpause() {
    let (manager, device) = setup();
    let ids: Vec<_> = (0..3).map(|_| manager.play(&clip("hit")).unwrap()).collect();
    manager.tick();

    manager.pause_all();
    for id in &ids {
        assert!(voice(&device, *id).is_paused());
    }
    voice(&device, ids[1]).finish();

    let idle_before = manager.stats().idle;
    for _ in 0..10 {
        manager.tick();
    }
    assert_eq!(manager.stats().idle, idle_before);
    assert_eq!(manager.active_count(), 3);

    manager.unpause_all();
    assert_eq!(manager.tick(), 1);
    assert_eq!(manager.idle_channel_ids(), vec![ids[1]]);
    assert_eq!(manager.active_count(), 2);

    let states: Vec<_> = manager.active_channels().iter().map(|c| c.state).collect();
    assert!(states.iter().all(|s| *s == VoiceState::Playing));
}

#[test]
fn test_stop_all_during_pause_is_held() {
    let (manager, device) = setup();
    manager.play(&clip("hit")).unwrap();
    manager.play_looped(&clip("engine"), "engine").unwrap();
    manager.play_keyed(&clip("ui"), "ui", false).unwrap();

    manager.pause_all();
    assert_eq!(manager.stop_all(), 3);
    assert!(device.playing_voices().is_empty());

    assert_eq!(manager.tick(), 0);
    assert_eq!(manager.active_count(), 3);
    assert!(manager.is_key_active("engine"));

    manager.unpause_all();
    assert!(device.playing_voices().is_empty());
    assert_eq!(manager.tick(), 3);
    assert_eq!(manager.active_count(), 0);
    assert_disjoint(&manager);
}

#[test]
fn test_keyed_replay_during_pause_is_held() {
    let (manager, device) = setup();
    manager.pause_all();

    let first = manager.play_keyed(&clip("step1"), "sfx", false).unwrap();
    let second = manager.play_keyed(&clip("step2"), "sfx", false).unwrap();
    assert!(!voice(&device, first).is_playing());
    assert!(voice(&device, second).is_playing());

    for _ in 0..5 {
        assert_eq!(manager.tick(), 0);
    }
    let active: Vec<_> = manager.active_channels().iter().map(|c| c.id).collect();
    assert_eq!(active.len(), 2);
    assert!(active.contains(&first) && active.contains(&second));

    manager.unpause_all();
    assert_eq!(manager.tick(), 1);
    assert_eq!(manager.idle_channel_ids(), vec![first]);
    assert!(manager.is_key_active("sfx"));
}

#[test]
fn test_volume_applies_now_and_later() {
    let (manager, device) = setup();
    let a = manager.play(&clip("a")).unwrap();
    let b = manager.play_looped(&clip("b"), "hum").unwrap();

    manager.set_volume(0.3);
    assert_eq!(voice(&device, a).volume(), 0.3);
    assert_eq!(voice(&device, b).volume(), 0.3);

    let c = manager.play(&clip("c")).unwrap();
    assert_eq!(voice(&device, c).volume(), 0.3);
    assert_eq!(manager.volume(), 0.3);
}

#[test]
fn test_stop_all_reclaims_everything() {
    let (manager, device) = setup();
    for i in 0..5 {
        if i % 2 == 0 {
            manager.play(&clip("shot")).unwrap();
        } else {
            manager.play_looped(&clip("loop"), &format!("loop-{}", i)).unwrap();
        }
    }
    assert_eq!(manager.active_count(), 5);

    assert_eq!(manager.stop_all(), 5);
    assert_eq!(manager.active_count(), 5);

    assert_eq!(manager.tick(), 5);
    assert_eq!(manager.active_count(), 0);
    assert_eq!(manager.stats().idle, 5);
    assert!(device.playing_voices().is_empty());
}

#[test]
fn test_looping_never_completes_on_its_own() {
    let (manager, device) = setup();
    let id = manager.play_looped(&clip("engine"), "engine").unwrap();

    for _ in 0..100 {
        device.finish_all();
        assert_eq!(manager.tick(), 0);
    }
    assert!(manager.is_key_active("engine"));

    manager.stop("engine");
    assert_eq!(manager.tick(), 1);
    assert_eq!(manager.idle_channel_ids(), vec![id]);
}

#[test]
fn test_anonymous_sounds_ignore_empty_key() {
    let (manager, device) = setup();
    manager.play(&clip("a")).unwrap();
    manager.play_keyed(&clip("b"), "", false).unwrap();

    assert_eq!(manager.stop(""), 0);
    assert_eq!(device.playing_voices().len(), 2);
}

#[test]
fn test_pool_grows_and_trims() {
    let device = SilentDevice::new();
    let config = SfxConfig {
        pool_capacity: 2,
        max_idle_channels: 3,
        ..SfxConfig::default()
    };
    let manager =
        PlaybackManager::with_config(device.clone(), MemorySettingsStore::new(), &config);

    for _ in 0..8 {
        manager.play(&clip("burst")).unwrap();
    }
    assert_eq!(device.voice_count(), 8);

    device.finish_all();
    assert_eq!(manager.tick(), 8);

    let stats = manager.stats();
    assert_eq!(stats.idle, 3);
    assert_eq!(stats.destroyed, 5);
    assert_eq!(stats.alive(), 3);
}

#[test]
fn test_play_await_with_ticker() {
    let device = SilentDevice::new();
    let manager = Arc::new(PlaybackManager::new(
        device.clone(),
        MemorySettingsStore::new(),
    ));
    let _ticker = Ticker::spawn(Arc::clone(&manager), Duration::from_millis(2)).unwrap();

    let completion = manager.play_await(&clip("door")).unwrap();
    let id = completion.channel();

    let waiter = thread::spawn(move || {
        completion.wait();
    });

    thread::sleep(Duration::from_millis(20));
    assert!(!waiter.is_finished());

    voice(&device, id).finish();
    waiter.join().unwrap();
    assert!(manager.idle_channel_ids().contains(&id));
}

#[test]
fn test_event_stream() {
    let (manager, device) = setup();
    let (rx, _id) = manager.subscribe();

    manager.play_looped(&clip("engine"), "engine").unwrap();
    manager.set_mute(true);
    manager.stop("engine");
    manager.tick();
    assert!(device.playing_voices().is_empty());

    let events: Vec<_> = rx.try_iter().collect();
    assert!(matches!(events[0], PlaybackEvent::Started { .. }));
    assert_eq!(events[1], PlaybackEvent::MuteChanged(true));
    assert_eq!(
        events[2],
        PlaybackEvent::StoppedByKey {
            key: "engine".to_string(),
            count: 1
        }
    );
    assert!(matches!(events[3], PlaybackEvent::Finished { .. }));
}

#[test]
fn test_settings_persist_across_sessions() {
    let path = std::env::temp_dir()
        .join("sfx_pool_integration")
        .join(format!("settings-{}.json", std::process::id()));
    let _ = std::fs::remove_file(&path);

    {
        let store = JsonSettingsStore::open(&path).unwrap();
        let manager = PlaybackManager::new(SilentDevice::new(), store);
        assert_eq!(manager.volume(), 0.5);
        manager.set_volume(0.75);
        manager.set_mute(true);
        manager.shutdown().unwrap();
    }

    let store = JsonSettingsStore::open(&path).unwrap();
    assert_eq!(store.get_float(VOLUME_KEY, 0.0), 0.75);
    assert_eq!(store.get_int(MUTE_KEY, 0), 1);

    let manager = PlaybackManager::new(SilentDevice::new(), store);
    let _ = std::fs::remove_file(&path);

    assert_eq!(manager.volume(), 0.75);
    assert!(manager.is_muted());
}
