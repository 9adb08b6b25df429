// SPDX-License-Identifier: MPL-2.0
use playback_core::config::{self, CacheSettings, Config, DecoderConfig, PlaybackConfig};
use playback_core::infrastructure::{build_adapter, Y4mBuilder, Y4mDecoder};
use playback_core::video_player::{Scheduler, Video};
use tempfile::tempdir;

#[test]
fn test_settings_file_configures_scheduler_and_videos() {
    let dir = tempdir().expect("Failed to create temporary directory");

    let settings = Config {
        playback: PlaybackConfig {
            tick_rate_hz: Some(50.0),
            default_rate: Some(0.5),
            loop_enabled: Some(true),
        },
        cache: CacheSettings {
            enabled: Some(true),
            recent_frames: Some(2),
        },
        decoder: DecoderConfig {
            threaded: Some(false),
            decode_timeout_ms: None,
        },
    };
    config::save_with_override(&settings, Some(dir.path().to_path_buf()))
        .expect("Failed to write config file");

    let (loaded, warning) = config::load_with_override(Some(dir.path().to_path_buf()));
    assert!(warning.is_none());
    assert_eq!(loaded.playback, settings.playback);

    let scheduler = Scheduler::from_config(&loaded.playback);
    assert!((scheduler.tick_interval_secs() - 0.02).abs() < 1e-12);

    let adapter = build_adapter(Y4mDecoder::new(), &loaded.decoder).expect("adapter");
    let video = Video::with_config(adapter, &scheduler, &loaded);
    video
        .load(Y4mBuilder::new(16, 16).frame_rate(10, 1).frames(10).build())
        .expect("load");
    video.play();

    // 0.5x rate at 50 Hz: 100 ticks cover the 1 s clip, then it loops.
    for _ in 0..99 {
        scheduler.tick();
    }
    assert!(video.current_time() > 0.98);
    let report = scheduler.tick();
    assert_eq!(report.looped, 1);
    assert!(video.is_playing());
    assert_eq!(video.current_time(), 0.0);
}

#[test]
fn test_invalid_settings_fall_back_to_defaults() {
    let dir = tempdir().expect("Failed to create temporary directory");
    std::fs::write(dir.path().join("settings.toml"), "[playback\ntick_rate_hz = ")
        .expect("Failed to write broken config");

    let (loaded, warning) = config::load_with_override(Some(dir.path().to_path_buf()));
    assert_eq!(loaded, Config::default());
    assert!(warning.is_some());

    let scheduler = Scheduler::from_config(&loaded.playback);
    assert!((scheduler.tick_interval_secs() - 1.0 / 90.0).abs() < 1e-12);
}
