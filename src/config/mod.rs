// SPDX-License-Identifier: MPL-2.0
//! This module handles the crate's configuration, including loading and saving
//! playback preferences to a `settings.toml` file.
//!
//! # Configuration Sections
//!
//! - `[playback]` - Scheduler tick rate, default rate, looping
//! - `[cache]` - Frame cache behaviour
//! - `[decoder]` - Worker thread and bounded decode wait
//!
//! # Path Resolution
//!
//! 1. Use `load_from_path()`/`save_to_path()` with explicit path
//! 2. Set `PLAYBACK_CORE_CONFIG_DIR` environment variable
//! 3. Falls back to platform-specific config directory
//!
//! # Examples
//!
//! ```no_run
//! use playback_core::config::{self, Config};
//!
//! // Load existing configuration (returns tuple with optional warning)
//! let (mut config, _warning) = config::load();
//!
//! // Modify a setting
//! config.playback.loop_enabled = Some(true);
//!
//! // Save the modified configuration
//! config::save(&config).expect("Failed to save config");
//! ```

pub mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE: &str = "settings.toml";
const APP_NAME: &str = "PlaybackCore";

/// Environment variable overriding the config directory.
pub const ENV_CONFIG_DIR: &str = "PLAYBACK_CORE_CONFIG_DIR";

// =============================================================================
// Section Structs
// =============================================================================

/// Playback and scheduler settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaybackConfig {
    /// Scheduler tick rate in Hz; `tick()` advances by `1 / tick_rate_hz`.
    #[serde(default = "default_tick_rate_hz", skip_serializing_if = "Option::is_none")]
    pub tick_rate_hz: Option<f64>,

    /// Playback rate applied to new videos.
    #[serde(default = "default_rate", skip_serializing_if = "Option::is_none")]
    pub default_rate: Option<f64>,

    /// Whether new videos loop at end-of-stream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loop_enabled: Option<bool>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: default_tick_rate_hz(),
            default_rate: default_rate(),
            loop_enabled: Some(false),
        }
    }
}

impl PlaybackConfig {
    /// Returns the scheduler tick interval in seconds, clamped to valid bounds.
    #[must_use]
    pub fn tick_interval_secs(&self) -> f64 {
        let hz = self
            .tick_rate_hz
            .filter(|hz| hz.is_finite())
            .unwrap_or(DEFAULT_TICK_RATE_HZ)
            .clamp(MIN_TICK_RATE_HZ, MAX_TICK_RATE_HZ);
        1.0 / hz
    }
}

/// Frame cache settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheSettings {
    /// Whether the recent-frames history is used.
    #[serde(default = "default_cache_enabled", skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Number of recently decoded frames kept besides the current one.
    #[serde(default = "default_recent_frames", skip_serializing_if = "Option::is_none")]
    pub recent_frames: Option<usize>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            recent_frames: default_recent_frames(),
        }
    }
}

/// Decoder settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecoderConfig {
    /// Run decoding on a worker thread.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threaded: Option<bool>,

    /// Bounded wait for a threaded decode, in milliseconds.
    #[serde(
        default = "default_decode_timeout_ms",
        skip_serializing_if = "Option::is_none"
    )]
    pub decode_timeout_ms: Option<u64>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            threaded: Some(false),
            decode_timeout_ms: default_decode_timeout_ms(),
        }
    }
}

impl DecoderConfig {
    /// Returns the decode wait, clamped to valid bounds.
    #[must_use]
    pub fn decode_timeout(&self) -> Duration {
        let ms = self
            .decode_timeout_ms
            .unwrap_or(DEFAULT_DECODE_TIMEOUT_MS)
            .clamp(MIN_DECODE_TIMEOUT_MS, MAX_DECODE_TIMEOUT_MS);
        Duration::from_millis(ms)
    }
}

// =============================================================================
// Main Config Struct (Sectioned)
// =============================================================================

/// Crate configuration with logical sections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    /// Playback and scheduler settings.
    #[serde(default)]
    pub playback: PlaybackConfig,

    /// Frame cache settings.
    #[serde(default)]
    pub cache: CacheSettings,

    /// Decoder settings.
    #[serde(default)]
    pub decoder: DecoderConfig,
}

// =============================================================================
// Default Value Functions
// =============================================================================

fn default_tick_rate_hz() -> Option<f64> {
    Some(DEFAULT_TICK_RATE_HZ)
}

fn default_rate() -> Option<f64> {
    Some(DEFAULT_PLAYBACK_RATE)
}

fn default_cache_enabled() -> Option<bool> {
    Some(true)
}

fn default_recent_frames() -> Option<usize> {
    Some(DEFAULT_RECENT_FRAMES)
}

fn default_decode_timeout_ms() -> Option<u64> {
    Some(DEFAULT_DECODE_TIMEOUT_MS)
}

// =============================================================================
// Config Path Resolution
// =============================================================================

/// Returns the config directory with an optional override.
///
/// # Resolution Order
///
/// 1. `override_path` parameter (if `Some`)
/// 2. `PLAYBACK_CORE_CONFIG_DIR` environment variable (if set and non-empty)
/// 3. Platform-specific config directory with the app name appended
pub fn config_dir_with_override(override_path: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = override_path {
        return Some(path);
    }

    if let Ok(env_path) = std::env::var(ENV_CONFIG_DIR) {
        if !env_path.is_empty() {
            return Some(PathBuf::from(env_path));
        }
    }

    dirs::config_dir().map(|mut path| {
        path.push(APP_NAME);
        path
    })
}

fn config_path_with_override(base_dir: Option<PathBuf>) -> Option<PathBuf> {
    config_dir_with_override(base_dir).map(|mut path| {
        path.push(CONFIG_FILE);
        path
    })
}

// =============================================================================
// Load Functions
// =============================================================================

/// Loads the configuration from the default path.
///
/// Returns a tuple of (config, optional_warning). If loading fails, returns
/// default config with a warning message explaining what went wrong.
pub fn load() -> (Config, Option<String>) {
    load_with_override(None)
}

/// Loads the configuration from a custom directory.
pub fn load_with_override(base_dir: Option<PathBuf>) -> (Config, Option<String>) {
    if let Some(path) = config_path_with_override(base_dir) {
        if path.exists() {
            match load_from_path(&path) {
                Ok(config) => return (config, None),
                Err(err) => {
                    log::warn!("ignoring config at {}: {}", path.display(), err);
                    return (Config::default(), Some(err.to_string()));
                }
            }
        }
    }
    (Config::default(), None)
}

/// Loads configuration from a specific path.
pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

// =============================================================================
// Save Functions
// =============================================================================

/// Saves the configuration to the default path.
pub fn save(config: &Config) -> Result<()> {
    save_with_override(config, None)
}

/// Saves the configuration to a custom directory.
pub fn save_with_override(config: &Config, base_dir: Option<PathBuf>) -> Result<()> {
    if let Some(path) = config_path_with_override(base_dir) {
        return save_to_path(config, &path);
    }
    Ok(())
}

/// Saves configuration to a specific path.
pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config).map_err(Error::from)?;
    fs::write(path, content)?;
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
