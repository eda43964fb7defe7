// SPDX-License-Identifier: MPL-2.0
//! This module handles the crate's configuration, including loading and saving
//! defaults for the lazy image component to a `settings.toml` file.
//!
//! # Configuration Sections
//!
//! - `[image]` - Default presentation options (fit, position, loading hint, spinner)
//! - `[loading]` - Completeness polling, fades and decoded cache
//! - `[network]` - HTTP timeout, size limit and credential
//! - `[diagnostics]` - Event buffer capacity
//!
//! # Path Resolution
//!
//! 1. Use `load_from_path()`/`save_to_path()` with explicit path
//! 2. Set `ICED_LAZY_IMG_CONFIG_DIR` environment variable
//! 3. Falls back to platform-specific config directory
//!
//! # Examples
//!
//! ```no_run
//! use iced_lazy_img::config::{self, Config};
//!
//! // Load existing configuration (returns tuple with optional warning)
//! let (mut config, _warning) = config::load();
//!
//! // Modify a setting
//! config.loading.poll_interval_ms = Some(25);
//!
//! // Save the modified configuration
//! config::save(&config).expect("Failed to save config");
//! ```

pub mod defaults;
pub mod paths;

pub use defaults::*;

use crate::error::{Error, Result};
use crate::ui::lazy_image::options::{Fit, Loading};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "settings.toml";

// =============================================================================
// Section Structs
// =============================================================================

/// Default presentation options applied to every image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageConfig {
    /// How the image fills its box.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fit: Option<Fit>,

    /// CSS-like alignment string, e.g. `"50% 50%"` or `"left top"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,

    /// Native load-priority hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loading: Option<Loading>,

    /// Suppress the default spinner while loading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_spinner: Option<bool>,

    /// Default spinner diameter in logical pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spinner_size: Option<f32>,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            fit: Some(Fit::default()),
            position: None,
            loading: Some(Loading::default()),
            no_spinner: Some(false),
            spinner_size: None,
        }
    }
}

/// Loading pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoadingConfig {
    /// Completeness poll interval in milliseconds.
    #[serde(
        default = "default_poll_interval_ms",
        skip_serializing_if = "Option::is_none"
    )]
    pub poll_interval_ms: Option<u64>,

    /// Fade-in duration of loaded images in milliseconds.
    #[serde(
        default = "default_image_fade_ms",
        skip_serializing_if = "Option::is_none"
    )]
    pub image_fade_ms: Option<u64>,

    /// Fade-in duration of the content layer in milliseconds.
    #[serde(
        default = "default_content_fade_ms",
        skip_serializing_if = "Option::is_none"
    )]
    pub content_fade_ms: Option<u64>,

    /// Number of decoded images kept in memory.
    #[serde(
        default = "default_cache_entries",
        skip_serializing_if = "Option::is_none"
    )]
    pub cache_entries: Option<usize>,
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            image_fade_ms: default_image_fade_ms(),
            content_fade_ms: default_content_fade_ms(),
            cache_entries: default_cache_entries(),
        }
    }
}

/// HTTP loader settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkConfig {
    /// Request timeout in seconds.
    #[serde(
        default = "default_request_timeout_secs",
        skip_serializing_if = "Option::is_none"
    )]
    pub request_timeout_secs: Option<u64>,

    /// Maximum accepted image size in megabytes.
    #[serde(default = "default_max_image_mb", skip_serializing_if = "Option::is_none")]
    pub max_image_mb: Option<u64>,

    /// Bearer token sent with `crossorigin = "use-credentials"` requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
            max_image_mb: default_max_image_mb(),
            auth_token: None,
        }
    }
}

/// Diagnostics settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiagnosticsConfig {
    /// Number of events retained in memory.
    #[serde(
        default = "default_buffer_capacity",
        skip_serializing_if = "Option::is_none"
    )]
    pub buffer_capacity: Option<usize>,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: default_buffer_capacity(),
        }
    }
}

// =============================================================================
// Main Config Struct (Sectioned)
// =============================================================================

/// Crate configuration with logical sections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub image: ImageConfig,

    #[serde(default)]
    pub loading: LoadingConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

// =============================================================================
// Default Value Functions
// =============================================================================

fn default_poll_interval_ms() -> Option<u64> {
    Some(DEFAULT_POLL_INTERVAL_MS)
}

fn default_image_fade_ms() -> Option<u64> {
    Some(DEFAULT_IMAGE_FADE_MS)
}

fn default_content_fade_ms() -> Option<u64> {
    Some(DEFAULT_CONTENT_FADE_MS)
}

fn default_cache_entries() -> Option<usize> {
    Some(DEFAULT_CACHE_ENTRIES)
}

fn default_request_timeout_secs() -> Option<u64> {
    Some(DEFAULT_REQUEST_TIMEOUT_SECS)
}

fn default_max_image_mb() -> Option<u64> {
    Some(DEFAULT_MAX_IMAGE_MB)
}

fn default_buffer_capacity() -> Option<usize> {
    Some(DEFAULT_DIAGNOSTICS_BUFFER_CAPACITY)
}

// =============================================================================
// Config Path Resolution
// =============================================================================

fn get_config_path_with_override(base_dir: Option<PathBuf>) -> Option<PathBuf> {
    paths::get_config_dir_with_override(base_dir).map(|mut path| {
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
/// default config with a warning key explaining what went wrong.
pub fn load() -> (Config, Option<String>) {
    load_with_override(None)
}

/// Loads the configuration from a custom directory.
pub fn load_with_override(base_dir: Option<PathBuf>) -> (Config, Option<String>) {
    if let Some(path) = get_config_path_with_override(base_dir) {
        if path.exists() {
            match load_from_path(&path) {
                Ok(config) => return (config, None),
                Err(_) => {
                    return (
                        Config::default(),
                        Some("notification-config-load-error".to_string()),
                    );
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
    if let Some(path) = get_config_path_with_override(base_dir) {
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
