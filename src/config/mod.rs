//! Engine configuration persisted as JSON.
//!
//! Every threshold the editor uses can be tuned here; missing fields take the
//! defaults from [`crate::constants`].

use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    DEFAULT_AXIS_LOCK_DEAD_ZONE_PX, DEFAULT_FONT_SIZE_PX, DEFAULT_HANDLE_SIZE_PX,
    DEFAULT_HISTORY_SIZE, DEFAULT_MIN_CREATE_SIZE_PX, DEFAULT_PASTE_OFFSET_PX,
    DEFAULT_ROTATION_HANDLE_OFFSET_PX, DEFAULT_ROTATION_SNAP_DEGREES, DEFAULT_STROKE_WIDTH_PX,
};

/// System set for config loading (other plugins can run after this)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigLoaded;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read configuration file: {0}")]
    Read(#[source] std::io::Error),
    #[error("configuration file was corrupted: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("could not serialize configuration: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("could not write configuration file: {0}")]
    Write(#[source] std::io::Error),
}

/// Tunable editor thresholds
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkupsConfig {
    /// Maximum number of undo groups kept
    pub history_size: usize,
    /// Minimum client-space diagonal of a new shape; 0 disables the check
    pub min_create_size_px: f32,
    /// Cursor travel before a shift-constrained move picks its axis
    pub axis_lock_dead_zone_px: f32,
    /// Rotation snap increment when shift is held
    pub rotation_snap_degrees: f32,
    /// Screen offset between successive pastes
    pub paste_offset_px: f32,
    pub handle_size_px: f32,
    pub rotation_handle_offset_px: f32,
    /// Stroke width of new shapes, converted to markup units at the current zoom
    pub default_stroke_width_px: f32,
    /// Font size of new labels, converted to markup units at the current zoom
    pub default_font_size_px: f32,
}

impl Default for MarkupsConfig {
    fn default() -> Self {
        Self {
            history_size: DEFAULT_HISTORY_SIZE,
            min_create_size_px: DEFAULT_MIN_CREATE_SIZE_PX,
            axis_lock_dead_zone_px: DEFAULT_AXIS_LOCK_DEAD_ZONE_PX,
            rotation_snap_degrees: DEFAULT_ROTATION_SNAP_DEGREES,
            paste_offset_px: DEFAULT_PASTE_OFFSET_PX,
            handle_size_px: DEFAULT_HANDLE_SIZE_PX,
            rotation_handle_offset_px: DEFAULT_ROTATION_HANDLE_OFFSET_PX,
            default_stroke_width_px: DEFAULT_STROKE_WIDTH_PX,
            default_font_size_px: DEFAULT_FONT_SIZE_PX,
        }
    }
}

/// Result of loading config with a fallback to defaults
pub struct LoadConfigResult {
    pub config: MarkupsConfig,
    /// Error message if config was reset to defaults due to an error
    pub reset_reason: Option<String>,
}

impl MarkupsConfig {
    /// Rotation snap increment in radians.
    pub fn rotation_snap_radians(&self) -> f32 {
        self.rotation_snap_degrees.to_radians()
    }

    /// Read a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
        serde_json::from_str(&json).map_err(ConfigError::Parse)
    }

    /// Read a config file, falling back to defaults when it is missing or broken.
    pub fn load_or_default(path: &Path) -> LoadConfigResult {
        if !path.exists() {
            info!("No config file found, using defaults");
            return LoadConfigResult {
                config: Self::default(),
                reset_reason: None,
            };
        }
        match Self::load(path) {
            Ok(config) => {
                info!("Loaded config from {:?}", path);
                LoadConfigResult {
                    config,
                    reset_reason: None,
                }
            }
            Err(e) => {
                warn!("Failed to load config file: {}", e);
                LoadConfigResult {
                    config: Self::default(),
                    reset_reason: Some(e.to_string()),
                }
            }
        }
    }

    /// Write the config as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(path, json).map_err(ConfigError::Write)
    }
}

/// Where the config lives on disk
#[derive(Resource)]
pub struct ConfigPath(pub PathBuf);

impl Default for ConfigPath {
    fn default() -> Self {
        Self(crate::paths::config_file())
    }
}

/// Resource to notify user when config was reset to defaults
#[derive(Resource, Default)]
pub struct ConfigResetNotification {
    /// Whether to show the notification dialog
    pub show: bool,
    /// The reason for the reset (parse error, read error, etc.)
    pub reason: Option<String>,
}

/// Message to trigger config save
#[derive(Message)]
pub struct SaveConfigRequest;

/// Startup system to load config from disk into the existing resource
fn load_config_system(
    path: Res<ConfigPath>,
    mut config: ResMut<MarkupsConfig>,
    mut reset_notification: ResMut<ConfigResetNotification>,
) {
    let result = MarkupsConfig::load_or_default(&path.0);
    *config = result.config;

    // Set notification if config was reset due to an error
    if let Some(reason) = result.reset_reason {
        reset_notification.show = true;
        reset_notification.reason = Some(reason);
    }
}

/// System to save config when requested
fn save_config_system(
    mut events: MessageReader<SaveConfigRequest>,
    path: Res<ConfigPath>,
    config: Res<MarkupsConfig>,
) {
    if events.read().count() == 0 {
        return;
    }
    if let Err(e) = crate::paths::ensure_directories() {
        warn!("Failed to create config directories: {}", e);
    }
    match config.save(&path.0) {
        Ok(()) => info!("Config saved to {:?}", path.0),
        Err(e) => error!("Failed to save config: {}", e),
    }
}

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MarkupsConfig>()
            .init_resource::<ConfigPath>()
            .init_resource::<ConfigResetNotification>()
            .add_message::<SaveConfigRequest>()
            .add_systems(Startup, load_config_system.in_set(ConfigLoaded))
            .add_systems(
                Update,
                save_config_system.run_if(on_message::<SaveConfigRequest>),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markups_config_default() {
        let config = MarkupsConfig::default();
        assert_eq!(config.history_size, 50);
        assert_eq!(config.min_create_size_px, 9.0);
        assert_eq!(config.axis_lock_dead_zone_px, 15.0);
        assert_eq!(config.rotation_snap_degrees, 22.5);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: MarkupsConfig = serde_json::from_str(r#"{ "history_size": 5 }"#).unwrap();
        assert_eq!(parsed.history_size, 5);
        assert_eq!(parsed.paste_offset_px, DEFAULT_PASTE_OFFSET_PX);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("markups.json");
        let config = MarkupsConfig {
            min_create_size_px: 0.0,
            rotation_snap_degrees: 15.0,
            ..Default::default()
        };
        config.save(&path).unwrap();
        assert_eq!(MarkupsConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_corrupt_config_resets_with_reason() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("markups.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(MarkupsConfig::load(&path), Err(ConfigError::Parse(_))));
        let result = MarkupsConfig::load_or_default(&path);
        assert_eq!(result.config, MarkupsConfig::default());
        assert!(result.reset_reason.unwrap().contains("corrupted"));
    }

    #[test]
    fn test_missing_config_uses_defaults_silently() {
        let dir = tempfile::tempdir().unwrap();
        let result = MarkupsConfig::load_or_default(&dir.path().join("absent.json"));
        assert!(result.reset_reason.is_none());
        assert_eq!(result.config, MarkupsConfig::default());
    }
}
