/// Application configuration
///
/// Loaded once at startup from a JSON file. Every field has a default, so a
/// missing file (or a partial one) is fine.
///
/// Lookup order:
/// 1. `$SMART_SCAN_CONFIG`
/// 2. `<config_dir>/smart-scan/config.json`

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

/// Environment variable that overrides the config file location
pub const CONFIG_ENV_VAR: &str = "SMART_SCAN_CONFIG";

/// Which camera implementation backs the capture flow
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CameraSource {
    /// No camera: every start enters the degraded preview
    #[default]
    Unavailable,
    /// Synthetic moving frames
    TestPattern,
}

/// Preferred camera direction
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    /// Rear camera
    #[default]
    Environment,
    /// Front camera
    User,
}

/// Camera request and still-encoding parameters
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct CaptureSettings {
    /// Ideal stream width in pixels
    pub width: u32,
    /// Ideal stream height in pixels
    pub height: u32,
    pub facing: Facing,
    /// JPEG quality for captured stills (1-100)
    pub jpeg_quality: u8,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            facing: Facing::Environment,
            jpeg_quality: 90,
        }
    }
}

/// Fixed delays used by the simulated integration flows
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct FlowTimings {
    pub share_delay_ms: u64,
    pub connect_delay_ms: u64,
    pub upload_tick_ms: u64,
    /// Percentage points added per upload tick (1-100)
    pub upload_step: u8,
}

impl Default for FlowTimings {
    fn default() -> Self {
        Self {
            share_delay_ms: 2000,
            connect_delay_ms: 1500,
            upload_tick_ms: 200,
            upload_step: 10,
        }
    }
}

impl FlowTimings {
    pub fn share_delay(&self) -> Duration {
        Duration::from_millis(self.share_delay_ms)
    }

    pub fn connect_delay(&self) -> Duration {
        Duration::from_millis(self.connect_delay_ms)
    }

    pub fn upload_tick(&self) -> Duration {
        Duration::from_millis(self.upload_tick_ms)
    }
}

/// Top-level configuration
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the database (defaults to the platform data dir)
    pub data_dir: Option<PathBuf>,
    pub camera: CameraSource,
    pub capture: CaptureSettings,
    pub timings: FlowTimings,
    /// `tracing` filter used when `RUST_LOG` is not set
    pub log_filter: String,
    /// Tab id opened at startup; unknown ids open the scanner
    pub start_tab: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            camera: CameraSource::default(),
            capture: CaptureSettings::default(),
            timings: FlowTimings::default(),
            log_filter: "smart_scan=info".to_string(),
            start_tab: "scan".to_string(),
        }
    }
}

impl AppConfig {
    /// Load the configuration from its default location.
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Where the config file is looked up
    pub fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Some(PathBuf::from(path));
        }
        let mut path = dirs::config_dir()?;
        path.push("smart-scan");
        path.push("config.json");
        Some(path)
    }

    /// Load and validate a config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Parse and validate JSON config text
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the flows cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capture.width == 0 || self.capture.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "capture resolution must be non-zero, got {}x{}",
                self.capture.width, self.capture.height
            )));
        }
        if !(1..=100).contains(&self.capture.jpeg_quality) {
            return Err(ConfigError::Invalid(format!(
                "jpeg_quality must be within 1-100, got {}",
                self.capture.jpeg_quality
            )));
        }
        if !(1..=100).contains(&self.timings.upload_step) {
            return Err(ConfigError::Invalid(format!(
                "upload_step must be within 1-100, got {}",
                self.timings.upload_step
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.capture.width, 1920);
        assert_eq!(config.capture.height, 1080);
        assert_eq!(config.capture.jpeg_quality, 90);
        assert_eq!(config.timings.upload_step, 10);
        assert_eq!(config.timings.upload_tick(), Duration::from_millis(200));
        assert_eq!(config.start_tab, "scan");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = AppConfig::from_json(
            r#"{ "camera": "test-pattern", "timings": { "share_delay_ms": 10 } }"#,
        )
        .unwrap();

        assert_eq!(config.camera, CameraSource::TestPattern);
        assert_eq!(config.timings.share_delay_ms, 10);
        assert_eq!(config.timings.connect_delay_ms, 1500);
        assert_eq!(config.capture.facing, Facing::Environment);
    }

    #[test]
    fn test_invalid_step_rejected() {
        let err = AppConfig::from_json(r#"{ "timings": { "upload_step": 0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_invalid_quality_rejected() {
        let err = AppConfig::from_json(r#"{ "capture": { "jpeg_quality": 101 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_start_tab_from_json() {
        let config = AppConfig::from_json(r#"{ "start_tab": "files" }"#).unwrap();
        assert_eq!(config.start_tab, "files");
        assert_eq!(config.camera, CameraSource::Unavailable);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "log_filter": "smart_scan=debug" }"#).unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.log_filter, "smart_scan=debug");
    }
}
