use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pipeline::detector_failure_policy::DetectorFailurePolicy;
use crate::preprocessing::domain::preprocess_policy::PreprocessPolicy;
use crate::shared::constants::{
    BRIGHTNESS_THRESHOLD, CLAHE_CLIP_LIMIT, CLAHE_TILE_GRID, CONTRAST_THRESHOLD,
    DEFAULT_ALERT_TIMEOUT_SECS, DEFAULT_ALERT_TITLE, DEFAULT_CONFIDENCE, DEFAULT_GAMMA,
    DEFAULT_NOTIFICATION_INTERVAL_SECS, DENOISE_CHROMA_STRENGTH, DENOISE_LUMA_STRENGTH,
    DENOISE_SEARCH_SIZE, DENOISE_TEMPLATE_SIZE, NOISE_THRESHOLD,
};
use crate::shared::model_resolver::APP_DIR_NAME;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessingConfig {
    pub enabled: bool,
    pub brightness_threshold: f64,
    pub contrast_threshold: f64,
    pub noise_threshold: f64,
    pub gamma: f64,
    pub clahe_clip_limit: f64,
    pub clahe_tile_grid: usize,
    pub denoise_luma_strength: f32,
    pub denoise_chroma_strength: f32,
    pub denoise_template_size: usize,
    pub denoise_search_size: usize,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            brightness_threshold: BRIGHTNESS_THRESHOLD,
            contrast_threshold: CONTRAST_THRESHOLD,
            noise_threshold: NOISE_THRESHOLD,
            gamma: DEFAULT_GAMMA,
            clahe_clip_limit: CLAHE_CLIP_LIMIT,
            clahe_tile_grid: CLAHE_TILE_GRID,
            denoise_luma_strength: DENOISE_LUMA_STRENGTH,
            denoise_chroma_strength: DENOISE_CHROMA_STRENGTH,
            denoise_template_size: DENOISE_TEMPLATE_SIZE,
            denoise_search_size: DENOISE_SEARCH_SIZE,
        }
    }
}

impl PreprocessingConfig {
    pub fn policy(&self) -> PreprocessPolicy {
        PreprocessPolicy {
            brightness_threshold: self.brightness_threshold,
            contrast_threshold: self.contrast_threshold,
            noise_threshold: self.noise_threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub interval_secs: f64,
    pub alert_title: String,
    pub alert_timeout_secs: u64,
}

impl NotificationConfig {
    /// The cooldown between alerts. Fails for negative, NaN, infinite or
    /// out-of-range values instead of panicking.
    pub fn interval(&self) -> Result<Duration, ConfigError> {
        Duration::try_from_secs_f64(self.interval_secs).map_err(|_| {
            ConfigError::Invalid(format!(
                "interval_secs must be a non-negative number of seconds, got {}",
                self.interval_secs
            ))
        })
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_NOTIFICATION_INTERVAL_SECS,
            alert_title: DEFAULT_ALERT_TITLE.to_string(),
            alert_timeout_secs: DEFAULT_ALERT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Minimum face confidence, 0.0 to 1.0.
    pub confidence: f32,
    pub failure_policy: DetectorFailurePolicy,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            confidence: DEFAULT_CONFIDENCE,
            failure_policy: DetectorFailurePolicy::default(),
        }
    }
}

/// Everything tunable about a crowd mood run. Missing keys take defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoodConfig {
    pub preprocessing: PreprocessingConfig,
    pub notification: NotificationConfig,
    pub detector: DetectorConfig,
}

impl MoodConfig {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("config.json"))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: MoodConfig =
            serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` if given; otherwise the platform config file, falling
    /// back to defaults when that file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => {
                log::info!("Loading config from {}", path.display());
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.preprocessing;
        if !(p.gamma > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "gamma must be positive, got {}",
                p.gamma
            )));
        }
        if p.clahe_tile_grid == 0 {
            return Err(ConfigError::Invalid("clahe_tile_grid must be at least 1".into()));
        }
        if p.denoise_template_size % 2 == 0 || p.denoise_search_size % 2 == 0 {
            return Err(ConfigError::Invalid(format!(
                "denoise template and search sizes must be odd, got {} and {}",
                p.denoise_template_size, p.denoise_search_size
            )));
        }
        self.notification.interval()?;
        if !(0.0..=1.0).contains(&self.detector.confidence) {
            return Err(ConfigError::Invalid(format!(
                "confidence must be between 0 and 1, got {}",
                self.detector.confidence
            )));
        }
        Ok(())
    }
}
