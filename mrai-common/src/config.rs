//! Configuration loading and config file resolution
//!
//! Config file resolution priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`MRAI_CONFIG`)
//! 3. Platform config directory (`<config dir>/mrai/config.toml`)
//! 4. Compiled defaults (fallback)
//!
//! A missing config file is not an error: the pipeline logs a warning and
//! runs with compiled defaults. A config file that exists but fails to parse
//! is a [`Error::Config`].

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "MRAI_CONFIG";

/// Environment variable overriding `data_dir`
pub const DATA_DIR_ENV_VAR: &str = "MRAI_DATA_DIR";

/// Pipeline configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Root of the raw/processed/feature/final artifact tree
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// JSON table mapping lower-cased raw genre tags to canonical genres
    ///
    /// When absent, raw tags are used as genre columns directly.
    #[serde(default)]
    pub genre_map: Option<PathBuf>,

    /// Alias table applied to raw tags before `genre_map`
    #[serde(default)]
    pub genre_pre_aliases: Option<PathBuf>,

    /// Alias table applied to the output of `genre_map`
    #[serde(default)]
    pub genre_post_aliases: Option<PathBuf>,

    /// Data-quality gates
    #[serde(default)]
    pub thresholds: ThresholdsConfig,

    /// Feature shaping options
    #[serde(default)]
    pub features: FeaturesConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            genre_map: None,
            genre_pre_aliases: None,
            genre_post_aliases: None,
            thresholds: ThresholdsConfig::default(),
            features: FeaturesConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Data-quality gates applied between stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdsConfig {
    /// Minimum number of chart ratings for an album to be kept
    #[serde(default = "default_min_rating_count")]
    pub min_rating_count: u64,

    /// Minimum fuzzy-match precision trusted downstream (0-4)
    ///
    /// Historical pipeline versions used >1, >2 and >=3; the default is 3.
    #[serde(default = "default_min_precision_match")]
    pub min_precision_match: u8,

    /// Albums with fewer cleaned tracks than this are excluded
    #[serde(default = "default_min_album_tracks")]
    pub min_album_tracks: usize,

    /// Fixed number of tracks every album is reshaped to
    #[serde(default = "default_album_track_count")]
    pub album_track_count: usize,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            min_rating_count: default_min_rating_count(),
            min_precision_match: default_min_precision_match(),
            min_album_tracks: default_min_album_tracks(),
            album_track_count: default_album_track_count(),
        }
    }
}

/// How missing track slots are filled when an album has fewer tracks than
/// the target length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaddingPolicy {
    /// Cycle through existing tracks' feature vectors in track order
    #[default]
    Repeat,
    /// Replicate the column-wise mean of existing tracks
    Mean,
}

/// Shape of the per-album Spotify-side feature block in the final dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssemblyLayout {
    /// Full track matrix concatenated positionally
    Flatten,
    /// Per-descriptor mean/min/max/std over the album's tracks
    Aggregate,
    /// A single representative track
    Single,
}

impl AssemblyLayout {
    /// Output sub-directory name for this layout
    pub fn dir_name(&self) -> &'static str {
        match self {
            AssemblyLayout::Flatten => "flatten",
            AssemblyLayout::Aggregate => "agg_flatten",
            AssemblyLayout::Single => "single",
        }
    }
}

/// Feature shaping options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturesConfig {
    #[serde(default)]
    pub padding: PaddingPolicy,

    /// Layouts produced by the finalize stage
    #[serde(default = "default_layouts")]
    pub layouts: Vec<AssemblyLayout>,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            padding: PaddingPolicy::default(),
            layouts: default_layouts(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_min_rating_count() -> u64 {
    50
}

fn default_min_precision_match() -> u8 {
    3
}

fn default_min_album_tracks() -> usize {
    4
}

fn default_album_track_count() -> usize {
    16
}

fn default_layouts() -> Vec<AssemblyLayout> {
    vec![
        AssemblyLayout::Flatten,
        AssemblyLayout::Aggregate,
        AssemblyLayout::Single,
    ]
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Resolve the config file and load it, falling back to defaults
    ///
    /// `data_dir_override` (CLI) and `MRAI_DATA_DIR` take precedence over the
    /// file's `data_dir`, in that order.
    pub fn load(cli_config: Option<&Path>, data_dir_override: Option<&Path>) -> Result<Self> {
        let path = resolve_config_path(cli_config);
        let mut config = load_config_file(path.as_deref())?;

        if let Some(dir) = data_dir_override {
            config.data_dir = dir.to_path_buf();
        } else if let Ok(dir) = std::env::var(DATA_DIR_ENV_VAR) {
            if !dir.trim().is_empty() {
                config.data_dir = PathBuf::from(dir);
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        let t = &self.thresholds;
        if t.album_track_count == 0 {
            return Err(Error::Config(
                "thresholds.album_track_count must be at least 1".to_string(),
            ));
        }
        if t.min_album_tracks == 0 || t.min_album_tracks > t.album_track_count {
            return Err(Error::Config(format!(
                "thresholds.min_album_tracks must be in 1..={} (got {})",
                t.album_track_count, t.min_album_tracks
            )));
        }
        if t.min_precision_match > 4 {
            return Err(Error::Config(format!(
                "thresholds.min_precision_match must be in 0..=4 (got {})",
                t.min_precision_match
            )));
        }
        if self.genre_map.is_none()
            && (self.genre_pre_aliases.is_some() || self.genre_post_aliases.is_some())
        {
            return Err(Error::Config(
                "genre alias tables require genre_map".to_string(),
            ));
        }
        if self.features.layouts.is_empty() {
            return Err(Error::Config(
                "features.layouts must name at least one layout".to_string(),
            ));
        }
        Ok(())
    }
}

/// Pick the config file path following the priority order
///
/// Returns `None` when no candidate exists; the caller then uses defaults.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory
    let user_config = dirs::config_dir().map(|d| d.join("mrai").join("config.toml"));
    user_config.filter(|path| path.exists())
}

/// Read and parse a TOML config file
///
/// Missing or unreadable files degrade to defaults with a warning.
pub fn load_config_file(path: Option<&Path>) -> Result<TomlConfig> {
    let Some(path) = path else {
        warn!("No config file found, using compiled defaults");
        return Ok(TomlConfig::default());
    };

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(
                "Config file {} not readable ({}), using compiled defaults",
                path.display(),
                e
            );
            return Ok(TomlConfig::default());
        }
    };

    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!("Configuration loaded from {}", path.display());
    Ok(config)
}

/// Serialize a config to TOML text
pub fn to_toml_string(config: &TomlConfig) -> Result<String> {
    toml::to_string_pretty(config).map_err(|e| Error::Config(format!("Serialize failed: {}", e)))
}
