//! Configuration loading and resolution
//!
//! A single TOML file tunes the matching thresholds, tag filtering and the
//! genre taxonomy. Every field has a built-in default, so an absent file is
//! a valid configuration.
//!
//! # Resolution Priority
//!
//! 1. Command-line argument (`--config <path>`)
//! 2. Environment variable (`SONGQUIZ_CONFIG`)
//! 3. `<config_dir>/songquiz/config.toml` (e.g. `~/.config/songquiz/config.toml`)
//! 4. Built-in defaults
//!
//! A file named by (1) or (2) must exist and parse. A missing file at (3)
//! falls through to (4) with a warning.

use crate::genre::{GenreMapper, GenreTaxonomy};
use crate::matcher::TrackMatcher;
use crate::similarity::{SimilarityPolicy, DEFAULT_JACCARD_THRESHOLD, DEFAULT_OVERLAP_MIN_SHARED};
use crate::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "SONGQUIZ_CONFIG";

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SongquizConfig {
    pub logging: LoggingConfig,
    pub matching: MatchingConfig,
    pub tags: TagConfig,
    pub taxonomy: TaxonomyConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` overrides it.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Similarity thresholds
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchingConfig {
    /// Overlap requirement for catalog title matching
    pub title_min_shared: usize,
    /// Overlap requirement for catalog artist matching
    pub artist_min_shared: usize,
    /// Jaccard threshold for dataset deduplication
    pub dedup_threshold: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            title_min_shared: DEFAULT_OVERLAP_MIN_SHARED,
            artist_min_shared: 1,
            dedup_threshold: DEFAULT_JACCARD_THRESHOLD,
        }
    }
}

/// Folksonomy tag filtering
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TagConfig {
    /// Minimum tag weight (0-100) to keep
    pub min_weight: u32,
    /// Tags never treated as genres (matched lowercase)
    pub ignored: Vec<String>,
}

impl Default for TagConfig {
    fn default() -> Self {
        Self {
            min_weight: 25,
            ignored: ["seen live", "favourite", "favorite", "spotify", "under 2000 listeners"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Taxonomy extensions
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TaxonomyConfig {
    /// Parent label -> extra subgenres appended after the built-in ones
    pub extra: BTreeMap<String, Vec<String>>,
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Where the configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `--config` argument
    CommandLine(PathBuf),
    /// `SONGQUIZ_CONFIG`
    Environment(PathBuf),
    /// Per-user default location (may not exist)
    DefaultLocation(PathBuf),
    /// No file; built-in defaults
    BuiltIn,
}

/// Pick the config file following the priority order (no I/O beyond `exists`)
pub fn resolve_config_path(cli_arg: Option<&Path>) -> ConfigSource {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return ConfigSource::CommandLine(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return ConfigSource::Environment(PathBuf::from(path));
        }
    }

    // Priority 3: Per-user config directory
    match default_config_path() {
        Some(path) => ConfigSource::DefaultLocation(path),
        None => ConfigSource::BuiltIn,
    }
}

/// `<config_dir>/songquiz/config.toml`, if the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("songquiz").join("config.toml"))
}

impl SongquizConfig {
    /// Resolve and load configuration
    ///
    /// # Arguments
    /// * `cli_arg` - Path passed with `--config`, if any
    ///
    /// # Errors
    /// Returns `Error::Config` if an explicitly named file is missing, cannot
    /// be parsed, or fails validation.
    pub fn load(cli_arg: Option<&Path>) -> Result<Self> {
        match resolve_config_path(cli_arg) {
            ConfigSource::CommandLine(path) | ConfigSource::Environment(path) => {
                Self::from_file(&path)
            }
            ConfigSource::DefaultLocation(path) => {
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    warn!(path = %path.display(), "No config file found, using built-in defaults");
                    Ok(Self::default())
                }
            }
            ConfigSource::BuiltIn => {
                warn!("Could not determine config directory, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load and validate one TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        let config = Self::from_toml_str(&content).map_err(|e| match e {
            Error::Toml(e) => {
                Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
            }
            other => other,
        })?;

        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SongquizConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges and taxonomy keys
    pub fn validate(&self) -> Result<()> {
        let m = &self.matching;
        let policies = [
            ("matching.title_min_shared", SimilarityPolicy::Overlap { min_shared: m.title_min_shared }),
            ("matching.artist_min_shared", SimilarityPolicy::Overlap { min_shared: m.artist_min_shared }),
            ("matching.dedup_threshold", self.dedup_policy()),
        ];
        for (field, policy) in policies {
            policy
                .validate()
                .map_err(|e| Error::Config(format!("{}: {}", field, e)))?;
        }

        if self.tags.min_weight > 100 {
            return Err(Error::Config(format!(
                "tags.min_weight must be within [0, 100], got {}",
                self.tags.min_weight
            )));
        }

        // Surfaces unknown parent labels
        self.genre_taxonomy()?;
        Ok(())
    }

    /// Matcher with the configured title/artist overlap requirements
    pub fn track_matcher(&self) -> TrackMatcher {
        TrackMatcher::with_policies(
            SimilarityPolicy::Overlap {
                min_shared: self.matching.title_min_shared,
            },
            SimilarityPolicy::Overlap {
                min_shared: self.matching.artist_min_shared,
            },
        )
    }

    /// Jaccard policy used for dataset deduplication
    pub fn dedup_policy(&self) -> SimilarityPolicy {
        SimilarityPolicy::Jaccard {
            threshold: self.matching.dedup_threshold,
        }
    }

    /// Built-in taxonomy plus configured extras
    pub fn genre_taxonomy(&self) -> Result<GenreTaxonomy> {
        GenreTaxonomy::builtin().with_extras(&self.taxonomy.extra)
    }

    pub fn genre_mapper(&self) -> Result<GenreMapper> {
        Ok(GenreMapper::new(self.genre_taxonomy()?))
    }
}
