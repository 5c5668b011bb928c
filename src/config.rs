//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$DICTLOOKUP_CONFIG` (environment variable)
//! 2. `~/.config/dictlookup/config.toml` (Linux/macOS)
//!    `%APPDATA%\dictlookup\config.toml` (Windows)
//! 3. Built-in defaults

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::lookup::{SearchConfiguration, SessionSettings, DEFAULT_DISTANCE, DEFAULT_HISTORY_CAPACITY};
use crate::model::{MatchMode, SearchFieldSelection};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Initial lookup settings.
    pub lookup: LookupConfig,
    /// Lookup history.
    pub history: HistoryConfig,
    /// Word list dictionaries loaded on startup.
    pub wordlist: WordListConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Override cache directory for logs.
    pub cache_dir: Option<PathBuf>,
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
}

/// Initial state of the search configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Search mode selected on startup: "exact", "prefix", "suffix", "any", "near".
    pub default_mode: String,
    /// Maximum entries per lookup (0 = unlimited).
    pub entry_limit: usize,
    /// Default distance for the "near" mode.
    pub distance: u32,
    /// Allow selecting several dictionaries at once.
    pub multi_dictionary: bool,
    /// Search headwords.
    pub search_word: bool,
    /// Search readings.
    pub search_reading: bool,
    /// Search translations.
    pub search_translation: bool,
    /// Match against the whole field or single words of it.
    pub match_mode: MatchMode,
}

/// Lookup history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Number of lookups kept for back/forward navigation.
    pub capacity: usize,
}

/// Word list dictionaries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WordListConfig {
    /// Character encoding label; detected from a byte order mark when unset.
    pub encoding: Option<String>,
    /// Word list files, in lookup order.
    pub dictionaries: Vec<PathBuf>,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            log_level: "warn".to_string(),
        }
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            default_mode: "exact".to_string(),
            entry_limit: 0,
            distance: DEFAULT_DISTANCE,
            multi_dictionary: false,
            search_word: true,
            search_reading: true,
            search_translation: true,
            match_mode: MatchMode::Field,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

// ── Applying settings ───────────────────────────────────────────

impl LookupConfig {
    /// Entry limit, `None` when unlimited.
    pub fn limit(&self) -> Option<usize> {
        (self.entry_limit > 0).then_some(self.entry_limit)
    }

    pub fn field_selection(&self) -> SearchFieldSelection {
        SearchFieldSelection::new(
            self.search_word,
            self.search_reading,
            self.search_translation,
            self.match_mode,
        )
    }

    /// Apply these settings to a search configuration as one grouped change.
    ///
    /// A default mode that is unknown or unavailable is skipped with a warning.
    pub fn apply(&self, config: &mut SearchConfiguration) {
        let default_mode = self.default_mode.clone();
        let fields = self.field_selection();
        let distance = self.distance;
        let multi = self.multi_dictionary;

        let applied = config.with_batch(|c| {
            c.set_multi_dictionary_selection_mode(multi);
            c.set_distance(distance);
            c.set_search_field_selection(fields);
            match c.search_mode_by_id(&default_mode).cloned() {
                Some(mode) => {
                    if let Err(e) = c.select_search_mode(&mode) {
                        tracing::warn!(mode = %default_mode, error = %e, "Default search mode unavailable");
                    }
                }
                None => tracing::warn!(mode = %default_mode, "Unknown default search mode"),
            }
            Ok(())
        });
        if let Err(e) = applied {
            tracing::warn!(error = %e, "Failed to apply lookup settings");
        }
    }
}

impl Config {
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            entry_limit: self.lookup.limit(),
            history_capacity: self.history.capacity,
        }
    }
}

// ── Load / save ─────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    if let Some(path) = config_file_path() {
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<Config>(&contents) {
                    Ok(cfg) => {
                        tracing::info!(path = %path.display(), "Loaded config");
                        return cfg;
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to parse config, using defaults"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read config file, using defaults"
                    );
                }
            }
        }
    }
    Config::default()
}

/// Save configuration to the standard location.
pub fn save_config(config: &Config) -> anyhow::Result<()> {
    let path = config_file_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config file path"))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(&path, contents)?;
    tracing::info!(path = %path.display(), "Saved config");
    Ok(())
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("DICTLOOKUP_CONFIG") {
        return Some(PathBuf::from(env_path));
    }
    dirs::config_dir().map(|d| d.join("dictlookup").join("config.toml"))
}

/// Return the cache directory for logs.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dictlookup")
}

/// Return the log file path.
pub fn log_file_path(config: &Config) -> PathBuf {
    cache_dir(config).join("dictlookup.log")
}
