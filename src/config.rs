//! Configuration management

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{AppError, AppResult};
use crate::fs::CopyOptions;
use crate::state::panel::{SortColumn, SortDirection, SortSpec};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Initial sort order of the content table
    pub sorting: SortingConfig,
    /// Copy/move settings
    pub transfer: TransferConfig,
    /// Favorites storage
    pub favorites: FavoritesConfig,
}

/// Sorting settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SortingConfig {
    /// Sort column: "name", "type", "size", "modified"
    pub column: String,
    /// Sort descending instead of ascending
    pub descending: bool,
}

impl Default for SortingConfig {
    fn default() -> Self {
        Self {
            column: "name".to_string(),
            descending: false,
        }
    }
}

impl SortingConfig {
    /// Resolve into a SortSpec, falling back to name for unknown columns
    pub fn spec(&self) -> SortSpec {
        let column = self.column.parse().unwrap_or_else(|_| {
            log::warn!("unknown sort column '{}', using name", self.column);
            SortColumn::Name
        });
        let direction = if self.descending {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        SortSpec { column, direction }
    }
}

/// Largest streaming buffer accepted from the config (1 GiB)
const MAX_BUFFER_KIB: usize = 1024 * 1024;

/// Copy/move settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Streaming buffer in KiB
    pub buffer_kib: usize,
    /// Keep modification time and permissions on copies
    pub preserve_attributes: bool,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            buffer_kib: 1024,
            preserve_attributes: true,
        }
    }
}

impl TransferConfig {
    pub fn copy_options(&self) -> CopyOptions {
        CopyOptions {
            buffer_size: self.buffer_kib.clamp(1, MAX_BUFFER_KIB) * 1024,
            preserve_attributes: self.preserve_attributes,
        }
    }
}

/// Favorites storage settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FavoritesConfig {
    /// Override for the favorites file location
    pub file: Option<String>,
}

/// Platform config directory for dirscout
pub fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        // Linux: $XDG_CONFIG_HOME/dirscout or ~/.config/dirscout
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .or_else(|| std::env::var("HOME").ok().map(|p| PathBuf::from(p).join(".config")))
            .map(|p| p.join("dirscout"))
    }

    #[cfg(target_os = "windows")]
    {
        // Windows: %APPDATA%\dirscout
        std::env::var("APPDATA")
            .ok()
            .map(|p| PathBuf::from(p).join("dirscout"))
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        // macOS and others: ~/.config/dirscout
        std::env::var("HOME")
            .ok()
            .map(|p| PathBuf::from(p).join(".config/dirscout"))
    }
}

/// Get the config file path
pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|p| p.join("config.toml"))
}

/// Default config file content with comments
fn default_config() -> &'static str {
    r#"# dirscout configuration

[sorting]
# Initial sort column: "name", "type", "size" or "modified"
column = "name"
descending = false

[transfer]
# Buffer used when streaming file copies, in KiB
buffer_kib = 1024
# Carry modification time and permissions over to copies
preserve_attributes = true

[favorites]
# Where favorites are stored (defaults to favorites.toml next to this file)
# file = "/home/me/.config/dirscout/favorites.toml"
"#
}

impl Config {
    /// Load configuration from the default location, creating it if missing.
    ///
    /// Never fails: problems are logged and defaults are used.
    pub fn load() -> Self {
        let Some(config_path) = config_file() else {
            log::warn!("could not determine config directory");
            return Config::default();
        };

        if !config_path.exists() {
            if let Some(dir) = config_path.parent()
                && let Err(e) = fs::create_dir_all(dir)
            {
                log::warn!("could not create config directory: {}", e);
                return Config::default();
            }
            if let Err(e) = fs::write(&config_path, default_config()) {
                log::warn!("could not create config file: {}", e);
                return Config::default();
            }
        }

        match Self::load_from(&config_path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{}; using default configuration", e);
                Config::default()
            }
        }
    }

    /// Parse a config file at an explicit path
    pub fn load_from(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> AppResult<Self> {
        toml_edit::de::from_str(content).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Favorites file: configured override, else favorites.toml in the config dir
    pub fn favorites_path(&self) -> Option<PathBuf> {
        match &self.favorites.file {
            Some(file) => Some(PathBuf::from(file)),
            None => config_dir().map(|p| p.join("favorites.toml")),
        }
    }
}
