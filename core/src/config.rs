//! Configuration management (config.toml)
//!
//! Handles loading, saving, and providing defaults for inspector settings.
//! Settings are stored in TOML format in the platform-specific config directory.
//!
//! The page limit is read once when a paginated view is constructed; changing
//! it afterwards only affects views created later.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Number of rows shown per page.
///
/// Always positive. Shared read-only by every paginated view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct PageLimit(NonZeroUsize);

impl PageLimit {
    pub const DEFAULT: PageLimit = PageLimit(NonZeroUsize::new(25).unwrap());

    pub fn new(limit: usize) -> Result<Self, ConfigError> {
        NonZeroUsize::new(limit)
            .map(PageLimit)
            .ok_or(ConfigError::InvalidPageLimit(limit))
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for PageLimit {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<usize> for PageLimit {
    type Error = ConfigError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PageLimit> for usize {
    fn from(limit: PageLimit) -> Self {
        limit.get()
    }
}

/// Inspector configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectorConfig {
    /// Rows per page in every paginated view (default: 25)
    #[serde(default)]
    pub page_limit: PageLimit,
    /// Maximum entries materialized by one member walk (default: 100000)
    #[serde(default = "default_walk_limit")]
    pub walk_limit: usize,
    /// Visible rows before a view shows its scroll handle (default: 20)
    #[serde(default = "default_viewport_rows")]
    pub viewport_rows: usize,
    /// Strings longer than this are truncated in labels (default: 200)
    #[serde(default = "default_max_string_len")]
    pub max_string_len: usize,
    /// Start with the menu hidden (default: false)
    #[serde(default)]
    pub hide_on_startup: bool,
    /// Key that toggles the menu (default: F7)
    #[serde(default = "default_menu_toggle")]
    pub menu_toggle: String,
}

fn default_walk_limit() -> usize {
    100_000
}
fn default_viewport_rows() -> usize {
    20
}
fn default_max_string_len() -> usize {
    200
}
fn default_menu_toggle() -> String {
    "F7".to_string()
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            page_limit: PageLimit::default(),
            walk_limit: default_walk_limit(),
            viewport_rows: default_viewport_rows(),
            max_string_len: default_max_string_len(),
            hide_on_startup: false,
            menu_toggle: default_menu_toggle(),
        }
    }
}

/// Returns the platform-specific configuration directory.
///
/// On Windows: `%APPDATA%\objscope\config`
/// On macOS: `~/Library/Application Support/io.objscope.objscope`
/// On Linux: `~/.config/objscope`
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.objscope", "", "objscope")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Path of `config.toml` inside [`config_dir`].
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Loads the configuration from the platform config directory.
///
/// Returns default values if the file doesn't exist or cannot be parsed.
pub fn load() -> InspectorConfig {
    let Some(path) = config_path() else {
        return InspectorConfig::default();
    };
    if !path.exists() {
        return InspectorConfig::default();
    }
    match load_from(&path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("ignoring {}: {}", path.display(), e);
            InspectorConfig::default()
        }
    }
}

/// Loads the configuration from an explicit path.
pub fn load_from(path: &Path) -> Result<InspectorConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Saves the configuration to an explicit path, creating parent directories.
pub fn save_to(path: &Path, config: &InspectorConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}
