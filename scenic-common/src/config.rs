//! Configuration loading and root folder resolution

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "SCENIC_ROOT_FOLDER";

/// Environment variable pointing at an explicit TOML config file
pub const CONFIG_FILE_ENV: &str = "SCENIC_CONFIG";

/// Logging configuration shared by every service's TOML file
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Root folder resolution, highest priority first:
/// 1. Command-line argument
/// 2. `SCENIC_ROOT_FOLDER` environment variable
/// 3. `root_folder` from the TOML config
/// 4. OS-dependent compiled default
#[derive(Debug, Clone)]
pub struct RootFolderResolver {
    module_name: String,
    cli_override: Option<PathBuf>,
    toml_value: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            cli_override: None,
            toml_value: None,
        }
    }

    pub fn with_cli_override(mut self, path: Option<PathBuf>) -> Self {
        self.cli_override = path;
        self
    }

    pub fn with_toml_value(mut self, path: Option<PathBuf>) -> Self {
        self.toml_value = path;
        self
    }

    /// Resolve the root folder; never fails, falls back to the compiled default
    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_override {
            info!("{}: root folder {} (command line)", self.module_name, path.display());
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.trim().is_empty() {
                info!("{}: root folder {} (environment)", self.module_name, path);
                return PathBuf::from(path);
            }
            warn!("{} is set but empty, ignoring", ROOT_FOLDER_ENV);
        }

        if let Some(path) = &self.toml_value {
            info!("{}: root folder {} (TOML config)", self.module_name, path.display());
            return path.clone();
        }

        let path = get_default_root_folder();
        info!("{}: root folder {} (default)", self.module_name, path.display());
        path
    }
}

/// Get OS-dependent default root folder path
pub fn get_default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/scenic (or /var/lib/scenic for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("scenic"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/scenic"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/scenic
        dirs::data_dir()
            .map(|d| d.join("scenic"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/scenic"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\scenic
        dirs::data_local_dir()
            .map(|d| d.join("scenic"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\scenic"))
    } else {
        PathBuf::from("./scenic_data")
    }
}

/// Locate the TOML config file for a module.
///
/// Explicit path (CLI) wins, then `SCENIC_CONFIG`, then
/// `<config dir>/scenic/<module>.toml`, then `/etc/scenic/<module>.toml` on Linux.
/// Returns `None` when no candidate exists.
pub fn locate_config_file(explicit: Option<&Path>, module_name: &str) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    let file_name = format!("{}.toml", module_name);
    let user_config = dirs::config_dir().map(|d| d.join("scenic").join(&file_name));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/scenic").join(&file_name);
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Parse a TOML config file into `T`
pub fn load_toml_config<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Load a TOML config file, degrading to defaults when the file is absent.
///
/// A missing file is not an error (warning + defaults); a file that exists
/// but cannot be parsed is.
pub fn load_toml_or_default<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T> {
    match path {
        Some(path) if path.exists() => {
            info!("Loading configuration from {}", path.display());
            load_toml_config(path)
        }
        Some(path) => {
            warn!("Config file {} not found, using defaults", path.display());
            Ok(T::default())
        }
        None => {
            warn!("No config file found, using defaults");
            Ok(T::default())
        }
    }
}

/// Validate a secret value (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Standard User-Agent for outbound HTTP clients
pub fn get_user_agent() -> String {
    format!("Scenic/{} (+https://github.com/scenic/scenic)", env!("CARGO_PKG_VERSION"))
}
