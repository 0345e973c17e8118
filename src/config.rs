//! Configuration management for cicero-emu.
//!
//! Configuration is loaded from multiple sources in priority order:
//! 1. Environment variables (`CICERO_WINDOW_WIDTH`, etc.)
//! 2. Project-local config file (`./cicero-emu.toml`)
//! 3. User config file (`~/.config/cicero-emu/config.toml`)
//! 4. Built-in defaults
//!
//! # Config File Format
//!
//! ```toml
//! # cicero-emu.toml
//!
//! # Characters processed per window (lanes)
//! window_width = 4
//!
//! # Directory of compiled programs, one file per regex named by index
//! program_dir = "./programs"
//!
//! # Input strings, one per line
//! strings_file = "./strings.txt"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Global cached configuration.
static CONFIG: OnceLock<Config> = OnceLock::new();

const DEFAULT_WINDOW_WIDTH: usize = 1;
const DEFAULT_PROGRAM_DIR: &str = "./programs";
const DEFAULT_STRINGS_FILE: &str = "./strings.txt";

/// cicero-emu configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Window width used when none is given on the command line.
    pub window_width: Option<usize>,

    /// Directory the batch suite reads programs from.
    pub program_dir: Option<String>,

    /// File the batch suite reads input strings from.
    pub strings_file: Option<String>,
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables
    /// 2. Project-local `cicero-emu.toml`
    /// 3. User config `~/.config/cicero-emu/config.toml`
    /// 4. Defaults
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(user_config) = Self::load_user_config() {
            config.merge(user_config);
        }

        if let Some(local_config) = Self::load_local_config() {
            config.merge(local_config);
        }

        config.apply_env_overrides();

        config
    }

    /// Get the cached global configuration.
    ///
    /// Loads configuration on first call and caches it.
    pub fn get() -> &'static Config {
        CONFIG.get_or_init(|| {
            let config = Self::load();
            log::debug!("Loaded configuration: {:?}", config);
            config
        })
    }

    /// Configured window width, or 1.
    pub fn window_width(&self) -> usize {
        self.window_width.unwrap_or(DEFAULT_WINDOW_WIDTH)
    }

    /// Configured program directory, or `./programs`.
    pub fn program_dir(&self) -> PathBuf {
        PathBuf::from(self.program_dir.as_deref().unwrap_or(DEFAULT_PROGRAM_DIR))
    }

    /// Configured strings file, or `./strings.txt`.
    pub fn strings_file(&self) -> PathBuf {
        PathBuf::from(self.strings_file.as_deref().unwrap_or(DEFAULT_STRINGS_FILE))
    }

    fn load_user_config() -> Option<Self> {
        Self::load_from_file(&Self::user_config_path()?)
    }

    fn load_local_config() -> Option<Self> {
        let local_path = Path::new("cicero-emu.toml");
        if let Some(config) = Self::load_from_file(local_path) {
            return Some(config);
        }

        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let project_path = Path::new(&manifest_dir).join("cicero-emu.toml");
            if let Some(config) = Self::load_from_file(&project_path) {
                return Some(config);
            }
        }

        None
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    Some(config)
                }
                Err(e) => {
                    log::warn!("Failed to parse {}: {}", path.display(), e);
                    None
                }
            },
            Err(e) => {
                log::warn!("Failed to read {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Merge another config into this one.
    /// Only overrides fields that are Some in the other config.
    fn merge(&mut self, other: Self) {
        if other.window_width.is_some() {
            self.window_width = other.window_width;
        }
        if other.program_dir.is_some() {
            self.program_dir = other.program_dir;
        }
        if other.strings_file.is_some() {
            self.strings_file = other.strings_file;
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(width) = std::env::var("CICERO_WINDOW_WIDTH") {
            match width.trim().parse::<usize>() {
                Ok(width) => {
                    log::info!("Using CICERO_WINDOW_WIDTH from environment: {}", width);
                    self.window_width = Some(width);
                }
                Err(e) => log::warn!("Ignoring CICERO_WINDOW_WIDTH={:?}: {}", width, e),
            }
        }
        if let Ok(path) = std::env::var("CICERO_PROGRAM_DIR") {
            log::info!("Using CICERO_PROGRAM_DIR from environment: {}", path);
            self.program_dir = Some(path);
        }
        if let Ok(path) = std::env::var("CICERO_STRINGS_FILE") {
            log::info!("Using CICERO_STRINGS_FILE from environment: {}", path);
            self.strings_file = Some(path);
        }
    }

    /// Get the path to the user config file (for display/creation).
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("cicero-emu").join("config.toml"))
    }

    /// Generate a sample config file content.
    pub fn sample_config() -> String {
        r#"# cicero-emu configuration
# Place this file at ~/.config/cicero-emu/config.toml or ./cicero-emu.toml

# Characters processed per window. Any width gives the same verdicts;
# wider windows keep more threads in flight.
window_width = 1

# Directory of compiled programs for `cicero-emu batch`
# Files are named by regex index (0, 1, 2, ...) and hold one hex word per line
program_dir = "./programs"

# Input strings for `cicero-emu batch`, one per line
strings_file = "./strings.txt"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.window_width(), 1);
        assert_eq!(config.program_dir(), PathBuf::from("./programs"));
        assert_eq!(config.strings_file(), PathBuf::from("./strings.txt"));
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config {
            window_width: Some(2),
            program_dir: None,
            strings_file: Some("/base/strings.txt".to_string()),
        };

        let overlay = Config {
            window_width: None,
            program_dir: Some("/overlay/programs".to_string()),
            strings_file: Some("/overlay/strings.txt".to_string()),
        };

        base.merge(overlay);

        assert_eq!(base.window_width, Some(2));
        assert_eq!(base.program_dir, Some("/overlay/programs".to_string()));
        assert_eq!(base.strings_file, Some("/overlay/strings.txt".to_string()));
    }

    #[test]
    fn test_partial_file() {
        let config: Config = toml::from_str("window_width = 8").unwrap();
        assert_eq!(config.window_width(), 8);
        assert_eq!(config.program_dir, None);
    }

    #[test]
    fn test_sample_config_parses() {
        let sample = Config::sample_config();
        let config: Config = toml::from_str(&sample).expect("Sample config should parse");
        assert_eq!(config.window_width(), 1);
        assert_eq!(config.program_dir(), PathBuf::from("./programs"));
    }
}
