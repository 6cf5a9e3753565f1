//! TOML-based configuration.
//!
//! Every field has a default, and the defaults are the shell's fixed
//! behavior: with no config file, the browser starts on the Google home page
//! in an 800x600 window at (100, 100) and searches with unencoded Google queries.
//!
//! ## Config file search order
//!
//! 1. `WEBSHELL_CONFIG` environment variable
//! 2. Next to the executable (`<exe_dir>/config.toml`)
//! 3. Platform config directory (`%APPDATA%\webshell\config.toml` on Windows,
//!    `$XDG_CONFIG_HOME/webshell/config.toml` elsewhere)
//! 4. Current working directory (`./config.toml`)
//! 5. No file found → `Config::default()`

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{Result, ShellError};

/// Default home address.
pub const HOME_URL: &str = "https://www.google.com";

/// Prefix the raw search query is appended to.
pub const SEARCH_URL: &str = "https://www.google.com/search?q=";

// ─────────────────────────────────────────────────────────────────────────────
// Config structs
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub window: WindowConfig,
    pub toolbar: ToolbarConfig,
    pub search: SearchConfig,
    pub adblock: AdblockConfig,
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub home_url: String,
    pub window_title: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Initial position of the top-left corner, logical pixels.
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Toolbar geometry, in physical pixels.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ToolbarConfig {
    pub height: u32,
    pub font_size: f32,
    /// TTF/OTF used for labels. Empty = probe common system fonts.
    pub font_path: String,
    pub button_width: f32,
    pub search_button_width: f32,
    pub margin: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub engine_url: String,
    /// Form-encode the query instead of appending it verbatim.
    pub percent_encode_query: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AdblockConfig {
    /// Also consult Adblock Plus lists from `resources/filters/`.
    pub filter_lists: bool,
}

/// Servo engine tuning.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum layout threads. 0 = auto-detect from CPU count.
    pub layout_threads: i64,
    /// HTTP cache size.
    pub cache_size: i64,
    /// User-agent string. Empty = Servo's default.
    pub user_agent: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Defaults
// ─────────────────────────────────────────────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            home_url: HOME_URL.to_string(),
            window_title: "My Web Browser".to_string(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            x: 100,
            y: 100,
            width: 800,
            height: 600,
        }
    }
}

impl Default for ToolbarConfig {
    fn default() -> Self {
        Self {
            height: 40,
            font_size: 15.0,
            font_path: String::new(),
            button_width: 32.0,
            search_button_width: 56.0,
            margin: 4.0,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            engine_url: SEARCH_URL.to_string(),
            percent_encode_query: false,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            layout_threads: 0,
            cache_size: 50_000,
            user_agent: String::new(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Loading
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// Loads the configuration. Never fails: problems are logged and the
    /// defaults apply.
    pub fn load() -> Self {
        let Some(path) = find_config_path() else {
            info!("No config file found, using defaults");
            return Config::default();
        };
        match Self::from_path(&path) {
            Ok(config) => {
                info!(path = %path.display(), "Configuration loaded");
                config
            }
            Err(e) => {
                warn!(error = %e, "Unusable config, using defaults");
                Config::default()
            }
        }
    }

    /// Reads and parses one config file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| ShellError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ShellError::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn find_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("WEBSHELL_CONFIG") {
        let p = PathBuf::from(path);
        if p.is_file() {
            return Some(p);
        }
        warn!(path = %p.display(), "WEBSHELL_CONFIG does not point to a file");
    }

    if let Ok(exe) = std::env::current_exe()
        && let Some(dir) = exe.parent()
    {
        let p = dir.join("config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    if let Some(dir) = platform_config_dir() {
        let p = dir.join("config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    let p = PathBuf::from("config.toml");
    p.is_file().then_some(p)
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var("APPDATA")
            .ok()
            .map(|appdata| PathBuf::from(appdata).join("webshell"))
    }
    #[cfg(not(windows))]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .or_else(|| std::env::var("HOME").ok().map(|h| format!("{h}/.config")))
            .map(|dir| PathBuf::from(dir).join("webshell"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_fixed_behavior() {
        let c = Config::default();
        assert_eq!(c.general.home_url, "https://www.google.com");
        assert_eq!(c.general.window_title, "My Web Browser");
        assert_eq!((c.window.x, c.window.y), (100, 100));
        assert_eq!(c.window.width, 800);
        assert_eq!(c.window.height, 600);
        assert_eq!(c.search.engine_url, "https://www.google.com/search?q=");
        assert!(!c.search.percent_encode_query);
        assert!(!c.adblock.filter_lists);
        assert!(c.toolbar.font_path.is_empty());
    }

    #[test]
    fn test_empty_toml_returns_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let toml = r#"
[search]
percent_encode_query = true

[toolbar]
height = 48
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.search.percent_encode_query);
        assert_eq!(config.search.engine_url, SEARCH_URL);
        assert_eq!(config.toolbar.height, 48);
        assert_eq!(config.toolbar.button_width, 32.0);
        assert_eq!(config.general.home_url, HOME_URL);
    }

    #[test]
    fn test_from_path_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("webshell-no-such-config.toml");
        let err = Config::from_path(&path).unwrap_err();
        assert!(matches!(err, ShellError::Io { .. }));
    }

    #[test]
    fn test_from_path_invalid_toml_is_config_error() {
        let path = std::env::temp_dir().join(format!("webshell-bad-{}.toml", std::process::id()));
        fs::write(&path, "[window\nwidth = ").unwrap();
        let err = Config::from_path(&path).unwrap_err();
        assert!(matches!(err, ShellError::Config { .. }));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_from_path_reads_overrides() {
        let path = std::env::temp_dir().join(format!("webshell-ok-{}.toml", std::process::id()));
        fs::write(&path, "[adblock]\nfilter_lists = true\n").unwrap();
        let config = Config::from_path(&path).unwrap();
        assert!(config.adblock.filter_lists);
        let _ = fs::remove_file(&path);
    }
}
