use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::frame::GeometryMode;
use crate::hotkeys::{default_bindings, HotkeyBinding, HotkeyDispatcher};
use crate::navigator::NavigatorOptions;
use crate::search::DEFAULT_SIZE_LIMIT;
use crate::tour::TourOptions;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub overlay: OverlayConfig,
    /// Key bindings; replaces the defaults wholesale when set
    #[serde(default = "default_bindings")]
    pub hotkeys: Vec<HotkeyBinding>,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Start with the chrome hidden (root carries `hide`)
    #[serde(default)]
    pub start_hidden: bool,
    /// Size the embedded frame to the viewport or to the whole window
    #[serde(default)]
    pub geometry: GeometryMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Upper bound on compiled pattern size in bytes
    #[serde(default = "default_pattern_size_limit")]
    pub pattern_size_limit: usize,
}

fn default_pattern_size_limit() -> usize {
    DEFAULT_SIZE_LIMIT
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            pattern_size_limit: default_pattern_size_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Event poll interval of the host loop
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// Apply only the latest resize once per tick
    #[serde(default = "default_coalesce_resize")]
    pub coalesce_resize: bool,
    /// Width of the step rail in columns
    #[serde(default = "default_rail_width")]
    pub rail_width: u16,
}

fn default_tick_rate() -> u64 {
    250
}

fn default_coalesce_resize() -> bool {
    true
}

fn default_rail_width() -> u16 {
    24
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            coalesce_resize: default_coalesce_resize(),
            rail_width: default_rail_width(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to log to file in TUI mode (false = stderr)
    #[serde(default = "default_log_to_file")]
    pub to_file: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_to_file() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            to_file: default_log_to_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// State directory; logs go under `<state>/logs`
    #[serde(default = "default_state_path")]
    pub state: String,
}

fn default_state_path() -> String {
    ".stepwise".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            state: default_state_path(),
        }
    }
}

impl Config {
    /// Path to the per-user config file, if a config directory exists
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("stepwise").join("config.toml"))
    }

    pub fn load(config_path: Option<&str>) -> Result<Self> {
        // Embedded defaults so stepwise works without config files
        let defaults = Config::default();
        let defaults_json =
            serde_json::to_string(&defaults).context("Failed to serialize default config")?;

        let mut builder = config::Config::builder().add_source(config::File::from_str(
            &defaults_json,
            config::FileFormat::Json,
        ));

        if let Some(user_config) = Self::user_config_path() {
            if user_config.exists() {
                builder = builder.add_source(config::File::from(user_config));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        // STEPWISE__UI__TICK_RATE_MS=100
        builder = builder.add_source(
            config::Environment::with_prefix("STEPWISE")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to load configuration")?;
        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Save config to the per-user config file
    pub fn save(&self) -> Result<()> {
        let config_path =
            Self::user_config_path().context("No config directory on this platform")?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create stepwise config directory")?;
        }

        let toml_str =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        std::fs::write(config_path, toml_str).context("Failed to write config file")?;

        Ok(())
    }

    /// Get absolute path to state directory
    pub fn state_path(&self) -> PathBuf {
        let path = PathBuf::from(&self.paths.state);
        if path.is_absolute() {
            path
        } else {
            std::env::current_dir().unwrap_or_default().join(path)
        }
    }

    /// Get absolute path to logs directory
    pub fn logs_path(&self) -> PathBuf {
        self.state_path().join("logs")
    }

    pub fn navigator_options(&self) -> NavigatorOptions {
        NavigatorOptions {
            start_hidden: self.overlay.start_hidden,
            search_size_limit: self.search.pattern_size_limit,
        }
    }

    pub fn tour_options(&self) -> TourOptions {
        TourOptions {
            navigator: self.navigator_options(),
            geometry: self.overlay.geometry,
            coalesce_resize: self.ui.coalesce_resize,
        }
    }

    /// Build the hotkey dispatcher from the configured bindings
    pub fn dispatcher(&self) -> Result<HotkeyDispatcher> {
        HotkeyDispatcher::from_bindings(&self.hotkeys).context("Invalid hotkey binding")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            overlay: OverlayConfig::default(),
            hotkeys: default_bindings(),
            search: SearchConfig::default(),
            ui: UiConfig::default(),
            logging: LoggingConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}
