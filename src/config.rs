use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::api::DEFAULT_BASE_URL;
use crate::dashboard::{ChatContextSettings, DEFAULT_CHAT_CONTEXT_ENTRIES, DEFAULT_CHAT_CONTEXT_SEPARATOR};
use crate::session::DEMO_USER_ID;
use crate::timestamp::{DisplayZone, DEFAULT_DISPLAY_TIMEZONE};
use crate::utils;

/// Current configuration version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_config_version")]
    pub config_version: Option<u32>,
    /// Authenticated user id handed over by the sign-in flow
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default = "default_demo_user_id")]
    pub demo_user_id: String,
    #[serde(default = "default_display_timezone")]
    pub display_timezone: String,
    #[serde(default = "default_chat_context_entries")]
    pub chat_context_entries: usize,
    #[serde(default = "default_chat_context_separator")]
    pub chat_context_separator: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_current_theme")]
    pub current_theme: String,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub key_bindings: KeyBindings,
    #[serde(default)]
    pub themes: HashMap<String, Theme>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// No timeout when unset; a hung request then keeps its busy flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBindings {
    #[serde(default = "default_quit")]
    pub quit: String,
    #[serde(default = "default_help")]
    pub help: String,
    #[serde(default = "default_compose")]
    pub compose: String,
    #[serde(default = "default_publish")]
    pub publish: String,
    #[serde(default = "default_delete")]
    pub delete: String,
    #[serde(default = "default_toggle_select")]
    pub toggle_select: String,
    #[serde(default = "default_analyze")]
    pub analyze: String,
    #[serde(default = "default_clear_selection")]
    pub clear_selection: String,
    #[serde(default = "default_chat")]
    pub chat: String,
    #[serde(default = "default_reset_chat")]
    pub reset_chat: String,
    #[serde(default = "default_goals")]
    pub goals: String,
    #[serde(default = "default_delete_goal")]
    pub delete_goal: String,
    #[serde(default = "default_open_note")]
    pub open_note: String,
    #[serde(default = "default_reload")]
    pub reload: String,
    #[serde(default = "default_list_up")]
    pub list_up: String,
    #[serde(default = "default_list_down")]
    pub list_down: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default = "default_fg")]
    pub fg: String,
    #[serde(default = "default_bg")]
    pub bg: String,
    #[serde(default = "default_highlight_bg")]
    pub highlight_bg: String,
    #[serde(default = "default_highlight_fg")]
    pub highlight_fg: String,
    /// Selected entries, goal bullets, the AI note badge
    #[serde(default = "default_accent")]
    pub accent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_version: Some(CURRENT_CONFIG_VERSION),
            user_id: None,
            demo_user_id: default_demo_user_id(),
            display_timezone: default_display_timezone(),
            chat_context_entries: default_chat_context_entries(),
            chat_context_separator: default_chat_context_separator(),
            log_level: default_log_level(),
            current_theme: default_current_theme(),
            api: ApiConfig::default(),
            key_bindings: KeyBindings::default(),
            themes: HashMap::new(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: default_quit(),
            help: default_help(),
            compose: default_compose(),
            publish: default_publish(),
            delete: default_delete(),
            toggle_select: default_toggle_select(),
            analyze: default_analyze(),
            clear_selection: default_clear_selection(),
            chat: default_chat(),
            reset_chat: default_reset_chat(),
            goals: default_goals(),
            delete_goal: default_delete_goal(),
            open_note: default_open_note(),
            reload: default_reload(),
            list_up: default_list_up(),
            list_down: default_list_down(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            fg: default_fg(),
            bg: default_bg(),
            highlight_bg: default_highlight_bg(),
            highlight_fg: default_highlight_fg(),
            accent: default_accent(),
        }
    }
}

impl Theme {
    /// Get preset themes that are always available
    pub fn get_preset_themes() -> HashMap<String, Theme> {
        let mut themes = HashMap::new();

        themes.insert("default".to_string(), Theme::default());

        themes.insert("paper".to_string(), Theme {
            fg: "black".to_string(),
            bg: "#F8F7F4".to_string(),
            highlight_bg: "black".to_string(),
            highlight_fg: "white".to_string(),
            accent: "#FA5515".to_string(),
        });

        themes.insert("monochrome".to_string(), Theme {
            fg: "white".to_string(),
            bg: "black".to_string(),
            highlight_bg: "white".to_string(),
            highlight_fg: "black".to_string(),
            accent: "white".to_string(),
        });

        themes
    }
}

// Default value functions
fn default_config_version() -> Option<u32> {
    Some(CURRENT_CONFIG_VERSION)
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_demo_user_id() -> String {
    DEMO_USER_ID.to_string()
}

fn default_display_timezone() -> String {
    DEFAULT_DISPLAY_TIMEZONE.to_string()
}

fn default_chat_context_entries() -> usize {
    DEFAULT_CHAT_CONTEXT_ENTRIES
}

fn default_chat_context_separator() -> String {
    DEFAULT_CHAT_CONTEXT_SEPARATOR.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_current_theme() -> String {
    "default".to_string()
}

fn default_quit() -> String {
    "q".to_string()
}

fn default_help() -> String {
    "F1".to_string()
}

fn default_compose() -> String {
    "n".to_string()
}

fn default_publish() -> String {
    "Ctrl+s".to_string()
}

fn default_delete() -> String {
    "d".to_string()
}

fn default_toggle_select() -> String {
    "Space".to_string()
}

fn default_analyze() -> String {
    "a".to_string()
}

fn default_clear_selection() -> String {
    "x".to_string()
}

fn default_chat() -> String {
    "c".to_string()
}

fn default_reset_chat() -> String {
    "Ctrl+r".to_string()
}

// Typing goes to the goal draft, so this one needs a modifier
fn default_delete_goal() -> String {
    "Ctrl+d".to_string()
}

fn default_goals() -> String {
    "g".to_string()
}

fn default_open_note() -> String {
    "Enter".to_string()
}

fn default_reload() -> String {
    "r".to_string()
}

fn default_list_up() -> String {
    "k".to_string()
}

fn default_list_down() -> String {
    "j".to_string()
}

fn default_fg() -> String {
    "white".to_string()
}

fn default_bg() -> String {
    "black".to_string()
}

fn default_highlight_bg() -> String {
    "blue".to_string()
}

fn default_highlight_fg() -> String {
    "white".to_string()
}

fn default_accent() -> String {
    "#FA5515".to_string()
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config directory: {0}")]
    ConfigDirError(String),
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to write config file: {0}")]
    WriteError(String),
    #[error("Invalid display timezone: {0}")]
    InvalidTimezone(String),
}

impl Config {
    /// Load configuration for a profile, creating a default file if missing
    pub fn load_with_profile(profile: utils::Profile) -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path(profile)?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from an explicit path, creating a default file if missing
    pub fn load_from_path(config_path: &Path) -> Result<Self, ConfigError> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path)
                .map_err(|e| ConfigError::ReadError(e.to_string()))?;
            let config: Config = toml::from_str(&contents)?;
            config.display_zone()?;
            Ok(config)
        } else {
            let mut config = Config::default();
            config.save_to_path(config_path)?;
            log::info!("Wrote default config to {}", config_path.display());
            Ok(config)
        }
    }

    /// Save configuration to a path, creating parent directories as needed
    pub fn save_to_path(&mut self, config_path: &Path) -> Result<(), ConfigError> {
        self.config_version = Some(CURRENT_CONFIG_VERSION);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::WriteError(format!("Failed to serialize config: {}", e)))?;

        fs::write(config_path, toml_string)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn get_config_path(profile: utils::Profile) -> Result<PathBuf, ConfigError> {
        let config_dir = utils::get_config_dir(profile)
            .ok_or_else(|| ConfigError::ConfigDirError("Could not determine config directory".to_string()))?;
        Ok(config_dir.join("config.toml"))
    }

    pub fn display_zone(&self) -> Result<DisplayZone, ConfigError> {
        DisplayZone::parse(&self.display_timezone).map_err(ConfigError::InvalidTimezone)
    }

    pub fn chat_context_settings(&self) -> ChatContextSettings {
        ChatContextSettings {
            entries: self.chat_context_entries,
            separator: self.chat_context_separator.clone(),
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.api.timeout_secs.map(Duration::from_secs)
    }

    /// Get the currently active theme, falling back to the default preset
    pub fn get_active_theme(&self) -> Theme {
        self.themes
            .get(&self.current_theme)
            .cloned()
            .or_else(|| Theme::get_preset_themes().remove(&self.current_theme))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from_path(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.demo_user_id, "demo_user");
        assert_eq!(config.display_timezone, "Asia/Kolkata");
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn saved_config_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.user_id = Some("user_2abc".to_string());
        config.api.timeout_secs = Some(20);
        config.key_bindings.quit = "Ctrl+q".to_string();
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.user_id.as_deref(), Some("user_2abc"));
        assert_eq!(loaded.request_timeout(), Some(Duration::from_secs(20)));
        assert_eq!(loaded.key_bindings.quit, "Ctrl+q");
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[api]\nbase_url = \"http://localhost:8000\"\n").unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.chat_context_entries, 5);
        assert_eq!(config.chat_context_settings().separator, " | ");
        assert_eq!(config.key_bindings.toggle_select, "Space");
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "display_timezone = \"Nowhere/Special\"\n").unwrap();

        assert!(matches!(Config::load_from_path(&path), Err(ConfigError::InvalidTimezone(_))));
    }

    #[test]
    fn unknown_theme_falls_back_to_default() {
        let mut config = Config::default();
        config.current_theme = "neon".to_string();
        assert_eq!(config.get_active_theme(), Theme::default());
        config.current_theme = "paper".to_string();
        assert_eq!(config.get_active_theme().accent, "#FA5515");
    }
}
