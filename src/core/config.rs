//! Configuration management for Lessonforge.
//!
//! Handles loading and saving configuration from TOML files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Lesson-plan service settings
    pub service: ServiceConfig,

    /// Artifact download settings
    pub download: DownloadConfig,

    /// UI/TUI settings
    pub ui: UiConfig,
}

/// Remote service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL of the lesson-plan service API
    pub base_url: String,
}

/// Artifact download settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Directory where downloaded artifacts are written (default: cwd)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

/// UI/TUI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Whether to show key hints in the status bar
    pub show_hints: bool,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Looks for config in:
    /// 1. `.lessonforge.toml` in current directory
    /// 2. `~/.config/lessonforge/config.toml`
    /// 3. Falls back to defaults
    ///
    /// `LESSONFORGE_URL` overrides the configured base URL in all cases.
    pub fn load() -> anyhow::Result<Self> {
        let mut config = Self::load_file()?;

        if let Ok(url) = std::env::var("LESSONFORGE_URL") {
            if !url.is_empty() {
                config.service.base_url = url;
            }
        }

        Ok(config)
    }

    fn load_file() -> anyhow::Result<Self> {
        let local_config = PathBuf::from(".lessonforge.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let global_config = config_dir.join("lessonforge").join("config.toml");
            if global_config.exists() {
                return Self::load_from_file(&global_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the global config file.
    pub fn save(&self) -> anyhow::Result<()> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        let app_dir = config_dir.join("lessonforge");
        std::fs::create_dir_all(&app_dir)?;

        let config_path = app_dir.join("config.toml");
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;

        Ok(())
    }

    /// Get the config directory path.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("lessonforge"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            download: DownloadConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self { base_url: "http://localhost:8000/api".to_string() }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { show_hints: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service.base_url, "http://localhost:8000/api");
        assert!(config.ui.show_hints);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[service]\nbase_url = \"https://plans.example.edu/api\"").unwrap();

        let config = Config::load_from_file(&file.path().to_path_buf()).unwrap();
        assert_eq!(config.service.base_url, "https://plans.example.edu/api");
        assert!(config.ui.show_hints);
    }
}
