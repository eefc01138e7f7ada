use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::format::Language;

/// Configuration stored on disk.
///
/// Example TOML:
/// yahoo_app_id = "..."
/// language = "ja"
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Yahoo! JAPAN developer application id (Client ID).
    pub yahoo_app_id: Option<String>,

    /// Output language for tool responses.
    pub language: Option<Language>,
}

/// Settings the server runs with, fixed for the life of the process.
#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub app_id: String,
    pub language: Language,
}

impl AppConfig {
    /// First four characters of the app id, for log lines.
    pub fn redacted_app_id(&self) -> String {
        let prefix: String = self.app_id.chars().take(4).collect();
        format!("{prefix}...")
    }
}

// The app id is a credential: keep it out of `{:?}` output.
impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("app_id", &self.redacted_app_id())
            .field("language", &self.language)
            .finish()
    }
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "rainfall-mcp", "rainfall-mcp")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn set_app_id(&mut self, app_id: String) {
        self.yahoo_app_id = Some(app_id);
    }

    /// Returns the stored app id, ignoring blank values.
    pub fn app_id(&self) -> Option<&str> {
        non_blank(self.yahoo_app_id.as_deref())
    }

    /// Build the runtime settings. Values given on the command line win over the file.
    pub fn resolve(
        &self,
        cli_app_id: Option<String>,
        cli_language: Option<Language>,
    ) -> Result<AppConfig> {
        let app_id = non_blank(cli_app_id.as_deref())
            .or_else(|| self.app_id())
            .ok_or_else(|| {
                anyhow!(
                    "No Yahoo app id configured.\n\
                     Hint: pass `--yahoo-app-id <ID>`, set YAHOO_APP_ID, or run `rainfall-mcp configure`."
                )
            })?;

        Ok(AppConfig {
            app_id: app_id.to_string(),
            language: cli_language.or(self.language).unwrap_or_default(),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
