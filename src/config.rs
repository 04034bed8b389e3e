use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_API_BASE: &str = "http://localhost:8001";
pub const DEFAULT_AGREEMENT_TEXT: &str = "I agree to the Terms of Use";
pub const API_BASE_ENV: &str = "TOU_API_BASE";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GeneralConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub tou_accepted: bool,
    #[serde(default)]
    pub tou_accepted_version: Option<i64>,
    #[serde(default)]
    pub tou_accepted_at: Option<String>,
    /// Address reported to the backend when acceptance is recorded server-side.
    #[serde(default)]
    pub email: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            debug: false,
            tou_accepted: false,
            tou_accepted_version: None,
            tou_accepted_at: None,
            email: None,
        }
    }
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ContentConfig {
    #[serde(default = "default_bullet_marker")]
    pub bullet_marker: String,
    #[serde(default = "default_agreement_text")]
    pub agreement_text: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            bullet_marker: default_bullet_marker(),
            agreement_text: default_agreement_text(),
        }
    }
}

fn default_bullet_marker() -> String {
    "•".to_string()
}

fn default_agreement_text() -> String {
    DEFAULT_AGREEMENT_TEXT.to_string()
}

impl ContentConfig {
    /// The configured marker as a single char.
    pub fn bullet_char(&self) -> Result<char> {
        let mut chars = self.bullet_marker.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => anyhow::bail!(
                "content.bullet_marker must be a single non-whitespace character, got {:?}",
                self.bullet_marker
            ),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            read_timeout_secs: 30,
        }
    }
}

fn default_connect_timeout() -> u64 {
    10
}
fn default_read_timeout() -> u64 {
    30
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&get_config_path())
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        let content = fs::read_to_string(config_path)
            .context(format!("Failed to read config.toml at {:?}", config_path))?;

        let config: Config = toml::from_str(&content).context("Failed to parse config.toml")?;
        config.content.bullet_char()?;

        Ok(config)
    }

    /// Loads the file when it exists; a missing file is not an error.
    pub fn try_load_from(config_path: &Path) -> Result<Option<Self>> {
        if !config_path.exists() {
            return Ok(None);
        }
        Self::load_from(config_path).map(Some)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(config_path, content).context("Failed to write config.toml")?;

        Ok(())
    }

    /// API origin after the `TOU_API_BASE` environment override.
    pub fn effective_api_base(&self) -> String {
        match std::env::var(API_BASE_ENV) {
            Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
            _ => self.general.api_base.clone(),
        }
    }

    pub fn mark_accepted(&mut self, version: Option<i64>) {
        self.general.tou_accepted = true;
        self.general.tou_accepted_version = version;
        self.general.tou_accepted_at = Some(chrono::Utc::now().to_rfc3339());
    }

    pub fn clear_acceptance(&mut self) {
        self.general.tou_accepted = false;
        self.general.tou_accepted_version = None;
        self.general.tou_accepted_at = None;
    }
}

pub fn get_exe_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn get_config_path() -> PathBuf {
    let exe_dir = get_exe_dir();
    let config_path = exe_dir.join("config").join("config.toml");

    if config_path.exists() {
        return config_path;
    }

    let cwd_config = PathBuf::from("config/config.toml");
    if cwd_config.exists() {
        return cwd_config;
    }

    config_path
}
