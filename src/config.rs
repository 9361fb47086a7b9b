use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Overrides `service.base_url` when set.
pub const API_URL_ENV: &str = "CONTACTS_API_URL";

const APP_DIR: &str = "contacts-sync";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub walk: WalkConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Client name sent with the login request.
    #[serde(default = "default_source")]
    pub source: String,
    /// Page size requested for the first feed page.
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:3001".to_string()
}
fn default_source() -> String {
    "Contacts-Sync-App-1".to_string()
}
fn default_max_results() -> u32 { 2500 }
fn default_timeout_secs() -> u64 { 30 }

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            source: default_source(),
            max_results: default_max_results(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct WalkConfig {
    /// Fetch every page without asking.
    #[serde(default)]
    pub auto_continue: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Write logs here instead of stderr.
    pub file: Option<PathBuf>,
}

fn default_log_filter() -> String {
    "contacts_sync_cli=warn".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            file: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "Failed to parse config TOML")
    }

    /// Load from `explicit` if given (it must exist), else from the per-user
    /// config file if present, else defaults. Env overrides apply last.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => match default_path().filter(|p| p.exists()) {
                Some(path) => Self::load(&path)?,
                None => Config::default(),
            },
        };
        config.apply_env();
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            let url = url.trim();
            if !url.is_empty() {
                self.service.base_url = url.to_string();
            }
        }
    }
}

/// `<config_dir>/contacts-sync/config.toml`, when the platform has a config dir.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_parses() {
        let config = Config::load(Path::new("config.toml")).unwrap();
        assert_eq!(config.service.max_results, 2500);
        assert_eq!(config.service.source, "Contacts-Sync-App-1");
        assert!(!config.walk.auto_continue);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = Config::parse("[walk]\nauto_continue = true\n").unwrap();
        assert!(config.walk.auto_continue);
        assert_eq!(config.service.base_url, "http://localhost:3001");
        assert_eq!(config.service.timeout_secs, 30);
        assert_eq!(config.log.filter, "contacts_sync_cli=warn");
        assert!(config.log.file.is_none());
    }

    #[test]
    fn test_explicit_path_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[service]\nmax_results = 25\n\n[log]\nfile = \"sync.log\"").unwrap();

        let config = Config::resolve(Some(file.path())).unwrap();
        assert_eq!(config.service.max_results, 25);
        assert_eq!(config.log.file, Some(PathBuf::from("sync.log")));
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::resolve(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        assert!(Config::parse("[service\nbase_url = 1").is_err());
    }

    #[test]
    fn test_api_url_env_overrides_base_url() {
        let mut config = Config::default();

        std::env::set_var(API_URL_ENV, "  https://contacts.example.com/api \n");
        config.apply_env();
        assert_eq!(config.service.base_url, "https://contacts.example.com/api");

        std::env::set_var(API_URL_ENV, "   ");
        config.apply_env();
        assert_eq!(config.service.base_url, "https://contacts.example.com/api");

        std::env::remove_var(API_URL_ENV);
        let mut config = Config::default();
        config.apply_env();
        assert_eq!(config.service.base_url, "http://localhost:3001");
    }
}
