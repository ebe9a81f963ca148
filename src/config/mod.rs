//! Static application configuration.
//!
//! Everything the clients need that is not a user credential: the connected
//! app's client id and secret, the token endpoint, the service URL prefix
//! and the config page URL. Lives in `<home>/config.yaml`; every field can
//! be overridden from the environment.
//!
//! # Example config file:
//! ```yaml
//! client_id: 3MVG9...
//! client_secret: "1234567890"
//! service_url_prefix: https://na10.salesforce.com/services/apexrest/mynamespace/
//! config_url: https://example.com/sfapprove/config-page.html
//! ```

pub mod settings;

use crate::api::auth::DEFAULT_LOGIN_URL;
use crate::api::types::mask_secret;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use settings::SettingsStore;

pub const HOME_ENV: &str = "SFAPPROVE_HOME";
const CONFIG_FILE: &str = "config.yaml";
const SETTINGS_FILE: &str = "settings.yaml";
const LOG_DIR: &str = "logs";

/// Connected-app and endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_login_url")]
    pub login_url: String,
    #[serde(default)]
    pub service_url_prefix: String,
    #[serde(default)]
    pub config_url: Option<String>,
}

fn default_login_url() -> String {
    DEFAULT_LOGIN_URL.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            login_url: default_login_url(),
            service_url_prefix: String::new(),
            config_url: None,
        }
    }
}

impl AppConfig {
    /// Load from a YAML file. A missing file gives the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut config: AppConfig =
            serde_yaml::from_str(yaml).context("Invalid YAML syntax in config file")?;
        config.normalize();
        Ok(config)
    }

    /// Apply `SFAPPROVE_*` overrides, looked up through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("SFAPPROVE_CLIENT_ID") {
            self.client_id = v;
        }
        if let Some(v) = lookup("SFAPPROVE_CLIENT_SECRET") {
            self.client_secret = v;
        }
        if let Some(v) = lookup("SFAPPROVE_LOGIN_URL") {
            self.login_url = v;
        }
        if let Some(v) = lookup("SFAPPROVE_SERVICE_URL") {
            self.service_url_prefix = v;
        }
        if let Some(v) = lookup("SFAPPROVE_CONFIG_URL") {
            self.config_url = Some(v);
        }
        self.normalize();
    }

    /// Everything needed before a network call can be made.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.client_id.trim().is_empty() {
            missing.push("client_id");
        }
        if self.client_secret.trim().is_empty() {
            missing.push("client_secret");
        }
        if self.login_url.trim().is_empty() {
            missing.push("login_url");
        }
        if self.service_url_prefix.trim().is_empty() {
            missing.push("service_url_prefix");
        }
        if !missing.is_empty() {
            bail!("Config is missing: {}", missing.join(", "));
        }
        Ok(())
    }

    /// Human-readable lines for `sfapprove config`, secret masked.
    pub fn describe(&self) -> Vec<(&'static str, String)> {
        vec![
            ("client_id", self.client_id.clone()),
            ("client_secret", mask_secret(&self.client_secret)),
            ("login_url", self.login_url.clone()),
            ("service_url_prefix", self.service_url_prefix.clone()),
            (
                "config_url",
                self.config_url.clone().unwrap_or_else(|| "(not set)".to_string()),
            ),
        ]
    }

    fn normalize(&mut self) {
        let prefix = self.service_url_prefix.trim();
        self.service_url_prefix = if prefix.is_empty() || prefix.ends_with('/') {
            prefix.to_string()
        } else {
            format!("{}/", prefix)
        };
        if self.login_url.trim().is_empty() {
            self.login_url = default_login_url();
        }
    }
}

/// Where config, settings and logs live.
#[derive(Debug, Clone)]
pub struct AppPaths {
    home: PathBuf,
}

impl AppPaths {
    /// Use `explicit` when given (from `--home` / `SFAPPROVE_HOME`),
    /// otherwise `~/.sfapprove`.
    pub fn resolve(explicit: Option<PathBuf>) -> Result<Self> {
        let home = match explicit {
            Some(dir) => dir,
            None => dirs::home_dir()
                .context("Could not determine home directory")?
                .join(".sfapprove"),
        };
        Ok(Self { home })
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn config_file(&self) -> PathBuf {
        self.home.join(CONFIG_FILE)
    }

    pub fn settings_file(&self) -> PathBuf {
        self.home.join(SETTINGS_FILE)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.home.join(LOG_DIR)
    }

    /// Load `config.yaml` and apply environment overrides.
    pub fn load_config(&self) -> Result<AppConfig> {
        let mut config = AppConfig::load(self.config_file())?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn open_settings(&self) -> Result<SettingsStore> {
        SettingsStore::open(self.settings_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_parse_config() {
        let yaml = r#"
client_id: abc
client_secret: shh
service_url_prefix: https://na10.example.com/services/apexrest/ns
config_url: https://example.com/config.html
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.client_id, "abc");
        assert_eq!(config.login_url, DEFAULT_LOGIN_URL);
        assert_eq!(
            config.service_url_prefix,
            "https://na10.example.com/services/apexrest/ns/"
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = AppConfig::load(tmp.path().join("config.yaml")).unwrap();
        assert_eq!(config, AppConfig::default());
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("client_id"));
        assert!(err.contains("service_url_prefix"));
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = AppConfig::from_yaml("client_id: from-file\n").unwrap();
        let env: HashMap<&str, &str> = [
            ("SFAPPROVE_CLIENT_ID", "from-env"),
            ("SFAPPROVE_SERVICE_URL", "http://localhost:9999/api"),
        ]
        .into_iter()
        .collect();
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.client_id, "from-env");
        assert_eq!(config.service_url_prefix, "http://localhost:9999/api/");
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        assert!(AppConfig::from_yaml("client_id: [unclosed").is_err());
    }

    #[test]
    fn test_describe_masks_secret() {
        let config = AppConfig {
            client_secret: "supersecretvalue".to_string(),
            ..Default::default()
        };
        let secret = config
            .describe()
            .into_iter()
            .find(|(k, _)| *k == "client_secret")
            .map(|(_, v)| v)
            .unwrap();
        assert!(!secret.contains("secretvalue"));
    }
}
