//! Settings store — the two values the config page hands back.
//!
//! A flat string map persisted as YAML (`<home>/settings.yaml`). The
//! config page returns a URL-encoded JSON object `{"un": ..., "pw": ...}`
//! which is decoded and written here.

use crate::api::types::Credentials;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const USERNAME_KEY: &str = "un";
pub const PASSWORD_KEY: &str = "pw";

/// Payload returned by the configuration page.
#[derive(Debug, Deserialize)]
struct ConfigPageResponse {
    un: String,
    pw: String,
}

/// Persistent key/value store for user settings.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl SettingsStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings: {}", path.display()))?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_yaml::from_str(&content)
                    .with_context(|| format!("Invalid settings file: {}", path.display()))?
            }
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Set a value and write the store to disk.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        self.values.insert(key.to_string(), value.into());
        self.save()
    }

    /// Stored username and password, if both are present.
    pub fn credentials(&self) -> Option<Credentials> {
        let username = self.get(USERNAME_KEY)?;
        let password = self.get(PASSWORD_KEY)?;
        if username.is_empty() {
            return None;
        }
        Some(Credentials {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    pub fn set_credentials(&mut self, credentials: &Credentials) -> Result<()> {
        self.values
            .insert(USERNAME_KEY.to_string(), credentials.username.clone());
        self.values
            .insert(PASSWORD_KEY.to_string(), credentials.password.clone());
        self.save()
    }

    /// Decode what the config page returned and store it.
    pub fn apply_config_response(&mut self, response: &str) -> Result<Credentials> {
        let credentials = parse_config_response(response)?;
        self.set_credentials(&credentials)?;
        tracing::info!(username = %credentials.username, "Stored credentials from config page");
        Ok(credentials)
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let yaml = serde_yaml::to_string(&self.values).context("Failed to serialize settings")?;
        write_private(&self.path, yaml.as_bytes())
            .with_context(|| format!("Failed to write settings: {}", self.path.display()))
    }
}

/// Parse the URL-encoded JSON the config page returns.
pub fn parse_config_response(response: &str) -> Result<Credentials> {
    let decoded = urlencoding::decode(response.trim())
        .context("Config page response is not valid URL encoding")?;
    let payload: ConfigPageResponse =
        serde_json::from_str(&decoded).context("Config page response is not the expected JSON")?;
    if payload.un.trim().is_empty() {
        bail!("Config page response has an empty username");
    }
    Ok(Credentials {
        username: payload.un,
        password: payload.pw,
    })
}

/// The file holds a password: it is created owner-only, and an existing
/// file is tightened before anything is written to it.
#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(contents)
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> io::Result<()> {
    fs::write(path, contents)
}
