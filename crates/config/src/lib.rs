use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;
use zendesk_auth::{token_key, Credentials, SecretStore};

/// Represents the full client configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub default_profile: Option<String>,
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Config {
    /// Load configuration from the provided path or the default config file.
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let path = path
            .map(|p| p.as_ref().to_path_buf())
            .unwrap_or_else(Config::default_path);

        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("Unable to read config file at {}", path.display()))?;

        serde_yaml::from_str(&raw)
            .with_context(|| format!("Malformed YAML in config file {}", path.display()))
    }

    /// Persist the configuration to disk, creating parent directories if needed.
    pub fn save<P: AsRef<Path>>(&self, path: Option<P>) -> Result<()> {
        let path = path
            .map(|p| p.as_ref().to_path_buf())
            .unwrap_or_else(Config::default_path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Unable to create config directory {}", parent.display())
            })?;
        }

        let serialized = serde_yaml::to_string(self)?;
        fs::write(&path, serialized)
            .with_context(|| format!("Unable to write config file {}", path.display()))?;

        Ok(())
    }

    pub fn profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    /// Returns either the requested profile or falls back to the default one.
    pub fn resolve_profile<'a>(
        &'a self,
        requested: Option<&'a str>,
    ) -> Option<(&'a str, &'a Profile)> {
        if let Some(name) = requested {
            self.profiles.get(name).map(|profile| (name, profile))
        } else if let Some(default_name) = self.default_profile.as_deref() {
            self.profiles
                .get(default_name)
                .map(|profile| (default_name, profile))
        } else if self.profiles.len() == 1 {
            self.profiles
                .iter()
                .next()
                .map(|(name, profile)| (name.as_str(), profile))
        } else {
            None
        }
    }

    /// Resolve a profile into everything needed to build a client.
    pub fn connection(
        &self,
        requested: Option<&str>,
        store: Option<&SecretStore>,
    ) -> Result<Connection> {
        let (name, profile) = self
            .resolve_profile(requested)
            .ok_or_else(|| match requested {
                Some(name) => anyhow!("Profile '{name}' is not configured."),
                None => anyhow!("No default profile configured."),
            })?;

        Ok(Connection {
            base_url: profile.resolve_base_url(name)?,
            credentials: profile.credentials(name, store)?,
        })
    }

    fn default_path() -> PathBuf {
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".zendesk");
        path.push("config.yaml");
        path
    }
}

/// A single account. Values are optional so tokens can live in the secret
/// store instead of the YAML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Profile {
    /// Account subdomain, expanded to `https://{subdomain}.zendesk.com`.
    pub subdomain: Option<String>,
    /// Full base URL, takes precedence over `subdomain`.
    pub base_url: Option<String>,
    pub email: Option<String>,
    pub api_token: Option<String>,
    pub password: Option<String>,
    pub oauth_token: Option<String>,
}

impl Profile {
    pub fn resolve_base_url(&self, name: &str) -> Result<String> {
        if let Some(url) = self.base_url.as_deref().filter(|u| !u.trim().is_empty()) {
            return Ok(url.to_string());
        }

        self.subdomain
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| format!("https://{s}.zendesk.com"))
            .ok_or_else(|| anyhow!("Profile '{name}' has neither base_url nor subdomain."))
    }

    /// Credentials in priority order: OAuth token, API token (inline, then the
    /// secret store), password.
    pub fn credentials(&self, name: &str, store: Option<&SecretStore>) -> Result<Credentials> {
        if let Some(token) = non_blank(&self.oauth_token) {
            return Ok(Credentials::oauth(token));
        }

        let email = non_blank(&self.email)
            .ok_or_else(|| anyhow!("Profile '{name}' is missing an email."))?;

        let token = match non_blank(&self.api_token) {
            Some(token) => Some(token.to_string()),
            None => match store {
                Some(store) => store
                    .get_secret(&token_key(name))
                    .with_context(|| format!("Unable to read token for profile '{name}'"))?,
                None => None,
            },
        };

        if let Some(token) = token {
            return Ok(Credentials::api_token(email, token));
        }

        if let Some(password) = non_blank(&self.password) {
            return Ok(Credentials::password(email, password));
        }

        Err(anyhow!("No credentials found for profile '{name}'."))
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Base URL and credentials resolved from a profile.
#[derive(Debug, Clone)]
pub struct Connection {
    pub base_url: String,
    pub credentials: Credentials,
}
