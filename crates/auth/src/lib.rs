use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::collections::HashMap;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CredentialError {
    #[error("credential field `{0}` is empty")]
    Empty(&'static str),
}

/// Credentials attached to every API request.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Email plus API token, sent as `{email}/token:{token}` basic auth.
    ApiToken { email: String, token: String },
    Password { email: String, password: String },
    OAuth { token: String },
}

impl Credentials {
    pub fn api_token(email: impl Into<String>, token: impl Into<String>) -> Self {
        Credentials::ApiToken {
            email: email.into(),
            token: token.into(),
        }
    }

    pub fn password(email: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials::Password {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn oauth(token: impl Into<String>) -> Self {
        Credentials::OAuth {
            token: token.into(),
        }
    }

    pub fn validate(&self) -> std::result::Result<(), CredentialError> {
        let non_empty = |value: &str, name: &'static str| {
            if value.trim().is_empty() {
                Err(CredentialError::Empty(name))
            } else {
                Ok(())
            }
        };

        match self {
            Credentials::ApiToken { email, token } => {
                non_empty(email, "email")?;
                non_empty(token, "token")
            }
            Credentials::Password { email, password } => {
                non_empty(email, "email")?;
                non_empty(password, "password")
            }
            Credentials::OAuth { token } => non_empty(token, "token"),
        }
    }

    /// Value for the `Authorization` header.
    pub fn authorization_header(&self) -> String {
        match self {
            Credentials::ApiToken { email, token } => {
                basic(&format!("{email}/token"), token)
            }
            Credentials::Password { email, password } => basic(email, password),
            Credentials::OAuth { token } => format!("Bearer {token}"),
        }
    }
}

fn basic(user: &str, secret: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{user}:{secret}")))
}

// Secrets must never end up in logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::ApiToken { email, .. } => f
                .debug_struct("ApiToken")
                .field("email", email)
                .field("token", &"***")
                .finish(),
            Credentials::Password { email, .. } => f
                .debug_struct("Password")
                .field("email", email)
                .field("password", &"***")
                .finish(),
            Credentials::OAuth { .. } => {
                f.debug_struct("OAuth").field("token", &"***").finish()
            }
        }
    }
}

/// Helper to construct a key for profile secrets.
pub fn token_key(profile: &str) -> String {
    format!("{profile}:api_token")
}

/// JSON secrets file, one entry per account key. Written with 600 permissions.
#[derive(Debug, Clone)]
pub struct SecretStore {
    path: PathBuf,
}

impl SecretStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.zendesk/credentials`, if a home directory can be determined.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".zendesk").join("credentials"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn set_secret(&self, account: &str, secret: &str) -> Result<()> {
        let mut creds = self.read_all()?;
        creds.insert(account.to_string(), secret.to_string());
        self.write_all(&creds)
    }

    pub fn get_secret(&self, account: &str) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let creds = self.read_all()?;
        Ok(creds.get(account).cloned())
    }

    pub fn delete_secret(&self, account: &str) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        let mut creds = self.read_all()?;
        creds.remove(account);
        self.write_all(&creds)
    }

    fn read_all(&self) -> Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Unable to read secrets file {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Malformed secrets file {}", self.path.display()))
    }

    fn write_all(&self, creds: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let file = options
            .open(&self.path)
            .with_context(|| format!("Unable to write secrets file {}", self.path.display()))?;
        serde_json::to_writer_pretty(file, creds)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_api_token_header() {
        let creds = Credentials::api_token("agent@example.com", "abc123");
        let expected = format!(
            "Basic {}",
            STANDARD.encode("agent@example.com/token:abc123")
        );
        assert_eq!(creds.authorization_header(), expected);
    }

    #[test]
    fn test_password_and_oauth_headers() {
        let creds = Credentials::password("agent@example.com", "hunter2");
        assert_eq!(
            creds.authorization_header(),
            format!("Basic {}", STANDARD.encode("agent@example.com:hunter2"))
        );

        assert_eq!(
            Credentials::oauth("tok").authorization_header(),
            "Bearer tok"
        );
    }

    #[test]
    fn test_validate_rejects_empty_fields() {
        assert_eq!(
            Credentials::api_token("", "abc").validate(),
            Err(CredentialError::Empty("email"))
        );
        assert_eq!(
            Credentials::api_token("a@b.c", "  ").validate(),
            Err(CredentialError::Empty("token"))
        );
        assert!(Credentials::oauth("tok").validate().is_ok());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let rendered = format!("{:?}", Credentials::api_token("a@b.c", "super-secret"));
        assert!(rendered.contains("a@b.c"));
        assert!(!rendered.contains("super-secret"));
    }

    #[test]
    fn test_secret_store_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = SecretStore::new(dir.path().join("nested").join("credentials"));

        assert_eq!(store.get_secret("work").unwrap(), None);

        store.set_secret("work", "token-1").unwrap();
        store.set_secret("home", "token-2").unwrap();
        assert_eq!(store.get_secret("work").unwrap(), Some("token-1".to_string()));

        store.delete_secret("work").unwrap();
        assert_eq!(store.get_secret("work").unwrap(), None);
        assert_eq!(store.get_secret("home").unwrap(), Some("token-2".to_string()));
    }

    #[test]
    fn test_malformed_secrets_file_is_left_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials");
        fs::write(&path, r#"{"work": "keep-me","#).unwrap();
        let store = SecretStore::new(&path);

        assert!(store.get_secret("work").is_err());
        let err = store.set_secret("home", "token").unwrap_err();
        assert!(err.to_string().contains("Malformed secrets file"));
        assert!(store.delete_secret("work").is_err());

        assert_eq!(fs::read_to_string(&path).unwrap(), r#"{"work": "keep-me","#);
    }

    #[cfg(unix)]
    #[test]
    fn test_secret_store_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = SecretStore::new(dir.path().join("credentials"));
        store.set_secret("work", "token").unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_token_key() {
        assert_eq!(token_key("work"), "work:api_token");
    }
}
