use serde_json::Value;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid client configuration: {0}")]
    Configuration(String),

    #[error("Unable to encode request: {0}")]
    Encoding(String),

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Request rejected with status {status}: {detail}")]
    Client {
        status: u16,
        detail: ErrorDetail,
        retry_after: Option<u64>,
    },

    #[error("Server error: {status} - {message}")]
    Server { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Protocol(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Client { status, .. } | ApiError::Server { status, .. } => Some(*status),
            ApiError::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Client { status: 404, .. })
    }

    /// Whether repeating the same request could succeed. The client itself
    /// never retries; see [`crate::retry`].
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Client { status: 429, .. } => true,
            ApiError::Server { .. } => true,
            ApiError::Transport(err) => err.is_timeout() || err.is_connect(),
            _ => false,
        }
    }

    pub fn suggestion(&self) -> Option<&str> {
        match self {
            ApiError::Configuration(_) => Some("Check the base URL and credentials"),
            ApiError::Client { status: 401, .. } => {
                Some("Verify the email and API token for this account")
            }
            ApiError::Client { status: 403, .. } => {
                Some("The account lacks permission for this resource")
            }
            ApiError::Client { status: 404, .. } => Some("Check if the resource ID is correct"),
            ApiError::Client { status: 429, .. } => {
                Some("Consider reducing request frequency or use bulk endpoints")
            }
            ApiError::Client { .. } => Some("Review the request parameters"),
            ApiError::Transport(_) => Some("Check your network connection or try again later"),
            _ => None,
        }
    }
}

/// Error body returned with 4xx responses.
///
/// The API uses both `{"error": "RecordNotFound", "description": ".."}` and
/// `{"error": {"title": "..", "message": ".."}}`; both land here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorDetail {
    pub error: Option<String>,
    pub description: Option<String>,
    pub details: Option<Value>,
    /// Raw body when it was not JSON, or why it could not be read.
    pub raw: Option<String>,
}

impl ErrorDetail {
    /// Detail for a response whose body failed to arrive.
    pub fn unreadable(err: &reqwest::Error) -> Self {
        Self {
            raw: Some(unreadable_body(err)),
            ..Default::default()
        }
    }

    pub fn from_body(body: &str) -> Self {
        let value: Value = match serde_json::from_str(body) {
            Ok(value @ Value::Object(_)) => value,
            _ => {
                let trimmed = body.trim();
                return Self {
                    raw: (!trimmed.is_empty()).then(|| trimmed.to_string()),
                    ..Default::default()
                };
            }
        };

        let (error, nested_message) = match value.get("error") {
            Some(Value::String(s)) => (Some(s.clone()), None),
            Some(Value::Object(obj)) => (
                obj.get("title").and_then(Value::as_str).map(str::to_string),
                obj.get("message").and_then(Value::as_str).map(str::to_string),
            ),
            _ => (None, None),
        };

        Self {
            error,
            description: value
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string)
                .or(nested_message),
            details: value.get("details").filter(|d| !d.is_null()).cloned(),
            raw: None,
        }
    }
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.error, &self.description, &self.raw) {
            (Some(error), Some(description), _) => write!(f, "{error}: {description}"),
            (Some(error), None, _) => f.write_str(error),
            (None, Some(description), _) => f.write_str(description),
            (None, None, Some(raw)) => f.write_str(raw),
            (None, None, None) => f.write_str("no error detail"),
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

pub(crate) fn unreadable_body(err: &reqwest::Error) -> String {
    format!("response body could not be read: {err}")
}
