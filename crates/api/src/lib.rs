//! Typed client for the Zendesk Support REST API.
//!
//! [`ApiClient::request`] is the single transport entry point: it builds the
//! URL, attaches credentials, sends an [`Envelope`] body and classifies the
//! response status into an [`ApiError`]. [`ApiClient::paginate`] wraps it in a
//! lazy [`Paginator`]. The typed resource calls (`show_ticket`,
//! `update_many_tickets`, `list_users`, ...) live in [`resources`] and are
//! driven by the table in [`endpoint`].
//!
//! ```no_run
//! use futures::TryStreamExt;
//! use zendesk_api::{ApiClient, Credentials, ListTicketsOptions, SortOrder, Ticket};
//!
//! # async fn run() -> zendesk_api::Result<()> {
//! let client = ApiClient::new(
//!     "https://acme.zendesk.com",
//!     Credentials::api_token("agent@acme.com", "api-token"),
//! )?;
//!
//! let update = Ticket {
//!     status: "solved".into(),
//!     ..Default::default()
//! };
//! client.update_ticket(42, &update).await?;
//!
//! let options = ListTicketsOptions {
//!     sort_by: Some("created_at".into()),
//!     sort_order: Some(SortOrder::Desc),
//!     ..Default::default()
//! };
//! let tickets: Vec<Ticket> = client
//!     .list_user_tickets_requested(7, &options)?
//!     .items()
//!     .try_collect()
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod endpoint;
pub mod envelope;
pub mod error;
pub mod field;
pub mod pagination;
pub mod query;
pub mod resources;
pub mod retry;

pub use envelope::Envelope;
pub use error::{ApiError, ErrorDetail, Result};
pub use field::Field;
pub use pagination::{Page, PageRequest, PageSource, PageTarget, Paginator};
pub use query::{ListOptions, SortOrder};
pub use resources::*;
pub use reqwest::Method;
pub use zendesk_auth::Credentials;

use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{redirect, Client, Response, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

#[derive(Clone, Debug)]
pub struct ClientOptions {
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            user_agent: format!("zendesk-rs/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Immutable once built; clones share the underlying connection pool.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    authorization: HeaderValue,
}

impl ApiClient {
    pub fn new(base_url: impl AsRef<str>, credentials: Credentials) -> Result<Self> {
        Self::with_options(base_url, credentials, ClientOptions::default())
    }

    pub fn with_options(
        base_url: impl AsRef<str>,
        credentials: Credentials,
        options: ClientOptions,
    ) -> Result<Self> {
        let base_url = parse_base_url(base_url.as_ref())?;

        credentials
            .validate()
            .map_err(|e| ApiError::Configuration(e.to_string()))?;
        let mut authorization = HeaderValue::from_str(&credentials.authorization_header())
            .map_err(|_| {
                ApiError::Configuration("credentials contain invalid header characters".into())
            })?;
        authorization.set_sensitive(true);

        let mut builder = Client::builder()
            .user_agent(options.user_agent)
            .redirect(redirect::Policy::none());
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::Configuration(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            authorization,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Send one request and return the decoded response envelope.
    ///
    /// `query` is an already encoded query string (see [`query::encode`]).
    /// `body` is ignored for `GET`, `HEAD` and `OPTIONS`.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: Option<&str>,
        body: Option<&Envelope>,
    ) -> Result<Envelope> {
        let mut url = self.join_path(path)?;

        if let Some(query) = query.filter(|q| !q.is_empty()) {
            let merged = match url.query() {
                Some(existing) if !existing.is_empty() => format!("{existing}&{query}"),
                _ => query.to_string(),
            };
            url.set_query(Some(&merged));
        }

        let body = match body {
            Some(envelope) if !is_read_only(&method) => Some(envelope.to_vec()?),
            Some(_) => {
                debug!(method = %method, "Dropping body of read-only request");
                None
            }
            None => None,
        };

        self.send(method, url, body).await
    }

    /// Lazily walk a list endpoint. Encoding errors in `options` surface here,
    /// before any request is made.
    pub fn paginate<T, Q: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        key: &'static str,
        options: &Q,
    ) -> Result<Paginator<'_, T>> {
        let query = query::encode(options)?;
        Ok(Paginator::new(
            self,
            PageRequest {
                method,
                key,
                target: PageTarget::Start {
                    path: path.to_string(),
                    query,
                },
            },
        ))
    }

    async fn send(&self, method: Method, url: Url, body: Option<Vec<u8>>) -> Result<Envelope> {
        debug!(method = %method, url = %url, "Sending request");

        let mut req = self
            .client
            .request(method, url.clone())
            .header(AUTHORIZATION, self.authorization.clone())
            .header(ACCEPT, "application/json");
        if let Some(body) = body {
            req = req.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = req.send().await?;
        debug!(status = response.status().as_u16(), url = %url, "Received response");

        classify(response, &url).await
    }

    /// Join a caller path onto the base URL. Absolute and scheme-relative
    /// paths are refused so the Authorization header stays on this origin.
    fn join_path(&self, path: &str) -> Result<Url> {
        if path.starts_with("//") || Url::parse(path).is_ok() {
            return Err(ApiError::Encoding(format!(
                "path `{path}` must be relative to {}",
                self.base_url
            )));
        }

        let url = self
            .base_url
            .join(path.strip_prefix('/').unwrap_or(path))
            .map_err(|e| ApiError::Encoding(format!("path `{path}`: {e}")))?;
        if url.origin() != self.base_url.origin() {
            return Err(ApiError::Encoding(format!(
                "path `{path}` points outside {}",
                self.base_url
            )));
        }
        Ok(url)
    }

    /// Resolve a `next_page` cursor against the base URL. Cursors pointing at
    /// another origin are refused so credentials stay on this host.
    fn resolve_cursor(&self, cursor: &str) -> Result<Url> {
        let url = match Url::parse(cursor) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => self
                .base_url
                .join(cursor.trim_start_matches('/'))
                .map_err(|e| ApiError::Protocol(format!("invalid next_page `{cursor}`: {e}")))?,
            Err(e) => {
                return Err(ApiError::Protocol(format!(
                    "invalid next_page `{cursor}`: {e}"
                )))
            }
        };

        if url.origin() != self.base_url.origin() {
            return Err(ApiError::Protocol(format!(
                "next_page `{cursor}` points outside {}",
                self.base_url
            )));
        }
        Ok(url)
    }
}

#[async_trait::async_trait]
impl<T> PageSource<T> for ApiClient
where
    T: serde::de::DeserializeOwned + Send,
{
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page<T>> {
        let envelope = match &request.target {
            PageTarget::Start { path, query } => {
                self.request(request.method.clone(), path, Some(query), None)
                    .await?
            }
            PageTarget::Cursor(cursor) => {
                let url = self.resolve_cursor(cursor)?;
                self.send(request.method.clone(), url, None).await?
            }
        };
        Page::from_envelope(&envelope, request.key)
    }
}

async fn classify(response: Response, url: &Url) -> Result<Envelope> {
    let status = response.status();

    if status.is_success() {
        let body = response.bytes().await?;
        return Envelope::from_slice(&body);
    }

    if status.is_client_error() {
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse().ok());
        let detail = match response.text().await {
            Ok(body) => ErrorDetail::from_body(&body),
            Err(e) => ErrorDetail::unreadable(&e),
        };
        return Err(ApiError::Client {
            status: status.as_u16(),
            detail,
            retry_after,
        });
    }

    if status.is_server_error() {
        let message = match response.text().await {
            Ok(body) if !body.trim().is_empty() => body,
            Ok(_) => reason(status),
            Err(e) => format!("{} ({})", reason(status), error::unreadable_body(&e)),
        };
        return Err(ApiError::Server {
            status: status.as_u16(),
            message,
        });
    }

    Err(ApiError::Protocol(format!(
        "unexpected status {} for {}",
        status.as_u16(),
        url.path()
    )))
}

fn reason(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("Server error")
        .to_string()
}

fn is_read_only(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

fn parse_base_url(raw: &str) -> Result<Url> {
    if raw.trim().is_empty() {
        return Err(ApiError::Configuration("base URL is empty".into()));
    }

    let mut url = Url::parse(raw.trim())
        .map_err(|e| ApiError::Configuration(format!("invalid base URL `{raw}`: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(ApiError::Configuration(format!(
            "base URL `{raw}` must be an http(s) URL"
        )));
    }

    // Relative joins replace the last segment unless the path ends in '/'.
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, Credentials::api_token("agent@acme.com", "token")).unwrap()
    }

    #[test]
    fn test_missing_credentials_fail_at_construction() {
        let err = ApiClient::new(
            "https://acme.zendesk.com",
            Credentials::api_token("agent@acme.com", ""),
        )
        .err()
        .unwrap();
        assert!(matches!(err, ApiError::Configuration(msg) if msg.contains("token")));
    }

    #[test]
    fn test_invalid_base_url() {
        let creds = Credentials::oauth("token");
        for base in ["", "not a url", "mailto:agent@acme.com", "ftp://acme.zendesk.com"] {
            let result = ApiClient::new(base, creds.clone());
            assert!(
                matches!(result, Err(ApiError::Configuration(_))),
                "{base} should be rejected"
            );
        }
    }

    #[test]
    fn test_base_url_is_normalized() {
        assert_eq!(
            client("https://acme.zendesk.com").base_url().as_str(),
            "https://acme.zendesk.com/"
        );
        assert_eq!(
            client("http://localhost:8080/proxy?x=1").base_url().as_str(),
            "http://localhost:8080/proxy/"
        );
    }

    #[test]
    fn test_resolve_cursor() {
        let client = client("https://acme.zendesk.com");

        let absolute = client
            .resolve_cursor("https://acme.zendesk.com/api/v2/tickets.json?page=2")
            .unwrap();
        assert_eq!(absolute.query(), Some("page=2"));

        let relative = client
            .resolve_cursor("/api/v2/tickets.json?page=3")
            .unwrap();
        assert_eq!(
            relative.as_str(),
            "https://acme.zendesk.com/api/v2/tickets.json?page=3"
        );

        assert!(matches!(
            client.resolve_cursor("https://evil.example.com/api/v2/tickets.json"),
            Err(ApiError::Protocol(_))
        ));
    }

    #[test]
    fn test_join_path_stays_on_base() {
        let client = client("https://acme.zendesk.com/proxy");

        assert_eq!(
            client.join_path("/api/v2/tickets.json").unwrap().as_str(),
            "https://acme.zendesk.com/proxy/api/v2/tickets.json"
        );
        for path in [
            "https://evil.example.com/api/v2/tickets.json",
            "//evil.example.com/api/v2/tickets.json",
            "mailto:agent@acme.com",
        ] {
            assert!(
                matches!(client.join_path(path), Err(ApiError::Encoding(_))),
                "{path} should be refused"
            );
        }
    }

    #[test]
    fn test_read_only_methods() {
        assert!(is_read_only(&Method::GET));
        assert!(!is_read_only(&Method::PUT));
        assert!(!is_read_only(&Method::DELETE));
    }
}
