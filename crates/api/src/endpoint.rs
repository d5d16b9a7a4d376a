//! Endpoint table. Each entry fixes the method, path template and envelope key
//! of one API call; the resource modules only pick an entry and forward.

use reqwest::Method;

#[derive(Debug, Clone)]
pub struct Endpoint {
    pub method: Method,
    /// Path relative to the base URL, `{id}` is substituted by [`Endpoint::path_for`].
    pub path: &'static str,
    /// Envelope key of the response payload (and of the request body, if any).
    pub key: &'static str,
}

impl Endpoint {
    pub const fn new(method: Method, path: &'static str, key: &'static str) -> Self {
        Self { method, path, key }
    }

    pub fn path_for(&self, id: u64) -> String {
        self.path.replace("{id}", &id.to_string())
    }
}

pub mod tickets {
    use super::Endpoint;
    use reqwest::Method;

    pub const SHOW: Endpoint = Endpoint::new(Method::GET, "/api/v2/tickets/{id}.json", "ticket");
    pub const CREATE: Endpoint = Endpoint::new(Method::POST, "/api/v2/tickets.json", "ticket");
    pub const UPDATE: Endpoint = Endpoint::new(Method::PUT, "/api/v2/tickets/{id}.json", "ticket");
    pub const UPDATE_MANY: Endpoint =
        Endpoint::new(Method::PUT, "/api/v2/tickets/update_many.json", "tickets");
    pub const LIST_REQUESTED: Endpoint = Endpoint::new(
        Method::GET,
        "/api/v2/users/{id}/tickets/requested.json",
        "tickets",
    );
    pub const LIST_CCD: Endpoint =
        Endpoint::new(Method::GET, "/api/v2/users/{id}/tickets/ccd.json", "tickets");
    pub const LIST_ORGANIZATION: Endpoint = Endpoint::new(
        Method::GET,
        "/api/v2/organizations/{id}/tickets.json",
        "tickets",
    );
    pub const LIST_INCIDENTS: Endpoint =
        Endpoint::new(Method::GET, "/api/v2/tickets/{id}/incidents.json", "tickets");
}

pub mod comments {
    use super::Endpoint;
    use reqwest::Method;

    pub const LIST: Endpoint =
        Endpoint::new(Method::GET, "/api/v2/tickets/{id}/comments.json", "comments");
}

pub mod users {
    use super::Endpoint;
    use reqwest::Method;

    pub const SHOW: Endpoint = Endpoint::new(Method::GET, "/api/v2/users/{id}.json", "user");
    pub const CREATE: Endpoint = Endpoint::new(Method::POST, "/api/v2/users.json", "user");
    pub const UPDATE: Endpoint = Endpoint::new(Method::PUT, "/api/v2/users/{id}.json", "user");
    pub const LIST: Endpoint = Endpoint::new(Method::GET, "/api/v2/users.json", "users");
    pub const LIST_ORGANIZATION: Endpoint =
        Endpoint::new(Method::GET, "/api/v2/organizations/{id}/users.json", "users");
}

pub mod organizations {
    use super::Endpoint;
    use reqwest::Method;

    pub const SHOW: Endpoint = Endpoint::new(
        Method::GET,
        "/api/v2/organizations/{id}.json",
        "organization",
    );
    pub const CREATE: Endpoint =
        Endpoint::new(Method::POST, "/api/v2/organizations.json", "organization");
    pub const UPDATE: Endpoint = Endpoint::new(
        Method::PUT,
        "/api/v2/organizations/{id}.json",
        "organization",
    );
    pub const LIST: Endpoint =
        Endpoint::new(Method::GET, "/api/v2/organizations.json", "organizations");
}
