//! Typed resources and the thin calls around them.
//!
//! Every call picks an entry from [`crate::endpoint`] and goes through one of
//! the three helpers below, so show/create/update/list behave identically
//! across resources.

mod comments;
mod organizations;
mod tickets;
mod users;

pub use comments::{Attachment, ListTicketCommentsOptions, TicketComment};
pub use organizations::{ListOrganizationsOptions, Organization};
pub use tickets::{BatchUpdate, CustomField, JobStatus, ListTicketsOptions, Ticket, Via};
pub use users::{ListUsersOptions, User};

use crate::endpoint::Endpoint;
use crate::envelope::Envelope;
use crate::error::Result;
use crate::pagination::Paginator;
use crate::ApiClient;
use serde::de::DeserializeOwned;
use serde::Serialize;

impl ApiClient {
    /// Call `endpoint` at `path` and decode the payload under its key.
    pub(crate) async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
        path: &str,
    ) -> Result<T> {
        self.request(endpoint.method.clone(), path, None, None)
            .await?
            .single(endpoint.key)
    }

    /// Send `payload` wrapped under the endpoint key and decode the reply
    /// from the same key.
    pub(crate) async fn send_payload<B, T>(
        &self,
        endpoint: &Endpoint,
        path: &str,
        payload: &B,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = Envelope::wrap(endpoint.key, payload)?;
        self.request(endpoint.method.clone(), path, None, Some(&body))
            .await?
            .single(endpoint.key)
    }

    pub(crate) fn list<T, Q: Serialize + ?Sized>(
        &self,
        endpoint: &Endpoint,
        path: &str,
        options: &Q,
    ) -> Result<Paginator<'_, T>> {
        self.paginate(endpoint.method.clone(), path, endpoint.key, options)
    }
}
