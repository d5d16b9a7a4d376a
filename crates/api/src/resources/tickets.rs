use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::TicketComment;
use crate::endpoint::tickets as endpoints;
use crate::envelope::Envelope;
use crate::error::{ApiError, Result};
use crate::field::Field;
use crate::pagination::Paginator;
use crate::query::{ListOptions, SortOrder};
use crate::ApiClient;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub id: Field<u64>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub url: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub external_id: Field<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Field::is_absent")]
    pub kind: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub subject: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub raw_subject: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub description: Field<String>,
    /// Only meaningful on create/update: adds a comment to the ticket.
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub comment: Field<TicketComment>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub priority: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub status: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub recipient: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub requester_id: Field<u64>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub submitter_id: Field<u64>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub assignee_id: Field<u64>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub organization_id: Field<u64>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub group_id: Field<u64>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub collaborator_ids: Field<Vec<u64>>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub forum_topic_id: Field<u64>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub problem_id: Field<u64>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub has_incidents: Field<bool>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub due_at: Field<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub tags: Field<Vec<String>>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub via: Field<Via>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub created_at: Field<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub updated_at: Field<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub custom_fields: Field<Vec<CustomField>>,
}

/// A custom field value; `value: null` clears the field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomField {
    pub id: u64,
    #[serde(default)]
    pub value: Value,
}

/// How a ticket was created.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Via {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub channel: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub source: Field<Value>,
}

/// Background job the API may return instead of the updated tickets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub id: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub url: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub status: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub total: Field<u64>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub progress: Field<u64>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub message: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub results: Field<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BatchUpdate {
    Tickets(Vec<Ticket>),
    Job(JobStatus),
}

/// Optional parameters of the ticket list calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListTicketsOptions {
    #[serde(flatten)]
    pub list: ListOptions,
    /// Sideloads, e.g. `comment_count`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<String>>,
    /// One of assignee, assignee.name, created_at, group, id, locale,
    /// requester, requester.name, status, subject, updated_at.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
}

impl ApiClient {
    pub async fn show_ticket(&self, id: u64) -> Result<Ticket> {
        self.fetch(&endpoints::SHOW, &endpoints::SHOW.path_for(id))
            .await
    }

    pub async fn create_ticket(&self, ticket: &Ticket) -> Result<Ticket> {
        self.send_payload(&endpoints::CREATE, endpoints::CREATE.path, ticket)
            .await
    }

    /// Only the fields present on `ticket` are sent.
    pub async fn update_ticket(&self, id: u64, ticket: &Ticket) -> Result<Ticket> {
        self.send_payload(&endpoints::UPDATE, &endpoints::UPDATE.path_for(id), ticket)
            .await
    }

    /// Update several tickets in one call. Every ticket must carry its `id`;
    /// like [`ApiClient::update_ticket`], only present fields are sent.
    pub async fn update_many_tickets(&self, tickets: &[Ticket]) -> Result<BatchUpdate> {
        if let Some(index) = tickets.iter().position(|t| t.id.value().is_none()) {
            return Err(ApiError::Encoding(format!(
                "ticket at index {index} has no id"
            )));
        }

        let endpoint = &endpoints::UPDATE_MANY;
        let body = Envelope::wrap(endpoint.key, tickets)?;
        let reply = self
            .request(endpoint.method.clone(), endpoint.path, None, Some(&body))
            .await?;

        if reply.contains(endpoint.key) {
            return reply.collection(endpoint.key).map(BatchUpdate::Tickets);
        }
        match reply.take::<JobStatus>("job_status")? {
            Some(job) => Ok(BatchUpdate::Job(job)),
            None => Err(ApiError::Protocol(
                "update_many response has neither `tickets` nor `job_status`".into(),
            )),
        }
    }

    pub fn list_user_tickets_requested(
        &self,
        user_id: u64,
        options: &ListTicketsOptions,
    ) -> Result<Paginator<'_, Ticket>> {
        let endpoint = &endpoints::LIST_REQUESTED;
        self.list(endpoint, &endpoint.path_for(user_id), options)
    }

    pub fn list_user_tickets_ccd(
        &self,
        user_id: u64,
        options: &ListTicketsOptions,
    ) -> Result<Paginator<'_, Ticket>> {
        let endpoint = &endpoints::LIST_CCD;
        self.list(endpoint, &endpoint.path_for(user_id), options)
    }

    pub fn list_organization_tickets(
        &self,
        organization_id: u64,
        options: &ListTicketsOptions,
    ) -> Result<Paginator<'_, Ticket>> {
        let endpoint = &endpoints::LIST_ORGANIZATION;
        self.list(endpoint, &endpoint.path_for(organization_id), options)
    }

    /// Incidents linked to the problem ticket `problem_id`.
    pub fn list_ticket_incidents(&self, problem_id: u64) -> Result<Paginator<'_, Ticket>> {
        let endpoint = &endpoints::LIST_INCIDENTS;
        self.list(endpoint, &endpoint.path_for(problem_id), &ListOptions::default())
    }
}
