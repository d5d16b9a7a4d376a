use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::endpoint::comments as endpoints;
use crate::error::Result;
use crate::field::Field;
use crate::pagination::Paginator;
use crate::query::{ListOptions, SortOrder};
use crate::ApiClient;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TicketComment {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub id: Field<u64>,
    #[serde(default, rename = "type", skip_serializing_if = "Field::is_absent")]
    pub kind: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub body: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub html_body: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub public: Field<bool>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub author_id: Field<u64>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub attachments: Field<Vec<Attachment>>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub created_at: Field<DateTime<Utc>>,
    /// Upload tokens to attach when creating the comment.
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub uploads: Field<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub id: Field<u64>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub file_name: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub content_url: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub content_type: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub size: Field<u64>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub inline: Field<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListTicketCommentsOptions {
    #[serde(flatten)]
    pub list: ListOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
}

impl ApiClient {
    pub fn list_ticket_comments(
        &self,
        ticket_id: u64,
        options: &ListTicketCommentsOptions,
    ) -> Result<Paginator<'_, TicketComment>> {
        let endpoint = &endpoints::LIST;
        self.list(endpoint, &endpoint.path_for(ticket_id), options)
    }
}
