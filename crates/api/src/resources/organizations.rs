use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::endpoint::organizations as endpoints;
use crate::error::Result;
use crate::field::Field;
use crate::pagination::Paginator;
use crate::query::ListOptions;
use crate::ApiClient;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub id: Field<u64>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub url: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub external_id: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub name: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub domain_names: Field<Vec<String>>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub details: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub notes: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub group_id: Field<u64>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub shared_tickets: Field<bool>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub shared_comments: Field<bool>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub tags: Field<Vec<String>>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub organization_fields: Field<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub created_at: Field<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub updated_at: Field<DateTime<Utc>>,
}

pub type ListOrganizationsOptions = ListOptions;

impl ApiClient {
    pub async fn show_organization(&self, id: u64) -> Result<Organization> {
        self.fetch(&endpoints::SHOW, &endpoints::SHOW.path_for(id))
            .await
    }

    pub async fn create_organization(&self, organization: &Organization) -> Result<Organization> {
        self.send_payload(&endpoints::CREATE, endpoints::CREATE.path, organization)
            .await
    }

    pub async fn update_organization(
        &self,
        id: u64,
        organization: &Organization,
    ) -> Result<Organization> {
        self.send_payload(
            &endpoints::UPDATE,
            &endpoints::UPDATE.path_for(id),
            organization,
        )
        .await
    }

    pub fn list_organizations(
        &self,
        options: &ListOrganizationsOptions,
    ) -> Result<Paginator<'_, Organization>> {
        self.list(&endpoints::LIST, endpoints::LIST.path, options)
    }
}
