use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::endpoint::users as endpoints;
use crate::error::Result;
use crate::field::Field;
use crate::pagination::Paginator;
use crate::query::ListOptions;
use crate::ApiClient;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub id: Field<u64>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub url: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub name: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub email: Field<String>,
    /// end-user, agent or admin.
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub role: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub verified: Field<bool>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub active: Field<bool>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub suspended: Field<bool>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub external_id: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub alias: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub phone: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub locale: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub time_zone: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub organization_id: Field<u64>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub tags: Field<Vec<String>>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub signature: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub details: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub notes: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub user_fields: Field<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub created_at: Field<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub updated_at: Field<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub last_login_at: Field<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListUsersOptions {
    #[serde(flatten)]
    pub list: ListOptions,
    /// Filter by role; several roles are comma-joined.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Vec<String>>,
}

impl ApiClient {
    pub async fn show_user(&self, id: u64) -> Result<User> {
        self.fetch(&endpoints::SHOW, &endpoints::SHOW.path_for(id))
            .await
    }

    pub async fn create_user(&self, user: &User) -> Result<User> {
        self.send_payload(&endpoints::CREATE, endpoints::CREATE.path, user)
            .await
    }

    pub async fn update_user(&self, id: u64, user: &User) -> Result<User> {
        self.send_payload(&endpoints::UPDATE, &endpoints::UPDATE.path_for(id), user)
            .await
    }

    pub fn list_users(&self, options: &ListUsersOptions) -> Result<Paginator<'_, User>> {
        self.list(&endpoints::LIST, endpoints::LIST.path, options)
    }

    pub fn list_organization_users(
        &self,
        organization_id: u64,
        options: &ListUsersOptions,
    ) -> Result<Paginator<'_, User>> {
        let endpoint = &endpoints::LIST_ORGANIZATION;
        self.list(endpoint, &endpoint.path_for(organization_id), options)
    }
}
