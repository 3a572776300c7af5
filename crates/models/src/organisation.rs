use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Organisation {
    pub id: Uuid,
    pub name: String,
    /// Free-form category; roles may be scoped to every organisation of a type
    pub org_type: Option<String>,
    pub thumbnail_url: Option<String>,
    pub banner_url: Option<String>,
    pub extra_fields: serde_json::Value,
    pub manager_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateOrganisation {
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[serde(alias = "type")]
    pub org_type: Option<String>,

    #[serde(alias = "thumbnailUrl")]
    pub thumbnail_url: Option<String>,

    #[serde(alias = "bannerUrl")]
    pub banner_url: Option<String>,

    #[serde(default, alias = "extraFields")]
    pub extra_fields: Option<serde_json::Value>,

    /// Email of the account that will manage the organisation
    #[serde(alias = "managerId")]
    #[validate(email)]
    pub manager_email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateOrganisation {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,

    #[serde(alias = "type")]
    pub org_type: Option<String>,

    #[serde(alias = "thumbnailUrl")]
    pub thumbnail_url: Option<String>,

    #[serde(alias = "bannerUrl")]
    pub banner_url: Option<String>,

    #[serde(alias = "extraFields")]
    pub extra_fields: Option<serde_json::Value>,

    #[serde(alias = "managerId")]
    pub manager_id: Option<Uuid>,
}

/// Membership of one user in one organisation
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrgUserLink {
    pub id: i64,
    pub user_id: Uuid,
    pub organisation_id: Uuid,
}

/// Organisation member with the roles carried by its link
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrganisationMember {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub thumbnail: Option<String>,
    pub link_id: i64,
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddMemberQuery {
    #[serde(alias = "userid")]
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetMemberRoles {
    pub roles: Vec<String>,
}
