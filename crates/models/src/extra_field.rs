use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Per-tenant profile field definition. Values live in `users.extra_fields`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExtraField {
    pub id: i64,
    pub field_type: String,
    pub name: String,
    pub default_value: serde_json::Value,
    pub editable: bool,
    pub required: bool,
    pub validators: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewExtraField {
    #[serde(alias = "type")]
    #[validate(length(min = 1, max = 64))]
    pub field_type: String,

    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[serde(default, alias = "defaultValue")]
    pub default_value: serde_json::Value,

    #[serde(default = "default_true")]
    pub editable: bool,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub validators: serde_json::Value,
}

fn default_true() -> bool {
    true
}
