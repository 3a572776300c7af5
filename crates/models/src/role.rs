use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

pub const ADMIN_ROLE: &str = "ADMIN";
pub const ORG_USER_MANAGER_ROLE: &str = "ORG_USER_MANAGER";

/// A named role. Global when both `org_type` and `org_id` are NULL,
/// otherwise usable inside the matching organisations.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub org_type: Option<String>,
    pub org_id: Option<Uuid>,
}

impl Role {
    pub fn is_global(&self) -> bool {
        self.org_type.is_none() && self.org_id.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewRole {
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    pub description: Option<String>,

    #[serde(alias = "orgType")]
    pub org_type: Option<String>,

    #[serde(alias = "orgId")]
    pub org_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateRole {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,

    pub description: Option<String>,

    #[serde(alias = "orgType")]
    pub org_type: Option<String>,

    #[serde(alias = "orgId")]
    pub org_id: Option<Uuid>,
}

/// Assignment of a role name either to a user (global) or to an org-user link
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRoleMapping {
    pub id: i64,
    pub user_id: Option<Uuid>,
    pub org_user_link_id: Option<i64>,
    pub role: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_scope() {
        let mut role = Role {
            id: 1,
            name: ADMIN_ROLE.to_string(),
            description: None,
            org_type: None,
            org_id: None,
        };
        assert!(role.is_global());

        role.org_type = Some("school".to_string());
        assert!(!role.is_global());
    }
}
