use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::Organisation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Denied,
}

impl InvitationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Denied => "denied",
        }
    }

    pub fn from_response(accept: bool) -> Self {
        if accept {
            InvitationStatus::Accepted
        } else {
            InvitationStatus::Denied
        }
    }
}

impl std::fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Stored as TEXT
impl sqlx::Type<sqlx::Postgres> for InvitationStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for InvitationStatus {
    fn decode(
        value: sqlx::postgres::PgValueRef<'r>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        match s.as_str() {
            "pending" => Ok(InvitationStatus::Pending),
            "accepted" => Ok(InvitationStatus::Accepted),
            "denied" => Ok(InvitationStatus::Denied),
            _ => Err(format!("Invalid invitation status: {}", s).into()),
        }
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Postgres> for InvitationStatus {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode(self.as_str(), buf)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrganisationInvitation {
    pub id: i64,
    pub organisation_id: Uuid,
    pub user_id: Uuid,
    pub response: InvitationStatus,
    pub created_at: DateTime<Utc>,
}

impl OrganisationInvitation {
    pub fn is_pending(&self) -> bool {
        self.response == InvitationStatus::Pending
    }
}

/// Invitation listed for its invitee
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvitationWithOrganisation {
    #[serde(flatten)]
    pub invitation: OrganisationInvitation,
    pub organisation: Organisation,
}

/// Invitation listed for an organisation manager
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InvitationWithUser {
    pub id: i64,
    pub organisation_id: Uuid,
    pub user_id: Uuid,
    pub response: InvitationStatus,
    pub created_at: DateTime<Utc>,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteQuery {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvitationResponseQuery {
    pub response: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteUserRequest {
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_response() {
        assert_eq!(InvitationStatus::from_response(true), InvitationStatus::Accepted);
        assert_eq!(InvitationStatus::from_response(false), InvitationStatus::Denied);
        assert_eq!(InvitationStatus::Pending.to_string(), "pending");
    }

    #[test]
    fn test_status_serde() {
        let status: InvitationStatus = serde_json::from_str(r#""denied""#).unwrap();
        assert_eq!(status, InvitationStatus::Denied);
    }
}
