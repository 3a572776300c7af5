pub mod connection;
pub mod error;
pub mod repositories;

pub use connection::{Database, DatabaseConfig};
pub use error::{DatabaseError, Result};
pub use repositories::{
    credentials::{CredentialsRepository, NewCredentials},
    email_templates::EmailTemplateRepository,
    extra_fields::ExtraFieldRepository,
    invitations::InvitationRepository,
    org_user_links::OrgUserLinkRepository,
    organisations::OrganisationRepository,
    role_mappings::{RoleHolder, RoleMappingRepository},
    roles::RoleRepository,
    users::UserRepository,
};
