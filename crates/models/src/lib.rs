pub mod credentials;
pub mod email_template;
pub mod extra_field;
pub mod factor;
pub mod invitation;
pub mod organisation;
pub mod role;
pub mod settings;
pub mod user;

// Re-export commonly used types
pub use credentials::UserCredentials;
pub use email_template::{EmailTemplate, NewEmailTemplate, RenderedEmail, UpdateEmailTemplate};
pub use extra_field::{ExtraField, NewExtraField};
pub use factor::Factor;
pub use invitation::{
    InvitationStatus, InvitationWithOrganisation, InvitationWithUser, OrganisationInvitation,
};
pub use organisation::{
    CreateOrganisation, OrgUserLink, Organisation, OrganisationMember, UpdateOrganisation,
};
pub use role::{NewRole, Role, UpdateRole, UserRoleMapping, ADMIN_ROLE, ORG_USER_MANAGER_ROLE};
pub use settings::{PasswordPolicy, SsoInfo, SsoSettings};
pub use user::{NewUser, UpdateProfile, UpdateUser, User, UserProfile, UserWithRoles};
