pub mod credentials;
pub mod email_templates;
pub mod extra_fields;
pub mod invitations;
pub mod org_user_links;
pub mod organisations;
pub mod role_mappings;
pub mod roles;
pub mod users;
