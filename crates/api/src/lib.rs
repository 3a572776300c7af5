// SSO API
// Router, shared state and handlers for the identity REST server

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod routes;

use config::Config;
use sso_auth::{
    AuthFactorSender, EmailTemplateService, ExtraFieldService, InvitationService,
    OrganisationService, RoleService, TokenService, UserService,
};
use sso_database::Database;
use std::sync::Arc;

pub struct AppState {
    pub users: UserService,
    pub invitations: InvitationService,
    pub organisations: OrganisationService,
    pub roles: RoleService,
    pub templates: EmailTemplateService,
    pub extra_fields: ExtraFieldService,
    pub tokens: TokenService,
}

impl AppState {
    /// Wire every service on top of one database handle
    pub fn new(database: &Database, config: Config) -> Self {
        let templates = EmailTemplateService::new(database, config.email);
        tracing::info!("📧 Email template service initialized");

        let roles = RoleService::new(database);
        let factors = AuthFactorSender::new(database, templates.clone(), config.sms);
        let users = UserService::new(
            database,
            roles.clone(),
            templates.clone(),
            factors,
            config.settings,
        );
        tracing::info!("👤 User service initialized");

        let invitations = InvitationService::new(database, users.clone());
        tracing::info!("📬 Invitation service initialized");

        let organisations = OrganisationService::new(database, invitations.clone(), roles.clone());
        tracing::info!("🏢 Organisation service initialized");

        let tokens = TokenService::new(database, config.jwt);
        tracing::info!("🔐 Token service initialized");

        Self {
            users,
            invitations,
            organisations,
            roles,
            templates,
            extra_fields: ExtraFieldService::new(database),
            tokens,
        }
    }
}

/// Router with shared state, without the outer CORS and trace layers
pub fn app(database: &Database, config: Config) -> axum::Router {
    routes::create_router(Arc::new(AppState::new(database, config)))
}
