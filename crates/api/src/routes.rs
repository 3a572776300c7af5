use crate::handlers;
use crate::middleware;
use crate::AppState;
use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post, put},
    Router,
};
use std::sync::Arc;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health::health_check))
        .route("/info/sso", get(handlers::info::sso_info))
        // Account routes - Public endpoints
        .route("/users", post(handlers::users::register))
        .route("/users/login", post(handlers::users::login))
        .route("/users/credentials/reset", patch(handlers::users::request_password_reset))
        .route("/users/credentials/otp", patch(handlers::users::confirm_password_reset))
        .route("/users/credentials/validate", get(handlers::users::validate_activation))
        .route("/devices/login", post(handlers::devices::login))
        // Account routes - Protected (require auth)
        .route(
            "/users/me",
            get(handlers::users::me)
                .patch(handlers::users::update_me)
                .delete(handlers::users::delete_me)
                .route_layer(from_fn_with_state(state.clone(), middleware::require_auth))
        )
        .route(
            "/users/me/credentials",
            patch(handlers::users::update_password)
                .route_layer(from_fn_with_state(state.clone(), middleware::require_auth))
        )
        .route(
            "/users/refresh",
            get(handlers::users::refresh)
                .route_layer(from_fn_with_state(state.clone(), middleware::require_auth))
        )
        .route(
            "/users/factor/sms",
            patch(handlers::users::set_phone_factor)
                .route_layer(from_fn_with_state(state.clone(), middleware::require_auth))
        )
        .route(
            "/users/factor/sms/validate",
            patch(handlers::users::confirm_phone_factor)
                .route_layer(from_fn_with_state(state.clone(), middleware::require_auth))
        )
        .route(
            "/org-user-links/:id/organisation",
            get(handlers::users::link_organisation)
                .route_layer(from_fn_with_state(state.clone(), middleware::require_auth))
        )
        // User administration - Protected (require admin)
        .route(
            "/users",
            get(handlers::users::list_users)
                .route_layer(from_fn_with_state(state.clone(), middleware::require_admin))
        )
        .route(
            "/users/count",
            get(handlers::users::count_users)
                .route_layer(from_fn_with_state(state.clone(), middleware::require_admin))
        )
        .route(
            "/users/:id",
            get(handlers::users::get_user)
                .patch(handlers::users::update_user)
                .delete(handlers::users::delete_user)
                .route_layer(from_fn_with_state(state.clone(), middleware::require_admin))
        )
        .route(
            "/users/:id/org-user-links",
            get(handlers::users::user_links)
                .route_layer(from_fn_with_state(state.clone(), middleware::require_admin))
        )
        // Invitation routes - Public endpoints
        .route("/invitation/users", patch(handlers::invitation::accept_user_invitation))
        // Invitation routes - Protected
        .route(
            "/invitation/users",
            post(handlers::invitation::invite_user)
                .route_layer(from_fn_with_state(state.clone(), middleware::require_admin))
        )
        .route(
            "/invitation/org/me",
            get(handlers::invitation::my_invitations)
                .route_layer(from_fn_with_state(state.clone(), middleware::require_auth))
        )
        .route(
            "/invitation/org/:id",
            patch(handlers::invitation::respond)
                .route_layer(from_fn_with_state(state.clone(), middleware::require_auth))
        )
        .route(
            "/invitation/org/:id",
            post(handlers::invitation::invite_to_organisation)
                .get(handlers::invitation::organisation_invitations)
                .delete(handlers::invitation::delete_invitation)
                .route_layer(from_fn_with_state(state.clone(), middleware::require_org_manager))
        )
        // Organisation routes
        .route(
            "/organisations",
            post(handlers::organisation::create_organisation)
                .route_layer(from_fn_with_state(state.clone(), middleware::require_admin))
        )
        .route(
            "/organisations",
            get(handlers::organisation::list_organisations)
                .route_layer(from_fn_with_state(state.clone(), middleware::require_org_manager))
        )
        .route(
            "/organisations/:id",
            get(handlers::organisation::get_organisation)
                .route_layer(from_fn_with_state(state.clone(), middleware::require_org_manager))
        )
        .route(
            "/organisations/:id",
            patch(handlers::organisation::update_organisation)
                .delete(handlers::organisation::delete_organisation)
                .route_layer(from_fn_with_state(state.clone(), middleware::require_admin))
        )
        .route(
            "/organisations/:id/role",
            get(handlers::organisation::available_roles)
                .route_layer(from_fn_with_state(state.clone(), middleware::require_auth))
        )
        .route(
            "/organisations/:id/user/count",
            get(handlers::organisation::count_members)
                .route_layer(from_fn_with_state(state.clone(), middleware::require_org_manager))
        )
        .route(
            "/organisations/:id/user",
            get(handlers::organisation::list_members)
                .post(handlers::organisation::add_member)
                .route_layer(from_fn_with_state(state.clone(), middleware::require_org_manager))
        )
        .route(
            "/organisations/:id/user/:user_id",
            delete(handlers::organisation::remove_member)
                .route_layer(from_fn_with_state(state.clone(), middleware::require_org_manager))
        )
        .route(
            "/organisations/:id/user/:user_id/roles",
            put(handlers::organisation::set_member_roles)
                .route_layer(from_fn_with_state(state.clone(), middleware::require_org_manager))
        )
        // Role management - Protected (require admin)
        .route(
            "/roles",
            post(handlers::role::create_role)
                .get(handlers::role::list_roles)
                .route_layer(from_fn_with_state(state.clone(), middleware::require_admin))
        )
        .route(
            "/roles/count",
            get(handlers::role::count_roles)
                .route_layer(from_fn_with_state(state.clone(), middleware::require_admin))
        )
        .route(
            "/roles/:id",
            get(handlers::role::get_role)
                .patch(handlers::role::update_role)
                .delete(handlers::role::delete_role)
                .route_layer(from_fn_with_state(state.clone(), middleware::require_admin))
        )
        // Email templates - Protected (admin or organisation manager)
        .route(
            "/email-templates",
            post(handlers::email_template::create_template)
                .get(handlers::email_template::list_templates)
                .route_layer(from_fn_with_state(state.clone(), middleware::require_org_manager))
        )
        .route(
            "/email-templates/count",
            get(handlers::email_template::count_templates)
                .route_layer(from_fn_with_state(state.clone(), middleware::require_org_manager))
        )
        .route(
            "/email-templates/render",
            post(handlers::email_template::render_template)
                .route_layer(from_fn_with_state(state.clone(), middleware::require_org_manager))
        )
        .route(
            "/email-templates/sender",
            post(handlers::email_template::send_template)
                .route_layer(from_fn_with_state(state.clone(), middleware::require_org_manager))
        )
        .route(
            "/email-templates/:key",
            get(handlers::email_template::get_template)
                .patch(handlers::email_template::update_template)
                .delete(handlers::email_template::delete_template)
                .route_layer(from_fn_with_state(state.clone(), middleware::require_org_manager))
        )
        // Extra profile fields
        .route("/extra-fields", get(handlers::extra_field::list_fields))
        .route(
            "/extra-fields",
            post(handlers::extra_field::create_field)
                .route_layer(from_fn_with_state(state.clone(), middleware::require_admin))
        )
        .route(
            "/extra-fields/:id",
            delete(handlers::extra_field::delete_field)
                .route_layer(from_fn_with_state(state.clone(), middleware::require_admin))
        )
        .with_state(state)
}
