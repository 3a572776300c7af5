use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use sso_api::config::Config;
use sso_auth::{
    AccountSettings, EmailProvider, EmailService, JwtService, SmsProvider, SmsService,
    TokenSubject, TokenType,
};
use sso_database::{Database, DatabaseConfig};
use sso_models::{SsoSettings, ADMIN_ROLE, ORG_USER_MANAGER_ROLE};
use tower::ServiceExt;
use uuid::Uuid;

const SECRET: &str = "api-test-secret";

fn config(settings: AccountSettings) -> Config {
    Config {
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        database: DatabaseConfig::default(),
        jwt: JwtService::new(SECRET),
        email: EmailService::new(EmailProvider::MailHog {
            host: "localhost".to_string(),
            port: 1025,
            from_email: "noreply@sso.local".to_string(),
            from_name: "SSO".to_string(),
        }),
        sms: SmsService::new(SmsProvider::Disabled),
        settings,
    }
}

/// Router over a lazy pool. Requests rejected before touching the database need no server.
fn app_with(settings: AccountSettings) -> Router {
    let config = config(settings);
    let database = Database::connect_lazy(config.database.clone()).unwrap();
    sso_api::app(&database, config)
}

fn app() -> Router {
    app_with(AccountSettings::default())
}

fn token(roles: &[&str], ttl: Option<i64>) -> String {
    JwtService::new(SECRET)
        .generate_token(
            TokenSubject {
                user_id: Uuid::new_v4(),
                email: "jane@example.com",
                name: "Jane Doe",
                roles: roles.iter().map(|r| r.to_string()).collect(),
            },
            TokenType::Access,
            ttl,
        )
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn json(method: &str, uri: &str, bearer: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let (status, body) = send(app(), get("/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn profile_requires_a_token() {
    let (status, body) = send(app(), get("/users/me", None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "missing_auth_header");
}

#[tokio::test]
async fn garbage_and_expired_tokens_are_rejected() {
    let (status, body) = send(app(), get("/users/me", Some("not.a.jwt"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_token");

    let expired = token(&[], Some(-60));
    let (status, _) = send(app(), get("/users/refresh", Some(&expired))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_signed_with_another_secret_is_rejected() {
    let forged = JwtService::new("another-secret")
        .generate_token(
            TokenSubject {
                user_id: Uuid::new_v4(),
                email: "mallory@example.com",
                name: "Mallory",
                roles: vec![ADMIN_ROLE.to_string()],
            },
            TokenType::Access,
            None,
        )
        .unwrap();

    let (status, _) = send(app(), get("/users", Some(&forged))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_routes_reject_plain_users() {
    let user = token(&["USER"], None);

    for uri in ["/users", "/users/count", "/roles", "/roles/count"] {
        let (status, body) = send(app(), get(uri, Some(&user))).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{}", uri);
        assert_eq!(body["error"], "insufficient_permissions");
    }
}

#[tokio::test]
async fn organisation_creation_is_admin_only() {
    let manager = token(&[ORG_USER_MANAGER_ROLE], None);
    let request = json(
        "POST",
        "/organisations",
        Some(&manager),
        serde_json::json!({ "name": "Acme" }),
    );

    let (status, _) = send(app(), request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn manager_routes_reject_plain_users() {
    let user = token(&[], None);
    let org_id = Uuid::new_v4();

    let (status, _) = send(app(), get(&format!("/organisations/{}/user", org_id), Some(&user))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(app(), get("/email-templates", Some(&user))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn registration_can_be_disabled() {
    let settings = AccountSettings {
        sso: SsoSettings {
            public_creation: false,
            ..SsoSettings::default()
        },
        ..AccountSettings::default()
    };

    let request = json(
        "POST",
        "/users",
        None,
        serde_json::json!({ "email": "jane@example.com", "password": "Secret123" }),
    );

    let (status, body) = send(app_with(settings), request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");
}

#[tokio::test]
async fn unknown_reset_factor_is_rejected() {
    let request = json(
        "PATCH",
        "/users/credentials/reset",
        None,
        serde_json::json!({ "email": "jane@example.com", "factor": "fax" }),
    );

    let (status, _) = send(app(), request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn device_login_validates_ttl() {
    let request = json(
        "POST",
        "/devices/login",
        None,
        serde_json::json!({ "email": "sensor@example.com", "password": "Secret123", "ttl": 0 }),
    );

    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn device_login_rejects_oversized_ttl() {
    let request = json(
        "POST",
        "/devices/login",
        None,
        serde_json::json!({
            "email": "sensor@example.com",
            "password": "Secret123",
            "ttl": 1_000_000_000_000_000_000i64
        }),
    );

    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}
