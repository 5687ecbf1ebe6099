//! Shared harness for HTTP-level integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{header, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use sqlx::PgPool;
use tower::ServiceExt;

use fieldops_api::auth::jwt::{Claims, JwtConfig};
use fieldops_api::config::ServerConfig;
use fieldops_api::router::build_app_router;
use fieldops_api::state::AppState;
use fieldops_core::types::DbId;
use fieldops_db::models::site::{CreateSite, Site};
use fieldops_db::repositories::{CatalogRepo, SiteRepo};

pub const TEST_SECRET: &str = "test-secret";
pub const WORKER_ID: DbId = 101;
pub const SUPERVISOR_ID: DbId = 202;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool. This goes through [`build_app_router`] so tests
/// exercise the same stack that production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

/// Mint an access token the way the external identity service would.
pub fn make_token(user_id: DbId, role: &str) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        exp: now + 15 * 60,
        iat: now,
        jti: format!("test-{user_id}"),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}

/// Issue an authenticated JSON POST. The peer address is injected the same
/// way `into_make_service_with_connect_info` does in production.
pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .extension(ConnectInfo(SocketAddr::from(([10, 0, 0, 7], 40000))))
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/* --------------------------------------------------------------------------
Database fixtures
-------------------------------------------------------------------------- */

/// Seed one active record per catalog table and insert a site against it.
pub async fn seed_site(pool: &PgPool, name: &str) -> Site {
    let zone = CatalogRepo::create_zone(pool, "North Zone", true).await.unwrap();
    let department = CatalogRepo::create_department(pool, "Civil", true).await.unwrap();
    let work_type = CatalogRepo::create_work_type(pool, "Excavation", true).await.unwrap();
    let item = CatalogRepo::create_checklist_item(pool, "Safety barriers", true)
        .await
        .unwrap();

    let mut conn = pool.acquire().await.unwrap();
    let input = CreateSite {
        name: name.to_string(),
        address: "12 Canal Road".to_string(),
        worker_id: WORKER_ID,
        supervisor_id: SUPERVISOR_ID,
        department_id: department.id,
        zone_id: zone.id,
        work_type_ids: vec![work_type.id],
        min_length: 10.0,
        max_length: 120.0,
        site_step_ids: Vec::new(),
    };
    SiteRepo::insert(&mut conn, &input, &[item.id]).await.unwrap()
}
