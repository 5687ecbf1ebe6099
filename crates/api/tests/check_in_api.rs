//! HTTP-level tests for the geofenced check-in endpoint: the reported
//! coordinate must land within the check-in radius of the registered
//! location of the same `PENDING` site.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;

use fieldops_core::site_status::SiteStatus;
use fieldops_db::models::site::MediaRef;
use fieldops_db::repositories::SiteRepo;

const SITE_LON: f64 = 72.8777;
const SITE_LAT: f64 = 19.0760;

/// Register a location and advance the site to `PENDING`.
async fn make_pending(pool: &PgPool, site_id: i64, with_location: bool) {
    if with_location {
        assert!(SiteRepo::set_location(pool, site_id, SITE_LON, SITE_LAT).await.unwrap());
    }
    let photos = vec![MediaRef {
        url: "s3://photos/front.jpg".into(),
    }];
    assert!(SiteRepo::add_site_photos(pool, site_id, &photos, SiteStatus::Pending)
        .await
        .unwrap());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_check_in_within_radius_appends_entry(pool: PgPool) {
    let site = common::seed_site(&pool, "Canal lining").await;
    make_pending(&pool, site.id, true).await;

    let app = common::build_test_app(pool.clone());
    let token = common::make_token(common::WORKER_ID, "worker");
    // ~0.11 m north of the registered coordinate.
    let body = json!({ "longitude": SITE_LON, "latitude": 19.076001 });
    let response =
        common::post_json_auth(app, &format!("/api/v1/sites/{}/check-in", site.id), &token, body)
            .await;

    assert_eq!(response.status(), StatusCode::OK);
    let data = &common::body_json(response).await["data"];
    assert_eq!(data["user_check_ins"].as_array().unwrap().len(), 1);
    assert_eq!(data["user_check_ins"][0]["source_address"], "10.0.0.7");

    let site = SiteRepo::find_by_id(&pool, site.id).await.unwrap().unwrap();
    assert_eq!(site.user_check_ins.0.len(), 1);
    assert_eq!(site.user_check_ins.0[0].latitude, 19.076001);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_check_in_outside_radius_rejected(pool: PgPool) {
    let site = common::seed_site(&pool, "Canal lining").await;
    make_pending(&pool, site.id, true).await;

    let app = common::build_test_app(pool.clone());
    let token = common::make_token(common::WORKER_ID, "worker");
    // ~11 m north: outside the near-exact fence.
    let body = json!({ "longitude": SITE_LON, "latitude": 19.0761 });
    let response =
        common::post_json_auth(app, &format!("/api/v1/sites/{}/check-in", site.id), &token, body)
            .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let site = SiteRepo::find_by_id(&pool, site.id).await.unwrap().unwrap();
    assert!(site.user_check_ins.0.is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_check_in_without_registered_location_rejected(pool: PgPool) {
    let site = common::seed_site(&pool, "Canal lining").await;
    make_pending(&pool, site.id, false).await;

    let app = common::build_test_app(pool.clone());
    let token = common::make_token(common::WORKER_ID, "worker");
    let body = json!({ "longitude": SITE_LON, "latitude": SITE_LAT });
    let response =
        common::post_json_auth(app, &format!("/api/v1/sites/{}/check-in", site.id), &token, body)
            .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_check_in_on_unvisited_site_is_a_state_error(pool: PgPool) {
    let site = common::seed_site(&pool, "Canal lining").await;

    let app = common::build_test_app(pool.clone());
    let token = common::make_token(common::WORKER_ID, "worker");
    let body = json!({ "longitude": SITE_LON, "latitude": SITE_LAT });
    let response =
        common::post_json_auth(app, &format!("/api/v1/sites/{}/check-in", site.id), &token, body)
            .await;

    assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
    assert_eq!(common::body_json(response).await["code"], "INVALID_STATE");
}
