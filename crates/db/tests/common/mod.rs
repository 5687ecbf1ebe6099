//! Shared fixtures for the site repository tests.

use sqlx::PgPool;

use fieldops_core::types::DbId;
use fieldops_db::models::site::{CreateSite, Site};
use fieldops_db::repositories::{CatalogRepo, SiteRepo};

pub const WORKER_ID: DbId = 101;
pub const SUPERVISOR_ID: DbId = 202;

/// Seeded catalog records backing a site.
pub struct Fixture {
    pub zone_id: DbId,
    pub department_id: DbId,
    pub work_type_id: DbId,
    pub checklist_item_ids: Vec<DbId>,
    pub site_step_ids: Vec<DbId>,
}

/// Seed one active record per catalog table, plus two checklist items and
/// two site steps.
pub async fn seed_catalog(pool: &PgPool) -> Fixture {
    let zone = CatalogRepo::create_zone(pool, "North Zone", true).await.unwrap();
    let department = CatalogRepo::create_department(pool, "Civil", true).await.unwrap();
    let work_type = CatalogRepo::create_work_type(pool, "Excavation", true).await.unwrap();
    let item_a = CatalogRepo::create_checklist_item(pool, "Safety barriers", true)
        .await
        .unwrap();
    let item_b = CatalogRepo::create_checklist_item(pool, "Signage", true).await.unwrap();
    let step_a = CatalogRepo::create_site_step(pool, "Trenching", true).await.unwrap();
    let step_b = CatalogRepo::create_site_step(pool, "Backfill", true).await.unwrap();

    Fixture {
        zone_id: zone.id,
        department_id: department.id,
        work_type_id: work_type.id,
        checklist_item_ids: vec![item_a.id, item_b.id],
        site_step_ids: vec![step_a.id, step_b.id],
    }
}

/// Insert a site against the fixture's catalog, with the checklist snapshot
/// taken from the fixture's items.
pub async fn create_site(pool: &PgPool, fx: &Fixture, name: &str) -> Site {
    let mut conn = pool.acquire().await.unwrap();
    let input = CreateSite {
        name: name.to_string(),
        address: "12 Canal Road".to_string(),
        worker_id: WORKER_ID,
        supervisor_id: SUPERVISOR_ID,
        department_id: fx.department_id,
        zone_id: fx.zone_id,
        work_type_ids: vec![fx.work_type_id],
        min_length: 10.0,
        max_length: 120.0,
        site_step_ids: fx.site_step_ids.clone(),
    };
    SiteRepo::insert(&mut conn, &input, &fx.checklist_item_ids)
        .await
        .unwrap()
}
