//! Read-only catalog lookups and atomic usage-counter increments.
//!
//! Catalog CRUD proper belongs to the external admin service; the site core
//! needs active-record lookups, count-match checks, and `site_count`
//! increments that happen inside the site-creation transaction.

use sqlx::{PgConnection, PgPool};

use fieldops_core::types::DbId;

use crate::models::catalog::{CatalogEntry, ChecklistItem, SiteStep};

const ENTRY_COLUMNS: &str = "id, name, is_active, site_count, created_at, updated_at";

/// Lookup and counter operations for the five catalog tables.
pub struct CatalogRepo;

impl CatalogRepo {
    /// Atomically bump the usage counter of an active zone. Returns `None`
    /// when the zone is missing or inactive.
    pub async fn increment_zone_usage(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<CatalogEntry>, sqlx::Error> {
        let query = format!(
            "UPDATE zones SET site_count = site_count + 1
             WHERE id = $1 AND is_active
             RETURNING {ENTRY_COLUMNS}"
        );
        sqlx::query_as::<_, CatalogEntry>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Atomically bump the usage counter of an active department.
    pub async fn increment_department_usage(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<CatalogEntry>, sqlx::Error> {
        let query = format!(
            "UPDATE departments SET site_count = site_count + 1
             WHERE id = $1 AND is_active
             RETURNING {ENTRY_COLUMNS}"
        );
        sqlx::query_as::<_, CatalogEntry>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Atomically bump the usage counter of every referenced active work
    /// type. Returns the ids actually updated; the caller checks the count
    /// against the requested set.
    pub async fn increment_work_type_usage(
        conn: &mut PgConnection,
        ids: &[DbId],
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "UPDATE work_types SET site_count = site_count + 1
             WHERE id = ANY($1) AND is_active
             RETURNING id",
        )
        .bind(ids)
        .fetch_all(conn)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Count how many of the given site-step ids exist. Creation requires
    /// an exact count match against the selected set.
    pub async fn count_site_steps(
        conn: &mut PgConnection,
        ids: &[DbId],
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM site_steps WHERE id = ANY($1)")
                .bind(ids)
                .fetch_one(conn)
                .await?;
        Ok(count)
    }

    /// Ids of all currently-active checklist items, in insertion order.
    /// This is the snapshot taken into a new site's checklist progress.
    pub async fn active_checklist_item_ids(
        conn: &mut PgConnection,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> =
            sqlx::query_as("SELECT id FROM checklist_items WHERE is_active ORDER BY id")
                .fetch_all(conn)
                .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Fetch the active checklist items among the given ids, in id order.
    pub async fn find_active_checklist_items(
        pool: &PgPool,
        ids: &[DbId],
    ) -> Result<Vec<ChecklistItem>, sqlx::Error> {
        sqlx::query_as::<_, ChecklistItem>(
            "SELECT id, title, image_url, media_type, is_optional, is_active,
                    created_at, updated_at
             FROM checklist_items
             WHERE id = ANY($1) AND is_active
             ORDER BY id",
        )
        .bind(ids)
        .fetch_all(pool)
        .await
    }

    /// Fetch the active site steps among the given ids, in id order.
    pub async fn find_active_site_steps(
        pool: &PgPool,
        ids: &[DbId],
    ) -> Result<Vec<SiteStep>, sqlx::Error> {
        sqlx::query_as::<_, SiteStep>(
            "SELECT id, title, image_url, media_type, is_active, created_at, updated_at
             FROM site_steps
             WHERE id = ANY($1) AND is_active
             ORDER BY id",
        )
        .bind(ids)
        .fetch_all(pool)
        .await
    }

    /* ----------------------------------------------------------------------
    Seeding (tests and fixtures)
    ---------------------------------------------------------------------- */

    pub async fn create_zone(
        pool: &PgPool,
        name: &str,
        is_active: bool,
    ) -> Result<CatalogEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO zones (name, is_active) VALUES ($1, $2) RETURNING {ENTRY_COLUMNS}"
        );
        sqlx::query_as::<_, CatalogEntry>(&query)
            .bind(name)
            .bind(is_active)
            .fetch_one(pool)
            .await
    }

    pub async fn create_department(
        pool: &PgPool,
        name: &str,
        is_active: bool,
    ) -> Result<CatalogEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO departments (name, is_active) VALUES ($1, $2) RETURNING {ENTRY_COLUMNS}"
        );
        sqlx::query_as::<_, CatalogEntry>(&query)
            .bind(name)
            .bind(is_active)
            .fetch_one(pool)
            .await
    }

    pub async fn create_work_type(
        pool: &PgPool,
        name: &str,
        is_active: bool,
    ) -> Result<CatalogEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO work_types (name, is_active) VALUES ($1, $2) RETURNING {ENTRY_COLUMNS}"
        );
        sqlx::query_as::<_, CatalogEntry>(&query)
            .bind(name)
            .bind(is_active)
            .fetch_one(pool)
            .await
    }

    pub async fn create_checklist_item(
        pool: &PgPool,
        title: &str,
        is_active: bool,
    ) -> Result<ChecklistItem, sqlx::Error> {
        sqlx::query_as::<_, ChecklistItem>(
            "INSERT INTO checklist_items (title, is_active) VALUES ($1, $2)
             RETURNING id, title, image_url, media_type, is_optional, is_active,
                       created_at, updated_at",
        )
        .bind(title)
        .bind(is_active)
        .fetch_one(pool)
        .await
    }

    pub async fn create_site_step(
        pool: &PgPool,
        title: &str,
        is_active: bool,
    ) -> Result<SiteStep, sqlx::Error> {
        sqlx::query_as::<_, SiteStep>(
            "INSERT INTO site_steps (title, is_active) VALUES ($1, $2)
             RETURNING id, title, image_url, media_type, is_active, created_at, updated_at",
        )
        .bind(title)
        .bind(is_active)
        .fetch_one(pool)
        .await
    }

    /// Fetch a zone/department/work-type row for assertions and admin reads.
    pub async fn find_zone(pool: &PgPool, id: DbId) -> Result<Option<CatalogEntry>, sqlx::Error> {
        let query = format!("SELECT {ENTRY_COLUMNS} FROM zones WHERE id = $1");
        sqlx::query_as::<_, CatalogEntry>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_department(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<CatalogEntry>, sqlx::Error> {
        let query = format!("SELECT {ENTRY_COLUMNS} FROM departments WHERE id = $1");
        sqlx::query_as::<_, CatalogEntry>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_work_type(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<CatalogEntry>, sqlx::Error> {
        let query = format!("SELECT {ENTRY_COLUMNS} FROM work_types WHERE id = $1");
        sqlx::query_as::<_, CatalogEntry>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
