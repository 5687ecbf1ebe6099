//! Repository for the `sites` table.
//!
//! Every status-gated transition is a conditional update filtered by
//! `id AND status`, so a guarded write can never land on a row that has
//! already left the expected status. Flat media collections are appended
//! with native JSONB concatenation; the keyed checklist/site-step merges
//! lock the row first and write the merged array back in the same
//! transaction.

use sqlx::types::Json;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use fieldops_core::site_status::SiteStatus;
use fieldops_core::types::DbId;

use crate::models::site::{
    CheckInEntry, ChecklistMediaEntry, ChecklistProgressEntry, CreateSite, MediaRef, Remark, Site,
    SitePage, SiteStepProgressEntry, SiteSummary,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, address, worker_id, supervisor_id, department_id, zone_id, \
     work_type_ids, status, billing_status, min_length, max_length, longitude, latitude, \
     checklist_progress, site_step_progress, site_photos, before_site_condition_photos, \
     measurement_book_media, remarks, user_check_ins, created_at, updated_at";

const SUMMARY_COLUMNS: &str = "id, name, address, worker_id, supervisor_id, department_id, \
     zone_id, status, billing_status, min_length, max_length, created_at";

/// Provides aggregate operations for sites.
pub struct SiteRepo;

impl SiteRepo {
    /* ----------------------------------------------------------------------
    Creation
    ---------------------------------------------------------------------- */

    /// Whether any existing site name contains `name` case-insensitively.
    pub async fn name_conflict_exists(
        conn: &mut PgConnection,
        name: &str,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM sites WHERE name ILIKE '%' || $1 || '%')",
        )
        .bind(name)
        .fetch_one(conn)
        .await?;
        Ok(exists)
    }

    /// Insert a new site with its creation-time snapshots: one checklist
    /// progress entry per active catalog item, one step progress entry per
    /// selected step, all with empty media. Status starts at `NOT_VISITED`.
    pub async fn insert(
        conn: &mut PgConnection,
        input: &CreateSite,
        checklist_item_ids: &[DbId],
    ) -> Result<Site, sqlx::Error> {
        let checklist_progress: Vec<ChecklistProgressEntry> = checklist_item_ids
            .iter()
            .map(|&id| ChecklistProgressEntry {
                checklist_item_id: id,
                media_urls: Vec::new(),
            })
            .collect();
        let site_step_progress: Vec<SiteStepProgressEntry> = input
            .site_step_ids
            .iter()
            .map(|&id| SiteStepProgressEntry {
                site_step_id: id,
                media_urls: Vec::new(),
            })
            .collect();

        let query = format!(
            "INSERT INTO sites
                (name, address, worker_id, supervisor_id, department_id, zone_id,
                 work_type_ids, status, min_length, max_length,
                 checklist_progress, site_step_progress)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Site>(&query)
            .bind(&input.name)
            .bind(&input.address)
            .bind(input.worker_id)
            .bind(input.supervisor_id)
            .bind(input.department_id)
            .bind(input.zone_id)
            .bind(&input.work_type_ids)
            .bind(SiteStatus::NotVisited.as_str())
            .bind(input.min_length)
            .bind(input.max_length)
            .bind(Json(checklist_progress))
            .bind(Json(site_step_progress))
            .fetch_one(conn)
            .await
    }

    /* ----------------------------------------------------------------------
    Reads
    ---------------------------------------------------------------------- */

    /// Fetch the full aggregate by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Site>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sites WHERE id = $1");
        sqlx::query_as::<_, Site>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Status-scoped fetch: the site must be in `status` to be visible.
    pub async fn find_by_id_and_status(
        pool: &PgPool,
        id: DbId,
        status: SiteStatus,
    ) -> Result<Option<Site>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sites WHERE id = $1 AND status = $2");
        sqlx::query_as::<_, Site>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Existence probe irrespective of status. Used to split "no such
    /// site" from "site in the wrong status" after a guarded update
    /// matched nothing.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM sites WHERE id = $1)")
                .bind(id)
                .fetch_one(pool)
                .await?;
        Ok(exists)
    }

    /// Filtered, paginated listing with an unpaginated total, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &crate::models::site::SiteFilter,
        limit: i64,
        offset: i64,
    ) -> Result<SitePage, sqlx::Error> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM sites");
        push_filters(&mut count_qb, filter);
        let (total,): (i64,) = count_qb.build_query_as().fetch_one(pool).await?;

        let mut qb =
            QueryBuilder::<Postgres>::new(format!("SELECT {SUMMARY_COLUMNS} FROM sites"));
        push_filters(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC LIMIT ");
        qb.push_bind(limit);
        qb.push(" OFFSET ");
        qb.push_bind(offset);
        let results: Vec<SiteSummary> = qb.build_query_as().fetch_all(pool).await?;

        Ok(SitePage { results, total })
    }

    /* ----------------------------------------------------------------------
    Location & check-in
    ---------------------------------------------------------------------- */

    /// Register the site's location. Only legal while the site is still
    /// `NOT_VISITED`; returns `false` when the guard matched nothing.
    pub async fn set_location(
        pool: &PgPool,
        id: DbId,
        longitude: f64,
        latitude: f64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE sites SET longitude = $2, latitude = $3
             WHERE id = $1 AND status = $4",
        )
        .bind(id)
        .bind(longitude)
        .bind(latitude)
        .bind(SiteStatus::NotVisited.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Append a check-in entry to a `PENDING` site and return the updated
    /// aggregate.
    pub async fn add_check_in(
        pool: &PgPool,
        id: DbId,
        entry: &CheckInEntry,
    ) -> Result<Option<Site>, sqlx::Error> {
        let query = format!(
            "UPDATE sites SET user_check_ins = user_check_ins || $2
             WHERE id = $1 AND status = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Site>(&query)
            .bind(id)
            .bind(Json(vec![entry.clone()]))
            .bind(SiteStatus::Pending.as_str())
            .fetch_optional(pool)
            .await
    }

    /* ----------------------------------------------------------------------
    Media appends
    ---------------------------------------------------------------------- */

    /// Append site photos to a `NOT_VISITED` site and advance it to
    /// `new_status` (`PENDING`, or `COMPLETED` when the caller signals the
    /// visit is done).
    pub async fn add_site_photos(
        pool: &PgPool,
        id: DbId,
        media: &[MediaRef],
        new_status: SiteStatus,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE sites SET site_photos = site_photos || $2, status = $3
             WHERE id = $1 AND status = $4",
        )
        .bind(id)
        .bind(Json(media))
        .bind(new_status.as_str())
        .bind(SiteStatus::NotVisited.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Append before-site-condition photos. No status guard; the caller
    /// must be the assigned worker.
    pub async fn add_before_site_condition_photos(
        pool: &PgPool,
        id: DbId,
        worker_id: DbId,
        media: &[MediaRef],
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE sites
             SET before_site_condition_photos = before_site_condition_photos || $3
             WHERE id = $1 AND worker_id = $2",
        )
        .bind(id)
        .bind(worker_id)
        .bind(Json(media))
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Append measurement-book media to an `ONGOING` site and mark it
    /// `COMPLETED`.
    pub async fn add_measurement_book_media(
        pool: &PgPool,
        id: DbId,
        media: &[MediaRef],
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE sites SET measurement_book_media = measurement_book_media || $2, status = $3
             WHERE id = $1 AND status = $4",
        )
        .bind(id)
        .bind(Json(media))
        .bind(SiteStatus::Completed.as_str())
        .bind(SiteStatus::Ongoing.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Append a remark snapshot. Remarks are independent of the status
    /// machine.
    pub async fn add_remark(pool: &PgPool, id: DbId, remark: &Remark) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE sites SET remarks = remarks || $2 WHERE id = $1",
        )
        .bind(id)
        .bind(Json(vec![remark.clone()]))
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Merge checklist media into a `PENDING` site's progress entries and
    /// advance it to `ONGOING`.
    ///
    /// Input entries are matched by `checklist_item_id`; unmatched inputs
    /// are silently dropped. Matched URLs are appended, never replacing or
    /// deduplicating existing ones. The row is locked for the duration of
    /// the merge so two concurrent submissions cannot lose appends.
    pub async fn append_checklist_media(
        pool: &PgPool,
        id: DbId,
        entries: &[ChecklistMediaEntry],
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "SELECT {COLUMNS} FROM sites WHERE id = $1 AND status = $2 FOR UPDATE"
        );
        let site: Option<Site> = sqlx::query_as(&query)
            .bind(id)
            .bind(SiteStatus::Pending.as_str())
            .fetch_optional(&mut *tx)
            .await?;
        let Some(site) = site else {
            return Ok(false);
        };

        let mut progress = site.checklist_progress.0;
        for item in progress.iter_mut() {
            for input in entries
                .iter()
                .filter(|e| e.checklist_item_id == item.checklist_item_id)
            {
                item.media_urls.push(MediaRef {
                    url: input.url.clone(),
                });
            }
        }

        sqlx::query("UPDATE sites SET checklist_progress = $2, status = $3 WHERE id = $1")
            .bind(id)
            .bind(Json(progress))
            .bind(SiteStatus::Ongoing.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Append media to one site-step progress entry of an `ONGOING` site.
    /// Requires the acting worker to be the assigned one; only the first
    /// positional entry matching `step_id` receives the media, and an
    /// unmatched `step_id` is silently dropped.
    pub async fn append_site_step_media(
        pool: &PgPool,
        id: DbId,
        worker_id: DbId,
        step_id: DbId,
        media: &[MediaRef],
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "SELECT {COLUMNS} FROM sites
             WHERE id = $1 AND status = $2 AND worker_id = $3 FOR UPDATE"
        );
        let site: Option<Site> = sqlx::query_as(&query)
            .bind(id)
            .bind(SiteStatus::Ongoing.as_str())
            .bind(worker_id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(site) = site else {
            return Ok(false);
        };

        let mut progress = site.site_step_progress.0;
        if let Some(entry) = progress.iter_mut().find(|e| e.site_step_id == step_id) {
            entry.media_urls.extend(media.iter().cloned());
        }

        sqlx::query("UPDATE sites SET site_step_progress = $2 WHERE id = $1")
            .bind(id)
            .bind(Json(progress))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    /* ----------------------------------------------------------------------
    Checkout & billing
    ---------------------------------------------------------------------- */

    /// Checkout: on a `PENDING` site, roll back the incomplete cycle by
    /// discarding before-site-condition photos and clearing every checklist
    /// entry's media. On an `ONGOING` site, no destructive effect. Returns
    /// the resulting snapshot, or `None` if the site does not exist.
    pub async fn checkout(pool: &PgPool, id: DbId) -> Result<Option<Site>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM sites WHERE id = $1 FOR UPDATE");
        let site: Option<Site> = sqlx::query_as(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(site) = site else {
            return Ok(None);
        };

        let site = if site.status == SiteStatus::Pending.as_str() {
            tracing::debug!(site_id = id, "Checkout rollback of an incomplete visit cycle");
            let cleared: Vec<ChecklistProgressEntry> = site
                .checklist_progress
                .0
                .iter()
                .map(|e| ChecklistProgressEntry {
                    checklist_item_id: e.checklist_item_id,
                    media_urls: Vec::new(),
                })
                .collect();
            let query = format!(
                "UPDATE sites
                 SET before_site_condition_photos = '[]'::jsonb, checklist_progress = $2
                 WHERE id = $1
                 RETURNING {COLUMNS}"
            );
            sqlx::query_as::<_, Site>(&query)
                .bind(id)
                .bind(Json(cleared))
                .fetch_one(&mut *tx)
                .await?
        } else {
            site
        };

        tx.commit().await?;
        Ok(Some(site))
    }

    /// Set the billing status, guarded on the visit status the caller read
    /// the site in. `new_status` is the visit status resulting from the
    /// billing rule (unchanged except for the final credit).
    pub async fn set_billing_status(
        pool: &PgPool,
        id: DbId,
        billing_status: &str,
        expected_status: SiteStatus,
        new_status: SiteStatus,
    ) -> Result<Option<Site>, sqlx::Error> {
        let query = format!(
            "UPDATE sites SET billing_status = $2, status = $3
             WHERE id = $1 AND status = $4
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Site>(&query)
            .bind(id)
            .bind(billing_status)
            .bind(new_status.as_str())
            .bind(expected_status.as_str())
            .fetch_optional(pool)
            .await
    }
}

/// Apply the shared WHERE clause for site listings to a query builder.
fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &crate::models::site::SiteFilter) {
    qb.push(" WHERE 1 = 1");
    if let Some(search) = &filter.search {
        qb.push(" AND name ILIKE ");
        qb.push_bind(format!("%{search}%"));
    }
    if let Some(status) = &filter.status {
        qb.push(" AND status = ");
        qb.push_bind(status.clone());
    }
    if let Some(billing) = &filter.billing_status {
        qb.push(" AND billing_status = ");
        qb.push_bind(billing.clone());
    }
    if let Some(zone_id) = filter.zone_id {
        qb.push(" AND zone_id = ");
        qb.push_bind(zone_id);
    }
    if let Some(department_id) = filter.department_id {
        qb.push(" AND department_id = ");
        qb.push_bind(department_id);
    }
    if let Some(work_type_id) = filter.work_type_id {
        qb.push(" AND ");
        qb.push_bind(work_type_id);
        qb.push(" = ANY(work_type_ids)");
    }
    if let Some(actor_id) = filter.actor_id {
        qb.push(" AND (worker_id = ");
        qb.push_bind(actor_id);
        qb.push(" OR supervisor_id = ");
        qb.push_bind(actor_id);
        qb.push(")");
    }
}
