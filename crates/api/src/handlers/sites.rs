//! Handlers for site creation, retrieval, listing, and billing updates.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use fieldops_core::error::CoreError;
use fieldops_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use fieldops_core::roles::{resolve_list_status, Role};
use fieldops_core::site_rules;
use fieldops_core::site_status::{apply_billing_update, BillingStatus, SiteStatus};
use fieldops_core::types::DbId;
use fieldops_db::models::site::{CreateSite, SiteFilter};
use fieldops_db::repositories::{CatalogRepo, SiteRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::SiteListParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /api/v1/sites`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSiteRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1))]
    pub address: String,
    pub worker_id: DbId,
    pub supervisor_id: DbId,
    pub department_id: DbId,
    pub zone_id: DbId,
    pub work_type_ids: Vec<DbId>,
    pub min_length: f64,
    pub max_length: f64,
    #[serde(default)]
    pub site_step_ids: Vec<DbId>,
}

/// POST /api/v1/sites
///
/// Create a site (admin only). Runs as a single transaction: duplicate
/// name check, catalog usage increments, step count-match, checklist
/// snapshot, insert. All domain validation happens before any write.
pub async fn create_site(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateSiteRequest>,
) -> AppResult<impl IntoResponse> {
    auth.require_admin()?;

    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;
    site_rules::validate_length_bounds(input.min_length, input.max_length)
        .map_err(AppError::Core)?;
    site_rules::validate_distinct_actors(input.worker_id, input.supervisor_id)
        .map_err(AppError::Core)?;
    site_rules::validate_work_types(&input.work_type_ids).map_err(AppError::Core)?;

    let mut tx = state.pool.begin().await?;

    if SiteRepo::name_conflict_exists(&mut *tx, &input.name).await? {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "A site named like '{}' already exists",
            input.name
        ))));
    }

    CatalogRepo::increment_department_usage(&mut *tx, input.department_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Reference(format!(
                "Department {} not found or inactive",
                input.department_id
            )))
        })?;
    CatalogRepo::increment_zone_usage(&mut *tx, input.zone_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Reference(format!(
                "Zone {} not found or inactive",
                input.zone_id
            )))
        })?;

    let mut distinct_work_types = input.work_type_ids.clone();
    distinct_work_types.sort_unstable();
    distinct_work_types.dedup();
    let updated = CatalogRepo::increment_work_type_usage(&mut *tx, &distinct_work_types).await?;
    if updated.len() != distinct_work_types.len() {
        return Err(AppError::Core(CoreError::Reference(
            "One or more work types not found or inactive".into(),
        )));
    }

    let step_count = CatalogRepo::count_site_steps(&mut *tx, &input.site_step_ids).await?;
    if step_count != input.site_step_ids.len() as i64 {
        return Err(AppError::Core(CoreError::Reference(
            "One or more site steps not found".into(),
        )));
    }

    // Snapshot the active checklist catalog into the new site. Later
    // catalog changes do not touch existing sites.
    let checklist_item_ids = CatalogRepo::active_checklist_item_ids(&mut *tx).await?;

    let create = CreateSite {
        name: input.name,
        address: input.address,
        worker_id: input.worker_id,
        supervisor_id: input.supervisor_id,
        department_id: input.department_id,
        zone_id: input.zone_id,
        work_type_ids: input.work_type_ids,
        min_length: input.min_length,
        max_length: input.max_length,
        site_step_ids: input.site_step_ids,
    };
    let site = SiteRepo::insert(&mut *tx, &create, &checklist_item_ids).await?;

    tx.commit().await?;

    tracing::info!(
        site_id = site.id,
        worker_id = site.worker_id,
        supervisor_id = site.supervisor_id,
        checklist_items = checklist_item_ids.len(),
        "Site created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: site })))
}

/// GET /api/v1/sites/{id}
///
/// Full aggregate. Admins see every site; workers and supervisors only
/// their own.
pub async fn get_site(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(site_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let site = SiteRepo::find_by_id(&state.pool, site_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Site",
            id: site_id,
        }))?;

    if auth.role != Role::Admin
        && site.worker_id != auth.user_id
        && site.supervisor_id != auth.user_id
    {
        return Err(AppError::Core(CoreError::Forbidden(
            "Not a participant of this site".into(),
        )));
    }

    Ok(Json(DataResponse { data: site }))
}

/// GET /api/v1/sites
///
/// Filtered, paginated listing. Non-admin callers are scoped to sites they
/// participate in and to the statuses their role may see; when no status
/// filter is passed, the role default applies (workers start from
/// `PENDING`, supervisors from `NOT_VISITED`).
pub async fn list_sites(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<SiteListParams>,
) -> AppResult<impl IntoResponse> {
    let requested = params
        .status
        .as_deref()
        .map(SiteStatus::parse)
        .transpose()
        .map_err(AppError::Core)?;
    let status = resolve_list_status(auth.role, requested).map_err(AppError::Core)?;

    let billing = params
        .billing_status
        .as_deref()
        .map(BillingStatus::parse)
        .transpose()
        .map_err(AppError::Core)?;

    let filter = SiteFilter {
        search: params.search,
        status: status.map(|s| s.as_str().to_string()),
        billing_status: billing.map(|b| b.as_str().to_string()),
        zone_id: params.zone_id,
        department_id: params.department_id,
        work_type_id: params.work_type_id,
        actor_id: (auth.role != Role::Admin).then_some(auth.user_id),
    };

    let limit = clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
    let offset = clamp_offset(params.offset);

    let page = SiteRepo::list(&state.pool, &filter, limit, offset).await?;
    Ok(Json(DataResponse { data: page }))
}

/// Request body for `PUT /api/v1/sites/{id}/billing-status`.
#[derive(Debug, Deserialize)]
pub struct BillingStatusRequest {
    pub billing_status: String,
}

/// PUT /api/v1/sites/{id}/billing-status
///
/// Admin only. Billing is a post-completion track: the site must be
/// `COMPLETED` or `SUBMITTED`; the final credit closes a `COMPLETED` site
/// out to `SUBMITTED`.
pub async fn update_billing_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(site_id): Path<DbId>,
    Json(input): Json<BillingStatusRequest>,
) -> AppResult<impl IntoResponse> {
    auth.require_admin()?;

    let billing = BillingStatus::parse(&input.billing_status).map_err(AppError::Core)?;

    let site = SiteRepo::find_by_id(&state.pool, site_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Site",
            id: site_id,
        }))?;
    let current = SiteStatus::parse(&site.status).map_err(AppError::Core)?;
    let new_status = apply_billing_update(current, billing).map_err(AppError::Core)?;

    // Guarded on the status we just read; a concurrent transition makes
    // the update miss and surfaces as a state error.
    let updated =
        SiteRepo::set_billing_status(&state.pool, site_id, billing.as_str(), current, new_status)
            .await?
            .ok_or(AppError::Core(CoreError::InvalidState {
                entity: "Site",
                id: site_id,
                expected: current.as_str(),
            }))?;

    tracing::info!(
        site_id = site_id,
        billing_status = %billing,
        status = %new_status,
        "Billing status updated"
    );

    Ok(Json(DataResponse { data: updated }))
}
