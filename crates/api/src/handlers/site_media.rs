//! Media append operations and the per-site progress views.
//!
//! Every append is a status- or ownership-guarded write; the guards live in
//! the repository, and a miss is resolved here into `NotFound`,
//! `InvalidState`, or `Forbidden`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use fieldops_core::error::CoreError;
use fieldops_core::site_status::{status_after_site_photos, validate_remark_status, SiteStatus};
use fieldops_core::types::DbId;
use fieldops_db::models::site::{ChecklistMediaEntry, MediaRef, Remark, Site};
use fieldops_db::repositories::{CatalogRepo, SiteRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::site_guard_error;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

fn require_media(media: &[MediaRef]) -> Result<(), AppError> {
    if media.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "At least one media entry is required".into(),
        )));
    }
    Ok(())
}

async fn load_site(state: &AppState, site_id: DbId) -> Result<Site, AppError> {
    SiteRepo::find_by_id(&state.pool, site_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Site",
            id: site_id,
        }))
}

/* --------------------------------------------------------------------------
Site photos
-------------------------------------------------------------------------- */

/// Request body for `POST /api/v1/sites/{id}/photos`.
#[derive(Debug, Deserialize)]
pub struct SitePhotosRequest {
    pub media: Vec<MediaRef>,
    /// When set, the photo submission also closes the visit out to
    /// `COMPLETED` instead of parking the site at `PENDING`.
    #[serde(default)]
    pub is_complete: bool,
}

/// POST /api/v1/sites/{id}/photos
///
/// Supervisor's first visit: append site photos to a `NOT_VISITED` site and
/// advance it.
pub async fn add_site_photos(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(site_id): Path<DbId>,
    Json(input): Json<SitePhotosRequest>,
) -> AppResult<impl IntoResponse> {
    require_media(&input.media)?;

    let new_status = status_after_site_photos(input.is_complete);
    let updated =
        SiteRepo::add_site_photos(&state.pool, site_id, &input.media, new_status).await?;
    if !updated {
        return Err(site_guard_error(&state.pool, site_id, "NOT_VISITED").await);
    }

    tracing::info!(
        site_id,
        user_id = auth.user_id,
        photos = input.media.len(),
        status = %new_status,
        "Site photos added"
    );
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/sites/{id}/photos
pub async fn list_site_photos(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(site_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let site = load_site(&state, site_id).await?;
    Ok(Json(DataResponse {
        data: site.site_photos.0,
    }))
}

/* --------------------------------------------------------------------------
Before-site-condition photos
-------------------------------------------------------------------------- */

/// Request body carrying a plain media list.
#[derive(Debug, Deserialize)]
pub struct MediaRequest {
    pub media: Vec<MediaRef>,
}

/// POST /api/v1/sites/{id}/before-site-condition
///
/// Worker-owned evidence of the site's state before work starts. Not
/// status-gated, but only the assigned worker may write it.
pub async fn add_before_site_condition(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(site_id): Path<DbId>,
    Json(input): Json<MediaRequest>,
) -> AppResult<impl IntoResponse> {
    require_media(&input.media)?;

    let updated = SiteRepo::add_before_site_condition_photos(
        &state.pool,
        site_id,
        auth.user_id,
        &input.media,
    )
    .await?;
    if !updated {
        // Guard misses either because the site is gone or because the
        // caller is not its worker.
        return Err(match SiteRepo::exists(&state.pool, site_id).await? {
            true => AppError::Core(CoreError::Forbidden(
                "Only the assigned worker may add before-site-condition photos".into(),
            )),
            false => AppError::Core(CoreError::NotFound {
                entity: "Site",
                id: site_id,
            }),
        });
    }

    tracing::info!(site_id, user_id = auth.user_id, "Before-site-condition photos added");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/sites/{id}/before-site-condition
pub async fn list_before_site_condition(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(site_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let site = load_site(&state, site_id).await?;
    Ok(Json(DataResponse {
        data: site.before_site_condition_photos.0,
    }))
}

/* --------------------------------------------------------------------------
Checklist
-------------------------------------------------------------------------- */

/// Request body for `POST /api/v1/sites/{id}/checklist-media`.
#[derive(Debug, Deserialize)]
pub struct ChecklistMediaRequest {
    pub media: Vec<ChecklistMediaEntry>,
}

/// POST /api/v1/sites/{id}/checklist-media
///
/// Submit checklist media for a `PENDING` site; the submission advances the
/// site to `ONGOING`. Entries for unknown checklist items are dropped.
pub async fn add_checklist_media(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(site_id): Path<DbId>,
    Json(input): Json<ChecklistMediaRequest>,
) -> AppResult<impl IntoResponse> {
    if input.media.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "At least one checklist media entry is required".into(),
        )));
    }

    let updated = SiteRepo::append_checklist_media(&state.pool, site_id, &input.media).await?;
    if !updated {
        return Err(site_guard_error(&state.pool, site_id, "PENDING").await);
    }

    tracing::info!(
        site_id,
        user_id = auth.user_id,
        entries = input.media.len(),
        "Checklist media submitted"
    );
    Ok(StatusCode::NO_CONTENT)
}

/// One checklist row in the per-site view: the catalog item joined with the
/// site's progress for it.
#[derive(Debug, Serialize)]
pub struct ChecklistItemView {
    pub checklist_item_id: DbId,
    pub title: String,
    pub image_url: Option<String>,
    pub media_type: String,
    pub is_optional: bool,
    pub media_urls: Vec<MediaRef>,
    pub is_uploaded: bool,
}

/// GET /api/v1/sites/{id}/checklist
///
/// The site's checklist snapshot joined with the catalog items it was taken
/// from. Items deactivated since creation drop out of the view; the stored
/// progress is untouched.
pub async fn list_site_checklist(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(site_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let site = load_site(&state, site_id).await?;

    let ids: Vec<DbId> = site
        .checklist_progress
        .0
        .iter()
        .map(|e| e.checklist_item_id)
        .collect();
    let items = CatalogRepo::find_active_checklist_items(&state.pool, &ids).await?;

    let views: Vec<ChecklistItemView> = site
        .checklist_progress
        .0
        .iter()
        .filter_map(|entry| {
            let item = items.iter().find(|i| i.id == entry.checklist_item_id)?;
            Some(ChecklistItemView {
                checklist_item_id: entry.checklist_item_id,
                title: item.title.clone(),
                image_url: item.image_url.clone(),
                media_type: item.media_type.clone(),
                is_optional: item.is_optional,
                media_urls: entry.media_urls.clone(),
                is_uploaded: !entry.media_urls.is_empty(),
            })
        })
        .collect();

    Ok(Json(DataResponse { data: views }))
}

/* --------------------------------------------------------------------------
Site steps
-------------------------------------------------------------------------- */

/// POST /api/v1/sites/{id}/site-steps/{step_id}/media
///
/// Append media to one site-step progress entry of an `ONGOING` site. Only
/// the assigned worker may write.
pub async fn add_site_step_media(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((site_id, step_id)): Path<(DbId, DbId)>,
    Json(input): Json<MediaRequest>,
) -> AppResult<impl IntoResponse> {
    require_media(&input.media)?;

    let updated = SiteRepo::append_site_step_media(
        &state.pool,
        site_id,
        auth.user_id,
        step_id,
        &input.media,
    )
    .await?;
    if !updated {
        let Some(site) = SiteRepo::find_by_id(&state.pool, site_id).await? else {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Site",
                id: site_id,
            }));
        };
        if site.status != SiteStatus::Ongoing.as_str() {
            return Err(AppError::Core(CoreError::InvalidState {
                entity: "Site",
                id: site_id,
                expected: "ONGOING",
            }));
        }
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the assigned worker may add site-step media".into(),
        )));
    }

    tracing::info!(site_id, step_id, user_id = auth.user_id, "Site-step media added");
    Ok(StatusCode::NO_CONTENT)
}

/// One site-step row in the per-site view.
#[derive(Debug, Serialize)]
pub struct SiteStepView {
    pub site_step_id: DbId,
    pub title: String,
    pub image_url: Option<String>,
    pub media_type: String,
    pub media_urls: Vec<MediaRef>,
    pub is_uploaded: bool,
}

/// GET /api/v1/sites/{id}/site-steps
///
/// The step progress of an `ONGOING` site joined with its step templates.
pub async fn list_site_steps(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(site_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let Some(site) =
        SiteRepo::find_by_id_and_status(&state.pool, site_id, SiteStatus::Ongoing).await?
    else {
        return Err(site_guard_error(&state.pool, site_id, "ONGOING").await);
    };

    let ids: Vec<DbId> = site
        .site_step_progress
        .0
        .iter()
        .map(|e| e.site_step_id)
        .collect();
    let steps = CatalogRepo::find_active_site_steps(&state.pool, &ids).await?;

    let views: Vec<SiteStepView> = site
        .site_step_progress
        .0
        .iter()
        .filter_map(|entry| {
            let step = steps.iter().find(|s| s.id == entry.site_step_id)?;
            Some(SiteStepView {
                site_step_id: entry.site_step_id,
                title: step.title.clone(),
                image_url: step.image_url.clone(),
                media_type: step.media_type.clone(),
                media_urls: entry.media_urls.clone(),
                is_uploaded: !entry.media_urls.is_empty(),
            })
        })
        .collect();

    Ok(Json(DataResponse { data: views }))
}

/* --------------------------------------------------------------------------
Measurement book
-------------------------------------------------------------------------- */

/// POST /api/v1/sites/{id}/measurement-book
///
/// Submit measurement-book media for an `ONGOING` site; the submission
/// closes the visit out to `COMPLETED`.
pub async fn add_measurement_book(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(site_id): Path<DbId>,
    Json(input): Json<MediaRequest>,
) -> AppResult<impl IntoResponse> {
    require_media(&input.media)?;

    let updated = SiteRepo::add_measurement_book_media(&state.pool, site_id, &input.media).await?;
    if !updated {
        return Err(site_guard_error(&state.pool, site_id, "ONGOING").await);
    }

    tracing::info!(site_id, user_id = auth.user_id, "Measurement book submitted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/sites/{id}/measurement-book
pub async fn list_measurement_book(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(site_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let site = load_site(&state, site_id).await?;
    Ok(Json(DataResponse {
        data: site.measurement_book_media.0,
    }))
}

/* --------------------------------------------------------------------------
Remarks
-------------------------------------------------------------------------- */

/// Request body for `POST /api/v1/sites/{id}/remarks`.
#[derive(Debug, Deserialize)]
pub struct RemarkRequest {
    pub comment: String,
    /// Caller-asserted stage label, validated against the remark whitelist.
    pub status: String,
    #[serde(default)]
    pub media: Vec<MediaRef>,
}

/// POST /api/v1/sites/{id}/remarks
///
/// Append a remark snapshot. Remarks never touch the status machine.
pub async fn add_remark(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(site_id): Path<DbId>,
    Json(input): Json<RemarkRequest>,
) -> AppResult<impl IntoResponse> {
    if input.comment.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Remark comment must not be empty".into(),
        )));
    }
    validate_remark_status(&input.status).map_err(AppError::Core)?;

    let remark = Remark {
        comment: input.comment,
        status: input.status,
        media_urls: input.media,
    };
    let updated = SiteRepo::add_remark(&state.pool, site_id, &remark).await?;
    if !updated {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Site",
            id: site_id,
        }));
    }

    tracing::info!(site_id, user_id = auth.user_id, status = %remark.status, "Remark added");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/sites/{id}/remarks
///
/// Admin only.
pub async fn list_remarks(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(site_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    auth.require_admin()?;
    let site = load_site(&state, site_id).await?;
    Ok(Json(DataResponse {
        data: site.remarks.0,
    }))
}
