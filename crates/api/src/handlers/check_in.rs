//! Location registration, geofenced check-in, and checkout.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use fieldops_core::error::CoreError;
use fieldops_core::geo::{within_check_in_radius, GeoPoint};
use fieldops_core::site_status::SiteStatus;
use fieldops_core::types::DbId;
use fieldops_db::models::site::CheckInEntry;
use fieldops_db::repositories::SiteRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::site_guard_error;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body carrying a single coordinate.
#[derive(Debug, Deserialize)]
pub struct LocationRequest {
    pub longitude: f64,
    pub latitude: f64,
}

impl LocationRequest {
    fn point(&self) -> Result<GeoPoint, CoreError> {
        let point = GeoPoint::new(self.longitude, self.latitude);
        point.validate()?;
        Ok(point)
    }
}

/// POST /api/v1/sites/{id}/location
///
/// Register the site's coordinate. Only legal while the site is still
/// `NOT_VISITED`; once the visit starts the location is frozen.
pub async fn register_location(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(site_id): Path<DbId>,
    Json(input): Json<LocationRequest>,
) -> AppResult<impl IntoResponse> {
    let point = input.point().map_err(AppError::Core)?;

    let updated =
        SiteRepo::set_location(&state.pool, site_id, point.longitude, point.latitude).await?;
    if !updated {
        return Err(site_guard_error(&state.pool, site_id, "NOT_VISITED").await);
    }

    tracing::info!(site_id, "Site location registered");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sites/{id}/check-in
///
/// Record a worker check-in on a `PENDING` site. The reported coordinate
/// must fall inside the check-in radius of the registered location of the
/// same `PENDING` site; a site matching on status but not on location (or
/// the other way round) is not good enough.
pub async fn check_in(
    auth: AuthUser,
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Path(site_id): Path<DbId>,
    Json(input): Json<LocationRequest>,
) -> AppResult<impl IntoResponse> {
    let reported = input.point().map_err(AppError::Core)?;

    let Some(site) =
        SiteRepo::find_by_id_and_status(&state.pool, site_id, SiteStatus::Pending).await?
    else {
        return Err(site_guard_error(&state.pool, site_id, "PENDING").await);
    };

    let registered = site.location().ok_or(AppError::Core(CoreError::NotFound {
        entity: "Site location",
        id: site_id,
    }))?;
    if !within_check_in_radius(registered, reported) {
        // Same surface as a missing location: the caller only learns that
        // no check-in-able site is here.
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Site location",
            id: site_id,
        }));
    }

    let entry = CheckInEntry {
        checked_in_at: chrono::Utc::now(),
        source_address: addr.ip().to_string(),
        longitude: reported.longitude,
        latitude: reported.latitude,
    };
    let updated = SiteRepo::add_check_in(&state.pool, site_id, &entry).await?;
    let Some(site) = updated else {
        return Err(site_guard_error(&state.pool, site_id, "PENDING").await);
    };

    tracing::info!(site_id, user_id = auth.user_id, "Worker checked in");
    Ok(Json(DataResponse { data: site }))
}

/// POST /api/v1/sites/{id}/checkout
///
/// End the current visit. On a `PENDING` site this rolls the incomplete
/// cycle back (before-site-condition photos and checklist media are
/// discarded); on any other status it is a no-op read.
pub async fn checkout(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(site_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let site = SiteRepo::checkout(&state.pool, site_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Site",
            id: site_id,
        }))?;

    tracing::info!(site_id, user_id = auth.user_id, status = %site.status, "Checkout");
    Ok(Json(DataResponse { data: site }))
}
