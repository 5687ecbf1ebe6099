pub mod health;
pub mod sites;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /sites                                    create (admin), filtered listing
/// /sites/{id}                               full aggregate
/// /sites/{id}/billing-status                billing track (admin)
/// /sites/{id}/location                      register coordinate
/// /sites/{id}/check-in                      geofenced check-in
/// /sites/{id}/checkout                      end visit / rollback
/// /sites/{id}/photos                        site photos
/// /sites/{id}/before-site-condition         worker's before photos
/// /sites/{id}/checklist-media               checklist submission
/// /sites/{id}/checklist                     checklist view
/// /sites/{id}/site-steps/{step_id}/media    step media
/// /sites/{id}/site-steps                    step view
/// /sites/{id}/measurement-book              measurement book
/// /sites/{id}/remarks                       remarks (GET admin only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/sites", sites::router())
}
