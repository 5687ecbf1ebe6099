//! Route definitions for the site aggregate.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{check_in, site_media, sites};
use crate::state::AppState;

/// Site routes, mounted at `/sites`.
///
/// ```text
/// POST   /                                      create_site (admin)
/// GET    /                                      list_sites
/// GET    /{id}                                  get_site
/// PUT    /{id}/billing-status                   update_billing_status (admin)
///
/// POST   /{id}/location                         register_location
/// POST   /{id}/verify-location                  register_location (alias)
/// POST   /{id}/check-in                         check_in
/// POST   /{id}/checkout                         checkout
///
/// POST   /{id}/photos                           add_site_photos
/// GET    /{id}/photos                           list_site_photos
/// POST   /{id}/before-site-condition            add_before_site_condition
/// GET    /{id}/before-site-condition            list_before_site_condition
/// POST   /{id}/checklist-media                  add_checklist_media
/// GET    /{id}/checklist                        list_site_checklist
/// POST   /{id}/site-steps/{step_id}/media       add_site_step_media
/// GET    /{id}/site-steps                       list_site_steps
/// POST   /{id}/measurement-book                 add_measurement_book
/// GET    /{id}/measurement-book                 list_measurement_book
/// POST   /{id}/remarks                          add_remark
/// GET    /{id}/remarks                          list_remarks (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(sites::create_site).get(sites::list_sites))
        .route("/{id}", get(sites::get_site))
        .route("/{id}/billing-status", put(sites::update_billing_status))
        .route("/{id}/location", post(check_in::register_location))
        // Historical field-app path for the same operation.
        .route("/{id}/verify-location", post(check_in::register_location))
        .route("/{id}/check-in", post(check_in::check_in))
        .route("/{id}/checkout", post(check_in::checkout))
        .route(
            "/{id}/photos",
            post(site_media::add_site_photos).get(site_media::list_site_photos),
        )
        .route(
            "/{id}/before-site-condition",
            post(site_media::add_before_site_condition)
                .get(site_media::list_before_site_condition),
        )
        .route("/{id}/checklist-media", post(site_media::add_checklist_media))
        .route("/{id}/checklist", get(site_media::list_site_checklist))
        .route(
            "/{id}/site-steps/{step_id}/media",
            post(site_media::add_site_step_media),
        )
        .route("/{id}/site-steps", get(site_media::list_site_steps))
        .route(
            "/{id}/measurement-book",
            post(site_media::add_measurement_book).get(site_media::list_measurement_book),
        )
        .route(
            "/{id}/remarks",
            post(site_media::add_remark).get(site_media::list_remarks),
        )
}
