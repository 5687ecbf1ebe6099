//! Site aggregate model and DTOs.
//!
//! The progress sub-collections are value types embedded in the row as
//! JSONB arrays (`sqlx::types::Json`); they are never stored or referenced
//! outside their owning site.

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use fieldops_core::geo::GeoPoint;
use fieldops_core::types::{DbId, Timestamp};

/* --------------------------------------------------------------------------
Embedded sub-documents
-------------------------------------------------------------------------- */

/// A stored media reference. The bytes live in object storage; this layer
/// only keeps the issued URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRef {
    pub url: String,
}

/// Per-site progress entry for one checklist catalog item. The entry set is
/// snapshotted at creation; only `media_urls` is ever mutated, append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistProgressEntry {
    pub checklist_item_id: DbId,
    #[serde(default)]
    pub media_urls: Vec<MediaRef>,
}

/// Per-site progress entry for one selected site step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteStepProgressEntry {
    pub site_step_id: DbId,
    #[serde(default)]
    pub media_urls: Vec<MediaRef>,
}

/// An append-only remark snapshot. `status` is a caller-asserted label,
/// validated against the remark whitelist, not the site's own status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Remark {
    pub comment: String,
    pub status: String,
    #[serde(default)]
    pub media_urls: Vec<MediaRef>,
}

/// One recorded worker check-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInEntry {
    pub checked_in_at: Timestamp,
    pub source_address: String,
    pub longitude: f64,
    pub latitude: f64,
}

/* --------------------------------------------------------------------------
Entity
-------------------------------------------------------------------------- */

/// A site row from the `sites` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Site {
    pub id: DbId,
    pub name: String,
    pub address: String,
    pub worker_id: DbId,
    pub supervisor_id: DbId,
    pub department_id: DbId,
    pub zone_id: DbId,
    pub work_type_ids: Vec<DbId>,
    pub status: String,
    pub billing_status: Option<String>,
    pub min_length: f64,
    pub max_length: f64,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub checklist_progress: Json<Vec<ChecklistProgressEntry>>,
    pub site_step_progress: Json<Vec<SiteStepProgressEntry>>,
    pub site_photos: Json<Vec<MediaRef>>,
    pub before_site_condition_photos: Json<Vec<MediaRef>>,
    pub measurement_book_media: Json<Vec<MediaRef>>,
    pub remarks: Json<Vec<Remark>>,
    pub user_check_ins: Json<Vec<CheckInEntry>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Site {
    /// The registered location, if one has been set.
    pub fn location(&self) -> Option<GeoPoint> {
        match (self.longitude, self.latitude) {
            (Some(lon), Some(lat)) => Some(GeoPoint::new(lon, lat)),
            _ => None,
        }
    }
}

/// Summary row for site listings (admin and field views).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SiteSummary {
    pub id: DbId,
    pub name: String,
    pub address: String,
    pub worker_id: DbId,
    pub supervisor_id: DbId,
    pub department_id: DbId,
    pub zone_id: DbId,
    pub status: String,
    pub billing_status: Option<String>,
    pub min_length: f64,
    pub max_length: f64,
    pub created_at: Timestamp,
}

/* --------------------------------------------------------------------------
Create / input DTOs
-------------------------------------------------------------------------- */

/// Input for creating a new site. The checklist snapshot is not part of the
/// input; it is taken from the active catalog at creation time.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSite {
    pub name: String,
    pub address: String,
    pub worker_id: DbId,
    pub supervisor_id: DbId,
    pub department_id: DbId,
    pub zone_id: DbId,
    pub work_type_ids: Vec<DbId>,
    pub min_length: f64,
    pub max_length: f64,
    /// Explicitly selected step templates; a subset of the catalog, may be
    /// empty.
    #[serde(default)]
    pub site_step_ids: Vec<DbId>,
}

/// One checklist media submission entry. Entries whose
/// `checklist_item_id` matches no progress entry are silently dropped.
#[derive(Debug, Clone, Deserialize)]
pub struct ChecklistMediaEntry {
    pub checklist_item_id: DbId,
    pub url: String,
}

/// Filters for site listings. `actor_id` scopes results to sites where the
/// caller is the worker or the supervisor (non-admin callers).
#[derive(Debug, Clone, Default)]
pub struct SiteFilter {
    pub search: Option<String>,
    pub status: Option<String>,
    pub billing_status: Option<String>,
    pub zone_id: Option<DbId>,
    pub department_id: Option<DbId>,
    pub work_type_id: Option<DbId>,
    pub actor_id: Option<DbId>,
}

/// A listing page plus the unpaginated total.
#[derive(Debug, Serialize)]
pub struct SitePage {
    pub results: Vec<SiteSummary>,
    pub total: i64,
}
