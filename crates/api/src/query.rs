//! Shared query parameter types for API handlers.

use serde::Deserialize;

use fieldops_core::types::DbId;

/// Filter parameters accepted by the site listing endpoints. `limit` and
/// `offset` are clamped via `fieldops_core::pagination` before reaching the
/// repository.
#[derive(Debug, Deserialize)]
pub struct SiteListParams {
    pub search: Option<String>,
    pub status: Option<String>,
    pub billing_status: Option<String>,
    pub zone_id: Option<DbId>,
    pub department_id: Option<DbId>,
    pub work_type_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
