//! Catalog entity models: zones, departments, work types, checklist items,
//! site steps.
//!
//! Catalog records are administered by an external service; this layer only
//! reads active records and bumps their usage counters when a site is
//! created.

use serde::Serialize;
use sqlx::FromRow;

use fieldops_core::types::{DbId, Timestamp};

/// A zone, department, or work type row. The three tables share one shape.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CatalogEntry {
    pub id: DbId,
    pub name: String,
    pub is_active: bool,
    /// Number of sites referencing this record. Incremented atomically at
    /// site creation, never recomputed.
    pub site_count: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A checklist catalog item (`checklist_items` table).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ChecklistItem {
    pub id: DbId,
    pub title: String,
    pub image_url: Option<String>,
    pub media_type: String,
    pub is_optional: bool,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A site step template (`site_steps` table).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SiteStep {
    pub id: DbId,
    pub title: String,
    pub image_url: Option<String>,
    pub media_type: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
