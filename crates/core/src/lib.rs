//! Domain layer for the field-operations site tracking backend.
//!
//! Pure types and rules only: the site status machine, geofence math,
//! caller roles, and creation-time validation. No database or HTTP
//! dependencies; `fieldops-db` and `fieldops-api` build on top of this.

pub mod error;
pub mod geo;
pub mod pagination;
pub mod roles;
pub mod site_rules;
pub mod site_status;
pub mod types;
