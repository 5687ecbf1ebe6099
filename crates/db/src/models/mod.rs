//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - `FromRow` + `Serialize` entity structs matching the database rows
//! - `Deserialize` create/input DTOs
//! - Filter structs for list queries

pub mod catalog;
pub mod site;
