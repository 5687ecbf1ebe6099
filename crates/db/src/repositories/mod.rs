//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that take
//! an executor as the first argument. Status-guarded site mutations are
//! conditional single-statement updates; keyed sub-document merges lock the
//! row (`FOR UPDATE`) inside a transaction before writing back.

pub mod catalog_repo;
pub mod site_repo;

pub use catalog_repo::CatalogRepo;
pub use site_repo::SiteRepo;
