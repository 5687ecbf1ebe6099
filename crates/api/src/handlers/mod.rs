//! HTTP handlers, one module per concern.

pub mod check_in;
pub mod site_media;
pub mod sites;

use fieldops_core::error::CoreError;
use fieldops_core::types::DbId;
use fieldops_db::repositories::SiteRepo;
use fieldops_db::DbPool;

use crate::error::AppError;

/// Resolve the error for a status-guarded site update that matched no row:
/// `NotFound` when the site does not exist at all, `InvalidState` when it
/// exists but is not in the status the operation requires.
pub(crate) async fn site_guard_error(
    pool: &DbPool,
    id: DbId,
    expected: &'static str,
) -> AppError {
    match SiteRepo::exists(pool, id).await {
        Ok(true) => AppError::Core(CoreError::InvalidState {
            entity: "Site",
            id,
            expected,
        }),
        Ok(false) => AppError::Core(CoreError::NotFound { entity: "Site", id }),
        Err(err) => AppError::Database(err),
    }
}
