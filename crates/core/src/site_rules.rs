//! Creation-time domain rules for sites.
//!
//! These run before any write: a request that fails here never touches the
//! catalog usage counters or the sites table.

use crate::error::CoreError;
use crate::types::DbId;

/// Enforce `0 < min_length < max_length`. Checked at creation only; the
/// bounds are immutable afterwards.
pub fn validate_length_bounds(min_length: f64, max_length: f64) -> Result<(), CoreError> {
    if !min_length.is_finite() || !max_length.is_finite() || min_length <= 0.0 || max_length <= 0.0
    {
        return Err(CoreError::Validation(
            "min_length and max_length must both be positive".to_string(),
        ));
    }
    if min_length >= max_length {
        return Err(CoreError::Validation(
            "min_length must be strictly less than max_length".to_string(),
        ));
    }
    Ok(())
}

/// A site's worker and supervisor must be different people.
pub fn validate_distinct_actors(worker_id: DbId, supervisor_id: DbId) -> Result<(), CoreError> {
    if worker_id == supervisor_id {
        return Err(CoreError::Validation(
            "worker_id and supervisor_id must differ".to_string(),
        ));
    }
    Ok(())
}

/// Every site carries at least one work type.
pub fn validate_work_types(work_type_ids: &[DbId]) -> Result<(), CoreError> {
    if work_type_ids.is_empty() {
        return Err(CoreError::Validation(
            "At least one work type is required".to_string(),
        ));
    }
    Ok(())
}
