use crate::types::DbId;

/// Domain-level error taxonomy shared by the db and api layers.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// The entity exists but is not in the status the operation requires.
    #[error("{entity} with id {id} is not in status {expected}")]
    InvalidState {
        entity: &'static str,
        id: DbId,
        expected: &'static str,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// A referenced catalog record is missing or inactive.
    #[error("Invalid reference: {0}")]
    Reference(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
