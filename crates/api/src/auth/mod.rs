//! Token validation.
//!
//! Session issuance lives in an external identity service; this layer only
//! verifies the HS256 access tokens it hands out and extracts the caller's
//! id and role.

pub mod jwt;
