//! Caller roles and role-scoped listing rules.
//!
//! Identity and token issuance live outside this system; every operation
//! receives an already-verified `{ caller id, role }` pair and trusts it.

use crate::error::CoreError;
use crate::site_status::SiteStatus;

/// Role attached to an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Field worker assigned to sites.
    Worker,
    /// Site supervisor.
    Supervisor,
    /// Back-office administrator.
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Worker => "worker",
            Role::Supervisor => "supervisor",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "worker" => Ok(Role::Worker),
            "supervisor" => Ok(Role::Supervisor),
            "admin" => Ok(Role::Admin),
            other => Err(CoreError::Unauthorized(format!("Unknown role '{other}'"))),
        }
    }

    /// Statuses this role may filter site listings by. Admins are
    /// unrestricted (`None`).
    pub fn listable_statuses(self) -> Option<&'static [SiteStatus]> {
        match self {
            Role::Worker => Some(&[
                SiteStatus::Pending,
                SiteStatus::Ongoing,
                SiteStatus::Completed,
                SiteStatus::Submitted,
            ]),
            Role::Supervisor => Some(&[
                SiteStatus::NotVisited,
                SiteStatus::Pending,
                SiteStatus::Ongoing,
                SiteStatus::Completed,
            ]),
            Role::Admin => None,
        }
    }

    /// Status a listing defaults to when the caller does not pass one.
    /// Supervisors start from unvisited sites, workers from sites waiting
    /// on their checklist; admins see everything.
    pub fn default_list_status(self) -> Option<SiteStatus> {
        match self {
            Role::Worker => Some(SiteStatus::Pending),
            Role::Supervisor => Some(SiteStatus::NotVisited),
            Role::Admin => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve the status filter for a site listing: validate an explicit
/// choice against the caller's allowed set, or fall back to the role
/// default.
pub fn resolve_list_status(
    role: Role,
    requested: Option<SiteStatus>,
) -> Result<Option<SiteStatus>, CoreError> {
    let status = match requested {
        Some(s) => Some(s),
        None => role.default_list_status(),
    };
    if let (Some(s), Some(allowed)) = (status, role.listable_statuses()) {
        if !allowed.contains(&s) {
            return Err(CoreError::Validation(format!(
                "Status {s} is not listable by role {role}"
            )));
        }
    }
    Ok(status)
}
