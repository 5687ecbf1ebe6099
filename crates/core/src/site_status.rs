//! Site lifecycle and billing status machines.
//!
//! A site moves forward through `NOT_VISITED -> PENDING -> ONGOING ->
//! COMPLETED -> SUBMITTED` and never regresses; the only permitted rollback
//! is the checkout action, which discards `PENDING`-stage media without
//! touching the status itself. Billing status is an independent track that
//! only starts once the visit lifecycle has completed.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/* --------------------------------------------------------------------------
Visit lifecycle
-------------------------------------------------------------------------- */

/// Visit lifecycle status of a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SiteStatus {
    /// Created but not yet visited by the supervisor.
    #[serde(rename = "NOT_VISITED")]
    NotVisited,
    /// Site photos submitted, waiting for the worker's checklist.
    #[serde(rename = "PENDING")]
    Pending,
    /// Checklist submitted, work in progress.
    #[serde(rename = "ONGOING")]
    Ongoing,
    /// Measurement book submitted or directly completed at photo time.
    #[serde(rename = "COMPLETED")]
    Completed,
    /// Billing fully credited. Terminal.
    #[serde(rename = "SUBMITTED")]
    Submitted,
}

impl SiteStatus {
    /// The database/API string for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            SiteStatus::NotVisited => "NOT_VISITED",
            SiteStatus::Pending => "PENDING",
            SiteStatus::Ongoing => "ONGOING",
            SiteStatus::Completed => "COMPLETED",
            SiteStatus::Submitted => "SUBMITTED",
        }
    }

    /// Parse a status string, rejecting unknown values.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "NOT_VISITED" => Ok(SiteStatus::NotVisited),
            "PENDING" => Ok(SiteStatus::Pending),
            "ONGOING" => Ok(SiteStatus::Ongoing),
            "COMPLETED" => Ok(SiteStatus::Completed),
            "SUBMITTED" => Ok(SiteStatus::Submitted),
            other => Err(CoreError::Validation(format!(
                "Invalid site status '{other}'"
            ))),
        }
    }

    /// Whether the machine allows moving from `self` to `to`.
    ///
    /// Edges: NOT_VISITED -> PENDING, NOT_VISITED -> COMPLETED (photo
    /// submission signalling completion), PENDING -> ONGOING, ONGOING ->
    /// COMPLETED, COMPLETED -> SUBMITTED. Everything else, including every
    /// backward edge, is rejected.
    pub fn can_transition_to(self, to: SiteStatus) -> bool {
        matches!(
            (self, to),
            (SiteStatus::NotVisited, SiteStatus::Pending)
                | (SiteStatus::NotVisited, SiteStatus::Completed)
                | (SiteStatus::Pending, SiteStatus::Ongoing)
                | (SiteStatus::Ongoing, SiteStatus::Completed)
                | (SiteStatus::Completed, SiteStatus::Submitted)
        )
    }

    /// No operation may move a site out of this status.
    pub fn is_terminal(self) -> bool {
        self == SiteStatus::Submitted
    }
}

impl std::fmt::Display for SiteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target status after a site-photo submission: the caller either signals
/// the visit is already complete or leaves the site waiting for its
/// checklist.
pub fn status_after_site_photos(is_complete: bool) -> SiteStatus {
    if is_complete {
        SiteStatus::Completed
    } else {
        SiteStatus::Pending
    }
}

/* --------------------------------------------------------------------------
Remark annotations
-------------------------------------------------------------------------- */

/// Status values a remark may be annotated with. This is a caller-asserted
/// label on the remark entry, not a trigger of the site's own status.
pub const VALID_REMARK_STATUSES: &[&str] = &["ONGOING", "PENDING", "COMPLETED"];

/// Validate a remark's status annotation.
pub fn validate_remark_status(status: &str) -> Result<(), CoreError> {
    if VALID_REMARK_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid remark status '{status}'. Must be one of: {}",
            VALID_REMARK_STATUSES.join(", ")
        )))
    }
}

/* --------------------------------------------------------------------------
Billing track
-------------------------------------------------------------------------- */

/// Post-completion billing status, tracked independently of the visit
/// lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillingStatus {
    #[serde(rename = "MEASUREMENT_SUBMITTED")]
    MeasurementSubmitted,
    #[serde(rename = "BILL_CREDITED")]
    BillCredited,
    #[serde(rename = "BILL_SUBMITTED")]
    BillSubmitted,
    #[serde(rename = "SES_CREDITED")]
    SesCredited,
    #[serde(rename = "AMOUNT_CREDITED")]
    AmountCredited,
}

impl BillingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BillingStatus::MeasurementSubmitted => "MEASUREMENT_SUBMITTED",
            BillingStatus::BillCredited => "BILL_CREDITED",
            BillingStatus::BillSubmitted => "BILL_SUBMITTED",
            BillingStatus::SesCredited => "SES_CREDITED",
            BillingStatus::AmountCredited => "AMOUNT_CREDITED",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "MEASUREMENT_SUBMITTED" => Ok(BillingStatus::MeasurementSubmitted),
            "BILL_CREDITED" => Ok(BillingStatus::BillCredited),
            "BILL_SUBMITTED" => Ok(BillingStatus::BillSubmitted),
            "SES_CREDITED" => Ok(BillingStatus::SesCredited),
            "AMOUNT_CREDITED" => Ok(BillingStatus::AmountCredited),
            other => Err(CoreError::Validation(format!(
                "Invalid billing status '{other}'"
            ))),
        }
    }
}

impl std::fmt::Display for BillingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check that a billing update is legal for the site's current visit
/// status. Billing is a post-completion track: a site must be `COMPLETED`
/// or `SUBMITTED` before any billing value may be set.
///
/// Returns the visit status the site should move to as a side effect of
/// the billing update (`AMOUNT_CREDITED` closes out a `COMPLETED` site).
pub fn apply_billing_update(
    current: SiteStatus,
    billing: BillingStatus,
) -> Result<SiteStatus, CoreError> {
    if current != SiteStatus::Completed && current != SiteStatus::Submitted {
        return Err(CoreError::Validation(format!(
            "Billing status can only be set on a completed site (current status {current})"
        )));
    }
    if current == SiteStatus::Completed && billing == BillingStatus::AmountCredited {
        return Ok(SiteStatus::Submitted);
    }
    Ok(current)
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
