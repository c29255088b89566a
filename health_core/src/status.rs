//! Aggregated health status model and its HTTP status mapping

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Overall availability of the system or of a single check.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityStatus {
    Up,
    Down,
    Unknown,
}

impl std::fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AvailabilityStatus::Up => write!(f, "up"),
            AvailabilityStatus::Down => write!(f, "down"),
            AvailabilityStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// Result of one named check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckResult {
    pub status: AvailabilityStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckResult {
    pub fn up() -> Self {
        Self {
            status: AvailabilityStatus::Up,
            timestamp: Some(Utc::now()),
            error: None,
        }
    }

    pub fn down(error: impl Into<String>) -> Self {
        Self {
            status: AvailabilityStatus::Down,
            timestamp: Some(Utc::now()),
            error: Some(error.into()),
        }
    }

    /// A check that has not produced a result yet.
    pub fn unknown() -> Self {
        Self {
            status: AvailabilityStatus::Unknown,
            timestamp: None,
            error: None,
        }
    }
}

/// What the probe engine hands back for one request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AggregatedCheckStatus {
    pub status: AvailabilityStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<BTreeMap<String, CheckResult>>,
}

impl AggregatedCheckStatus {
    pub fn new(status: AvailabilityStatus) -> Self {
        Self {
            status,
            timestamp: Some(Utc::now()),
            checks: None,
        }
    }

    pub fn with_check(mut self, name: impl Into<String>, result: CheckResult) -> Self {
        self.checks
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), result);
        self
    }

    pub fn with_checks(mut self, checks: BTreeMap<String, CheckResult>) -> Self {
        self.checks = Some(checks);
        self
    }

    /// Drops per-check detail, keeping only the overall verdict.
    pub fn without_details(mut self) -> Self {
        self.checks = None;
        self
    }
}

/// Combines per-check statuses: `down` wins over `unknown`, which wins over `up`.
/// An empty set is `up`.
pub fn aggregate<'a, I>(statuses: I) -> AvailabilityStatus
where
    I: IntoIterator<Item = &'a AvailabilityStatus>,
{
    let mut overall = AvailabilityStatus::Up;
    for status in statuses {
        match status {
            AvailabilityStatus::Down => return AvailabilityStatus::Down,
            AvailabilityStatus::Unknown => overall = AvailabilityStatus::Unknown,
            AvailabilityStatus::Up => {}
        }
    }
    overall
}

/// Orchestrators must see a non-2xx code whenever health cannot be confirmed,
/// so `unknown` maps like `down`.
pub fn map_http_status(status: AvailabilityStatus) -> StatusCode {
    match status {
        AvailabilityStatus::Down | AvailabilityStatus::Unknown => StatusCode::SERVICE_UNAVAILABLE,
        AvailabilityStatus::Up => StatusCode::OK,
    }
}
