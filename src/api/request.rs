//! Request types for the roster engine API.
//!
//! This module defines the JSON request structure for the `/solve` endpoint.

use serde::{Deserialize, Serialize};

use crate::models::SchedulingRequest;

/// Request body for the `/solve` endpoint.
///
/// The scheduling request's fields sit at the top level of the body, next to
/// an optional time budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveRequest {
    /// Employees, shifts, constraints and pinned assignments.
    #[serde(flatten)]
    pub request: SchedulingRequest,
    /// Search budget in milliseconds. The configured default applies when
    /// absent and the configured maximum caps it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_budget_ms: Option<u64>,
}
