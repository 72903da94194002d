//! Solve result models.
//!
//! This module contains the [`SchedulingResult`] type and its associated
//! structures that capture everything a solve produces: the schedule, its
//! score breakdown, warnings, errors and search statistics.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Assignment;

/// Terminal status of a solve.
///
/// # Example
///
/// ```
/// use roster_engine::models::SolveStatus;
///
/// assert_eq!(serde_json::to_string(&SolveStatus::TimedOut).unwrap(), "\"timed_out\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    /// No hard violations and every shift has its required staff.
    Optimal,
    /// No hard violations, but some shift is below its required staff.
    Feasible,
    /// A hard violation or a shortfall below minimum staff remains, or the
    /// request was structurally invalid.
    Infeasible,
    /// The time budget ran out during improvement.
    TimedOut,
}

impl std::fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveStatus::Optimal => write!(f, "optimal"),
            SolveStatus::Feasible => write!(f, "feasible"),
            SolveStatus::Infeasible => write!(f, "infeasible"),
            SolveStatus::TimedOut => write!(f, "timed_out"),
        }
    }
}

/// Severity of a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Cosmetic or preference-level issue.
    Low,
    /// Worth a manager's attention.
    Medium,
    /// A compliance concern.
    High,
}

/// A soft violation left in the schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleWarning {
    /// A code identifying the type of warning (e.g. "NON_PREFERRED_SLOT").
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// How serious the warning is.
    pub severity: Severity,
    /// The employee concerned, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    /// The shift concerned, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shift_id: Option<String>,
}

/// A shift that could not be staffed, or a reason the request was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleError {
    /// A code identifying the type of error (e.g. "SHIFT_UNDERSTAFFED").
    pub code: String,
    /// A human-readable description of the error.
    pub message: String,
    /// The shift concerned, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shift_id: Option<String>,
    /// Missing staff below the shift's minimum.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortfall: Option<u32>,
}

/// Every term of the score, so callers can see where the penalty comes from.
///
/// `hard` is the sum of the hard terms and `soft` the sum of the soft terms.
/// Lower is better for both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Total hard penalty; zero for a valid schedule.
    pub hard: i64,
    /// Total soft penalty.
    pub soft: Decimal,
    /// Hard penalty for staff missing below `min_staff`.
    pub min_staff_shortfall: i64,
    /// Hard penalty for staffed rooms without a lead.
    pub missing_lead: i64,
    /// Hard penalty for child-to-staff ratio shortfalls.
    pub ratio_shortfall_hard: i64,
    /// Soft penalty for staff missing below `required_staff`.
    pub required_staff_shortfall: Decimal,
    /// Soft penalty for assignments in non-preferred windows.
    pub non_preferred: Decimal,
    /// Soft penalty for overtime hours.
    pub overtime: Decimal,
    /// Soft penalty for uneven shift counts across employees.
    pub imbalance: Decimal,
    /// Soft penalty for staff above `required_staff`.
    pub overstaffing: Decimal,
    /// Soft penalty for ratio shortfalls under soft enforcement.
    pub ratio_shortfall_soft: Decimal,
}

/// Number of applied moves of each kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveCounts {
    /// Two employees exchanged shifts.
    pub swap: u32,
    /// An employee moved to an understaffed shift.
    #[serde(rename = "move")]
    pub relocate: u32,
    /// An idle employee added to an understaffed shift.
    pub insert: u32,
    /// An assigned employee replaced by another.
    pub reassign: u32,
    /// A short shift filled by moving staff along a chain of shifts.
    #[serde(default)]
    pub chain: u32,
}

impl MoveCounts {
    /// Total applied moves.
    pub fn total(&self) -> u32 {
        self.swap + self.relocate + self.insert + self.reassign + self.chain
    }
}

/// How the search went.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveStatistics {
    /// Neighborhood scans performed during improvement.
    pub iterations: u32,
    /// Candidate moves scored.
    pub moves_evaluated: u64,
    /// Moves applied, by kind.
    pub moves_applied: MoveCounts,
    /// Shifts left below minimum staff after construction.
    pub construction_gaps: u32,
    /// Whether the time budget stopped the search.
    pub budget_exhausted: bool,
    /// Whether the iteration cap stopped the search.
    pub iteration_limit_reached: bool,
}

/// The complete output of one solve. Never mutated after return.
///
/// # Example
///
/// ```
/// use roster_engine::models::{SchedulingResult, ScoreBreakdown, SolveStatistics, SolveStatus};
/// use rust_decimal::Decimal;
///
/// let result = SchedulingResult {
///     assignments: vec![],
///     total_score: Decimal::ZERO,
///     status: SolveStatus::Optimal,
///     solving_time_ms: 3,
///     warnings: vec![],
///     errors: vec![],
///     score: ScoreBreakdown::default(),
///     statistics: SolveStatistics::default(),
/// };
/// assert!(result.is_usable());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingResult {
    /// The schedule, ordered by date, room and start time.
    pub assignments: Vec<Assignment>,
    /// Single-number summary: the negated sum of hard and soft penalties, so
    /// zero is perfect and higher is better.
    pub total_score: Decimal,
    /// Terminal status.
    pub status: SolveStatus,
    /// Wall-clock solving time in milliseconds.
    pub solving_time_ms: u64,
    /// Soft violations left in the schedule.
    pub warnings: Vec<ScheduleWarning>,
    /// Shifts below minimum staff, or structural problems with the request.
    pub errors: Vec<ScheduleError>,
    /// Per-term score breakdown.
    pub score: ScoreBreakdown,
    /// Search statistics.
    pub statistics: SolveStatistics,
}

impl SchedulingResult {
    /// Returns true if the schedule can be published without hard violations.
    pub fn is_usable(&self) -> bool {
        matches!(self.status, SolveStatus::Optimal | SolveStatus::Feasible)
    }

    /// Returns the staffed assignments for one shift.
    pub fn assignments_for<'a>(&'a self, shift_id: &'a str) -> impl Iterator<Item = &'a Assignment> {
        self.assignments
            .iter()
            .filter(move |a| a.shift_id == shift_id && a.is_staffed())
    }

    /// Returns the error recorded for a shift, if any.
    pub fn error_for(&self, shift_id: &str) -> Option<&ScheduleError> {
        self.errors
            .iter()
            .find(|e| e.shift_id.as_deref() == Some(shift_id))
    }
}
