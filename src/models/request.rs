//! The scheduling request handed to the solver.

use serde::{Deserialize, Serialize};

use super::{Employee, SchedulingConstraints, Shift};

/// A manager override fixing one employee onto one shift.
///
/// Pinned assignments are placed before construction and are never moved by
/// the local search.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PinnedAssignment {
    /// The employee being pinned.
    pub employee_id: String,
    /// The shift they are pinned to.
    pub shift_id: String,
}

/// Everything one solve needs: staff, required cover and the rules.
///
/// Owned by the caller and read-only to the solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingRequest {
    /// Staff who may be scheduled. Ids must be unique.
    pub employees: Vec<Employee>,
    /// Shifts to staff. Ids must be unique.
    pub shifts: Vec<Shift>,
    /// The global rules for this solve.
    pub constraints: SchedulingConstraints,
    /// Assignments fixed by a manager.
    #[serde(default)]
    pub pinned_assignments: Vec<PinnedAssignment>,
}

impl SchedulingRequest {
    /// Creates a request without pinned assignments.
    pub fn new(
        employees: Vec<Employee>,
        shifts: Vec<Shift>,
        constraints: SchedulingConstraints,
    ) -> Self {
        Self {
            employees,
            shifts,
            constraints,
            pinned_assignments: Vec::new(),
        }
    }
}
