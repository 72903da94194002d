//! Assignment model: one employee on one shift in a produced schedule.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Employee, Shift};

/// The state of one slot in the produced schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    /// Chosen by the solver.
    Assigned,
    /// A required slot nobody could fill.
    Unfilled,
    /// Fixed by a manager and kept as given.
    Overridden,
}

/// One employee placed on one shift.
///
/// Room, date and times are copied from the shift so the schedule can be
/// rendered without the request at hand.
///
/// # Example
///
/// ```
/// use roster_engine::models::{Assignment, AssignmentStatus};
/// use chrono::{NaiveDate, NaiveTime};
/// use rust_decimal::Decimal;
///
/// let assignment = Assignment {
///     id: "emp_001_shift_001".to_string(),
///     employee_id: Some("emp_001".to_string()),
///     employee_name: Some("Ada".to_string()),
///     shift_id: "shift_001".to_string(),
///     room: "Infant".to_string(),
///     date: NaiveDate::from_ymd_opt(2026, 1, 12).unwrap(),
///     start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
///     end_time: NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
///     shift_type: "regular".to_string(),
///     status: AssignmentStatus::Assigned,
///     score: Decimal::ZERO,
/// };
/// assert!(assignment.is_staffed());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Stable identifier, `"{employee_id}_{shift_id}"` for staffed slots.
    pub id: String,
    /// The assigned employee; absent for unfilled slots.
    pub employee_id: Option<String>,
    /// The assigned employee's name.
    pub employee_name: Option<String>,
    /// The shift being staffed.
    pub shift_id: String,
    /// Room of the shift.
    pub room: String,
    /// Date of the shift.
    pub date: NaiveDate,
    /// Start time of the shift.
    pub start_time: NaiveTime,
    /// End time of the shift.
    pub end_time: NaiveTime,
    /// Category of the shift.
    pub shift_type: String,
    /// Whether the slot is assigned, unfilled or overridden.
    pub status: AssignmentStatus,
    /// Soft penalty attributable to this assignment; zero is ideal.
    pub score: Decimal,
}

impl Assignment {
    /// Builds a staffed assignment.
    pub fn staffed(
        employee: &Employee,
        shift: &Shift,
        status: AssignmentStatus,
        score: Decimal,
    ) -> Self {
        Self {
            id: format!("{}_{}", employee.id, shift.id),
            employee_id: Some(employee.id.clone()),
            employee_name: Some(employee.name.clone()),
            shift_id: shift.id.clone(),
            room: shift.room.clone(),
            date: shift.date,
            start_time: shift.start_time,
            end_time: shift.end_time,
            shift_type: shift.shift_type.clone(),
            status,
            score,
        }
    }

    /// Builds a placeholder for the `slot`-th missing position on a shift.
    pub fn unfilled(shift: &Shift, slot: u32) -> Self {
        Self {
            id: format!("unfilled_{}_{}", shift.id, slot),
            employee_id: None,
            employee_name: None,
            shift_id: shift.id.clone(),
            room: shift.room.clone(),
            date: shift.date,
            start_time: shift.start_time,
            end_time: shift.end_time,
            shift_type: shift.shift_type.clone(),
            status: AssignmentStatus::Unfilled,
            score: Decimal::ZERO,
        }
    }

    /// Returns true if an employee occupies this slot.
    pub fn is_staffed(&self) -> bool {
        self.status != AssignmentStatus::Unfilled && self.employee_id.is_some()
    }
}
