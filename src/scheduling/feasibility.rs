//! Hard-constraint feasibility of a single employee/shift pairing.
//!
//! The checks run in a fixed order and stop at the first failure, so the
//! returned [`Infeasibility`] is always the earliest rule that was broken.

use std::collections::BTreeSet;

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::models::{Employee, SchedulingConstraints, Shift};

/// The first hard rule an assignment would break.
///
/// Variants are declared in check order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum Infeasibility {
    /// The employee is not active.
    #[error("employee is inactive")]
    Inactive,
    /// The employee lacks a required skill.
    #[error("employee lacks a required skill")]
    MissingSkill,
    /// No availability window covers the shift.
    #[error("employee is unavailable")]
    Unavailable,
    /// The weekly hour cap would be exceeded.
    #[error("weekly hour cap would be exceeded")]
    WeeklyHoursExceeded,
    /// The shift overlaps another of the employee's shifts.
    #[error("overlaps another assigned shift")]
    Overlap,
    /// The gap to a neighbouring shift is shorter than the minimum rest.
    #[error("insufficient rest between shifts")]
    InsufficientRest,
    /// A second shift on the same day needs split shifts to be allowed.
    #[error("split shift not allowed")]
    SplitShiftNotAllowed,
    /// The run of consecutive working days would be too long.
    #[error("too many consecutive working days")]
    TooManyConsecutiveDays,
}

/// Checks whether `employee` may legally work `shift` given the shifts they
/// already hold.
///
/// `existing` must not contain `shift` itself. Returns the first failing rule.
///
/// # Example
///
/// ```
/// use roster_engine::models::{Availability, Employee, SchedulingConstraints, Shift};
/// use roster_engine::scheduling::{Infeasibility, check_feasibility};
/// use chrono::{NaiveDate, NaiveTime, Weekday};
/// use rust_decimal::Decimal;
///
/// let employee = Employee {
///     id: "emp_001".to_string(),
///     name: "Jordan Lee".to_string(),
///     skills: Default::default(),
///     availability: vec![Availability {
///         day_of_week: Weekday::Mon,
///         start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
///         end_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
///         preferred: true,
///     }],
///     max_hours_per_week: Decimal::from(40),
///     position: "Educator".to_string(),
///     active: true,
///     accepts_split_shifts: true,
/// };
/// let shift = Shift {
///     id: "shift_pm".to_string(),
///     date: NaiveDate::from_ymd_opt(2026, 1, 12).unwrap(), // a Monday
///     start_time: NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
///     end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
///     room: "Infant".to_string(),
///     required_skills: Default::default(),
///     required_staff: 1,
///     min_staff: 1,
///     max_staff: 1,
///     shift_type: "regular".to_string(),
///     expected_children: 0,
/// };
///
/// let result = check_feasibility(&employee, &shift, &[], &SchedulingConstraints::default());
/// assert_eq!(result, Err(Infeasibility::Unavailable));
/// ```
pub fn check_feasibility(
    employee: &Employee,
    shift: &Shift,
    existing: &[&Shift],
    constraints: &SchedulingConstraints,
) -> Result<(), Infeasibility> {
    if !employee.active {
        return Err(Infeasibility::Inactive);
    }

    if !employee.has_skills(&shift.required_skills) {
        return Err(Infeasibility::MissingSkill);
    }

    if employee
        .window_for(shift.day_of_week(), shift.start_time, shift.end_time)
        .is_none()
    {
        return Err(Infeasibility::Unavailable);
    }

    let week = shift.week();
    let week_hours: Decimal = existing
        .iter()
        .filter(|other| other.week() == week)
        .map(|other| other.duration_hours())
        .sum();
    if week_hours + shift.duration_hours() > constraints.hard_cap(employee.max_hours_per_week) {
        return Err(Infeasibility::WeeklyHoursExceeded);
    }

    check_neighbours(employee, shift, existing, constraints)?;

    if consecutive_run(shift.date, existing) > constraints.max_consecutive_days {
        return Err(Infeasibility::TooManyConsecutiveDays);
    }

    Ok(())
}

/// Returns true if `employee` may legally work `shift`.
pub fn is_feasible(
    employee: &Employee,
    shift: &Shift,
    existing: &[&Shift],
    constraints: &SchedulingConstraints,
) -> bool {
    check_feasibility(employee, shift, existing, constraints).is_ok()
}

/// Overlap, split-shift and rest rules against every nearby shift.
fn check_neighbours(
    employee: &Employee,
    shift: &Shift,
    existing: &[&Shift],
    constraints: &SchedulingConstraints,
) -> Result<(), Infeasibility> {
    let min_rest = constraints.min_rest_minutes();

    for other in existing {
        let Some(gap) = shift.gap_minutes(other) else {
            return Err(Infeasibility::Overlap);
        };

        let day_distance = (other.date - shift.date).num_days().abs();
        if day_distance > 1 {
            continue;
        }

        if day_distance == 0
            && gap > 0
            && !(constraints.allow_split_shifts && employee.accepts_split_shifts)
        {
            return Err(Infeasibility::SplitShiftNotAllowed);
        }

        if Decimal::from(gap) < min_rest {
            return Err(Infeasibility::InsufficientRest);
        }
    }

    Ok(())
}

/// Length of the run of worked days through `date` if `date` is worked.
fn consecutive_run(date: NaiveDate, existing: &[&Shift]) -> u32 {
    let worked: BTreeSet<NaiveDate> = existing.iter().map(|s| s.date).collect();

    let mut run = 1;
    let mut cursor = date;
    while let Some(prev) = cursor.checked_sub_days(Days::new(1)) {
        if !worked.contains(&prev) {
            break;
        }
        run += 1;
        cursor = prev;
    }

    cursor = date;
    while let Some(next) = cursor.checked_add_days(Days::new(1)) {
        if !worked.contains(&next) {
            break;
        }
        run += 1;
        cursor = next;
    }

    run
}
