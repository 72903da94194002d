//! Structural validation of a scheduling request.
//!
//! Runs before any search. Every problem found is returned, not just the
//! first, so a caller can fix a request in one pass.

use std::collections::HashSet;

use rust_decimal::Decimal;

use crate::error::EngineError;
use crate::models::{Assignment, SchedulingRequest};

/// Checks the structural invariants of a request.
///
/// Returns every violation found: duplicate ids, empty or inverted time
/// ranges, staff counts out of order, overlapping availability, degenerate
/// constraints and pinned assignments naming unknown ids.
///
/// # Example
///
/// ```
/// use roster_engine::models::{SchedulingConstraints, SchedulingRequest};
/// use roster_engine::scheduling::validate_request;
///
/// let request = SchedulingRequest::new(vec![], vec![], SchedulingConstraints::default());
/// assert!(validate_request(&request).is_empty());
/// ```
pub fn validate_request(request: &SchedulingRequest) -> Vec<EngineError> {
    let mut errors = Vec::new();

    let mut employee_ids = HashSet::new();
    for employee in &request.employees {
        if !employee_ids.insert(employee.id.as_str()) {
            errors.push(EngineError::DuplicateEmployee {
                employee_id: employee.id.clone(),
            });
        }

        let invalid = |message: String| EngineError::InvalidEmployee {
            employee_id: employee.id.clone(),
            message,
        };

        if employee.max_hours_per_week.is_sign_negative() {
            errors.push(invalid("max_hours_per_week must not be negative".to_string()));
        }

        for (i, window) in employee.availability.iter().enumerate() {
            if window.start_time >= window.end_time {
                errors.push(invalid(format!(
                    "availability on {} starts at {} but ends at {}",
                    window.day_of_week, window.start_time, window.end_time
                )));
            }
            if employee.availability[..i].iter().any(|w| w.overlaps(window)) {
                errors.push(invalid(format!(
                    "availability windows overlap on {}",
                    window.day_of_week
                )));
            }
        }
    }

    let mut shift_ids = HashSet::new();
    for shift in &request.shifts {
        if !shift_ids.insert(shift.id.as_str()) {
            errors.push(EngineError::DuplicateShift {
                shift_id: shift.id.clone(),
            });
        }

        if shift.start_time >= shift.end_time {
            errors.push(EngineError::InvalidShift {
                shift_id: shift.id.clone(),
                message: format!(
                    "start time {} is not before end time {}",
                    shift.start_time, shift.end_time
                ),
            });
        }

        if !(shift.min_staff <= shift.required_staff && shift.required_staff <= shift.max_staff) {
            errors.push(EngineError::InvalidShift {
                shift_id: shift.id.clone(),
                message: format!(
                    "staff counts must satisfy min <= required <= max, got {} / {} / {}",
                    shift.min_staff, shift.required_staff, shift.max_staff
                ),
            });
        }
    }

    errors.extend(validate_constraints(request));

    for pin in &request.pinned_assignments {
        errors.extend(unknown_ids(
            &employee_ids,
            &shift_ids,
            &pin.employee_id,
            &pin.shift_id,
        ));
    }

    errors
}

/// Checks that seeded assignments name employees and shifts in the request.
pub fn validate_assignments(
    request: &SchedulingRequest,
    assignments: &[Assignment],
) -> Vec<EngineError> {
    let employee_ids: HashSet<&str> = request.employees.iter().map(|e| e.id.as_str()).collect();
    let shift_ids: HashSet<&str> = request.shifts.iter().map(|s| s.id.as_str()).collect();

    assignments
        .iter()
        .filter_map(|a| a.employee_id.as_deref().map(|e| (e, a.shift_id.as_str())))
        .flat_map(|(employee_id, shift_id)| {
            unknown_ids(&employee_ids, &shift_ids, employee_id, shift_id)
        })
        .collect()
}

fn unknown_ids(
    employee_ids: &HashSet<&str>,
    shift_ids: &HashSet<&str>,
    employee_id: &str,
    shift_id: &str,
) -> Vec<EngineError> {
    let mut errors = Vec::new();
    if !employee_ids.contains(employee_id) {
        errors.push(EngineError::UnknownEmployee {
            employee_id: employee_id.to_string(),
        });
    }
    if !shift_ids.contains(shift_id) {
        errors.push(EngineError::UnknownShift {
            shift_id: shift_id.to_string(),
        });
    }
    errors
}

/// Upper bound for every weekly hour and rest setting.
const HOURS_PER_WEEK: Decimal = Decimal::from_parts(168, 0, 0, false, 0);

/// Smallest non-zero ratio accepted: one adult per tenth of a child.
const MIN_CHILD_TO_STAFF_RATIO: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

fn validate_constraints(request: &SchedulingRequest) -> Vec<EngineError> {
    let c = &request.constraints;
    let mut errors = Vec::new();
    let mut reject = |field: &str, message: &str| {
        errors.push(EngineError::InvalidConstraints {
            field: field.to_string(),
            message: message.to_string(),
        })
    };

    if c.max_hours_per_week <= Decimal::ZERO {
        reject("max_hours_per_week", "must be positive");
    }
    if c.min_hours_per_week.is_sign_negative() {
        reject("min_hours_per_week", "must not be negative");
    }
    if c.min_hours_per_week > c.max_hours_per_week {
        reject("min_hours_per_week", "must not exceed max_hours_per_week");
    }
    if c.max_consecutive_days == 0 {
        reject("max_consecutive_days", "must be at least 1");
    }
    if c.min_rest_hours_between_shifts.is_sign_negative() {
        reject("min_rest_hours_between_shifts", "must not be negative");
    }
    if c.max_overtime_hours_per_week.is_sign_negative() {
        reject("max_overtime_hours_per_week", "must not be negative");
    }
    for (field, hours) in [
        ("max_hours_per_week", c.max_hours_per_week),
        ("min_hours_per_week", c.min_hours_per_week),
        ("max_overtime_hours_per_week", c.max_overtime_hours_per_week),
        ("min_rest_hours_between_shifts", c.min_rest_hours_between_shifts),
    ] {
        if hours > HOURS_PER_WEEK {
            reject(field, "must not exceed the 168 hours in a week");
        }
    }
    if c.child_to_staff_ratio.is_sign_negative() {
        reject("child_to_staff_ratio", "must not be negative");
    } else if !c.child_to_staff_ratio.is_zero() && c.child_to_staff_ratio < MIN_CHILD_TO_STAFF_RATIO
    {
        reject("child_to_staff_ratio", "must be zero or at least 0.1");
    }

    errors
}
