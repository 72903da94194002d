//! Property tests for the feasibility filter and the solver.

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::{Datelike, Days, NaiveDate, NaiveTime, Weekday};
use proptest::prelude::*;
use rust_decimal::Decimal;

use roster_engine::config::EngineConfig;
use roster_engine::models::{
    Availability, Employee, SchedulingConstraints, SchedulingRequest, Shift, SolveStatus,
};
use roster_engine::scheduling::{check_feasibility, solve};

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn time(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, 0, 0).unwrap()
}

/// 2026-01-12 is a Monday.
fn day(offset: u64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 12)
        .unwrap()
        .checked_add_days(Days::new(offset))
        .unwrap()
}

fn employee(id: String, skills: &[String], availability: Vec<Availability>) -> Employee {
    Employee {
        name: format!("Employee {}", id),
        id,
        skills: skills.iter().cloned().collect(),
        availability,
        max_hours_per_week: Decimal::from(40),
        position: "Educator".to_string(),
        active: true,
        accepts_split_shifts: true,
    }
}

fn shift(id: String, offset: u64, start: u32, hours: u32) -> Shift {
    Shift {
        id,
        date: day(offset),
        start_time: time(start),
        end_time: time(start + hours),
        room: "Infant".to_string(),
        required_skills: BTreeSet::new(),
        required_staff: 1,
        min_staff: 1,
        max_staff: 1,
        shift_type: "regular".to_string(),
        expected_children: 0,
    }
}

fn always_available() -> Vec<Availability> {
    WEEK.iter()
        .map(|&day_of_week| Availability {
            day_of_week,
            start_time: time(0),
            end_time: NaiveTime::from_hms_opt(23, 59, 59).unwrap(),
            preferred: true,
        })
        .collect()
}

fn shift_strategy() -> impl Strategy<Value = (u64, u32, u32)> {
    (0u64..5, 6u32..15, 1u32..5)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Every shift has a dedicated specialist who holds its only required
    /// skill and is available exactly for it, so the solver can always staff
    /// every shift.
    #[test]
    fn feasible_by_construction_is_never_infeasible(
        layouts in proptest::collection::vec(shift_strategy(), 1..8)
    ) {
        let mut employees = Vec::new();
        let mut shifts = Vec::new();
        for (i, &(offset, start, hours)) in layouts.iter().enumerate() {
            let skill = format!("skill_{}", i);
            let mut s = shift(format!("shift_{}", i), offset, start, hours);
            s.required_skills.insert(skill.clone());
            employees.push(employee(
                format!("specialist_{}", i),
                &[skill],
                vec![Availability {
                    day_of_week: s.date.weekday(),
                    start_time: s.start_time,
                    end_time: s.end_time,
                    preferred: true,
                }],
            ));
            shifts.push(s);
        }
        let request = SchedulingRequest::new(employees, shifts, SchedulingConstraints::default());

        let result = solve(&request, &EngineConfig::default(), Duration::from_secs(10));

        prop_assert_ne!(result.status, SolveStatus::Infeasible);
        prop_assert!(result.errors.is_empty());
        for i in 0..layouts.len() {
            let shift_id = format!("shift_{}", i);
            prop_assert_eq!(result.assignments_for(&shift_id).count(), 1);
        }
    }

    /// All shifts overlap, so each employee works at most one. Employee `i`
    /// can always cover shift `i`, and may also qualify for others, so
    /// staff compete for shifts and early greedy choices can block later
    /// ones.
    #[test]
    fn competing_staff_still_cover_every_shift(
        shapes in proptest::collection::vec((8u32..11, 4u32..7), 2..7),
        extra in proptest::collection::vec(proptest::collection::vec(any::<bool>(), 7), 7),
    ) {
        let n = shapes.len();
        let shifts: Vec<Shift> = shapes
            .iter()
            .enumerate()
            .map(|(i, &(start, hours))| {
                let mut s = shift(format!("shift_{}", i), 0, start, hours);
                s.required_skills.insert(format!("skill_{}", i));
                s
            })
            .collect();
        let employees: Vec<Employee> = (0..n)
            .map(|i| {
                let skills: Vec<String> = (0..n)
                    .filter(|&j| j == i || extra[i][j])
                    .map(|j| format!("skill_{}", j))
                    .collect();
                employee(format!("emp_{}", i), &skills, always_available())
            })
            .collect();
        let request = SchedulingRequest::new(employees, shifts, SchedulingConstraints::default());

        let result = solve(&request, &EngineConfig::default(), Duration::from_secs(10));

        prop_assert_eq!(result.status, SolveStatus::Optimal);
        prop_assert!(result.errors.is_empty());
        for i in 0..n {
            let shift_id = format!("shift_{}", i);
            prop_assert_eq!(result.assignments_for(&shift_id).count(), 1);
        }
    }

    /// Checking `a` against an existing `b` gives the same verdict as
    /// checking `b` against an existing `a`.
    #[test]
    fn feasibility_is_symmetric_between_two_shifts(
        (day_a, start_a, len_a) in (0u64..3, 0u32..20, 1u32..5),
        (day_b, start_b, len_b) in (0u64..3, 0u32..20, 1u32..5),
        rest_hours in 0i64..13,
        allow_split_shifts in any::<bool>(),
        accepts_split_shifts in any::<bool>(),
    ) {
        let a = shift("a".to_string(), day_a, start_a, len_a);
        let b = shift("b".to_string(), day_b, start_b, len_b);
        let mut e = employee("emp".to_string(), &[], always_available());
        e.accepts_split_shifts = accepts_split_shifts;
        let constraints = SchedulingConstraints {
            min_rest_hours_between_shifts: Decimal::from(rest_hours),
            allow_split_shifts,
            ..SchedulingConstraints::default()
        };

        prop_assert_eq!(
            check_feasibility(&e, &a, &[&b], &constraints),
            check_feasibility(&e, &b, &[&a], &constraints)
        );
    }

    /// Allowing more staff on a shift never leaves it with a larger hard
    /// penalty.
    #[test]
    fn raising_max_staff_never_raises_hard_score(
        staff in proptest::collection::vec((any::<bool>(), any::<bool>()), 1..6),
        min_staff in 0u32..2,
        required_extra in 0u32..2,
        max_extra in 0u32..2,
        raise in 1u32..3,
        expected_children in 0u32..17,
        require_lead in any::<bool>(),
    ) {
        let employees = staff
            .iter()
            .enumerate()
            .map(|(i, &(is_lead, available))| {
                let skills = if is_lead { vec!["lead".to_string()] } else { vec![] };
                let day_of_week = if available { Weekday::Mon } else { Weekday::Tue };
                employee(
                    format!("emp_{}", i),
                    &skills,
                    vec![Availability {
                        day_of_week,
                        start_time: time(7),
                        end_time: time(18),
                        preferred: true,
                    }],
                )
            })
            .collect::<Vec<_>>();

        let mut s = shift("shift_0".to_string(), 0, 9, 4);
        s.min_staff = min_staff;
        s.required_staff = min_staff + required_extra;
        s.max_staff = s.required_staff + max_extra;
        s.expected_children = expected_children;

        let constraints = SchedulingConstraints {
            require_lead_teacher_per_room: require_lead,
            child_to_staff_ratio: Decimal::from(4),
            ..SchedulingConstraints::default()
        };
        let low = SchedulingRequest::new(employees.clone(), vec![s.clone()], constraints.clone());
        s.max_staff += raise;
        let high = SchedulingRequest::new(employees, vec![s], constraints);

        let config = EngineConfig::default();
        let low = solve(&low, &config, Duration::from_secs(10));
        let high = solve(&high, &config, Duration::from_secs(10));

        prop_assert!(high.score.hard <= low.score.hard);
    }
}
