//! Indexed view of a request and the mutable working roster.
//!
//! The search refers to employees and shifts by their position in the
//! request. Everything that does not change during a solve is computed once
//! here.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;

use crate::config::ScoringWeights;
use crate::models::{Employee, SchedulingConstraints, SchedulingRequest, Shift};

use super::feasibility::{Infeasibility, check_feasibility};

/// Read-only problem data shared by every phase of a solve.
#[derive(Debug)]
pub(crate) struct Problem<'a> {
    pub employees: &'a [Employee],
    pub shifts: &'a [Shift],
    pub constraints: &'a SchedulingConstraints,
    pub weights: &'a ScoringWeights,
    pub shift_hours: Vec<Decimal>,
    pub ratio_needed: Vec<u32>,
    pub is_lead: Vec<bool>,
    /// `[employee][shift]`: active, skilled and available.
    pub eligible: Vec<Vec<bool>>,
    /// `[employee][shift]`: covered only by a non-preferred window.
    pub non_preferred: Vec<Vec<bool>>,
    /// Pinned `(employee, shift)` pairs in request order, without repeats.
    pub pins: Vec<(usize, usize)>,
    pinned: HashSet<(usize, usize)>,
    employee_index: HashMap<&'a str, usize>,
    shift_index: HashMap<&'a str, usize>,
}

impl<'a> Problem<'a> {
    /// Indexes a request. Pins naming unknown ids are ignored; validation
    /// reports them before a solve gets this far.
    pub fn new(request: &'a SchedulingRequest, weights: &'a ScoringWeights) -> Self {
        let employees = request.employees.as_slice();
        let shifts = request.shifts.as_slice();
        let constraints = &request.constraints;

        let employee_index: HashMap<&str, usize> = employees
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id.as_str(), i))
            .collect();
        let shift_index: HashMap<&str, usize> = shifts
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.as_str(), i))
            .collect();

        let eligible = employees
            .iter()
            .map(|e| {
                shifts
                    .iter()
                    .map(|s| {
                        e.active
                            && e.has_skills(&s.required_skills)
                            && e.window_for(s.day_of_week(), s.start_time, s.end_time)
                                .is_some()
                    })
                    .collect()
            })
            .collect();

        let non_preferred = employees
            .iter()
            .map(|e| {
                shifts
                    .iter()
                    .map(|s| {
                        e.window_for(s.day_of_week(), s.start_time, s.end_time)
                            .is_some_and(|w| !w.preferred)
                    })
                    .collect()
            })
            .collect();

        let mut pinned = HashSet::new();
        let mut pins = Vec::new();
        for pin in &request.pinned_assignments {
            let (Some(&e), Some(&s)) = (
                employee_index.get(pin.employee_id.as_str()),
                shift_index.get(pin.shift_id.as_str()),
            ) else {
                continue;
            };
            if pinned.insert((e, s)) {
                pins.push((e, s));
            }
        }

        Self {
            employees,
            shifts,
            constraints,
            weights,
            shift_hours: shifts.iter().map(Shift::duration_hours).collect(),
            ratio_needed: shifts
                .iter()
                .map(|s| s.ratio_staff_needed(constraints.child_to_staff_ratio))
                .collect(),
            is_lead: employees
                .iter()
                .map(|e| e.is_lead(&weights.lead_skills))
                .collect(),
            eligible,
            non_preferred,
            pins,
            pinned,
            employee_index,
            shift_index,
        }
    }

    pub fn employee_count(&self) -> usize {
        self.employees.len()
    }

    pub fn shift_count(&self) -> usize {
        self.shifts.len()
    }

    pub fn employee_by_id(&self, id: &str) -> Option<usize> {
        self.employee_index.get(id).copied()
    }

    pub fn shift_by_id(&self, id: &str) -> Option<usize> {
        self.shift_index.get(id).copied()
    }

    pub fn is_pinned(&self, employee: usize, shift: usize) -> bool {
        self.pinned.contains(&(employee, shift))
    }

    /// Staff a shift should reach: its required count, raised to cover the
    /// child-to-staff ratio, never above `max_staff`.
    pub fn target_staff(&self, shift: usize) -> usize {
        let s = &self.shifts[shift];
        s.required_staff
            .max(self.ratio_needed[shift])
            .min(s.max_staff) as usize
    }

    /// Whether a shift can usefully take another employee.
    pub fn wants_staff(&self, roster: &Roster, shift: usize) -> bool {
        roster.staff(shift).len() < self.target_staff(shift)
    }

    /// Runs the feasibility filter for `employee` on `shift` against the
    /// roster, ignoring `shift` itself and any shift in `vacating`.
    pub fn check(
        &self,
        roster: &Roster,
        employee: usize,
        shift: usize,
        vacating: &[usize],
    ) -> Result<(), Infeasibility> {
        let others: Vec<&Shift> = roster
            .shifts_of(employee)
            .iter()
            .filter(|&&other| other != shift && !vacating.contains(&other))
            .map(|&other| &self.shifts[other])
            .collect();
        check_feasibility(
            &self.employees[employee],
            &self.shifts[shift],
            &others,
            self.constraints,
        )
    }

    /// Static eligibility followed by the full feasibility filter.
    pub fn can_take(
        &self,
        roster: &Roster,
        employee: usize,
        shift: usize,
        vacating: &[usize],
    ) -> bool {
        self.eligible[employee][shift] && self.check(roster, employee, shift, vacating).is_ok()
    }
}

/// The working assignment set: who is on which shift.
///
/// Both directions are kept sorted so iteration order is deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Roster {
    shift_staff: Vec<Vec<usize>>,
    employee_shifts: Vec<Vec<usize>>,
}

impl Roster {
    pub fn empty(employees: usize, shifts: usize) -> Self {
        Self {
            shift_staff: vec![Vec::new(); shifts],
            employee_shifts: vec![Vec::new(); employees],
        }
    }

    pub fn staff(&self, shift: usize) -> &[usize] {
        &self.shift_staff[shift]
    }

    pub fn shifts_of(&self, employee: usize) -> &[usize] {
        &self.employee_shifts[employee]
    }

    pub fn contains(&self, employee: usize, shift: usize) -> bool {
        self.employee_shifts[employee].binary_search(&shift).is_ok()
    }

    /// Adds a pairing; returns false if it was already present.
    pub fn assign(&mut self, employee: usize, shift: usize) -> bool {
        match self.employee_shifts[employee].binary_search(&shift) {
            Ok(_) => false,
            Err(pos) => {
                self.employee_shifts[employee].insert(pos, shift);
                insert_sorted(&mut self.shift_staff[shift], employee);
                true
            }
        }
    }

    pub fn unassign(&mut self, employee: usize, shift: usize) {
        if let Ok(pos) = self.employee_shifts[employee].binary_search(&shift) {
            self.employee_shifts[employee].remove(pos);
        }
        if let Ok(pos) = self.shift_staff[shift].binary_search(&employee) {
            self.shift_staff[shift].remove(pos);
        }
    }

    /// Every `(employee, shift)` pairing, by shift then employee.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.shift_staff
            .iter()
            .enumerate()
            .flat_map(|(s, staff)| staff.iter().map(move |&e| (e, s)))
    }

    pub fn len(&self) -> usize {
        self.shift_staff.iter().map(Vec::len).sum()
    }
}

pub(crate) fn insert_sorted(list: &mut Vec<usize>, value: usize) {
    if let Err(pos) = list.binary_search(&value) {
        list.insert(pos, value);
    }
}

pub(crate) fn remove_sorted(list: &mut Vec<usize>, value: usize) {
    if let Ok(pos) = list.binary_search(&value) {
        list.remove(pos);
    }
}
