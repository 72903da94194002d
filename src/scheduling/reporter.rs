//! Packaging of a finished roster into a [`SchedulingResult`].
//!
//! The reporter is a pure transformation: it reads the problem and the final
//! roster and never changes either.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::models::{
    Assignment, AssignmentStatus, RatioEnforcement, ScheduleError, ScheduleWarning,
    SchedulingResult, ScoreBreakdown, Severity, SolveStatistics, SolveStatus,
};

use super::feasibility::Infeasibility;
use super::problem::{Problem, Roster};
use super::scorer::{SCORE_SCALE, ShiftTerms, breakdown, weekly_hours};

pub(crate) struct Reporter<'p, 'a> {
    problem: &'p Problem<'a>,
    config: &'p EngineConfig,
}

impl<'p, 'a> Reporter<'p, 'a> {
    pub fn new(problem: &'p Problem<'a>, config: &'p EngineConfig) -> Self {
        Self { problem, config }
    }

    pub fn report(
        &self,
        roster: &Roster,
        status: SolveStatus,
        statistics: SolveStatistics,
        solving_time_ms: u64,
    ) -> SchedulingResult {
        let score = breakdown(self.problem, roster);

        let mut warnings = Vec::new();
        let mut errors = Vec::new();
        for shift in self.shift_order() {
            self.shift_findings(roster, shift, &mut warnings, &mut errors);
        }
        for employee in 0..self.problem.employee_count() {
            self.employee_findings(roster, employee, &mut warnings);
        }
        self.pin_findings(roster, &mut warnings);

        SchedulingResult {
            assignments: self.assignments(roster),
            total_score: total_score(&score),
            status,
            solving_time_ms,
            warnings,
            errors,
            score,
            statistics,
        }
    }

    /// Staffed assignments, plus unfilled placeholders when configured,
    /// ordered by date, room, start, shift and employee.
    fn assignments(&self, roster: &Roster) -> Vec<Assignment> {
        let problem = self.problem;
        let shares = self.overtime_shares(roster);

        let mut assignments: Vec<Assignment> = roster
            .pairs()
            .map(|(e, s)| {
                let status = if problem.is_pinned(e, s) {
                    AssignmentStatus::Overridden
                } else {
                    AssignmentStatus::Assigned
                };
                let mut score = shares.get(&(e, s)).copied().unwrap_or_default();
                if problem.non_preferred[e][s] {
                    score += problem.weights.non_preferred_slot;
                }
                Assignment::staffed(
                    &problem.employees[e],
                    &problem.shifts[s],
                    status,
                    score.round_dp(SCORE_SCALE),
                )
            })
            .collect();

        if self.config.solver.report_unfilled_slots {
            for (s, shift) in problem.shifts.iter().enumerate() {
                let staffed = roster.staff(s).len() as u32;
                for slot in staffed + 1..=shift.required_staff {
                    assignments.push(Assignment::unfilled(shift, slot));
                }
            }
        }

        assignments.sort_by(|a, b| {
            (a.date, &a.room, a.start_time, &a.shift_id, &a.employee_id).cmp(&(
                b.date,
                &b.room,
                b.start_time,
                &b.shift_id,
                &b.employee_id,
            ))
        });
        assignments
    }

    /// Weighted overtime attributed to each `(employee, shift)`, filling each
    /// week in chronological order.
    fn overtime_shares(&self, roster: &Roster) -> BTreeMap<(usize, usize), Decimal> {
        let problem = self.problem;
        let mut shares = BTreeMap::new();

        for e in 0..problem.employee_count() {
            let cap = problem
                .constraints
                .regular_cap(problem.employees[e].max_hours_per_week);
            let mut shifts = roster.shifts_of(e).to_vec();
            shifts.sort_by_key(|&s| problem.shifts[s].start());

            let mut worked: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();
            for s in shifts {
                let week = problem.shifts[s].week();
                let before = worked.entry((week.year(), week.week())).or_default();
                let after = *before + problem.shift_hours[s];
                let over = (after - cap).max(Decimal::ZERO) - (*before - cap).max(Decimal::ZERO);
                *before = after;
                if over > Decimal::ZERO {
                    shares.insert((e, s), over * problem.weights.overtime_per_hour);
                }
            }
        }

        shares
    }

    fn shift_order(&self) -> Vec<usize> {
        let shifts = self.problem.shifts;
        let mut order: Vec<usize> = (0..shifts.len()).collect();
        order.sort_by(|&a, &b| {
            let (sa, sb) = (&shifts[a], &shifts[b]);
            (sa.date, &sa.room, sa.start_time, &sa.id).cmp(&(sb.date, &sb.room, sb.start_time, &sb.id))
        });
        order
    }

    fn shift_findings(
        &self,
        roster: &Roster,
        s: usize,
        warnings: &mut Vec<ScheduleWarning>,
        errors: &mut Vec<ScheduleError>,
    ) {
        let problem = self.problem;
        let weights = problem.weights;
        let shift = &problem.shifts[s];
        let staff = roster.staff(s);
        let terms = ShiftTerms::evaluate(problem, s, staff);

        if terms.min_shortfall > 0 {
            let reason = self
                .most_common_reason(roster, s)
                .map(|r| format!("; most common reason: {}", r))
                .unwrap_or_default();
            errors.push(ScheduleError {
                code: "SHIFT_UNDERSTAFFED".to_string(),
                message: format!(
                    "Shift {} in room {} on {} has {} of minimum {} staff{}",
                    shift.id,
                    shift.room,
                    shift.date,
                    staff.len(),
                    shift.min_staff,
                    reason
                ),
                shift_id: Some(shift.id.clone()),
                shortfall: Some(terms.min_shortfall),
            });
        }

        for &e in staff {
            if problem.non_preferred[e][s] && self.above_threshold(weights.non_preferred_slot) {
                warnings.push(warning(
                    "NON_PREFERRED_SLOT",
                    format!(
                        "{} is scheduled on shift {} outside a preferred availability window",
                        problem.employees[e].name, shift.id
                    ),
                    Severity::Low,
                    Some(e),
                    Some(s),
                    problem,
                ));
            }
        }

        let required_penalty = Decimal::from(terms.required_shortfall) * weights.required_staff_shortfall;
        if terms.required_shortfall > 0 && self.above_threshold(required_penalty) {
            warnings.push(warning(
                "UNDERSTAFFED",
                format!(
                    "Shift {} has {} of {} required staff",
                    shift.id,
                    staff.len(),
                    shift.required_staff
                ),
                Severity::Medium,
                None,
                Some(s),
                problem,
            ));
        }

        let over_penalty = Decimal::from(terms.overstaffed) * weights.overstaffing;
        if terms.overstaffed > 0 && self.above_threshold(over_penalty) {
            warnings.push(warning(
                "OVERSTAFFED",
                format!(
                    "Shift {} has {} staff, {} above the required {}",
                    shift.id,
                    staff.len(),
                    terms.overstaffed,
                    shift.required_staff
                ),
                Severity::Low,
                None,
                Some(s),
                problem,
            ));
        }

        if terms.missing_lead {
            warnings.push(warning(
                "MISSING_LEAD",
                format!("Room {} has no lead on shift {}", shift.room, shift.id),
                Severity::High,
                None,
                Some(s),
                problem,
            ));
        }

        if terms.ratio_shortfall > 0 {
            let (severity, reportable) = match problem.constraints.ratio_enforcement {
                RatioEnforcement::Hard => (Severity::High, true),
                RatioEnforcement::Soft => (
                    Severity::Medium,
                    self.above_threshold(
                        Decimal::from(terms.ratio_shortfall) * weights.soft_ratio_shortfall,
                    ),
                ),
            };
            if reportable {
                warnings.push(warning(
                    "RATIO_SHORTFALL",
                    format!(
                        "Shift {} needs {} staff for {} children but has {}",
                        shift.id,
                        problem.ratio_needed[s],
                        shift.expected_children,
                        staff.len()
                    ),
                    severity,
                    None,
                    Some(s),
                    problem,
                ));
            }
        }
    }

    fn employee_findings(&self, roster: &Roster, e: usize, warnings: &mut Vec<ScheduleWarning>) {
        let problem = self.problem;
        let employee = &problem.employees[e];
        let cap = problem.constraints.regular_cap(employee.max_hours_per_week);
        let min_hours = problem.constraints.min_hours_per_week;

        for ((year, week), hours) in weekly_hours(problem, roster.shifts_of(e)) {
            let overtime = hours - cap;
            if overtime > Decimal::ZERO
                && self.above_threshold(overtime * problem.weights.overtime_per_hour)
            {
                warnings.push(warning(
                    "OVERTIME",
                    format!(
                        "{} works {} hours in {}-W{:02}, {} beyond the regular {}",
                        employee.name,
                        hours.round_dp(2).normalize(),
                        year,
                        week,
                        overtime.round_dp(2).normalize(),
                        cap.normalize()
                    ),
                    Severity::Medium,
                    Some(e),
                    None,
                    problem,
                ));
            }

            if employee.active && hours < min_hours {
                warnings.push(warning(
                    "BELOW_MIN_HOURS",
                    format!(
                        "{} works {} hours in {}-W{:02}, below the minimum {}",
                        employee.name,
                        hours.round_dp(2).normalize(),
                        year,
                        week,
                        min_hours.normalize()
                    ),
                    Severity::Low,
                    Some(e),
                    None,
                    problem,
                ));
            }
        }
    }

    fn pin_findings(&self, roster: &Roster, warnings: &mut Vec<ScheduleWarning>) {
        let problem = self.problem;
        for &(e, s) in &problem.pins {
            if let Err(reason) = problem.check(roster, e, s, &[]) {
                warnings.push(warning(
                    "PINNED_INFEASIBLE",
                    format!(
                        "Pinned assignment of {} to shift {} breaks a hard rule: {}",
                        problem.employees[e].name, problem.shifts[s].id, reason
                    ),
                    Severity::High,
                    Some(e),
                    Some(s),
                    problem,
                ));
            }
        }
    }

    /// The reason most employees off the shift could not take it.
    fn most_common_reason(&self, roster: &Roster, s: usize) -> Option<Infeasibility> {
        let mut tally: BTreeMap<Infeasibility, u32> = BTreeMap::new();
        for e in 0..self.problem.employee_count() {
            if roster.contains(e, s) {
                continue;
            }
            if let Err(reason) = self.problem.check(roster, e, s, &[]) {
                *tally.entry(reason).or_default() += 1;
            }
        }

        let mut best: Option<(Infeasibility, u32)> = None;
        for (reason, count) in tally {
            if best.is_none_or(|(_, top)| count > top) {
                best = Some((reason, count));
            }
        }
        best.map(|(reason, _)| reason)
    }

    fn above_threshold(&self, penalty: Decimal) -> bool {
        penalty > self.config.reporting.warning_threshold
    }
}

fn warning(
    code: &str,
    message: String,
    severity: Severity,
    employee: Option<usize>,
    shift: Option<usize>,
    problem: &Problem<'_>,
) -> ScheduleWarning {
    ScheduleWarning {
        code: code.to_string(),
        message,
        severity,
        employee_id: employee.map(|e| problem.employees[e].id.clone()),
        shift_id: shift.map(|s| problem.shifts[s].id.clone()),
    }
}

/// Negated combined penalty: zero is perfect, higher is better.
fn total_score(score: &ScoreBreakdown) -> Decimal {
    -(Decimal::from(score.hard) + score.soft)
}

/// The result for a request, or configuration, rejected before any search.
pub(crate) fn rejected(errors: &[EngineError], solving_time_ms: u64) -> SchedulingResult {
    let errors = errors
        .iter()
        .map(|error| ScheduleError {
            code: if error.is_request_error() {
                "INVALID_REQUEST"
            } else {
                "INVALID_CONFIG"
            }
            .to_string(),
            message: error.to_string(),
            shift_id: match error {
                EngineError::DuplicateShift { shift_id }
                | EngineError::InvalidShift { shift_id, .. }
                | EngineError::UnknownShift { shift_id } => Some(shift_id.clone()),
                _ => None,
            },
            shortfall: None,
        })
        .collect();

    SchedulingResult {
        assignments: Vec::new(),
        total_score: Decimal::ZERO,
        status: SolveStatus::Infeasible,
        solving_time_ms,
        warnings: Vec::new(),
        errors,
        score: ScoreBreakdown::default(),
        statistics: SolveStatistics::default(),
    }
}
