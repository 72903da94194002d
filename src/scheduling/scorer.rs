//! Schedule scoring.
//!
//! A schedule is scored as a `(hard, soft)` pair compared lexicographically;
//! lower is better for both. The score is the sum of independent parts:
//!
//! - one part per shift (staffing levels, lead cover, ratio, preferences)
//! - one part per employee (overtime)
//! - one global imbalance part (variance of shift counts)
//!
//! Keeping the parts separate lets the search re-score a move by touching
//! only the shifts and employees it changes. Every soft part is rounded to
//! [`SCORE_SCALE`] decimal places, so adding and removing parts is exact.

use std::collections::BTreeMap;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::ScoringWeights;
use crate::models::{Assignment, RatioEnforcement, SchedulingRequest, ScoreBreakdown};

use super::problem::{Problem, Roster};

/// Decimal places kept on every soft score part.
pub const SCORE_SCALE: u32 = 6;

/// A `(hard, soft)` penalty pair. Ordering compares `hard` first.
///
/// # Example
///
/// ```
/// use roster_engine::scheduling::Score;
/// use rust_decimal::Decimal;
///
/// let clean = Score::new(0, Decimal::from(500));
/// let broken = Score::new(1, Decimal::ZERO);
/// assert!(clean < broken);
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Score {
    /// Hard penalty; zero for a valid schedule.
    pub hard: i64,
    /// Soft penalty.
    pub soft: Decimal,
}

impl Score {
    /// A score with no penalty.
    pub const ZERO: Score = Score {
        hard: 0,
        soft: Decimal::ZERO,
    };

    /// Creates a score.
    pub fn new(hard: i64, soft: Decimal) -> Self {
        Self { hard, soft }
    }

    /// Returns true if no hard rule is broken.
    pub fn is_feasible(&self) -> bool {
        self.hard == 0
    }
}

impl Add for Score {
    type Output = Score;

    fn add(self, rhs: Score) -> Score {
        Score::new(self.hard + rhs.hard, self.soft + rhs.soft)
    }
}

impl Sub for Score {
    type Output = Score;

    fn sub(self, rhs: Score) -> Score {
        Score::new(self.hard - rhs.hard, self.soft - rhs.soft)
    }
}

impl AddAssign for Score {
    fn add_assign(&mut self, rhs: Score) {
        self.hard += rhs.hard;
        self.soft += rhs.soft;
    }
}

impl Sum for Score {
    fn sum<I: Iterator<Item = Score>>(iter: I) -> Score {
        iter.fold(Score::ZERO, Add::add)
    }
}

/// Scores complete schedules for a request.
///
/// The solver uses the same scoring internally; this type exposes it for
/// callers that want to score a schedule they built or edited themselves.
///
/// # Example
///
/// ```
/// use roster_engine::config::ScoringWeights;
/// use roster_engine::models::{SchedulingConstraints, SchedulingRequest};
/// use roster_engine::scheduling::{Score, Scorer};
///
/// let request = SchedulingRequest::new(vec![], vec![], SchedulingConstraints::default());
/// let weights = ScoringWeights::default();
/// let scorer = Scorer::new(&request, &weights);
/// assert_eq!(scorer.score(&[]), Score::ZERO);
/// ```
#[derive(Debug)]
pub struct Scorer<'a> {
    problem: Problem<'a>,
}

impl<'a> Scorer<'a> {
    /// Creates a scorer for one request.
    pub fn new(request: &'a SchedulingRequest, weights: &'a ScoringWeights) -> Self {
        Self {
            problem: Problem::new(request, weights),
        }
    }

    /// Scores a schedule. Unfilled slots and assignments naming unknown ids
    /// are ignored.
    pub fn score(&self, assignments: &[Assignment]) -> Score {
        let roster = self.roster_from(assignments);
        ScoreCache::build(&self.problem, &roster).total(&self.problem)
    }

    /// Scores a schedule term by term.
    pub fn breakdown(&self, assignments: &[Assignment]) -> ScoreBreakdown {
        let roster = self.roster_from(assignments);
        breakdown(&self.problem, &roster)
    }

    fn roster_from(&self, assignments: &[Assignment]) -> Roster {
        let mut roster = Roster::empty(self.problem.employee_count(), self.problem.shift_count());
        for assignment in assignments.iter().filter(|a| a.is_staffed()) {
            let employee = assignment
                .employee_id
                .as_deref()
                .and_then(|id| self.problem.employee_by_id(id));
            let shift = self.problem.shift_by_id(&assignment.shift_id);
            if let (Some(e), Some(s)) = (employee, shift) {
                roster.assign(e, s);
            }
        }
        roster
    }
}

/// Violation counts for one shift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ShiftTerms {
    pub min_shortfall: u32,
    pub required_shortfall: u32,
    pub overstaffed: u32,
    pub missing_lead: bool,
    pub ratio_shortfall: u32,
    pub non_preferred: u32,
}

impl ShiftTerms {
    pub fn evaluate(problem: &Problem<'_>, shift: usize, staff: &[usize]) -> Self {
        let s = &problem.shifts[shift];
        let staffed = staff.len() as u32;
        let missing_lead = problem.constraints.require_lead_teacher_per_room
            && (staffed > 0 || s.min_staff > 0)
            && !staff.iter().any(|&e| problem.is_lead[e]);

        Self {
            min_shortfall: s.min_staff.saturating_sub(staffed),
            required_shortfall: s.required_staff.saturating_sub(staffed.max(s.min_staff)),
            overstaffed: staffed.saturating_sub(s.required_staff),
            missing_lead,
            ratio_shortfall: problem.ratio_needed[shift].saturating_sub(staffed),
            non_preferred: staff
                .iter()
                .filter(|&&e| problem.non_preferred[e][shift])
                .count() as u32,
        }
    }

    pub fn score(&self, problem: &Problem<'_>) -> Score {
        let mut breakdown = ScoreBreakdown::default();
        self.add_to(problem, &mut breakdown);
        Score::new(breakdown.hard, breakdown.soft)
    }

    /// Adds these terms, weighted, to a running breakdown.
    pub fn add_to(&self, problem: &Problem<'_>, breakdown: &mut ScoreBreakdown) {
        let w = problem.weights;

        let min_staff = i64::from(self.min_shortfall) * w.min_staff_shortfall;
        let missing_lead = if self.missing_lead { w.missing_lead } else { 0 };
        breakdown.min_staff_shortfall += min_staff;
        breakdown.missing_lead += missing_lead;
        breakdown.hard += min_staff + missing_lead;

        let required = Decimal::from(self.required_shortfall) * w.required_staff_shortfall;
        let over = Decimal::from(self.overstaffed) * w.overstaffing;
        let non_preferred = Decimal::from(self.non_preferred) * w.non_preferred_slot;
        breakdown.required_staff_shortfall += required;
        breakdown.overstaffing += over;
        breakdown.non_preferred += non_preferred;
        breakdown.soft += required + over + non_preferred;

        match problem.constraints.ratio_enforcement {
            RatioEnforcement::Hard => {
                let ratio = i64::from(self.ratio_shortfall) * w.ratio_shortfall;
                breakdown.ratio_shortfall_hard += ratio;
                breakdown.hard += ratio;
            }
            RatioEnforcement::Soft => {
                let ratio = Decimal::from(self.ratio_shortfall) * w.soft_ratio_shortfall;
                breakdown.ratio_shortfall_soft += ratio;
                breakdown.soft += ratio;
            }
        }
    }
}

/// Hours per ISO week, keyed by `(iso_year, week)`.
pub(crate) fn weekly_hours(problem: &Problem<'_>, shifts: &[usize]) -> BTreeMap<(i32, u32), Decimal> {
    let mut weeks = BTreeMap::new();
    for &s in shifts {
        let week = problem.shifts[s].week();
        *weeks.entry((week.year(), week.week())).or_insert(Decimal::ZERO) += problem.shift_hours[s];
    }
    weeks
}

/// Hours beyond the employee's regular weekly cap, summed over weeks.
pub(crate) fn overtime_hours(problem: &Problem<'_>, employee: usize, shifts: &[usize]) -> Decimal {
    let cap = problem
        .constraints
        .regular_cap(problem.employees[employee].max_hours_per_week);
    weekly_hours(problem, shifts)
        .values()
        .map(|&hours| (hours - cap).max(Decimal::ZERO))
        .sum()
}

pub(crate) fn employee_score(problem: &Problem<'_>, employee: usize, shifts: &[usize]) -> Score {
    let overtime = overtime_hours(problem, employee, shifts) * problem.weights.overtime_per_hour;
    Score::new(0, overtime.round_dp(SCORE_SCALE))
}

/// Running sums for the variance of shift counts across active employees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Balance {
    active: i64,
    sum: i64,
    sum_sq: i64,
}

impl Balance {
    pub fn of(problem: &Problem<'_>, roster: &Roster) -> Self {
        let mut balance = Balance::default();
        for (e, employee) in problem.employees.iter().enumerate() {
            if employee.active {
                let count = roster.shifts_of(e).len() as i64;
                balance.active += 1;
                balance.sum += count;
                balance.sum_sq += count * count;
            }
        }
        balance
    }

    /// The balance after one active employee's count changes.
    pub fn with_change(self, before: usize, after: usize) -> Self {
        let (before, after) = (before as i64, after as i64);
        Self {
            active: self.active,
            sum: self.sum - before + after,
            sum_sq: self.sum_sq - before * before + after * after,
        }
    }

    /// Population variance of shift counts.
    pub fn variance(&self) -> Decimal {
        if self.active == 0 {
            return Decimal::ZERO;
        }
        let numerator = Decimal::from(self.active * self.sum_sq - self.sum * self.sum);
        let denominator = Decimal::from(self.active * self.active);
        (numerator / denominator).round_dp(SCORE_SCALE)
    }

    pub fn score(&self, weights: &ScoringWeights) -> Score {
        Score::new(0, (self.variance() * weights.imbalance).round_dp(SCORE_SCALE))
    }
}

/// Per-part scores of the current roster.
#[derive(Debug, Clone)]
pub(crate) struct ScoreCache {
    shift_scores: Vec<Score>,
    employee_scores: Vec<Score>,
    balance: Balance,
    /// Sum of every shift and employee part.
    base: Score,
}

impl ScoreCache {
    pub fn build(problem: &Problem<'_>, roster: &Roster) -> Self {
        let shift_scores: Vec<Score> = (0..problem.shift_count())
            .map(|s| ShiftTerms::evaluate(problem, s, roster.staff(s)).score(problem))
            .collect();
        let employee_scores: Vec<Score> = (0..problem.employee_count())
            .map(|e| employee_score(problem, e, roster.shifts_of(e)))
            .collect();
        let base = shift_scores.iter().copied().sum::<Score>()
            + employee_scores.iter().copied().sum::<Score>();

        Self {
            shift_scores,
            employee_scores,
            balance: Balance::of(problem, roster),
            base,
        }
    }

    pub fn total(&self, problem: &Problem<'_>) -> Score {
        self.base + self.balance.score(problem.weights)
    }

    pub fn balance(&self) -> Balance {
        self.balance
    }

    /// Score of the roster after replacing the staff of some shifts and the
    /// shift lists of some employees, plus the resulting variance.
    pub fn evaluate_change(
        &self,
        problem: &Problem<'_>,
        roster: &Roster,
        shifts: &[(usize, &[usize])],
        employees: &[(usize, &[usize])],
    ) -> (Score, Decimal) {
        let mut base = self.base;
        for &(s, staff) in shifts {
            base = base - self.shift_scores[s]
                + ShiftTerms::evaluate(problem, s, staff).score(problem);
        }

        let mut balance = self.balance;
        for &(e, assigned) in employees {
            base = base - self.employee_scores[e] + employee_score(problem, e, assigned);
            if problem.employees[e].active {
                balance = balance.with_change(roster.shifts_of(e).len(), assigned.len());
            }
        }

        (base + balance.score(problem.weights), balance.variance())
    }

    /// Refreshes the parts for shifts and employees changed in the roster.
    pub fn refresh(
        &mut self,
        problem: &Problem<'_>,
        roster: &Roster,
        shifts: &[usize],
        employees: &[usize],
    ) {
        for &s in shifts {
            let score = ShiftTerms::evaluate(problem, s, roster.staff(s)).score(problem);
            self.base = self.base - self.shift_scores[s] + score;
            self.shift_scores[s] = score;
        }
        for &e in employees {
            let score = employee_score(problem, e, roster.shifts_of(e));
            self.base = self.base - self.employee_scores[e] + score;
            self.employee_scores[e] = score;
        }
        self.balance = Balance::of(problem, roster);
    }
}

/// Term-by-term score of a roster.
pub(crate) fn breakdown(problem: &Problem<'_>, roster: &Roster) -> ScoreBreakdown {
    let mut breakdown = ScoreBreakdown::default();

    for s in 0..problem.shift_count() {
        ShiftTerms::evaluate(problem, s, roster.staff(s)).add_to(problem, &mut breakdown);
    }

    for e in 0..problem.employee_count() {
        let overtime = employee_score(problem, e, roster.shifts_of(e)).soft;
        breakdown.overtime += overtime;
        breakdown.soft += overtime;
    }

    let imbalance = Balance::of(problem, roster).score(problem.weights).soft;
    breakdown.imbalance = imbalance;
    breakdown.soft += imbalance;

    breakdown
}
