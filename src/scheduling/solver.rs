//! The solve pipeline: `Init → Construct → Improve → Terminated`.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::models::{
    Assignment, SchedulingRequest, SchedulingResult, Shift, SolveStatistics, SolveStatus,
};

use super::construction::{construct, place_pins};
use super::local_search::LocalSearch;
use super::problem::{Problem, Roster};
use super::reporter::{Reporter, rejected};
use super::scorer::{Score, ScoreCache};
use super::validation::{validate_assignments, validate_request};

/// The phases a solve passes through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SolverPhase {
    /// Structural validation of the request.
    Init,
    /// Greedy most-constrained-first placement.
    Construct,
    /// Best-improvement local search.
    Improve,
    /// Status derivation and reporting.
    Terminated,
}

/// A solver for one request.
///
/// Holds no state between solves: construct one per request. Concurrent
/// solves of different requests share nothing mutable.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use roster_engine::config::EngineConfig;
/// use roster_engine::models::{SchedulingConstraints, SchedulingRequest, SolveStatus};
/// use roster_engine::scheduling::Solver;
///
/// let request = SchedulingRequest::new(vec![], vec![], SchedulingConstraints::default());
/// let config = EngineConfig::default();
///
/// let result = Solver::new(&request, &config).solve_within(Duration::from_secs(1));
/// assert_eq!(result.status, SolveStatus::Optimal);
/// assert!(result.assignments.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Solver<'a> {
    request: &'a SchedulingRequest,
    config: &'a EngineConfig,
    initial: Option<Vec<Assignment>>,
}

impl<'a> Solver<'a> {
    /// Creates a solver for `request` using `config`.
    pub fn new(request: &'a SchedulingRequest, config: &'a EngineConfig) -> Self {
        Self {
            request,
            config,
            initial: None,
        }
    }

    /// Starts the search from an existing schedule instead of constructing
    /// one, for example a previous result. Unfilled slots are ignored and
    /// pinned assignments from the request are always added.
    pub fn with_initial_assignments(mut self, assignments: Vec<Assignment>) -> Self {
        self.initial = Some(assignments);
        self
    }

    /// Solves with a time budget counted from now.
    pub fn solve_within(&self, budget: Duration) -> SchedulingResult {
        let now = Instant::now();
        // Budgets too large to represent are treated as a day.
        let deadline = now
            .checked_add(budget)
            .unwrap_or_else(|| now + Duration::from_secs(86_400));
        self.solve(deadline)
    }

    /// Solves, stopping the improvement phase once `deadline` passes.
    ///
    /// Never fails: structural problems with the request, or an invalid
    /// engine configuration, come back as an `infeasible` result whose errors
    /// list every violation.
    pub fn solve(&self, deadline: Instant) -> SchedulingResult {
        let started = Instant::now();
        let request = self.request;
        let config = self.config;

        debug!(
            phase = ?SolverPhase::Init,
            employees_count = request.employees.len(),
            shifts_count = request.shifts.len(),
            "Solver phase"
        );
        let mut errors: Vec<_> = config.validate().err().into_iter().collect();
        errors.extend(validate_request(request));
        if let Some(initial) = &self.initial {
            errors.extend(validate_assignments(request, initial));
        }
        if !errors.is_empty() {
            warn!(error_count = errors.len(), "Rejected structurally invalid request");
            return rejected(&errors, elapsed_ms(started));
        }

        let problem = Problem::new(request, &config.scoring);
        let mut roster = Roster::empty(problem.employee_count(), problem.shift_count());
        let mut statistics = SolveStatistics::default();

        let mut cache = match &self.initial {
            Some(initial) => {
                seed(&problem, &mut roster, initial);
                let mut cache = ScoreCache::build(&problem, &roster);
                place_pins(&problem, &mut roster, &mut cache);
                debug!(seeded = roster.len(), "Starting from initial assignments");
                cache
            }
            None => {
                debug!(phase = ?SolverPhase::Construct, "Solver phase");
                let mut cache = ScoreCache::build(&problem, &roster);
                statistics.construction_gaps = construct(&problem, &mut roster, &mut cache);
                cache
            }
        };

        let constructed = cache.total(&problem);
        debug!(
            phase = ?SolverPhase::Improve,
            hard = constructed.hard,
            soft = %constructed.soft,
            construction_gaps = statistics.construction_gaps,
            "Solver phase"
        );
        let outcome = LocalSearch::new(&problem, &config.solver, deadline).run(&mut roster, &mut cache);

        statistics.iterations = outcome.iterations;
        statistics.moves_evaluated = outcome.moves_evaluated;
        statistics.moves_applied = outcome.moves_applied;
        statistics.budget_exhausted = outcome.timed_out;
        statistics.iteration_limit_reached = outcome.iteration_limit_reached;

        let score = cache.total(&problem);
        let status = final_status(&problem, &roster, score, outcome.timed_out);
        let solving_time_ms = elapsed_ms(started);

        info!(
            phase = ?SolverPhase::Terminated,
            %status,
            hard = score.hard,
            soft = %score.soft,
            assignments_count = roster.len(),
            iterations = statistics.iterations,
            solving_time_ms,
            "Solve finished"
        );

        Reporter::new(&problem, config).report(&roster, status, statistics, solving_time_ms)
    }
}

/// Solves `request` with `config` within `budget`.
pub fn solve(request: &SchedulingRequest, config: &EngineConfig, budget: Duration) -> SchedulingResult {
    Solver::new(request, config).solve_within(budget)
}

fn seed(problem: &Problem<'_>, roster: &mut Roster, assignments: &[Assignment]) {
    for assignment in assignments.iter().filter(|a| a.is_staffed()) {
        let employee = assignment
            .employee_id
            .as_deref()
            .and_then(|id| problem.employee_by_id(id));
        if let (Some(e), Some(s)) = (employee, problem.shift_by_id(&assignment.shift_id)) {
            roster.assign(e, s);
        }
    }
}

fn final_status(problem: &Problem<'_>, roster: &Roster, score: Score, timed_out: bool) -> SolveStatus {
    let below = |limit: fn(&Shift) -> u32| {
        problem
            .shifts
            .iter()
            .enumerate()
            .any(|(s, shift)| (roster.staff(s).len() as u32) < limit(shift))
    };

    if timed_out {
        SolveStatus::TimedOut
    } else if !score.is_feasible() || below(|s| s.min_staff) {
        SolveStatus::Infeasible
    } else if below(|s| s.required_staff) {
        SolveStatus::Feasible
    } else {
        SolveStatus::Optimal
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AssignmentStatus, PinnedAssignment, RatioEnforcement};
    use crate::scheduling::problem::fixtures::*;
    use chrono::Weekday;
    use rust_decimal::Decimal;

    fn run(req: &SchedulingRequest) -> SchedulingResult {
        let config = EngineConfig::default();
        Solver::new(req, &config).solve_within(Duration::from_secs(30))
    }

    #[test]
    fn test_single_lead_employee_is_optimal() {
        let req = SchedulingRequest::new(
            vec![employee("emp_001", &["lead"], vec![window(Weekday::Mon, 8, 17, true)])],
            vec![requiring(
                staffing(shift("shift_001", 0, 9, 13, "Infant"), 1, 1, 1),
                &["lead"],
            )],
            constraints(),
        );
        let result = run(&req);

        assert_eq!(result.status, SolveStatus::Optimal);
        assert_eq!(result.assignments.len(), 1);
        assert_eq!(result.assignments[0].employee_id.as_deref(), Some("emp_001"));
        assert!(result.errors.is_empty());
        assert_eq!(result.total_score, Decimal::ZERO);
    }

    #[test]
    fn test_availability_gap_is_infeasible() {
        let req = SchedulingRequest::new(
            vec![employee("emp_001", &["infant_care"], vec![window(Weekday::Mon, 8, 12, true)])],
            vec![requiring(shift("shift_pm", 0, 13, 17, "Infant"), &["infant_care"])],
            constraints(),
        );
        let result = run(&req);

        assert_eq!(result.status, SolveStatus::Infeasible);
        let error = result.error_for("shift_pm").unwrap();
        assert_eq!(error.shortfall, Some(1));
        assert!(error.message.contains("unavailable"));
        assert_eq!(result.assignments_for("shift_pm").count(), 0);
        assert_eq!(result.statistics.construction_gaps, 1);
    }

    #[test]
    fn test_overlapping_shifts_with_one_qualified_employee() {
        let req = SchedulingRequest::new(
            vec![
                employee("emp_qualified", &["infant_care"], weekdays(7, 18)),
                employee("emp_other", &[], weekdays(7, 18)),
            ],
            vec![
                requiring(shift("shift_early", 0, 9, 13, "Infant"), &["infant_care"]),
                requiring(shift("shift_late", 0, 10, 14, "Nursery"), &["infant_care"]),
            ],
            constraints(),
        );
        let result = run(&req);

        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].shortfall, Some(1));
        let staffed = if result.error_for("shift_early").is_some() {
            "shift_late"
        } else {
            "shift_early"
        };
        let assigned: Vec<_> = result.assignments_for(staffed).collect();
        assert_eq!(assigned.len(), 1);
        assert_eq!(assigned[0].employee_id.as_deref(), Some("emp_qualified"));
        assert_eq!(result.status, SolveStatus::Infeasible);
    }

    #[test]
    fn test_below_required_but_above_min_is_feasible() {
        let req = SchedulingRequest::new(
            vec![employee("emp_a", &[], weekdays(7, 18))],
            vec![staffing(shift("s1", 0, 9, 13, "Infant"), 1, 2, 2)],
            constraints(),
        );
        let result = run(&req);
        assert_eq!(result.status, SolveStatus::Feasible);
        assert!(result.is_usable());
        assert!(result.warnings.iter().any(|w| w.code == "UNDERSTAFFED"));
    }

    #[test]
    fn test_structural_errors_abort_before_search() {
        let mut req = SchedulingRequest::new(
            vec![
                employee("emp_a", &[], weekdays(7, 18)),
                employee("emp_a", &[], weekdays(7, 18)),
            ],
            vec![staffing(shift("s1", 0, 9, 13, "Infant"), 2, 1, 1)],
            constraints(),
        );
        req.constraints.max_consecutive_days = 0;
        let result = run(&req);

        assert_eq!(result.status, SolveStatus::Infeasible);
        assert!(result.assignments.is_empty());
        assert_eq!(result.errors.len(), 3);
        assert_eq!(result.statistics.iterations, 0);
    }

    #[test]
    fn test_rerun_from_own_result_is_stable() {
        let req = SchedulingRequest::new(
            (0..5)
                .map(|i| employee(&format!("emp_{}", i), &[], weekdays(6, 20)))
                .collect(),
            (0..5)
                .flat_map(|d| {
                    [
                        staffing(shift(&format!("am_{}", d), d, 7, 12, "Infant"), 1, 2, 3),
                        staffing(shift(&format!("pm_{}", d), d, 13, 18, "Toddler"), 1, 1, 2),
                    ]
                })
                .collect(),
            constraints(),
        );
        let config = EngineConfig::default();
        let first = Solver::new(&req, &config).solve_within(Duration::from_secs(30));
        assert!(!first.statistics.budget_exhausted);

        let second = Solver::new(&req, &config)
            .with_initial_assignments(first.assignments.clone())
            .solve_within(Duration::from_secs(30));

        assert_eq!(second.statistics.moves_applied.total(), 0);
        assert_eq!(second.assignments, first.assignments);
        assert_eq!(second.score, first.score);
        assert_eq!(second.status, first.status);
    }

    #[test]
    fn test_identical_requests_give_identical_results() {
        let req = SchedulingRequest::new(
            (0..4)
                .map(|i| employee(&format!("emp_{}", i), &[], weekdays(6, 20)))
                .collect(),
            (0..3)
                .map(|d| staffing(shift(&format!("s_{}", d), d, 8, 16, "Infant"), 1, 2, 3))
                .collect(),
            constraints(),
        );
        let a = run(&req);
        let b = run(&req);
        assert_eq!(a.assignments, b.assignments);
        assert_eq!(a.score, b.score);
        assert_eq!(a.warnings, b.warnings);
    }

    #[test]
    fn test_seed_with_unknown_ids_rejected() {
        let req = SchedulingRequest::new(
            vec![employee("emp_a", &[], weekdays(7, 18))],
            vec![shift("s1", 0, 9, 13, "Infant")],
            constraints(),
        );
        let config = EngineConfig::default();
        let mut ghost = Assignment::staffed(
            &req.employees[0],
            &req.shifts[0],
            AssignmentStatus::Assigned,
            Decimal::ZERO,
        );
        ghost.employee_id = Some("ghost".to_string());

        let result = Solver::new(&req, &config)
            .with_initial_assignments(vec![ghost])
            .solve_within(Duration::from_secs(1));
        assert_eq!(result.status, SolveStatus::Infeasible);
        assert_eq!(result.errors[0].code, "INVALID_REQUEST");
    }

    #[test]
    fn test_pinned_assignment_kept_and_overridden() {
        let mut req = SchedulingRequest::new(
            vec![
                employee("emp_a", &[], vec![window(Weekday::Mon, 7, 18, false)]),
                employee("emp_b", &[], weekdays(7, 18)),
            ],
            vec![shift("s1", 0, 9, 13, "Infant")],
            constraints(),
        );
        req.pinned_assignments.push(PinnedAssignment {
            employee_id: "emp_a".to_string(),
            shift_id: "s1".to_string(),
        });
        let result = run(&req);

        // emp_b would score better, but the pin holds.
        assert_eq!(result.assignments.len(), 1);
        assert_eq!(result.assignments[0].employee_id.as_deref(), Some("emp_a"));
        assert_eq!(result.assignments[0].status, AssignmentStatus::Overridden);
    }

    #[test]
    fn test_hard_ratio_adds_staff_up_to_max() {
        let mut req = SchedulingRequest::new(
            (0..3)
                .map(|i| employee(&format!("emp_{}", i), &[], weekdays(7, 18)))
                .collect(),
            vec![staffing(shift("s1", 0, 9, 13, "Toddler"), 1, 1, 3)],
            constraints(),
        );
        req.shifts[0].expected_children = 10;
        req.constraints.child_to_staff_ratio = Decimal::from(5);
        let result = run(&req);

        assert_eq!(result.assignments.len(), 2);
        assert_eq!(result.score.hard, 0);
        assert_eq!(result.score.overstaffing, Decimal::new(5, 1));
        assert_eq!(result.status, SolveStatus::Optimal);
    }

    #[test]
    fn test_soft_ratio_shortfall_does_not_make_infeasible() {
        let mut req = SchedulingRequest::new(
            vec![employee("emp_0", &[], weekdays(7, 18))],
            vec![staffing(shift("s1", 0, 9, 13, "Toddler"), 1, 1, 3)],
            constraints(),
        );
        req.shifts[0].expected_children = 10;
        req.constraints.child_to_staff_ratio = Decimal::from(5);

        let hard = run(&req);
        assert_eq!(hard.status, SolveStatus::Infeasible);
        assert_eq!(hard.score.ratio_shortfall_hard, 1000);

        req.constraints.ratio_enforcement = RatioEnforcement::Soft;
        let soft = run(&req);
        assert_eq!(soft.status, SolveStatus::Optimal);
        assert_eq!(soft.score.ratio_shortfall_soft, Decimal::from(50));
        assert!(soft.warnings.iter().any(|w| w.code == "RATIO_SHORTFALL"));
    }

    #[test]
    fn test_zero_budget_times_out_with_constructed_schedule() {
        let req = SchedulingRequest::new(
            vec![employee("emp_a", &[], weekdays(7, 18))],
            vec![shift("s1", 0, 9, 13, "Infant")],
            constraints(),
        );
        let config = EngineConfig::default();
        let result = Solver::new(&req, &config).solve(Instant::now());

        assert_eq!(result.status, SolveStatus::TimedOut);
        assert_eq!(result.assignments.len(), 1);
        assert!(result.statistics.budget_exhausted);
    }

    #[test]
    fn test_qualified_employee_moved_to_the_shift_only_they_can_cover() {
        let req = SchedulingRequest::new(
            vec![
                employee("emp_1", &["x"], weekdays(7, 18)),
                employee("emp_2", &[], weekdays(7, 18)),
            ],
            vec![
                shift("shift_a", 0, 8, 12, "Infant"),
                requiring(shift("shift_b", 0, 10, 14, "Toddler"), &["x"]),
            ],
            constraints(),
        );
        let result = run(&req);

        assert_eq!(result.status, SolveStatus::Optimal);
        assert!(result.errors.is_empty());
        let on = |shift: &str| -> Vec<_> {
            result
                .assignments_for(shift)
                .filter_map(|a| a.employee_id.clone())
                .collect()
        };
        assert_eq!(on("shift_a"), vec!["emp_2".to_string()]);
        assert_eq!(on("shift_b"), vec!["emp_1".to_string()]);
        assert_eq!(result.statistics.moves_applied.chain, 1);

        let rerun = Solver::new(&req, &EngineConfig::default())
            .with_initial_assignments(result.assignments.clone())
            .solve_within(Duration::from_secs(30));
        assert_eq!(rerun.statistics.moves_applied.total(), 0);
    }

    #[test]
    fn test_invalid_config_rejected_before_search() {
        let req = SchedulingRequest::new(
            vec![employee("emp_a", &[], weekdays(7, 18))],
            vec![shift("s1", 0, 9, 13, "Infant")],
            constraints(),
        );
        let mut config = EngineConfig::default();
        config.solver.max_time_budget_ms = 0;

        let result = Solver::new(&req, &config).solve_within(Duration::from_secs(30));

        assert_eq!(result.status, SolveStatus::Infeasible);
        assert!(result.assignments.is_empty());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, "INVALID_CONFIG");
    }

    #[test]
    fn test_phases_are_ordered() {
        assert!(SolverPhase::Init < SolverPhase::Construct);
        assert!(SolverPhase::Improve < SolverPhase::Terminated);
    }
}
