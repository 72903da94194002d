//! Best-improvement local search.
//!
//! Each iteration scans the whole neighbourhood, scores every feasible
//! candidate against the current roster and applies the single best one if
//! it strictly improves the score. When none does, an ejection chain may
//! still fill a short shift; the search ends once neither helps. The scan is
//! the unit of cancellation: the deadline is checked before each scan, never
//! part-way through a move.

use std::time::Instant;

use rayon::prelude::*;
use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::config::SolverSettings;
use crate::models::MoveCounts;

use super::chain::EjectionChain;
use super::moves::{Move, neighbourhood};
use super::problem::{Problem, Roster};
use super::scorer::{Score, ScoreCache};

/// How the search ended and what it did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SearchOutcome {
    pub iterations: u32,
    pub moves_evaluated: u64,
    pub moves_applied: MoveCounts,
    pub timed_out: bool,
    pub iteration_limit_reached: bool,
}

/// A scored candidate.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    index: usize,
    mv: Move,
    score: Score,
    variance: Decimal,
}

impl Candidate {
    /// Score, then variance, then fewest employees touched, then generation
    /// order.
    fn key(&self) -> (Score, Decimal, usize, usize) {
        (self.score, self.variance, self.mv.touched(), self.index)
    }
}

pub(crate) struct LocalSearch<'p, 'a> {
    problem: &'p Problem<'a>,
    settings: &'p SolverSettings,
    deadline: Instant,
}

impl<'p, 'a> LocalSearch<'p, 'a> {
    pub fn new(problem: &'p Problem<'a>, settings: &'p SolverSettings, deadline: Instant) -> Self {
        Self {
            problem,
            settings,
            deadline,
        }
    }

    /// Improves `roster` in place until neither a move nor a chain helps,
    /// the iteration cap is hit or the deadline passes.
    pub fn run(&self, roster: &mut Roster, cache: &mut ScoreCache) -> SearchOutcome {
        let mut outcome = SearchOutcome::default();

        loop {
            if outcome.iterations >= self.settings.iteration_limit {
                outcome.iteration_limit_reached = true;
                break;
            }
            if Instant::now() >= self.deadline {
                outcome.timed_out = true;
                break;
            }
            outcome.iterations += 1;

            let current = cache.total(self.problem);
            let candidates = neighbourhood(self.problem, roster);
            let scored = self.evaluate(&candidates, roster, cache);
            outcome.moves_evaluated += scored.len() as u64;

            let best = scored.into_iter().min_by(|a, b| a.key().cmp(&b.key()));
            if let Some(best) = best.filter(|best| best.score < current) {
                trace!(
                    iteration = outcome.iterations,
                    mv = ?best.mv,
                    hard = best.score.hard,
                    soft = %best.score.soft,
                    "Applying move"
                );
                best.mv.apply(roster);
                cache.refresh(self.problem, roster, &best.mv.shifts(), &best.mv.employees());
                best.mv.record(&mut outcome.moves_applied);
                continue;
            }

            let Some((chain, score)) =
                EjectionChain::find_improving(self.problem, roster, cache, current)
            else {
                break;
            };
            trace!(
                iteration = outcome.iterations,
                length = chain.relocations.len(),
                hard = score.hard,
                soft = %score.soft,
                "Applying ejection chain"
            );
            chain.apply(roster);
            cache.refresh(self.problem, roster, &chain.shifts(), &chain.employees());
            outcome.moves_applied.chain += 1;
        }

        debug!(
            iterations = outcome.iterations,
            moves_evaluated = outcome.moves_evaluated,
            moves_applied = outcome.moves_applied.total(),
            timed_out = outcome.timed_out,
            "Local search finished"
        );

        outcome
    }

    /// Scores every feasible candidate, keeping generation order.
    fn evaluate(&self, candidates: &[Move], roster: &Roster, cache: &ScoreCache) -> Vec<Candidate> {
        let problem = self.problem;
        let score = |(index, mv): (usize, &Move)| -> Option<Candidate> {
            if !mv.is_feasible(problem, roster) {
                return None;
            }
            let (score, variance) = mv.score(problem, roster, cache);
            Some(Candidate {
                index,
                mv: *mv,
                score,
                variance,
            })
        };

        if self.settings.parallel_evaluation {
            candidates.par_iter().enumerate().filter_map(score).collect()
        } else {
            candidates.iter().enumerate().filter_map(score).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoringWeights;
    use crate::models::SchedulingRequest;
    use crate::scheduling::problem::fixtures::*;
    use chrono::Weekday;
    use std::time::Duration;

    fn far_deadline() -> Instant {
        Instant::now() + Duration::from_secs(60)
    }

    fn search(
        req: &SchedulingRequest,
        settings: &SolverSettings,
        seed: &[(usize, usize)],
        deadline: Instant,
    ) -> (Roster, SearchOutcome) {
        let w = ScoringWeights::default();
        let problem = Problem::new(req, &w);
        let mut roster = Roster::empty(problem.employee_count(), problem.shift_count());
        for &(e, s) in seed {
            roster.assign(e, s);
        }
        let mut cache = ScoreCache::build(&problem, &roster);
        let outcome = LocalSearch::new(&problem, settings, deadline).run(&mut roster, &mut cache);
        assert_eq!(
            cache.total(&problem),
            ScoreCache::build(&problem, &roster).total(&problem)
        );
        (roster, outcome)
    }

    fn lead_request() -> SchedulingRequest {
        SchedulingRequest::new(
            vec![
                employee("emp_lead", &["lead"], weekdays(7, 18)),
                employee("emp_b", &[], weekdays(7, 18)),
            ],
            vec![
                shift("a_open", 0, 8, 12, "Alpha"),
                requiring(shift("z_lead", 0, 8, 12, "Zulu"), &["lead"]),
            ],
            constraints(),
        )
    }

    #[test]
    fn test_relocates_from_overstaffed_shift() {
        let req = SchedulingRequest::new(
            vec![
                employee("emp_a", &[], weekdays(7, 18)),
                employee("emp_b", &[], weekdays(7, 18)),
            ],
            vec![
                shift("infant", 0, 8, 12, "Infant"),
                shift("toddler", 0, 8, 12, "Toddler"),
            ],
            constraints(),
        );
        let settings = SolverSettings::default();
        let (roster, outcome) = search(&req, &settings, &[(0, 0), (1, 0)], far_deadline());

        // Either employee could move; generation order picks emp_a.
        assert_eq!(roster.staff(0), &[1]);
        assert_eq!(roster.staff(1), &[0]);
        assert_eq!(outcome.moves_applied.relocate, 1);
        assert!(!outcome.timed_out);
        assert!(!outcome.iteration_limit_reached);
    }

    #[test]
    fn test_reassign_hands_shift_to_preferred_employee() {
        let req = SchedulingRequest::new(
            vec![
                employee("emp_a", &[], vec![window(Weekday::Mon, 7, 18, false)]),
                employee("emp_b", &[], vec![window(Weekday::Mon, 7, 18, true)]),
            ],
            vec![shift("infant", 0, 8, 12, "Infant")],
            constraints(),
        );
        let settings = SolverSettings::default();
        let (roster, outcome) = search(&req, &settings, &[(0, 0)], far_deadline());

        assert_eq!(roster.staff(0), &[1]);
        assert_eq!(outcome.moves_applied.reassign, 1);
    }

    #[test]
    fn test_inserts_into_empty_shift() {
        let req = SchedulingRequest::new(
            vec![employee("emp_a", &[], weekdays(7, 18))],
            vec![shift("infant", 0, 8, 12, "Infant")],
            constraints(),
        );
        let settings = SolverSettings::default();
        let (roster, outcome) = search(&req, &settings, &[], far_deadline());

        assert_eq!(roster.staff(0), &[0]);
        assert_eq!(outcome.moves_applied.insert, 1);
    }

    #[test]
    fn test_local_optimum_applies_nothing() {
        let req = lead_request();
        let settings = SolverSettings::default();
        let (_, outcome) = search(&req, &settings, &[(1, 0), (0, 1)], far_deadline());

        assert_eq!(outcome.iterations, 1);
        assert_eq!(outcome.moves_applied.total(), 0);
    }

    #[test]
    fn test_swap_moves_preference_mismatches() {
        let req = SchedulingRequest::new(
            vec![
                employee(
                    "emp_am",
                    &[],
                    vec![
                        window(Weekday::Mon, 7, 12, true),
                        window(Weekday::Tue, 7, 12, false),
                    ],
                ),
                employee(
                    "emp_tue",
                    &[],
                    vec![
                        window(Weekday::Mon, 7, 12, false),
                        window(Weekday::Tue, 7, 12, true),
                    ],
                ),
            ],
            vec![shift("mon", 0, 8, 11, "Infant"), shift("tue", 1, 8, 11, "Infant")],
            constraints(),
        );
        let settings = SolverSettings::default();
        let (roster, outcome) = search(&req, &settings, &[(0, 1), (1, 0)], far_deadline());

        assert_eq!(roster.staff(0), &[0]);
        assert_eq!(roster.staff(1), &[1]);
        assert_eq!(outcome.moves_applied.swap, 1);
    }

    #[test]
    fn test_expired_deadline_times_out_without_moving() {
        let req = lead_request();
        let settings = SolverSettings::default();
        let (roster, outcome) = search(&req, &settings, &[(1, 1)], Instant::now());

        assert!(outcome.timed_out);
        assert_eq!(outcome.iterations, 0);
        assert!(roster.staff(0).is_empty());
    }

    #[test]
    fn test_iteration_cap_stops_search() {
        let req = lead_request();
        let settings = SolverSettings {
            iteration_limit: 0,
            ..SolverSettings::default()
        };
        let (_, outcome) = search(&req, &settings, &[], far_deadline());
        assert!(outcome.iteration_limit_reached);
        assert!(!outcome.timed_out);
    }

    #[test]
    fn test_chain_frees_the_only_qualified_employee() {
        let req = SchedulingRequest::new(
            vec![
                employee("emp_x", &["x"], weekdays(7, 18)),
                employee("emp_plain", &[], weekdays(7, 18)),
            ],
            vec![
                shift("early", 0, 8, 12, "Infant"),
                requiring(shift("late", 0, 10, 14, "Toddler"), &["x"]),
            ],
            constraints(),
        );
        let settings = SolverSettings::default();
        let (roster, outcome) = search(&req, &settings, &[(0, 0)], far_deadline());

        assert_eq!(roster.staff(0), &[1]);
        assert_eq!(roster.staff(1), &[0]);
        assert_eq!(outcome.moves_applied.chain, 1);
        assert_eq!(outcome.moves_applied.total(), 1);
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let req = SchedulingRequest::new(
            (0..6)
                .map(|i| employee(&format!("emp_{}", i), &[], weekdays(6, 20)))
                .collect(),
            (0..5)
                .flat_map(|d| {
                    [
                        staffing(shift(&format!("am_{}", d), d, 7, 12, "Infant"), 1, 2, 3),
                        staffing(shift(&format!("pm_{}", d), d, 13, 18, "Toddler"), 1, 2, 3),
                    ]
                })
                .collect(),
            constraints(),
        );
        let parallel = SolverSettings::default();
        let sequential = SolverSettings {
            parallel_evaluation: false,
            ..SolverSettings::default()
        };

        let (a, oa) = search(&req, &parallel, &[], far_deadline());
        let (b, ob) = search(&req, &sequential, &[], far_deadline());
        assert_eq!(a, b);
        assert_eq!(oa, ob);
    }
}
