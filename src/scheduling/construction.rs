//! Greedy construction of the starting roster.
//!
//! Shifts are filled most-constrained-first within each start time: shifts
//! with fewer candidate employees go before shifts with more.

use tracing::debug;

use super::moves::Move;
use super::problem::{Problem, Roster};
use super::scorer::ScoreCache;

/// Places pinned assignments, then fills every shift toward its target
/// staffing with the best-scoring feasible employee at each step.
///
/// Returns the number of shifts left below `min_staff`.
pub(crate) fn construct(problem: &Problem<'_>, roster: &mut Roster, cache: &mut ScoreCache) -> u32 {
    place_pins(problem, roster, cache);

    let mut gaps = 0;
    for shift in construction_order(problem) {
        while problem.wants_staff(roster, shift) {
            let best = (0..problem.employee_count())
                .filter(|&employee| !roster.contains(employee, shift))
                .map(|employee| Move::Insert { employee, shift })
                .filter(|insert| insert.is_feasible(problem, roster))
                .map(|insert| {
                    let (score, variance) = insert.score(problem, roster, cache);
                    ((score, variance), insert)
                })
                .min_by(|a, b| a.0.cmp(&b.0));

            let Some((_, insert)) = best else {
                break;
            };
            insert.apply(roster);
            cache.refresh(problem, roster, &insert.shifts(), &insert.employees());
        }

        let s = &problem.shifts[shift];
        let staffed = roster.staff(shift).len();
        if staffed < s.min_staff as usize {
            gaps += 1;
            debug!(
                shift_id = %s.id,
                staffed,
                min_staff = s.min_staff,
                "Shift left below minimum staff after construction"
            );
        }
    }

    gaps
}

/// Places every pinned pairing without feasibility checks.
pub(crate) fn place_pins(problem: &Problem<'_>, roster: &mut Roster, cache: &mut ScoreCache) {
    if problem.pins.is_empty() {
        return;
    }
    for &(employee, shift) in &problem.pins {
        roster.assign(employee, shift);
    }
    *cache = ScoreCache::build(problem, roster);
}

/// Shifts by date, start time, candidate count, room and id.
///
/// Candidate count is measured against an empty roster so the order does
/// not depend on earlier placements.
pub(crate) fn construction_order(problem: &Problem<'_>) -> Vec<usize> {
    let empty = Roster::empty(problem.employee_count(), problem.shift_count());
    let scarcity: Vec<usize> = (0..problem.shift_count())
        .map(|s| {
            (0..problem.employee_count())
                .filter(|&e| problem.can_take(&empty, e, s, &[]))
                .count()
        })
        .collect();

    let mut order: Vec<usize> = (0..problem.shift_count()).collect();
    order.sort_by(|&a, &b| {
        let (sa, sb) = (&problem.shifts[a], &problem.shifts[b]);
        (sa.date, sa.start_time, scarcity[a], &sa.room, &sa.id).cmp(&(
            sb.date,
            sb.start_time,
            scarcity[b],
            &sb.room,
            &sb.id,
        ))
    });
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoringWeights;
    use crate::models::{PinnedAssignment, SchedulingRequest};
    use crate::scheduling::problem::fixtures::*;
    use chrono::Weekday;

    fn build(req: &SchedulingRequest, w: &ScoringWeights) -> (Roster, u32) {
        let problem = Problem::new(req, w);
        let mut roster = Roster::empty(problem.employee_count(), problem.shift_count());
        let mut cache = ScoreCache::build(&problem, &roster);
        let gaps = construct(&problem, &mut roster, &mut cache);
        assert_eq!(
            cache.total(&problem),
            ScoreCache::build(&problem, &roster).total(&problem)
        );
        (roster, gaps)
    }

    #[test]
    fn test_scarce_shift_ordered_first_within_start_time() {
        let req = SchedulingRequest::new(
            vec![
                employee("emp_lead", &["lead"], weekdays(7, 18)),
                employee("emp_b", &[], weekdays(7, 18)),
            ],
            vec![
                shift("a_open", 0, 8, 12, "Alpha"),
                requiring(shift("z_lead", 0, 8, 12, "Zulu"), &["lead"]),
                shift("earlier", 0, 7, 8, "Zulu"),
            ],
            constraints(),
        );
        let w = ScoringWeights::default();
        let problem = Problem::new(&req, &w);

        assert_eq!(construction_order(&problem), vec![2, 1, 0]);
    }

    #[test]
    fn test_most_constrained_first_avoids_gap() {
        // Greedy in room order would give the lead to Alpha and starve Zulu.
        let req = SchedulingRequest::new(
            vec![
                employee("emp_lead", &["lead"], weekdays(7, 18)),
                employee("emp_b", &[], weekdays(7, 18)),
            ],
            vec![
                shift("a_open", 0, 8, 12, "Alpha"),
                requiring(shift("z_lead", 0, 8, 12, "Zulu"), &["lead"]),
            ],
            constraints(),
        );
        let w = ScoringWeights::default();
        let (roster, gaps) = build(&req, &w);

        assert_eq!(gaps, 0);
        assert_eq!(roster.staff(1), &[0]);
        assert_eq!(roster.staff(0), &[1]);
    }

    #[test]
    fn test_prefers_preferred_window() {
        let req = SchedulingRequest::new(
            vec![
                employee("emp_a", &[], vec![window(Weekday::Mon, 7, 18, false)]),
                employee("emp_b", &[], vec![window(Weekday::Mon, 7, 18, true)]),
            ],
            vec![shift("s1", 0, 8, 12, "Infant")],
            constraints(),
        );
        let w = ScoringWeights::default();
        let (roster, _) = build(&req, &w);
        assert_eq!(roster.staff(0), &[1]);
    }

    #[test]
    fn test_unfillable_shift_counted_as_gap() {
        let req = SchedulingRequest::new(
            vec![employee("emp_a", &[], vec![window(Weekday::Mon, 8, 12, true)])],
            vec![shift("pm", 0, 13, 17, "Infant")],
            constraints(),
        );
        let w = ScoringWeights::default();
        let (roster, gaps) = build(&req, &w);
        assert_eq!(gaps, 1);
        assert!(roster.staff(0).is_empty());
    }

    #[test]
    fn test_pins_placed_even_when_infeasible() {
        let mut req = SchedulingRequest::new(
            vec![employee("emp_a", &[], vec![window(Weekday::Tue, 8, 12, true)])],
            vec![shift("mon", 0, 8, 12, "Infant")],
            constraints(),
        );
        req.pinned_assignments.push(PinnedAssignment {
            employee_id: "emp_a".to_string(),
            shift_id: "mon".to_string(),
        });
        let w = ScoringWeights::default();
        let (roster, gaps) = build(&req, &w);
        assert_eq!(gaps, 0);
        assert_eq!(roster.staff(0), &[0]);
    }

    #[test]
    fn test_fills_to_required_not_max() {
        let req = SchedulingRequest::new(
            (0..4)
                .map(|i| employee(&format!("emp_{}", i), &[], weekdays(7, 18)))
                .collect(),
            vec![staffing(shift("s1", 0, 8, 12, "Infant"), 1, 2, 4)],
            constraints(),
        );
        let w = ScoringWeights::default();
        let (roster, _) = build(&req, &w);
        assert_eq!(roster.staff(0), &[0, 1]);
    }
}
