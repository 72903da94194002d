//! The local-search neighbourhood.
//!
//! Candidates are generated in a fixed order from the current roster and
//! scored against a read-only snapshot, so evaluation can run on any number
//! of threads. Only [`Move::apply`] mutates the roster.

use rust_decimal::Decimal;

use crate::models::MoveCounts;

use super::problem::{Problem, Roster, insert_sorted, remove_sorted};
use super::scorer::{Score, ScoreCache};

/// One change to the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Move {
    /// Two employees exchange one shift each.
    Swap {
        first: usize,
        first_shift: usize,
        second: usize,
        second_shift: usize,
    },
    /// An employee leaves one shift for another that wants staff.
    Relocate { employee: usize, from: usize, to: usize },
    /// An employee is added to a shift that wants staff.
    Insert { employee: usize, shift: usize },
    /// An assigned employee is replaced on their shift.
    Reassign {
        shift: usize,
        outgoing: usize,
        incoming: usize,
    },
}

impl Move {
    /// Number of distinct employees the move changes.
    pub fn touched(&self) -> usize {
        match self {
            Move::Swap { .. } | Move::Reassign { .. } => 2,
            Move::Relocate { .. } | Move::Insert { .. } => 1,
        }
    }

    pub fn record(&self, counts: &mut MoveCounts) {
        match self {
            Move::Swap { .. } => counts.swap += 1,
            Move::Relocate { .. } => counts.relocate += 1,
            Move::Insert { .. } => counts.insert += 1,
            Move::Reassign { .. } => counts.reassign += 1,
        }
    }

    /// Whether every touched employee may legally hold their new shift.
    pub fn is_feasible(&self, problem: &Problem<'_>, roster: &Roster) -> bool {
        match *self {
            Move::Swap {
                first,
                first_shift,
                second,
                second_shift,
            } => {
                problem.can_take(roster, first, second_shift, &[first_shift])
                    && problem.can_take(roster, second, first_shift, &[second_shift])
            }
            Move::Relocate { employee, from, to } => problem.can_take(roster, employee, to, &[from]),
            Move::Insert { employee, shift } => problem.can_take(roster, employee, shift, &[]),
            Move::Reassign {
                shift, incoming, ..
            } => problem.can_take(roster, incoming, shift, &[]),
        }
    }

    /// Score and variance the roster would have after the move.
    pub fn score(&self, problem: &Problem<'_>, roster: &Roster, cache: &ScoreCache) -> (Score, Decimal) {
        let (shifts, employees) = self.changed_lists(roster);
        let shifts: Vec<(usize, &[usize])> = shifts.iter().map(|(s, l)| (*s, l.as_slice())).collect();
        let employees: Vec<(usize, &[usize])> =
            employees.iter().map(|(e, l)| (*e, l.as_slice())).collect();
        cache.evaluate_change(problem, roster, &shifts, &employees)
    }

    pub fn apply(&self, roster: &mut Roster) {
        match *self {
            Move::Swap {
                first,
                first_shift,
                second,
                second_shift,
            } => {
                roster.unassign(first, first_shift);
                roster.unassign(second, second_shift);
                roster.assign(first, second_shift);
                roster.assign(second, first_shift);
            }
            Move::Relocate { employee, from, to } => {
                roster.unassign(employee, from);
                roster.assign(employee, to);
            }
            Move::Insert { employee, shift } => {
                roster.assign(employee, shift);
            }
            Move::Reassign {
                shift,
                outgoing,
                incoming,
            } => {
                roster.unassign(outgoing, shift);
                roster.assign(incoming, shift);
            }
        }
    }

    pub fn shifts(&self) -> Vec<usize> {
        match *self {
            Move::Swap {
                first_shift,
                second_shift,
                ..
            } => vec![first_shift, second_shift],
            Move::Relocate { from, to, .. } => vec![from, to],
            Move::Insert { shift, .. } | Move::Reassign { shift, .. } => vec![shift],
        }
    }

    pub fn employees(&self) -> Vec<usize> {
        match *self {
            Move::Swap { first, second, .. } => vec![first, second],
            Move::Relocate { employee, .. } | Move::Insert { employee, .. } => vec![employee],
            Move::Reassign {
                outgoing, incoming, ..
            } => vec![outgoing, incoming],
        }
    }

    /// New staff lists for changed shifts and new shift lists for changed
    /// employees.
    fn changed_lists(&self, roster: &Roster) -> (Lists, Lists) {
        match *self {
            Move::Swap {
                first,
                first_shift,
                second,
                second_shift,
            } => (
                vec![
                    (first_shift, edited(roster.staff(first_shift), first, second)),
                    (second_shift, edited(roster.staff(second_shift), second, first)),
                ],
                vec![
                    (first, edited(roster.shifts_of(first), first_shift, second_shift)),
                    (second, edited(roster.shifts_of(second), second_shift, first_shift)),
                ],
            ),
            Move::Relocate { employee, from, to } => (
                vec![
                    (from, without(roster.staff(from), employee)),
                    (to, with(roster.staff(to), employee)),
                ],
                vec![(employee, edited(roster.shifts_of(employee), from, to))],
            ),
            Move::Insert { employee, shift } => (
                vec![(shift, with(roster.staff(shift), employee))],
                vec![(employee, with(roster.shifts_of(employee), shift))],
            ),
            Move::Reassign {
                shift,
                outgoing,
                incoming,
            } => (
                vec![(shift, edited(roster.staff(shift), outgoing, incoming))],
                vec![
                    (outgoing, without(roster.shifts_of(outgoing), shift)),
                    (incoming, with(roster.shifts_of(incoming), shift)),
                ],
            ),
        }
    }
}

/// `(index, new sorted list)` pairs.
type Lists = Vec<(usize, Vec<usize>)>;

fn with(list: &[usize], value: usize) -> Vec<usize> {
    let mut list = list.to_vec();
    insert_sorted(&mut list, value);
    list
}

fn without(list: &[usize], value: usize) -> Vec<usize> {
    let mut list = list.to_vec();
    remove_sorted(&mut list, value);
    list
}

fn edited(list: &[usize], out: usize, replacement: usize) -> Vec<usize> {
    let mut list = list.to_vec();
    remove_sorted(&mut list, out);
    insert_sorted(&mut list, replacement);
    list
}

/// Every candidate move from the current roster, in generation order.
///
/// Candidates are pruned by static eligibility and capacity only; the full
/// feasibility filter runs during evaluation.
pub(crate) fn neighbourhood(problem: &Problem<'_>, roster: &Roster) -> Vec<Move> {
    let movable: Vec<(usize, usize)> = roster
        .pairs()
        .filter(|&(e, s)| !problem.is_pinned(e, s))
        .collect();
    let wanting: Vec<usize> = (0..problem.shift_count())
        .filter(|&s| problem.wants_staff(roster, s))
        .collect();

    let mut moves = Vec::new();

    for (i, &(first, first_shift)) in movable.iter().enumerate() {
        for &(second, second_shift) in &movable[i + 1..] {
            if first != second
                && first_shift != second_shift
                && !roster.contains(first, second_shift)
                && !roster.contains(second, first_shift)
                && problem.eligible[first][second_shift]
                && problem.eligible[second][first_shift]
            {
                moves.push(Move::Swap {
                    first,
                    first_shift,
                    second,
                    second_shift,
                });
            }
        }
    }

    for &(employee, from) in &movable {
        for &to in &wanting {
            if to != from && !roster.contains(employee, to) && problem.eligible[employee][to] {
                moves.push(Move::Relocate { employee, from, to });
            }
        }
    }

    for &shift in &wanting {
        for employee in 0..problem.employee_count() {
            if !roster.contains(employee, shift) && problem.eligible[employee][shift] {
                moves.push(Move::Insert { employee, shift });
            }
        }
    }

    for &(outgoing, shift) in &movable {
        for incoming in 0..problem.employee_count() {
            if incoming != outgoing
                && !roster.contains(incoming, shift)
                && problem.eligible[incoming][shift]
            {
                moves.push(Move::Reassign {
                    shift,
                    outgoing,
                    incoming,
                });
            }
        }
    }

    moves
}
