//! Ejection chains: filling a short shift by moving staff along a path.
//!
//! When no single move improves the roster, a shift below its target may
//! still be fillable. Someone already rostered elsewhere moves into it, their
//! old shift is backfilled the same way, and the chain ends with an employee
//! who can simply be added. Every shift on the path keeps its head count
//! except the one being filled.
//!
//! Each employee appears at most once on a chain, so checking each step
//! against that employee's current shifts is enough for the whole chain to
//! be feasible.

use std::collections::{HashMap, VecDeque};

use super::problem::{Problem, Roster};
use super::scorer::{Score, ScoreCache};

/// A staff movement `employee: from -> to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Relocation {
    pub employee: usize,
    pub from: usize,
    pub to: usize,
}

/// Relocations ending in one insert; the first relocation fills the short
/// shift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EjectionChain {
    pub relocations: Vec<Relocation>,
    pub insert: (usize, usize),
}

impl EjectionChain {
    /// Finds the first chain, in shift order, whose result strictly beats
    /// `current`, together with its score.
    pub fn find_improving(
        problem: &Problem<'_>,
        roster: &Roster,
        cache: &ScoreCache,
        current: Score,
    ) -> Option<(Self, Score)> {
        (0..problem.shift_count())
            .filter(|&s| problem.wants_staff(roster, s))
            .filter_map(|s| Self::shortest(problem, roster, s))
            .map(|chain| {
                let score = chain.score(problem, roster, cache);
                (chain, score)
            })
            .find(|&(_, score)| score < current)
    }

    /// Breadth-first search for the shortest chain filling `target`.
    fn shortest(problem: &Problem<'_>, roster: &Roster, target: usize) -> Option<Self> {
        // parent[from] = (employee, to): `employee` leaves `from` for `to`.
        let mut parent: HashMap<usize, (usize, usize)> = HashMap::new();
        let mut queue = VecDeque::from([target]);

        while let Some(need) = queue.pop_front() {
            let on_path = path_employees(&parent, need);

            let free = (0..problem.employee_count()).find(|&e| {
                !on_path.contains(&e)
                    && !roster.contains(e, need)
                    && problem.can_take(roster, e, need, &[])
            });
            if let Some(employee) = free {
                return Some(Self {
                    relocations: unwind(&parent, need),
                    insert: (employee, need),
                });
            }

            for (employee, from) in roster.pairs() {
                if from == need
                    || from == target
                    || parent.contains_key(&from)
                    || on_path.contains(&employee)
                    || problem.is_pinned(employee, from)
                    || roster.contains(employee, need)
                    || !problem.can_take(roster, employee, need, &[from])
                {
                    continue;
                }
                parent.insert(from, (employee, need));
                queue.push_back(from);
            }
        }

        None
    }

    pub fn apply(&self, roster: &mut Roster) {
        for r in &self.relocations {
            roster.unassign(r.employee, r.from);
            roster.assign(r.employee, r.to);
        }
        let (employee, shift) = self.insert;
        roster.assign(employee, shift);
    }

    pub fn shifts(&self) -> Vec<usize> {
        let mut shifts: Vec<usize> = self.relocations.iter().map(|r| r.to).collect();
        shifts.push(self.insert.1);
        shifts
    }

    pub fn employees(&self) -> Vec<usize> {
        let mut employees: Vec<usize> = self.relocations.iter().map(|r| r.employee).collect();
        employees.push(self.insert.0);
        employees
    }

    fn score(&self, problem: &Problem<'_>, roster: &Roster, cache: &ScoreCache) -> Score {
        let mut after = roster.clone();
        self.apply(&mut after);

        let shifts: Vec<(usize, &[usize])> =
            self.shifts().into_iter().map(|s| (s, after.staff(s))).collect();
        let employees: Vec<(usize, &[usize])> = self
            .employees()
            .into_iter()
            .map(|e| (e, after.shifts_of(e)))
            .collect();
        cache.evaluate_change(problem, roster, &shifts, &employees).0
    }
}

/// Employees already moving on the path from `shift` back to the target.
fn path_employees(parent: &HashMap<usize, (usize, usize)>, mut shift: usize) -> Vec<usize> {
    let mut employees = Vec::new();
    while let Some(&(employee, to)) = parent.get(&shift) {
        employees.push(employee);
        shift = to;
    }
    employees
}

/// Relocations from the target outwards to `shift`.
fn unwind(parent: &HashMap<usize, (usize, usize)>, mut shift: usize) -> Vec<Relocation> {
    let mut relocations = Vec::new();
    while let Some(&(employee, to)) = parent.get(&shift) {
        relocations.push(Relocation {
            employee,
            from: shift,
            to,
        });
        shift = to;
    }
    relocations.reverse();
    relocations
}
