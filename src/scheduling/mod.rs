//! Shift scheduling.
//!
//! A solve runs in four phases:
//!
//! - **Init**: structural validation of the request ([`validate_request`])
//! - **Construct**: pinned assignments, then a greedy most-constrained-first
//!   fill of every shift
//! - **Improve**: best-improvement local search over swap, move, insert and
//!   reassign moves, with ejection chains to fill short shifts once no single
//!   move helps, until nothing improves or the budget runs out
//! - **Terminated**: status derivation and reporting
//!
//! Every candidate placement goes through the same feasibility filter
//! ([`check_feasibility`]) and every schedule is ranked by the same
//! [`Score`], compared hard part first.

mod chain;
mod construction;
mod feasibility;
mod local_search;
mod moves;
mod problem;
mod reporter;
mod scorer;
mod solver;
mod validation;

pub use feasibility::{Infeasibility, check_feasibility, is_feasible};
pub use scorer::{SCORE_SCALE, Score, Scorer};
pub use solver::{Solver, SolverPhase, solve};
pub use validation::{validate_assignments, validate_request};
