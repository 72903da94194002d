//! Core data models for the roster engine.
//!
//! This module contains all the domain models used throughout the engine.

mod assignment;
mod constraints;
mod employee;
mod request;
mod scheduling_result;
mod shift;

pub use assignment::{Assignment, AssignmentStatus};
pub use constraints::{RatioEnforcement, SchedulingConstraints};
pub use employee::{Availability, Employee};
pub use request::{PinnedAssignment, SchedulingRequest};
pub use scheduling_result::{
    MoveCounts, ScheduleError, ScheduleWarning, SchedulingResult, ScoreBreakdown, Severity,
    SolveStatistics, SolveStatus,
};
pub use shift::Shift;
