//! Staff roster engine for childcare centres.
//!
//! This crate assigns employees to shifts while honouring availability,
//! skills, weekly hour limits, rest periods and child-to-staff ratios, and
//! serves the solver over a small HTTP API.

#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod scheduling;
