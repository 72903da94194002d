//! Configuration loading and management for the roster engine.
//!
//! This module loads solver budgets, score weights and reporting thresholds
//! from YAML files, or supplies built-in defaults.
//!
//! # Example
//!
//! ```no_run
//! use roster_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Default budget: {} ms", config.config().solver.time_budget_ms);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    EngineConfig, ReportingSettings, ScoringFile, ScoringWeights, SolverFile, SolverSettings,
};
