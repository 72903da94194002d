//! Configuration types for the roster engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files. Every field has a default
//! so partial files are accepted.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Search budget and solver behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// Time budget used when a request does not name one.
    pub time_budget_ms: u64,
    /// Upper bound on any requested time budget.
    pub max_time_budget_ms: u64,
    /// Maximum improvement iterations per solve.
    pub iteration_limit: u32,
    /// Whether candidate moves are scored on the rayon thread pool.
    pub parallel_evaluation: bool,
    /// Whether missing slots appear in the result as "unfilled" assignments.
    pub report_unfilled_slots: bool,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            time_budget_ms: 30_000,
            max_time_budget_ms: 300_000,
            iteration_limit: 10_000,
            parallel_evaluation: true,
            report_unfilled_slots: false,
        }
    }
}

/// Penalty weights for each score term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Hard penalty per staff member missing below `min_staff`.
    pub min_staff_shortfall: i64,
    /// Hard penalty per staffed room without a lead.
    pub missing_lead: i64,
    /// Hard penalty per staff member missing under the child-to-staff ratio.
    pub ratio_shortfall: i64,
    /// Soft penalty per staff member missing below `required_staff`.
    pub required_staff_shortfall: Decimal,
    /// Soft penalty per assignment in a non-preferred window.
    pub non_preferred_slot: Decimal,
    /// Soft penalty per overtime hour.
    pub overtime_per_hour: Decimal,
    /// Soft penalty per unit of shift-count variance.
    pub imbalance: Decimal,
    /// Soft penalty per staff member above `required_staff`.
    pub overstaffing: Decimal,
    /// Soft penalty per missing staff member when ratios are soft.
    pub soft_ratio_shortfall: Decimal,
    /// Skills that make an employee a room lead.
    pub lead_skills: Vec<String>,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            min_staff_shortfall: 1000,
            missing_lead: 500,
            ratio_shortfall: 1000,
            required_staff_shortfall: Decimal::from(10),
            non_preferred_slot: Decimal::ONE,
            overtime_per_hour: Decimal::from(2),
            imbalance: Decimal::ONE,
            overstaffing: Decimal::new(5, 1),
            soft_ratio_shortfall: Decimal::from(50),
            lead_skills: vec![
                "lead".to_string(),
                "lead-teacher".to_string(),
                "lead_teacher".to_string(),
            ],
        }
    }
}

/// What the reporter includes in a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportingSettings {
    /// Soft violations with a penalty at or below this value are not listed
    /// as warnings.
    pub warning_threshold: Decimal,
}

impl Default for ReportingSettings {
    fn default() -> Self {
        Self {
            warning_threshold: Decimal::ZERO,
        }
    }
}

/// Contents of `solver.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverFile {
    /// Solver section.
    pub solver: SolverSettings,
    /// Reporting section.
    pub reporting: ReportingSettings,
}

/// Contents of `scoring.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringFile {
    /// Weights section.
    pub weights: ScoringWeights,
}

/// The complete engine configuration.
///
/// # Example
///
/// ```
/// use roster_engine::config::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert!(config.validate().is_ok());
/// assert_eq!(config.scoring.min_staff_shortfall, 1000);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Search budget and behaviour.
    pub solver: SolverSettings,
    /// Score weights.
    pub scoring: ScoringWeights,
    /// Reporting thresholds.
    pub reporting: ReportingSettings,
}

impl EngineConfig {
    /// Assembles a configuration from its two files.
    pub fn from_files(solver: SolverFile, scoring: ScoringFile) -> Self {
        Self {
            solver: solver.solver,
            scoring: scoring.weights,
            reporting: solver.reporting,
        }
    }

    /// Checks that every value is usable.
    ///
    /// Returns the first offending field as [`EngineError::InvalidConfig`].
    pub fn validate(&self) -> EngineResult<()> {
        if self.solver.max_time_budget_ms == 0 {
            return Err(invalid("solver.max_time_budget_ms", "must be positive"));
        }
        if self.solver.time_budget_ms > self.solver.max_time_budget_ms {
            return Err(invalid(
                "solver.time_budget_ms",
                "must not exceed solver.max_time_budget_ms",
            ));
        }

        let hard = [
            ("scoring.min_staff_shortfall", self.scoring.min_staff_shortfall),
            ("scoring.missing_lead", self.scoring.missing_lead),
            ("scoring.ratio_shortfall", self.scoring.ratio_shortfall),
        ];
        for (field, weight) in hard {
            if weight <= 0 {
                return Err(invalid(field, "hard weights must be positive"));
            }
        }

        let soft = [
            (
                "scoring.required_staff_shortfall",
                self.scoring.required_staff_shortfall,
            ),
            ("scoring.non_preferred_slot", self.scoring.non_preferred_slot),
            ("scoring.overtime_per_hour", self.scoring.overtime_per_hour),
            ("scoring.imbalance", self.scoring.imbalance),
            ("scoring.overstaffing", self.scoring.overstaffing),
            ("scoring.soft_ratio_shortfall", self.scoring.soft_ratio_shortfall),
            ("reporting.warning_threshold", self.reporting.warning_threshold),
        ];
        for (field, weight) in soft {
            if weight.is_sign_negative() {
                return Err(invalid(field, "must not be negative"));
            }
        }

        if self.scoring.overstaffing >= self.scoring.required_staff_shortfall
            && self.scoring.required_staff_shortfall > Decimal::ZERO
        {
            return Err(invalid(
                "scoring.overstaffing",
                "must be smaller than scoring.required_staff_shortfall",
            ));
        }

        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> EngineError {
    EngineError::InvalidConfig {
        field: field.to_string(),
        message: message.to_string(),
    }
}
