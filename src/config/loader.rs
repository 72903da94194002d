//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine
//! configuration from YAML files.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{EngineError, EngineResult};

use super::types::{EngineConfig, ScoringFile, SolverFile};

/// Loads and provides access to engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── solver.yaml   # time budget, iteration cap, reporting threshold
/// └── scoring.yaml  # penalty weights and lead skills
/// ```
///
/// # Example
///
/// ```no_run
/// use roster_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default")?;
/// println!("Iteration cap: {}", loader.config().solver.iteration_limit);
/// # Ok::<(), roster_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Either file is missing
    /// - Either file contains invalid YAML
    /// - A value fails [`EngineConfig::validate`]
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let solver = Self::load_yaml::<SolverFile>(&path.join("solver.yaml"))?;
        let scoring = Self::load_yaml::<ScoringFile>(&path.join("scoring.yaml"))?;

        let config = EngineConfig::from_files(solver, scoring);
        config.validate()?;

        debug!(
            path = %path.display(),
            time_budget_ms = config.solver.time_budget_ms,
            iteration_limit = config.solver.iteration_limit,
            "Loaded engine configuration"
        );

        Ok(Self { config })
    }

    /// Wraps an already-built configuration after validating it.
    pub fn from_config(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the underlying engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Clamps a requested time budget to the configured maximum, falling back
    /// to the default budget when none is requested.
    ///
    /// # Example
    ///
    /// ```
    /// use roster_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::default();
    /// assert_eq!(loader.effective_budget_ms(None), 30_000);
    /// assert_eq!(loader.effective_budget_ms(Some(500)), 500);
    /// assert_eq!(loader.effective_budget_ms(Some(u64::MAX)), 300_000);
    /// ```
    pub fn effective_budget_ms(&self, requested: Option<u64>) -> u64 {
        let solver = &self.config.solver;
        requested
            .unwrap_or(solver.time_budget_ms)
            .min(solver.max_time_budget_ms)
    }
}
