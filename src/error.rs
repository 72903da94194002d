//! Error types for the roster engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for configuration failures and for the structural problems that make a
//! scheduling request unsolvable before any search starts.

use thiserror::Error;

/// The main error type for the roster engine.
///
/// Configuration loading returns this error directly. Structural validation of
/// a [`SchedulingRequest`](crate::models::SchedulingRequest) collects these
/// errors and reports them inside the solve result instead of aborting the
/// caller.
///
/// # Example
///
/// ```
/// use roster_engine::error::EngineError;
///
/// let error = EngineError::DuplicateShift {
///     shift_id: "shift_mon_am".to_string(),
/// };
/// assert_eq!(error.to_string(), "Duplicate shift id: shift_mon_am");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A configuration value was out of range.
    #[error("Invalid configuration value '{field}': {message}")]
    InvalidConfig {
        /// The offending field.
        field: String,
        /// Why the value was rejected.
        message: String,
    },

    /// Two employees in one request share an id.
    #[error("Duplicate employee id: {employee_id}")]
    DuplicateEmployee {
        /// The repeated id.
        employee_id: String,
    },

    /// Two shifts in one request share an id.
    #[error("Duplicate shift id: {shift_id}")]
    DuplicateShift {
        /// The repeated id.
        shift_id: String,
    },

    /// A shift was invalid or contained inconsistent data.
    #[error("Invalid shift '{shift_id}': {message}")]
    InvalidShift {
        /// The ID of the invalid shift.
        shift_id: String,
        /// A description of what made the shift invalid.
        message: String,
    },

    /// An employee record was invalid or contained inconsistent data.
    #[error("Invalid employee '{employee_id}': {message}")]
    InvalidEmployee {
        /// The ID of the invalid employee.
        employee_id: String,
        /// A description of what made the record invalid.
        message: String,
    },

    /// The global scheduling constraints were degenerate.
    #[error("Invalid constraint '{field}': {message}")]
    InvalidConstraints {
        /// The constraint field that was rejected.
        field: String,
        /// A description of the problem.
        message: String,
    },

    /// A pinned or seeded assignment referenced an employee not in the request.
    #[error("Unknown employee referenced by assignment: {employee_id}")]
    UnknownEmployee {
        /// The unknown id.
        employee_id: String,
    },

    /// A pinned or seeded assignment referenced a shift not in the request.
    #[error("Unknown shift referenced by assignment: {shift_id}")]
    UnknownShift {
        /// The unknown id.
        shift_id: String,
    },
}

impl EngineError {
    /// Returns true for errors caused by the request content rather than the
    /// engine's own configuration.
    pub fn is_request_error(&self) -> bool {
        !matches!(
            self,
            EngineError::ConfigNotFound { .. }
                | EngineError::ConfigParseError { .. }
                | EngineError::InvalidConfig { .. }
        )
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
