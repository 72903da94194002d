//! HTTP API module for the roster engine.
//!
//! This module provides the REST endpoints for solving scheduling requests
//! and for checking that the service is up.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::SolveRequest;
pub use response::{ApiError, HealthResponse, SolverStatusResponse};
pub use state::{AppState, SolveGuard};
