//! Application state for the roster engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::config::ConfigLoader;

/// Shared application state.
///
/// Holds the loaded engine configuration and a count of in-flight solves.
#[derive(Clone)]
pub struct AppState {
    /// The loaded engine configuration.
    config: Arc<ConfigLoader>,
    active_solves: Arc<AtomicUsize>,
}

impl AppState {
    /// Creates a new application state with the given configuration loader.
    pub fn new(config: ConfigLoader) -> Self {
        Self {
            config: Arc::new(config),
            active_solves: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns a shared handle to the configuration loader, for work moved
    /// off the async runtime.
    pub fn shared_config(&self) -> Arc<ConfigLoader> {
        Arc::clone(&self.config)
    }

    /// Number of solves currently running.
    pub fn active_solves(&self) -> usize {
        self.active_solves.load(Ordering::Relaxed)
    }

    /// Marks a solve as started. The count drops again when the guard does.
    pub fn begin_solve(&self) -> SolveGuard {
        self.active_solves.fetch_add(1, Ordering::Relaxed);
        SolveGuard {
            active_solves: Arc::clone(&self.active_solves),
        }
    }
}

/// Keeps a solve counted in [`AppState::active_solves`] while alive.
#[derive(Debug)]
pub struct SolveGuard {
    active_solves: Arc<AtomicUsize>,
}

impl Drop for SolveGuard {
    fn drop(&mut self) {
        self.active_solves.fetch_sub(1, Ordering::Relaxed);
    }
}
