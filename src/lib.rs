//! Kestrel - daily stock signal scoring and pick tracking server

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod types;

use services::{ConvergenceScorer, OutcomeTracker, PickStore, Pipeline, SnapshotStore};
use std::sync::Arc;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Config>,
    pub snapshots: Arc<SnapshotStore>,
    pub picks: Arc<PickStore>,
    pub pipeline: Arc<Pipeline>,
    pub convergence: Arc<ConvergenceScorer>,
    pub tracker: Arc<OutcomeTracker>,
}

impl AppState {
    /// Wire up stores and services from a configuration. SQLite is not
    /// connected here; the caller attaches it when durability is wanted.
    pub fn new(config: config::Config) -> Self {
        let config = Arc::new(config);
        let snapshots = SnapshotStore::new();
        let picks = PickStore::new();
        let pipeline = Pipeline::new(Arc::clone(&snapshots), config.history_days);
        let convergence = ConvergenceScorer::new(
            Arc::clone(&snapshots),
            Arc::clone(&picks),
            config.convergence.clone(),
        );
        let tracker = OutcomeTracker::new(
            Arc::clone(&snapshots),
            Arc::clone(&picks),
            config.tracking.clone(),
        );

        Self {
            config,
            snapshots,
            picks,
            pipeline,
            convergence,
            tracker,
        }
    }
}

// Re-export commonly used types
pub use types::*;
