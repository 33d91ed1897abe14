pub mod convergence;
pub mod pick_store;
pub mod pipeline;
pub mod scoring;
pub mod snapshot_store;
pub mod sqlite_store;
pub mod tracker;

pub use convergence::ConvergenceScorer;
pub use pick_store::PickStore;
pub use pipeline::Pipeline;
pub use snapshot_store::SnapshotStore;
pub use sqlite_store::SqliteStore;
pub use tracker::OutcomeTracker;
