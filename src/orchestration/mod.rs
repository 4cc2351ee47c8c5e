pub mod batch;
pub mod runner;

pub use batch::{
    process_orders_batch, process_users_batch, run_batch, run_batch_with_policy, BatchError,
    BatchReport, OrderStats, UserStats,
};
pub use runner::{FailedBatch, OrchestrationError, Orchestrator, RunSummary};
