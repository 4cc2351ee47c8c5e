pub mod config;
pub mod datasource;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;
pub mod warehouse;

pub use config::Config;
pub use datasource::{Batch, BatchSource, CsvBatchSource, MockBatchSource, SourceError};
pub use domain::{
    fingerprint, parse_amount, parse_timestamp, Amount, Entity, Fingerprint, NormalizeError,
    Order, OrderId, RawOrder, RawUser, UnknownEntity, UserId, UserVersion, VersionKey,
};
pub use engine::{
    upsert_order, upsert_user, OrderMergeOutcome, StaleUserPolicy, UserMergeOutcome,
};
pub use error::AppError;
pub use orchestration::{run_batch, BatchError, BatchReport, OrderStats, UserStats};
pub use warehouse::{WarehouseState, Watermarks};
