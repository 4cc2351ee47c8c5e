//! Batch source abstraction for delivering raw order and user batches.

use crate::domain::{RawOrder, RawUser};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub mod csv;
pub mod mock;

pub use self::csv::CsvBatchSource;
pub use mock::MockBatchSource;

/// One delivery of raw records, identified by its label (usually a date).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    pub label: String,
    pub orders: Vec<RawOrder>,
    pub users: Vec<RawUser>,
}

impl Batch {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn with_orders(mut self, orders: Vec<RawOrder>) -> Self {
        self.orders.extend(orders);
        self
    }

    pub fn with_users(mut self, users: Vec<RawUser>) -> Self {
        self.users.extend(users);
        self
    }
}

/// Source of batches to merge into the warehouse.
#[async_trait]
pub trait BatchSource: Send + Sync + fmt::Debug {
    /// Labels of the available batches, in the order they must be applied.
    async fn list_batches(&self) -> Result<Vec<String>, SourceError>;

    /// Fetch the raw records of one batch.
    ///
    /// Records keep the order in which the source delivered them.
    async fn fetch_batch(&self, label: &str) -> Result<Batch, SourceError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("io error: {0}")]
    Io(String),
    #[error("batch not found: {0}")]
    NotFound(String),
    #[error("lz4 decode error: {0}")]
    Lz4(String),
    #[error("csv parse error: {0}")]
    Csv(String),
}

impl From<std::io::Error> for SourceError {
    fn from(err: std::io::Error) -> Self {
        SourceError::Io(err.to_string())
    }
}
