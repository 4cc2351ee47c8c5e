//! In-memory batch source for tests.

use super::{Batch, BatchSource, SourceError};
use async_trait::async_trait;

/// Mock source that serves predefined batches in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MockBatchSource {
    batches: Vec<Batch>,
}

impl MockBatchSource {
    /// Create an empty mock source.
    pub fn new() -> Self {
        Self {
            batches: Vec::new(),
        }
    }

    /// Add a batch to be served after those already added.
    pub fn with_batch(mut self, batch: Batch) -> Self {
        self.batches.push(batch);
        self
    }

    /// Add several batches, keeping their order.
    pub fn with_batches(mut self, batches: Vec<Batch>) -> Self {
        self.batches.extend(batches);
        self
    }
}

#[async_trait]
impl BatchSource for MockBatchSource {
    async fn list_batches(&self) -> Result<Vec<String>, SourceError> {
        Ok(self.batches.iter().map(|b| b.label.clone()).collect())
    }

    async fn fetch_batch(&self, label: &str) -> Result<Batch, SourceError> {
        self.batches
            .iter()
            .find(|b| b.label == label)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(label.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawOrder;

    #[test]
    fn test_mock_source_lists_in_insertion_order() {
        let mock = MockBatchSource::new()
            .with_batch(Batch::new("b2"))
            .with_batch(Batch::new("b1"));

        let labels = tokio_test::block_on(mock.list_batches()).unwrap();
        assert_eq!(labels, vec!["b2".to_string(), "b1".to_string()]);
    }

    #[test]
    fn test_mock_source_fetch_batch() {
        let batch =
            Batch::new("b1").with_orders(vec![RawOrder::new(1, 5, "paid", "1", "2024-01-01")]);
        let mock = MockBatchSource::new().with_batch(batch.clone());

        let fetched = tokio_test::block_on(mock.fetch_batch("b1")).unwrap();
        assert_eq!(fetched, batch);
    }

    #[tokio::test]
    async fn test_mock_source_missing_batch() {
        let mock = MockBatchSource::new();
        let err = mock.fetch_batch("nope").await.unwrap_err();
        assert_eq!(err, SourceError::NotFound("nope".to_string()));
    }
}
