//! Batches stored as CSV files on disk.
//!
//! Layout: `<root>/<label>/orders.csv` and `<root>/<label>/users.csv`. Either
//! file may instead be an LZ4 frame named `*.csv.lz4`. A missing file means
//! the batch carries no records of that kind.

use super::{Batch, BatchSource, SourceError};
use crate::domain::{RawOrder, RawUser};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

const ORDERS_STEM: &str = "orders";
const USERS_STEM: &str = "users";

#[derive(Debug, Clone)]
pub struct CsvBatchSource {
    root: PathBuf,
}

impl CsvBatchSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn decompress_lz4_frame(lz4_bytes: &[u8]) -> Result<Vec<u8>, SourceError> {
        let mut decoder = lz4_flex::frame::FrameDecoder::new(lz4_bytes);
        let mut out = Vec::new();
        decoder
            .read_to_end(&mut out)
            .map_err(|e| SourceError::Lz4(e.to_string()))?;
        Ok(out)
    }

    pub fn parse_orders(csv_bytes: &[u8]) -> Result<Vec<RawOrder>, SourceError> {
        parse_csv(csv_bytes)
    }

    pub fn parse_users(csv_bytes: &[u8]) -> Result<Vec<RawUser>, SourceError> {
        parse_csv(csv_bytes)
    }

    /// Read `<dir>/<stem>.csv`, falling back to `<dir>/<stem>.csv.lz4`.
    async fn read_table(dir: &Path, stem: &str) -> Result<Option<Vec<u8>>, SourceError> {
        if let Some(bytes) = read_optional(&dir.join(format!("{}.csv", stem))).await? {
            return Ok(Some(bytes));
        }
        match read_optional(&dir.join(format!("{}.csv.lz4", stem))).await? {
            Some(lz4) => Self::decompress_lz4_frame(&lz4).map(Some),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl BatchSource for CsvBatchSource {
    async fn list_batches(&self) -> Result<Vec<String>, SourceError> {
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        let mut labels = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(label) => labels.push(label),
                Err(name) => {
                    tracing::warn!(?name, "skipping batch directory with non-UTF-8 name")
                }
            }
        }
        labels.sort();
        Ok(labels)
    }

    async fn fetch_batch(&self, label: &str) -> Result<Batch, SourceError> {
        let dir = self.root.join(label);
        match tokio::fs::metadata(&dir).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Err(SourceError::NotFound(label.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SourceError::NotFound(label.to_string()))
            }
            Err(e) => return Err(e.into()),
        }

        let orders = match Self::read_table(&dir, ORDERS_STEM).await? {
            Some(bytes) => Self::parse_orders(&bytes)?,
            None => Vec::new(),
        };
        let users = match Self::read_table(&dir, USERS_STEM).await? {
            Some(bytes) => Self::parse_users(&bytes)?,
            None => Vec::new(),
        };

        tracing::debug!(
            batch = label,
            orders = orders.len(),
            users = users.len(),
            "loaded batch from disk"
        );

        Ok(Batch {
            label: label.to_string(),
            orders,
            users,
        })
    }
}

async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, SourceError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn parse_csv<T: DeserializeOwned>(csv_bytes: &[u8]) -> Result<Vec<T>, SourceError> {
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(::csv::Trim::Headers)
        .from_reader(csv_bytes);

    reader
        .deserialize::<T>()
        .map(|record| record.map_err(|e| SourceError::Csv(e.to_string())))
        .collect()
}
