//! Order records: raw input rows and the normalized fact row.

use crate::domain::normalize::{parse_amount, parse_timestamp, NormalizeError};
use crate::domain::{Amount, OrderId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An order as delivered by a batch source, text fields not yet parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawOrder {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub status: String,
    pub total_amount: String,
    pub updated_at: String,
}

impl RawOrder {
    pub fn new(
        order_id: i64,
        user_id: i64,
        status: impl Into<String>,
        total_amount: impl Into<String>,
        updated_at: impl Into<String>,
    ) -> Self {
        Self {
            order_id: OrderId::new(order_id),
            user_id: UserId::new(user_id),
            status: status.into(),
            total_amount: total_amount.into(),
            updated_at: updated_at.into(),
        }
    }
}

/// A row of the order fact table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub user_id: UserId,
    /// Free-form status label, stored as delivered.
    pub status: String,
    pub total_amount: Amount,
    /// Business update time, used for last-write-wins.
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Normalize a raw order. Nothing is partially built on failure.
    pub fn from_raw(raw: &RawOrder) -> Result<Self, NormalizeError> {
        Ok(Order {
            order_id: raw.order_id,
            user_id: raw.user_id,
            status: raw.status.clone(),
            total_amount: parse_amount(&raw.total_amount)?,
            updated_at: parse_timestamp(&raw.updated_at)?,
        })
    }
}
