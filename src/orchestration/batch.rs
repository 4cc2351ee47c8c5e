//! Applying one batch of raw orders and users to the warehouse.
//!
//! Batches are fail-fast: every record is normalized before any state is
//! touched, so a malformed record leaves the warehouse and its watermarks
//! exactly as they were and the whole batch can be retried once corrected.

use crate::domain::{
    Entity, NormalizeError, Order, OrderId, RawOrder, RawUser, UserId, UserUpdate,
};
use crate::engine::{
    merge_order, merge_user, OrderMergeOutcome, StaleUserPolicy, UserMergeOutcome,
};
use crate::warehouse::{WarehouseState, Watermarks};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fact merge statistics for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStats {
    pub processed: usize,
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
}

impl OrderStats {
    pub fn record(&mut self, outcome: OrderMergeOutcome) {
        let (inserted, updated, skipped) = outcome.counts();
        self.processed += 1;
        self.inserted += inserted;
        self.updated += updated;
        self.skipped += skipped;
    }
}

/// Dimension merge statistics for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub processed: usize,
    pub inserted_new: usize,
    pub closed_old: usize,
    pub skipped: usize,
}

impl UserStats {
    pub fn record(&mut self, outcome: UserMergeOutcome) {
        let (inserted_new, closed_old, skipped) = outcome.counts();
        self.processed += 1;
        self.inserted_new += inserted_new;
        self.closed_old += closed_old;
        self.skipped += skipped;
    }
}

/// Result of a successfully applied batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub batch_label: String,
    pub orders: OrderStats,
    pub users: UserStats,
    /// Watermarks after this batch.
    pub watermarks: Watermarks,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    #[error("order #{index} (order_id {order_id}) rejected: {source}")]
    InvalidOrder {
        index: usize,
        order_id: OrderId,
        #[source]
        source: NormalizeError,
    },
    #[error("user #{index} (user_id {user_id}) rejected: {source}")]
    InvalidUser {
        index: usize,
        user_id: UserId,
        #[source]
        source: NormalizeError,
    },
}

/// Apply a batch with the default [`StaleUserPolicy`].
///
/// # Errors
/// Returns the first record that fails normalization. Nothing is applied.
pub fn run_batch(
    state: &mut WarehouseState,
    batch_label: &str,
    raw_orders: &[RawOrder],
    raw_users: &[RawUser],
) -> Result<BatchReport, BatchError> {
    run_batch_with_policy(
        state,
        batch_label,
        raw_orders,
        raw_users,
        StaleUserPolicy::default(),
    )
}

pub fn run_batch_with_policy(
    state: &mut WarehouseState,
    batch_label: &str,
    raw_orders: &[RawOrder],
    raw_users: &[RawUser],
    policy: StaleUserPolicy,
) -> Result<BatchReport, BatchError> {
    let orders = normalize_orders(raw_orders)?;
    let users = normalize_users(raw_users)?;

    let max_order_ts = orders.iter().map(|o| o.updated_at).max();
    let max_user_ts = users.iter().map(|u| u.updated_at).max();

    let order_stats = apply_orders(state, orders);
    let user_stats = apply_users(state, users, policy);

    let watermarks = state.watermarks_mut();
    if let Some(ts) = max_order_ts {
        watermarks.advance(Entity::Orders, ts);
    }
    if let Some(ts) = max_user_ts {
        watermarks.advance(Entity::Users, ts);
    }

    let report = BatchReport {
        batch_label: batch_label.to_string(),
        orders: order_stats,
        users: user_stats,
        watermarks: *state.watermarks(),
    };

    tracing::info!(
        batch = batch_label,
        orders_processed = order_stats.processed,
        orders_inserted = order_stats.inserted,
        orders_updated = order_stats.updated,
        orders_skipped = order_stats.skipped,
        users_processed = user_stats.processed,
        users_inserted_new = user_stats.inserted_new,
        users_closed_old = user_stats.closed_old,
        users_skipped = user_stats.skipped,
        "batch applied"
    );

    Ok(report)
}

/// Merge a sequence of raw orders without touching watermarks.
pub fn process_orders_batch(
    state: &mut WarehouseState,
    raw_orders: &[RawOrder],
) -> Result<OrderStats, BatchError> {
    let orders = normalize_orders(raw_orders)?;
    Ok(apply_orders(state, orders))
}

/// Merge a sequence of raw users without touching watermarks.
pub fn process_users_batch(
    state: &mut WarehouseState,
    raw_users: &[RawUser],
    policy: StaleUserPolicy,
) -> Result<UserStats, BatchError> {
    let users = normalize_users(raw_users)?;
    Ok(apply_users(state, users, policy))
}

fn normalize_orders(raw_orders: &[RawOrder]) -> Result<Vec<Order>, BatchError> {
    raw_orders
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            Order::from_raw(raw).map_err(|source| BatchError::InvalidOrder {
                index,
                order_id: raw.order_id,
                source,
            })
        })
        .collect()
}

fn normalize_users(raw_users: &[RawUser]) -> Result<Vec<UserUpdate>, BatchError> {
    raw_users
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            UserUpdate::from_raw(raw).map_err(|source| BatchError::InvalidUser {
                index,
                user_id: raw.user_id,
                source,
            })
        })
        .collect()
}

fn apply_orders(state: &mut WarehouseState, orders: Vec<Order>) -> OrderStats {
    let mut stats = OrderStats::default();
    for order in orders {
        stats.record(merge_order(state, order));
    }
    stats
}

fn apply_users(
    state: &mut WarehouseState,
    users: Vec<UserUpdate>,
    policy: StaleUserPolicy,
) -> UserStats {
    let mut stats = UserStats::default();
    for update in users {
        stats.record(merge_user(state, update, policy));
    }
    stats
}
