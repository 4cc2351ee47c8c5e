//! In-memory warehouse state shared by the mergers.
//!
//! This module provides:
//! - The order fact table keyed by order id
//! - The append-only SCD2 user history plus its current-version index
//! - Per-entity watermarks
//!
//! Readers get shared references only. Mutation goes through crate-private
//! methods used by the engine, which keep the SCD2 invariants by construction.

use crate::domain::{Order, OrderId, UserId, UserVersion, VersionKey};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

pub mod watermarks;

pub use watermarks::Watermarks;

/// The whole warehouse, exclusively owned by whoever drives the batches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WarehouseState {
    fact_orders: BTreeMap<OrderId, Order>,
    dim_users_history: Vec<UserVersion>,
    dim_users_current_index: HashMap<UserId, VersionKey>,
    watermarks: Watermarks,
}

impl WarehouseState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fact_orders(&self) -> &BTreeMap<OrderId, Order> {
        &self.fact_orders
    }

    pub fn order(&self, order_id: OrderId) -> Option<&Order> {
        self.fact_orders.get(&order_id)
    }

    /// Every user version ever written, in append order.
    pub fn user_history(&self) -> &[UserVersion] {
        &self.dim_users_history
    }

    pub fn current_index(&self) -> &HashMap<UserId, VersionKey> {
        &self.dim_users_current_index
    }

    pub fn version(&self, key: VersionKey) -> Option<&UserVersion> {
        self.dim_users_history.get(key.0)
    }

    pub fn current_version(&self, user_id: UserId) -> Option<&UserVersion> {
        self.dim_users_current_index
            .get(&user_id)
            .and_then(|key| self.version(*key))
    }

    /// All versions of one user in append order (which is validity order).
    ///
    /// Scans the full history; meant for audits and tests, not the merge path.
    pub fn versions_of(&self, user_id: UserId) -> impl Iterator<Item = &UserVersion> + '_ {
        self.dim_users_history
            .iter()
            .filter(move |v| v.user_id == user_id)
    }

    pub fn watermarks(&self) -> &Watermarks {
        &self.watermarks
    }

    pub(crate) fn watermarks_mut(&mut self) -> &mut Watermarks {
        &mut self.watermarks
    }

    /// Store an order row, returning the row it replaced.
    pub(crate) fn put_order(&mut self, order: Order) -> Option<Order> {
        self.fact_orders.insert(order.order_id, order)
    }

    /// Append `version` as the user's new current version.
    ///
    /// If the user already had a current version it is closed at the new
    /// version's `valid_from`. Returns the new key and the key of the closed
    /// version, if any.
    pub(crate) fn open_version(
        &mut self,
        version: UserVersion,
    ) -> (VersionKey, Option<VersionKey>) {
        let mut closed = None;
        if let Some(previous) = self.dim_users_current_index.get(&version.user_id).copied() {
            if self.close_version(previous, version.valid_from) {
                closed = Some(previous);
            }
        }

        let key = VersionKey(self.dim_users_history.len());
        self.dim_users_current_index.insert(version.user_id, key);
        self.dim_users_history.push(version);
        (key, closed)
    }

    /// Close a current version. Closed versions are never touched again.
    fn close_version(&mut self, key: VersionKey, at: DateTime<Utc>) -> bool {
        match self.dim_users_history.get_mut(key.0) {
            Some(version) if version.is_current => {
                version.valid_to = Some(at);
                version.is_current = false;
                true
            }
            _ => false,
        }
    }
}
