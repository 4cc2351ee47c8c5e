//! Last-write-wins upsert into the order fact table.

use super::OrderMergeOutcome;
use crate::domain::{NormalizeError, Order, RawOrder};
use crate::warehouse::WarehouseState;

/// Normalize a raw order and merge it into the fact table.
///
/// # Errors
/// Returns the normalization error; the state is not touched in that case.
pub fn upsert_order(
    state: &mut WarehouseState,
    raw: &RawOrder,
) -> Result<OrderMergeOutcome, NormalizeError> {
    let order = Order::from_raw(raw)?;
    Ok(merge_order(state, order))
}

/// Merge an already normalized order.
///
/// The stored row is replaced only by a strictly newer `updated_at`, so replays
/// and late deliveries are no-ops.
pub fn merge_order(state: &mut WarehouseState, order: Order) -> OrderMergeOutcome {
    let outcome = match state.order(order.order_id) {
        None => OrderMergeOutcome::Inserted,
        Some(existing) if order.updated_at > existing.updated_at => OrderMergeOutcome::Updated,
        Some(_) => OrderMergeOutcome::Skipped,
    };

    tracing::debug!(
        order_id = %order.order_id,
        updated_at = %order.updated_at,
        ?outcome,
        "merged order"
    );

    if outcome != OrderMergeOutcome::Skipped {
        state.put_order(order);
    }
    outcome
}
