//! Integration tests for batch merging: idempotence, watermarks and SCD2 history.

use minidwh::{
    parse_timestamp, run_batch, upsert_order, upsert_user, Amount, Entity, OrderId,
    OrderMergeOutcome, OrderStats, RawOrder, RawUser, UserId, UserMergeOutcome, WarehouseState,
};
use std::collections::HashMap;
use std::str::FromStr;

// =============================================================================
// Helpers
// =============================================================================

fn order(id: i64, status: &str, total: &str, ts: &str) -> RawOrder {
    RawOrder::new(id, 5, status, total, ts)
}

fn user(id: i64, email: &str, city: &str, segment: &str, ts: &str) -> RawUser {
    RawUser::new(id, email, city, segment, ts)
}

/// Checks single-current and contiguity for every user in the history.
fn assert_scd2_invariants(state: &WarehouseState) {
    let mut seen: HashMap<UserId, Vec<usize>> = HashMap::new();
    for (pos, version) in state.user_history().iter().enumerate() {
        seen.entry(version.user_id).or_default().push(pos);
    }

    for (user_id, positions) in seen {
        let versions: Vec<_> = positions
            .iter()
            .map(|p| &state.user_history()[*p])
            .collect();

        let current: Vec<_> = versions.iter().filter(|v| v.is_current).collect();
        assert_eq!(current.len(), 1, "user {} must have one current version", user_id);
        assert!(current[0].valid_to.is_none());
        assert!(versions.last().unwrap().is_current, "last version must be current");

        for pair in versions.windows(2) {
            assert!(!pair[0].is_current);
            assert_eq!(pair[0].valid_to, Some(pair[1].valid_from));
        }

        let indexed = state.current_index()[&user_id];
        assert_eq!(state.version(indexed), Some(*current[0]));
    }
}

// =============================================================================
// Fact table
// =============================================================================

#[test]
fn test_order_batch_replay_is_idempotent() {
    let batch = vec![
        order(1, "paid", "10,50", "2024-01-01T00:00:00Z"),
        order(2, "new", "3", "2024-01-01T01:00:00Z"),
        order(3, "shipped", "99.99", "2024-01-01T02:00:00+02:00"),
    ];
    let mut state = WarehouseState::new();

    let first = run_batch(&mut state, "day1", &batch, &[]).unwrap();
    let after_first = state.fact_orders().clone();
    let second = run_batch(&mut state, "day1", &batch, &[]).unwrap();

    assert_eq!(
        first.orders,
        OrderStats {
            processed: 3,
            inserted: 3,
            updated: 0,
            skipped: 0
        }
    );
    assert_eq!(
        second.orders,
        OrderStats {
            processed: 3,
            inserted: 0,
            updated: 0,
            skipped: 3
        }
    );
    assert_eq!(state.fact_orders(), &after_first);
    assert_eq!(first.watermarks, second.watermarks);
}

#[test]
fn test_last_write_wins_in_any_arrival_order() {
    let early = order(1, "paid", "10", "2024-01-01T00:00:00Z");
    let late = order(1, "refunded", "10", "2024-01-02T00:00:00Z");

    for arrivals in [[&early, &late], [&late, &early]] {
        let mut state = WarehouseState::new();
        for raw in arrivals {
            upsert_order(&mut state, raw).unwrap();
        }
        assert_eq!(state.order(OrderId::new(1)).unwrap().status, "refunded");
    }
}

#[test]
fn test_same_timestamp_keeps_first_arrival() {
    let mut state = WarehouseState::new();
    let first = upsert_order(&mut state, &order(1, "paid", "10", "2024-01-01T00:00:00Z")).unwrap();
    let second =
        upsert_order(&mut state, &order(1, "cancelled", "0", "2024-01-01T00:00:00Z")).unwrap();

    assert_eq!(first, OrderMergeOutcome::Inserted);
    assert_eq!(second, OrderMergeOutcome::Skipped);
    assert_eq!(state.order(OrderId::new(1)).unwrap().status, "paid");
}

#[test]
fn test_refund_example() {
    let mut state = WarehouseState::new();
    run_batch(
        &mut state,
        "2024-01-01",
        &[order(1, "paid", "10,50", "2024-01-01T00:00:00Z")],
        &[],
    )
    .unwrap();
    let report = run_batch(
        &mut state,
        "2024-01-02",
        &[order(1, "refunded", "10.50", "2024-01-02T00:00:00Z")],
        &[],
    )
    .unwrap();

    let stored = state.order(OrderId::new(1)).unwrap();
    assert_eq!(stored.status, "refunded");
    assert_eq!(stored.total_amount, Amount::from_str("10.50").unwrap());
    assert_eq!(
        (report.orders.inserted, report.orders.updated, report.orders.skipped),
        (0, 1, 0)
    );
    assert_eq!(
        report.watermarks.get(Entity::Orders),
        Some(parse_timestamp("2024-01-02T00:00:00Z").unwrap())
    );
}

// =============================================================================
// Watermarks
// =============================================================================

#[test]
fn test_watermarks_are_monotonic_and_track_max_seen() {
    let batches = [
        ("b1", "2024-01-03T00:00:00Z", "2024-01-02T00:00:00Z"),
        ("b2", "2024-01-01T00:00:00Z", "2024-01-05T00:00:00Z"),
        ("b3", "2024-01-04T00:00:00Z", "2024-01-04T00:00:00Z"),
    ];
    let mut state = WarehouseState::new();
    let mut max_order = None;
    let mut max_user = None;

    for (i, (label, order_ts, user_ts)) in batches.iter().enumerate() {
        let before = *state.watermarks();
        let report = run_batch(
            &mut state,
            label,
            &[order(i as i64, "paid", "1", order_ts)],
            &[user(i as i64, "x@example.com", "Oslo", "basic", user_ts)],
        )
        .unwrap();

        max_order = max_order.max(Some(parse_timestamp(order_ts).unwrap()));
        max_user = max_user.max(Some(parse_timestamp(user_ts).unwrap()));

        assert!(report.watermarks.get(Entity::Orders) >= before.get(Entity::Orders));
        assert!(report.watermarks.get(Entity::Users) >= before.get(Entity::Users));
        assert_eq!(report.watermarks.get(Entity::Orders), max_order);
        assert_eq!(report.watermarks.get(Entity::Users), max_user);
    }
}

#[test]
fn test_watermark_lookup_by_name() {
    let mut state = WarehouseState::new();
    run_batch(
        &mut state,
        "b1",
        &[order(1, "paid", "1", "2024-01-01T00:00:00Z")],
        &[],
    )
    .unwrap();

    let wm = state.watermarks();
    assert!(wm.get_by_name("orders").unwrap().is_some());
    assert!(wm.get_by_name("users").unwrap().is_none());
    assert!(wm.get_by_name("invoices").is_err());
}

#[test]
fn test_failed_batch_leaves_state_untouched() {
    let mut state = WarehouseState::new();
    run_batch(
        &mut state,
        "b1",
        &[order(1, "paid", "1", "2024-01-01T00:00:00Z")],
        &[user(5, "a@example.com", "Berlin", "gold", "2024-01-01T00:00:00Z")],
    )
    .unwrap();
    let before = state.clone();

    let result = run_batch(
        &mut state,
        "b2",
        &[order(1, "refunded", "1", "2024-02-01T00:00:00Z")],
        &[
            user(5, "a@example.com", "Paris", "gold", "2024-02-01T00:00:00Z"),
            user(6, "b@example.com", "Rome", "gold", "02/01/2024"),
        ],
    );

    assert!(result.is_err());
    assert_eq!(state, before);
}

// =============================================================================
// SCD2 dimension
// =============================================================================

#[test]
fn test_unchanged_user_attributes_are_a_no_op() {
    let mut state = WarehouseState::new();
    let first = upsert_user(
        &mut state,
        &user(5, "a@example.com", "Berlin", "gold", "2024-01-01T00:00:00Z"),
    )
    .unwrap();
    let second = upsert_user(
        &mut state,
        &user(5, "a@example.com", "Berlin", "gold", "2024-06-01T00:00:00Z"),
    )
    .unwrap();

    assert_eq!(first, UserMergeOutcome::Inserted);
    assert_eq!(second, UserMergeOutcome::Skipped);
    assert_eq!(state.versions_of(UserId::new(5)).count(), 1);
}

#[test]
fn test_k_changes_produce_k_plus_one_contiguous_versions() {
    let changes = [
        ("a@example.com", "Berlin", "basic", "2024-01-01T00:00:00Z"),
        ("a@example.com", "Paris", "basic", "2024-02-01T00:00:00Z"),
        ("a@example.com", "Paris", "gold", "2024-03-01T00:00:00Z"),
        ("new@example.com", "Paris", "gold", "2024-04-01T00:00:00Z"),
    ];
    let mut state = WarehouseState::new();
    for (email, city, segment, ts) in changes {
        upsert_user(&mut state, &user(5, email, city, segment, ts)).unwrap();
        // Interleave another user to make sure histories do not bleed.
        upsert_user(&mut state, &user(6, "b@example.com", "Rome", "basic", ts)).unwrap();
    }

    let versions: Vec<_> = state.versions_of(UserId::new(5)).collect();
    assert_eq!(versions.len(), changes.len());
    assert_eq!(state.versions_of(UserId::new(6)).count(), 1);
    for (version, (_, _, _, ts)) in versions.iter().zip(changes.iter()) {
        assert_eq!(version.valid_from, parse_timestamp(ts).unwrap());
    }
    assert_scd2_invariants(&state);
}

#[test]
fn test_user_batch_stats() {
    let mut state = WarehouseState::new();
    let report = run_batch(
        &mut state,
        "b1",
        &[],
        &[
            user(5, "a@example.com", "Berlin", "gold", "2024-01-01T00:00:00Z"),
            user(5, "a@example.com", "Berlin", "gold", "2024-01-02T00:00:00Z"),
            user(5, "a@example.com", "Paris", "gold", "2024-01-03T00:00:00Z"),
            user(6, "b@example.com", "Rome", "basic", "2024-01-03T00:00:00Z"),
        ],
    )
    .unwrap();

    assert_eq!(report.users.processed, 4);
    assert_eq!(report.users.inserted_new, 3);
    assert_eq!(report.users.closed_old, 1);
    assert_eq!(report.users.skipped, 1);
    assert!(report.watermarks.get(Entity::Orders).is_none());
    assert_scd2_invariants(&state);
}

#[test]
fn test_user_batch_replay_is_idempotent() {
    let batch = vec![
        user(5, "a@example.com", "Berlin", "gold", "2024-01-01T00:00:00Z"),
        user(6, "b@example.com", "Rome", "basic", "2024-01-01T00:00:00Z"),
    ];
    let mut state = WarehouseState::new();

    run_batch(&mut state, "b1", &[], &batch).unwrap();
    let history = state.user_history().to_vec();
    let report = run_batch(&mut state, "b1", &[], &batch).unwrap();

    assert_eq!(report.users.skipped, 2);
    assert_eq!(report.users.inserted_new, 0);
    assert_eq!(state.user_history(), history.as_slice());
}

#[test]
fn test_report_serializes_to_json() {
    let mut state = WarehouseState::new();
    let report = run_batch(
        &mut state,
        "2024-01-01",
        &[order(1, "paid", "10,50", "2024-01-01T00:00:00Z")],
        &[],
    )
    .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["batch_label"], "2024-01-01");
    assert_eq!(json["orders"]["inserted"], 1);
    assert_eq!(json["users"]["processed"], 0);
    assert!(json["watermarks"]["users"].is_null());
    assert!(json["watermarks"]["orders"].is_string());
}
