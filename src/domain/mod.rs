//! Domain types and normalization for the order/user warehouse.
//!
//! This module provides:
//! - Exact money handling via the Amount wrapper
//! - Domain primitives: OrderId, UserId, Entity
//! - Raw and normalized order/user records
//! - Text normalization and the attribute fingerprint

pub mod amount;
pub mod fingerprint;
pub mod normalize;
pub mod order;
pub mod primitives;
pub mod user;

pub use amount::{Amount, AmountError};
pub use fingerprint::{fingerprint, Fingerprint};
pub use normalize::{parse_amount, parse_timestamp, NormalizeError};
pub use order::{Order, RawOrder};
pub use primitives::{Entity, OrderId, UnknownEntity, UserId};
pub use user::{RawUser, UserUpdate, UserVersion, VersionKey};
