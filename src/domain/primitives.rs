//! Domain primitives: OrderId, UserId, Entity.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Business identifier of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub i64);

impl OrderId {
    /// Create an OrderId from its raw value.
    pub fn new(id: i64) -> Self {
        OrderId(id)
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Business identifier of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl UserId {
    /// Create a UserId from its raw value.
    pub fn new(id: i64) -> Self {
        UserId(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Entities tracked by the warehouse watermarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Entity {
    Orders,
    Users,
}

impl Entity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Entity::Orders => "orders",
            Entity::Users => "users",
        }
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when an entity name is neither "orders" nor "users".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown entity: {0}")]
pub struct UnknownEntity(pub String);

impl FromStr for Entity {
    type Err = UnknownEntity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "orders" => Ok(Entity::Orders),
            "users" => Ok(Entity::Users),
            other => Err(UnknownEntity(other.to_string())),
        }
    }
}
