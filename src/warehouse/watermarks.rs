//! Per-entity high watermarks of business time.

use crate::domain::{Entity, UnknownEntity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Maximum business timestamp processed so far, per entity.
///
/// Starts unset and only ever moves forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Watermarks {
    orders: Option<DateTime<Utc>>,
    users: Option<DateTime<Utc>>,
}

impl Watermarks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, entity: Entity) -> Option<DateTime<Utc>> {
        match entity {
            Entity::Orders => self.orders,
            Entity::Users => self.users,
        }
    }

    /// Look up a watermark by entity name ("orders" or "users").
    pub fn get_by_name(&self, name: &str) -> Result<Option<DateTime<Utc>>, UnknownEntity> {
        Ok(self.get(Entity::from_str(name)?))
    }

    /// Move the watermark to `candidate` if it is later than the current value.
    ///
    /// Returns true if the watermark moved.
    pub fn advance(&mut self, entity: Entity, candidate: DateTime<Utc>) -> bool {
        let slot = match entity {
            Entity::Orders => &mut self.orders,
            Entity::Users => &mut self.users,
        };
        match slot {
            Some(current) if *current >= candidate => false,
            _ => {
                *slot = Some(candidate);
                true
            }
        }
    }

    pub fn advance_by_name(
        &mut self,
        name: &str,
        candidate: DateTime<Utc>,
    ) -> Result<bool, UnknownEntity> {
        Ok(self.advance(Entity::from_str(name)?, candidate))
    }
}
