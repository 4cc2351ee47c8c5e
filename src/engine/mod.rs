//! Pure merge engines for the order fact table and the user dimension.

use serde::{Deserialize, Serialize};

pub mod dimension;
pub mod fact;

pub use dimension::{merge_user, upsert_user, upsert_user_with_policy, StaleUserPolicy};
pub use fact::{merge_order, upsert_order};

/// What a single order upsert did to the fact table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderMergeOutcome {
    /// First sighting of the order id.
    Inserted,
    /// Strictly newer update replaced the stored row.
    Updated,
    /// Equal or older update, stored row untouched.
    Skipped,
}

impl OrderMergeOutcome {
    /// (inserted, updated, skipped) as 0/1 counts.
    pub fn counts(&self) -> (usize, usize, usize) {
        match self {
            OrderMergeOutcome::Inserted => (1, 0, 0),
            OrderMergeOutcome::Updated => (0, 1, 0),
            OrderMergeOutcome::Skipped => (0, 0, 1),
        }
    }
}

/// What a single user upsert did to the dimension history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserMergeOutcome {
    /// First version appended for a new user.
    Inserted,
    /// Current version closed and a new current version appended.
    Versioned,
    /// Nothing changed.
    Skipped,
}

impl UserMergeOutcome {
    /// (inserted_new, closed_old, skipped) as 0/1 counts.
    pub fn counts(&self) -> (usize, usize, usize) {
        match self {
            UserMergeOutcome::Inserted => (1, 0, 0),
            UserMergeOutcome::Versioned => (1, 1, 0),
            UserMergeOutcome::Skipped => (0, 0, 1),
        }
    }
}
