//! User records: raw input rows, normalized updates and SCD2 version rows.

use crate::domain::fingerprint::{fingerprint, Fingerprint};
use crate::domain::normalize::{parse_timestamp, NormalizeError};
use crate::domain::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user as delivered by a batch source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawUser {
    pub user_id: UserId,
    pub email: String,
    pub city: String,
    pub segment: String,
    pub updated_at: String,
}

impl RawUser {
    pub fn new(
        user_id: i64,
        email: impl Into<String>,
        city: impl Into<String>,
        segment: impl Into<String>,
        updated_at: impl Into<String>,
    ) -> Self {
        Self {
            user_id: UserId::new(user_id),
            email: email.into(),
            city: city.into(),
            segment: segment.into(),
            updated_at: updated_at.into(),
        }
    }
}

/// A normalized user update, ready to be merged into the dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserUpdate {
    pub user_id: UserId,
    pub email: String,
    pub city: String,
    pub segment: String,
    pub fingerprint: Fingerprint,
    pub updated_at: DateTime<Utc>,
}

impl UserUpdate {
    pub fn from_raw(raw: &RawUser) -> Result<Self, NormalizeError> {
        let updated_at = parse_timestamp(&raw.updated_at)?;
        Ok(UserUpdate {
            user_id: raw.user_id,
            email: raw.email.clone(),
            city: raw.city.clone(),
            segment: raw.segment.clone(),
            fingerprint: fingerprint(&raw.email, &raw.city, &raw.segment),
            updated_at,
        })
    }
}

/// Stable address of a version row in the dimension history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionKey(pub usize);

/// One validity interval of a user's attribute set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserVersion {
    pub user_id: UserId,
    pub email: String,
    pub city: String,
    pub segment: String,
    pub fingerprint: Fingerprint,
    pub updated_at: DateTime<Utc>,
    pub valid_from: DateTime<Utc>,
    /// None while this is the current version.
    pub valid_to: Option<DateTime<Utc>>,
    pub is_current: bool,
}

impl UserVersion {
    /// Open a new current version starting at the update's business time.
    pub fn open(update: UserUpdate) -> Self {
        UserVersion {
            user_id: update.user_id,
            email: update.email,
            city: update.city,
            segment: update.segment,
            fingerprint: update.fingerprint,
            updated_at: update.updated_at,
            valid_from: update.updated_at,
            valid_to: None,
            is_current: true,
        }
    }
}
