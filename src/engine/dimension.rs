//! SCD2 versioning of the user dimension.

use super::UserMergeOutcome;
use crate::domain::{NormalizeError, RawUser, UserUpdate, UserVersion};
use crate::warehouse::WarehouseState;

/// How to treat an attribute change whose timestamp is older than the
/// current version's.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StaleUserPolicy {
    /// Compare fingerprints only; an older change still opens a new version.
    #[default]
    Accept,
    /// Skip changes strictly older than the current version.
    Reject,
}

/// Normalize a raw user and merge it with the default [`StaleUserPolicy`].
pub fn upsert_user(
    state: &mut WarehouseState,
    raw: &RawUser,
) -> Result<UserMergeOutcome, NormalizeError> {
    upsert_user_with_policy(state, raw, StaleUserPolicy::default())
}

pub fn upsert_user_with_policy(
    state: &mut WarehouseState,
    raw: &RawUser,
    policy: StaleUserPolicy,
) -> Result<UserMergeOutcome, NormalizeError> {
    let update = UserUpdate::from_raw(raw)?;
    Ok(merge_user(state, update, policy))
}

/// Merge a normalized user update into the dimension history.
pub fn merge_user(
    state: &mut WarehouseState,
    update: UserUpdate,
    policy: StaleUserPolicy,
) -> UserMergeOutcome {
    let user_id = update.user_id;
    let updated_at = update.updated_at;
    let current = state
        .current_version(user_id)
        .map(|v| (v.fingerprint == update.fingerprint, v.updated_at));

    let outcome = match current {
        None => {
            state.open_version(UserVersion::open(update));
            UserMergeOutcome::Inserted
        }
        Some((true, _)) => UserMergeOutcome::Skipped,
        Some((false, current_at)) if updated_at < current_at => match policy {
            StaleUserPolicy::Reject => {
                tracing::debug!(
                    user_id = %user_id,
                    updated_at = %updated_at,
                    current_at = %current_at,
                    "rejected stale user update"
                );
                UserMergeOutcome::Skipped
            }
            StaleUserPolicy::Accept => {
                tracing::warn!(
                    user_id = %user_id,
                    updated_at = %updated_at,
                    current_at = %current_at,
                    "user update older than current version, versioning anyway"
                );
                state.open_version(UserVersion::open(update));
                UserMergeOutcome::Versioned
            }
        },
        Some((false, _)) => {
            state.open_version(UserVersion::open(update));
            UserMergeOutcome::Versioned
        }
    };

    tracing::debug!(user_id = %user_id, ?outcome, "merged user");
    outcome
}
