//! Wellness profile repository port (write side).
//!
//! Profile and history are written together: an implementation must make
//! the profile update and the history append visible atomically, or
//! neither.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::wellness::{ScoreHistoryEntry, WellnessProfile};

#[async_trait]
pub trait WellnessProfileRepository: Send + Sync {
    /// Loads the current profile. `None` for a user never scored.
    async fn find(&self, user_id: &UserId) -> Result<Option<WellnessProfile>, DomainError>;

    /// Stores `profile` and appends `entry` in one step.
    ///
    /// The stored version must be `profile.version() - 1` (no stored profile
    /// counts as version 0).
    ///
    /// # Errors
    ///
    /// - `ConcurrencyConflict` if another writer got there first
    /// - `DatabaseError` on persistence failure
    async fn commit(
        &self,
        profile: &WellnessProfile,
        entry: &ScoreHistoryEntry,
    ) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wellness_profile_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn WellnessProfileRepository) {}
    }
}
