//! Atomic read-modify-write of a user's wellness profile.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::foundation::{Timestamp, UserId, ValidationError};
use crate::domain::wellness::{ScoreHistoryEntry, WellnessError, WellnessProfile};
use crate::ports::WellnessProfileRepository;

/// A committed profile change and the history entry written with it.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub profile: WellnessProfile,
    pub entry: ScoreHistoryEntry,
}

/// Applies updates by reloading the current profile, applying the change
/// and committing against the loaded version. A lost race reloads and
/// re-applies, so a concurrent update to another zone is never dropped.
pub struct ProfileWriter {
    repository: Arc<dyn WellnessProfileRepository>,
    max_attempts: u32,
}

impl ProfileWriter {
    pub fn new(repository: Arc<dyn WellnessProfileRepository>, max_attempts: u32) -> Self {
        Self {
            repository,
            max_attempts: max_attempts.max(1),
        }
    }

    pub async fn write<F>(&self, user_id: &UserId, update: F) -> Result<ProfileUpdate, WellnessError>
    where
        F: Fn(&mut WellnessProfile, Timestamp) -> Result<ScoreHistoryEntry, ValidationError>
            + Send
            + Sync,
    {
        for attempt in 1..=self.max_attempts {
            let mut profile = self
                .repository
                .find(user_id)
                .await?
                .unwrap_or_else(|| WellnessProfile::new(user_id.clone()));

            let entry = update(&mut profile, Timestamp::now())?;

            match self.repository.commit(&profile, &entry).await {
                Ok(()) => {
                    debug!(
                        user_id = %user_id,
                        trigger = %entry.trigger,
                        old_composite = ?entry.old_composite,
                        new_composite = entry.new_composite,
                        version = profile.version(),
                        "Wellness profile merged"
                    );
                    return Ok(ProfileUpdate { profile, entry });
                }
                Err(err) if err.is_conflict() => {
                    debug!(user_id = %user_id, attempt, "Profile changed concurrently, re-merging");
                }
                Err(err) => return Err(err.into()),
            }
        }

        warn!(
            user_id = %user_id,
            attempts = self.max_attempts,
            "Giving up on profile merge after repeated conflicts"
        );
        Err(WellnessError::ConcurrencyConflict {
            attempts: self.max_attempts,
        })
    }
}
