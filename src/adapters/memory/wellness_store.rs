//! In-memory wellness profile and score history store.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::wellness::{ScoreHistoryEntry, WellnessProfile};
use crate::ports::{ScoreHistoryReader, WellnessProfileRepository};

#[derive(Default)]
struct State {
    profiles: HashMap<UserId, WellnessProfile>,
    history: HashMap<UserId, Vec<ScoreHistoryEntry>>,
}

/// Profiles and history share one lock so a commit is all-or-nothing.
#[derive(Default)]
pub struct InMemoryWellnessStore {
    state: RwLock<State>,
}

impl InMemoryWellnessStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total history entries for a user.
    pub async fn history_len(&self, user_id: &UserId) -> usize {
        self.state
            .read()
            .await
            .history
            .get(user_id)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl WellnessProfileRepository for InMemoryWellnessStore {
    async fn find(&self, user_id: &UserId) -> Result<Option<WellnessProfile>, DomainError> {
        Ok(self.state.read().await.profiles.get(user_id).cloned())
    }

    async fn commit(
        &self,
        profile: &WellnessProfile,
        entry: &ScoreHistoryEntry,
    ) -> Result<(), DomainError> {
        let mut state = self.state.write().await;

        let stored_version = state
            .profiles
            .get(profile.user_id())
            .map_or(0, WellnessProfile::version);
        if stored_version + 1 != profile.version() {
            return Err(DomainError::conflict(format!(
                "Wellness profile for {} is at version {}, update expected {}",
                profile.user_id(),
                stored_version,
                profile.version().saturating_sub(1)
            )));
        }

        state
            .profiles
            .insert(profile.user_id().clone(), profile.clone());
        state
            .history
            .entry(profile.user_id().clone())
            .or_default()
            .push(entry.clone());
        Ok(())
    }
}

#[async_trait]
impl ScoreHistoryReader for InMemoryWellnessStore {
    async fn recent(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<ScoreHistoryEntry>, DomainError> {
        let state = self.state.read().await;
        let mut entries: Vec<ScoreHistoryEntry> =
            state.history.get(user_id).cloned().unwrap_or_default();
        // Stable sort keeps insertion order for equal timestamps; reverse gives newest first.
        entries.sort_by(|a, b| a.recorded_at.cmp(&b.recorded_at));
        entries.reverse();
        entries.truncate(limit);
        Ok(entries)
    }
}
