//! Profile and history query handlers.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::wellness::{ScoreHistoryEntry, WellnessError, WellnessProfile};
use crate::ports::{ScoreHistoryReader, WellnessProfileRepository};

/// Largest page of history a single query returns.
pub const MAX_HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone)]
pub struct GetProfileQuery {
    pub user_id: UserId,
}

/// Returns the stored profile, or an empty one for a user never scored.
pub struct GetProfileHandler {
    repository: Arc<dyn WellnessProfileRepository>,
}

impl GetProfileHandler {
    pub fn new(repository: Arc<dyn WellnessProfileRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, query: GetProfileQuery) -> Result<WellnessProfile, WellnessError> {
        Ok(self
            .repository
            .find(&query.user_id)
            .await?
            .unwrap_or_else(|| WellnessProfile::new(query.user_id)))
    }
}

#[derive(Debug, Clone)]
pub struct GetHistoryQuery {
    pub user_id: UserId,
    pub limit: usize,
}

/// Returns history newest first, capped at [`MAX_HISTORY_LIMIT`].
pub struct GetHistoryHandler {
    reader: Arc<dyn ScoreHistoryReader>,
}

impl GetHistoryHandler {
    pub fn new(reader: Arc<dyn ScoreHistoryReader>) -> Self {
        Self { reader }
    }

    pub async fn handle(
        &self,
        query: GetHistoryQuery,
    ) -> Result<Vec<ScoreHistoryEntry>, WellnessError> {
        let limit = query.limit.min(MAX_HISTORY_LIMIT);
        if limit == 0 {
            return Ok(Vec::new());
        }
        Ok(self.reader.recent(&query.user_id, limit).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryWellnessStore;
    use crate::domain::catalog::PressureZone;
    use crate::domain::foundation::Timestamp;

    fn user() -> UserId {
        UserId::new("caregiver-1").unwrap()
    }

    #[tokio::test]
    async fn unknown_user_gets_empty_profile() {
        let handler = GetProfileHandler::new(Arc::new(InMemoryWellnessStore::new()));
        let profile = handler.handle(GetProfileQuery { user_id: user() }).await.unwrap();

        assert!(profile.zones().is_empty());
        assert_eq!(profile.composite(), None);
        assert_eq!(profile.version(), 0);
    }

    #[tokio::test]
    async fn history_limit_is_capped() {
        let store = Arc::new(InMemoryWellnessStore::new());
        let mut profile = WellnessProfile::new(user());
        for i in 0..120 {
            let entry = profile
                .apply_observation(PressureZone::P1, f64::from(i % 100), Timestamp::now())
                .unwrap();
            store.commit(&profile, &entry).await.unwrap();
        }
        let handler = GetHistoryHandler::new(store);

        let page = handler
            .handle(GetHistoryQuery {
                user_id: user(),
                limit: 500,
            })
            .await
            .unwrap();
        assert_eq!(page.len(), MAX_HISTORY_LIMIT);

        let none = handler
            .handle(GetHistoryQuery {
                user_id: user(),
                limit: 0,
            })
            .await
            .unwrap();
        assert!(none.is_empty());
    }
}
