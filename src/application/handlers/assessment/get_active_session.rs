//! GetActiveSessionHandler - Query handler for a user's in-progress session.

use std::sync::Arc;

use crate::domain::assessment::{AssessmentError, AssessmentSession};
use crate::domain::catalog::InstrumentSlug;
use crate::domain::foundation::UserId;
use crate::ports::AssessmentSessionRepository;

/// Query for the active session, optionally restricted to one instrument.
#[derive(Debug, Clone)]
pub struct GetActiveSessionQuery {
    pub user_id: UserId,
    pub instrument: Option<String>,
}

/// Handler for active-session lookups.
///
/// Without an instrument, returns the most recently started active session.
pub struct GetActiveSessionHandler {
    repository: Arc<dyn AssessmentSessionRepository>,
}

impl GetActiveSessionHandler {
    pub fn new(repository: Arc<dyn AssessmentSessionRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        query: GetActiveSessionQuery,
    ) -> Result<Option<AssessmentSession>, AssessmentError> {
        match query.instrument {
            Some(slug) => {
                let instrument: InstrumentSlug = slug.parse()?;
                Ok(self.repository.find_active(&query.user_id, instrument).await?)
            }
            None => Ok(self
                .repository
                .find_active_by_user(&query.user_id)
                .await?
                .into_iter()
                .next()),
        }
    }
}
