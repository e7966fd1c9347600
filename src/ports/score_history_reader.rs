//! Score history reader port (query side).

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::wellness::ScoreHistoryEntry;

#[async_trait]
pub trait ScoreHistoryReader: Send + Sync {
    /// Most recent entries first, at most `limit` of them.
    async fn recent(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<ScoreHistoryEntry>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_history_reader_is_object_safe() {
        fn _accepts_dyn(_reader: &dyn ScoreHistoryReader) {}
    }
}
