//! ApplyInstrumentResultHandler - merges an instrument score into the profile.

use std::sync::Arc;

use tracing::info;

use crate::domain::foundation::UserId;
use crate::domain::wellness::{ScoreTrigger, WellnessError, ZoneDeltas};

use super::{ProfileUpdate, ProfileWriter};

/// Command carrying one instrument's canonical zone values and composite.
#[derive(Debug, Clone)]
pub struct ApplyInstrumentResultCommand {
    pub user_id: UserId,
    pub deltas: ZoneDeltas,
    pub new_composite: f64,
    pub trigger: ScoreTrigger,
}

/// Handler for the composite score aggregator.
///
/// Zones in the command overwrite the stored ones; every other zone is
/// carried over. The instrument's composite is stored as reported.
pub struct ApplyInstrumentResultHandler {
    writer: Arc<ProfileWriter>,
}

impl ApplyInstrumentResultHandler {
    pub fn new(writer: Arc<ProfileWriter>) -> Self {
        Self { writer }
    }

    pub async fn handle(
        &self,
        cmd: ApplyInstrumentResultCommand,
    ) -> Result<ProfileUpdate, WellnessError> {
        let update = self
            .writer
            .write(&cmd.user_id, |profile, now| {
                profile.apply_instrument_result(&cmd.deltas, cmd.new_composite, cmd.trigger, now)
            })
            .await?;

        info!(
            user_id = %cmd.user_id,
            trigger = %cmd.trigger,
            zones = cmd.deltas.len(),
            old_composite = ?update.entry.old_composite,
            new_composite = update.entry.new_composite,
            "Instrument result applied"
        );
        Ok(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryWellnessStore;
    use crate::domain::catalog::PressureZone;
    use crate::ports::{ScoreHistoryReader, WellnessProfileRepository};

    fn user() -> UserId {
        UserId::new("caregiver-1").unwrap()
    }

    fn handler(store: Arc<InMemoryWellnessStore>) -> ApplyInstrumentResultHandler {
        ApplyInstrumentResultHandler::new(Arc::new(ProfileWriter::new(store, 5)))
    }

    #[tokio::test]
    async fn first_result_creates_profile_and_history() {
        let store = Arc::new(InMemoryWellnessStore::new());

        let update = handler(store.clone())
            .handle(ApplyInstrumentResultCommand {
                user_id: user(),
                deltas: ZoneDeltas::from([(PressureZone::P6, 100.0), (PressureZone::P1, 100.0)]),
                new_composite: 100.0,
                trigger: ScoreTrigger::Ema,
            })
            .await
            .unwrap();

        assert_eq!(update.entry.old_composite, None);
        assert_eq!(update.entry.new_composite, 100.0);
        let history = store.recent(&user(), 10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].trigger, ScoreTrigger::Ema);
    }

    #[tokio::test]
    async fn later_result_keeps_untouched_zones() {
        let store = Arc::new(InMemoryWellnessStore::new());
        let handler = handler(store.clone());

        handler
            .handle(ApplyInstrumentResultCommand {
                user_id: user(),
                deltas: ZoneDeltas::from([(PressureZone::P3, 60.0), (PressureZone::P4, 80.0)]),
                new_composite: 70.0,
                trigger: ScoreTrigger::Sdoh,
            })
            .await
            .unwrap();
        let update = handler
            .handle(ApplyInstrumentResultCommand {
                user_id: user(),
                deltas: ZoneDeltas::from([(PressureZone::P6, 25.0)]),
                new_composite: 25.0,
                trigger: ScoreTrigger::Ema,
            })
            .await
            .unwrap();

        assert_eq!(update.entry.old_composite, Some(70.0));
        let stored = store.find(&user()).await.unwrap().unwrap();
        assert_eq!(stored.zones().get(PressureZone::P3), Some(60.0));
        assert_eq!(stored.zones().get(PressureZone::P4), Some(80.0));
        assert_eq!(stored.zones().get(PressureZone::P6), Some(25.0));
        assert_eq!(stored.composite(), Some(25.0));
    }
}
