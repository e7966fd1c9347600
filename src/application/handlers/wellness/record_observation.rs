//! RecordObservationHandler - merges one ad-hoc zone value.

use std::sync::Arc;

use tracing::info;

use crate::domain::catalog::PressureZone;
use crate::domain::foundation::UserId;
use crate::domain::wellness::WellnessError;

use super::{ProfileUpdate, ProfileWriter};

/// An observed 0-100 value for one canonical zone.
#[derive(Debug, Clone)]
pub struct RecordObservationCommand {
    pub user_id: UserId,
    pub zone: PressureZone,
    pub value: f64,
}

pub struct RecordObservationHandler {
    writer: Arc<ProfileWriter>,
}

impl RecordObservationHandler {
    pub fn new(writer: Arc<ProfileWriter>) -> Self {
        Self { writer }
    }

    pub async fn handle(&self, cmd: RecordObservationCommand) -> Result<ProfileUpdate, WellnessError> {
        let update = self
            .writer
            .write(&cmd.user_id, |profile, now| {
                profile.apply_observation(cmd.zone, cmd.value, now)
            })
            .await?;

        info!(
            user_id = %cmd.user_id,
            zone = %cmd.zone,
            value = cmd.value,
            new_composite = update.entry.new_composite,
            "Observation recorded"
        );
        Ok(update)
    }
}
