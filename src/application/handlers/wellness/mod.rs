//! Wellness profile, history and spike handlers.

mod apply_instrument_result;
mod evaluate_spike;
mod profile_writer;
mod queries;
mod record_observation;

pub use apply_instrument_result::{ApplyInstrumentResultCommand, ApplyInstrumentResultHandler};
pub use evaluate_spike::{EvaluateSpikeCommand, EvaluateSpikeHandler, SpikeCollaborators};
pub use profile_writer::{ProfileUpdate, ProfileWriter};
pub use queries::{
    GetHistoryHandler, GetHistoryQuery, GetProfileHandler, GetProfileQuery, MAX_HISTORY_LIMIT,
};
pub use record_observation::{RecordObservationCommand, RecordObservationHandler};
