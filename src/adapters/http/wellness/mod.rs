//! HTTP adapter for assessment, profile and catalog endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    AnswerResponse, ErrorResponse, HistoryResponse, InstrumentResponse, ProfileResponse,
    ScoreResponse, SessionResponse, DEFAULT_HISTORY_LIMIT,
};
pub use handlers::WellnessHandlers;
pub use routes::{catalog_routes, user_routes};
