use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{app, run, run_with_listener, spawn_with_listener};
pub use store::{ListFilter, ObligationStore};

mod installments;
mod obligations;
mod server;
mod store;
mod transactions;

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::StaleVersion { .. }
        | EngineError::DuplicateCurrency(_)
        | EngineError::IllegalTransition { .. }
        | EngineError::ObligationClosed(_) => StatusCode::CONFLICT,
        EngineError::InstallmentSumMismatch { .. }
        | EngineError::InstallmentFieldInvalid { .. }
        | EngineError::CurrencyNotInPrincipal(_)
        | EngineError::NonPositiveAmount(_)
        | EngineError::InvalidAmount(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), err.to_string()),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
