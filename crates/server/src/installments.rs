//! Installment-schedule API endpoints.

use api_types::installment::{InstallmentPaid, ScheduleSet};
use api_types::obligation::ObligationView;
use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    ServerError,
    obligations::{currency_in, view},
    server::ServerState,
};
use engine::{Installment, Money};

pub async fn set_schedule(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ScheduleSet>,
) -> Result<Json<ObligationView>, ServerError> {
    let currency = currency_in(payload.currency);
    let mut schedule = Vec::with_capacity(payload.installments.len());
    for item in &payload.installments {
        schedule.push(Installment::new(item.due_date, Money::new(item.amount_minor))?);
    }

    let obligation = state
        .store
        .mutate(id, payload.expected_version, |o| {
            o.set_installments(currency, schedule)
        })
        .await?;
    Ok(Json(view(&obligation)?))
}

pub async fn mark_paid(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<InstallmentPaid>,
) -> Result<Json<ObligationView>, ServerError> {
    let currency = currency_in(payload.currency);
    let paid_on = payload
        .paid_date
        .unwrap_or_else(|| Utc::now().date_naive());

    let obligation = state
        .store
        .mutate(id, payload.expected_version, |o| {
            o.mark_installment_paid(currency, payload.installment_id, paid_on)
        })
        .await?;
    Ok(Json(view(&obligation)?))
}
