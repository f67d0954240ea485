//! Transaction API endpoints.

use api_types::transaction::{TransactionKind as ApiKind, TransactionNew, TransactionRemove};
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
use api_types::obligation::ObligationView;
use engine::{Money, Transaction, TransactionKind};

fn kind_in(kind: ApiKind) -> TransactionKind {
    match kind {
        ApiKind::Spend => TransactionKind::Spend,
        ApiKind::ReturnToCompany => TransactionKind::ReturnToCompany,
        ApiKind::RefundToEmployee => TransactionKind::RefundToEmployee,
        ApiKind::AdditionalRequest => TransactionKind::AdditionalRequest,
    }
}

pub async fn append(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransactionNew>,
) -> Result<Json<ObligationView>, ServerError> {
    let transaction = Transaction::new(
        kind_in(payload.kind),
        currency_in(payload.currency),
        Money::new(payload.amount_minor),
        payload.note,
        payload.occurred_at.with_timezone(&Utc),
    )?;

    let obligation = state
        .store
        .mutate(id, payload.expected_version, |o| {
            o.append_transaction(transaction)
        })
        .await?;
    Ok(Json(view(&obligation)?))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path((id, transaction_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<TransactionRemove>,
) -> Result<Json<ObligationView>, ServerError> {
    let obligation = state
        .store
        .mutate(id, payload.expected_version, |o| {
            o.remove_transaction(transaction_id).map(|_| ())
        })
        .await?;
    Ok(Json(view(&obligation)?))
}
