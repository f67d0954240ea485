//! Obligation API endpoints.

use api_types::obligation::{
    Activate, Close, ObligationKind as ApiKind, ObligationList, ObligationListResponse,
    ObligationNew, ObligationView, Principal, PrincipalIncrease, Reopen, Status as ApiStatus,
    SummaryView,
};
use api_types::installment::{InstallmentView, ScheduleView};
use api_types::transaction::{TransactionKind as ApiTxKind, TransactionView};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{FixedOffset, Utc};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, store::ListFilter};
use engine::{CurrencyAmount, Money, Obligation};

pub(crate) fn currency_in(currency: api_types::Currency) -> engine::Currency {
    match currency {
        api_types::Currency::Lak => engine::Currency::Lak,
        api_types::Currency::Thb => engine::Currency::Thb,
        api_types::Currency::Usd => engine::Currency::Usd,
        api_types::Currency::Cny => engine::Currency::Cny,
        api_types::Currency::Eur => engine::Currency::Eur,
    }
}

pub(crate) fn currency_out(currency: engine::Currency) -> api_types::Currency {
    match currency {
        engine::Currency::Lak => api_types::Currency::Lak,
        engine::Currency::Thb => api_types::Currency::Thb,
        engine::Currency::Usd => api_types::Currency::Usd,
        engine::Currency::Cny => api_types::Currency::Cny,
        engine::Currency::Eur => api_types::Currency::Eur,
    }
}

fn kind_in(kind: ApiKind) -> engine::ObligationKind {
    match kind {
        ApiKind::Advance => engine::ObligationKind::Advance,
        ApiKind::Debt => engine::ObligationKind::Debt,
    }
}

fn kind_out(kind: engine::ObligationKind) -> ApiKind {
    match kind {
        engine::ObligationKind::Advance => ApiKind::Advance,
        engine::ObligationKind::Debt => ApiKind::Debt,
    }
}

fn status_in(status: ApiStatus) -> engine::Status {
    match status {
        ApiStatus::Pending => engine::Status::Pending,
        ApiStatus::Open => engine::Status::Open,
        ApiStatus::Closed => engine::Status::Closed,
    }
}

fn status_out(status: engine::Status) -> ApiStatus {
    match status {
        engine::Status::Pending => ApiStatus::Pending,
        engine::Status::Open => ApiStatus::Open,
        engine::Status::Closed => ApiStatus::Closed,
    }
}

fn tx_kind_out(kind: engine::TransactionKind) -> ApiTxKind {
    match kind {
        engine::TransactionKind::Spend => ApiTxKind::Spend,
        engine::TransactionKind::ReturnToCompany => ApiTxKind::ReturnToCompany,
        engine::TransactionKind::RefundToEmployee => ApiTxKind::RefundToEmployee,
        engine::TransactionKind::AdditionalRequest => ApiTxKind::AdditionalRequest,
    }
}

/// Maps an engine obligation to its API view.
///
/// Map-backed parts (schedules, summaries) are sorted by currency so the
/// response is deterministic.
pub(crate) fn view(obligation: &Obligation) -> Result<ObligationView, ServerError> {
    let utc = FixedOffset::east_opt(0)
        .ok_or_else(|| ServerError::Generic("invalid UTC offset".to_string()))?;

    let principals = obligation
        .principals
        .iter()
        .map(|p| Principal {
            currency: currency_out(p.currency),
            amount_minor: p.amount.minor(),
        })
        .collect();

    let mut installments: Vec<ScheduleView> = obligation
        .installments
        .iter()
        .map(|(currency, schedule)| ScheduleView {
            currency: currency_out(*currency),
            installments: schedule
                .iter()
                .map(|i| InstallmentView {
                    id: i.id,
                    due_date: i.due_date,
                    amount_minor: i.amount.minor(),
                    is_paid: i.is_paid,
                    paid_date: i.paid_date,
                })
                .collect(),
        })
        .collect();
    installments.sort_by_key(|s| s.currency);

    let transactions = obligation
        .transactions
        .iter()
        .map(|tx| TransactionView {
            id: tx.id,
            kind: tx_kind_out(tx.kind),
            currency: currency_out(tx.currency),
            amount_minor: tx.amount.minor(),
            note: tx.note.clone(),
            occurred_at: tx.occurred_at.with_timezone(&utc),
        })
        .collect();

    let mut summaries: Vec<SummaryView> = obligation
        .summaries()
        .iter()
        .map(|(currency, s)| SummaryView {
            currency: currency_out(*currency),
            requested_minor: s.requested.minor(),
            spent_minor: s.spent.minor(),
            returned_to_company_minor: s.returned_to_company.minor(),
            refunded_to_employee_minor: s.refunded_to_employee.minor(),
            net_disbursed_minor: s.net_disbursed.minor(),
            paid_installments_minor: s.paid_installments.minor(),
            remaining_minor: s.remaining.minor(),
        })
        .collect();
    summaries.sort_by_key(|s| s.currency);

    Ok(ObligationView {
        id: obligation.id,
        kind: kind_out(obligation.kind),
        counterparty_ref: obligation.counterparty_ref.clone(),
        payment_method: obligation.payment_method.clone(),
        principals,
        installments,
        transactions,
        summaries,
        status: status_out(obligation.status),
        created_at: obligation.created_at.with_timezone(&utc),
        closed_at: obligation.closed_at.map(|dt| dt.with_timezone(&utc)),
        remarks: obligation.remarks.clone(),
        version: obligation.version,
    })
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ObligationNew>,
) -> Result<(StatusCode, Json<ObligationView>), ServerError> {
    let mut principals = Vec::with_capacity(payload.principals.len());
    for p in &payload.principals {
        principals.push(CurrencyAmount::new(
            currency_in(p.currency),
            Money::new(p.amount_minor),
        )?);
    }

    let mut obligation = Obligation::new(
        kind_in(payload.kind),
        payload.counterparty_ref,
        principals,
        payload.payment_method,
        Utc::now(),
    )?;
    if payload.activate.unwrap_or(false) {
        obligation.activate()?;
    }

    let obligation = state.store.insert(obligation).await;
    Ok((StatusCode::CREATED, Json(view(&obligation)?)))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ObligationView>, ServerError> {
    let obligation = state.store.get(id).await?;
    Ok(Json(view(&obligation)?))
}

pub async fn list(
    State(state): State<ServerState>,
    Query(payload): Query<ObligationList>,
) -> Result<Json<ObligationListResponse>, ServerError> {
    let page = payload.page.unwrap_or(1).max(1);
    let page_size = payload.page_size.unwrap_or(50).clamp(1, 200);
    let filter = ListFilter {
        counterparty_ref: payload.counterparty_ref,
        status: payload.status.map(status_in),
        from: payload.from.map(|dt| dt.with_timezone(&Utc)),
        to: payload.to.map(|dt| dt.with_timezone(&Utc)),
        page,
        page_size,
    };

    let result = state.store.list(&filter).await;
    let mut obligations = Vec::with_capacity(result.obligations.len());
    for obligation in &result.obligations {
        obligations.push(view(obligation)?);
    }

    Ok(Json(ObligationListResponse {
        obligations,
        total: result.total,
        page,
        page_size,
    }))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.store.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn activate(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<Activate>,
) -> Result<Json<ObligationView>, ServerError> {
    let obligation = state
        .store
        .mutate(id, payload.expected_version, |o| o.activate())
        .await?;
    Ok(Json(view(&obligation)?))
}

pub async fn close(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<Close>,
) -> Result<Json<ObligationView>, ServerError> {
    let obligation = state
        .store
        .mutate(id, payload.expected_version, |o| {
            o.close(payload.remarks.clone(), Utc::now())
        })
        .await?;
    Ok(Json(view(&obligation)?))
}

pub async fn reopen(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<Reopen>,
) -> Result<Json<ObligationView>, ServerError> {
    let obligation = state
        .store
        .mutate(id, payload.expected_version, |o| o.reopen())
        .await?;
    Ok(Json(view(&obligation)?))
}

pub async fn increase_principal(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PrincipalIncrease>,
) -> Result<Json<ObligationView>, ServerError> {
    let currency = currency_in(payload.currency);
    let obligation = state
        .store
        .mutate(id, payload.expected_version, |o| {
            o.increase_principal(currency, Money::new(payload.amount_minor))
        })
        .await?;
    Ok(Json(view(&obligation)?))
}
