//! Reconciling transaction primitives.
//!
//! A `Transaction` is a dated entry recorded against one currency of an
//! obligation's principal set. The aggregate derives per-currency balances
//! from the full list; a transaction itself is immutable once created and can
//! only be removed wholesale.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, EngineError, Money, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Money paid out against the advance.
    Spend,
    /// Unused money handed back to the company.
    ReturnToCompany,
    /// Money paid out to the employee on top of what was spent.
    RefundToEmployee,
    /// Request to raise the principal. Recorded only; the principal itself
    /// changes through the separate `increase_principal` command.
    AdditionalRequest,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Spend => "spend",
            Self::ReturnToCompany => "return_to_company",
            Self::RefundToEmployee => "refund_to_employee",
            Self::AdditionalRequest => "additional_request",
        }
    }

    /// Whether this kind counts toward the net disbursed total.
    pub fn is_disbursement(self) -> bool {
        matches!(self, Self::Spend | Self::RefundToEmployee)
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "spend" => Ok(Self::Spend),
            "return_to_company" => Ok(Self::ReturnToCompany),
            "refund_to_employee" => Ok(Self::RefundToEmployee),
            "additional_request" => Ok(Self::AdditionalRequest),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub kind: TransactionKind,
    pub currency: Currency,
    pub amount: Money,
    pub note: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        kind: TransactionKind,
        currency: Currency,
        amount: Money,
        note: Option<String>,
        occurred_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if !amount.is_positive() {
            return Err(EngineError::NonPositiveAmount(format!(
                "{} transaction of {amount} {currency}",
                kind.as_str()
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            kind,
            currency,
            amount,
            note,
            occurred_at,
        })
    }
}
