use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Lak,
    Thb,
    Usd,
    Cny,
    Eur,
}

pub mod obligation {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ObligationKind {
        Advance,
        Debt,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Status {
        Pending,
        Open,
        Closed,
    }

    /// One currency's principal, as requested or as stored.
    #[derive(Clone, Copy, Debug, Serialize, Deserialize)]
    pub struct Principal {
        pub currency: Currency,
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ObligationNew {
        pub kind: ObligationKind,
        pub counterparty_ref: String,
        pub principals: Vec<Principal>,
        pub payment_method: Option<String>,
        /// Create directly in the `open` state instead of `pending`.
        pub activate: Option<bool>,
    }

    /// Derived per-currency totals.
    #[derive(Clone, Copy, Debug, Serialize, Deserialize)]
    pub struct SummaryView {
        pub currency: Currency,
        pub requested_minor: i64,
        pub spent_minor: i64,
        pub returned_to_company_minor: i64,
        pub refunded_to_employee_minor: i64,
        pub net_disbursed_minor: i64,
        pub paid_installments_minor: i64,
        pub remaining_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ObligationView {
        pub id: Uuid,
        pub kind: ObligationKind,
        pub counterparty_ref: String,
        pub payment_method: Option<String>,
        pub principals: Vec<Principal>,
        pub installments: Vec<super::installment::ScheduleView>,
        pub transactions: Vec<super::transaction::TransactionView>,
        pub summaries: Vec<SummaryView>,
        pub status: Status,
        /// RFC3339 timestamps, including timezone offset.
        pub created_at: DateTime<FixedOffset>,
        pub closed_at: Option<DateTime<FixedOffset>>,
        pub remarks: Option<String>,
        /// Optimistic-concurrency revision; echo it back in mutating requests.
        pub version: u64,
    }

    /// Query parameters for listing obligations.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ObligationList {
        pub counterparty_ref: Option<String>,
        pub status: Option<Status>,
        pub from: Option<DateTime<FixedOffset>>,
        pub to: Option<DateTime<FixedOffset>>,
        /// 1-based page number; defaults to 1.
        pub page: Option<u64>,
        pub page_size: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ObligationListResponse {
        pub obligations: Vec<ObligationView>,
        pub total: u64,
        pub page: u64,
        pub page_size: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ObligationCreated {
        pub id: Uuid,
        pub version: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Activate {
        pub expected_version: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Close {
        pub remarks: Option<String>,
        pub expected_version: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Reopen {
        pub expected_version: u64,
    }

    /// Explicit principal raise; the approval step behind an
    /// `additional_request` transaction.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PrincipalIncrease {
        pub currency: Currency,
        pub amount_minor: i64,
        pub expected_version: u64,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        Spend,
        ReturnToCompany,
        RefundToEmployee,
        AdditionalRequest,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub kind: TransactionKind,
        pub currency: Currency,
        pub amount_minor: i64,
        pub note: Option<String>,
        /// RFC3339 timestamp, including timezone offset (local user time).
        pub occurred_at: DateTime<FixedOffset>,
        pub expected_version: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionRemove {
        pub expected_version: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub kind: TransactionKind,
        pub currency: Currency,
        pub amount_minor: i64,
        pub note: Option<String>,
        pub occurred_at: DateTime<FixedOffset>,
    }
}

pub mod installment {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InstallmentNew {
        /// Due date as `YYYY-MM-DD`.
        pub due_date: NaiveDate,
        pub amount_minor: i64,
    }

    /// Replaces one currency's whole schedule; an empty list clears it.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ScheduleSet {
        pub currency: Currency,
        pub installments: Vec<InstallmentNew>,
        pub expected_version: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InstallmentPaid {
        pub currency: Currency,
        pub installment_id: Uuid,
        /// Defaults to today (server clock) if absent.
        pub paid_date: Option<NaiveDate>,
        pub expected_version: u64,
    }

    #[derive(Clone, Copy, Debug, Serialize, Deserialize)]
    pub struct InstallmentView {
        pub id: Uuid,
        pub due_date: NaiveDate,
        pub amount_minor: i64,
        pub is_paid: bool,
        pub paid_date: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ScheduleView {
        pub currency: Currency,
        pub installments: Vec<InstallmentView>,
    }
}
