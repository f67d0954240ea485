//! The `Obligation` aggregate: principals, installment schedules and the
//! reconciling transaction ledger, with per-currency summaries derived after
//! every mutation.
//!
//! All commands go through the aggregate so the invariants hold no matter the
//! caller: transaction/installment currencies stay inside the principal set,
//! installment sums stay within tolerance of their principal, and `closed_at`
//! is set exactly when the status is `Closed`. Every successful command bumps
//! `version`; the store uses that for optimistic concurrency.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Currency, CurrencyAmount, EngineError, Money, ResultEngine,
    installments::{self, Installment},
    lifecycle::{Status, check_transition},
    transactions::{Transaction, TransactionKind},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObligationKind {
    /// Employee/vendor prepaid advance, reconciled by transactions.
    Advance,
    /// Payable/receivable debt, reconciled by paid installments.
    Debt,
}

impl ObligationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Advance => "advance",
            Self::Debt => "debt",
        }
    }
}

impl TryFrom<&str> for ObligationKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "advance" => Ok(Self::Advance),
            "debt" => Ok(Self::Debt),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid obligation kind: {other}"
            ))),
        }
    }
}

/// Derived per-currency totals, recomputed after every mutation.
///
/// `remaining` is clamped at zero for display; the unclamped picture is still
/// recoverable from the other fields, which is how callers detect overpayment
/// (`net_disbursed > requested`) or unexplained returns
/// (`returned_to_company > net_disbursed`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencySummary {
    pub requested: Money,
    pub spent: Money,
    pub returned_to_company: Money,
    pub refunded_to_employee: Money,
    pub net_disbursed: Money,
    pub paid_installments: Money,
    pub remaining: Money,
}

/// The aggregate root.
///
/// Owns its installments and transactions exclusively; `counterparty_ref` is
/// an opaque reference the engine never dereferences.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Obligation {
    pub id: Uuid,
    pub kind: ObligationKind,
    pub counterparty_ref: String,
    pub payment_method: Option<String>,
    pub principals: Vec<CurrencyAmount>,
    pub installments: HashMap<Currency, Vec<Installment>>,
    pub transactions: Vec<Transaction>,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub remarks: Option<String>,
    /// Optimistic-concurrency revision; bumped by every successful command.
    pub version: u64,
    #[serde(default)]
    summaries: HashMap<Currency, CurrencySummary>,
}

impl Obligation {
    /// Creates a pending obligation.
    ///
    /// Principals must be currency-unique; an empty set is accepted here and
    /// rejected at `activate`.
    pub fn new(
        kind: ObligationKind,
        counterparty_ref: String,
        principals: Vec<CurrencyAmount>,
        payment_method: Option<String>,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        for (i, principal) in principals.iter().enumerate() {
            if principals[..i]
                .iter()
                .any(|p| p.currency == principal.currency)
            {
                return Err(EngineError::DuplicateCurrency(principal.currency));
            }
        }

        let mut obligation = Self {
            id: Uuid::new_v4(),
            kind,
            counterparty_ref,
            payment_method,
            principals,
            installments: HashMap::new(),
            transactions: Vec::new(),
            status: Status::Pending,
            created_at,
            closed_at: None,
            remarks: None,
            version: 0,
            summaries: HashMap::new(),
        };
        obligation.recompute();
        Ok(obligation)
    }

    pub fn principal(&self, currency: Currency) -> Option<&CurrencyAmount> {
        self.principals.iter().find(|p| p.currency == currency)
    }

    fn require_principal(&self, currency: Currency) -> ResultEngine<&CurrencyAmount> {
        self.principal(currency)
            .ok_or(EngineError::CurrencyNotInPrincipal(currency))
    }

    fn ensure_not_closed(&self) -> ResultEngine<()> {
        if self.status == Status::Closed {
            return Err(EngineError::ObligationClosed(self.id.to_string()));
        }
        Ok(())
    }

    fn bump(&mut self) {
        self.version += 1;
    }

    /// Appends a reconciling transaction and recomputes summaries.
    pub fn append_transaction(&mut self, transaction: Transaction) -> ResultEngine<()> {
        self.ensure_not_closed()?;
        self.require_principal(transaction.currency)?;
        if !transaction.amount.is_positive() {
            return Err(EngineError::NonPositiveAmount(format!(
                "{} transaction of {} {}",
                transaction.kind.as_str(),
                transaction.amount,
                transaction.currency
            )));
        }
        self.transactions.push(transaction);
        self.recompute();
        self.bump();
        Ok(())
    }

    /// Removes a transaction by id and recomputes summaries.
    pub fn remove_transaction(&mut self, transaction_id: Uuid) -> ResultEngine<Transaction> {
        self.ensure_not_closed()?;
        let index = self
            .transactions
            .iter()
            .position(|tx| tx.id == transaction_id)
            .ok_or_else(|| EngineError::KeyNotFound(transaction_id.to_string()))?;
        let removed = self.transactions.remove(index);
        self.recompute();
        self.bump();
        Ok(removed)
    }

    /// Replaces one currency's installment schedule after full validation.
    ///
    /// An empty list clears the schedule, turning that currency back into a
    /// lump-sum obligation.
    pub fn set_installments(
        &mut self,
        currency: Currency,
        schedule: Vec<Installment>,
    ) -> ResultEngine<()> {
        self.ensure_not_closed()?;
        let principal = *self.require_principal(currency)?;
        for installment in &schedule {
            if !installment.amount.is_positive() {
                return Err(EngineError::InstallmentFieldInvalid {
                    field: "amount",
                    reason: format!("must be > 0, got {}", installment.amount),
                });
            }
        }
        installments::validate(&principal, &schedule)?;
        if schedule.is_empty() {
            self.installments.remove(&currency);
        } else {
            self.installments.insert(currency, schedule);
        }
        self.recompute();
        self.bump();
        Ok(())
    }

    /// Marks one installment paid and recomputes summaries.
    pub fn mark_installment_paid(
        &mut self,
        currency: Currency,
        installment_id: Uuid,
        paid_on: NaiveDate,
    ) -> ResultEngine<()> {
        self.ensure_not_closed()?;
        self.require_principal(currency)?;
        let installment = self
            .installments
            .get_mut(&currency)
            .and_then(|schedule| schedule.iter_mut().find(|i| i.id == installment_id))
            .ok_or_else(|| EngineError::KeyNotFound(installment_id.to_string()))?;
        installment.mark_paid(paid_on);
        self.recompute();
        self.bump();
        Ok(())
    }

    /// Raises an existing currency's principal.
    ///
    /// This is the explicit approval step behind an `additional_request`
    /// transaction; appending the transaction alone never changes principals.
    pub fn increase_principal(&mut self, currency: Currency, by: Money) -> ResultEngine<()> {
        self.ensure_not_closed()?;
        if !by.is_positive() {
            return Err(EngineError::NonPositiveAmount(format!(
                "principal increase of {by} {currency}"
            )));
        }
        let principal = self
            .principals
            .iter_mut()
            .find(|p| p.currency == currency)
            .ok_or(EngineError::CurrencyNotInPrincipal(currency))?;
        principal.amount += by;
        self.recompute();
        self.bump();
        Ok(())
    }

    /// `pending -> open`.
    pub fn activate(&mut self) -> ResultEngine<()> {
        check_transition(self.status, Status::Open)?;
        if self.principals.is_empty() {
            return Err(EngineError::InvalidAmount(
                "cannot activate an obligation with no principals".to_string(),
            ));
        }
        self.status = Status::Open;
        self.bump();
        Ok(())
    }

    /// `open -> closed`.
    ///
    /// Before closing, every present installment schedule is re-validated
    /// against its principal, and no currency may have returned more to the
    /// company than was disbursed (that would be an unexplained negative
    /// balance).
    pub fn close(
        &mut self,
        remarks: Option<String>,
        closed_at: DateTime<Utc>,
    ) -> ResultEngine<()> {
        check_transition(self.status, Status::Closed)?;
        for principal in &self.principals {
            if let Some(schedule) = self.installments.get(&principal.currency) {
                installments::validate(principal, schedule)?;
            }
            if let Some(summary) = self.summaries.get(&principal.currency)
                && summary.returned_to_company > summary.net_disbursed
            {
                return Err(EngineError::InvalidAmount(format!(
                    "unexplained negative balance for {}: returned {} exceeds disbursed {}",
                    principal.currency, summary.returned_to_company, summary.net_disbursed
                )));
            }
        }
        self.status = Status::Closed;
        self.closed_at = Some(closed_at);
        self.remarks = remarks;
        self.bump();
        Ok(())
    }

    /// `closed -> open`; clears `closed_at`, everything else untouched.
    pub fn reopen(&mut self) -> ResultEngine<()> {
        check_transition(self.status, Status::Open)?;
        self.status = Status::Open;
        self.closed_at = None;
        self.bump();
        Ok(())
    }

    /// Rebuilds the per-currency summaries from the current installments and
    /// transactions.
    ///
    /// Pure derivation: no other field is touched, and recomputing twice
    /// yields the same result. Called internally after every mutation; also
    /// public so callers can refresh an obligation restored from storage.
    pub fn recompute(&mut self) {
        let mut summaries = HashMap::with_capacity(self.principals.len());
        for principal in &self.principals {
            let currency = principal.currency;
            let mut spent = Money::ZERO;
            let mut returned_to_company = Money::ZERO;
            let mut refunded_to_employee = Money::ZERO;
            for tx in self.transactions.iter().filter(|tx| tx.currency == currency) {
                match tx.kind {
                    TransactionKind::Spend => spent += tx.amount,
                    TransactionKind::ReturnToCompany => returned_to_company += tx.amount,
                    TransactionKind::RefundToEmployee => refunded_to_employee += tx.amount,
                    TransactionKind::AdditionalRequest => {}
                }
            }
            let net_disbursed = spent + refunded_to_employee;
            let paid_installments: Money = self
                .installments
                .get(&currency)
                .map(|schedule| {
                    schedule
                        .iter()
                        .filter(|i| i.is_paid)
                        .map(|i| i.amount)
                        .sum()
                })
                .unwrap_or(Money::ZERO);
            let remaining = match self.kind {
                ObligationKind::Advance => (principal.amount - net_disbursed).clamp_zero(),
                ObligationKind::Debt => (principal.amount - paid_installments).clamp_zero(),
            };
            summaries.insert(
                currency,
                CurrencySummary {
                    requested: principal.amount,
                    spent,
                    returned_to_company,
                    refunded_to_employee,
                    net_disbursed,
                    paid_installments,
                    remaining,
                },
            );
        }
        self.summaries = summaries;
    }

    pub fn summary(&self, currency: Currency) -> Option<&CurrencySummary> {
        self.summaries.get(&currency)
    }

    pub fn summaries(&self) -> &HashMap<Currency, CurrencySummary> {
        &self.summaries
    }

    /// Remaining balance for one currency, `None` if the currency is not a
    /// principal.
    pub fn remaining(&self, currency: Currency) -> Option<Money> {
        self.summaries.get(&currency).map(|s| s.remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn advance(principals: Vec<CurrencyAmount>) -> Obligation {
        Obligation::new(
            ObligationKind::Advance,
            "emp-17".to_string(),
            principals,
            Some("cash".to_string()),
            Utc::now(),
        )
        .unwrap()
    }

    fn lak(minor: i64) -> CurrencyAmount {
        CurrencyAmount::new(Currency::Lak, Money::new(minor)).unwrap()
    }

    #[test]
    fn new_rejects_duplicate_currency() {
        let err = Obligation::new(
            ObligationKind::Advance,
            "emp-17".to_string(),
            vec![lak(1000), lak(2000)],
            None,
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, EngineError::DuplicateCurrency(Currency::Lak));
    }

    #[test]
    fn append_foreign_currency_fails() {
        let mut obligation = advance(vec![lak(1000)]);
        let tx = Transaction::new(
            TransactionKind::Spend,
            Currency::Usd,
            Money::new(100),
            None,
            Utc::now(),
        )
        .unwrap();
        assert_eq!(
            obligation.append_transaction(tx),
            Err(EngineError::CurrencyNotInPrincipal(Currency::Usd))
        );
    }

    #[test]
    fn additional_request_does_not_change_principal() {
        let mut obligation = advance(vec![lak(1000)]);
        let tx = Transaction::new(
            TransactionKind::AdditionalRequest,
            Currency::Lak,
            Money::new(500),
            None,
            Utc::now(),
        )
        .unwrap();
        obligation.append_transaction(tx).unwrap();

        let summary = obligation.summary(Currency::Lak).unwrap();
        assert_eq!(summary.requested, Money::new(1000));
        assert_eq!(summary.net_disbursed, Money::ZERO);

        obligation
            .increase_principal(Currency::Lak, Money::new(500))
            .unwrap();
        assert_eq!(
            obligation.summary(Currency::Lak).unwrap().requested,
            Money::new(1500)
        );
    }

    #[test]
    fn commands_bump_version() {
        let mut obligation = advance(vec![lak(1000)]);
        assert_eq!(obligation.version, 0);
        obligation.activate().unwrap();
        assert_eq!(obligation.version, 1);
        let tx = Transaction::new(
            TransactionKind::Spend,
            Currency::Lak,
            Money::new(100),
            None,
            Utc::now(),
        )
        .unwrap();
        obligation.append_transaction(tx).unwrap();
        assert_eq!(obligation.version, 2);
    }

    #[test]
    fn mutations_on_closed_are_rejected() {
        let mut obligation = advance(vec![lak(1000)]);
        obligation.activate().unwrap();
        obligation.close(None, Utc::now()).unwrap();

        let tx = Transaction::new(
            TransactionKind::Spend,
            Currency::Lak,
            Money::new(100),
            None,
            Utc::now(),
        )
        .unwrap();
        assert!(matches!(
            obligation.append_transaction(tx),
            Err(EngineError::ObligationClosed(_))
        ));
        assert!(matches!(
            obligation.increase_principal(Currency::Lak, Money::new(1)),
            Err(EngineError::ObligationClosed(_))
        ));
    }

    #[test]
    fn close_blocks_returns_exceeding_disbursements() {
        let mut obligation = advance(vec![lak(1000)]);
        obligation.activate().unwrap();
        let tx = Transaction::new(
            TransactionKind::ReturnToCompany,
            Currency::Lak,
            Money::new(300),
            None,
            Utc::now(),
        )
        .unwrap();
        obligation.append_transaction(tx).unwrap();

        assert!(obligation.close(None, Utc::now()).is_err());
    }

    #[test]
    fn activate_requires_principals() {
        let mut obligation = advance(vec![]);
        assert!(obligation.activate().is_err());
    }
}
