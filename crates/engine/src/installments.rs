//! Installment records and the scheduling helpers that build them.
//!
//! A principal can be split into dated installments. The scheduler validates
//! the split against the principal: the amounts must add up to the principal
//! within [`SUM_TOLERANCE`]. A principal with no installments at all is a
//! valid lump-sum obligation and skips the sum check.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CurrencyAmount, EngineError, Money, ResultEngine};

/// Maximum allowed difference between a principal and the sum of its
/// installments: one minor unit, i.e. 0.01 in major units.
pub const SUM_TOLERANCE: Money = Money::new(1);

/// A scheduled partial payment of one currency's principal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installment {
    pub id: Uuid,
    pub due_date: NaiveDate,
    pub amount: Money,
    pub is_paid: bool,
    pub paid_date: Option<NaiveDate>,
}

impl Installment {
    pub fn new(due_date: NaiveDate, amount: Money) -> ResultEngine<Self> {
        if !amount.is_positive() {
            return Err(EngineError::InstallmentFieldInvalid {
                field: "amount",
                reason: format!("must be > 0, got {amount}"),
            });
        }
        Ok(Self {
            id: Uuid::new_v4(),
            due_date,
            amount,
            is_paid: false,
            paid_date: None,
        })
    }

    /// Marks the installment paid on the given date.
    pub fn mark_paid(&mut self, paid_on: NaiveDate) {
        self.is_paid = true;
        self.paid_date = Some(paid_on);
    }
}

/// Builds a schedule from explicit `(due_date, amount)` pairs.
///
/// Each pair is validated on its own (`amount > 0`), then the sum is checked
/// against the principal.
pub fn from_schedule(
    principal: &CurrencyAmount,
    pairs: Vec<(NaiveDate, Money)>,
) -> ResultEngine<Vec<Installment>> {
    let mut installments = Vec::with_capacity(pairs.len());
    for (due_date, amount) in pairs {
        installments.push(Installment::new(due_date, amount)?);
    }
    validate(principal, &installments)?;
    Ok(installments)
}

/// Splits a principal evenly over the given due dates.
///
/// The amounts are integer minor units, so the final installment absorbs the
/// division remainder and the sum matches the principal exactly.
pub fn split_even(
    principal: &CurrencyAmount,
    due_dates: &[NaiveDate],
) -> ResultEngine<Vec<Installment>> {
    let count = due_dates.len() as i64;
    if count == 0 {
        return Err(EngineError::InstallmentFieldInvalid {
            field: "due_date",
            reason: "at least one due date is required".to_string(),
        });
    }
    if !principal.amount.is_positive() {
        return Err(EngineError::NonPositiveAmount(format!(
            "cannot split principal of {}",
            principal
        )));
    }

    let total = principal.amount.minor();
    let base = total / count;
    let mut installments = Vec::with_capacity(due_dates.len());
    for (i, due_date) in due_dates.iter().enumerate() {
        let amount = if i as i64 == count - 1 {
            total - base * (count - 1)
        } else {
            base
        };
        installments.push(Installment::new(*due_date, Money::new(amount))?);
    }
    Ok(installments)
}

/// Suggests the next installment amount: whatever part of the principal the
/// existing schedule does not yet cover, floored at zero.
///
/// Convenience only. Callers may override the amount before persisting; the
/// final schedule is still validated by [`validate`] before the obligation
/// can close.
pub fn suggest_next(existing: &[Installment], principal: &CurrencyAmount) -> Money {
    let scheduled: Money = existing.iter().map(|i| i.amount).sum();
    (principal.amount - scheduled).clamp_zero()
}

/// Removes one installment by position.
///
/// Does not re-validate the remaining schedule; the sum invariant is checked
/// again when the schedule is stored or the obligation closes.
pub fn remove(mut existing: Vec<Installment>, index: usize) -> ResultEngine<Vec<Installment>> {
    if index >= existing.len() {
        return Err(EngineError::KeyNotFound(format!("installment #{index}")));
    }
    existing.remove(index);
    Ok(existing)
}

/// Checks the installment-sum invariant for one currency.
///
/// An empty schedule is valid (single lump-sum obligation). Otherwise the
/// amounts must add up to the principal within [`SUM_TOLERANCE`].
pub fn validate(principal: &CurrencyAmount, installments: &[Installment]) -> ResultEngine<()> {
    if installments.is_empty() {
        return Ok(());
    }
    let actual: Money = installments.iter().map(|i| i.amount).sum();
    if actual.abs_diff(principal.amount) > SUM_TOLERANCE {
        return Err(EngineError::InstallmentSumMismatch {
            currency: principal.currency,
            expected: principal.amount,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Currency;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn principal(minor: i64) -> CurrencyAmount {
        CurrencyAmount::new(Currency::Lak, Money::new(minor)).unwrap()
    }

    #[test]
    fn explicit_schedule_matching_sum_is_accepted() {
        let installments = from_schedule(
            &principal(100_000_000_00),
            vec![
                (date(1), Money::new(60_000_000_00)),
                (date(15), Money::new(40_000_000_00)),
            ],
        )
        .unwrap();
        assert_eq!(installments.len(), 2);
        assert!(!installments[0].is_paid);
    }

    #[test]
    fn mismatching_sum_reports_expected_and_actual() {
        let err = from_schedule(
            &principal(100_000_000_00),
            vec![
                (date(1), Money::new(60_000_000_00)),
                (date(15), Money::new(30_000_000_00)),
            ],
        )
        .unwrap_err();
        assert_eq!(
            err,
            EngineError::InstallmentSumMismatch {
                currency: Currency::Lak,
                expected: Money::new(100_000_000_00),
                actual: Money::new(90_000_000_00),
            }
        );
    }

    #[test]
    fn sum_within_tolerance_is_accepted() {
        from_schedule(
            &principal(1001),
            vec![(date(1), Money::new(500)), (date(2), Money::new(500))],
        )
        .unwrap();
    }

    #[test]
    fn zero_amount_item_is_rejected() {
        let err = from_schedule(&principal(1000), vec![(date(1), Money::ZERO)]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InstallmentFieldInvalid { field: "amount", .. }
        ));
    }

    #[test]
    fn split_even_absorbs_remainder_in_last() {
        let installments = split_even(&principal(1000), &[date(1), date(2), date(3)]).unwrap();
        let amounts: Vec<i64> = installments.iter().map(|i| i.amount.minor()).collect();
        assert_eq!(amounts, vec![333, 333, 334]);
        validate(&principal(1000), &installments).unwrap();
    }

    #[test]
    fn suggest_next_floors_at_zero() {
        let installments = split_even(&principal(1000), &[date(1), date(2)]).unwrap();
        assert_eq!(suggest_next(&installments, &principal(1000)), Money::ZERO);
        assert_eq!(
            suggest_next(&installments[..1], &principal(1000)),
            Money::new(500)
        );
    }

    #[test]
    fn remove_does_not_revalidate() {
        let installments = split_even(&principal(1000), &[date(1), date(2)]).unwrap();
        let remaining = remove(installments, 0).unwrap();
        assert_eq!(remaining.len(), 1);
        // The shrunken schedule no longer matches the principal; validate
        // still catches it when the caller re-checks.
        assert!(validate(&principal(1000), &remaining).is_err());
    }

    #[test]
    fn remove_out_of_bounds_is_not_found() {
        let installments = split_even(&principal(1000), &[date(1)]).unwrap();
        assert!(matches!(
            remove(installments, 3),
            Err(EngineError::KeyNotFound(_))
        ));
    }

    #[test]
    fn empty_schedule_is_valid() {
        validate(&principal(1000), &[]).unwrap();
    }
}
