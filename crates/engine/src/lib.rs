//! Multi-currency obligation ledger engine.
//!
//! Tracks financial obligations (employee advances, payable/receivable
//! debts) denominated in one or more currencies: installment schedules,
//! reconciling transactions, derived per-currency balances and the
//! pending/open/closed lifecycle. Pure and synchronous; persistence and
//! transport belong to the crates that consume this one.

pub use amounts::CurrencyAmount;
pub use currency::Currency;
pub use error::EngineError;
pub use installments::{Installment, SUM_TOLERANCE};
pub use lifecycle::Status;
pub use money::Money;
pub use obligation::{CurrencySummary, Obligation, ObligationKind};
pub use transactions::{Transaction, TransactionKind};

mod amounts;
mod currency;
mod error;
pub mod installments;
pub mod lifecycle;
mod money;
mod obligation;
mod transactions;

type ResultEngine<T> = Result<T, EngineError>;
