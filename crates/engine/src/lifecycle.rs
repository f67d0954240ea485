//! Obligation lifecycle.
//!
//! Every status comparison in the system goes through this module: `Status`
//! is an enumerated sum type and `check_transition` is the single transition
//! table. Callers never compare status strings.

use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// Coarse state of an obligation.
///
/// New obligations start `Pending`; callers that mark them immediately active
/// call `activate` right after creation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Pending,
    Open,
    Closed,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl core::fmt::Display for Status {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Status {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid status: {other}"
            ))),
        }
    }
}

/// Checks a lifecycle transition against the allowed table.
///
/// Allowed: `Pending -> Open` (activate), `Open -> Closed` (close),
/// `Closed -> Open` (reopen). Everything else is rejected, including no-op
/// transitions such as closing an already-closed obligation.
pub fn check_transition(from: Status, to: Status) -> ResultEngine<()> {
    match (from, to) {
        (Status::Pending, Status::Open)
        | (Status::Open, Status::Closed)
        | (Status::Closed, Status::Open) => Ok(()),
        _ => Err(EngineError::IllegalTransition { from, to }),
    }
}
