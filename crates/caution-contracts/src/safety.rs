//! Confirmation decision and safety state types.

use serde::{Deserialize, Serialize};

/// The human decision recorded against a record's active warnings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfirmDecision {
    /// No decision has been recorded yet.
    #[default]
    Undecided,
    /// The warnings were read and accepted; the confirmation gate is open.
    Accepted,
    /// The warnings were read and rejected; the gate stays closed.
    Rejected,
}

impl From<bool> for ConfirmDecision {
    fn from(accepted: bool) -> Self {
        if accepted {
            Self::Accepted
        } else {
            Self::Rejected
        }
    }
}

/// Where a record stands with respect to the confirmation gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SafetyState {
    /// No unconfirmed active warnings block the record.
    NoWarnings,
    /// Active warnings were detected and await a human decision.
    UnconfirmedActive,
    /// A human accepted the warnings.
    ConfirmedAccepted,
    /// A human rejected the warnings.
    ConfirmedRejected,
}
