//! Per-record caution state: warnings, evaluation context, confirmation.

use caution_contracts::{ConfirmDecision, Context, SafetyState};

use crate::warnings::WarningStore;

/// Everything the engine keeps on a record.
///
/// Embed one in each host record and expose it through
/// `Cautionable::caution_state`.
#[derive(Debug, Clone, Default)]
pub struct CautionState {
    warnings: Option<WarningStore>,
    context: Option<Context>,
    confirmation: Confirmation,
}

impl CautionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn context(&self) -> Option<&Context> {
        self.context.as_ref()
    }

    /// Swap in `context`, returning the one it replaces.
    pub(crate) fn replace_context(&mut self, context: Option<Context>) -> Option<Context> {
        std::mem::replace(&mut self.context, context)
    }

    /// The record's warnings, if anything has written to them yet.
    pub fn warnings(&self) -> Option<&WarningStore> {
        self.warnings.as_ref()
    }

    pub fn warnings_mut_or_init(
        &mut self,
        init: impl FnOnce() -> WarningStore,
    ) -> &mut WarningStore {
        self.warnings.get_or_insert_with(init)
    }

    pub fn confirmation(&self) -> &Confirmation {
        &self.confirmation
    }

    pub(crate) fn confirmation_mut(&mut self) -> &mut Confirmation {
        &mut self.confirmation
    }
}

/// The confirmation flags of one record.
///
/// `needs_confirmation` is raised when a validity check finds unconfirmed
/// active warnings and is only ever lowered by recording a decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Confirmation {
    needs_confirmation: bool,
    decision: ConfirmDecision,
}

impl Confirmation {
    pub fn needs_confirmation(&self) -> bool {
        self.needs_confirmation
    }

    pub fn decision(&self) -> ConfirmDecision {
        self.decision
    }

    pub fn confirmed_safe(&self) -> bool {
        self.decision == ConfirmDecision::Accepted
    }

    /// Raise the flag. There is no way to lower it other than `decide`.
    pub(crate) fn require(&mut self) {
        self.needs_confirmation = true;
    }

    pub(crate) fn decide(&mut self, accepted: bool) {
        self.needs_confirmation = false;
        self.decision = ConfirmDecision::from(accepted);
    }

    pub fn state(&self) -> SafetyState {
        match (self.decision, self.needs_confirmation) {
            (ConfirmDecision::Accepted, _) => SafetyState::ConfirmedAccepted,
            (_, true) => SafetyState::UnconfirmedActive,
            (ConfirmDecision::Rejected, false) => SafetyState::ConfirmedRejected,
            (ConfirmDecision::Undecided, false) => SafetyState::NoWarnings,
        }
    }
}
