//! The confirmation gate over the host's validity check.
//!
//! Validity is the host's own checks plus: if the cautioning pass leaves any
//! active warning that no human has accepted, the record is invalid, flagged
//! as needing confirmation, and given a record-level error listing those
//! warnings. Recording a decision clears the flag; an `Accepted` decision
//! opens the gate without re-running the cautions.

use std::sync::Arc;

use tracing::{debug, info};

use caution_contracts::{CautionResult, Context};

use crate::{runner::CautionRunner, traits::HostValidation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    Enforced,
    Suspended,
}

/// One validity check of a record.
#[derive(Debug, Clone, Copy)]
pub struct SafetyDecision {
    gate: Gate,
}

impl Default for SafetyDecision {
    fn default() -> Self {
        Self::new()
    }
}

impl SafetyDecision {
    pub fn new() -> Self {
        Self {
            gate: Gate::Enforced,
        }
    }

    /// A check that still runs the cautions but never blocks on, or flags,
    /// unconfirmed active warnings.
    pub fn ignoring_unconfirmed() -> Self {
        Self {
            gate: Gate::Suspended,
        }
    }

    pub fn validate<R: HostValidation>(
        &self,
        record: &mut R,
        context: Option<Context>,
    ) -> CautionResult<bool> {
        let renderer = Arc::clone(record.cautions().renderer());
        let warnings = record.warnings_mut();
        warnings.rebind(renderer);
        warnings.clear();
        if !record.run_host_validations(context.as_ref()) {
            debug!(
                model = %record.cautions().naming().i18n_key,
                "host validations failed, cautions not run"
            );
            return Ok(false);
        }
        self.no_unconfirmed_active_cautions(record, context)
    }

    fn no_unconfirmed_active_cautions<R: HostValidation>(
        &self,
        record: &mut R,
        context: Option<Context>,
    ) -> CautionResult<bool> {
        let model = &record.cautions().naming().i18n_key;
        if record.confirmed_safe() {
            debug!(model = %model, "warnings already accepted");
            return Ok(true);
        }

        // Host validations may have added warnings of their own; the run
        // clears the store, so carry them across.
        let preserved = record.warnings().preserve();
        CautionRunner::new(record.cautions()).run(record, context)?;
        let restored = record.warnings_mut().reapply(preserved);
        if restored > 0 {
            debug!(model = %model, restored, "host warnings restored after cautioning");
        }

        if self.gate == Gate::Suspended {
            return Ok(true);
        }

        let active = record.warnings().active_messages();
        if !active.is_empty() {
            record.caution_state_mut().confirmation_mut().require();
            let message = record.warnings().renderer().need_confirmation_message(&active);
            info!(
                model = %model,
                active_count = active.len(),
                "active warnings need confirmation"
            );
            record.add_base_error(message);
        }
        Ok(!record.warnings_need_confirmation())
    }
}
