//! The cautioning pass.
//!
//! A run has three phases:
//!
//! 1. before callbacks, in order; one returning `Flow::Halt` stops the phase
//!    and cancels phase 2
//! 2. steps (cautioners and caution callbacks), in declaration order, each
//!    subject to its guards
//! 3. after callbacks, in declaration order
//!
//! The record's context is set for the duration of the run and restored on
//! every exit path, including errors. An error from any step aborts the run
//! and is returned to the caller.

use std::sync::Arc;

use tracing::{debug, warn};

use caution_contracts::{CautionError, CautionResult, Context};

use crate::{
    registry::{CautionRegistry, Flow},
    traits::Cautionable,
};

pub struct CautionRunner<'r, R: Cautionable> {
    registry: &'r CautionRegistry<R>,
}

impl<'r, R: Cautionable> CautionRunner<'r, R> {
    pub fn new(registry: &'r CautionRegistry<R>) -> Self {
        Self { registry }
    }

    /// Clear the record's warnings, run every phase, and report whether the
    /// record came out without warnings. A halted run is never safe.
    pub fn run(&self, record: &mut R, context: Option<Context>) -> CautionResult<bool> {
        let model = &self.registry.naming().i18n_key;
        debug!(model = %model, context = ?context, "caution run started");

        let previous = record.caution_state_mut().replace_context(context);
        let warnings = record.warnings_mut();
        warnings.rebind(Arc::clone(self.registry.renderer()));
        warnings.clear();
        let outcome = self.run_phases(record);
        record.caution_state_mut().replace_context(previous);

        let completed = match outcome {
            Ok(completed) => completed,
            Err(err) => {
                warn!(model = %model, error = %err, "caution run aborted");
                return Err(err);
            }
        };

        let warning_count = record.warnings().size();
        let safe = completed && warning_count == 0;
        debug!(model = %model, safe, warning_count, "caution run finished");
        Ok(safe)
    }

    /// Like `run`, but an unsafe outcome becomes `CautionError::Unsafe`
    /// carrying the full messages.
    pub fn ensure_safe(&self, record: &mut R, context: Option<Context>) -> CautionResult<()> {
        if self.run(record, context)? {
            return Ok(());
        }
        let warnings = record.warnings().full_messages();
        let message = self.registry.renderer().model_unsafe_message(&warnings);
        warn!(model = %self.registry.naming().i18n_key, %message, "record is unsafe");
        Err(CautionError::Unsafe { message, warnings })
    }

    /// Returns false when a before callback halted the run.
    fn run_phases(&self, record: &mut R) -> CautionResult<bool> {
        let mut halted_by = None;
        for hook in self.registry.before_hooks() {
            if !hook.conditions().allows(record) {
                continue;
            }
            if hook.callback().call(record)? == Flow::Halt {
                halted_by = Some(hook.callback().name());
                break;
            }
        }

        if let Some(callback) = halted_by {
            warn!(callback, "before_cautions callback halted the run");
        } else {
            for step in self.registry.steps() {
                if !step.conditions().allows(record) {
                    debug!(step = step.name(), "guards not met, step skipped");
                    continue;
                }
                step.run(record)?;
            }
        }

        for hook in self.registry.after_hooks() {
            if hook.conditions().allows(record) {
                hook.callback().call(record)?;
            }
        }

        Ok(halted_by.is_none())
    }
}
