//! Core trait definitions for the caution engine.
//!
//! These traits define the boundary between the engine and its collaborators:
//!
//! - `Cautionable`:    the host record: attribute access, per-record state,
//!                      and the registry describing its type
//! - `HostValidation`: the host's own validation pipeline and error
//!                      collection, consumed by the confirmation gate
//! - `Cautioner`:      a configured rule that may append warnings
//! - `Translator`:     the message catalog that turns keys into text
//!
//! Records get `is_safe`, `ensure_safe`, `is_valid` and the confirmation
//! accessors as provided methods; implementors only wire up storage.

use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::info;

use caution_contracts::{
    Attribute, CautionError, CautionResult, ConfirmDecision, Context, SafetyState,
};

use crate::{
    options::{CautionOptions, ValueSource},
    registry::CautionRegistry,
    runner::CautionRunner,
    safety::SafetyDecision,
    state::CautionState,
    warnings::WarningStore,
};

/// The translation collaborator.
///
/// Returns the raw template stored under a dotted key (e.g.
/// `"warnings.messages.blank"`), or `None` when the key is unknown. Key
/// fallback chains and `%{...}` interpolation are handled by the caller.
pub trait Translator: Send + Sync {
    fn lookup(&self, key: &str) -> Option<String>;
}

impl Translator for HashMap<String, String> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// A host record that can be cautioned.
///
/// A record owns one `CautionState` (warnings, evaluation context,
/// confirmation flags) and names the registry that describes its type.
/// A single record must not be cautioned from two callers at once; distinct
/// records are fully independent.
pub trait Cautionable: Sized + 'static {
    /// The registry built for this record's type.
    ///
    /// Takes `&self` so a host may select a derived registry per record, the
    /// way a single-table-inheritance subtype would.
    fn cautions(&self) -> &'static CautionRegistry<Self>;

    fn caution_state(&self) -> &CautionState;

    fn caution_state_mut(&mut self) -> &mut CautionState;

    /// Read an attribute through the record's normal accessor.
    fn read_attribute(&self, attribute: &Attribute) -> Value;

    /// The raw user input for `attribute` before type casting, when the host
    /// keeps it. Numericality checks prefer it over the typed value.
    fn read_attribute_before_type_cast(&self, _attribute: &Attribute) -> Option<Value> {
        None
    }

    /// The raw payload `ValueSource::Raw` extracts from.
    ///
    /// Records without raw-payload support keep the default, which fails with
    /// `CautionError::Unsupported`. Supporting records return `Ok(None)` when
    /// they simply have no payload yet.
    fn raw_payload(&self) -> CautionResult<Option<&Map<String, Value>>> {
        Err(CautionError::Unsupported {
            operation: "raw payload extraction: no rawtext available".to_string(),
        })
    }

    /// The record's warnings. Until something is written, this is the
    /// registry's shared empty store.
    fn warnings(&self) -> &WarningStore {
        match self.caution_state().warnings() {
            Some(store) => store,
            None => self.cautions().empty_warnings(),
        }
    }

    /// The record's own warnings, created on first access.
    fn warnings_mut(&mut self) -> &mut WarningStore {
        let registry = self.cautions();
        self.caution_state_mut()
            .warnings_mut_or_init(|| registry.warning_store())
    }

    /// The evaluation context of the run in progress, if any.
    fn caution_context(&self) -> Option<&Context> {
        self.caution_state().context()
    }

    /// Read the value a cautioner should evaluate for `attribute`.
    ///
    /// `source` overrides the normal accessor: a raw-payload key, a literal,
    /// or a function of the record.
    fn read_attribute_for_cautioning(
        &self,
        attribute: &Attribute,
        source: Option<&ValueSource<Self>>,
    ) -> CautionResult<Value> {
        match source {
            Some(ValueSource::Raw(key)) => Ok(self
                .raw_payload()?
                .and_then(|payload| payload.get(key))
                .cloned()
                .unwrap_or(Value::Null)),
            Some(ValueSource::Literal(value)) => Ok(value.clone()),
            Some(ValueSource::Computed(f)) => Ok(f(self)),
            None => Ok(self.read_attribute(attribute)),
        }
    }

    /// Run every caution and return true if no warnings were added.
    fn is_safe(&mut self, context: Option<Context>) -> CautionResult<bool> {
        CautionRunner::new(self.cautions()).run(self, context)
    }

    fn is_unsafe(&mut self, context: Option<Context>) -> CautionResult<bool> {
        self.is_safe(context).map(|safe| !safe)
    }

    /// Run every caution and fail with `CautionError::Unsafe` if any warning
    /// remains.
    fn ensure_safe(&mut self, context: Option<Context>) -> CautionResult<()> {
        CautionRunner::new(self.cautions()).ensure_safe(self, context)
    }

    /// Run one cautioner that is not part of the registry, adding to the
    /// current warnings. Its conditions are honoured; nothing is cleared.
    fn caution_with(&mut self, cautioner: &dyn Cautioner<Self>) -> CautionResult<()> {
        cautioner.check_validity()?;
        if !cautioner.options().conditions.allows(self) {
            return Ok(());
        }
        cautioner.caution(self)
    }
}

/// The host's own validation pipeline, gated by unconfirmed active warnings.
///
/// Note that an `Accepted` decision keeps the gate open on every later check
/// until it is explicitly revoked with `set_confirm_decision(false)`, even if
/// new and unrelated active warnings appear in the meantime.
pub trait HostValidation: Cautionable {
    /// Run the host's own checks, resetting its error collection first.
    /// Host checks may add warnings; those survive the cautioning pass.
    fn run_host_validations(&mut self, context: Option<&Context>) -> bool;

    /// Append a record-level entry to the host's error collection.
    fn add_base_error(&mut self, message: String);

    /// Host checks plus the confirmation gate.
    fn is_valid(&mut self, context: Option<Context>) -> CautionResult<bool> {
        SafetyDecision::new().validate(self, context)
    }

    fn is_invalid(&mut self, context: Option<Context>) -> CautionResult<bool> {
        self.is_valid(context).map(|valid| !valid)
    }

    /// Host checks and cautions, with the confirmation gate suspended for
    /// this one call. Never marks the record as needing confirmation.
    fn valid_ignoring_unconfirmed_active_warnings(
        &mut self,
        context: Option<Context>,
    ) -> CautionResult<bool> {
        SafetyDecision::ignoring_unconfirmed().validate(self, context)
    }

    /// Did validation fail because a human must confirm active warnings?
    fn warnings_need_confirmation(&self) -> bool {
        self.caution_state().confirmation().needs_confirmation()
    }

    /// The result of the human decision.
    fn confirmed_safe(&self) -> bool {
        self.caution_state().confirmation().confirmed_safe()
    }

    fn confirm_decision(&self) -> ConfirmDecision {
        self.caution_state().confirmation().decision()
    }

    /// Record a decision. Always clears the need for confirmation.
    fn set_confirm_decision(&mut self, accepted: bool) {
        info!(
            model = %self.cautions().naming().i18n_key,
            accepted,
            "confirmation decision recorded"
        );
        self.caution_state_mut().confirmation_mut().decide(accepted);
    }

    fn safety_state(&self) -> SafetyState {
        self.caution_state().confirmation().state()
    }
}

/// A configured rule that inspects a record and may append warnings.
///
/// Cautioners are built once when a registry is defined and shared,
/// read-only, by every record of the type.
pub trait Cautioner<R: Cautionable>: Send + Sync {
    /// Short name of the rule kind (e.g. "presence").
    fn kind(&self) -> &str;

    /// The frozen options the rule was declared with.
    fn options(&self) -> &CautionOptions<R>;

    /// Attributes the rule applies to. Empty for whole-record rules.
    fn attributes(&self) -> &[Attribute] {
        &[]
    }

    /// Reject malformed configuration at registration time.
    fn check_validity(&self) -> CautionResult<()> {
        Ok(())
    }

    /// Evaluate the rule against `record`, writing into its warnings.
    fn caution(&self, record: &mut R) -> CautionResult<()>;
}
