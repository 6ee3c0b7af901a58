//! Options shared by every cautioner.

use std::{fmt, sync::Arc};

use serde_json::Value;

use caution_contracts::{Context, Message};

use crate::{
    condition::{Condition, Conditions},
    traits::Cautionable,
    warnings::AddOptions,
};

/// Where a cautioner reads the value it evaluates.
pub enum ValueSource<R> {
    /// A fixed value, whatever the record holds.
    Literal(Value),
    /// A function of the record.
    Computed(Arc<dyn Fn(&R) -> Value + Send + Sync>),
    /// A key into the record's raw payload.
    Raw(String),
}

impl<R> Clone for ValueSource<R> {
    fn clone(&self) -> Self {
        match self {
            Self::Literal(value) => Self::Literal(value.clone()),
            Self::Computed(f) => Self::Computed(Arc::clone(f)),
            Self::Raw(key) => Self::Raw(key.clone()),
        }
    }
}

impl<R> fmt::Debug for ValueSource<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
            Self::Raw(key) => f.debug_tuple("Raw").field(key).finish(),
        }
    }
}

/// Options frozen into a cautioner when it is declared.
pub struct CautionOptions<R> {
    pub conditions: Conditions<R>,
    /// Skip the check when the value is null.
    pub allow_nil: bool,
    /// Skip the check when the value is blank.
    pub allow_blank: bool,
    /// Warnings from this cautioner need confirmation.
    pub active: bool,
    /// Warnings from this cautioner fail the run immediately.
    pub strict: bool,
    pub message: Option<Message>,
    pub value: Option<ValueSource<R>>,
}

impl<R> Default for CautionOptions<R> {
    fn default() -> Self {
        Self {
            conditions: Conditions::default(),
            allow_nil: false,
            allow_blank: false,
            active: false,
            strict: false,
            message: None,
            value: None,
        }
    }
}

impl<R> Clone for CautionOptions<R> {
    fn clone(&self) -> Self {
        Self {
            conditions: self.conditions.clone(),
            allow_nil: self.allow_nil,
            allow_blank: self.allow_blank,
            active: self.active,
            strict: self.strict,
            message: self.message.clone(),
            value: self.value.clone(),
        }
    }
}

impl<R> fmt::Debug for CautionOptions<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CautionOptions")
            .field("conditions", &self.conditions)
            .field("allow_nil", &self.allow_nil)
            .field("allow_blank", &self.allow_blank)
            .field("active", &self.active)
            .field("strict", &self.strict)
            .field("message", &self.message)
            .field("value", &self.value)
            .finish()
    }
}

impl<R: Cautionable> CautionOptions<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_nil(mut self) -> Self {
        self.allow_nil = true;
        self
    }

    pub fn allow_blank(mut self) -> Self {
        self.allow_blank = true;
        self
    }

    pub fn active(mut self) -> Self {
        self.active = true;
        self
    }

    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn message(mut self, message: impl Into<Message>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn value(mut self, value: Value) -> Self {
        self.value = Some(ValueSource::Literal(value));
        self
    }

    pub fn value_from(mut self, f: impl Fn(&R) -> Value + Send + Sync + 'static) -> Self {
        self.value = Some(ValueSource::Computed(Arc::new(f)));
        self
    }

    /// Read the value from the record's raw payload under `key`.
    pub fn rawtext_value(mut self, key: impl Into<String>) -> Self {
        self.value = Some(ValueSource::Raw(key.into()));
        self
    }

    pub fn only_if(mut self, condition: Condition<R>) -> Self {
        self.conditions = self.conditions.only_if(condition);
        self
    }

    pub fn unless(mut self, condition: Condition<R>) -> Self {
        self.conditions = self.conditions.unless(condition);
        self
    }

    pub fn on<C: Into<Context>>(mut self, contexts: impl IntoIterator<Item = C>) -> Self {
        self.conditions = self.conditions.on(contexts);
        self
    }

    /// Layer these options over `shared`: explicit message and value win,
    /// and the shared guards run first.
    ///
    /// The flags (`allow_nil`, `allow_blank`, `active`, `strict`) are OR-ed:
    /// a flag set on the shared options applies to every rule of the
    /// declaration, and a single rule cannot switch it back off. Declare that
    /// rule separately instead.
    pub fn merged_over(self, shared: &CautionOptions<R>) -> Self {
        let mut conditions = shared.conditions.clone();
        conditions.extend(self.conditions);
        Self {
            conditions,
            allow_nil: self.allow_nil || shared.allow_nil,
            allow_blank: self.allow_blank || shared.allow_blank,
            active: self.active || shared.active,
            strict: self.strict || shared.strict,
            message: self.message.or_else(|| shared.message.clone()),
            value: self.value.or_else(|| shared.value.clone()),
        }
    }

    /// Options for adding a warning about `value` under these settings.
    pub fn add_options(&self, value: Value) -> AddOptions {
        AddOptions {
            active: self.active,
            strict: self.strict,
            message: self.message.clone(),
            value,
            interpolations: Default::default(),
        }
    }
}
