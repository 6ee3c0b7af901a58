//! Conditional guards for cautioners and callbacks.
//!
//! A step runs when every `if` condition holds and no `unless` condition
//! holds. An `on` context restriction is just another `if` condition,
//! evaluated first.

use std::{fmt, sync::Arc};

use caution_contracts::Context;

use crate::traits::Cautionable;

/// One guard evaluated against a record.
pub enum Condition<R> {
    Literal(bool),
    Predicate(Arc<dyn Fn(&R) -> bool + Send + Sync>),
    /// A named record method, so introspection can report what was declared.
    Method {
        name: &'static str,
        f: fn(&R) -> bool,
    },
    /// Holds when the run's context is one of these.
    Context(Vec<Context>),
}

impl<R> Clone for Condition<R> {
    fn clone(&self) -> Self {
        match self {
            Self::Literal(b) => Self::Literal(*b),
            Self::Predicate(f) => Self::Predicate(Arc::clone(f)),
            Self::Method { name, f } => Self::Method { name: *name, f: *f },
            Self::Context(contexts) => Self::Context(contexts.clone()),
        }
    }
}

impl<R> fmt::Debug for Condition<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(b) => f.debug_tuple("Literal").field(b).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
            Self::Method { name, .. } => f.debug_tuple("Method").field(name).finish(),
            Self::Context(contexts) => f.debug_tuple("Context").field(contexts).finish(),
        }
    }
}

impl<R> From<bool> for Condition<R> {
    fn from(value: bool) -> Self {
        Self::Literal(value)
    }
}

impl<R: Cautionable> Condition<R> {
    pub fn predicate(f: impl Fn(&R) -> bool + Send + Sync + 'static) -> Self {
        Self::Predicate(Arc::new(f))
    }

    pub fn method(name: &'static str, f: fn(&R) -> bool) -> Self {
        Self::Method { name, f }
    }

    pub fn on<C: Into<Context>>(contexts: impl IntoIterator<Item = C>) -> Self {
        Self::Context(contexts.into_iter().map(Into::into).collect())
    }

    pub fn holds(&self, record: &R) -> bool {
        match self {
            Self::Literal(b) => *b,
            Self::Predicate(f) => f(record),
            Self::Method { f, .. } => f(record),
            Self::Context(allowed) => record
                .caution_context()
                .is_some_and(|context| allowed.contains(context)),
        }
    }
}

/// The `if` / `unless` guards of one step.
pub struct Conditions<R> {
    if_all: Vec<Condition<R>>,
    unless_any: Vec<Condition<R>>,
}

impl<R> Default for Conditions<R> {
    fn default() -> Self {
        Self {
            if_all: Vec::new(),
            unless_any: Vec::new(),
        }
    }
}

impl<R> Clone for Conditions<R> {
    fn clone(&self) -> Self {
        Self {
            if_all: self.if_all.clone(),
            unless_any: self.unless_any.clone(),
        }
    }
}

impl<R> fmt::Debug for Conditions<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conditions")
            .field("if", &self.if_all)
            .field("unless", &self.unless_any)
            .finish()
    }
}

impl<R: Cautionable> Conditions<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn only_if(mut self, condition: Condition<R>) -> Self {
        self.if_all.push(condition);
        self
    }

    pub fn unless(mut self, condition: Condition<R>) -> Self {
        self.unless_any.push(condition);
        self
    }

    /// Restrict to the given contexts, ahead of any other `if` guard.
    pub fn on<C: Into<Context>>(mut self, contexts: impl IntoIterator<Item = C>) -> Self {
        self.if_all.insert(0, Condition::on(contexts));
        self
    }

    /// Append `other`'s guards after this set's.
    pub fn extend(&mut self, other: Conditions<R>) {
        self.if_all.extend(other.if_all);
        self.unless_any.extend(other.unless_any);
    }

    pub fn is_empty(&self) -> bool {
        self.if_all.is_empty() && self.unless_any.is_empty()
    }

    pub fn if_conditions(&self) -> &[Condition<R>] {
        &self.if_all
    }

    pub fn unless_conditions(&self) -> &[Condition<R>] {
        &self.unless_any
    }

    pub fn allows(&self, record: &R) -> bool {
        self.if_all.iter().all(|c| c.holds(record))
            && !self.unless_any.iter().any(|c| c.holds(record))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use caution_contracts::Context;

    use super::*;
    use crate::testing::{empty_registry, Sample};

    fn sample() -> Sample {
        Sample::new(empty_registry()).with("mood", json!("doom"))
    }

    fn gloomy(s: &Sample) -> bool {
        s.attr("mood") == json!("doom")
    }

    #[test]
    fn no_guards_always_allow() {
        assert!(Conditions::<Sample>::new().allows(&sample()));
    }

    #[test]
    fn literal_and_method_conditions() {
        let record = sample();
        assert!(Conditions::new().only_if(true.into()).allows(&record));
        assert!(!Conditions::new().only_if(false.into()).allows(&record));
        assert!(Conditions::new().only_if(Condition::method("gloomy", gloomy)).allows(&record));
        assert!(!Conditions::new().unless(Condition::method("gloomy", gloomy)).allows(&record));
    }

    #[test]
    fn all_if_must_hold_and_no_unless_may_hold() {
        let record = sample();
        let conditions = Conditions::new()
            .only_if(Condition::predicate(|_: &Sample| true))
            .only_if(Condition::predicate(gloomy))
            .unless(false.into())
            .unless(false.into());
        assert!(conditions.allows(&record));

        let conditions = conditions.unless(Condition::predicate(gloomy));
        assert!(!conditions.allows(&record));
    }

    #[test]
    fn context_guard_requires_a_matching_context() {
        let mut record = sample();
        let conditions = Conditions::new().on(["create"]);
        assert!(!conditions.allows(&record));

        record.caution_state_mut().replace_context(Some(Context::update()));
        assert!(!conditions.allows(&record));

        record.caution_state_mut().replace_context(Some(Context::create()));
        assert!(conditions.allows(&record));
    }

    #[test]
    fn on_is_evaluated_before_other_guards() {
        let conditions: Conditions<Sample> = Conditions::new()
            .only_if(true.into())
            .on(["create"]);
        assert!(matches!(conditions.if_conditions()[0], Condition::Context(_)));
        assert_eq!(conditions.if_conditions().len(), 2);
    }
}
