//! Per-type registry of cautioners and lifecycle callbacks.
//!
//! A registry is assembled once with a `RegistryBuilder` and then shared,
//! read-only, by every record of the type. A derived registry starts as a
//! copy of its parent's declarations; adding to it never touches the parent.

use std::{fmt, sync::Arc};

use serde_json::Value;
use tracing::debug;

use caution_contracts::{Attribute, CautionResult, ModelNaming};

use crate::{
    cautioner::EachCautioner,
    condition::Conditions,
    options::CautionOptions,
    render::MessageRenderer,
    traits::{Cautionable, Cautioner, Translator},
    warnings::WarningStore,
};

/// What a `before_cautions` callback tells the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Skip the remaining before-callbacks and every cautioner. After
    /// callbacks still run and the run reports the record unsafe.
    Halt,
}

/// A named callback over a record.
pub struct Callback<R, O = ()> {
    name: String,
    f: Arc<dyn Fn(&mut R) -> CautionResult<O> + Send + Sync>,
}

impl<R, O> Clone for Callback<R, O> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            f: Arc::clone(&self.f),
        }
    }
}

impl<R, O> fmt::Debug for Callback<R, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Callback").field(&self.name).finish()
    }
}

impl<R: 'static, O: 'static> Callback<R, O> {
    /// A record method registered by name.
    pub fn method(name: &str, f: fn(&mut R) -> CautionResult<O>) -> Self {
        Self {
            name: name.to_string(),
            f: Arc::new(f),
        }
    }

    pub fn closure(f: impl Fn(&mut R) -> CautionResult<O> + Send + Sync + 'static) -> Self {
        Self {
            name: "closure".to_string(),
            f: Arc::new(f),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, record: &mut R) -> CautionResult<O> {
        (self.f)(record)
    }
}

/// A callback together with its guards.
pub struct Hook<R, O = ()> {
    callback: Callback<R, O>,
    conditions: Conditions<R>,
}

impl<R, O> Clone for Hook<R, O> {
    fn clone(&self) -> Self {
        Self {
            callback: self.callback.clone(),
            conditions: self.conditions.clone(),
        }
    }
}

impl<R, O> fmt::Debug for Hook<R, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("callback", &self.callback)
            .field("conditions", &self.conditions)
            .finish()
    }
}

impl<R, O> Hook<R, O> {
    pub fn callback(&self) -> &Callback<R, O> {
        &self.callback
    }

    pub fn conditions(&self) -> &Conditions<R> {
        &self.conditions
    }
}

/// One entry of the cautioning phase.
pub enum StepAction<R: Cautionable> {
    Callback(Callback<R>),
    Cautioner(Arc<dyn Cautioner<R>>),
}

pub struct Step<R: Cautionable> {
    action: StepAction<R>,
    conditions: Conditions<R>,
}

impl<R: Cautionable> Clone for Step<R> {
    fn clone(&self) -> Self {
        let action = match &self.action {
            StepAction::Callback(callback) => StepAction::Callback(callback.clone()),
            StepAction::Cautioner(cautioner) => StepAction::Cautioner(Arc::clone(cautioner)),
        };
        Self {
            action,
            conditions: self.conditions.clone(),
        }
    }
}

impl<R: Cautionable> Step<R> {
    /// The callback name or cautioner kind.
    pub fn name(&self) -> &str {
        match &self.action {
            StepAction::Callback(callback) => callback.name(),
            StepAction::Cautioner(cautioner) => cautioner.kind(),
        }
    }

    pub fn action(&self) -> &StepAction<R> {
        &self.action
    }

    pub fn conditions(&self) -> &Conditions<R> {
        &self.conditions
    }

    pub(crate) fn run(&self, record: &mut R) -> CautionResult<()> {
        match &self.action {
            StepAction::Callback(callback) => callback.call(record),
            StepAction::Cautioner(cautioner) => cautioner.caution(record),
        }
    }
}

type Bucket<R> = (Option<Attribute>, Vec<Arc<dyn Cautioner<R>>>);

pub struct CautionRegistry<R: Cautionable> {
    renderer: Arc<MessageRenderer>,
    /// What `Cautionable::warnings` shows before a record writes any.
    empty: WarningStore,
    /// Cautioners by attribute; `None` holds whole-record cautioners.
    by_attribute: Vec<Bucket<R>>,
    steps: Vec<Step<R>>,
    before: Vec<Hook<R, Flow>>,
    after: Vec<Hook<R>>,
}

impl<R: Cautionable> fmt::Debug for CautionRegistry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CautionRegistry")
            .field("naming", self.naming())
            .field("steps", &self.steps.iter().map(Step::name).collect::<Vec<_>>())
            .field("before", &self.before.len())
            .field("after", &self.after.len())
            .finish()
    }
}

impl<R: Cautionable> CautionRegistry<R> {
    pub fn builder(naming: ModelNaming, translator: Arc<dyn Translator>) -> RegistryBuilder<R> {
        let renderer = Arc::new(MessageRenderer::new(naming, translator));
        RegistryBuilder {
            registry: Self {
                empty: WarningStore::new(Arc::clone(&renderer)),
                renderer,
                by_attribute: Vec::new(),
                steps: Vec::new(),
                before: Vec::new(),
                after: Vec::new(),
            },
        }
    }

    /// Start a child registry that inherits every declaration made so far.
    pub fn derive(&self, i18n_key: &str) -> RegistryBuilder<R> {
        let naming = self.naming().child(i18n_key);
        let translator = Arc::clone(self.renderer.translator());
        let renderer = Arc::new(MessageRenderer::new(naming, translator));
        RegistryBuilder {
            registry: Self {
                empty: WarningStore::new(Arc::clone(&renderer)),
                renderer,
                by_attribute: self.by_attribute.clone(),
                steps: self.steps.clone(),
                before: self.before.clone(),
                after: self.after.clone(),
            },
        }
    }

    pub fn naming(&self) -> &ModelNaming {
        self.renderer.naming()
    }

    pub fn renderer(&self) -> &Arc<MessageRenderer> {
        &self.renderer
    }

    /// A fresh, empty store bound to this registry's renderer.
    pub fn warning_store(&self) -> WarningStore {
        WarningStore::new(Arc::clone(&self.renderer))
    }

    pub fn empty_warnings(&self) -> &WarningStore {
        &self.empty
    }

    /// Every registered cautioner, each listed once.
    pub fn cautioners(&self) -> Vec<Arc<dyn Cautioner<R>>> {
        unique(self.by_attribute.iter().flat_map(|(_, list)| list.iter()))
    }

    /// Cautioners registered on any of `attributes`.
    pub fn cautioners_on(&self, attributes: &[&str]) -> Vec<Arc<dyn Cautioner<R>>> {
        unique(
            self.by_attribute
                .iter()
                .filter(|(attribute, _)| {
                    attribute
                        .as_ref()
                        .is_some_and(|a| attributes.contains(&a.as_str()))
                })
                .flat_map(|(_, list)| list.iter()),
        )
    }

    pub fn steps(&self) -> &[Step<R>] {
        &self.steps
    }

    pub fn before_hooks(&self) -> &[Hook<R, Flow>] {
        &self.before
    }

    pub fn after_hooks(&self) -> &[Hook<R>] {
        &self.after
    }
}

fn unique<'a, R: Cautionable>(
    cautioners: impl Iterator<Item = &'a Arc<dyn Cautioner<R>>>,
) -> Vec<Arc<dyn Cautioner<R>>> {
    let mut seen: Vec<Arc<dyn Cautioner<R>>> = Vec::new();
    for cautioner in cautioners {
        if !seen
            .iter()
            .any(|c| std::ptr::addr_eq(Arc::as_ptr(c), Arc::as_ptr(cautioner)))
        {
            seen.push(Arc::clone(cautioner));
        }
    }
    seen
}

/// Declares the cautions of one record type.
pub struct RegistryBuilder<R: Cautionable> {
    registry: CautionRegistry<R>,
}

impl<R: Cautionable> RegistryBuilder<R> {
    pub fn renderer(&self) -> &Arc<MessageRenderer> {
        &self.registry.renderer
    }

    /// Register a record method (or closure) to run during the cautioning
    /// phase, in declaration order with the cautioners.
    pub fn caution(&mut self, callback: Callback<R>, conditions: Conditions<R>) -> &mut Self {
        debug!(callback = callback.name(), "caution callback registered");
        self.registry.steps.push(Step {
            action: StepAction::Callback(callback),
            conditions,
        });
        self
    }

    /// Register a configured cautioner, guarded by its own options.
    pub fn cautions_with(
        &mut self,
        cautioner: impl Cautioner<R> + 'static,
    ) -> CautionResult<&mut Self> {
        self.register(Arc::new(cautioner))
    }

    pub fn register(&mut self, cautioner: Arc<dyn Cautioner<R>>) -> CautionResult<&mut Self> {
        cautioner.check_validity()?;

        let attributes = cautioner.attributes();
        if attributes.is_empty() {
            self.bucket(None).push(Arc::clone(&cautioner));
        } else {
            for attribute in attributes {
                self.bucket(Some(attribute.clone())).push(Arc::clone(&cautioner));
            }
        }
        debug!(
            kind = cautioner.kind(),
            attributes = ?attributes,
            "cautioner registered"
        );

        let conditions = cautioner.options().conditions.clone();
        self.registry.steps.push(Step {
            action: StepAction::Cautioner(cautioner),
            conditions,
        });
        Ok(self)
    }

    /// Register a per-attribute closure. Nil and blank values are skipped
    /// according to `options`.
    pub fn cautions_each<A: Into<Attribute>>(
        &mut self,
        attributes: impl IntoIterator<Item = A>,
        options: CautionOptions<R>,
        f: impl Fn(&mut R, &Attribute, &Value) -> CautionResult<()> + Send + Sync + 'static,
    ) -> CautionResult<&mut Self> {
        let cautioner = EachCautioner::from_fn(attributes, options, f)?;
        self.cautions_with(cautioner)
    }

    pub fn before_cautions(
        &mut self,
        callback: Callback<R, Flow>,
        conditions: Conditions<R>,
    ) -> &mut Self {
        self.registry.before.push(Hook { callback, conditions });
        self
    }

    pub fn after_cautions(&mut self, callback: Callback<R>, conditions: Conditions<R>) -> &mut Self {
        self.registry.after.push(Hook { callback, conditions });
        self
    }

    /// Forget every cautioner and caution callback declared so far,
    /// including inherited ones. Before and after callbacks are kept.
    pub fn clear_cautioners(&mut self) -> &mut Self {
        self.registry.by_attribute.clear();
        self.registry.steps.clear();
        self
    }

    pub fn build(self) -> CautionRegistry<R> {
        debug!(
            model = %self.registry.naming().i18n_key,
            steps = self.registry.steps.len(),
            "caution registry built"
        );
        self.registry
    }

    fn bucket(&mut self, attribute: Option<Attribute>) -> &mut Vec<Arc<dyn Cautioner<R>>> {
        let buckets = &mut self.registry.by_attribute;
        let index = match buckets.iter().position(|(a, _)| *a == attribute) {
            Some(index) => index,
            None => {
                buckets.push((attribute, Vec::new()));
                buckets.len() - 1
            }
        };
        &mut buckets[index].1
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use caution_contracts::CautionError;

    use super::*;
    use crate::{
        cautioner::RecordCautioner,
        testing::{builder, Sample},
    };

    fn noop(_: &mut Sample) -> CautionResult<()> {
        Ok(())
    }

    fn each_noop(_: &mut Sample, _: &Attribute, _: &Value) -> CautionResult<()> {
        Ok(())
    }

    #[test]
    fn steps_keep_declaration_order() {
        let mut b = builder("person");
        b.caution(Callback::method("first", noop), Conditions::new());
        b.cautions_each(["age"], CautionOptions::new(), each_noop)
            .expect("valid");
        b.caution(Callback::method("last", noop), Conditions::new());
        let registry = b.build();

        let names: Vec<&str> = registry.steps().iter().map(Step::name).collect();
        assert_eq!(names, vec!["first", "block", "last"]);
    }

    #[test]
    fn cautioner_on_several_attributes_is_listed_once() {
        let mut b = builder("person");
        b.cautions_each(["age", "height"], CautionOptions::new(), each_noop)
            .expect("valid");
        b.cautions_with(RecordCautioner::new("whole", CautionOptions::new(), |_: &mut Sample, _| Ok(())))
            .expect("valid");
        let registry = b.build();

        assert_eq!(registry.cautioners().len(), 2);
        assert_eq!(registry.cautioners_on(&["age"]).len(), 1);
        assert_eq!(registry.cautioners_on(&["age", "height"]).len(), 1);
        assert!(registry.cautioners_on(&["name"]).is_empty());
    }

    #[test]
    fn invalid_cautioner_is_rejected_at_registration() {
        let err = builder("person")
            .cautions_each(Vec::<&str>::new(), CautionOptions::new(), each_noop)
            .map(|_| ())
            .unwrap_err();
        assert!(matches!(err, CautionError::ConfigError { .. }));
    }

    #[test]
    fn derived_registry_does_not_touch_parent() {
        let mut b = builder("pet");
        b.cautions_each(["name"], CautionOptions::new(), each_noop)
            .expect("valid");
        let parent = b.build();

        let mut child = parent.derive("dog");
        child
            .cautions_each(["bark"], CautionOptions::new(), each_noop)
            .expect("valid");
        let child = child.build();

        assert_eq!(parent.cautioners().len(), 1);
        assert_eq!(child.cautioners().len(), 2);
        assert_eq!(child.naming().ancestors, vec!["dog".to_string(), "pet".to_string()]);
    }

    #[test]
    fn clear_cautioners_resets_steps_but_keeps_hooks() {
        let mut b = builder("pet");
        b.cautions_each(["name"], CautionOptions::new(), each_noop)
            .expect("valid");
        b.after_cautions(Callback::method("after", noop), Conditions::new());
        b.clear_cautioners();
        let registry = b.build();

        assert!(registry.cautioners().is_empty());
        assert!(registry.steps().is_empty());
        assert_eq!(registry.after_hooks().len(), 1);
    }
}
