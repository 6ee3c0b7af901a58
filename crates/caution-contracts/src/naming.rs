//! Model naming used for translation lookups.

use serde::{Deserialize, Serialize};

/// How a record type is named in translation keys.
///
/// `ancestors` lists the i18n keys to try, most specific first. A derived
/// registry prepends its own key so child models may override the messages
/// of their parents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelNaming {
    /// Top-level namespace of model translations (e.g. "activemodel").
    pub i18n_scope: String,
    /// This model's key (e.g. "pet").
    pub i18n_key: String,
    /// Lookup chain, this model first.
    pub ancestors: Vec<String>,
}

impl ModelNaming {
    pub const DEFAULT_SCOPE: &'static str = "activemodel";

    pub fn new(i18n_key: impl Into<String>) -> Self {
        let i18n_key = i18n_key.into();
        Self {
            i18n_scope: Self::DEFAULT_SCOPE.to_string(),
            ancestors: vec![i18n_key.clone()],
            i18n_key,
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.i18n_scope = scope.into();
        self
    }

    /// Naming for a model derived from this one.
    pub fn child(&self, i18n_key: impl Into<String>) -> Self {
        let i18n_key = i18n_key.into();
        let mut ancestors = vec![i18n_key.clone()];
        ancestors.extend(self.ancestors.iter().cloned());
        Self {
            i18n_scope: self.i18n_scope.clone(),
            i18n_key,
            ancestors,
        }
    }
}
