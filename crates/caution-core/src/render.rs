//! Message rendering: key lookup chains, interpolation, and full messages.
//!
//! A `MessageRenderer` pairs a model's naming with the translation catalog.
//! Every warning store of the model shares one renderer.

use std::{collections::BTreeMap, fmt, sync::Arc};

use serde_json::Value;

use caution_contracts::{value, Attribute, Message, ModelNaming};

use crate::{traits::Translator, warnings::AddOptions};

const DEFAULT_FORMAT: &str = "%{attribute} %{message}";
const DEFAULT_MODEL_UNSAFE: &str = "Cautions raised: %{warnings}";
const DEFAULT_NEED_CONFIRMATION: &str = "The following warnings need confirmation: %{warnings}";

pub struct MessageRenderer {
    naming: ModelNaming,
    translator: Arc<dyn Translator>,
}

impl fmt::Debug for MessageRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageRenderer")
            .field("naming", &self.naming)
            .finish_non_exhaustive()
    }
}

impl MessageRenderer {
    pub fn new(naming: ModelNaming, translator: Arc<dyn Translator>) -> Self {
        Self { naming, translator }
    }

    pub fn naming(&self) -> &ModelNaming {
        &self.naming
    }

    pub fn translator(&self) -> &Arc<dyn Translator> {
        &self.translator
    }

    fn first_translation(&self, keys: &[String]) -> Option<String> {
        keys.iter().find_map(|key| self.translator.lookup(key))
    }

    /// Render the message for a symbolic `kind` on `attribute`.
    ///
    /// Lookup order, first hit wins:
    ///
    /// 1. `{scope}.warnings.models.{model}.attributes.{attr}.{kind}` and
    ///    `{scope}.warnings.models.{model}.{kind}` for the model and each
    ///    ancestor
    /// 2. a literal `options.message`
    /// 3. `{scope}.warnings.messages.{kind}`
    /// 4. `warnings.attributes.{attr}.{kind}`
    /// 5. `warnings.messages.{kind}`
    ///
    /// A keyed `options.message` replaces `kind` for the whole chain.
    pub fn generate_message(&self, attribute: &Attribute, kind: &str, options: &AddOptions) -> String {
        let kind = match &options.message {
            Some(Message::Key(key)) => key.as_str(),
            _ => kind,
        };
        let scope = &self.naming.i18n_scope;
        let attr = attribute.as_str();

        let model_keys: Vec<String> = self
            .naming
            .ancestors
            .iter()
            .flat_map(|model| {
                [
                    format!("{scope}.warnings.models.{model}.attributes.{attr}.{kind}"),
                    format!("{scope}.warnings.models.{model}.{kind}"),
                ]
            })
            .collect();
        let fallback_keys = [
            format!("{scope}.warnings.messages.{kind}"),
            format!("warnings.attributes.{attr}.{kind}"),
            format!("warnings.messages.{kind}"),
        ];
        let literal = match &options.message {
            Some(Message::Text(text)) => Some(text.clone()),
            Some(Message::Lazy(f)) => Some(f()),
            _ => None,
        };

        let template = self
            .first_translation(&model_keys)
            .or(literal)
            .or_else(|| self.first_translation(&fallback_keys))
            .unwrap_or_else(|| {
                let primary = model_keys.first().unwrap_or(&fallback_keys[0]);
                format!("translation missing: {primary}")
            });

        let mut vars = BTreeMap::new();
        vars.insert("model", self.model_human_name());
        vars.insert("attribute", self.human_attribute_name(attribute));
        vars.insert("value", render_value(&options.value));
        for (name, value) in &options.interpolations {
            vars.insert(name.as_str(), render_value(value));
        }
        interpolate(&template, &vars)
    }

    /// `{scope}.attributes.{model}.{attr}` for each ancestor, then
    /// `attributes.{attr}`, then the humanized name.
    pub fn human_attribute_name(&self, attribute: &Attribute) -> String {
        let scope = &self.naming.i18n_scope;
        let attr = attribute.as_str();
        let mut keys: Vec<String> = self
            .naming
            .ancestors
            .iter()
            .map(|model| format!("{scope}.attributes.{model}.{attr}"))
            .collect();
        keys.push(format!("attributes.{attr}"));
        self.first_translation(&keys)
            .unwrap_or_else(|| humanize(attr))
    }

    pub fn model_human_name(&self) -> String {
        let scope = &self.naming.i18n_scope;
        let keys: Vec<String> = self
            .naming
            .ancestors
            .iter()
            .map(|model| format!("{scope}.models.{model}"))
            .collect();
        self.first_translation(&keys)
            .unwrap_or_else(|| humanize(&self.naming.i18n_key))
    }

    /// Prefix `message` with the human attribute name. Base messages are
    /// returned unchanged.
    pub fn full_message(&self, attribute: &Attribute, message: &str) -> String {
        if attribute.is_base() {
            return message.to_string();
        }
        let template = self
            .translator
            .lookup("warnings.format")
            .unwrap_or_else(|| DEFAULT_FORMAT.to_string());
        let vars = BTreeMap::from([
            ("attribute", self.human_attribute_name(attribute)),
            ("message", message.to_string()),
        ]);
        interpolate(&template, &vars)
    }

    /// The message carried by `CautionError::Unsafe`.
    pub fn model_unsafe_message(&self, full_messages: &[String]) -> String {
        self.list_message("model_unsafe", DEFAULT_MODEL_UNSAFE, full_messages.join(", "))
    }

    /// The base error added when active warnings block validation.
    pub fn need_confirmation_message(&self, active_messages: &[String]) -> String {
        self.list_message(
            "need_confirmation",
            DEFAULT_NEED_CONFIRMATION,
            to_sentence(active_messages),
        )
    }

    fn list_message(&self, kind: &str, default: &str, warnings: String) -> String {
        let scope = &self.naming.i18n_scope;
        let keys = [
            format!("{scope}.warnings.messages.{kind}"),
            format!("warnings.messages.{kind}"),
        ];
        let template = self
            .first_translation(&keys)
            .unwrap_or_else(|| default.to_string());
        let vars = BTreeMap::from([
            ("model", self.model_human_name()),
            ("warnings", warnings),
        ]);
        interpolate(&template, &vars)
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Number(n) => value::format_number(n.as_f64().unwrap_or_default()),
        other => value::to_text(other),
    }
}

/// Replace every `%{name}` in `template` with its value from `vars`.
/// Unknown placeholders are left as they are.
pub fn interpolate(template: &str, vars: &BTreeMap<&str, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("%{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        match vars.get(&after[..end]) {
            Some(value) => out.push_str(value),
            None => out.push_str(&rest[start..start + end + 3]),
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}

/// "height_in_inches" → "Height in inches", "owner_id" → "Owner".
pub fn humanize(name: &str) -> String {
    let trimmed = name.strip_suffix("_id").unwrap_or(name);
    let spaced = trimmed.replace(['_', '.'], " ").trim().to_lowercase();
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Join items into an English list: "a", "a and b", "a, b, and c".
pub fn to_sentence(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{first} and {second}"),
        [init @ .., last] => format!("{}, and {last}", init.join(", ")),
    }
}
