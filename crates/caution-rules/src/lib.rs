//! # caution-rules
//!
//! The built-in rule kinds for the caution engine, and a TOML loader for
//! declaring them without code.
//!
//! ## Kinds
//!
//! | tag            | warns when                                         | message key(s) |
//! |----------------|----------------------------------------------------|----------------|
//! | `presence`     | the value is blank                                 | `blank` |
//! | `format`       | the text fails `with` or matches `without`         | `invalid` |
//! | `inclusion`    | the value is outside a list or numeric range       | `inclusion` |
//! | `numericality` | the raw input is not a number or fails a check     | `not_a_number`, `not_an_integer`, comparisons, `odd`, `even` |
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use caution_rules::{RuleDsl, RuleSet};
//!
//! let mut builder = CautionRegistry::builder(naming, translator);
//! builder.cautions_presence_of(["greeting"], CautionOptions::new())?;
//! RuleSet::from_file(Path::new("rules/pet.toml"))?.apply(&mut builder)?;
//! ```

pub mod config;
pub mod dsl;
pub mod format;
pub mod inclusion;
pub mod kind;
pub mod method;
pub mod numericality;
pub mod presence;

#[cfg(test)]
mod testing;

pub use config::{CautionDeclaration, OptionsConfig, RuleConfig, RuleSet};
pub use dsl::RuleDsl;
pub use format::{FormatCheck, Pattern};
pub use inclusion::{InclusionCheck, Membership};
pub use kind::{Rule, RuleCheck, RuleKind};
pub use method::{MethodCautioner, MethodTarget};
pub use numericality::{Comparison, NumericalityCheck, Threshold};
pub use presence::PresenceCheck;
