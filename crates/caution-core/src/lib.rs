//! # caution-core
//!
//! The caution engine: non-fatal warnings for host records.
//!
//! A record type declares its cautions once in a `CautionRegistry`. Running
//! them fills the record's `WarningStore` without making the record invalid.
//! Warnings flagged *active* must be confirmed by a human; until they are,
//! the `SafetyDecision` gate keeps the record from validating.
//!
//! ```text
//! RegistryBuilder ──build──▶ CautionRegistry ──▶ CautionRunner ──▶ WarningStore
//!                                                      ▲
//!                            HostValidation::is_valid ─┴─ SafetyDecision
//! ```

pub mod cautioner;
pub mod condition;
pub mod options;
pub mod registry;
pub mod render;
pub mod runner;
pub mod safety;
pub mod state;
pub mod traits;
pub mod warnings;

#[cfg(test)]
mod testing;

pub use cautioner::{EachCautioner, EachCheck, RecordCautioner};
pub use condition::{Condition, Conditions};
pub use options::{CautionOptions, ValueSource};
pub use registry::{Callback, CautionRegistry, Flow, Hook, RegistryBuilder, Step, StepAction};
pub use render::MessageRenderer;
pub use runner::CautionRunner;
pub use safety::SafetyDecision;
pub use state::{CautionState, Confirmation};
pub use traits::{Cautionable, Cautioner, HostValidation, Translator};
pub use warnings::{AddOptions, PreservedWarnings, WarningMap, WarningStore};
