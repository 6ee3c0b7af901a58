//! # caution-contracts
//!
//! Shared types, message contracts, and errors for the caution engine.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate: only data definitions, value helpers and error types.

pub mod attribute;
pub mod error;
pub mod message;
pub mod naming;
pub mod safety;
pub mod value;

pub use attribute::{Attribute, Context};
pub use error::{CautionError, CautionResult};
pub use message::{Message, WarningDetail};
pub use naming::ModelNaming;
pub use safety::{ConfirmDecision, SafetyState};
