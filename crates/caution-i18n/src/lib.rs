//! # caution-i18n
//!
//! Message catalogs for caution warnings, loaded from TOML.
//!
//! Nested tables flatten to the dotted keys the message renderer looks up:
//!
//! ```toml
//! [activemodel.warnings.models.pet.attributes.status]
//! checking_out = "is checking out"
//! ```
//!
//! becomes `activemodel.warnings.models.pet.attributes.status.checking_out`.
//! The bundled English catalog carries the default message for every
//! built-in rule kind.

pub mod catalog;

pub use catalog::MessageCatalog;
