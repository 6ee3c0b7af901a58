//! Attribute names and evaluation contexts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The name of a record attribute that warnings are filed under.
///
/// `base` is reserved for record-level warnings that are not tied to any
/// single attribute. It is rendered without an attribute prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attribute(pub String);

impl Attribute {
    /// The reserved pseudo-attribute for record-level warnings.
    pub const BASE: &'static str = "base";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The record-level pseudo-attribute.
    pub fn base() -> Self {
        Self(Self::BASE.to_string())
    }

    pub fn is_base(&self) -> bool {
        self.0 == Self::BASE
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Attribute {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Attribute {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<&Attribute> for Attribute {
    fn from(attribute: &Attribute) -> Self {
        attribute.clone()
    }
}

impl AsRef<str> for Attribute {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named evaluation mode (e.g. `create`, `update`) used to scope which
/// rules and callbacks apply during a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context(pub String);

impl Context {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn create() -> Self {
        Self::new("create")
    }

    pub fn update() -> Self {
        Self::new("update")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Context {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
