//! Identifier type used to key decorators.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const MAX_NAME_LEN: usize = 64;

/// Name of a decorator, validated as an identifier (`[A-Za-z_][A-Za-z0-9_]*`).
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DecoratorName(String);

impl DecoratorName {
    /// Creates a new decorator name after validating its format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] if the name is empty, too long, or not an
    /// identifier.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self(name))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Returns true when `candidate` is an ASCII identifier.
#[must_use]
pub fn is_identifier(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidName {
            name: String::new(),
            reason: "name cannot be empty".into(),
        });
    }

    if name.len() > MAX_NAME_LEN {
        return Err(Error::InvalidName {
            name: name.into(),
            reason: format!("name length must be <= {MAX_NAME_LEN}"),
        });
    }

    if !is_identifier(name) {
        return Err(Error::InvalidName {
            name: name.into(),
            reason: "name must start with a letter or underscore and contain only alphanumerics or underscores".into(),
        });
    }

    Ok(())
}

impl TryFrom<String> for DecoratorName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for DecoratorName {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl From<DecoratorName> for String {
    fn from(value: DecoratorName) -> Self {
        value.0
    }
}

impl Borrow<str> for DecoratorName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for DecoratorName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DecoratorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
