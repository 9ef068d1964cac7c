//! Typed parameter values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A parameter value after coercion to its declared type.
///
/// Enum parameters carry their member as [`ParamValue::String`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// `true` or `false`.
    Boolean(bool),
    /// Finite floating point number.
    Number(f64),
    /// Free text or enum member.
    String(String),
    /// Bracketed list of scalars.
    Array(Vec<ParamValue>),
}

impl ParamValue {
    /// Short type label used in error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
        }
    }

    /// Returns the string payload, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the numeric payload, if any.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the boolean payload, if any.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the array elements, if any.
    #[must_use]
    pub fn as_array(&self) -> Option<&[ParamValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Canonical string form used as a `valueMap` key.
    ///
    /// Booleans become `true`/`false`, integral numbers drop their fraction,
    /// and arrays are joined with `,` and no spaces.
    #[must_use]
    pub fn normalized(&self) -> String {
        match self {
            Self::Array(items) => items
                .iter()
                .map(Self::normalized)
                .collect::<Vec<_>>()
                .join(","),
            scalar => scalar.to_string(),
        }
    }
}

impl fmt::Display for ParamValue {
    /// Human-facing form used for `{value}` substitution; arrays join with `", "`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            // f64's Display already prints 3.0 as `3`.
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
            Self::Array(items) => {
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(value: Vec<T>) -> Self {
        Self::Array(value.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_numbers_normalise_without_fraction() {
        assert_eq!(ParamValue::from(3).normalized(), "3");
        assert_eq!(ParamValue::from(2.5).normalized(), "2.5");
    }

    #[test]
    fn arrays_normalise_and_display_differently() {
        let value = ParamValue::from(vec!["a", "b"]);
        assert_eq!(value.normalized(), "a,b");
        assert_eq!(value.to_string(), "a, b");
    }

    #[test]
    fn deserializes_untagged_json() {
        let values: Vec<ParamValue> = serde_json::from_str(r#"[true, 4, "dash", [1, "x"]]"#).unwrap();
        assert_eq!(
            values,
            vec![
                ParamValue::Boolean(true),
                ParamValue::Number(4.0),
                ParamValue::String("dash".into()),
                ParamValue::Array(vec![ParamValue::Number(1.0), ParamValue::String("x".into())]),
            ]
        );
    }
}
