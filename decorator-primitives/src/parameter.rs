//! Parameter declarations and the typed checks they impose.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValueError;
use crate::value::ParamValue;

/// Declared type of a decorator parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// Free text, quoted or bare.
    String,
    /// Finite number.
    Number,
    /// `true` or `false`.
    Boolean,
    /// Bracketed list of scalars.
    Array,
    /// One of a fixed set of members.
    Enum,
}

impl ParamType {
    /// Lowercase label matching the serialized form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Enum => "enum",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional bounds applied to parameter values.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    /// Inclusive lower bound for numbers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Inclusive upper bound for numbers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Regular expression that string values must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl Constraints {
    /// Returns true when no bound is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none() && self.pattern.is_none()
    }
}

/// Declaration of a single decorator parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSpec {
    name: String,
    #[serde(rename = "type")]
    kind: ParamType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default: Option<ParamValue>,
    #[serde(default)]
    required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    enum_values: Vec<String>,
    #[serde(default, skip_serializing_if = "Constraints::is_empty")]
    constraints: Constraints,
}

impl ParameterSpec {
    /// Creates an optional parameter with no default or constraints.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ParamType) -> Self {
        Self {
            name: name.into(),
            kind,
            description: None,
            default: None,
            required: false,
            enum_values: Vec::new(),
            constraints: Constraints::default(),
        }
    }

    /// Shorthand for an enum parameter with the supplied members.
    #[must_use]
    pub fn enumeration<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, ParamType::Enum).with_enum_values(members)
    }

    /// Marks the parameter as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the default value applied when the parameter is omitted.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<ParamValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Sets the human-readable description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replaces the allowed enum members.
    #[must_use]
    pub fn with_enum_values<I, S>(mut self, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = members.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the inclusive numeric minimum.
    #[must_use]
    pub fn with_min(mut self, min: f64) -> Self {
        self.constraints.min = Some(min);
        self
    }

    /// Sets the inclusive numeric maximum.
    #[must_use]
    pub fn with_max(mut self, max: f64) -> Self {
        self.constraints.max = Some(max);
        self
    }

    /// Sets the pattern string values must match.
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.constraints.pattern = Some(pattern.into());
        self
    }

    /// Returns the parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared type.
    #[must_use]
    pub const fn kind(&self) -> ParamType {
        self.kind
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the default value, if declared.
    #[must_use]
    pub fn default_value(&self) -> Option<&ParamValue> {
        self.default.as_ref()
    }

    /// Returns true when the parameter must be supplied or defaulted.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Returns the enum members (empty for non-enum parameters).
    #[must_use]
    pub fn enum_values(&self) -> &[String] {
        &self.enum_values
    }

    /// Returns the value constraints.
    #[must_use]
    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    /// Checks a typed value against the declared type and constraints.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValueError`] the value violates.
    pub fn check(&self, value: &ParamValue) -> Result<(), ValueError> {
        match (self.kind, value) {
            (ParamType::String, ParamValue::String(s)) => self.check_pattern(s),
            (ParamType::Number, ParamValue::Number(n)) => self.check_range(*n),
            (ParamType::Boolean, ParamValue::Boolean(_)) => Ok(()),
            (ParamType::Array, ParamValue::Array(items)) => {
                if items.iter().any(|item| matches!(item, ParamValue::Array(_))) {
                    return Err(ValueError::NestedArray);
                }
                Ok(())
            }
            (ParamType::Enum, ParamValue::String(s)) => {
                if self.enum_values.iter().any(|member| member == s) {
                    Ok(())
                } else {
                    Err(ValueError::NotInEnum {
                        value: s.clone(),
                        allowed: self.enum_values.join(", "),
                    })
                }
            }
            (expected, found) => Err(ValueError::TypeMismatch {
                expected,
                found: found.type_name(),
            }),
        }
    }

    fn check_range(&self, value: f64) -> Result<(), ValueError> {
        if !value.is_finite() {
            return Err(ValueError::NotFinite);
        }
        if let Some(min) = self.constraints.min {
            if value < min {
                return Err(ValueError::BelowMinimum { value, min });
            }
        }
        if let Some(max) = self.constraints.max {
            if value > max {
                return Err(ValueError::AboveMaximum { value, max });
            }
        }
        Ok(())
    }

    fn check_pattern(&self, value: &str) -> Result<(), ValueError> {
        let Some(pattern) = self.constraints.pattern.as_deref() else {
            return Ok(());
        };
        let regex = compile_pattern(pattern)?;
        if regex.is_match(value) {
            Ok(())
        } else {
            Err(ValueError::PatternMismatch {
                value: value.to_owned(),
                pattern: pattern.to_owned(),
            })
        }
    }
}

/// Compiles a constraint pattern, mapping compiler errors into [`ValueError`].
pub(crate) fn compile_pattern(pattern: &str) -> Result<Regex, ValueError> {
    Regex::new(pattern).map_err(|err| ValueError::InvalidPattern {
        pattern: pattern.to_owned(),
        reason: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_membership_is_exact() {
        let spec = ParameterSpec::enumeration("style", ["dash", "number"]);
        assert!(spec.check(&"dash".into()).is_ok());
        let err = spec.check(&"Dash".into()).expect_err("case sensitive");
        assert!(matches!(err, ValueError::NotInEnum { .. }));
    }

    #[test]
    fn numeric_bounds_are_inclusive() {
        let spec = ParameterSpec::new("count", ParamType::Number)
            .with_min(1.0)
            .with_max(5.0);
        assert!(spec.check(&1.into()).is_ok());
        assert!(spec.check(&5.into()).is_ok());
        assert!(matches!(
            spec.check(&0.into()),
            Err(ValueError::BelowMinimum { .. })
        ));
        assert!(matches!(
            spec.check(&6.into()),
            Err(ValueError::AboveMaximum { .. })
        ));
        assert_eq!(spec.check(&f64::NAN.into()), Err(ValueError::NotFinite));
    }

    #[test]
    fn pattern_applies_to_strings() {
        let spec = ParameterSpec::new("lang", ParamType::String).with_pattern("^[a-z]{2}$");
        assert!(spec.check(&"en".into()).is_ok());
        assert!(matches!(
            spec.check(&"english".into()),
            Err(ValueError::PatternMismatch { .. })
        ));
    }

    #[test]
    fn type_mismatch_reports_both_sides() {
        let spec = ParameterSpec::new("flag", ParamType::Boolean);
        let err = spec.check(&"yes".into()).expect_err("mismatch");
        assert_eq!(err.to_string(), "expected boolean, found string");
    }

    #[test]
    fn arrays_reject_nesting() {
        let spec = ParameterSpec::new("items", ParamType::Array);
        let nested = ParamValue::Array(vec![ParamValue::Array(Vec::new())]);
        assert_eq!(spec.check(&nested), Err(ValueError::NestedArray));
    }

    #[test]
    fn deserializes_camel_case_shape() {
        let spec: ParameterSpec = serde_json::from_str(
            r#"{"name":"style","type":"enum","enumValues":["dash","star"],"default":"dash"}"#,
        )
        .unwrap();
        assert_eq!(spec.kind(), ParamType::Enum);
        assert_eq!(spec.enum_values(), ["dash", "star"]);
        assert_eq!(spec.default_value(), Some(&ParamValue::from("dash")));
        assert!(!spec.is_required());
    }
}
