//! Parameter parsing, coercion, and validation against a decorator definition.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use decorator_primitives::{DecoratorDefinition, ParamType, ParamValue, ValueError, is_identifier};
use serde::Serialize;

use crate::error::ValidationError;
use crate::parser::{RawArgument, split_arguments};

/// Validated parameters of one directive, keyed by parameter name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParameterMap(BTreeMap<String, ParamValue>);

impl ParameterMap {
    /// Returns the value bound to `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    /// Returns true when `name` has a value.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Iterates values in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of bound parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when no parameter is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Syntactic form of a parameter value before coercion.
#[derive(Debug, Clone, PartialEq)]
enum Literal {
    Quoted(String),
    Bare(String),
    Array(Vec<Literal>),
}

impl Literal {
    const fn type_name(&self) -> &'static str {
        match self {
            Self::Quoted(_) => "string",
            Self::Bare(_) => "bare token",
            Self::Array(_) => "array",
        }
    }
}

/// Validates split arguments against `definition` and fills defaults.
///
/// # Errors
///
/// Returns [`ValidationError`] for arguments without `=`, non-identifier or
/// unknown keys, repeated keys, malformed literals, values that do not coerce
/// to the declared type or violate its constraints, and required parameters
/// left without a value.
pub fn validate_arguments(
    definition: &DecoratorDefinition,
    arguments: &[RawArgument],
) -> Result<ParameterMap, ValidationError> {
    let decorator = definition.name().as_str();
    let mut values = BTreeMap::new();

    for argument in arguments {
        let Some((key, raw_value)) = argument.text.split_once('=') else {
            return Err(ValidationError::new(
                decorator,
                None,
                format!("expected `key=value`, found `{}`", argument.text),
            ));
        };
        let key = key.trim();
        if !is_identifier(key) {
            return Err(ValidationError::new(
                decorator,
                None,
                format!("`{key}` is not a valid parameter name"),
            ));
        }

        let Some(spec) = definition.parameter(key) else {
            return Err(ValidationError::new(decorator, Some(key), "unknown parameter"));
        };

        let literal = parse_literal(raw_value.trim(), true)
            .map_err(|message| ValidationError::new(decorator, Some(key), message))?;
        let value = coerce(spec.kind(), literal).map_err(|err| {
            ValidationError::new(decorator, Some(key), err.to_string())
        })?;
        spec.check(&value)
            .map_err(|err| ValidationError::new(decorator, Some(key), err.to_string()))?;

        match values.entry(key.to_owned()) {
            Entry::Occupied(_) => {
                return Err(ValidationError::new(
                    decorator,
                    Some(key),
                    "parameter supplied more than once",
                ));
            }
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
        }
    }

    for spec in definition.parameters() {
        if values.contains_key(spec.name()) {
            continue;
        }
        if let Some(default) = spec.default_value() {
            values.insert(spec.name().to_owned(), default.clone());
        } else if spec.is_required() {
            return Err(ValidationError::new(
                decorator,
                Some(spec.name()),
                "required parameter is missing",
            ));
        }
    }

    Ok(ParameterMap(values))
}

/// Parses a raw parameter list (the text between parentheses) for `definition`.
///
/// `None` means the directive had no parameter list at all.
///
/// # Errors
///
/// Returns [`ValidationError`] when the list cannot be split or fails
/// [`validate_arguments`].
pub fn parse_parameters(
    definition: &DecoratorDefinition,
    raw: Option<&str>,
) -> Result<ParameterMap, ValidationError> {
    let arguments = match raw {
        Some(raw) => split_arguments(raw).map_err(|err| {
            ValidationError::new(definition.name().as_str(), None, err.message)
        })?,
        None => Vec::new(),
    };
    validate_arguments(definition, &arguments)
}

fn parse_literal(text: &str, allow_array: bool) -> Result<Literal, String> {
    if text.is_empty() {
        return Err("missing value after `=`".to_owned());
    }

    if let Some(quote) = text.chars().next().filter(|c| matches!(c, '"' | '\'')) {
        return unquote(text, quote).map(Literal::Quoted);
    }

    if let Some(inner) = text.strip_prefix('[') {
        if !allow_array {
            return Err("nested arrays are not supported".to_owned());
        }
        let Some(inner) = inner.strip_suffix(']') else {
            return Err("array literal must end with `]`".to_owned());
        };
        let elements = split_arguments(inner).map_err(|err| err.message)?;
        return elements
            .iter()
            .map(|element| parse_literal(&element.text, false))
            .collect::<Result<Vec<_>, _>>()
            .map(Literal::Array);
    }

    Ok(Literal::Bare(text.to_owned()))
}

fn unquote(text: &str, quote: char) -> Result<String, String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.char_indices().skip(1);

    while let Some((idx, ch)) = chars.next() {
        match ch {
            '\\' => {
                let Some((_, escaped)) = chars.next() else {
                    return Err("dangling escape at end of string".to_owned());
                };
                match escaped {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    '\\' | '"' | '\'' => out.push(escaped),
                    other => return Err(format!("unsupported escape `\\{other}`")),
                }
            }
            c if c == quote => {
                if idx + c.len_utf8() != text.len() {
                    return Err("unexpected text after closing quote".to_owned());
                }
                return Ok(out);
            }
            c => out.push(c),
        }
    }

    Err("unterminated quoted string".to_owned())
}

fn coerce(kind: ParamType, literal: Literal) -> Result<ParamValue, ValueError> {
    match (kind, literal) {
        (ParamType::String | ParamType::Enum, Literal::Quoted(s) | Literal::Bare(s)) => {
            Ok(ParamValue::String(s))
        }
        (ParamType::Number, Literal::Bare(text)) => text
            .parse::<f64>()
            .map(ParamValue::Number)
            .map_err(|_| ValueError::TypeMismatch {
                expected: kind,
                found: "non-numeric text",
            }),
        (ParamType::Boolean, Literal::Bare(text)) => match text.as_str() {
            "true" => Ok(ParamValue::Boolean(true)),
            "false" => Ok(ParamValue::Boolean(false)),
            _ => Err(ValueError::TypeMismatch {
                expected: kind,
                found: "non-boolean text",
            }),
        },
        (ParamType::Array, Literal::Array(items)) => {
            items.into_iter().map(auto_type).collect::<Result<_, _>>().map(ParamValue::Array)
        }
        (expected, literal) => Err(ValueError::TypeMismatch {
            expected,
            found: literal.type_name(),
        }),
    }
}

/// Types an array element: quoted text stays a string, bare tokens try
/// boolean then number before falling back to string.
fn auto_type(literal: Literal) -> Result<ParamValue, ValueError> {
    match literal {
        Literal::Quoted(s) => Ok(ParamValue::String(s)),
        Literal::Bare(text) => Ok(match text.as_str() {
            "true" => ParamValue::Boolean(true),
            "false" => ParamValue::Boolean(false),
            _ => match text.parse::<f64>() {
                Ok(number) if number.is_finite() => ParamValue::Number(number),
                _ => ParamValue::String(text),
            },
        }),
        Literal::Array(_) => Err(ValueError::NestedArray),
    }
}
