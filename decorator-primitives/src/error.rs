//! Shared error definitions for decorator primitives.

use thiserror::Error;

use crate::parameter::ParamType;

/// Result alias used throughout the decorator crates.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while constructing or validating a decorator definition.
#[derive(Debug, Error)]
pub enum Error {
    /// The decorator name is not a valid identifier.
    #[error("invalid decorator name `{name}`: {reason}")]
    InvalidName {
        /// The offending name.
        name: String,
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// A version string could not be parsed as semver.
    #[error("invalid version `{version}`: {source}")]
    InvalidVersion {
        /// The offending version string.
        version: String,
        /// Source parsing error from the semver library.
        #[source]
        source: semver::Error,
    },

    /// A parameter declaration is malformed.
    #[error("decorator `{decorator}` declares invalid parameter `{parameter}`: {reason}")]
    InvalidParameter {
        /// Decorator owning the parameter.
        decorator: String,
        /// Parameter name.
        parameter: String,
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// A declared default does not satisfy its own parameter spec.
    #[error("decorator `{decorator}` has an invalid default for `{parameter}`: {source}")]
    InvalidDefault {
        /// Decorator owning the parameter.
        decorator: String,
        /// Parameter name.
        parameter: String,
        /// The underlying value violation.
        #[source]
        source: ValueError,
    },

    /// The template maps a parameter that the decorator does not declare.
    #[error("decorator `{decorator}` maps undeclared parameter `{parameter}`")]
    UnmappedParameter {
        /// Decorator owning the template.
        decorator: String,
        /// The undeclared parameter name.
        parameter: String,
    },

    /// The supported specification range is inverted.
    #[error("decorator `{decorator}` has min spec version {min} above max spec version {max}")]
    InvalidSpecRange {
        /// Decorator owning the range.
        decorator: String,
        /// Declared minimum.
        min: semver::Version,
        /// Declared maximum.
        max: semver::Version,
    },

    /// A builder was finalised without a required field.
    #[error("decorator definition is missing `{0}`")]
    MissingField(&'static str),
}

/// Reasons a typed value fails a [`ParameterSpec`](crate::ParameterSpec).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    /// Value has the wrong shape for the declared type.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        /// Declared parameter type.
        expected: ParamType,
        /// Type name of the supplied value.
        found: &'static str,
    },

    /// Enum value is not one of the declared members.
    #[error("`{value}` is not one of: {allowed}")]
    NotInEnum {
        /// Supplied value.
        value: String,
        /// Comma-separated allowed members.
        allowed: String,
    },

    /// Number falls below the declared minimum.
    #[error("{value} is below the minimum of {min}")]
    BelowMinimum {
        /// Supplied value.
        value: f64,
        /// Declared minimum.
        min: f64,
    },

    /// Number exceeds the declared maximum.
    #[error("{value} is above the maximum of {max}")]
    AboveMaximum {
        /// Supplied value.
        value: f64,
        /// Declared maximum.
        max: f64,
    },

    /// Number is NaN or infinite.
    #[error("number must be finite")]
    NotFinite,

    /// String does not match the declared pattern.
    #[error("`{value}` does not match pattern `{pattern}`")]
    PatternMismatch {
        /// Supplied value.
        value: String,
        /// Declared pattern.
        pattern: String,
    },

    /// The declared pattern is not a valid regular expression.
    #[error("invalid pattern `{pattern}`: {reason}")]
    InvalidPattern {
        /// Declared pattern.
        pattern: String,
        /// Compiler error message.
        reason: String,
    },

    /// Arrays may only contain scalars.
    #[error("array elements must be scalars")]
    NestedArray,
}
