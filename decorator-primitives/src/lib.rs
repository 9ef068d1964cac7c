//! Core shared types for declarative prompt decorators.

#![warn(missing_docs, clippy::pedantic)]

mod compatibility;
mod definition;
mod error;
mod name;
mod parameter;
mod template;
mod value;

/// Requirement, conflict, and version constraints attached to a decorator.
pub use compatibility::Compatibility;
/// Decorator definitions and their builder.
pub use definition::{DecoratorDefinition, DefinitionBuilder};
/// Error types and result alias shared across the workspace.
pub use error::{Error, Result, ValueError};
/// Validated decorator identifiers.
pub use name::{DecoratorName, is_identifier};
/// Parameter declarations and their constraints.
pub use parameter::{Constraints, ParamType, ParameterSpec};
/// Rendering rules attached to a decorator.
pub use template::{
    CompositionBehavior, ParameterMapping, Placement, TransformationTemplate, WrapText,
};
/// Typed parameter values.
pub use value::ParamValue;

/// Re-exported so callers can build versions without depending on `semver` directly.
pub use semver::Version;
