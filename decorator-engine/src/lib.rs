//! Prompt transformation pipeline.
//!
//! Text flows through the [`parser`], then each recognised directive is looked
//! up in a registry snapshot, validated by [`params`], rendered through an
//! [`Evaluator`], checked by [`compatibility`], and laid out by [`compose`].
//! [`TransformEngine`] wires the stages together.

#![warn(missing_docs, clippy::pedantic)]

pub mod compatibility;
pub mod compose;
pub mod diagnostic;
pub mod engine;
pub mod error;
pub mod params;
pub mod parser;
pub mod render;

pub use compatibility::{check_definitions, check_names};
pub use compose::{FRAGMENT_PLACEHOLDER, Fragment, compose};
pub use diagnostic::{Diagnostic, DiagnosticCode, Severity};
pub use engine::{
    DecoratorStack, DirectiveInvocation, ResolvedPrompt, TransformEngine, TransformationResult,
    resolve_with, transform_with,
};
pub use error::{ParseError, RenderError, TransformError, TransformResult, ValidationError};
pub use params::{ParameterMap, parse_parameters, validate_arguments};
pub use parser::{DirectiveToken, ParsedPrompt, RawArgument, parse, split_arguments};
pub use render::{DeclarativeRenderer, Evaluator, VALUE_PLACEHOLDER};
