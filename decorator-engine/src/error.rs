//! Errors surfaced by the transformation pipeline.

use thiserror::Error;

use crate::diagnostic::Diagnostic;

/// Result alias for transformation operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Malformed directive syntax.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error at byte {offset}: {message}")]
pub struct ParseError {
    /// Byte offset into the original input.
    pub offset: usize,
    /// Human-readable description.
    pub message: String,
}

impl ParseError {
    pub(crate) fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

/// Parameters supplied to a directive do not satisfy its definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "invalid parameters for decorator `{decorator}`{}: {message}",
    .parameter.as_ref().map(|p| format!(" (parameter `{p}`)")).unwrap_or_default()
)]
pub struct ValidationError {
    /// Decorator whose parameters failed.
    pub decorator: String,
    /// Offending parameter, when one can be named.
    pub parameter: Option<String>,
    /// Human-readable description.
    pub message: String,
}

impl ValidationError {
    pub(crate) fn new(
        decorator: impl Into<String>,
        parameter: Option<&str>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            decorator: decorator.into(),
            parameter: parameter.map(str::to_owned),
            message: message.into(),
        }
    }
}

/// An evaluator failed to produce a fragment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to render decorator `{decorator}`: {reason}")]
pub struct RenderError {
    /// Decorator being rendered.
    pub decorator: String,
    /// Human-readable description.
    pub reason: String,
}

impl RenderError {
    /// Creates a render error for the supplied decorator.
    #[must_use]
    pub fn new(decorator: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            decorator: decorator.into(),
            reason: reason.into(),
        }
    }
}

/// Fatal outcomes of a transformation; no partial output is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// A recognised directive line is malformed.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Directive parameters failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The evaluator could not render a fragment.
    #[error(transparent)]
    Render(#[from] RenderError),
    /// The strict compatibility policy rejected the stack.
    #[error("strict compatibility policy rejected the decorator stack with {} diagnostic(s)", .diagnostics.len())]
    Incompatible {
        /// Diagnostics that triggered the rejection.
        diagnostics: Vec<Diagnostic>,
    },
}
