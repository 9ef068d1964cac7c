//! Non-fatal findings reported alongside a transformation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational; never blocks a transformation.
    Info,
    /// Suspicious stack; blocks only under the strict policy.
    Warning,
    /// Broken stack; blocks only under the strict policy.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// Machine-readable category of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCode {
    /// A directive named a decorator that is not registered.
    UnknownDirective,
    /// Two decorators in the stack declare a conflict.
    Conflict,
    /// A decorator requires another that is absent from the stack.
    MissingRequirement,
    /// The active specification version is outside a decorator's range.
    VersionIncompatible,
    /// The target model is not among a decorator's supported models.
    UnsupportedModel,
}

/// Structured diagnostic emitted by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    severity: Severity,
    code: DiagnosticCode,
    names: Vec<String>,
    detail: String,
}

impl Diagnostic {
    /// An unknown directive was passed through into the payload.
    #[must_use]
    pub fn unknown_directive(name: &str) -> Self {
        Self {
            severity: Severity::Info,
            code: DiagnosticCode::UnknownDirective,
            names: vec![name.to_owned()],
            detail: format!("decorator `{name}` is not registered; directive left in the prompt"),
        }
    }

    /// Two decorators conflict. Names are stored sorted.
    #[must_use]
    pub fn conflict(a: &str, b: &str) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self {
            severity: Severity::Warning,
            code: DiagnosticCode::Conflict,
            names: vec![first.to_owned(), second.to_owned()],
            detail: format!("decorators `{first}` and `{second}` conflict"),
        }
    }

    /// `decorator` requires `required`, which is not in the stack.
    #[must_use]
    pub fn missing_requirement(decorator: &str, required: &str) -> Self {
        Self {
            severity: Severity::Warning,
            code: DiagnosticCode::MissingRequirement,
            names: vec![decorator.to_owned(), required.to_owned()],
            detail: format!("decorator `{decorator}` requires `{required}`"),
        }
    }

    /// The active spec version falls outside the decorator's declared range.
    #[must_use]
    pub fn version_incompatible(decorator: &str, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code: DiagnosticCode::VersionIncompatible,
            names: vec![decorator.to_owned()],
            detail: detail.into(),
        }
    }

    /// The decorator does not list the target model.
    #[must_use]
    pub fn unsupported_model(decorator: &str, model: &str) -> Self {
        Self {
            severity: Severity::Warning,
            code: DiagnosticCode::UnsupportedModel,
            names: vec![decorator.to_owned()],
            detail: format!("decorator `{decorator}` does not support model `{model}`"),
        }
    }

    /// Returns the severity.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    /// Returns the category.
    #[must_use]
    pub const fn code(&self) -> DiagnosticCode {
        self.code
    }

    /// Decorator names involved, most relevant first.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Human-readable description.
    #[must_use]
    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// Returns true when the strict policy must reject this diagnostic.
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        self.severity >= Severity::Warning
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_names_are_sorted() {
        let diagnostic = Diagnostic::conflict("Verbose", "Concise");
        assert_eq!(diagnostic.names(), ["Concise", "Verbose"]);
        assert_eq!(diagnostic, Diagnostic::conflict("Concise", "Verbose"));
    }

    #[test]
    fn only_unknown_directives_are_non_blocking() {
        assert!(!Diagnostic::unknown_directive("Foo").is_blocking());
        assert!(Diagnostic::missing_requirement("A", "B").is_blocking());
        assert!(Diagnostic::unsupported_model("A", "gpt-x").is_blocking());
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_value(Diagnostic::unknown_directive("Foo")).unwrap();
        assert_eq!(json["severity"], "info");
        assert_eq!(json["code"], "unknown_directive");
        assert_eq!(json["names"][0], "Foo");
    }
}
