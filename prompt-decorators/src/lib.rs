//! Declarative prompt decorators.
//!
//! Depend on this crate via `cargo add prompt-decorators`. It bundles the
//! workspace crates behind feature flags so callers that only need the data
//! model or the registry can leave the transformation engine out.

#![warn(missing_docs, clippy::pedantic)]

/// Re-export the shared data model.
pub use decorator_primitives as primitives;

/// Versioned decorator registry (enabled by `registry` feature).
#[cfg(feature = "registry")]
pub use decorator_registry as registry;

/// Engine configuration (enabled by `config` feature).
#[cfg(feature = "config")]
pub use decorator_config as config;

/// Transformation pipeline (enabled by `engine` feature).
#[cfg(feature = "engine")]
pub use decorator_engine as engine;

/// Commonly used items for building and applying decorators.
#[cfg(feature = "engine")]
pub mod prelude {
    pub use decorator_config::{CompatibilityPolicy, EngineConfig};
    pub use decorator_engine::{
        Diagnostic, DiagnosticCode, Evaluator, TransformEngine, TransformError,
        TransformationResult,
    };
    pub use decorator_primitives::{
        Compatibility, CompositionBehavior, DecoratorDefinition, DecoratorName, ParamType,
        ParamValue, ParameterMapping, ParameterSpec, Placement, TransformationTemplate, WrapText,
    };
    pub use decorator_registry::{DecoratorRegistry, DefinitionSource, JsonSource, StaticSource};
}
