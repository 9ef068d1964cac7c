//! Configuration for the decorator transformation engine.
//!
//! [`EngineConfig`] carries the directive marker, the active specification
//! version, the compatibility policy, and the separators used when composing
//! the final prompt. Configs can be built in code, decoded from JSON, or
//! adjusted through `PROMPT_DECORATORS_*` environment variables.

#![warn(missing_docs, clippy::pedantic)]

pub mod loader;
pub mod schema;

pub use loader::{ENV_COMPATIBILITY, ENV_MARKER, ENV_SPEC_VERSION};
pub use schema::{
    CompatibilityPolicy, ConfigError, ConfigResult, DEFAULT_MARKER, DEFAULT_SPEC_VERSION,
    EngineConfig,
};
