//! Decorator registration and snapshot-consistent lookup.
//!
//! Writers are serialised and publish a fresh immutable [`RegistrySnapshot`]
//! on every successful change, so a transformation that grabbed a snapshot
//! keeps seeing the same definitions even while a reload is in flight.

#![warn(missing_docs, clippy::pedantic)]

pub mod registry;
pub mod source;

pub use registry::{
    DecoratorRegistry, LookupError, RegisterAction, RegistryError, RegistryResult,
    RegistrySnapshot,
};
pub use source::{DefinitionSource, JsonSource, StaticSource};
