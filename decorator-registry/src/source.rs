//! Pluggable suppliers of decorator definitions.
//!
//! File, directory, and remote loaders live outside this crate; they only need
//! to implement [`DefinitionSource`].

use decorator_primitives::DecoratorDefinition;
use serde_json::Value;

use crate::registry::{RegistryError, RegistryResult};

/// Supplies decorator definitions to a registry.
pub trait DefinitionSource: Send + Sync {
    /// Produces the definitions to register, in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the definitions cannot be produced.
    fn definitions(&self) -> RegistryResult<Vec<DecoratorDefinition>>;

    /// Short label used in logs.
    fn describe(&self) -> String {
        "definition source".to_owned()
    }
}

/// In-memory list of definitions.
#[derive(Clone, Debug, Default)]
pub struct StaticSource {
    definitions: Vec<DecoratorDefinition>,
}

impl StaticSource {
    /// Wraps the supplied definitions.
    #[must_use]
    pub fn new(definitions: Vec<DecoratorDefinition>) -> Self {
        Self { definitions }
    }
}

impl DefinitionSource for StaticSource {
    fn definitions(&self) -> RegistryResult<Vec<DecoratorDefinition>> {
        Ok(self.definitions.clone())
    }

    fn describe(&self) -> String {
        format!("static source ({} definitions)", self.definitions.len())
    }
}

/// JSON document already held in memory.
///
/// Accepts a single definition object, an array of definitions, or an object
/// with a `decorators` array.
#[derive(Clone, Debug)]
pub struct JsonSource {
    label: String,
    document: String,
}

impl JsonSource {
    /// Creates a source from a JSON string.
    #[must_use]
    pub fn new(label: impl Into<String>, document: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            document: document.into(),
        }
    }
}

impl DefinitionSource for JsonSource {
    fn definitions(&self) -> RegistryResult<Vec<DecoratorDefinition>> {
        let value: Value = serde_json::from_str(&self.document)?;
        let entries = match value {
            Value::Array(items) => items,
            Value::Object(mut map) => match map.remove("decorators") {
                Some(Value::Array(items)) => items,
                Some(_) => {
                    return Err(RegistryError::loader(format!(
                        "{}: `decorators` must be an array",
                        self.label
                    )));
                }
                None => vec![Value::Object(map)],
            },
            _ => {
                return Err(RegistryError::loader(format!(
                    "{}: expected an object or array of decorator definitions",
                    self.label
                )));
            }
        };

        entries
            .into_iter()
            .map(|entry| serde_json::from_value(entry).map_err(RegistryError::from))
            .collect()
    }

    fn describe(&self) -> String {
        format!("json source `{}`", self.label)
    }
}
