//! Runtime registry for decorator definitions.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;
use decorator_primitives::{DecoratorDefinition, DecoratorName, Version};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::source::DefinitionSource;

/// Result alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Immutable view of every registered definition at one point in time.
#[derive(Clone, Debug, Default)]
pub struct RegistrySnapshot {
    definitions: BTreeMap<DecoratorName, Arc<DecoratorDefinition>>,
    generation: u64,
}

impl RegistrySnapshot {
    /// Returns the definition registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] when no definition carries that name.
    pub fn lookup(&self, name: &str) -> Result<Arc<DecoratorDefinition>, LookupError> {
        self.get(name).cloned().ok_or_else(|| LookupError {
            name: name.to_owned(),
        })
    }

    /// Borrowing variant of [`RegistrySnapshot::lookup`].
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<DecoratorDefinition>> {
        self.definitions.get(name)
    }

    /// Returns true when `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Iterates definitions in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<DecoratorDefinition>> {
        self.definitions.values()
    }

    /// Registered names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.definitions.keys().map(DecoratorName::as_str).collect()
    }

    /// Definitions whose category equals `category`.
    #[must_use]
    pub fn by_category(&self, category: &str) -> Vec<Arc<DecoratorDefinition>> {
        self.iter()
            .filter(|definition| definition.category() == Some(category))
            .cloned()
            .collect()
    }

    /// Number of registered definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns true when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Monotonic counter identifying this snapshot; bumps on every publish.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    fn stage(&mut self, definition: DecoratorDefinition) -> RegistryResult<RegisterAction> {
        definition.validate()?;

        let name = definition.name().clone();
        let version = definition.version().clone();

        let action = match self.definitions.get(&name) {
            Some(existing) if &version < existing.version() => {
                return Err(RegistryError::VersionConflict {
                    name: name.into(),
                    existing: existing.version().clone(),
                    attempted: version,
                });
            }
            Some(existing) => RegisterAction::Replaced {
                name: name.clone(),
                previous: existing.version().clone(),
                version,
            },
            None => RegisterAction::Inserted {
                name: name.clone(),
                version,
            },
        };

        self.definitions.insert(name, Arc::new(definition));
        Ok(action)
    }
}

/// Outcome of a successful registration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegisterAction {
    /// No definition with this name existed before.
    Inserted {
        /// Registered name.
        name: DecoratorName,
        /// Registered version.
        version: Version,
    },
    /// An existing definition with an equal or older version was replaced.
    Replaced {
        /// Registered name.
        name: DecoratorName,
        /// Version that was replaced.
        previous: Version,
        /// Version now in effect.
        version: Version,
    },
}

impl RegisterAction {
    /// Name affected by the registration.
    #[must_use]
    pub fn name(&self) -> &DecoratorName {
        match self {
            Self::Inserted { name, .. } | Self::Replaced { name, .. } => name,
        }
    }
}

/// Registry that stores decorator definitions keyed by name.
///
/// Reads are lock-free loads of the current snapshot. Writes are serialised
/// and copy the snapshot, so readers never observe a partially applied batch.
pub struct DecoratorRegistry {
    current: ArcSwap<RegistrySnapshot>,
    writer: Mutex<()>,
}

impl Default for DecoratorRegistry {
    fn default() -> Self {
        Self {
            current: ArcSwap::from_pointee(RegistrySnapshot::default()),
            writer: Mutex::new(()),
        }
    }
}

impl fmt::Debug for DecoratorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.current.load();
        f.debug_struct("DecoratorRegistry")
            .field("registered", &snapshot.names())
            .field("generation", &snapshot.generation())
            .finish()
    }
}

impl DecoratorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a single definition.
    ///
    /// A definition whose name is already registered replaces the existing
    /// entry only when its version is greater than or equal to it.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidDefinition`] when the definition fails
    /// validation, or [`RegistryError::VersionConflict`] when it is older than
    /// the registered one.
    pub fn register(&self, definition: DecoratorDefinition) -> RegistryResult<RegisterAction> {
        let mut actions = self.register_many([definition])?;
        Ok(actions.remove(0))
    }

    /// Registers a batch of definitions atomically.
    ///
    /// Either every definition is published in one new snapshot or, on the
    /// first error, none are. Definitions are applied in iteration order, so a
    /// batch may carry several versions of the same decorator in ascending
    /// order.
    ///
    /// # Errors
    ///
    /// Propagates the first [`RegistryError`] raised by any definition.
    pub fn register_many<I>(&self, definitions: I) -> RegistryResult<Vec<RegisterAction>>
    where
        I: IntoIterator<Item = DecoratorDefinition>,
    {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let mut next = RegistrySnapshot::clone(&self.current.load());
        let mut actions = Vec::new();
        for definition in definitions {
            match next.stage(definition) {
                Ok(action) => actions.push(action),
                Err(err) => {
                    warn!(error = %err, "decorator registration rejected");
                    return Err(err);
                }
            }
        }

        if actions.is_empty() {
            return Ok(actions);
        }

        next.generation += 1;
        let generation = next.generation;
        self.current.store(Arc::new(next));

        for action in &actions {
            match action {
                RegisterAction::Inserted { name, version } => {
                    debug!(decorator = %name, %version, "decorator registered");
                }
                RegisterAction::Replaced {
                    name,
                    previous,
                    version,
                } => {
                    info!(decorator = %name, %previous, %version, "decorator replaced");
                }
            }
        }
        info!(
            generation,
            count = actions.len(),
            "published decorator registry snapshot"
        );

        Ok(actions)
    }

    /// Pulls definitions from `source` and registers them as one batch.
    ///
    /// # Errors
    ///
    /// Returns the source's error, or any registration error from
    /// [`DecoratorRegistry::register_many`].
    pub fn load_from(&self, source: &dyn DefinitionSource) -> RegistryResult<Vec<RegisterAction>> {
        let definitions = source.definitions()?;
        debug!(
            source = %source.describe(),
            count = definitions.len(),
            "loading decorator definitions"
        );
        self.register_many(definitions)
    }

    /// Looks up the current definition for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] when the name is not registered.
    pub fn lookup(&self, name: &str) -> Result<Arc<DecoratorDefinition>, LookupError> {
        self.current.load().lookup(name)
    }

    /// Returns the current immutable snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        self.current.load_full()
    }

    /// Lists all current definitions in name order.
    #[must_use]
    pub fn list(&self) -> Vec<Arc<DecoratorDefinition>> {
        self.current.load().iter().cloned().collect()
    }

    /// Lists all current names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.current
            .load()
            .names()
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    /// Number of registered definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.current.load().len()
    }

    /// Returns true when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.current.load().is_empty()
    }

    /// Generation of the current snapshot.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.current.load().generation()
    }
}

/// Requested decorator does not exist in the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("decorator `{name}` is not registered")]
pub struct LookupError {
    /// Name that failed to resolve.
    pub name: String,
}

/// Errors produced by registration and loading.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Definition failed structural validation.
    #[error("invalid decorator definition: {0}")]
    InvalidDefinition(#[from] decorator_primitives::Error),

    /// Definition is older than the one already registered.
    #[error("decorator `{name}` version {attempted} is older than registered version {existing}")]
    VersionConflict {
        /// Name of the decorator.
        name: String,
        /// Version currently registered.
        existing: Version,
        /// Version that was rejected.
        attempted: Version,
    },

    /// Definition document could not be decoded.
    #[error("failed to decode decorator definitions: {source}")]
    Decode {
        /// Source [`serde_json::Error`].
        #[from]
        source: serde_json::Error,
    },

    /// An external definition source failed.
    #[error("definition source failed: {reason}")]
    Loader {
        /// Human-readable reason reported by the source.
        reason: String,
    },
}

impl RegistryError {
    /// Creates a loader error from the supplied reason.
    #[must_use]
    pub fn loader(reason: impl Into<String>) -> Self {
        Self::Loader {
            reason: reason.into(),
        }
    }
}
