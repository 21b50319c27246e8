//! Name-keyed plugin registry.
//!
//! Maps a plugin name to a factory that builds an instance from validated
//! parameters. Registration happens once at startup; after [`PluginRegistry::seal`]
//! the registry is read-only and further registrations fail.
//!
//! Entries are stored in a `BTreeMap` for deterministic iteration order.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::plugin::params::{ParamError, ParamMap, ParamSchema, ResolvedParams};

/// Factory signature: validated parameters to a shared instance.
///
/// Factories may reject well-typed values with [`ParamError::Rejected`].
pub type Factory<T> = Box<dyn Fn(&ResolvedParams) -> Result<Arc<T>, ParamError> + Send + Sync>;

/// Error type for registration and resolution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A plugin with this name is already registered.
    #[error("plugin `{name}` is already registered")]
    DuplicateName { name: String },
    /// No plugin with this name is registered.
    #[error("unknown plugin `{name}`")]
    UnknownPlugin { name: String },
    /// Parameters did not satisfy the plugin's schema.
    #[error("invalid parameter for plugin `{plugin}`: {source}")]
    InvalidParameter {
        plugin: String,
        #[source]
        source: ParamError,
    },
    /// Registration attempted after the registry was sealed.
    #[error("registry is sealed; cannot register `{name}`")]
    Sealed { name: String },
}

impl RegistryError {
    /// The plugin name this error is about.
    #[must_use]
    pub fn plugin(&self) -> &str {
        match self {
            Self::DuplicateName { name }
            | Self::UnknownPlugin { name }
            | Self::Sealed { name } => name,
            Self::InvalidParameter { plugin, .. } => plugin,
        }
    }
}

/// A single registry entry.
pub struct RegistryEntry<T: ?Sized> {
    name: String,
    description: String,
    schema: ParamSchema,
    factory: Factory<T>,
}

impl<T: ?Sized> RegistryEntry<T> {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn schema(&self) -> &ParamSchema {
        &self.schema
    }
}

impl<T: ?Sized> fmt::Debug for RegistryEntry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("name", &self.name)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// An instance built by [`PluginRegistry::resolve`], with the parameters it was built from.
pub struct Resolved<T: ?Sized> {
    pub name: String,
    pub instance: Arc<T>,
    pub params: ResolvedParams,
}

impl<T: ?Sized> Clone for Resolved<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            instance: Arc::clone(&self.instance),
            params: self.params.clone(),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Resolved<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolved")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Name-to-factory mapping for one plugin role.
pub struct PluginRegistry<T: ?Sized> {
    entries: BTreeMap<String, RegistryEntry<T>>,
    sealed: bool,
}

impl<T: ?Sized> PluginRegistry<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            sealed: false,
        }
    }

    /// Register a factory under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateName`] if `name` is taken, or
    /// [`RegistryError::Sealed`] after [`Self::seal`].
    pub fn register<F>(
        &mut self,
        name: &str,
        description: &str,
        schema: ParamSchema,
        factory: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(&ResolvedParams) -> Result<Arc<T>, ParamError> + Send + Sync + 'static,
    {
        if self.sealed {
            return Err(RegistryError::Sealed {
                name: name.to_string(),
            });
        }
        if self.entries.contains_key(name) {
            return Err(RegistryError::DuplicateName {
                name: name.to_string(),
            });
        }
        self.entries.insert(
            name.to_string(),
            RegistryEntry {
                name: name.to_string(),
                description: description.to_string(),
                schema,
                factory: Box::new(factory),
            },
        );
        Ok(())
    }

    /// Close the registry. Idempotent.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    #[must_use]
    pub fn entry(&self, name: &str) -> Option<&RegistryEntry<T>> {
        self.entries.get(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Validate `params` against the entry's schema and build an instance.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownPlugin`] if `name` is absent, or
    /// [`RegistryError::InvalidParameter`] if validation or construction fails.
    pub fn resolve(&self, name: &str, params: &ParamMap) -> Result<Resolved<T>, RegistryError> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| RegistryError::UnknownPlugin {
                name: name.to_string(),
            })?;
        let invalid = |source| RegistryError::InvalidParameter {
            plugin: name.to_string(),
            source,
        };
        let resolved = entry.schema.resolve(params).map_err(invalid)?;
        let instance = (entry.factory)(&resolved).map_err(invalid)?;
        Ok(Resolved {
            name: name.to_string(),
            instance,
            params: resolved,
        })
    }
}

impl<T: ?Sized> Default for PluginRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for PluginRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("entries", &self.entries.keys().collect::<Vec<_>>())
            .field("sealed", &self.sealed)
            .finish()
    }
}
