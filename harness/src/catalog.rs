//! The plugin catalog: one registry per role, names unique across roles.
//!
//! Built once at startup, sealed before configuration is resolved, and
//! read-only from then on.

use std::fmt::{self, Write as _};
use std::sync::Arc;

use unravel_kernel::plugin::params::{ParamError, ParamSchema, ParamSpec, ResolvedParams};
use unravel_kernel::plugin::registry::{PluginRegistry, RegistryError};
use unravel_search::contract::{Checker, Cracker, Searcher};

use crate::{checkers, crackers, searchers};

/// The three plugin roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Role {
    Searcher,
    Checker,
    Cracker,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Searcher => "searcher",
            Self::Checker => "checker",
            Self::Cracker => "cracker",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A catalog entry, as shown by `list_params`.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginDescription {
    pub role: Role,
    pub name: String,
    pub description: String,
    pub params: Vec<ParamSpec>,
}

/// Registries for every role.
#[derive(Debug, Default)]
pub struct PluginCatalog {
    searchers: PluginRegistry<dyn Searcher>,
    checkers: PluginRegistry<dyn Checker>,
    crackers: PluginRegistry<dyn Cracker>,
}

impl PluginCatalog {
    /// An empty, unsealed catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog holding every built-in plugin, still unsealed so callers
    /// can add their own.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateName`] if two built-ins collide.
    pub fn with_builtins() -> Result<Self, RegistryError> {
        let mut catalog = Self::new();
        searchers::register_builtins(&mut catalog.searchers)?;
        checkers::register_builtins(&mut catalog.checkers)?;
        crackers::register_builtins(&mut catalog.crackers)?;
        catalog.ensure_disjoint()?;
        Ok(catalog)
    }

    /// Built-ins, sealed.
    ///
    /// # Errors
    ///
    /// See [`Self::with_builtins`].
    pub fn builtin() -> Result<Self, RegistryError> {
        let mut catalog = Self::with_builtins()?;
        catalog.seal();
        Ok(catalog)
    }

    fn ensure_disjoint(&self) -> Result<(), RegistryError> {
        for name in self.checkers.names().chain(self.crackers.names()) {
            if self.roles_of(name).len() > 1 {
                return Err(RegistryError::DuplicateName {
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }

    fn claim(&self, name: &str) -> Result<(), RegistryError> {
        if self.role_of(name).is_some() {
            return Err(RegistryError::DuplicateName {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Register a cracker factory.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateName`] if any role already uses
    /// `name`, or [`RegistryError::Sealed`].
    pub fn register_cracker<F>(
        &mut self,
        name: &str,
        description: &str,
        schema: ParamSchema,
        factory: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(&ResolvedParams) -> Result<Arc<dyn Cracker>, ParamError> + Send + Sync + 'static,
    {
        self.claim(name)?;
        self.crackers.register(name, description, schema, factory)
    }

    /// Register a checker factory.
    ///
    /// # Errors
    ///
    /// See [`Self::register_cracker`].
    pub fn register_checker<F>(
        &mut self,
        name: &str,
        description: &str,
        schema: ParamSchema,
        factory: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(&ResolvedParams) -> Result<Arc<dyn Checker>, ParamError> + Send + Sync + 'static,
    {
        self.claim(name)?;
        self.checkers.register(name, description, schema, factory)
    }

    /// Register a searcher factory.
    ///
    /// # Errors
    ///
    /// See [`Self::register_cracker`].
    pub fn register_searcher<F>(
        &mut self,
        name: &str,
        description: &str,
        schema: ParamSchema,
        factory: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(&ResolvedParams) -> Result<Arc<dyn Searcher>, ParamError> + Send + Sync + 'static,
    {
        self.claim(name)?;
        self.searchers.register(name, description, schema, factory)
    }

    /// Close every registry. Idempotent.
    pub fn seal(&mut self) {
        self.searchers.seal();
        self.checkers.seal();
        self.crackers.seal();
    }

    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.searchers.is_sealed() && self.checkers.is_sealed() && self.crackers.is_sealed()
    }

    #[must_use]
    pub fn searchers(&self) -> &PluginRegistry<dyn Searcher> {
        &self.searchers
    }

    #[must_use]
    pub fn checkers(&self) -> &PluginRegistry<dyn Checker> {
        &self.checkers
    }

    #[must_use]
    pub fn crackers(&self) -> &PluginRegistry<dyn Cracker> {
        &self.crackers
    }

    fn roles_of(&self, name: &str) -> Vec<Role> {
        let mut roles = Vec::new();
        if self.searchers.contains(name) {
            roles.push(Role::Searcher);
        }
        if self.checkers.contains(name) {
            roles.push(Role::Checker);
        }
        if self.crackers.contains(name) {
            roles.push(Role::Cracker);
        }
        roles
    }

    /// Which role `name` is registered under, if any.
    #[must_use]
    pub fn role_of(&self, name: &str) -> Option<Role> {
        self.roles_of(name).first().copied()
    }

    /// Schema of the plugin called `name` in any role.
    #[must_use]
    pub fn schema_of(&self, name: &str) -> Option<&ParamSchema> {
        match self.role_of(name)? {
            Role::Searcher => self.searchers.entry(name).map(|e| e.schema()),
            Role::Checker => self.checkers.entry(name).map(|e| e.schema()),
            Role::Cracker => self.crackers.entry(name).map(|e| e.schema()),
        }
    }

    /// Every entry, grouped by role, names sorted within a role.
    #[must_use]
    pub fn describe(&self) -> Vec<PluginDescription> {
        let mut out = Vec::new();
        describe_into(&mut out, &self.searchers, Role::Searcher);
        describe_into(&mut out, &self.checkers, Role::Checker);
        describe_into(&mut out, &self.crackers, Role::Cracker);
        out
    }

    /// Human-readable parameter listing.
    #[must_use]
    pub fn list_params(&self) -> String {
        let mut out = String::new();
        for plugin in self.describe() {
            let _ = writeln!(out, "{} ({}): {}", plugin.name, plugin.role, plugin.description);
            if plugin.params.is_empty() {
                let _ = writeln!(out, "  (no parameters)");
            }
            for spec in &plugin.params {
                let default = spec.default.as_deref().map_or_else(
                    || "required".to_string(),
                    |d| format!("default {d:?}"),
                );
                let _ = writeln!(
                    out,
                    "  {} [{}, {}]: {}",
                    spec.name, spec.kind, default, spec.description
                );
            }
        }
        out
    }
}

fn describe_into<T: ?Sized>(out: &mut Vec<PluginDescription>, registry: &PluginRegistry<T>, role: Role) {
    for entry in registry.names().filter_map(|name| registry.entry(name)) {
        out.push(PluginDescription {
            role,
            name: entry.name().to_string(),
            description: entry.description().to_string(),
            params: entry.schema().specs().to_vec(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unravel_kernel::plugin::params::ParamMap;
    use unravel_kernel::carrier::value::Value;
    use unravel_search::contract::CheckOutcome;

    struct Noop;

    impl Checker for Noop {
        fn name(&self) -> &str {
            "base64"
        }

        fn check(&self, _value: &Value) -> CheckOutcome {
            CheckOutcome::Reject
        }
    }

    #[test]
    fn builtins_cover_every_role() {
        let catalog = PluginCatalog::builtin().unwrap();
        assert!(catalog.is_sealed());
        assert_eq!(catalog.role_of("best_first"), Some(Role::Searcher));
        assert_eq!(catalog.role_of("wordlist"), Some(Role::Checker));
        assert_eq!(catalog.role_of("caesar"), Some(Role::Cracker));
        assert_eq!(catalog.role_of("enigma"), None);
        assert_eq!(catalog.crackers().len(), 10);
    }

    #[test]
    fn names_are_unique_across_roles() {
        let mut catalog = PluginCatalog::with_builtins().unwrap();
        let err = catalog
            .register_checker("base64", "clash", ParamSchema::empty(), |_| {
                Ok(Arc::new(Noop) as Arc<dyn Checker>)
            })
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateName { .. }));
    }

    #[test]
    fn sealed_catalog_rejects_registration() {
        let mut catalog = PluginCatalog::builtin().unwrap();
        let err = catalog
            .register_checker("noop", "late", ParamSchema::empty(), |_| {
                Ok(Arc::new(Noop) as Arc<dyn Checker>)
            })
            .unwrap_err();
        assert!(matches!(err, RegistryError::Sealed { .. }));
    }

    #[test]
    fn list_params_shows_schemas() {
        let catalog = PluginCatalog::builtin().unwrap();
        let listing = catalog.list_params();
        assert!(listing.contains("caesar (cracker)"));
        assert!(listing.contains("max_shift"));
        assert!(listing.contains("needle"));
        assert!(listing.contains("required"));
        let described = catalog.describe();
        assert_eq!(described[0].role, Role::Searcher);
        assert_eq!(described.len(), 1 + 4 + 10);
    }

    #[test]
    fn resolve_through_role_registry() {
        let catalog = PluginCatalog::builtin().unwrap();
        let mut params = ParamMap::new();
        params.insert("max_shift".into(), "30".into());
        let err = catalog.crackers().resolve("caesar", &params).unwrap_err();
        assert_eq!(err.plugin(), "caesar");
    }
}
