//! Configuration resolution.
//!
//! Three layers, lowest precedence first:
//!
//! ```text
//! built-in defaults  <  TOML config file  <  plugin.name=value tokens
//! ```
//!
//! [`ConfigBuilder`] collects the layers; [`ConfigBuilder::build`] resolves
//! every selected plugin through a sealed [`PluginCatalog`] and returns an
//! immutable [`Configuration`]. All validation happens in `build`, so a
//! configuration that exists is one the search can run.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;
use unravel_kernel::carrier::value::Format;
use unravel_kernel::plugin::params::{ParamMap, ResolvedParams};
use unravel_kernel::plugin::registry::{RegistryError, Resolved};
use unravel_kernel::proof::canon::{canonical_json_bytes, canonical_json_digest, CanonError};
use unravel_kernel::proof::hash::{ContentHash, DOMAIN_CONFIG_SNAPSHOT};
use unravel_search::contract::{Checker, Cracker, PluginSet, Searcher};
use unravel_search::search::BEST_FIRST;

use crate::catalog::{PluginCatalog, Role};
use crate::checkers::frequency::ENGLISH_FREQUENCY;

/// Built-in checker selection.
pub const DEFAULT_CHECKERS: &[&str] = &["wordlist", "english_frequency"];

/// Built-in cracker selection, in expansion order.
pub const DEFAULT_CRACKERS: &[&str] = &[
    "base64", "base32", "hex", "binary", "decimal", "caesar", "atbash", "reverse", "rot47", "url",
];

/// Configuration failure. Always names the offending plugin, parameter or file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("`{name}` is a {actual}, not a {expected}")]
    WrongRole {
        name: String,
        expected: Role,
        actual: Role,
    },
    #[error("no {role} configured")]
    EmptyRole { role: Role },
    #[error("{role} `{name}` is listed more than once")]
    DuplicateSelection { role: Role, name: String },
    #[error("unknown format `{0}` (expected `text` or `bytes`)")]
    UnknownFormat(String),
    #[error("cracker `{cracker}` does not support {format} values")]
    UnsupportedFormat { cracker: String, format: Format },
    #[error("input cannot be used as {expected}: {detail}")]
    FormatMismatch { expected: Format, detail: String },
    #[error("malformed parameter token `{token}` (expected plugin.name=value)")]
    Token { token: String },
    #[error("config file parameter `{plugin}.{name}`: {detail}")]
    FileParam {
        plugin: String,
        name: String,
        detail: String,
    },
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("cannot read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("plugin catalog must be sealed before a configuration is built")]
    Unsealed,
}

/// On-disk configuration. Every field is optional; absent fields keep the
/// lower layer's value.
///
/// ```toml
/// searcher = "best_first"
/// checkers = ["contains", "wordlist"]
/// format = "text"
/// verbosity = 1
///
/// [params.contains]
/// needle = "flag{"
///
/// [params.best_first]
/// max_depth = 6
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub searcher: Option<String>,
    pub checkers: Option<Vec<String>>,
    pub crackers: Option<Vec<String>>,
    pub format: Option<String>,
    pub verbosity: Option<i32>,
    /// Shorthand for the searcher's `combine` parameter.
    pub combine: Option<String>,
    /// Shorthand for `english_frequency.dist`.
    pub default_dist: Option<Vec<f64>>,
    pub params: BTreeMap<String, BTreeMap<String, toml::Value>>,
}

impl ConfigFile {
    /// Parse TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for invalid TOML or unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`Self::from_toml_str`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

/// Render a TOML scalar (or array of scalars) as a raw parameter string.
fn raw_param(plugin: &str, name: &str, value: &toml::Value) -> Result<String, ConfigError> {
    let unsupported = |what: &str| ConfigError::FileParam {
        plugin: plugin.to_string(),
        name: name.to_string(),
        detail: format!("{what} values are not supported"),
    };
    match value {
        toml::Value::String(s) => Ok(s.clone()),
        toml::Value::Integer(i) => Ok(i.to_string()),
        toml::Value::Float(f) => Ok(f.to_string()),
        toml::Value::Boolean(b) => Ok(b.to_string()),
        toml::Value::Array(items) => {
            let parts = items
                .iter()
                .map(|item| match item {
                    toml::Value::Array(_) | toml::Value::Table(_) => Err(unsupported("nested")),
                    scalar => raw_param(plugin, name, scalar),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(parts.join(","))
        }
        toml::Value::Datetime(_) => Err(unsupported("datetime")),
        toml::Value::Table(_) => Err(unsupported("table")),
    }
}

/// Split `plugin.name=value` into its parts.
///
/// The value is everything after the first `=`; the plugin is everything
/// before the first `.` of the key.
///
/// # Errors
///
/// Returns [`ConfigError::Token`] if either separator is missing or a key
/// part is empty.
pub fn parse_param_token(token: &str) -> Result<(String, String, String), ConfigError> {
    let malformed = || ConfigError::Token {
        token: token.to_string(),
    };
    let (key, value) = token.split_once('=').ok_or_else(malformed)?;
    let (plugin, name) = key.split_once('.').ok_or_else(malformed)?;
    let (plugin, name) = (plugin.trim(), name.trim());
    if plugin.is_empty() || name.is_empty() {
        return Err(malformed());
    }
    Ok((plugin.to_string(), name.to_string(), value.to_string()))
}

/// Collects configuration layers.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigBuilder {
    searcher: String,
    checkers: Vec<String>,
    crackers: Vec<String>,
    format: Format,
    verbosity: i32,
    combine: Option<String>,
    default_dist: Option<String>,
    params: BTreeMap<String, ParamMap>,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            searcher: BEST_FIRST.to_string(),
            checkers: DEFAULT_CHECKERS.iter().map(|s| (*s).to_string()).collect(),
            crackers: DEFAULT_CRACKERS.iter().map(|s| (*s).to_string()).collect(),
            format: Format::Text,
            verbosity: 0,
            combine: None,
            default_dist: None,
            params: BTreeMap::new(),
        }
    }
}

impl ConfigBuilder {
    /// Built-in defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Layer a config file over the current values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownFormat`] or [`ConfigError::FileParam`].
    pub fn apply_file(&mut self, file: &ConfigFile) -> Result<&mut Self, ConfigError> {
        if let Some(searcher) = &file.searcher {
            self.searcher.clone_from(searcher);
        }
        if let Some(checkers) = &file.checkers {
            self.checkers.clone_from(checkers);
        }
        if let Some(crackers) = &file.crackers {
            self.crackers.clone_from(crackers);
        }
        if let Some(format) = &file.format {
            self.set_format(format)?;
        }
        if let Some(verbosity) = file.verbosity {
            self.verbosity = verbosity;
        }
        if let Some(combine) = &file.combine {
            self.combine = Some(combine.clone());
        }
        if let Some(dist) = &file.default_dist {
            self.default_dist(dist);
        }
        for (plugin, params) in &file.params {
            for (name, value) in params {
                let raw = raw_param(plugin, name, value)?;
                self.override_param(plugin, name, &raw);
            }
        }
        Ok(self)
    }

    pub fn searcher(&mut self, name: &str) -> &mut Self {
        self.searcher = name.to_string();
        self
    }

    pub fn checkers<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.checkers = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn crackers<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.crackers = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn format(&mut self, format: Format) -> &mut Self {
        self.format = format;
        self
    }

    /// Set the format by name (`text` or `bytes`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownFormat`].
    pub fn set_format(&mut self, name: &str) -> Result<&mut Self, ConfigError> {
        self.format = Format::parse(name).ok_or_else(|| ConfigError::UnknownFormat(name.to_string()))?;
        Ok(self)
    }

    pub fn verbosity(&mut self, verbosity: i32) -> &mut Self {
        self.verbosity = verbosity;
        self
    }

    /// Reference letter distribution for `english_frequency`, `a..=z`.
    /// Validated when the configuration is built.
    pub fn default_dist(&mut self, dist: &[f64]) -> &mut Self {
        let joined: Vec<String> = dist.iter().map(ToString::to_string).collect();
        self.default_dist = Some(joined.join(","));
        self
    }

    /// Shift verbosity relative to the layers below (`-v` adds, `-q` subtracts).
    pub fn adjust_verbosity(&mut self, delta: i32) -> &mut Self {
        self.verbosity = self.verbosity.saturating_add(delta);
        self
    }

    /// Set one raw parameter, replacing any lower-layer value.
    pub fn override_param(&mut self, plugin: &str, name: &str, value: &str) -> &mut Self {
        self.params
            .entry(plugin.to_string())
            .or_default()
            .insert(name.to_string(), value.to_string());
        self
    }

    /// Apply a `plugin.name=value` token.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Token`] for a malformed token.
    pub fn apply_token(&mut self, token: &str) -> Result<&mut Self, ConfigError> {
        let (plugin, name, value) = parse_param_token(token)?;
        Ok(self.override_param(&plugin, &name, &value))
    }

    /// Apply tokens in order; later tokens win.
    ///
    /// # Errors
    ///
    /// Stops at the first malformed token.
    pub fn apply_tokens<'a>(
        &mut self,
        tokens: impl IntoIterator<Item = &'a str>,
    ) -> Result<&mut Self, ConfigError> {
        for token in tokens {
            self.apply_token(token)?;
        }
        Ok(self)
    }

    /// Raw parameters for `plugin` with the shorthands folded in: `combine`
    /// for the searcher, `default_dist` for `english_frequency`. An explicit
    /// parameter wins over its shorthand.
    fn raw_params(&self, plugin: &str) -> ParamMap {
        let mut raw = self.params.get(plugin).cloned().unwrap_or_default();
        let shorthand = if plugin == self.searcher {
            self.combine.as_ref().map(|v| ("combine", v))
        } else if plugin == ENGLISH_FREQUENCY {
            self.default_dist.as_ref().map(|v| ("dist", v))
        } else {
            None
        };
        if let Some((name, value)) = shorthand {
            raw.entry(name.to_string()).or_insert_with(|| value.clone());
        }
        raw
    }

    fn check_role(catalog: &PluginCatalog, name: &str, expected: Role) -> Result<(), ConfigError> {
        match catalog.role_of(name) {
            Some(actual) if actual != expected => Err(ConfigError::WrongRole {
                name: name.to_string(),
                expected,
                actual,
            }),
            Some(_) => Ok(()),
            None => Err(RegistryError::UnknownPlugin {
                name: name.to_string(),
            }
            .into()),
        }
    }

    fn check_selection(names: &[String], role: Role) -> Result<(), ConfigError> {
        if names.is_empty() {
            return Err(ConfigError::EmptyRole { role });
        }
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(ConfigError::DuplicateSelection {
                    role,
                    name: name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Resolve every selected plugin and freeze the result.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found: unsealed catalog, unknown or
    /// misplaced plugin names, parameters for unknown plugins, invalid
    /// parameters, empty or duplicated selections, or a cracker that does
    /// not support the run format.
    pub fn build(&self, catalog: &PluginCatalog) -> Result<Configuration, ConfigError> {
        if !catalog.is_sealed() {
            return Err(ConfigError::Unsealed);
        }
        for plugin in self.params.keys() {
            if catalog.role_of(plugin).is_none() {
                return Err(RegistryError::UnknownPlugin {
                    name: plugin.clone(),
                }
                .into());
            }
        }
        Self::check_selection(&self.checkers, Role::Checker)?;
        Self::check_selection(&self.crackers, Role::Cracker)?;

        Self::check_role(catalog, &self.searcher, Role::Searcher)?;
        let searcher = catalog
            .searchers()
            .resolve(&self.searcher, &self.raw_params(&self.searcher))?;

        let mut checkers = Vec::with_capacity(self.checkers.len());
        for name in &self.checkers {
            Self::check_role(catalog, name, Role::Checker)?;
            checkers.push(catalog.checkers().resolve(name, &self.raw_params(name))?);
        }

        let mut crackers = Vec::with_capacity(self.crackers.len());
        for name in &self.crackers {
            Self::check_role(catalog, name, Role::Cracker)?;
            let resolved = catalog.crackers().resolve(name, &self.raw_params(name))?;
            if !resolved.instance.formats().contains(&self.format) {
                return Err(ConfigError::UnsupportedFormat {
                    cracker: name.clone(),
                    format: self.format,
                });
            }
            crackers.push(resolved);
        }

        let config = Configuration {
            searcher,
            checkers,
            crackers,
            format: self.format,
            verbosity: self.verbosity,
        };
        debug!(
            searcher = %config.searcher.name,
            checkers = config.checkers.len(),
            crackers = config.crackers.len(),
            format = %config.format,
            "configuration built"
        );
        Ok(config)
    }
}

/// A resolved, read-only configuration.
#[derive(Debug, Clone)]
pub struct Configuration {
    pub searcher: Resolved<dyn Searcher>,
    /// In consultation order.
    pub checkers: Vec<Resolved<dyn Checker>>,
    /// In expansion order.
    pub crackers: Vec<Resolved<dyn Cracker>>,
    pub format: Format,
    pub verbosity: i32,
}

impl Configuration {
    /// The instantiated plugins as the search engine consumes them.
    #[must_use]
    pub fn plugin_set(&self) -> PluginSet {
        PluginSet::new(
            self.format,
            self.crackers.iter().map(|r| r.instance.clone()).collect(),
            self.checkers.iter().map(|r| r.instance.clone()).collect(),
        )
    }

    /// Resolved parameters keyed by plugin name.
    #[must_use]
    pub fn params(&self) -> BTreeMap<&str, &ResolvedParams> {
        std::iter::once((self.searcher.name.as_str(), &self.searcher.params))
            .chain(self.checkers.iter().map(|r| (r.name.as_str(), &r.params)))
            .chain(self.crackers.iter().map(|r| (r.name.as_str(), &r.params)))
            .collect()
    }

    /// Deterministic description of everything that influences a search.
    #[must_use]
    pub fn snapshot(&self) -> serde_json::Value {
        let entry = |name: &str, params: &ResolvedParams| {
            serde_json::json!({ "name": name, "params": params.to_json_value() })
        };
        serde_json::json!({
            "format": self.format.as_str(),
            "verbosity": self.verbosity,
            "searcher": entry(&self.searcher.name, &self.searcher.params),
            "checkers": self.checkers.iter().map(|r| entry(&r.name, &r.params)).collect::<Vec<_>>(),
            "crackers": self.crackers.iter().map(|r| entry(&r.name, &r.params)).collect::<Vec<_>>(),
        })
    }

    /// Canonical JSON bytes of [`Self::snapshot`].
    ///
    /// # Errors
    ///
    /// Returns [`CanonError`] if the snapshot contains a non-integer number.
    pub fn snapshot_bytes(&self) -> Result<Vec<u8>, CanonError> {
        canonical_json_bytes(&self.snapshot())
    }

    /// Content digest of the snapshot.
    ///
    /// # Errors
    ///
    /// See [`Self::snapshot_bytes`].
    pub fn digest(&self) -> Result<ContentHash, CanonError> {
        canonical_json_digest(DOMAIN_CONFIG_SNAPSHOT, &self.snapshot())
    }
}
