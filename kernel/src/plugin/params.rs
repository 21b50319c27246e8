//! Plugin parameter schemas and typed resolution.
//!
//! Parameters arrive as untyped strings (from a config file or a
//! `plugin.name=value` token). A [`ParamSchema`] declares which names a
//! plugin accepts, their kinds, domains and defaults; [`ParamSchema::resolve`]
//! turns a raw [`ParamMap`] into [`ResolvedParams`] or fails with the
//! offending parameter name.

use std::collections::BTreeMap;
use std::fmt;

/// Raw parameter mapping: name to unparsed value.
///
/// `BTreeMap` for deterministic iteration in snapshots.
pub type ParamMap = BTreeMap<String, String>;

/// The declared kind (and domain) of a parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamKind {
    Bool,
    /// Inclusive integer range.
    Int { min: i64, max: i64 },
    /// Inclusive float range.
    Float { min: f64, max: f64 },
    Str,
    /// Comma-separated list of strings. Empty items are dropped.
    List,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Int { min, max } => write!(f, "int in {min}..={max}"),
            Self::Float { min, max } => write!(f, "float in {min}..={max}"),
            Self::Str => f.write_str("string"),
            Self::List => f.write_str("comma-separated list"),
        }
    }
}

/// A typed parameter value after resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<String>),
}

impl ParamValue {
    /// Stable string form (used in config snapshots).
    #[must_use]
    pub fn to_canonical_string(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(x) => format!("{x:?}"),
            Self::Str(s) => s.clone(),
            Self::List(items) => items.join(","),
        }
    }
}

/// Declaration of a single parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    /// Raw default; `None` makes the parameter required.
    pub default: Option<String>,
    pub description: &'static str,
}

impl ParamSpec {
    #[must_use]
    pub fn bool(name: &'static str, default: bool, description: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::Bool,
            default: Some(default.to_string()),
            description,
        }
    }

    #[must_use]
    pub fn int(
        name: &'static str,
        default: i64,
        min: i64,
        max: i64,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            kind: ParamKind::Int { min, max },
            default: Some(default.to_string()),
            description,
        }
    }

    #[must_use]
    pub fn float(
        name: &'static str,
        default: f64,
        min: f64,
        max: f64,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            kind: ParamKind::Float { min, max },
            default: Some(format!("{default:?}")),
            description,
        }
    }

    #[must_use]
    pub fn string(name: &'static str, default: &str, description: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::Str,
            default: Some(default.to_string()),
            description,
        }
    }

    #[must_use]
    pub fn list(name: &'static str, default: &[&str], description: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::List,
            default: Some(default.join(",")),
            description,
        }
    }

    /// Mark this parameter as required (drops the default).
    #[must_use]
    pub fn required(mut self) -> Self {
        self.default = None;
        self
    }

    fn parse(&self, raw: &str) -> Result<ParamValue, ParamError> {
        let malformed = || ParamError::Malformed {
            name: self.name.to_string(),
            value: raw.to_string(),
            expected: self.kind.to_string(),
        };
        let out_of_range = || ParamError::OutOfRange {
            name: self.name.to_string(),
            value: raw.to_string(),
            domain: self.kind.to_string(),
        };
        let trimmed = raw.trim();
        match &self.kind {
            ParamKind::Bool => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" | "on" => Ok(ParamValue::Bool(true)),
                "false" | "no" | "0" | "off" => Ok(ParamValue::Bool(false)),
                _ => Err(malformed()),
            },
            ParamKind::Int { min, max } => {
                let v: i64 = trimmed.parse().map_err(|_| malformed())?;
                if v < *min || v > *max {
                    return Err(out_of_range());
                }
                Ok(ParamValue::Int(v))
            }
            ParamKind::Float { min, max } => {
                let v: f64 = trimmed.parse().map_err(|_| malformed())?;
                if !v.is_finite() {
                    return Err(malformed());
                }
                if v < *min || v > *max {
                    return Err(out_of_range());
                }
                Ok(ParamValue::Float(v))
            }
            ParamKind::Str => Ok(ParamValue::Str(raw.to_string())),
            ParamKind::List => Ok(ParamValue::List(
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
            )),
        }
    }
}

/// Parameter validation failure. Always names the parameter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParamError {
    #[error("unknown parameter `{name}`")]
    UnknownParameter { name: String },
    #[error("missing required parameter `{name}`")]
    Missing { name: String },
    #[error("parameter `{name}`: cannot parse {value:?} as {expected}")]
    Malformed {
        name: String,
        value: String,
        expected: String,
    },
    #[error("parameter `{name}`: {value:?} outside {domain}")]
    OutOfRange {
        name: String,
        value: String,
        domain: String,
    },
    /// A factory rejected an otherwise well-typed value.
    #[error("parameter `{name}`: {detail}")]
    Rejected { name: String, detail: String },
}

impl ParamError {
    /// The name of the offending parameter.
    #[must_use]
    pub fn parameter(&self) -> &str {
        match self {
            Self::UnknownParameter { name }
            | Self::Missing { name }
            | Self::Malformed { name, .. }
            | Self::OutOfRange { name, .. }
            | Self::Rejected { name, .. } => name,
        }
    }
}

/// The set of parameters a plugin accepts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamSchema {
    specs: Vec<ParamSpec>,
}

impl ParamSchema {
    /// A schema that accepts no parameters.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn new(specs: Vec<ParamSpec>) -> Self {
        Self { specs }
    }

    /// Declared parameters, in declaration order.
    #[must_use]
    pub fn specs(&self) -> &[ParamSpec] {
        &self.specs
    }

    #[must_use]
    pub fn spec(&self, name: &str) -> Option<&ParamSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    /// Validate `raw` against this schema, filling in defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError`] for unknown names, missing required values,
    /// unparseable values or values outside the declared domain.
    pub fn resolve(&self, raw: &ParamMap) -> Result<ResolvedParams, ParamError> {
        if let Some(unknown) = raw.keys().find(|k| self.spec(k).is_none()) {
            return Err(ParamError::UnknownParameter {
                name: unknown.clone(),
            });
        }
        let mut values = BTreeMap::new();
        for spec in &self.specs {
            let raw_value = match (raw.get(spec.name), &spec.default) {
                (Some(v), _) => v.as_str(),
                (None, Some(d)) => d.as_str(),
                (None, None) => {
                    return Err(ParamError::Missing {
                        name: spec.name.to_string(),
                    })
                }
            };
            values.insert(spec.name.to_string(), spec.parse(raw_value)?);
        }
        Ok(ResolvedParams { values })
    }
}

/// Typed, validated parameters handed to a plugin factory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedParams {
    values: BTreeMap<String, ParamValue>,
}

impl ResolvedParams {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    #[must_use]
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.values.get(name) {
            Some(ParamValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_int(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(ParamValue::Int(i)) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_float(&self, name: &str) -> Option<f64> {
        match self.values.get(name) {
            Some(ParamValue::Float(x)) => Some(*x),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(ParamValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_list(&self, name: &str) -> Option<&[String]> {
        match self.values.get(name) {
            Some(ParamValue::List(items)) => Some(items),
            _ => None,
        }
    }

    /// Iterate in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Snapshot form: name to canonical string.
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .values
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.to_canonical_string())))
            .collect();
        serde_json::Value::Object(map)
    }
}
