//! Substring and printability checkers.

use std::sync::Arc;

use unravel_kernel::carrier::value::Value;
use unravel_kernel::plugin::params::{ParamError, ParamSchema, ParamSpec};
use unravel_kernel::plugin::registry::{PluginRegistry, RegistryError};
use unravel_search::contract::{CheckOutcome, Checker};

use super::{printable_ratio, readable};

/// Register `contains` and `printable`.
///
/// # Errors
///
/// Returns [`RegistryError`] on a name clash or a sealed registry.
pub fn register(registry: &mut PluginRegistry<dyn Checker>) -> Result<(), RegistryError> {
    registry.register(
        "contains",
        "Accept values containing a needle, such as a flag prefix",
        ParamSchema::new(vec![
            ParamSpec::string("needle", "", "substring to look for").required(),
            ParamSpec::bool("case_sensitive", false, "match case exactly"),
        ]),
        |params| {
            let needle = params.get_str("needle").unwrap_or_default();
            if needle.is_empty() {
                return Err(ParamError::Rejected {
                    name: "needle".into(),
                    detail: "must not be empty".into(),
                });
            }
            let case_sensitive = params.get_bool("case_sensitive").unwrap_or(false);
            Ok(Arc::new(Contains::new(needle, case_sensitive)) as Arc<dyn Checker>)
        },
    )?;
    registry.register(
        "printable",
        "Score by the fraction of printable characters",
        ParamSchema::new(vec![ParamSpec::float(
            "min_ratio",
            0.5,
            0.0,
            1.0,
            "reject below this printable fraction",
        )]),
        |params| {
            let min_ratio = params.get_float("min_ratio").unwrap_or(0.5);
            Ok(Arc::new(Printable { min_ratio }) as Arc<dyn Checker>)
        },
    )
}

#[derive(Debug, Clone)]
pub struct Contains {
    needle: String,
    case_sensitive: bool,
}

impl Contains {
    #[must_use]
    pub fn new(needle: &str, case_sensitive: bool) -> Self {
        let needle = if case_sensitive {
            needle.to_string()
        } else {
            needle.to_lowercase()
        };
        Self {
            needle,
            case_sensitive,
        }
    }
}

impl Checker for Contains {
    fn name(&self) -> &str {
        "contains"
    }

    fn check(&self, value: &Value) -> CheckOutcome {
        let found = match readable(value) {
            Some(text) if self.case_sensitive => text.contains(&self.needle),
            Some(text) => text.to_lowercase().contains(&self.needle),
            None => false,
        };
        if found {
            CheckOutcome::Accept
        } else {
            CheckOutcome::Reject
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Printable {
    min_ratio: f64,
}

impl Checker for Printable {
    fn name(&self) -> &str {
        "printable"
    }

    fn check(&self, value: &Value) -> CheckOutcome {
        let ratio = printable_ratio(value);
        if ratio < self.min_ratio || ratio <= 0.0 {
            CheckOutcome::Reject
        } else {
            CheckOutcome::Score(ratio)
        }
    }
}
