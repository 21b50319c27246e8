//! Searcher registrations and the parameter-to-policy mapping.

use std::sync::Arc;
use std::time::Duration;

use unravel_kernel::plugin::params::{ParamError, ParamSchema, ParamSpec, ResolvedParams};
use unravel_kernel::plugin::registry::{PluginRegistry, RegistryError};
use unravel_search::contract::Searcher;
use unravel_search::policy::{SearchPolicy, MAX_WORKERS};
use unravel_search::scorer::CheckCombine;
use unravel_search::search::{BestFirstSearcher, BEST_FIRST};

/// Parameters accepted by `best_first`.
#[must_use]
pub fn best_first_schema() -> ParamSchema {
    let defaults = SearchPolicy::default();
    let max_workers = i64::try_from(MAX_WORKERS).unwrap_or(i64::MAX);
    ParamSchema::new(vec![
        ParamSpec::int(
            "max_depth",
            i64::from(defaults.max_depth),
            1,
            i64::from(u32::MAX),
            "longest decode chain considered",
        ),
        ParamSpec::int("max_expansions", 10_000, 1, i64::MAX, "hard cap on expanded nodes"),
        ParamSpec::int("max_frontier_size", 100_000, 1, i64::MAX, "frontier prune threshold"),
        ParamSpec::int(
            "max_candidates",
            1_000,
            1,
            i64::MAX,
            "candidate cap per expanded node",
        ),
        ParamSpec::int("workers", 1, 1, max_workers, "parallel expansion threads"),
        ParamSpec::int("timeout_ms", 0, 0, i64::MAX, "wall-clock budget (0 = none)"),
        ParamSpec::bool("accept_root", defaults.accept_root, "check the ciphertext itself first"),
        ParamSpec::string("combine", defaults.combine.as_str(), "checker combination: max | mean"),
    ])
}

/// Build a [`SearchPolicy`] from resolved `best_first` parameters.
///
/// # Errors
///
/// Returns [`ParamError`] if a value cannot be represented in the policy
/// or `combine` names an unknown rule.
pub fn policy_from_params(params: &ResolvedParams) -> Result<SearchPolicy, ParamError> {
    fn int<T: TryFrom<i64>>(params: &ResolvedParams, name: &str) -> Result<T, ParamError> {
        let raw = params.get_int(name).ok_or_else(|| ParamError::Missing {
            name: name.to_string(),
        })?;
        T::try_from(raw).map_err(|_| ParamError::Rejected {
            name: name.to_string(),
            detail: format!("{raw} does not fit"),
        })
    }

    let combine_raw = params.get_str("combine").unwrap_or("max");
    let combine = CheckCombine::parse(combine_raw).ok_or_else(|| ParamError::Rejected {
        name: "combine".into(),
        detail: format!("unknown rule {combine_raw:?} (expected max or mean)"),
    })?;
    let timeout_ms: u64 = int(params, "timeout_ms")?;
    Ok(SearchPolicy {
        max_depth: int(params, "max_depth")?,
        max_expansions: int(params, "max_expansions")?,
        max_frontier_size: int(params, "max_frontier_size")?,
        max_candidates_per_node: int(params, "max_candidates")?,
        workers: int(params, "workers")?,
        timeout: (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms)),
        accept_root: params.get_bool("accept_root").unwrap_or(true),
        combine,
    })
}

/// Register every built-in searcher.
///
/// # Errors
///
/// Returns [`RegistryError`] on a name clash or a sealed registry.
pub fn register_builtins(registry: &mut PluginRegistry<dyn Searcher>) -> Result<(), RegistryError> {
    registry.register(
        BEST_FIRST,
        "Best-first search ordered by checker score, then depth",
        best_first_schema(),
        |params| {
            let policy = policy_from_params(params)?;
            Ok(Arc::new(BestFirstSearcher::new(policy)) as Arc<dyn Searcher>)
        },
    )
}
