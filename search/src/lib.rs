//! Unravel Search: best-first search over chains of decoding operations.
//!
//! This crate provides the search layer. It depends only on
//! `unravel_kernel`; it does NOT depend on `unravel_harness`, which owns
//! the concrete crackers, checkers and configuration.
//!
//! # Crate dependency graph
//!
//! ```text
//! unravel_kernel  ←  unravel_search  ←  unravel_harness
//! (values, params)   (frontier, engine)  (plugins, config, runner)
//! ```
//!
//! # Key types
//!
//! - [`contract::Cracker`] / [`contract::Checker`] -- plugin contracts
//! - [`contract::PluginSet`] -- the instantiated plugins for one run
//! - [`policy::SearchPolicy`] -- budgets, worker count and check combination
//! - [`search::search`] -- the engine entry point
//! - [`result::SearchReport`] -- outcome, accepted path and counters

#![forbid(unsafe_code)]

pub mod contract;
pub mod control;
pub mod error;
pub mod frontier;
pub mod node;
pub mod policy;
pub mod progress;
pub mod result;
pub mod scorer;
pub mod search;
mod workers;

pub use contract::{CheckOutcome, Checker, CrackOutput, Cracker, CrackerError, PluginSet, Searcher};
pub use control::{CancelToken, SearchControl};
pub use error::SearchError;
pub use policy::SearchPolicy;
pub use result::{SearchOutcome, SearchReport, SearchResultV1};
pub use search::{search, BestFirstSearcher};
