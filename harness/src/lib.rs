//! Unravel Harness: built-in plugins, configuration and the decrypt entry point.
//!
//! ```text
//! PluginCatalog::builtin() → ConfigBuilder::build() → runner::decrypt()
//! ```
//!
//! The harness does NOT implement search: it registers plugins, resolves
//! configuration and delegates to the searcher named in the configuration.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod catalog;
pub mod checkers;
pub mod config;
pub mod crackers;
pub mod runner;
pub mod searchers;
pub mod telemetry;

pub use catalog::{PluginCatalog, Role};
pub use config::{ConfigBuilder, ConfigError, ConfigFile, Configuration};
pub use runner::{decrypt, decrypt_with, Decryption, RunError};
