//! Plugin module: parameter schemas and the name-keyed registry.

pub mod params;
pub mod registry;
