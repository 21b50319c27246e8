//! Unravel Kernel: the value model and plugin plumbing shared by every crate.
//!
//! # Module Dependency Direction
//!
//! `proof` ← `carrier` ← `plugin`
//!
//! - [`carrier`] -- the [`carrier::value::Value`] payload and run [`carrier::value::Format`]
//! - [`proof`] -- canonical hashing and canonical JSON
//! - [`plugin`] -- parameter schemas and the name-keyed plugin registry
//!
//! The kernel holds no process-wide mutable state and performs no I/O.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod carrier;
pub mod plugin;
pub mod proof;
