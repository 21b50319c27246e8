//! Proof module: canonical hashing and canonical JSON serialization.
//!
//! Depends on nothing internal.

pub mod canon;
pub mod hash;
