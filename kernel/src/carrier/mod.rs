//! Carrier module: the payload flowing through a search.

pub mod value;
