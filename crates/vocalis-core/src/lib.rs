//! vocalis-core — Pure types and text processing.
//!
//! No async runtime, no I/O, no platform dependencies.

pub mod sanitize;
pub mod ssml;
pub mod types;
