//! vocalis-lib — Skill webhook engine.
//!
//! Gemini client, response assembly, keep-alive task, and HTTP API.
//! Depends on vocalis-core for pure types and text processing.

pub mod assembler;
pub mod config;
pub mod keepalive;
pub mod provider;
pub mod random;
pub mod server;

// Re-export vocalis-core for convenience
pub use vocalis_core;
