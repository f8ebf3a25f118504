//! Common types and utilities for the tsbridge crates.
//!
//! This crate provides foundational types used across all tsbridge crates:
//! - Path normalization and the per-session resolve cache (`PathNormalizer`)
//! - The opaque compiler option bag handed around by the build driver (`CompilerOptions`)
//! - The watch-status diagnostic vocabulary reported by the build driver

// Path normalization - slash canonicalization, absolute resolution, caching
pub mod paths;
pub use paths::PathNormalizer;

// Compiler option bag with shallow merge semantics
pub mod options;
pub use options::CompilerOptions;

// Watch status diagnostics
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory, WatchStatus, diagnostic_codes};

#[cfg(test)]
#[path = "tests/paths_tests.rs"]
mod paths_tests;
#[cfg(test)]
#[path = "tests/options_tests.rs"]
mod options_tests;
