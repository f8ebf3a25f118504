//! Bundler-facing adapter for the tsbridge repository.
//!
//! [`TypescriptPlugin`] runs the solution builder at build start, answers the
//! bundler's module resolution from recorded imports, serves emitted
//! JavaScript on load once the compiler has settled, and emits consumed
//! declaration files as assets at build end.

pub mod context;
pub use context::{EmittedAsset, EmittedChunk, LoadResult, PluginContext};

pub mod typescript_plugin;
pub use typescript_plugin::{TypescriptPlugin, TypescriptPluginOptions};
