//! Solution-builder integration for the tsbridge repository.
//!
//! [`SolutionBuilderPlugin`] installs itself as the host of an incremental,
//! project-referenced build driver: file existence, reads, writes and module
//! resolution are answered from (and recorded into) the shared
//! [`FileRepositoryCache`](tsbridge_cache::FileRepositoryCache) instead of disk.
//! [`Watch`] keeps the driver's watch loop and the bundler's watch loop in step.

pub mod error;
pub use error::UsageError;

// Boundaries to the build driver, module resolver and filesystem
pub mod host;
pub use host::{
    InvalidatedProject, InvalidatedProjectKind, ModuleNameResolver, NativeSystem,
    OutputFileNames, OutputNamer, ResolvedModuleFull, SolutionBuilder, SolutionBuilderFactory,
    SolutionBuilderHost, SourceFile, System,
};

pub mod outputs;
pub use outputs::ConfiguredOutputNamer;

pub mod build_mode;
pub use build_mode::{BuildMode, BuildModeKind};

pub mod config;
pub use config::{BuilderCallbacks, SolutionBuilderConfigProcessor, SolutionBuilderOptions};

pub mod solution_builder;
pub use solution_builder::{BuilderEnvironment, HostHooks, SolutionBuilderPlugin};

pub mod watch;
pub use watch::{Watch, WatchPhase};

pub mod tracing_config;

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod config_tests;
#[cfg(test)]
#[path = "tests/host_tests.rs"]
mod host_tests;
#[cfg(test)]
#[path = "tests/outputs_tests.rs"]
mod outputs_tests;
