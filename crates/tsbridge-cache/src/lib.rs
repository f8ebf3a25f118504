//! In-memory file repository shared between a TypeScript build driver and a
//! bundler.
//!
//! The build driver writes into it (sources, output paths, output text, import
//! declarations) and the bundler reads from it to resolve imports and load
//! compiled code without touching disk.

pub mod definitions;
pub use definitions::{
    Context, ContextPathData, ContextType, DeclarationContext, File, FileId, FileKind, PackageId,
};

pub mod contexts_map;
pub use contexts_map::ContextsMap;

pub mod contexts_collection;
pub use contexts_collection::ContextsCollection;

pub mod repository;
pub use repository::{FileRepositoryCache, SharedRepository};

#[cfg(test)]
#[path = "tests/contexts_collection_tests.rs"]
mod contexts_collection_tests;
#[cfg(test)]
#[path = "tests/definitions_tests.rs"]
mod definitions_tests;
