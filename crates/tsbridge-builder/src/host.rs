//! Boundaries to the collaborators this crate drives but does not implement:
//! the filesystem, the module resolver, the output-path naming rules, and the
//! incremental solution-build driver itself.

use anyhow::Result;
use tsbridge_cache::{ContextType, PackageId};
use tsbridge_common::CompilerOptions;

use crate::build_mode::BuildModeKind;

/// Filesystem queries the driver and the resolver need.
pub trait System {
    fn file_exists(&self, path: &str) -> bool;
    fn directory_exists(&self, path: &str) -> bool;
    fn read_file(&self, path: &str) -> Option<String>;
    fn use_case_sensitive_file_names(&self) -> bool {
        true
    }
}

/// [`System`] backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeSystem;

impl System for NativeSystem {
    fn file_exists(&self, path: &str) -> bool {
        std::fs::metadata(path).is_ok_and(|meta| meta.is_file())
    }

    fn directory_exists(&self, path: &str) -> bool {
        std::fs::metadata(path).is_ok_and(|meta| meta.is_dir())
    }

    fn read_file(&self, path: &str) -> Option<String> {
        std::fs::read_to_string(path).ok()
    }

    fn use_case_sensitive_file_names(&self) -> bool {
        !cfg!(any(windows, target_os = "macos"))
    }
}

/// A successful module resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModuleFull {
    pub resolved_file_name: String,
    /// Extension of the resolved file, e.g. `.ts` or `.d.ts`.
    pub extension: String,
    pub is_external_library_import: bool,
    pub package_id: Option<PackageId>,
}

pub trait ModuleNameResolver {
    /// Resolve `module_name` as imported from `containing_file`. `host` answers
    /// filesystem queries, including for files that only exist in memory.
    fn resolve_module_name(
        &self,
        module_name: &str,
        containing_file: &str,
        options: &CompilerOptions,
        host: &dyn System,
    ) -> Option<ResolvedModuleFull>;
}

/// Paths the driver will emit for one source file. Any of them may be absent
/// depending on the compiler options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputFileNames {
    pub output: Option<String>,
    pub declaration: Option<String>,
    pub source_map: Option<String>,
}

impl OutputFileNames {
    /// Present outputs paired with the context type they are tracked as.
    pub fn iter(&self) -> impl Iterator<Item = (ContextType, &str)> {
        [
            (ContextType::Destination, self.output.as_deref()),
            (ContextType::Definition, self.declaration.as_deref()),
            (ContextType::SourceMap, self.source_map.as_deref()),
        ]
        .into_iter()
        .filter_map(|(kind, path)| path.map(|path| (kind, path)))
    }
}

pub trait OutputNamer {
    fn output_file_names(
        &self,
        options: &CompilerOptions,
        file_name: &str,
        ignore_case: bool,
    ) -> OutputFileNames;
}

/// A source file of a project, as reported by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub file_name: String,
    pub text: String,
    pub is_declaration_file: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidatedProjectKind {
    Build,
    UpdateBundle,
    UpdateOutputFileStamps,
}

/// A project the driver has scheduled for re-validation in the current pass.
pub trait InvalidatedProject {
    fn kind(&self) -> InvalidatedProjectKind;

    /// The project identifier, usually the path of its config file.
    fn project(&self) -> &str;

    fn compiler_options(&self) -> CompilerOptions;

    /// Source files of the project. May create the project's program, which
    /// consults [`SolutionBuilderHost::create_program_options`].
    fn source_files(&mut self, host: &mut dyn SolutionBuilderHost) -> Result<Vec<SourceFile>>;

    fn is_source_file_from_external_library(&self, file: &SourceFile) -> bool;

    fn is_source_file_default_library(&self, file: &SourceFile) -> bool;

    /// Finish the project. Emits its outputs through [`SolutionBuilderHost::write_file`].
    fn done(self: Box<Self>, host: &mut dyn SolutionBuilderHost) -> Result<()>;
}

/// The override points the driver calls back into.
pub trait SolutionBuilderHost: System {
    fn write_file(&mut self, path: &str, data: &str);

    fn resolve_module_names(
        &mut self,
        module_names: &[String],
        containing_file: &str,
        options: &CompilerOptions,
    ) -> Vec<Option<ResolvedModuleFull>>;

    /// Final options for a program about to be created for the active project.
    fn create_program_options(&mut self, options: CompilerOptions) -> Result<CompilerOptions>;
}

/// The incremental multi-project build driver.
pub trait SolutionBuilder {
    fn next_invalidated_project(
        &mut self,
        host: &mut dyn SolutionBuilderHost,
    ) -> Result<Option<Box<dyn InvalidatedProject>>>;

    /// Build everything that is still out of date.
    fn build(&mut self, host: &mut dyn SolutionBuilderHost) -> Result<()>;
}

pub trait SolutionBuilderFactory {
    fn create_solution_builder(
        &self,
        mode: BuildModeKind,
        root_names: &[String],
    ) -> Result<Box<dyn SolutionBuilder>>;
}
