//! The build-driver side of the bridge.
//!
//! [`SolutionBuilderPlugin`] owns the driver and hands it a [`HostHooks`] on
//! every call. The hooks answer filesystem queries from the repository first,
//! capture emitted text into it, and record every module resolution as a
//! declaration context of the importing file.

use std::rc::Rc;

use anyhow::Result;
use indexmap::IndexMap;
use tracing::{debug, trace};
use tsbridge_cache::{Context, DeclarationContext, File, FileKind, SharedRepository};
use tsbridge_common::{CompilerOptions, Diagnostic, WatchStatus};

use crate::build_mode::BuildMode;
use crate::config::{BuilderCallbacks, SolutionBuilderConfigProcessor, SolutionBuilderOptions};
use crate::error::UsageError;
use crate::host::{
    InvalidatedProject, InvalidatedProjectKind, ModuleNameResolver, OutputNamer,
    ResolvedModuleFull, SolutionBuilderFactory, SolutionBuilderHost, System,
};

/// Collaborators the plugin delegates to.
pub struct BuilderEnvironment {
    pub factory: Box<dyn SolutionBuilderFactory>,
    pub system: Rc<dyn System>,
    pub resolver: Rc<dyn ModuleNameResolver>,
    pub output_namer: Box<dyn OutputNamer>,
}

/// Host overrides installed into the driver.
pub struct HostHooks {
    repository: SharedRepository,
    system: Rc<dyn System>,
    resolver: Rc<dyn ModuleNameResolver>,
    compiler_options: Option<CompilerOptions>,
    projects: IndexMap<String, CompilerOptions>,
    active_project: Option<String>,
}

impl HostHooks {
    pub fn repository(&self) -> &SharedRepository {
        &self.repository
    }

    pub fn active_project(&self) -> Result<&str, UsageError> {
        self.active_project
            .as_deref()
            .ok_or(UsageError::NoActiveProject)
    }
}

impl System for HostHooks {
    fn file_exists(&self, path: &str) -> bool {
        self.repository.borrow().has_file(path) || self.system.file_exists(path)
    }

    fn directory_exists(&self, path: &str) -> bool {
        self.repository.borrow().has_directory(path) || self.system.directory_exists(path)
    }

    /// Disk first; in-memory text when the file is missing or empty on disk.
    fn read_file(&self, path: &str) -> Option<String> {
        match self.system.read_file(path) {
            Some(text) if !text.is_empty() => Some(text),
            on_disk => self
                .repository
                .borrow()
                .get_context_text(path)
                .map(str::to_string)
                .or(on_disk),
        }
    }

    fn use_case_sensitive_file_names(&self) -> bool {
        self.system.use_case_sensitive_file_names()
    }
}

impl SolutionBuilderHost for HostHooks {
    /// Emitted files are kept in memory only.
    fn write_file(&mut self, path: &str, data: &str) {
        if !self
            .repository
            .borrow_mut()
            .register_text_with_context_path(path, data)
        {
            trace!(path, "dropping write for untracked output");
        }
    }

    fn resolve_module_names(
        &mut self,
        module_names: &[String],
        containing_file: &str,
        options: &CompilerOptions,
    ) -> Vec<Option<ResolvedModuleFull>> {
        let resolver = Rc::clone(&self.resolver);
        let mut resolved = Vec::with_capacity(module_names.len());
        for module_name in module_names {
            let module = resolver.resolve_module_name(module_name, containing_file, options, &*self);
            match &module {
                Some(module) => {
                    self.repository.borrow_mut().register_declaration(
                        containing_file,
                        module_name,
                        DeclarationContext {
                            dest_path: module.resolved_file_name.clone(),
                            extension: module.extension.clone(),
                            external: module.is_external_library_import,
                            package_id: module.package_id.clone(),
                        },
                    );
                }
                None => trace!(module_name = %module_name, containing_file, "unresolved import"),
            }
            resolved.push(module);
        }
        resolved
    }

    /// Global overrides first, then the active project's.
    fn create_program_options(&mut self, mut options: CompilerOptions) -> Result<CompilerOptions> {
        if let Some(global) = &self.compiler_options {
            options.merge(global);
        }
        let project = self.active_project()?.to_string();
        let key = self
            .repository
            .borrow_mut()
            .paths_mut()
            .resolve_normalize(&project);
        if let Some(overrides) = self.projects.get(&key) {
            options.merge(overrides);
        }
        Ok(options)
    }
}

/// Bridges the incremental solution builder into the repository.
pub struct SolutionBuilderPlugin {
    build_mode: Option<BuildMode>,
    hooks: HostHooks,
    callbacks: BuilderCallbacks,
    factory: Box<dyn SolutionBuilderFactory>,
    output_namer: Box<dyn OutputNamer>,
    root_names: Vec<String>,
}

impl SolutionBuilderPlugin {
    pub fn new(
        repository: SharedRepository,
        options: SolutionBuilderOptions,
        callbacks: BuilderCallbacks,
        environment: BuilderEnvironment,
    ) -> Self {
        let BuilderEnvironment {
            factory,
            system,
            resolver,
            output_namer,
        } = environment;

        let options = {
            let mut repo = repository.borrow_mut();
            SolutionBuilderConfigProcessor::process(options, repo.paths_mut(), system.as_ref())
        };

        Self {
            build_mode: None,
            hooks: HostHooks {
                repository,
                system,
                resolver,
                compiler_options: options.compiler_options,
                projects: options.projects,
                active_project: None,
            },
            callbacks,
            factory,
            output_namer,
            root_names: options.root_names,
        }
    }

    pub fn root_names(&self) -> &[String] {
        &self.root_names
    }

    pub fn compiler_options(&self) -> Option<&CompilerOptions> {
        self.hooks.compiler_options.as_ref()
    }

    /// Per-project overrides, keyed by resolved config file path.
    pub fn project_options(&self) -> &IndexMap<String, CompilerOptions> {
        &self.hooks.projects
    }

    pub fn build_mode(&self) -> Result<&BuildMode, UsageError> {
        self.build_mode.as_ref().ok_or(UsageError::NoBuildMode)
    }

    pub fn active_project(&self) -> Result<&str, UsageError> {
        self.hooks.active_project()
    }

    pub fn hooks(&self) -> &HostHooks {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut HostHooks {
        &mut self.hooks
    }

    /// Create the driver for `watch_mode`, replacing any previous one.
    pub fn set_mode(&mut self, watch_mode: bool) -> Result<()> {
        self.build_mode = Some(BuildMode::new(
            watch_mode,
            self.factory.as_ref(),
            &self.root_names,
        )?);
        Ok(())
    }

    /// Drain the driver's invalidated projects, registering each built
    /// project's sources and expected outputs before letting it emit.
    pub fn validate_projects(&mut self) -> Result<()> {
        let result = self.validate_invalidated_projects();
        self.hooks.active_project = None;
        self.hooks.repository.borrow_mut().clear_active_project();
        result
    }

    fn validate_invalidated_projects(&mut self) -> Result<()> {
        let build_mode = self.build_mode.as_mut().ok_or(UsageError::NoBuildMode)?;
        let hooks = &mut self.hooks;
        let output_namer = self.output_namer.as_ref();

        while let Some(mut project) = build_mode.solution_builder.next_invalidated_project(hooks)? {
            hooks.active_project = Some(project.project().to_string());
            if project.kind() == InvalidatedProjectKind::Build {
                register_project_sources(hooks, output_namer, project.as_mut())?;
            } else {
                trace!(project = project.project(), kind = ?project.kind(), "skipping non-build project");
            }
            project.done(hooks)?;
        }
        Ok(())
    }

    /// React to a watch-status diagnostic from the driver. Ignored outside
    /// watch mode.
    pub fn on_watch_status(&mut self, diagnostic: &Diagnostic) -> Result<()> {
        let build_mode = self.build_mode()?;
        if !build_mode.is_watch() {
            return Ok(());
        }

        match diagnostic.watch_status() {
            WatchStatus::ChangeDetected => {
                self.callbacks.builder_starting();
                self.validate_projects()?;
            }
            WatchStatus::FinishedWithOneError | WatchStatus::FinishedWithErrors => {
                self.callbacks.builder_ended();
            }
            WatchStatus::Other(code) => trace!(code, "ignoring watch status"),
        }
        Ok(())
    }

    /// One full pass: validate invalidated projects, then build whatever the
    /// driver still considers out of date.
    pub fn run(&mut self) -> Result<()> {
        self.callbacks.builder_starting();
        self.validate_projects()?;
        let build_mode = self.build_mode.as_mut().ok_or(UsageError::NoBuildMode)?;
        build_mode.solution_builder.build(&mut self.hooks)
    }
}

fn register_project_sources(
    hooks: &mut HostHooks,
    output_namer: &dyn OutputNamer,
    project: &mut dyn InvalidatedProject,
) -> Result<()> {
    let project_id = project.project().to_string();
    hooks
        .repository
        .borrow_mut()
        .set_and_reset_project(&project_id);

    let source_files = project.source_files(hooks)?;
    let options = project.compiler_options();
    let ignore_case = !hooks.system.use_case_sensitive_file_names();

    let mut repo = hooks.repository.borrow_mut();
    let mut registered = 0usize;
    for source in &source_files {
        if project.is_source_file_from_external_library(source)
            || project.is_source_file_default_library(source)
        {
            continue;
        }

        let kind = if source.is_declaration_file {
            FileKind::ReadOnlyDeclaration
        } else {
            FileKind::CompiledSource
        };
        let file = File::new(kind, &source.file_name, &project_id, options.clone());
        let file_id = repo.register_source(&source.file_name, source.text.clone(), file);
        registered += 1;

        if !repo.file(file_id).is_some_and(File::is_compiled_source) {
            continue;
        }
        let outputs = output_namer.output_file_names(&options, &source.file_name, ignore_case);
        for (context_type, output_path) in outputs.iter() {
            if let Some(context) = Context::incomplete(context_type) {
                repo.register_incomplete_context(&source.file_name, output_path, context);
            }
        }
    }

    debug!(project = %project_id, files = registered, "registered project sources");
    Ok(())
}
