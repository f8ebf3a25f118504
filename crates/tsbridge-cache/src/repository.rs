//! Project-scoped façade over [`ContextsCollection`].
//!
//! The repository tracks three path relationships for every file:
//!
//! - `path`          the absolute source path
//! - outputs         emitted JavaScript, declaration and source-map paths
//! - declarations    imports found in the source, keyed by specifier
//!
//! Details accumulate over several stages of one build pass: sources are
//! registered when a project is validated, output paths are registered right
//! after without text, the text arrives when the driver writes the output, and
//! declarations are recorded during module resolution.
//!
//! On top of that, the repository knows which project each source belongs to
//! (so a project can be reset when it is rebuilt) and which paths the bundler
//! has consumed during the current watch cycle.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexSet;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};
use tsbridge_common::PathNormalizer;

use crate::contexts_collection::ContextsCollection;
use crate::definitions::{
    Context, ContextPathData, ContextType, DeclarationContext, File, FileId,
};

/// The repository as shared between the build driver hooks and the bundler.
pub type SharedRepository = Rc<RefCell<FileRepositoryCache>>;

#[derive(Debug)]
pub struct FileRepositoryCache {
    paths: PathNormalizer,
    /// Paths the bundler asked for during the current cycle, in demand order.
    consumed: Vec<String>,
    project_files: FxHashMap<String, IndexSet<FileId>>,
    active_project: Option<String>,
    contexts: ContextsCollection,
}

impl FileRepositoryCache {
    pub fn new(paths: PathNormalizer) -> Self {
        Self {
            paths,
            consumed: Vec::new(),
            project_files: FxHashMap::default(),
            active_project: None,
            contexts: ContextsCollection::new(),
        }
    }

    pub fn shared(paths: PathNormalizer) -> SharedRepository {
        Rc::new(RefCell::new(Self::new(paths)))
    }

    pub fn paths(&self) -> &PathNormalizer {
        &self.paths
    }

    pub fn paths_mut(&mut self) -> &mut PathNormalizer {
        &mut self.paths
    }

    pub fn contexts(&self) -> &ContextsCollection {
        &self.contexts
    }

    // =========================================================================
    // Projects
    // =========================================================================

    /// Make `project` the active project, dropping whatever it registered in a
    /// previous pass.
    pub fn set_and_reset_project(&mut self, project: &str) {
        self.clear_project(project);
        self.active_project = Some(project.to_string());
    }

    /// Delete every file the project registered and leave it with an empty
    /// file set. Unknown projects are ignored.
    pub fn clear_project(&mut self, project: &str) {
        let Some(files) = self.project_files.get_mut(project) else {
            return;
        };

        debug!(project, files = files.len(), "clearing project files");
        for file_id in files.drain(..) {
            self.contexts.delete_by_file(file_id);
        }
    }

    /// Leave the active project; later registrations are not tracked to any
    /// project.
    pub fn clear_active_project(&mut self) {
        self.active_project = None;
    }

    pub fn active_project(&self) -> Option<&str> {
        self.active_project.as_deref()
    }

    /// Files currently tracked for `project`, in registration order.
    pub fn project_files(&self, project: &str) -> Vec<&File> {
        self.project_files
            .get(project)
            .into_iter()
            .flatten()
            .filter_map(|file_id| self.contexts.file(*file_id))
            .collect()
    }

    fn add_active_project_file(&mut self, file_id: FileId) {
        let Some(project) = self.active_project.as_ref() else {
            return;
        };
        self.project_files
            .entry(project.clone())
            .or_default()
            .insert(file_id);
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a source file and its text. Output contexts are registered
    /// separately with [`register_incomplete_context`](Self::register_incomplete_context).
    ///
    /// Returns the id of the owning file, which may be an existing file the
    /// new fields were merged into.
    pub fn register_source(&mut self, path: &str, text: impl Into<String>, file: File) -> FileId {
        let file_id = self
            .contexts
            .assign(path, path, Context::source(text), Some(file));
        self.add_active_project_file(file_id);
        trace!(path, project = ?self.active_project, "registered source");
        file_id
    }

    /// Record an import of `path`, keyed by the specifier it was written with.
    pub fn register_declaration(
        &mut self,
        path: &str,
        context_path: &str,
        context: DeclarationContext,
    ) {
        self.contexts
            .assign(path, context_path, Context::Declaration(context), None);
    }

    /// Register an output context whose text is not known yet.
    pub fn register_incomplete_context(&mut self, path: &str, context_path: &str, context: Context) {
        self.contexts.assign(path, context_path, context, None);
    }

    /// Fill in the text of a registered destination, definition or source map.
    /// Writes to any other kind of context, or to unknown paths, are ignored.
    /// Returns whether the text was stored.
    pub fn register_text_with_context_path(
        &mut self,
        context_path: &str,
        text: impl Into<String>,
    ) -> bool {
        match self.contexts.get_context_mut(context_path) {
            Some(context) => context.set_text(text),
            None => false,
        }
    }

    // =========================================================================
    // Consumption
    // =========================================================================

    pub fn reset_consumed(&mut self) {
        self.consumed.clear();
    }

    /// Mark a path as demanded by the bundler in this cycle.
    pub fn consume(&mut self, path: &str) {
        let path = self.paths.resolve_normalize(path);
        if !self.consumed.contains(&path) {
            self.consumed.push(path);
        }
    }

    pub fn consumed_paths(&self) -> &[String] {
        &self.consumed
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn has_file(&self, path: &str) -> bool {
        self.contexts.has_file(path)
    }

    pub fn get_file(&self, path: &str) -> Option<&File> {
        self.contexts.get_file(path)
    }

    pub fn file(&self, file_id: FileId) -> Option<&File> {
        self.contexts.file(file_id)
    }

    pub fn get_context_sources(&self) -> Vec<ContextPathData<'_>> {
        self.contexts.get_contexts_of_type(ContextType::Source)
    }

    pub fn get_context_destinations(&self) -> Vec<ContextPathData<'_>> {
        self.contexts.get_contexts_of_type(ContextType::Destination)
    }

    pub fn get_context_definitions(&self) -> Vec<ContextPathData<'_>> {
        self.contexts.get_contexts_of_type(ContextType::Definition)
    }

    pub fn get_context_source_maps(&self) -> Vec<ContextPathData<'_>> {
        self.contexts.get_contexts_of_type(ContextType::SourceMap)
    }

    pub fn get_source_context(&self, path: &str) -> Option<ContextPathData<'_>> {
        self.contexts
            .get_context(path)
            .filter(|data| data.context.kind() == ContextType::Source)
    }

    pub fn get_destination_from_path(&self, path: &str) -> Option<ContextPathData<'_>> {
        self.contexts
            .get_first_contexts_of_type_path(path, ContextType::Destination)
    }

    pub fn get_definition_from_path(&self, path: &str) -> Option<ContextPathData<'_>> {
        self.contexts
            .get_first_contexts_of_type_path(path, ContextType::Definition)
    }

    pub fn get_source_map_from_path(&self, path: &str) -> Option<ContextPathData<'_>> {
        self.contexts
            .get_first_contexts_of_type_path(path, ContextType::SourceMap)
    }

    /// The import `context_path` (a specifier) as recorded for source `path`.
    pub fn get_declaration_context(
        &self,
        path: &str,
        context_path: &str,
    ) -> Option<ContextPathData<'_>> {
        self.contexts
            .get_context_from_path(path, context_path)
            .filter(|data| data.context.is_declaration())
    }

    /// Text of whatever context answers for `path` in the reverse index.
    /// Outputs whose text has not arrived yet yield `None`.
    pub fn get_context_text(&self, path: &str) -> Option<&str> {
        self.contexts.get_context(path)?.text()
    }

    pub fn has_directory(&self, path: &str) -> bool {
        self.contexts.has_directory(path)
    }
}
