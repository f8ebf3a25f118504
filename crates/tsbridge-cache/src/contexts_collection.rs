//! Global registry of files and contexts across every source path.
//!
//! Three indexes are kept in step:
//! - `path_map`: source path → [`ContextsMap`] (the owning file plus its contexts)
//! - `context_path_map`: reverse index from a globally unique context path
//!   (source, destination, definition, source map) back to the source path
//!   that owns it. Declarations are keyed by import specifier and only make
//!   sense next to their importer, so they never enter this index.
//! - `directory_index`: parent directories of every registered path, used to
//!   answer directory-existence checks for outputs that never hit disk.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use tracing::trace;
use tsbridge_common::paths::parent_dir;

use crate::contexts_map::ContextsMap;
use crate::definitions::{Context, ContextPathData, ContextType, File, FileId};

#[derive(Debug, Clone)]
struct ContextPathEntry {
    path: String,
    file: FileId,
}

#[derive(Debug, Default)]
pub struct ContextsCollection {
    directory_index: FxHashSet<String>,
    files: IndexMap<FileId, File>,
    next_file_id: u32,
    context_path_map: IndexMap<String, ContextPathEntry>,
    path_map: IndexMap<String, ContextsMap>,
}

impl ContextsCollection {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Assign `context` at `context_path` to the source at `path`.
    ///
    /// - A missing source entry is created, owned by `file` if given, else by
    ///   whatever file already answers for `path`, else by a placeholder.
    /// - An existing source entry merges `file` into its owner.
    /// - An existing context at `context_path` is merged into; this is how
    ///   output text arrives after the output path was registered.
    /// - A new non-declaration context enters the reverse index unless another
    ///   owner already claimed the path. Compiled sources always take the
    ///   path over, so live output shadows a stale declaration-only owner.
    ///
    /// Returns the id of the owning file.
    pub fn assign(
        &mut self,
        path: &str,
        context_path: &str,
        context: Context,
        file: Option<File>,
    ) -> FileId {
        let (file_id, contexts) = match self.path_map.entry(path.to_string()) {
            indexmap::map::Entry::Occupied(entry) => {
                let contexts = entry.into_mut();
                let file_id = contexts.file();
                if let Some(file) = file {
                    if let Some(existing) = self.files.get_mut(&file_id) {
                        existing.merge(file);
                    }
                }
                (file_id, contexts)
            }
            indexmap::map::Entry::Vacant(entry) => {
                let existing = self
                    .context_path_map
                    .get(path)
                    .map(|owner| owner.file)
                    .filter(|_| file.is_none());
                let file_id = match existing {
                    Some(file_id) => file_id,
                    None => {
                        let file_id = FileId(self.next_file_id);
                        self.next_file_id += 1;
                        let file = file.unwrap_or_else(|| File::placeholder(path));
                        self.files.insert(file_id, file);
                        file_id
                    }
                };
                self.directory_index.insert(parent_dir(path).to_string());
                (file_id, entry.insert(ContextsMap::new(file_id)))
            }
        };

        if let Some(existing) = contexts.get_mut(context_path) {
            existing.merge(context);
            return file_id;
        }

        if !context.is_declaration() {
            let compiled = self
                .files
                .get(&file_id)
                .is_some_and(File::is_compiled_source);
            match self.context_path_map.get_mut(context_path) {
                None => {
                    self.context_path_map.insert(
                        context_path.to_string(),
                        ContextPathEntry {
                            path: path.to_string(),
                            file: file_id,
                        },
                    );
                }
                Some(entry) if compiled => {
                    trace!(
                        context_path,
                        previous = %entry.path,
                        path,
                        "compiled source takes over context path"
                    );
                    entry.path = path.to_string();
                    entry.file = file_id;
                }
                Some(_) => {}
            }
        }

        contexts.insert(context_path.to_string(), context);
        self.directory_index
            .insert(parent_dir(context_path).to_string());

        file_id
    }

    // =========================================================================
    // Removal
    // =========================================================================

    /// Remove a file and everything it owns: its reverse-index entries and
    /// every source entry it owns. Returns the removed file.
    pub fn delete_by_file(&mut self, file_id: FileId) -> Option<File> {
        let removed = self.files.shift_remove(&file_id);

        self.context_path_map.retain(|_, entry| entry.file != file_id);
        self.path_map.retain(|_, contexts| {
            if contexts.file() == file_id {
                contexts.clear();
                false
            } else {
                true
            }
        });

        removed
    }

    /// Resolve `path` as a source path or a context path and delete its
    /// owning file. No-op when nothing answers for `path`.
    pub fn delete_by_path(&mut self, path: &str) -> Option<File> {
        let file_id = self.file_id(path)?;
        self.delete_by_file(file_id)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn files(&self) -> impl Iterator<Item = (FileId, &File)> {
        self.files.iter().map(|(id, file)| (*id, file))
    }

    pub fn file(&self, file_id: FileId) -> Option<&File> {
        self.files.get(&file_id)
    }

    /// All contexts registered under a source path.
    pub fn get_contexts(&self, path: &str) -> Option<&ContextsMap> {
        self.path_map.get(path)
    }

    /// Reverse lookup of a source, destination, definition or source-map
    /// context path. Declarations are not reachable here; use
    /// [`get_context_from_path`](Self::get_context_from_path).
    pub fn get_context(&self, context_path: &str) -> Option<ContextPathData<'_>> {
        let (key, entry) = self.context_path_map.get_key_value(context_path)?;
        self.view(&entry.path, key)
    }

    pub(crate) fn get_context_mut(&mut self, context_path: &str) -> Option<&mut Context> {
        let entry = self.context_path_map.get(context_path)?;
        self.path_map.get_mut(&entry.path)?.get_mut(context_path)
    }

    /// Every reverse-indexed context of the given type, in registration order.
    pub fn get_contexts_of_type(&self, kind: ContextType) -> Vec<ContextPathData<'_>> {
        self.context_path_map
            .iter()
            .filter_map(|(context_path, entry)| self.view(&entry.path, context_path))
            .filter(|data| data.context.kind() == kind)
            .collect()
    }

    /// First context of the given type registered under a source path.
    pub fn get_first_contexts_of_type_path(
        &self,
        path: &str,
        kind: ContextType,
    ) -> Option<ContextPathData<'_>> {
        let (path, contexts) = self.path_map.get_key_value(path)?;
        let file = self.files.get(&contexts.file())?;
        contexts
            .of_type(kind)
            .next()
            .map(|(context_path, context)| ContextPathData {
                path,
                context_path,
                context,
                file_id: contexts.file(),
                file,
            })
    }

    /// Every context of the given type registered under a source path.
    pub fn get_contexts_of_type_path(
        &self,
        path: &str,
        kind: ContextType,
    ) -> Vec<ContextPathData<'_>> {
        let Some((path, contexts)) = self.path_map.get_key_value(path) else {
            return Vec::new();
        };
        let Some(file) = self.files.get(&contexts.file()) else {
            return Vec::new();
        };
        contexts
            .of_type(kind)
            .map(|(context_path, context)| ContextPathData {
                path,
                context_path,
                context,
                file_id: contexts.file(),
                file,
            })
            .collect()
    }

    pub fn has_file(&self, path: &str) -> bool {
        self.file_id(path).is_some()
    }

    /// The file answering for `path`, looked up first as a source path and
    /// then as a context path.
    pub fn get_file(&self, path: &str) -> Option<&File> {
        self.files.get(&self.file_id(path)?)
    }

    pub fn file_id(&self, path: &str) -> Option<FileId> {
        self.path_map
            .get(path)
            .map(ContextsMap::file)
            .or_else(|| self.context_path_map.get(path).map(|entry| entry.file))
    }

    /// Exact lookup of one context under one source path. This is the only
    /// way to reach declaration contexts.
    pub fn get_context_from_path(
        &self,
        path: &str,
        context_path: &str,
    ) -> Option<ContextPathData<'_>> {
        self.view(path, context_path)
    }

    pub fn has_directory(&self, path: &str) -> bool {
        self.directory_index.contains(path)
    }

    /// Source paths and their contexts, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContextsMap)> {
        self.path_map
            .iter()
            .map(|(path, contexts)| (path.as_str(), contexts))
    }

    pub fn len(&self) -> usize {
        self.path_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path_map.is_empty()
    }

    fn view<'a>(&'a self, path: &str, context_path: &str) -> Option<ContextPathData<'a>> {
        let (path, contexts) = self.path_map.get_key_value(path)?;
        let (context_path, context) = contexts.get_key_value(context_path)?;
        let file = self.files.get(&contexts.file())?;
        Some(ContextPathData {
            path,
            context_path,
            context,
            file_id: contexts.file(),
            file,
        })
    }
}
