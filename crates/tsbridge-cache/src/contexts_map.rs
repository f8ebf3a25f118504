//! Contexts registered under a single source path.

use indexmap::IndexMap;

use crate::definitions::{Context, ContextType, FileId};

/// The contexts owned by one source path. Context paths are unique per
/// source path; declaration paths may repeat across different sources.
#[derive(Debug, Clone)]
pub struct ContextsMap {
    file: FileId,
    contexts: IndexMap<String, Context>,
}

impl ContextsMap {
    pub fn new(file: FileId) -> Self {
        Self {
            file,
            contexts: IndexMap::new(),
        }
    }

    pub fn file(&self) -> FileId {
        self.file
    }

    pub fn get(&self, context_path: &str) -> Option<&Context> {
        self.contexts.get(context_path)
    }

    pub fn get_key_value(&self, context_path: &str) -> Option<(&str, &Context)> {
        self.contexts
            .get_key_value(context_path)
            .map(|(path, context)| (path.as_str(), context))
    }

    pub(crate) fn get_mut(&mut self, context_path: &str) -> Option<&mut Context> {
        self.contexts.get_mut(context_path)
    }

    pub(crate) fn insert(&mut self, context_path: String, context: Context) {
        self.contexts.insert(context_path, context);
    }

    pub(crate) fn clear(&mut self) {
        self.contexts.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Context)> {
        self.contexts.iter().map(|(path, context)| (path.as_str(), context))
    }

    pub fn of_type(&self, kind: ContextType) -> impl Iterator<Item = (&str, &Context)> {
        self.iter().filter(move |(_, context)| context.kind() == kind)
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}
