//! File and context definitions.
//!
//! A [`File`] is one unit reported by the build driver. Each file owns a set of
//! [`Context`]s keyed by context path: its own source text, the outputs the
//! driver emits for it, and the import declarations it makes.

use tsbridge_common::CompilerOptions;

/// Stable identity of a [`File`] inside a [`ContextsCollection`](crate::ContextsCollection).
///
/// Re-registering a path merges into the existing file and keeps its id; a
/// new id is only handed out when a file is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// A file known only by path; never carries contexts beyond its own.
    PlainFile,
    /// A source the driver compiles and emits output for.
    CompiledSource,
    /// A read-only declaration file, typically from `node_modules`.
    ReadOnlyDeclaration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct File {
    pub kind: FileKind,
    pub compiler_options: CompilerOptions,
    pub file_name: String,
    pub project: String,
}

impl File {
    pub fn new(
        kind: FileKind,
        file_name: impl Into<String>,
        project: impl Into<String>,
        compiler_options: CompilerOptions,
    ) -> Self {
        Self {
            kind,
            compiler_options,
            file_name: file_name.into(),
            project: project.into(),
        }
    }

    /// A file registered implicitly, before the driver described it.
    pub fn placeholder(file_name: impl Into<String>) -> Self {
        Self::new(
            FileKind::PlainFile,
            file_name,
            String::new(),
            CompilerOptions::new(),
        )
    }

    pub fn is_compiled_source(&self) -> bool {
        self.kind == FileKind::CompiledSource
    }

    pub fn is_read_only_declaration(&self) -> bool {
        self.kind == FileKind::ReadOnlyDeclaration
    }

    /// Field-wise overwrite; the identity of `self` is kept.
    pub(crate) fn merge(&mut self, other: File) {
        self.kind = other.kind;
        self.compiler_options = other.compiler_options;
        self.file_name = other.file_name;
        self.project = other.project;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextType {
    Source,
    Destination,
    Definition,
    SourceMap,
    Declaration,
}

impl ContextType {
    /// Classify an emitted output path by its extension.
    pub fn from_output_path(path: &str) -> Option<Self> {
        if path.ends_with(".js.map") {
            Some(Self::SourceMap)
        } else if path.ends_with(".d.ts") {
            Some(Self::Definition)
        } else if path.ends_with(".js") {
            Some(Self::Destination)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageId {
    pub name: String,
    pub sub_module_name: String,
    pub version: String,
}

/// An import made by a file, keyed by the literal specifier it was written
/// with. Only meaningful together with the importing file's path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationContext {
    pub dest_path: String,
    pub extension: String,
    pub external: bool,
    pub package_id: Option<PackageId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Context {
    Source { text: String },
    /// Emitted JavaScript. The path is known before the text arrives.
    Destination { text: Option<String> },
    /// Emitted declaration file.
    Definition { text: Option<String> },
    /// Emitted source map.
    SourceMap { text: Option<String> },
    Declaration(DeclarationContext),
}

impl Context {
    pub fn source(text: impl Into<String>) -> Self {
        Self::Source { text: text.into() }
    }

    pub fn destination() -> Self {
        Self::Destination { text: None }
    }

    pub fn definition() -> Self {
        Self::Definition { text: None }
    }

    pub fn source_map() -> Self {
        Self::SourceMap { text: None }
    }

    /// A text-less output context of the given type. `None` for types that
    /// are not filled in after creation.
    pub fn incomplete(kind: ContextType) -> Option<Self> {
        match kind {
            ContextType::Destination => Some(Self::destination()),
            ContextType::Definition => Some(Self::definition()),
            ContextType::SourceMap => Some(Self::source_map()),
            ContextType::Source | ContextType::Declaration => None,
        }
    }

    pub fn kind(&self) -> ContextType {
        match self {
            Self::Source { .. } => ContextType::Source,
            Self::Destination { .. } => ContextType::Destination,
            Self::Definition { .. } => ContextType::Definition,
            Self::SourceMap { .. } => ContextType::SourceMap,
            Self::Declaration(_) => ContextType::Declaration,
        }
    }

    pub fn is_declaration(&self) -> bool {
        matches!(self, Self::Declaration(_))
    }

    pub fn as_declaration(&self) -> Option<&DeclarationContext> {
        match self {
            Self::Declaration(declaration) => Some(declaration),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Source { text } => Some(text),
            Self::Destination { text } | Self::Definition { text } | Self::SourceMap { text } => {
                text.as_deref()
            }
            Self::Declaration(_) => None,
        }
    }

    /// Fill in the text of an emitted output. Returns `false` (and leaves the
    /// context untouched) for sources and declarations.
    pub fn set_text(&mut self, value: impl Into<String>) -> bool {
        match self {
            Self::Destination { text } | Self::Definition { text } | Self::SourceMap { text } => {
                *text = Some(value.into());
                true
            }
            Self::Source { .. } | Self::Declaration(_) => false,
        }
    }

    /// Last write wins per field. A missing output text never erases one that
    /// already arrived.
    pub(crate) fn merge(&mut self, other: Context) {
        match (&mut *self, other) {
            (Self::Source { text }, Self::Source { text: new }) => *text = new,
            (Self::Destination { text }, Self::Destination { text: new })
            | (Self::Definition { text }, Self::Definition { text: new })
            | (Self::SourceMap { text }, Self::SourceMap { text: new }) => {
                if new.is_some() {
                    *text = new;
                }
            }
            (Self::Declaration(declaration), Self::Declaration(new)) => *declaration = new,
            (this, other) => *this = other,
        }
    }
}

/// A borrowed view of one context together with its owner.
#[derive(Debug, Clone, Copy)]
pub struct ContextPathData<'a> {
    /// Source path of the owning file.
    pub path: &'a str,
    pub context_path: &'a str,
    pub context: &'a Context,
    pub file_id: FileId,
    pub file: &'a File,
}

impl<'a> ContextPathData<'a> {
    pub fn text(&self) -> Option<&'a str> {
        self.context.text()
    }

    pub fn declaration(&self) -> Option<&'a DeclarationContext> {
        self.context.as_declaration()
    }
}
