use crate::contexts_collection::ContextsCollection;
use crate::definitions::{Context, ContextType, DeclarationContext, File, FileKind};
use tsbridge_common::CompilerOptions;

fn compiled(path: &str) -> File {
    File::new(FileKind::CompiledSource, path, "/p/tsconfig.json", CompilerOptions::new())
}

fn read_only(path: &str) -> File {
    File::new(
        FileKind::ReadOnlyDeclaration,
        path,
        "/lib/tsconfig.json",
        CompilerOptions::new(),
    )
}

fn import_of(dest: &str) -> Context {
    Context::Declaration(DeclarationContext {
        dest_path: dest.to_string(),
        extension: ".ts".to_string(),
        external: false,
        package_id: None,
    })
}

#[test]
fn repeated_assign_is_idempotent() {
    let mut collection = ContextsCollection::new();

    let first = collection.assign("/src/a.ts", "/src/a.ts", Context::source("T"), Some(compiled("/src/a.ts")));
    let second = collection.assign("/src/a.ts", "/src/a.ts", Context::source("T"), Some(compiled("/src/a.ts")));

    assert_eq!(first, second);
    assert_eq!(collection.files().count(), 1);
    assert_eq!(collection.len(), 1);
    assert_eq!(collection.get_contexts("/src/a.ts").map(|c| c.len()), Some(1));
    assert_eq!(
        collection.get_contexts_of_type(ContextType::Source).len(),
        1
    );
    assert_eq!(
        collection.get_context("/src/a.ts").and_then(|d| d.text()),
        Some("T")
    );
}

#[test]
fn reassign_merges_file_fields_in_place() {
    let mut collection = ContextsCollection::new();
    let id = collection.assign("/src/a.ts", "/src/a.ts", Context::source("T"), Some(compiled("/src/a.ts")));

    let updated = File::new(
        FileKind::CompiledSource,
        "/src/a.ts",
        "/q/tsconfig.json",
        CompilerOptions::new().with("outDir", "/q/out"),
    );
    let again = collection.assign("/src/a.ts", "/src/a.ts", Context::source("T2"), Some(updated));

    assert_eq!(id, again);
    let file = collection.file(id).unwrap();
    assert_eq!(file.project, "/q/tsconfig.json");
    assert_eq!(file.compiler_options.out_dir(), Some("/q/out"));
    assert_eq!(
        collection.get_context("/src/a.ts").and_then(|d| d.text()),
        Some("T2")
    );
}

#[test]
fn compiled_source_wins_context_path_over_declaration_only_owner() {
    let mut collection = ContextsCollection::new();

    collection.assign("/lib/a.d.ts", "/lib/a.d.ts", Context::source("stale"), Some(read_only("/lib/a.d.ts")));
    collection.assign("/lib/a.d.ts", "/out/a.d.ts", Context::definition(), None);
    collection.assign("/src/a.ts", "/src/a.ts", Context::source("live"), Some(compiled("/src/a.ts")));
    collection.assign("/src/a.ts", "/out/a.d.ts", Context::definition(), None);

    let owner = collection.get_context("/out/a.d.ts").unwrap();
    assert_eq!(owner.path, "/src/a.ts");
    assert_eq!(owner.file.kind, FileKind::CompiledSource);
}

#[test]
fn declaration_only_owner_never_displaces_existing_entry() {
    let mut collection = ContextsCollection::new();

    collection.assign("/src/a.ts", "/src/a.ts", Context::source("live"), Some(compiled("/src/a.ts")));
    collection.assign("/src/a.ts", "/out/a.d.ts", Context::definition(), None);
    collection.assign("/lib/a.d.ts", "/lib/a.d.ts", Context::source("stale"), Some(read_only("/lib/a.d.ts")));
    collection.assign("/lib/a.d.ts", "/out/a.d.ts", Context::definition(), None);

    assert_eq!(collection.get_context("/out/a.d.ts").unwrap().path, "/src/a.ts");
    // The read-only owner still sees its own context locally.
    assert!(collection.get_context_from_path("/lib/a.d.ts", "/out/a.d.ts").is_some());
}

#[test]
fn declarations_stay_out_of_the_reverse_index() {
    let mut collection = ContextsCollection::new();
    collection.assign("/src/a.ts", "/src/a.ts", Context::source(""), Some(compiled("/src/a.ts")));
    collection.assign("/src/a.ts", "./b", import_of("/src/b.ts"), None);
    collection.assign("/src/c.ts", "/src/c.ts", Context::source(""), Some(compiled("/src/c.ts")));
    collection.assign("/src/c.ts", "./b", import_of("/src/nested/b.ts"), None);

    assert!(collection.get_context("./b").is_none());
    assert!(collection.get_contexts_of_type(ContextType::Declaration).is_empty());

    let from_a = collection.get_context_from_path("/src/a.ts", "./b").unwrap();
    let from_c = collection.get_context_from_path("/src/c.ts", "./b").unwrap();
    assert_eq!(from_a.declaration().unwrap().dest_path, "/src/b.ts");
    assert_eq!(from_c.declaration().unwrap().dest_path, "/src/nested/b.ts");
}

#[test]
fn typed_path_queries_never_fail() {
    let mut collection = ContextsCollection::new();
    collection.assign("/src/a.ts", "/src/a.ts", Context::source(""), Some(compiled("/src/a.ts")));
    collection.assign("/src/a.ts", "./b", import_of("/src/b.ts"), None);
    collection.assign("/src/a.ts", "./c", import_of("/src/c.ts"), None);

    assert!(collection.get_first_contexts_of_type_path("/missing.ts", ContextType::Source).is_none());
    assert!(collection.get_contexts_of_type_path("/missing.ts", ContextType::Source).is_empty());
    assert!(collection.get_first_contexts_of_type_path("/src/a.ts", ContextType::Destination).is_none());

    let imports = collection.get_contexts_of_type_path("/src/a.ts", ContextType::Declaration);
    let specifiers: Vec<&str> = imports.iter().map(|d| d.context_path).collect();
    assert_eq!(specifiers, ["./b", "./c"]);
}

#[test]
fn get_file_falls_back_to_context_paths() {
    let mut collection = ContextsCollection::new();
    let id = collection.assign("/src/a.ts", "/src/a.ts", Context::source(""), Some(compiled("/src/a.ts")));
    collection.assign("/src/a.ts", "/out/a.js", Context::destination(), None);

    assert_eq!(collection.file_id("/src/a.ts"), Some(id));
    assert_eq!(collection.file_id("/out/a.js"), Some(id));
    assert!(collection.has_file("/out/a.js"));
    assert!(collection.get_file("/out/b.js").is_none());
}

#[test]
fn implicit_source_entries_reuse_the_file_answering_for_the_path() {
    let mut collection = ContextsCollection::new();
    let id = collection.assign("/src/a.ts", "/src/a.ts", Context::source(""), Some(compiled("/src/a.ts")));
    collection.assign("/src/a.ts", "/out/a.js", Context::destination(), None);

    // The emitted file itself imports something; it is tracked by the owner of `/out/a.js`.
    let owner = collection.assign("/out/a.js", "./dep", import_of("/out/dep.js"), None);
    assert_eq!(owner, id);
    assert_eq!(collection.files().count(), 1);

    // A path nobody answers for gets a plain placeholder file.
    let stray = collection.assign("/tmp/x.ts", "./y", import_of("/tmp/y.ts"), None);
    assert_ne!(stray, id);
    assert_eq!(collection.file(stray).map(|f| f.kind), Some(FileKind::PlainFile));
}

#[test]
fn delete_by_file_removes_every_reference() {
    let mut collection = ContextsCollection::new();
    let a = collection.assign("/src/a.ts", "/src/a.ts", Context::source(""), Some(compiled("/src/a.ts")));
    collection.assign("/src/a.ts", "/out/a.js", Context::destination(), None);
    collection.assign("/src/a.ts", "/out/a.d.ts", Context::definition(), None);
    collection.assign("/src/a.ts", "./b", import_of("/src/b.ts"), None);
    let b = collection.assign("/src/b.ts", "/src/b.ts", Context::source(""), Some(compiled("/src/b.ts")));

    let removed = collection.delete_by_file(a);

    assert_eq!(removed.map(|f| f.file_name), Some("/src/a.ts".to_string()));
    for path in ["/src/a.ts", "/out/a.js", "/out/a.d.ts"] {
        assert!(collection.get_file(path).is_none(), "{path} still resolves");
        assert!(collection.get_context(path).is_none(), "{path} still indexed");
    }
    assert!(collection.get_contexts("/src/a.ts").is_none());
    assert!(collection.files().all(|(id, _)| id != a));
    assert_eq!(collection.file_id("/src/b.ts"), Some(b));
}

#[test]
fn delete_by_path_accepts_source_or_context_paths() {
    let mut collection = ContextsCollection::new();
    collection.assign("/src/a.ts", "/src/a.ts", Context::source(""), Some(compiled("/src/a.ts")));
    collection.assign("/src/a.ts", "/out/a.js", Context::destination(), None);
    collection.assign("/src/b.ts", "/src/b.ts", Context::source(""), Some(compiled("/src/b.ts")));

    assert!(collection.delete_by_path("/out/a.js").is_some());
    assert!(!collection.has_file("/src/a.ts"));

    assert!(collection.delete_by_path("/nowhere.ts").is_none());
    assert!(collection.has_file("/src/b.ts"));
}

#[test]
fn directory_index_tracks_parents_only() {
    let mut collection = ContextsCollection::new();
    collection.assign("/p/src/a.ts", "/p/src/a.ts", Context::source(""), Some(compiled("/p/src/a.ts")));
    collection.assign("/p/src/a.ts", "/p/out/lib/a.js", Context::destination(), None);

    assert!(collection.has_directory("/p/src"));
    assert!(collection.has_directory("/p/out/lib"));
    assert!(!collection.has_directory("/p/src/a.ts"));
    assert!(!collection.has_directory("/p/out/lib/a.js"));
    // No recursion through cached directories.
    assert!(!collection.has_directory("/p/out"));
}

#[test]
fn iterates_sources_in_registration_order() {
    let mut collection = ContextsCollection::new();
    for path in ["/src/c.ts", "/src/a.ts", "/src/b.ts"] {
        collection.assign(path, path, Context::source(""), Some(compiled(path)));
    }
    let order: Vec<&str> = collection.iter().map(|(path, _)| path).collect();
    assert_eq!(order, ["/src/c.ts", "/src/a.ts", "/src/b.ts"]);
}
