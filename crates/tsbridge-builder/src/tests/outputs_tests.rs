use crate::host::{OutputFileNames, OutputNamer};
use crate::outputs::ConfiguredOutputNamer;
use tsbridge_cache::ContextType;
use tsbridge_common::CompilerOptions;

fn names(options: &CompilerOptions, file: &str) -> OutputFileNames {
    ConfiguredOutputNamer::new("/p").output_file_names(options, file, false)
}

#[test]
fn rebases_outputs_from_root_dir_into_out_dir() {
    let options = CompilerOptions::new()
        .with("rootDir", "./src")
        .with("outDir", "./dist")
        .with("declaration", true)
        .with("sourceMap", true);

    let outputs = names(&options, "/p/src/lib/a.ts");
    assert_eq!(outputs.output.as_deref(), Some("/p/dist/lib/a.js"));
    assert_eq!(outputs.declaration.as_deref(), Some("/p/dist/lib/a.d.ts"));
    assert_eq!(outputs.source_map.as_deref(), Some("/p/dist/lib/a.js.map"));
}

#[test]
fn without_root_dir_paths_are_relative_to_the_project() {
    let options = CompilerOptions::new().with("outDir", "/p/out");
    let outputs = names(&options, "/p/src/a.ts");
    assert_eq!(outputs.output.as_deref(), Some("/p/out/src/a.js"));
    assert_eq!(outputs.declaration, None);
    assert_eq!(outputs.source_map, None);
}

#[test]
fn without_out_dir_outputs_sit_next_to_sources() {
    let options = CompilerOptions::new().with("declaration", true);
    let outputs = names(&options, "/p/src/a.mts");
    assert_eq!(outputs.output.as_deref(), Some("/p/src/a.mjs"));
    assert_eq!(outputs.declaration.as_deref(), Some("/p/src/a.d.mts"));
}

#[test]
fn declaration_dir_overrides_out_dir_for_definitions() {
    let options = CompilerOptions::new()
        .with("rootDir", "/p/src")
        .with("outDir", "/p/dist")
        .with("declaration", true)
        .with("declarationDir", "/p/types");
    let outputs = names(&options, "/p/src/view.tsx");
    assert_eq!(outputs.output.as_deref(), Some("/p/dist/view.js"));
    assert_eq!(outputs.declaration.as_deref(), Some("/p/types/view.d.ts"));
}

#[test]
fn jsx_preserve_keeps_jsx_extension() {
    let options = CompilerOptions::new().with("jsx", "preserve");
    assert_eq!(
        names(&options, "/p/view.tsx").output.as_deref(),
        Some("/p/view.jsx")
    );
}

#[test]
fn declaration_inputs_have_no_outputs() {
    let options = CompilerOptions::new()
        .with("outDir", "/p/dist")
        .with("declaration", true);
    assert_eq!(names(&options, "/p/src/types.d.ts"), OutputFileNames::default());
}

#[test]
fn root_dir_prefix_honors_case_sensitivity() {
    let options = CompilerOptions::new()
        .with("rootDir", "/P/Src")
        .with("outDir", "/p/dist");
    let namer = ConfiguredOutputNamer::new("/x");

    let insensitive = namer.output_file_names(&options, "/p/src/a.ts", true);
    assert_eq!(insensitive.output.as_deref(), Some("/p/dist/a.js"));

    let sensitive = namer.output_file_names(&options, "/p/src/a.ts", false);
    assert_eq!(sensitive.output.as_deref(), Some("/p/dist/p/src/a.js"));
}

#[test]
fn iterates_present_outputs_with_their_context_types() {
    let outputs = OutputFileNames {
        output: Some("/out/a.js".to_string()),
        declaration: None,
        source_map: Some("/out/a.js.map".to_string()),
    };
    let pairs: Vec<(ContextType, &str)> = outputs.iter().collect();
    assert_eq!(
        pairs,
        [
            (ContextType::Destination, "/out/a.js"),
            (ContextType::SourceMap, "/out/a.js.map"),
        ]
    );
}
