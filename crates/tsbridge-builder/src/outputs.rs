//! Output path naming from `outDir`/`rootDir`/`declarationDir`.

use tsbridge_common::CompilerOptions;
use tsbridge_common::paths::{self, normalize};

use crate::host::{OutputFileNames, OutputNamer};

/// Names outputs the way the compiler lays out emitted files: the source's
/// path relative to `rootDir` (or the project directory) is re-rooted under
/// `outDir`, with JavaScript and declaration extensions swapped in.
#[derive(Debug, Clone)]
pub struct ConfiguredOutputNamer {
    base_dir: String,
}

impl ConfiguredOutputNamer {
    /// `base_dir` is the project directory relative option paths resolve against.
    pub fn new(base_dir: impl AsRef<str>) -> Self {
        Self {
            base_dir: paths::resolve("/", base_dir.as_ref()),
        }
    }

    fn option_dir(&self, options: &CompilerOptions, key: &str) -> Option<String> {
        options
            .get_str(key)
            .map(|dir| paths::resolve(&self.base_dir, dir))
    }

    fn relative_output<'a>(
        &self,
        root_dir: Option<&str>,
        file_name: &'a str,
        ignore_case: bool,
    ) -> &'a str {
        root_dir
            .and_then(|root| strip_dir_prefix(file_name, root, ignore_case))
            .or_else(|| strip_dir_prefix(file_name, &self.base_dir, ignore_case))
            .unwrap_or_else(|| file_name.trim_start_matches('/'))
    }
}

impl OutputNamer for ConfiguredOutputNamer {
    fn output_file_names(
        &self,
        options: &CompilerOptions,
        file_name: &str,
        ignore_case: bool,
    ) -> OutputFileNames {
        let file_name = normalize(file_name);
        if is_declaration_file(&file_name) {
            return OutputFileNames::default();
        }

        let root_dir = self.option_dir(options, "rootDir");
        let out_dir = self.option_dir(options, "outDir");
        let relative = self.relative_output(root_dir.as_deref(), &file_name, ignore_case);
        let rebase = |dir: Option<&str>| match dir {
            Some(dir) => format!("{}/{}", dir.trim_end_matches('/'), relative),
            None => file_name.clone(),
        };

        let output = js_extension_for(&file_name, options.get_str("jsx"))
            .map(|ext| replace_extension(&rebase(out_dir.as_deref()), ext));

        let declaration = if options.declaration() {
            let declaration_dir = self.option_dir(options, "declarationDir").or(out_dir);
            declaration_file_name(&rebase(declaration_dir.as_deref()))
        } else {
            None
        };

        let source_map = match &output {
            Some(output) if options.source_map() => Some(format!("{output}.map")),
            _ => None,
        };

        OutputFileNames {
            output,
            declaration,
            source_map,
        }
    }
}

fn strip_dir_prefix<'a>(path: &'a str, dir: &str, ignore_case: bool) -> Option<&'a str> {
    let dir = dir.trim_end_matches('/');
    let head = path.get(..dir.len())?;
    let matches = if ignore_case {
        head.eq_ignore_ascii_case(dir)
    } else {
        head == dir
    };
    if !matches {
        return None;
    }
    path[dir.len()..].strip_prefix('/')
}

fn is_declaration_file(path: &str) -> bool {
    path.ends_with(".d.ts") || path.ends_with(".d.mts") || path.ends_with(".d.cts")
}

fn js_extension_for(path: &str, jsx: Option<&str>) -> Option<&'static str> {
    if path.ends_with(".mts") {
        Some(".mjs")
    } else if path.ends_with(".cts") {
        Some(".cjs")
    } else if path.ends_with(".tsx") {
        match jsx {
            Some(mode) if mode.eq_ignore_ascii_case("preserve") => Some(".jsx"),
            _ => Some(".js"),
        }
    } else if path.ends_with(".ts") {
        Some(".js")
    } else {
        None
    }
}

fn declaration_file_name(path: &str) -> Option<String> {
    for (source, declaration) in [
        (".mts", ".d.mts"),
        (".cts", ".d.cts"),
        (".tsx", ".d.ts"),
        (".ts", ".d.ts"),
    ] {
        if let Some(stem) = path.strip_suffix(source) {
            return Some(format!("{stem}{declaration}"));
        }
    }
    None
}

fn replace_extension(path: &str, extension: &str) -> String {
    let stem = match path.rfind('.') {
        Some(idx) if !path[idx..].contains('/') => &path[..idx],
        _ => path,
    };
    format!("{stem}{extension}")
}
