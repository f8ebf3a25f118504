//! Builder configuration: override options keyed by project, the root
//! projects to build, and the lifecycle callbacks.

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::{debug, trace};
use tsbridge_common::paths::{self, parent_dir};
use tsbridge_common::{CompilerOptions, PathNormalizer};

use crate::host::System;

/// Default config file searched for when a project key names a directory.
pub const DEFAULT_CONFIG_NAME: &str = "tsconfig.json";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SolutionBuilderOptions {
    /// Overrides applied to every project's program options.
    pub compiler_options: Option<CompilerOptions>,
    /// Per-project overrides, keyed by config file path.
    pub projects: IndexMap<String, CompilerOptions>,
    /// Root projects handed to the driver.
    pub root_names: Vec<String>,
}

impl SolutionBuilderOptions {
    pub fn from_json(value: serde_json::Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }
}

type Callback = Box<dyn Fn()>;

/// Hooks fired around each build pass.
#[derive(Default)]
pub struct BuilderCallbacks {
    on_builder_starting: Option<Callback>,
    on_builder_ended: Option<Callback>,
}

impl BuilderCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_starting(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_builder_starting = Some(Box::new(callback));
        self
    }

    pub fn on_ended(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_builder_ended = Some(Box::new(callback));
        self
    }

    pub(crate) fn builder_starting(&self) {
        if let Some(callback) = &self.on_builder_starting {
            callback();
        }
    }

    pub(crate) fn builder_ended(&self) {
        if let Some(callback) = &self.on_builder_ended {
            callback();
        }
    }
}

impl std::fmt::Debug for BuilderCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuilderCallbacks")
            .field("on_builder_starting", &self.on_builder_starting.is_some())
            .field("on_builder_ended", &self.on_builder_ended.is_some())
            .finish()
    }
}

/// Canonicalizes user-supplied [`SolutionBuilderOptions`].
pub struct SolutionBuilderConfigProcessor;

impl SolutionBuilderConfigProcessor {
    /// Re-key `projects` by the absolute path of the config file each key
    /// refers to, and default `root_names` to the working directory.
    ///
    /// A key is split into directory and file name; the file name is searched
    /// for from the resolved directory upward. Keys whose config file cannot
    /// be found are kept as given.
    pub fn process(
        options: SolutionBuilderOptions,
        paths: &mut PathNormalizer,
        system: &dyn System,
    ) -> SolutionBuilderOptions {
        let mut projects = IndexMap::with_capacity(options.projects.len());
        for (key, project_options) in options.projects {
            let normalized = paths.normalize(&key);
            let (dir, config_name) = match normalized.rsplit_once('/') {
                Some(("", name)) => ("/", name),
                Some((dir, name)) => (dir, name),
                None => (".", normalized.as_str()),
            };
            let search_path = paths.resolve_normalize(dir);
            let resolved = find_config_file(&search_path, config_name, |path| {
                system.file_exists(path)
            });
            match resolved {
                Some(config_file) => {
                    trace!(key = %key, config_file = %config_file, "resolved project override");
                    projects.insert(config_file, project_options);
                }
                None => {
                    debug!(key = %key, "no config file found for project override");
                    projects.insert(key, project_options);
                }
            }
        }

        let root_names = if options.root_names.is_empty() {
            vec![paths.cwd().to_string()]
        } else {
            options
                .root_names
                .iter()
                .map(|name| paths.resolve_normalize(name))
                .collect()
        };

        SolutionBuilderOptions {
            compiler_options: options.compiler_options,
            projects,
            root_names,
        }
    }
}

/// Look for `config_name` in `search_path` and each of its ancestors.
pub fn find_config_file(
    search_path: &str,
    config_name: &str,
    file_exists: impl Fn(&str) -> bool,
) -> Option<String> {
    let config_name = if config_name.is_empty() {
        DEFAULT_CONFIG_NAME
    } else {
        config_name
    };

    let mut dir = search_path.to_string();
    loop {
        let candidate = paths::resolve(&dir, config_name);
        if file_exists(&candidate) {
            return Some(candidate);
        }
        let parent = parent_dir(&dir);
        if parent == dir || parent == "." {
            return None;
        }
        dir = parent.to_string();
    }
}
