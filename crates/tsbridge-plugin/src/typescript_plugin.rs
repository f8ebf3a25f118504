use anyhow::{Result, anyhow};
use serde::Deserialize;
use tracing::{debug, trace};
use tsbridge_builder::{
    BuilderCallbacks, BuilderEnvironment, SolutionBuilderOptions, SolutionBuilderPlugin, Watch,
};
use tsbridge_cache::{FileRepositoryCache, SharedRepository};
use tsbridge_common::paths::relative;
use tsbridge_common::{Diagnostic, PathNormalizer};

use crate::context::{EmittedAsset, EmittedChunk, LoadResult, PluginContext};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TypescriptPluginOptions {
    /// Emit every compiled file as a chunk, not only those the bundle imports.
    pub include_unused_files: bool,
}

pub struct TypescriptPlugin {
    options: TypescriptPluginOptions,
    repository: SharedRepository,
    solution_builder: SolutionBuilderPlugin,
    watch: Watch,
}

impl TypescriptPlugin {
    pub const NAME: &'static str = "typescript";

    pub fn new(
        options: TypescriptPluginOptions,
        builder_options: SolutionBuilderOptions,
        paths: PathNormalizer,
        environment: BuilderEnvironment,
    ) -> Self {
        Self::with_watch(options, builder_options, paths, environment, Watch::default())
    }

    /// Like [`TypescriptPlugin::new`], synchronizing through `watch`.
    pub fn with_watch(
        options: TypescriptPluginOptions,
        builder_options: SolutionBuilderOptions,
        paths: PathNormalizer,
        environment: BuilderEnvironment,
        watch: Watch,
    ) -> Self {
        let repository = FileRepositoryCache::shared(paths);
        let callbacks = {
            let started = watch.clone();
            let ended = watch.clone();
            BuilderCallbacks::new()
                .on_starting(move || started.compiler_started())
                .on_ended(move || ended.compiler_ended())
        };
        let solution_builder = SolutionBuilderPlugin::new(
            SharedRepository::clone(&repository),
            builder_options,
            callbacks,
            environment,
        );

        Self {
            options,
            repository,
            solution_builder,
            watch,
        }
    }

    pub fn repository(&self) -> &SharedRepository {
        &self.repository
    }

    pub fn watch(&self) -> &Watch {
        &self.watch
    }

    pub fn solution_builder(&self) -> &SolutionBuilderPlugin {
        &self.solution_builder
    }

    /// Build everything up front so resolution and loading can be served
    /// from memory.
    pub fn build_start(&mut self, ctx: &mut dyn PluginContext) -> Result<()> {
        self.solution_builder.set_mode(ctx.watch_mode())?;
        self.repository.borrow_mut().reset_consumed();
        self.solution_builder.run()?;

        if !self.options.include_unused_files {
            return Ok(());
        }

        let destinations: Vec<(String, Option<String>)> = {
            let repo = self.repository.borrow();
            repo.get_context_destinations()
                .iter()
                .map(|data| {
                    let root_dir = data.file.compiler_options.root_dir().map(str::to_string);
                    (data.path.to_string(), root_dir)
                })
                .collect()
        };

        let mut repo = self.repository.borrow_mut();
        for (path, root_dir) in destinations {
            let root_dir = root_dir
                .ok_or_else(|| anyhow!("rootDir is not set for {path}; cannot place its chunk"))?;
            let root_dir = repo.paths_mut().resolve_normalize(&root_dir);
            let id = relative(&root_dir, &path);
            trace!(chunk = %id, "emitting unused file");
            ctx.emit_chunk(EmittedChunk {
                id,
                preserve_signature: true,
            });
        }
        Ok(())
    }

    pub fn watch_change(&mut self, id: &str) {
        trace!(id, "watch change");
        self.repository.borrow_mut().reset_consumed();
        self.watch.change_triggered();
    }

    /// Resolve `source` to a source path this plugin serves, recording it as
    /// consumed.
    pub fn resolve_id(&mut self, source: &str, importer: Option<&str>) -> Option<String> {
        let mut repo = self.repository.borrow_mut();

        if let Some(importer) = importer {
            let importer = repo.paths_mut().resolve_normalize(importer);
            let internal = repo
                .get_declaration_context(&importer, source)
                .and_then(|data| data.declaration())
                .filter(|declaration| !declaration.external)
                .map(|declaration| declaration.dest_path.clone());
            if let Some(dest_path) = internal {
                repo.consume(&dest_path);
                return Some(dest_path);
            }
        }

        let source_path = repo.paths_mut().resolve_normalize(source);
        let compiled = repo
            .get_source_context(&source_path)
            .filter(|data| data.file.is_compiled_source())
            .map(|data| data.context_path.to_string())?;
        repo.consume(&compiled);
        Some(compiled)
    }

    /// Compiled JavaScript for source `id`, once the compiler has settled.
    pub async fn load(&self, id: &str) -> Option<LoadResult> {
        self.watch.await_ready().await;

        let repo = self.repository.borrow();
        let code = repo.get_destination_from_path(id)?.text()?.to_string();
        let map = repo
            .get_source_map_from_path(id)
            .and_then(|data| data.text())
            .map(str::to_string);
        Some(LoadResult { code, map })
    }

    /// Emit the declaration file of every consumed source as an asset.
    pub fn build_end(&mut self, ctx: &mut dyn PluginContext) -> Result<()> {
        let mut definitions = Vec::new();
        {
            let repo = self.repository.borrow();
            for path in repo.consumed_paths() {
                let Some(definition) = repo.get_definition_from_path(path) else {
                    continue;
                };
                let out_dir = definition
                    .file
                    .compiler_options
                    .out_dir()
                    .ok_or_else(|| anyhow!("outDir is not set for {path}; cannot place its declaration"))?;
                let Some(text) = definition.text() else {
                    debug!(path = %definition.context_path, "declaration was never emitted");
                    continue;
                };
                definitions.push((
                    out_dir.to_string(),
                    definition.context_path.to_string(),
                    text.to_string(),
                ));
            }
        }

        let mut repo = self.repository.borrow_mut();
        for (out_dir, context_path, source) in definitions {
            let out_dir = repo.paths_mut().resolve_normalize(&out_dir);
            ctx.emit_asset(EmittedAsset {
                file_name: relative(&out_dir, &context_path),
                source,
            });
        }
        Ok(())
    }

    pub fn on_watch_status(&mut self, diagnostic: &Diagnostic) -> Result<()> {
        self.solution_builder.on_watch_status(diagnostic)
    }
}
