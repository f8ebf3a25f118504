use anyhow::Result;
use tracing::debug;

use crate::host::{SolutionBuilder, SolutionBuilderFactory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildModeKind {
    /// One-shot build.
    Execute,
    /// The driver reports progress through watch-status diagnostics.
    Watch,
}

/// A solution builder together with the mode it was created for.
pub struct BuildMode {
    kind: BuildModeKind,
    pub(crate) solution_builder: Box<dyn SolutionBuilder>,
}

impl BuildMode {
    pub fn new(
        watch_mode: bool,
        factory: &dyn SolutionBuilderFactory,
        root_names: &[String],
    ) -> Result<Self> {
        let kind = if watch_mode {
            BuildModeKind::Watch
        } else {
            BuildModeKind::Execute
        };
        debug!(?kind, roots = root_names.len(), "creating solution builder");
        let solution_builder = factory.create_solution_builder(kind, root_names)?;
        Ok(Self {
            kind,
            solution_builder,
        })
    }

    pub fn kind(&self) -> BuildModeKind {
        self.kind
    }

    pub fn is_watch(&self) -> bool {
        self.kind == BuildModeKind::Watch
    }
}

impl std::fmt::Debug for BuildMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildMode").field("kind", &self.kind).finish_non_exhaustive()
    }
}
