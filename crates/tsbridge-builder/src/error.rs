use thiserror::Error;

/// Calls made out of order. These are programming errors on the caller's
/// side and are never papered over with a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("no build mode set; call set_mode() before building")]
    NoBuildMode,
    #[error("no active project; program options were requested outside of validate_projects()")]
    NoActiveProject,
}
