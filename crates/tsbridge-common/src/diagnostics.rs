//! Watch-status diagnostics reported by the incremental build driver.
//!
//! Only three codes matter to this layer; everything else the driver reports
//! is passed through untouched.
//!
//! Codes: <https://github.com/microsoft/TypeScript/blob/main/src/compiler/diagnosticMessages.json>

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Suggestion,
    Message,
}

pub mod diagnostic_codes {
    pub const FILE_CHANGE_DETECTED_STARTING_INCREMENTAL_COMPILATION: u32 = 6032;
    pub const FOUND_1_ERROR_WATCHING_FOR_FILE_CHANGES: u32 = 6193;
    pub const FOUND_N_ERRORS_WATCHING_FOR_FILE_CHANGES: u32 = 6194;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub code: u32,
    pub file: Option<String>,
    pub message_text: String,
}

impl Diagnostic {
    pub fn message(code: u32, message: impl Into<String>) -> Self {
        Self {
            category: DiagnosticCategory::Message,
            code,
            file: None,
            message_text: message.into(),
        }
    }

    pub fn watch_status(&self) -> WatchStatus {
        WatchStatus::from_code(self.code)
    }
}

/// Classification of a watch-status diagnostic code.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WatchStatus {
    /// A file change was detected and an incremental pass is starting.
    ChangeDetected,
    /// The pass finished with exactly one error.
    FinishedWithOneError,
    /// The pass finished with N errors (N may be zero).
    FinishedWithErrors,
    Other(u32),
}

impl WatchStatus {
    pub fn from_code(code: u32) -> Self {
        use diagnostic_codes::*;
        match code {
            FILE_CHANGE_DETECTED_STARTING_INCREMENTAL_COMPILATION => Self::ChangeDetected,
            FOUND_1_ERROR_WATCHING_FOR_FILE_CHANGES => Self::FinishedWithOneError,
            FOUND_N_ERRORS_WATCHING_FOR_FILE_CHANGES => Self::FinishedWithErrors,
            other => Self::Other(other),
        }
    }

    /// Both completion codes mean the same thing here: the pass is over.
    pub fn is_finished(self) -> bool {
        matches!(self, Self::FinishedWithOneError | Self::FinishedWithErrors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_watch_codes() {
        assert_eq!(WatchStatus::from_code(6032), WatchStatus::ChangeDetected);
        assert!(WatchStatus::from_code(6193).is_finished());
        assert!(WatchStatus::from_code(6194).is_finished());
        assert_eq!(WatchStatus::from_code(6031), WatchStatus::Other(6031));
        assert!(!WatchStatus::ChangeDetected.is_finished());
    }

    #[test]
    fn diagnostic_exposes_its_status() {
        let diagnostic = Diagnostic::message(6194, "Found 0 errors. Watching for file changes.");
        assert_eq!(diagnostic.category, DiagnosticCategory::Message);
        assert_eq!(diagnostic.watch_status(), WatchStatus::FinishedWithErrors);
    }
}
