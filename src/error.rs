//=========================================================================
// Error Types
//=========================================================================
//
// Failure taxonomy shared by the asset cache and the window manager.
//
// Only failures that a caller can act on are errors. Bookkeeping misuse
// (over-release, re-entrant transitions) is logged and recovered from
// in place instead.
//
//=========================================================================

//=== External Dependencies ===============================================

use thiserror::Error;

//=== UiError =============================================================

/// Errors surfaced by window and asset operations.
///
/// `Clone` so a single in-flight result can be handed to every joined
/// caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UiError {
    /// The resource behind a window could not be obtained or instantiated.
    #[error("failed to load '{path}': {message}")]
    LoadFailure { path: String, message: String },

    /// The operation was superseded by a close or cancel request.
    #[error("operation cancelled")]
    Cancelled,

    /// A window kind was used without a registered descriptor.
    #[error("no descriptor registered for window kind {0}")]
    MissingDescriptor(String),

    /// The manager has been shut down.
    #[error("window manager has been shut down")]
    ShutDown,
}

impl UiError {
    pub(crate) fn load_failure(path: &str, message: impl Into<String>) -> Self {
        Self::LoadFailure {
            path: path.to_string(),
            message: message.into(),
        }
    }

    /// Returns true for the cancellation status.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

//=== Hook Errors =========================================================

/// Error type returned by window hooks.
pub type HookError = Box<dyn std::error::Error>;

/// Result type returned by window hooks.
pub type HookResult = Result<(), HookError>;

//=== Tests ===============================================================
