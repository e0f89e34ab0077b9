use std::path::PathBuf;

/// Errors raised while selecting, feeding or running an external diff tool.
///
/// These are carried inside [`anyhow::Error`] and downcast where a caller
/// needs more than the message, e.g. to recover the partial stdout of a
/// failed tool run.
#[derive(Debug, thiserror::Error)]
pub enum DifftoolError {
    /// Tool selection or configuration is unusable.
    #[error("{0}")]
    Configuration(String),

    /// A command-line revision does not resolve to a tree.
    #[error("{0}")]
    ReferenceResolution(String),

    /// A changed path could not be loaded from its backing store.
    #[error("Cannot find path '{}' in {}!", .path.display(), .area)]
    PathNotFound { path: PathBuf, area: String },

    /// The external tool could not be spawned or reported failure.
    #[error("{message}")]
    ToolExecution { message: String, stdout: String },
}
