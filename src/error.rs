use std::fmt;
use std::io;
use std::path::PathBuf;

#[derive(Debug)]
pub enum DedupError {
    /// Invalid configuration, rejected before any I/O
    Config(String),
    /// Reading the input failed while building chunks
    ChunkCreation { path: PathBuf, source: io::Error },
    /// Writing a chunk file failed
    ChunkWrite { path: PathBuf, source: io::Error },
    /// A merge step failed; `step` is the index of the chunk being folded in
    Merge { step: usize, path: PathBuf, source: io::Error },
    /// Any other fatal I/O (workspace creation, direct copy)
    Io { context: String, source: io::Error },
}

impl DedupError {
    pub fn config(msg: impl Into<String>) -> Self {
        DedupError::Config(msg.into())
    }

    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        DedupError::Io { context: context.into(), source }
    }

    /// True for failures raised while partitioning the input into chunks.
    pub fn is_chunk_creation(&self) -> bool {
        matches!(self, DedupError::ChunkCreation { .. } | DedupError::ChunkWrite { .. })
    }

    pub fn is_merge(&self) -> bool {
        matches!(self, DedupError::Merge { .. })
    }
}

impl fmt::Display for DedupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DedupError::Config(e) => write!(f, "Configuration error: {}", e),
            DedupError::ChunkCreation { path, source } => write!(
                f,
                "Failed to create deduplicated chunks from {}: {}",
                path.display(),
                source
            ),
            DedupError::ChunkWrite { path, source } => {
                write!(f, "Failed to write chunk file {}: {}", path.display(), source)
            }
            DedupError::Merge { step, path, source } => write!(
                f,
                "Failed to merge chunk {} ({}): {}",
                step,
                path.display(),
                source
            ),
            DedupError::Io { context, source } => write!(f, "IO error ({}): {}", context, source),
        }
    }
}

impl std::error::Error for DedupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DedupError::Config(_) => None,
            DedupError::ChunkCreation { source, .. }
            | DedupError::ChunkWrite { source, .. }
            | DedupError::Merge { source, .. }
            | DedupError::Io { source, .. } => Some(source),
        }
    }
}
