use crate::DedupError;
use serde::{Serialize, Serializer};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const WORKSPACE_PREFIX: &str = "linefold-";
const MERGE_BUFFER_NAME: &str = "temp_result.txt";

/// A temp file or directory that could not be removed
#[derive(Debug, Clone, Serialize)]
pub struct CleanupFailure {
    pub path: PathBuf,
    #[serde(serialize_with = "serialize_kind")]
    pub kind: io::ErrorKind,
    pub message: String,
}

impl CleanupFailure {
    fn new(path: &Path, err: &io::Error) -> Self {
        Self {
            path: path.to_path_buf(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for CleanupFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to remove {}: {}", self.path.display(), self.message)
    }
}

fn serialize_kind<S: Serializer>(kind: &io::ErrorKind, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{:?}", kind))
}

/// Uniquely named directory holding one run's chunk files and merge buffer.
///
/// The directory is not removed on drop; call `cleanup` to delete it.
#[derive(Debug)]
pub struct TempWorkspace {
    dir: PathBuf,
}

impl TempWorkspace {
    /// Create a fresh directory under `root`, or under the platform temp
    /// dir when `root` is `None`.
    pub fn create(root: Option<&Path>) -> Result<Self, DedupError> {
        let root = root.map_or_else(std::env::temp_dir, Path::to_path_buf);
        fs::create_dir_all(&root).map_err(|e| {
            DedupError::io(format!("creating temp root {}", root.display()), e)
        })?;

        let dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir_in(&root)
            .map_err(|e| {
                DedupError::io(format!("creating workspace under {}", root.display()), e)
            })?
            .keep();

        tracing::debug!("[workspace] Created {}", dir.display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Scratch file the merger writes each step into
    pub fn merge_buffer_path(&self) -> PathBuf {
        self.dir.join(MERGE_BUFFER_NAME)
    }

    /// Best-effort removal of the chunk files, the merge buffer and the
    /// workspace directory. Keeps going past individual failures, logs each
    /// one as a warning and returns them.
    pub fn cleanup<'a>(
        &self,
        chunk_files: impl IntoIterator<Item = &'a Path>,
    ) -> Vec<CleanupFailure> {
        let mut failures = Vec::new();

        for chunk in chunk_files {
            remove_if_exists(chunk, &mut failures);
        }
        remove_if_exists(&self.merge_buffer_path(), &mut failures);

        match fs::remove_dir_all(&self.dir) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => failures.push(CleanupFailure::new(&self.dir, &e)),
        }

        if failures.is_empty() {
            tracing::info!("[workspace] Cleaned up all temporary files");
        } else {
            for failure in &failures {
                tracing::warn!("[workspace] {}", failure);
            }
        }
        failures
    }
}

fn remove_if_exists(path: &Path, failures: &mut Vec<CleanupFailure>) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => failures.push(CleanupFailure::new(path, &e)),
    }
}
