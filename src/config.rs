use crate::memory_budget::DEFAULT_MEMORY_BUDGET_BYTES;
use crate::DedupError;
use std::fs;
use std::path::{Path, PathBuf};

/// Suffix inserted before the extension when deriving an output path
pub const OUTPUT_SUFFIX: &str = "_deduplicated";

/// Settings for a single deduplication run
#[derive(Debug, Clone)]
pub struct DedupConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub memory_budget_bytes: u64,
    pub delete_temp_files: bool,
    /// Parent directory for the run's temp workspace; platform temp dir when `None`
    pub temp_root: Option<PathBuf>,
}

impl DedupConfig {
    pub fn new(
        input_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        memory_budget_bytes: u64,
    ) -> Result<Self, DedupError> {
        let config = Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            memory_budget_bytes,
            delete_temp_files: true,
            temp_root: None,
        };
        config.validate()?;
        Ok(config)
    }

    /// Config with the default output path and default memory budget
    pub fn for_input(input_path: impl Into<PathBuf>) -> Result<Self, DedupError> {
        let input_path = input_path.into();
        let output_path = derive_output_path(&input_path);
        Self::new(input_path, output_path, DEFAULT_MEMORY_BUDGET_BYTES)
    }

    pub fn with_delete_temp_files(mut self, delete: bool) -> Self {
        self.delete_temp_files = delete;
        self
    }

    pub fn with_temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(root.into());
        self
    }

    pub fn validate(&self) -> Result<(), DedupError> {
        if self.input_path.as_os_str().is_empty() {
            return Err(DedupError::config("input path must not be empty"));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(DedupError::config("output path must not be empty"));
        }
        if self.memory_budget_bytes == 0 {
            return Err(DedupError::config("memory budget must be positive"));
        }
        if same_file(&self.input_path, &self.output_path) {
            return Err(DedupError::config(format!(
                "output path {} would overwrite the input",
                self.output_path.display()
            )));
        }
        Ok(())
    }
}

/// Canonical comparison when both paths exist; a path that does not exist
/// yet can only match the other one literally.
fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// `dir/name.ext` -> `dir/name_deduplicated.ext`
pub fn derive_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match input.extension() {
        Some(ext) => format!("{}{}.{}", stem, OUTPUT_SUFFIX, ext.to_string_lossy()),
        None => format!("{}{}", stem, OUTPUT_SUFFIX),
    };
    match input.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(file_name),
        _ => PathBuf::from(file_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_budget() {
        let err = DedupConfig::new("in.txt", "out.txt", 0).unwrap_err();
        assert!(matches!(err, DedupError::Config(_)));
    }

    #[test]
    fn test_rejects_empty_paths() {
        assert!(DedupConfig::new("", "out.txt", 10).is_err());
        assert!(DedupConfig::new("in.txt", "", 10).is_err());
    }

    #[test]
    fn test_rejects_output_equal_to_input() {
        assert!(DedupConfig::new("same.txt", "same.txt", 10).is_err());
    }

    #[test]
    fn test_rejects_output_aliasing_input() {
        let temp_dir = tempfile::tempdir().unwrap();
        let input = temp_dir.path().join("in.txt");
        fs::create_dir_all(temp_dir.path().join("sub")).unwrap();
        fs::write(&input, "a\n").unwrap();

        let dotted = temp_dir.path().join(".").join("in.txt");
        let parent = temp_dir.path().join("sub").join("..").join("in.txt");

        assert!(matches!(
            DedupConfig::new(&input, &dotted, 10),
            Err(DedupError::Config(_))
        ));
        assert!(matches!(
            DedupConfig::new(&input, &parent, 10),
            Err(DedupError::Config(_))
        ));
        assert!(DedupConfig::new(&input, temp_dir.path().join("out.txt"), 10).is_ok());
    }

    #[test]
    fn test_defaults() {
        let config = DedupConfig::new("in.txt", "out.txt", 1024).unwrap();
        assert!(config.delete_temp_files);
        assert!(config.temp_root.is_none());

        let config = config.with_delete_temp_files(false).with_temp_root("/scratch");
        assert!(!config.delete_temp_files);
        assert_eq!(config.temp_root, Some(PathBuf::from("/scratch")));
    }

    #[test]
    fn test_derive_output_path() {
        assert_eq!(
            derive_output_path(Path::new("data/large_file.txt")),
            PathBuf::from("data/large_file_deduplicated.txt")
        );
        assert_eq!(
            derive_output_path(Path::new("urls")),
            PathBuf::from("urls_deduplicated")
        );
        assert_eq!(
            derive_output_path(Path::new("logs.2024.log")),
            PathBuf::from("logs.2024_deduplicated.log")
        );
    }

    #[test]
    fn test_for_input_uses_default_budget() {
        let config = DedupConfig::for_input("big.txt").unwrap();
        assert_eq!(config.output_path, PathBuf::from("big_deduplicated.txt"));
        assert_eq!(config.memory_budget_bytes, DEFAULT_MEMORY_BUDGET_BYTES);
    }
}
