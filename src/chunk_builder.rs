use crate::chunk_writer::write_chunk;
use crate::line_reader::LineReader;
use crate::unique_set::UniqueLineSet;
use crate::DedupError;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};

/// A chunk file written during the build phase
#[derive(Debug, Clone, Serialize)]
pub struct ChunkInfo {
    pub index: usize,
    pub path: PathBuf,
    pub unique_lines: usize,
    /// Tracked byte size of the set when it was flushed
    pub bytes: u64,
}

/// `dir/chunk_{index}.txt`
pub fn chunk_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("chunk_{}.txt", index))
}

/// Splits an input file into internally-deduplicated chunk files, each
/// holding roughly `memory_budget_bytes` of distinct line data.
pub struct ChunkBuilder {
    chunk_dir: PathBuf,
    memory_budget_bytes: u64,
}

impl ChunkBuilder {
    pub fn new(chunk_dir: impl Into<PathBuf>, memory_budget_bytes: u64) -> Self {
        Self {
            chunk_dir: chunk_dir.into(),
            memory_budget_bytes,
        }
    }

    /// Stream `input` once and return the chunks in creation order.
    ///
    /// The budget is checked after each line, so a single line larger than
    /// the budget still becomes a one-line chunk. Empty input yields no
    /// chunks.
    pub fn build_chunks(&self, input: &Path) -> Result<Vec<ChunkInfo>, DedupError> {
        let read_err = |source: io::Error| DedupError::ChunkCreation {
            path: input.to_path_buf(),
            source,
        };

        let mut reader = LineReader::open(input).map_err(read_err)?;
        let mut unique_lines = UniqueLineSet::new();
        let mut chunks = Vec::new();

        while let Some(line) = reader.next_line().map_err(read_err)? {
            unique_lines.insert(line);

            if unique_lines.byte_size() >= self.memory_budget_bytes {
                self.flush(&mut unique_lines, &mut chunks)?;
            }
        }

        if !unique_lines.is_empty() {
            self.flush(&mut unique_lines, &mut chunks)?;
            tracing::info!("[chunk_builder] Wrote final chunk {}", chunks.len() - 1);
        }

        Ok(chunks)
    }

    fn flush(
        &self,
        unique_lines: &mut UniqueLineSet,
        chunks: &mut Vec<ChunkInfo>,
    ) -> Result<(), DedupError> {
        let index = chunks.len();
        let path = chunk_path(&self.chunk_dir, index);

        write_chunk(unique_lines, &path).inspect_err(|e| {
            tracing::error!("[chunk_builder] Error writing chunk {}: {}", index, e);
        })?;

        tracing::info!(
            "[chunk_builder] Wrote chunk {} with {} unique lines ({} bytes)",
            index,
            unique_lines.len(),
            unique_lines.byte_size()
        );

        chunks.push(ChunkInfo {
            index,
            path,
            unique_lines: unique_lines.len(),
            bytes: unique_lines.byte_size(),
        });
        unique_lines.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn read_lines(path: &Path) -> Vec<String> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_large_budget_single_chunk() {
        let temp_dir = tempfile::tempdir().unwrap();
        let input = temp_dir.path().join("input.txt");
        fs::write(&input, "a\nb\na\nc\n").unwrap();

        let chunks = ChunkBuilder::new(temp_dir.path(), 1_000_000)
            .build_chunks(&input)
            .unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].unique_lines, 3);
        assert_eq!(chunks[0].bytes, 3);
        assert_eq!(read_lines(&chunks[0].path), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_flush_when_budget_reached() {
        let temp_dir = tempfile::tempdir().unwrap();
        let input = temp_dir.path().join("input.txt");
        fs::write(&input, "x\ny\nx\nz\ny\n").unwrap();

        let chunks = ChunkBuilder::new(temp_dir.path(), 2)
            .build_chunks(&input)
            .unwrap();

        // x,y | x,z | y
        assert_eq!(chunks.len(), 3);
        assert_eq!(read_lines(&chunks[0].path), vec!["x", "y"]);
        assert_eq!(read_lines(&chunks[1].path), vec!["x", "z"]);
        assert_eq!(read_lines(&chunks[2].path), vec!["y"]);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
            assert_eq!(chunk.path, chunk_path(temp_dir.path(), i));
        }
    }

    #[test]
    fn test_duplicate_hits_do_not_grow_counter() {
        let temp_dir = tempfile::tempdir().unwrap();
        let input = temp_dir.path().join("input.txt");
        fs::write(&input, "aa\naa\naa\naa\naa\n").unwrap();

        let chunks = ChunkBuilder::new(temp_dir.path(), 3)
            .build_chunks(&input)
            .unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].bytes, 2);
    }

    #[test]
    fn test_empty_input_yields_no_chunks() {
        let temp_dir = tempfile::tempdir().unwrap();
        let input = temp_dir.path().join("input.txt");
        fs::write(&input, "").unwrap();

        let chunks = ChunkBuilder::new(temp_dir.path(), 10)
            .build_chunks(&input)
            .unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_oversized_line_gets_own_chunk() {
        let temp_dir = tempfile::tempdir().unwrap();
        let input = temp_dir.path().join("input.txt");
        let long_line = "q".repeat(500);
        fs::write(&input, format!("{}\n", long_line)).unwrap();

        let chunks = ChunkBuilder::new(temp_dir.path(), 16)
            .build_chunks(&input)
            .unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].bytes, 500);
        assert_eq!(read_lines(&chunks[0].path), vec![long_line]);
    }

    #[test]
    fn test_tracked_size_bounded_by_budget_plus_one_line() {
        let temp_dir = tempfile::tempdir().unwrap();
        let input = temp_dir.path().join("input.txt");
        let content: String = (0..500).map(|i| format!("line-{}\n", i % 230)).collect();
        fs::write(&input, content).unwrap();

        let budget = 100;
        let longest_line = "line-229".len() as u64;
        let chunks = ChunkBuilder::new(temp_dir.path(), budget)
            .build_chunks(&input)
            .unwrap();

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.bytes < budget + longest_line);
        }
    }

    #[test]
    fn test_missing_input_is_chunk_creation_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = ChunkBuilder::new(temp_dir.path(), 10)
            .build_chunks(&temp_dir.path().join("nope.txt"))
            .unwrap_err();
        assert!(matches!(err, DedupError::ChunkCreation { .. }));
    }
}
