use crate::chunk_writer::write_line;
use crate::line_reader::LineReader;
use crate::unique_set::UniqueLineSet;
use crate::DedupError;
use fixedbitset::FixedBitSet;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

const WRITE_BUF_BYTES: usize = 64 * 1024;

/// Outcome of folding one chunk into the working output
#[derive(Debug, Clone, Serialize)]
pub struct MergeStep {
    pub chunk_index: usize,
    /// Lines carried over from the working output
    pub kept_lines: u64,
    /// Lines of this chunk not already in the working output
    pub added_lines: u64,
}

/// Progressive pairwise merge of chunk files into one deduplicated file.
///
/// Chunk 0 seeds the working output; every later chunk is loaded into
/// memory, the working output is streamed through `scratch_path` while
/// marking incoming lines it already holds, and the chunk's remaining lines
/// are appended. The scratch file then replaces the working output.
///
/// Peak memory is one chunk. The working output is rewritten in full on
/// every step.
pub struct ChunkMerger {
    scratch_path: PathBuf,
}

impl ChunkMerger {
    pub fn new(scratch_path: impl Into<PathBuf>) -> Self {
        Self {
            scratch_path: scratch_path.into(),
        }
    }

    pub fn scratch_path(&self) -> &Path {
        &self.scratch_path
    }

    /// Merge `chunks` in order into `output`.
    ///
    /// On failure the working output keeps the result of the last
    /// completed step.
    pub fn merge_chunks(
        &self,
        chunks: &[PathBuf],
        output: &Path,
    ) -> Result<Vec<MergeStep>, DedupError> {
        let Some(first) = chunks.first() else {
            return Err(DedupError::config("merge requires at least one chunk"));
        };

        fs::copy(first, output).map_err(|source| DedupError::Merge {
            step: 0,
            path: first.clone(),
            source,
        })?;
        tracing::info!("[chunk_merger] Started merge with chunk 0 as base");

        let mut steps = Vec::with_capacity(chunks.len().saturating_sub(1));
        for (step, chunk) in chunks.iter().enumerate().skip(1) {
            let merged = self
                .merge_step(step, chunk, output)
                .map_err(|source| DedupError::Merge {
                    step,
                    path: chunk.clone(),
                    source,
                })
                .inspect_err(|e| tracing::error!("[chunk_merger] {}", e))?;

            tracing::info!(
                "[chunk_merger] Kept {} existing lines, added {} new unique lines",
                merged.kept_lines,
                merged.added_lines
            );
            tracing::info!("[chunk_merger] Completed merge of chunk {}", step);
            steps.push(merged);
        }

        Ok(steps)
    }

    fn merge_step(&self, step: usize, chunk: &Path, output: &Path) -> io::Result<MergeStep> {
        let incoming = UniqueLineSet::load(chunk)?;
        tracing::info!(
            "[chunk_merger] Merging chunk {} with {} lines",
            step,
            incoming.len()
        );

        let mut already_present = FixedBitSet::with_capacity(incoming.len());
        let mut kept_lines = 0u64;
        let mut added_lines = 0u64;

        {
            let mut reader = LineReader::open(output)?;
            let file = File::create(&self.scratch_path)?;
            let mut writer = BufWriter::with_capacity(WRITE_BUF_BYTES, file);

            while let Some(line) = reader.next_line()? {
                write_line(&mut writer, line)?;
                if let Some(idx) = incoming.index_of(line) {
                    already_present.insert(idx);
                }
                kept_lines += 1;
            }

            for (idx, line) in incoming.iter().enumerate() {
                if !already_present.contains(idx) {
                    write_line(&mut writer, line)?;
                    added_lines += 1;
                }
            }

            writer.flush()?;
        }

        replace_file(&self.scratch_path, output)?;

        Ok(MergeStep {
            chunk_index: step,
            kept_lines,
            added_lines,
        })
    }
}

/// Delete `dest`, then move `src` into its place. Falls back to
/// copy-and-delete when a rename is not possible (e.g. across filesystems).
fn replace_file(src: &Path, dest: &Path) -> io::Result<()> {
    match fs::remove_file(dest) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    if let Err(e) = fs::rename(src, dest) {
        tracing::debug!(
            "[chunk_merger] Rename {} -> {} failed ({}), copying instead",
            src.display(),
            dest.display(),
            e
        );
        fs::copy(src, dest)?;
        fs::remove_file(src)?;
    }
    Ok(())
}
