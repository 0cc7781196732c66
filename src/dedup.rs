use crate::chunk_builder::{ChunkBuilder, ChunkInfo};
use crate::chunk_merger::{ChunkMerger, MergeStep};
use crate::config::DedupConfig;
use crate::workspace::{CleanupFailure, TempWorkspace};
use crate::DedupError;
use serde::Serialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Lifecycle of one run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    BuildingChunks,
    DirectCopy,
    Merging,
    CleaningUp,
    Done,
    Failed,
}

/// Summary of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct DedupReport {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub memory_budget_bytes: u64,
    pub workspace: PathBuf,
    pub chunks: Vec<ChunkInfo>,
    pub merge_steps: Vec<MergeStep>,
    /// True when zero or one chunk was produced and no merge ran
    pub direct_copy: bool,
    pub output_lines: u64,
    /// Temp files that could not be removed; the run still succeeded
    pub cleanup_failures: Vec<CleanupFailure>,
    pub elapsed_ms: u64,
}

/// Runs chunk building, then a direct copy or a merge, then cleanup.
pub struct Deduplicator {
    config: DedupConfig,
    phase: Phase,
}

impl Deduplicator {
    pub fn new(config: DedupConfig) -> Result<Self, DedupError> {
        config.validate()?;
        Ok(Self {
            config,
            phase: Phase::Idle,
        })
    }

    pub fn config(&self) -> &DedupConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Deduplicate the configured input into the configured output.
    ///
    /// Empty input produces an empty output file. Fatal errors leave any
    /// chunk files already written in the workspace.
    pub fn deduplicate(&mut self) -> Result<DedupReport, DedupError> {
        tracing::info!(
            "[dedup] Starting deduplication of {}",
            self.config.input_path.display()
        );

        match TempWorkspace::create(self.config.temp_root.as_deref()) {
            Ok(workspace) => self.deduplicate_in(workspace),
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Run every phase inside an already created workspace.
    pub(crate) fn deduplicate_in(
        &mut self,
        workspace: TempWorkspace,
    ) -> Result<DedupReport, DedupError> {
        match self.run(&workspace) {
            Ok(report) => {
                self.transition(Phase::Done);
                tracing::info!(
                    "[dedup] Deduplication complete. Output saved to {} ({} lines, {} ms)",
                    report.output_path.display(),
                    report.output_lines,
                    report.elapsed_ms
                );
                Ok(report)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn fail(&mut self, e: DedupError) -> DedupError {
        self.transition(Phase::Failed);
        tracing::error!("[dedup] Deduplication failed: {}", e);
        e
    }

    fn run(&mut self, workspace: &TempWorkspace) -> Result<DedupReport, DedupError> {
        let start = Instant::now();
        let input = self.config.input_path.clone();
        let output = self.config.output_path.clone();

        self.transition(Phase::BuildingChunks);
        let chunks = ChunkBuilder::new(workspace.path(), self.config.memory_budget_bytes)
            .build_chunks(&input)?;
        tracing::info!("[dedup] Created {} deduplicated chunks", chunks.len());

        let mut merge_steps = Vec::new();
        let output_lines = match chunks.as_slice() {
            [] => {
                self.transition(Phase::DirectCopy);
                File::create(&output).map_err(|e| {
                    DedupError::io(format!("creating empty output {}", output.display()), e)
                })?;
                tracing::info!("[dedup] Input has no lines - wrote empty output");
                0
            }
            [only] => {
                self.transition(Phase::DirectCopy);
                copy_chunk(only, &output)?;
                tracing::info!("[dedup] Only one chunk needed - direct copy complete");
                only.unique_lines as u64
            }
            [.., _] => {
                self.transition(Phase::Merging);
                let paths: Vec<PathBuf> = chunks.iter().map(|c| c.path.clone()).collect();
                merge_steps =
                    ChunkMerger::new(workspace.merge_buffer_path()).merge_chunks(&paths, &output)?;
                tracing::info!("[dedup] Merged all chunks successfully");
                merge_steps
                    .last()
                    .map_or(0, |step| step.kept_lines + step.added_lines)
            }
        };

        let cleanup_failures = if self.config.delete_temp_files {
            self.transition(Phase::CleaningUp);
            workspace.cleanup(chunks.iter().map(|c| c.path.as_path()))
        } else {
            tracing::info!(
                "[dedup] Keeping temporary files in {}",
                workspace.path().display()
            );
            Vec::new()
        };

        Ok(DedupReport {
            input_path: input,
            output_path: output,
            memory_budget_bytes: self.config.memory_budget_bytes,
            workspace: workspace.path().to_path_buf(),
            direct_copy: merge_steps.is_empty(),
            chunks,
            merge_steps,
            output_lines,
            cleanup_failures,
            elapsed_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn transition(&mut self, next: Phase) {
        tracing::debug!("[dedup] {:?} -> {:?}", self.phase, next);
        self.phase = next;
    }
}

fn copy_chunk(chunk: &ChunkInfo, output: &Path) -> Result<(), DedupError> {
    fs::copy(&chunk.path, output).map_err(|e| {
        DedupError::io(
            format!(
                "copying {} to {}",
                chunk.path.display(),
                output.display()
            ),
            e,
        )
    })?;
    Ok(())
}

/// Deduplicate `input` into `output` with default settings and the given budget.
pub fn deduplicate(
    input: impl Into<PathBuf>,
    output: impl Into<PathBuf>,
    memory_budget_bytes: u64,
) -> Result<DedupReport, DedupError> {
    let config = DedupConfig::new(input, output, memory_budget_bytes)?;
    Deduplicator::new(config)?.deduplicate()
}
