use crate::line_reader::LineReader;
use indexmap::IndexSet;
use rustc_hash::FxHasher;
use std::hash::BuildHasherDefault;
use std::io;
use std::path::Path;

type FxBuildHasher = BuildHasherDefault<FxHasher>;

/// In-memory set of distinct lines with a running byte counter.
///
/// Equality is ordinal (byte-for-byte). Iteration follows first-insertion
/// order. `byte_size` counts each distinct line's length once, when it is
/// first inserted; duplicate hits leave it unchanged.
#[derive(Debug, Default)]
pub struct UniqueLineSet {
    lines: IndexSet<Vec<u8>, FxBuildHasher>,
    byte_size: u64,
}

impl UniqueLineSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read every line of a file into a fresh set.
    pub fn load(path: &Path) -> io::Result<Self> {
        let mut set = Self::new();
        let mut reader = LineReader::open(path)?;
        while let Some(line) = reader.next_line()? {
            set.insert(line);
        }
        Ok(set)
    }

    /// Returns true if the line was not already present.
    pub fn insert(&mut self, line: &[u8]) -> bool {
        if self.lines.contains(line) {
            return false;
        }
        self.byte_size += line.len() as u64;
        self.lines.insert(line.to_vec());
        true
    }

    pub fn contains(&self, line: &[u8]) -> bool {
        self.lines.contains(line)
    }

    /// Position of the line in insertion order
    pub fn index_of(&self, line: &[u8]) -> Option<usize> {
        self.lines.get_index_of(line)
    }

    pub fn byte_size(&self) -> u64 {
        self.byte_size
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Drop all lines and reset the byte counter.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.byte_size = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.lines.iter().map(Vec::as_slice)
    }
}
