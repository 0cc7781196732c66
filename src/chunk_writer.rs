use crate::line_reader::LINE_SEPARATOR;
use crate::unique_set::UniqueLineSet;
use crate::DedupError;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

const WRITE_BUF_BYTES: usize = 64 * 1024;

/// Write a set's lines to `path` in iteration order, replacing any existing
/// file. A failed write leaves the file in an unspecified state.
pub fn write_chunk(lines: &UniqueLineSet, path: &Path) -> Result<(), DedupError> {
    write_lines(lines.iter(), path).map_err(|source| DedupError::ChunkWrite {
        path: path.to_path_buf(),
        source,
    })
}

fn write_lines<'a>(lines: impl Iterator<Item = &'a [u8]>, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::with_capacity(WRITE_BUF_BYTES, file);
    for line in lines {
        write_line(&mut writer, line)?;
    }
    writer.flush()
}

/// Write one line followed by the platform separator.
pub(crate) fn write_line<W: Write>(writer: &mut W, line: &[u8]) -> io::Result<()> {
    writer.write_all(line)?;
    writer.write_all(LINE_SEPARATOR)
}
