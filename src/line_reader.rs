use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

/// Line separator written after every line of a chunk or output file
#[cfg(windows)]
pub const LINE_SEPARATOR: &[u8] = b"\r\n";
#[cfg(not(windows))]
pub const LINE_SEPARATOR: &[u8] = b"\n";

const READ_BUF_BYTES: usize = 64 * 1024;

/// Sequential byte-line reader.
///
/// `\n`, `\r` and `\r\n` each end a line, so a returned line never holds a
/// terminator byte and writing it back with `LINE_SEPARATOR` reads back the
/// same line. The last line may lack a terminator. The returned slice
/// borrows an internal buffer that is reused for the next line.
pub struct LineReader<R> {
    reader: BufReader<R>,
    buf: Vec<u8>,
    /// Previous line ended in `\r`; a leading `\n` belongs to it
    skip_lf: bool,
}

impl LineReader<File> {
    pub fn open(path: &Path) -> io::Result<Self> {
        Ok(Self::new(File::open(path)?))
    }
}

impl<R: Read> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            reader: BufReader::with_capacity(READ_BUF_BYTES, inner),
            buf: Vec::new(),
            skip_lf: false,
        }
    }

    pub fn next_line(&mut self) -> io::Result<Option<&[u8]>> {
        self.buf.clear();

        if self.skip_lf {
            self.skip_lf = false;
            if fill_buf_retry(&mut self.reader)?.first() == Some(&b'\n') {
                self.reader.consume(1);
            }
        }

        let mut read_any = false;
        loop {
            let available = fill_buf_retry(&mut self.reader)?;
            if available.is_empty() {
                return Ok(if read_any { Some(self.buf.as_slice()) } else { None });
            }
            read_any = true;

            match available.iter().position(|&b| b == b'\n' || b == b'\r') {
                Some(pos) => {
                    let terminator = available[pos];
                    self.buf.extend_from_slice(&available[..pos]);
                    self.reader.consume(pos + 1);
                    self.skip_lf = terminator == b'\r';
                    return Ok(Some(self.buf.as_slice()));
                }
                None => {
                    let len = available.len();
                    self.buf.extend_from_slice(available);
                    self.reader.consume(len);
                }
            }
        }
    }
}

fn fill_buf_retry<R: Read>(reader: &mut BufReader<R>) -> io::Result<&[u8]> {
    loop {
        match reader.fill_buf() {
            Ok(_) => break,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    reader.fill_buf()
}
