//! Compressed line I/O shared by every phase.
//!
//! Inputs, bucket files and outputs are gzip streams. [`LineReader`] yields
//! lines as raw bytes with their terminator (`\n` or `\r\n`) removed and
//! nothing else trimmed; no encoding is assumed. Input files that do not
//! start with the gzip magic bytes are read as plain text.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::bufread::MultiGzDecoder;
use flate2::write::GzEncoder;

use crate::error::{BigdiffError, IoResultExt as _};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const READ_BUF_SIZE: usize = 256 * 1024;

/// A gzip writer over a buffered file.
pub type GzWriter = GzEncoder<BufWriter<File>>;

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Streaming line iterator over a (possibly compressed) text file.
pub struct LineReader {
    inner: Box<dyn BufRead>,
    path: PathBuf,
    buf: Vec<u8>,
    line_no: u64,
}

impl LineReader {
    /// Open `path`, transparently decompressing gzip content.
    ///
    /// # Errors
    /// Returns [`BigdiffError::Io`] if the file cannot be opened or read.
    pub fn open(path: &Path) -> Result<Self, BigdiffError> {
        let file = File::open(path).with_path("open", path)?;
        let mut reader = BufReader::with_capacity(READ_BUF_SIZE, file);
        let is_gzip = reader
            .fill_buf()
            .with_path("read", path)?
            .starts_with(&GZIP_MAGIC);
        let inner: Box<dyn BufRead> = if is_gzip {
            Box::new(BufReader::with_capacity(
                READ_BUF_SIZE,
                MultiGzDecoder::new(reader),
            ))
        } else {
            Box::new(reader)
        };
        Ok(Self {
            inner,
            path: path.to_owned(),
            buf: Vec::new(),
            line_no: 0,
        })
    }

    /// Number of lines returned so far.
    #[must_use]
    pub const fn line_no(&self) -> u64 {
        self.line_no
    }

    /// Read the next line into the internal buffer.
    ///
    /// Returns `Ok(None)` at end of input. The returned slice is valid until
    /// the next call, so hot loops avoid one allocation per line.
    ///
    /// # Errors
    /// Returns [`BigdiffError::Io`] on read or decompression errors.
    pub fn next_line(&mut self) -> Result<Option<&[u8]>, BigdiffError> {
        self.buf.clear();
        let n = self
            .inner
            .read_until(b'\n', &mut self.buf)
            .with_path("read line from", &self.path)?;
        if n == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        Ok(Some(strip_terminator(&self.buf)))
    }
}

impl Iterator for LineReader {
    type Item = Result<Vec<u8>, BigdiffError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_line() {
            Ok(Some(line)) => Some(Ok(line.to_owned())),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

fn strip_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Create (or truncate) `path` as a gzip stream.
///
/// # Errors
/// Returns [`BigdiffError::Io`] if the file cannot be created.
pub fn create_gz(path: &Path, level: u32) -> Result<GzWriter, BigdiffError> {
    let file = File::create(path).with_path("create", path)?;
    Ok(GzEncoder::new(BufWriter::new(file), Compression::new(level)))
}

/// Write the gzip trailer, flush, and close `writer`.
///
/// With `sync`, the file is also fsynced before it is closed.
///
/// # Errors
/// Returns [`BigdiffError::Io`] if finishing, flushing or syncing fails.
pub fn finish_gz(writer: GzWriter, path: &Path, sync: bool) -> Result<(), BigdiffError> {
    let buffered = writer.finish().with_path("finish gzip stream", path)?;
    let file = buffered
        .into_inner()
        .map_err(io::IntoInnerError::into_error)
        .with_path("flush", path)?;
    if sync {
        file.sync_all().with_path("fsync", path)?;
    }
    Ok(())
}

/// Write `lines` to `writer` joined by `\n` (no trailing newline).
///
/// Empty lines are skipped: a joined file cannot tell them apart from absence.
/// Returns the number of lines written.
///
/// # Errors
/// Returns the underlying I/O error.
pub fn write_joined<'a, W: Write>(
    writer: &mut W,
    lines: impl IntoIterator<Item = &'a [u8]>,
) -> io::Result<u64> {
    let mut written = 0_u64;
    for line in lines.into_iter().filter(|l| !l.is_empty()) {
        if written > 0 {
            writer.write_all(b"\n")?;
        }
        writer.write_all(line)?;
        written += 1;
    }
    Ok(written)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[allow(clippy::all, clippy::pedantic, clippy::nursery)]
mod tests {
    use super::*;

    fn write_gz(path: &Path, contents: &str) {
        let mut w = create_gz(path, 6).unwrap();
        w.write_all(contents.as_bytes()).unwrap();
        finish_gz(w, path, false).unwrap();
    }

    fn read_all(path: &Path) -> Vec<String> {
        LineReader::open(path)
            .unwrap()
            .map(|l| String::from_utf8(l.unwrap()).unwrap())
            .collect()
    }

    #[test]
    fn reads_gzip_lines_without_terminators() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.gz");
        write_gz(&path, "a\r\nb\n\n c \nlast");
        assert_eq!(read_all(&path), vec!["a", "b", "", " c ", "last"]);
    }

    #[test]
    fn empty_gzip_has_no_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.gz");
        write_gz(&path, "");
        assert!(read_all(&path).is_empty());
    }

    #[test]
    fn plain_text_is_read_as_is() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.txt");
        std::fs::write(&path, "x\ny\n").unwrap();
        assert_eq!(read_all(&path), vec!["x", "y"]);
    }

    #[test]
    fn concatenated_gzip_members_are_read() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.gz");
        let second = dir.path().join("b.gz");
        write_gz(&first, "one\n");
        write_gz(&second, "two\n");
        let mut bytes = std::fs::read(&first).unwrap();
        bytes.extend(std::fs::read(&second).unwrap());
        let joined = dir.path().join("joined.gz");
        std::fs::write(&joined, bytes).unwrap();
        assert_eq!(read_all(&joined), vec!["one", "two"]);
    }

    #[test]
    fn non_utf8_bytes_are_passed_through() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.txt");
        std::fs::write(&path, b"caf\xe9\r\n\xff\xfe\nplain").unwrap();
        let lines: Vec<Vec<u8>> = LineReader::open(&path)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(
            lines,
            vec![b"caf\xe9".to_vec(), b"\xff\xfe".to_vec(), b"plain".to_vec()]
        );
    }

    #[test]
    fn corrupt_gzip_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.gz");
        // Valid header, then a deflate block with the reserved block type.
        std::fs::write(&path, [0x1f, 0x8b, 0x08, 0, 0, 0, 0, 0, 0, 0xff, 0xff, 0xff]).unwrap();
        let err = LineReader::open(&path)
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap_err();
        assert!(matches!(err, BigdiffError::Io { context: "read line from", .. }), "{err}");
    }

    #[test]
    fn missing_file_is_an_io_error_with_path() {
        let err = LineReader::open(Path::new("/nonexistent/bigdiff/in.gz"))
            .err()
            .unwrap();
        assert!(err.to_string().contains("/nonexistent/bigdiff/in.gz"));
    }

    #[test]
    fn line_numbers_advance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("n.gz");
        write_gz(&path, "a\nb\n");
        let mut reader = LineReader::open(&path).unwrap();
        assert_eq!(reader.line_no(), 0);
        reader.next_line().unwrap();
        reader.next_line().unwrap();
        assert_eq!(reader.line_no(), 2);
        assert!(reader.next_line().unwrap().is_none());
    }

    #[test]
    fn write_joined_skips_empty_lines() {
        let mut out = Vec::new();
        let n = write_joined(&mut out, [&b"a"[..], &b""[..], &b"\xe9"[..]]).unwrap();
        assert_eq!(n, 2);
        assert_eq!(out, b"a\n\xe9");
    }
}
