//! Line-by-line read position over a KTON byte stream.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::error::{KtonError, Result};

/// Longest line accepted, terminator included.
pub const MAX_LINE_BYTES: usize = 1024;

/// Read position in a line source.
///
/// Each call to [`ScanCursor::next_line`] consumes exactly one line, whether
/// or not that line later turns into a record.
pub struct ScanCursor<R> {
    reader: R,
    buf: Vec<u8>,
    position: u64,
    exhausted: bool,
}

/// Open `path` as a buffered line source.
pub fn open_source(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).map_err(|source| KtonError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

impl ScanCursor<BufReader<File>> {
    /// Open `path` for scanning.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        open_source(path.as_ref()).map(Self::new)
    }
}

impl<R: BufRead> ScanCursor<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(256),
            position: 0,
            exhausted: false,
        }
    }

    /// The next raw line, line terminator included, or `None` at end of
    /// input.
    ///
    /// A line longer than [`MAX_LINE_BYTES`] is consumed whole and reported
    /// as [`KtonError::OutOfRange`]. The cursor stays usable after it.
    pub fn next_line(&mut self) -> Result<Option<&[u8]>> {
        if self.exhausted {
            return Ok(None);
        }
        self.buf.clear();
        let read = (&mut self.reader)
            .take(MAX_LINE_BYTES as u64)
            .read_until(b'\n', &mut self.buf)?;
        if read == 0 {
            self.exhausted = true;
            return Ok(None);
        }
        self.position += 1;

        if read == MAX_LINE_BYTES && self.buf.last() != Some(&b'\n') {
            let rest = self.reader.skip_until(b'\n')?;
            if rest > 0 {
                return Err(KtonError::OutOfRange {
                    offset: 0,
                    len: read + rest,
                    line_len: MAX_LINE_BYTES,
                });
            }
        }
        Ok(Some(&self.buf))
    }

    /// Number of lines consumed so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// True once the source has reported end of input.
    pub fn exhausted(&self) -> bool {
        self.exhausted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reads_each_line_once() {
        let mut cursor = ScanCursor::new(Cursor::new("one\ntwo\nthree"));
        assert_eq!(cursor.next_line().unwrap(), Some(&b"one\n"[..]));
        assert_eq!(cursor.next_line().unwrap(), Some(&b"two\n"[..]));
        assert_eq!(cursor.next_line().unwrap(), Some(&b"three"[..]));
        assert_eq!(cursor.position(), 3);
        assert!(!cursor.exhausted());

        assert_eq!(cursor.next_line().unwrap(), None);
        assert!(cursor.exhausted());
        assert_eq!(cursor.next_line().unwrap(), None);
        assert_eq!(cursor.position(), 3);
    }

    #[test]
    fn test_empty_source() {
        let mut cursor = ScanCursor::new(Cursor::new(Vec::<u8>::new()));
        assert_eq!(cursor.next_line().unwrap(), None);
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_blank_lines_count() {
        let mut cursor = ScanCursor::new(Cursor::new("\n\nX\n"));
        while cursor.next_line().unwrap().is_some() {}
        assert_eq!(cursor.position(), 3);
    }

    #[test]
    fn test_overlong_line_is_out_of_range() {
        let long = format!("T10{}", "9".repeat(MAX_LINE_BYTES * 2));
        let mut cursor = ScanCursor::new(Cursor::new(format!("{long}\nNEXT\n")));
        match cursor.next_line() {
            Err(KtonError::OutOfRange { len, line_len, .. }) => {
                assert_eq!(len, long.len() + 1);
                assert_eq!(line_len, MAX_LINE_BYTES);
            }
            other => panic!("Expected OutOfRange, got {other:?}"),
        }
        assert_eq!(cursor.next_line().unwrap(), Some(&b"NEXT\n"[..]));
        assert_eq!(cursor.position(), 2);
        assert_eq!(cursor.next_line().unwrap(), None);
    }

    #[test]
    fn test_line_at_limit_is_accepted() {
        let line = format!("{}\n", "X".repeat(MAX_LINE_BYTES - 1));
        let mut cursor = ScanCursor::new(Cursor::new(format!("{line}{line}")));
        assert_eq!(cursor.next_line().unwrap().map(<[u8]>::len), Some(MAX_LINE_BYTES));
        assert_eq!(cursor.next_line().unwrap().map(<[u8]>::len), Some(MAX_LINE_BYTES));
        assert_eq!(cursor.next_line().unwrap(), None);

        // Final line without a terminator, exactly at the limit.
        let tail = "Y".repeat(MAX_LINE_BYTES);
        let mut cursor = ScanCursor::new(Cursor::new(tail.clone()));
        assert_eq!(cursor.next_line().unwrap(), Some(tail.as_bytes()));
    }

    #[test]
    fn test_open_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"A\nB\n").unwrap();
        let mut cursor = ScanCursor::open(file.path()).unwrap();
        assert_eq!(cursor.next_line().unwrap(), Some(&b"A\n"[..]));
        assert_eq!(cursor.next_line().unwrap(), Some(&b"B\n"[..]));
        assert_eq!(cursor.next_line().unwrap(), None);
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.kton");
        match ScanCursor::open(&missing) {
            Err(KtonError::SourceUnavailable { path, .. }) => assert_eq!(path, missing),
            Err(other) => panic!("Expected SourceUnavailable, got {other:?}"),
            Ok(_) => panic!("Expected SourceUnavailable, got a cursor"),
        }
    }
}
