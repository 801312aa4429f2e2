//! Buffered line reader over a data file.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor, Read};
use std::path::Path;

use encoding_rs::WINDOWS_1252;
use encoding_rs_io::DecodeReaderBytesBuilder;

/// Reads a source one line at a time, decoding WINDOWS-1252 on the way in.
pub struct SourceReader {
    name: String,
    inner: Box<dyn BufRead>,
}

impl SourceReader {
    pub fn open(path: &Path) -> io::Result<SourceReader> {
        let file = File::open(path)?;
        Ok(Self::from_reader(path.display().to_string(), file))
    }

    /// Wraps raw WINDOWS-1252 (or BOM-marked UTF-8/UTF-16) bytes.
    pub fn from_reader<R: Read + 'static>(name: impl Into<String>, reader: R) -> SourceReader {
        let decoded = DecodeReaderBytesBuilder::new()
            .encoding(Some(WINDOWS_1252))
            .build(reader);
        SourceReader {
            name: name.into(),
            inner: Box::new(BufReader::new(decoded)),
        }
    }

    /// Wraps text that is already decoded.
    pub fn from_text(name: impl Into<String>, text: &str) -> SourceReader {
        SourceReader {
            name: name.into(),
            inner: Box::new(Cursor::new(text.as_bytes().to_vec())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replaces `buf` with the next line, without its terminator.
    ///
    /// Returns `Ok(false)` at end of input.
    pub fn read_line(&mut self, buf: &mut String) -> io::Result<bool> {
        buf.clear();
        if self.inner.read_line(buf)? == 0 {
            return Ok(false);
        }
        let trimmed = buf.trim_end_matches(['\n', '\r']).len();
        buf.truncate(trimmed);
        Ok(true)
    }
}
