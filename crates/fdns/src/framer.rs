//! Newline framing over the decompressed stream.

use fdns_core::ParseError;
use std::io::{self, BufRead, Read};

/// One framed line, owned by whichever worker receives it
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawLine {
    /// 1-based line number in the decompressed stream
    pub number: u64,
    /// Line contents without the terminator
    pub bytes: Vec<u8>,
}

/// Splits a buffered stream into lines, reusing one scan buffer
pub(crate) struct LineFramer<R> {
    reader: R,
    buf: Vec<u8>,
    max_len: usize,
    line_number: u64,
}

impl<R: BufRead> LineFramer<R> {
    pub(crate) fn new(reader: R, max_len: usize) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            max_len,
            line_number: 0,
        }
    }

    /// Lines scanned so far, blank ones included
    pub(crate) const fn lines_scanned(&self) -> u64 {
        self.line_number
    }

    /// Read the next non-blank line
    ///
    /// Returns `Ok(None)` at end of stream. A line longer than the
    /// configured maximum is a terminal error.
    pub(crate) fn next_line(&mut self) -> Result<Option<RawLine>, ParseError> {
        loop {
            self.buf.clear();
            let limit = u64::try_from(self.max_len)
                .unwrap_or(u64::MAX)
                .saturating_add(1);
            let read = (&mut self.reader)
                .take(limit)
                .read_until(b'\n', &mut self.buf)?;
            if read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let mut line = self.buf.as_slice();
            if let Some(rest) = line.strip_suffix(b"\n") {
                line = rest;
            } else if self.buf.len() > self.max_len {
                return Err(ParseError::Io(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "line {} exceeds the maximum length of {} bytes",
                        self.line_number, self.max_len
                    ),
                )));
            }
            if let Some(rest) = line.strip_suffix(b"\r") {
                line = rest;
            }

            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            return Ok(Some(RawLine {
                number: self.line_number,
                bytes: line.to_vec(),
            }));
        }
    }
}
