//! Sequential line reading for whole-file log analysis.
//!
//! Lines are decoded lossily: server logs occasionally contain bytes that are not valid UTF-8
//! (player names, plugin output), and those must not abort a run.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Buffer size for reading log files (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Log file loader yielding one trimmed line at a time.
pub struct LogLoader<R> {
    reader: R,
    buffer: Vec<u8>,
    lines_read: u64,
}

impl LogLoader<BufReader<File>> {
    /// Open a log file for reading.
    ///
    /// # Returns
    ///
    /// `Ok(LogLoader)` if the file opens successfully, `Err` otherwise.
    pub fn open(path: &Path) -> Result<Self, std::io::Error> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::with_capacity(BUFFER_SIZE, file)))
    }
}

impl<R: BufRead> LogLoader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::with_capacity(512),
            lines_read: 0,
        }
    }

    /// Read the next line, with trailing whitespace removed.
    ///
    /// # Returns
    ///
    /// `Ok(Some(line))` while lines remain, `Ok(None)` at EOF, `Err` on a read failure.
    pub fn next_line(&mut self) -> Result<Option<String>, std::io::Error> {
        self.buffer.clear();
        if self.reader.read_until(b'\n', &mut self.buffer)? == 0 {
            return Ok(None);
        }
        self.lines_read += 1;
        let line = String::from_utf8_lossy(&self.buffer);
        Ok(Some(line.trim_end().to_string()))
    }

    /// Number of lines handed out so far.
    pub fn lines_read(&self) -> u64 {
        self.lines_read
    }
}

impl<R: BufRead> Iterator for LogLoader<R> {
    type Item = Result<String, std::io::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line().transpose()
    }
}
