// Append-only persistence of log lines.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::{debug, trace, warn};

use super::format::{NO_RESULTS_LINE, format_entry, format_separator};
use super::model::{LogEntry, RunSeparator};
use crate::config::BufferSize;
use crate::error::{DirectoryError, WriteError};

/// Writes run blocks to a single log file.
#[derive(Debug, Clone)]
pub struct LogSink {
    path: PathBuf,
    buffer_size: BufferSize,
}

impl LogSink {
    pub fn new(path: impl Into<PathBuf>, buffer_size: BufferSize) -> Self {
        Self {
            path: path.into(),
            buffer_size,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates every missing parent directory of the log file.
    pub fn ensure_directory(&self) -> Result<(), DirectoryError> {
        let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) else {
            return Ok(());
        };

        fs::create_dir_all(parent).map_err(|source| DirectoryError {
            path: parent.to_path_buf(),
            source,
        })?;
        debug!("Log directory ready at {}", parent.display());
        Ok(())
    }

    /// Writes the run separator, preceded by a blank line when the file
    /// already has content.
    pub fn append_separator(&self, separator: &RunSeparator) -> Result<(), WriteError> {
        let mut block = match self.trailing_state().map_err(|e| self.write_error(e))? {
            TrailingState::Empty => String::new(),
            TrailingState::Newline => "\n".to_string(),
            // close the dangling line first so only one blank line is added
            TrailingState::Partial => "\n\n".to_string(),
        };
        block.push_str(&format_separator(separator));
        block.push('\n');

        let mut file = self.open().map_err(|e| self.write_error(e))?;
        file.write_all(block.as_bytes())
            .map_err(|e| self.write_error(e))
    }

    /// Appends entry lines in order, one physical write per full buffer.
    /// Returns how many entries were written.
    pub fn append_entries(
        &self,
        entries: impl IntoIterator<Item = LogEntry>,
    ) -> Result<usize, WriteError> {
        let file = self.open().map_err(|e| self.write_error(e))?;
        let mut buffer = LineBuffer::new(file, self.buffer_size);

        write_entries(&mut buffer, entries).map_err(|e| self.write_error(e))
    }

    fn open(&self) -> io::Result<File> {
        OpenOptions::new().create(true).append(true).open(&self.path)
    }

    fn trailing_state(&self) -> io::Result<TrailingState> {
        let len = match fs::metadata(&self.path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(TrailingState::Empty),
            Err(e) => return Err(e),
        };
        if len == 0 {
            return Ok(TrailingState::Empty);
        }

        // appending is all that is required; an unreadable tail is not fatal
        match last_byte(&self.path) {
            Ok(b'\n') => Ok(TrailingState::Newline),
            Ok(_) => Ok(TrailingState::Partial),
            Err(e) => {
                warn!(
                    "Could not read the end of {}: {e}, assuming it ends with a newline",
                    self.path.display()
                );
                Ok(TrailingState::Newline)
            }
        }
    }

    fn write_error(&self, source: io::Error) -> WriteError {
        WriteError {
            path: self.path.clone(),
            source,
        }
    }
}

fn last_byte(path: &Path) -> io::Result<u8> {
    let mut file = File::open(path)?;
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0])
}

enum TrailingState {
    Empty,
    Newline,
    Partial,
}

fn write_entries<W: Write>(
    buffer: &mut LineBuffer<W>,
    entries: impl IntoIterator<Item = LogEntry>,
) -> io::Result<usize> {
    let mut count = 0;
    for entry in entries {
        buffer.push(format_entry(&entry))?;
        count += 1;
    }

    if count == 0 {
        buffer.push(NO_RESULTS_LINE.to_string())?;
    }
    buffer.flush()?;
    Ok(count)
}

/// Holds up to `capacity` lines and writes them out in one call.
struct LineBuffer<W: Write> {
    writer: W,
    lines: Vec<String>,
    capacity: usize,
}

impl<W: Write> LineBuffer<W> {
    fn new(writer: W, capacity: BufferSize) -> Self {
        Self {
            writer,
            lines: Vec::with_capacity(capacity.get()),
            capacity: capacity.get(),
        }
    }

    fn push(&mut self, line: String) -> io::Result<()> {
        self.lines.push(line);
        if self.lines.len() >= self.capacity {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.lines.is_empty() {
            return Ok(());
        }

        let mut chunk = self.lines.join("\n");
        chunk.push('\n');
        trace!("Flushing {} buffered lines", self.lines.len());
        // a failed batch is dropped, not retried
        self.lines.clear();
        self.writer.write_all(chunk.as_bytes())?;
        self.writer.flush()
    }
}
