//! JSON-lines file writer

use crate::error::{Error, Result};
use crate::types::Record;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Check that an endpoint name can be used as a file name
///
/// Path separators, NUL and all-dot names are rejected so the output file
/// always lands directly inside the output directory.
pub fn check_file_stem(endpoint: &str) -> Result<()> {
    let unsafe_char = endpoint.chars().any(|c| matches!(c, '/' | '\\' | '\0'));
    if unsafe_char || endpoint.chars().all(|c| c == '.') {
        return Err(Error::output(format!(
            "Endpoint name '{endpoint}' cannot be used as a file name"
        )));
    }
    Ok(())
}

/// Path of the output file for an endpoint
pub fn jsonl_path(dir: impl AsRef<Path>, endpoint: &str) -> PathBuf {
    dir.as_ref().join(format!("{endpoint}.jsonl"))
}

/// Appends records to `<dir>/<endpoint>.jsonl`
pub struct JsonlWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    rows_written: usize,
}

impl JsonlWriter {
    /// Open the file for an endpoint, creating the directory if needed
    pub fn new(dir: impl AsRef<Path>, endpoint: &str) -> Result<Self> {
        check_file_stem(endpoint)?;

        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| {
            Error::output(format!("Failed to create directory {}: {e}", dir.display()))
        })?;

        let path = jsonl_path(dir, endpoint);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| Error::output(format!("Failed to open {}: {e}", path.display())))?;

        Ok(Self {
            path,
            writer: BufWriter::new(file),
            rows_written: 0,
        })
    }

    /// Append a batch, returning how many records were written
    pub fn write(&mut self, records: &[Record]) -> Result<usize> {
        for record in records {
            serde_json::to_writer(&mut self.writer, record)?;
            self.writer
                .write_all(b"\n")
                .map_err(|e| Error::output(format!("Failed to write record: {e}")))?;
        }
        self.rows_written += records.len();
        Ok(records.len())
    }

    /// File being written
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records written so far
    #[must_use]
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flush and close the file
    pub fn close(mut self) -> Result<usize> {
        self.writer
            .flush()
            .map_err(|e| Error::output(format!("Failed to flush {}: {e}", self.path.display())))?;
        Ok(self.rows_written)
    }
}

impl std::fmt::Debug for JsonlWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonlWriter")
            .field("path", &self.path)
            .field("rows_written", &self.rows_written)
            .finish_non_exhaustive()
    }
}
