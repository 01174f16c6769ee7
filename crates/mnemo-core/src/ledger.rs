//! Flat-file ledger for the lexical backend.
//!
//! One memory per line, tab-separated `id` and `content`. The ledger is the
//! durable record; ranking structures are rebuilt from it on load.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::Result;

/// File name inside the data directory.
const LEDGER_FILE: &str = "memories.txt";

/// Append-only record file, one `id<TAB>content` line per memory.
pub struct Ledger {
    path: PathBuf,
}

impl Ledger {
    /// Create a ledger rooted at `data_dir`.
    ///
    /// The directory is created if missing. Creation failure is logged and
    /// not fatal; the first `append` will surface the error instead.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        if let Err(e) = fs::create_dir_all(data_dir) {
            warn!("Failed to create memory data directory {:?}: {}", data_dir, e);
        }
        Self {
            path: data_dir.join(LEDGER_FILE),
        }
    }

    /// Backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all persisted `(id, content)` pairs in insertion order.
    ///
    /// A missing file yields an empty list. Malformed lines (fewer than two
    /// tab-separated fields) are skipped with a warning, never fatal.
    pub fn load(&self) -> Result<Vec<(String, String)>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let mut records = Vec::new();
        for (line_no, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            match line.split_once('\t') {
                Some((id, content)) if !id.is_empty() => {
                    records.push((id.to_string(), content.to_string()));
                }
                _ => {
                    warn!("Skipping malformed ledger line {}: {:?}", line_no + 1, line);
                }
            }
        }
        debug!("Loaded {} memories from {:?}", records.len(), self.path);
        Ok(records)
    }

    /// Append one record and flush it to disk before returning.
    ///
    /// The fsync guarantees an acknowledged add survives a crash immediately
    /// after. Tabs and newlines inside the content are normalized to spaces
    /// so the line format stays parseable.
    pub fn append(&self, id: &str, content: &str) -> Result<()> {
        let sanitized: String = content
            .chars()
            .map(|c| if c == '\t' || c == '\n' || c == '\r' { ' ' } else { c })
            .collect();

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}\t{}", id, sanitized)?;
        file.flush()?;
        file.sync_all()?;
        Ok(())
    }

    /// Delete the backing file if it exists.
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}
