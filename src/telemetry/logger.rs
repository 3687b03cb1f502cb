//! JSONL telemetry writer with size-based rotation.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info, warn};

use super::TickRecord;
use crate::error::Result;

const FILE_PREFIX: &str = "telemetry_";
const FILE_EXTENSION: &str = "jsonl";

/// Rotating JSONL writer.
///
/// Files are named `telemetry_<UTC timestamp>_<sequence>.jsonl`, so name
/// order is creation order. After each rotation only the newest
/// `max_files_to_keep` files remain in the directory.
///
/// # Examples
///
/// ```no_run
/// use magjoy::telemetry::TelemetryLogger;
///
/// let mut logger = TelemetryLogger::new("./logs", 10_000, 10)?;
/// logger.flush()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct TelemetryLogger {
    dir: PathBuf,
    max_records_per_file: usize,
    max_files_to_keep: usize,
    writer: BufWriter<File>,
    path: PathBuf,
    records_in_file: usize,
    records_written: u64,
    sequence: u32,
}

impl TelemetryLogger {
    /// Create the log directory if needed and open the first file.
    ///
    /// # Errors
    ///
    /// Returns error if the directory or file cannot be created.
    pub fn new<P: AsRef<Path>>(dir: P, max_records_per_file: usize, max_files_to_keep: usize) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let (path, writer) = Self::create_file(&dir, 0)?;
        info!("Telemetry recording to {}", path.display());

        let logger = Self {
            dir,
            max_records_per_file: max_records_per_file.max(1),
            max_files_to_keep: max_files_to_keep.max(1),
            writer,
            path,
            records_in_file: 0,
            records_written: 0,
            sequence: 0,
        };
        logger.prune()?;
        Ok(logger)
    }

    fn create_file(dir: &Path, sequence: u32) -> Result<(PathBuf, BufWriter<File>)> {
        let name = format!(
            "{}{}_{:04}.{}",
            FILE_PREFIX,
            Utc::now().format("%Y%m%d_%H%M%S"),
            sequence,
            FILE_EXTENSION
        );
        let path = dir.join(name);
        let file = File::create(&path)?;
        Ok((path, BufWriter::new(file)))
    }

    /// Append one record, rotating first if the current file is full.
    ///
    /// # Errors
    ///
    /// Returns error if serialization or the write fails.
    pub fn log(&mut self, record: &TickRecord) -> Result<()> {
        if self.records_in_file >= self.max_records_per_file {
            self.rotate()?;
        }

        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;

        self.records_in_file += 1;
        self.records_written += 1;
        Ok(())
    }

    fn rotate(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.sequence = self.sequence.wrapping_add(1);

        let (path, writer) = Self::create_file(&self.dir, self.sequence)?;
        debug!("Telemetry rotated to {}", path.display());

        self.writer = writer;
        self.path = path;
        self.records_in_file = 0;
        self.prune()
    }

    /// Delete the oldest telemetry files beyond the retention limit.
    fn prune(&self) -> Result<()> {
        let mut files: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| is_telemetry_file(path))
            .collect();

        if files.len() <= self.max_files_to_keep {
            return Ok(());
        }

        files.sort();
        let excess = files.len() - self.max_files_to_keep;
        for old in files.into_iter().take(excess) {
            if old == self.path {
                continue;
            }
            if let Err(e) = fs::remove_file(&old) {
                warn!("Failed to remove old telemetry file {}: {}", old.display(), e);
            }
        }
        Ok(())
    }

    /// Flush buffered records to disk.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// File currently being written.
    pub fn current_path(&self) -> &Path {
        &self.path
    }

    /// Records written since creation, across all files.
    pub fn records_written(&self) -> u64 {
        self.records_written
    }
}

impl Drop for TelemetryLogger {
    fn drop(&mut self) {
        if let Err(e) = self.writer.flush() {
            warn!("Failed to flush telemetry on close: {}", e);
        }
    }
}

fn is_telemetry_file(path: &Path) -> bool {
    let name_matches = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(FILE_PREFIX));
    let ext_matches = path.extension().and_then(|e| e.to_str()) == Some(FILE_EXTENSION);
    name_matches && ext_matches
}
