//! Size-bounded rotating file sink
//!
//! The primary file keeps growing until the next line would push it past
//! `max_bytes`. It is then renamed to `<path>.1`, older backups shift up by one,
//! and anything beyond `backup_count` is deleted.

use crate::core::{LineFormatter, Record, Sink, SinkError, SinkResult};
use flate2::{write::GzEncoder, Compression};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const DEFAULT_MAX_BYTES: u64 = 10_000_000;
pub const DEFAULT_BACKUP_COUNT: usize = 10;

/// When to rotate and how many backups to keep.
///
/// # Examples
///
/// ```
/// use multisink_logger::sinks::RotationPolicy;
///
/// let policy = RotationPolicy::new()
///     .with_max_bytes(1024 * 1024)
///     .with_backup_count(3)
///     .with_compression(true);
/// assert_eq!(policy.backup_count, 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Size limit of the primary file. Zero disables rotation.
    pub max_bytes: u64,
    /// Number of backups kept. Zero truncates the primary file in place.
    pub backup_count: usize,
    /// Gzip `<path>.1` right after it is rotated out
    pub compress: bool,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            backup_count: DEFAULT_BACKUP_COUNT,
            compress: false,
        }
    }
}

impl RotationPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_backup_count(mut self, backup_count: usize) -> Self {
        self.backup_count = backup_count;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }
}

/// File sink with size-based rotation.
///
/// # Examples
///
/// ```no_run
/// use multisink_logger::sinks::{RotatingFileSink, RotationPolicy};
///
/// let sink = RotatingFileSink::open("logs/app.log", RotationPolicy::default()).unwrap();
/// ```
pub struct RotatingFileSink {
    path: PathBuf,
    name: String,
    policy: RotationPolicy,
    formatter: LineFormatter,
    writer: Option<BufWriter<File>>,
    current_size: u64,
    rotations: u64,
    closed: bool,
}

impl RotatingFileSink {
    /// Open `path` for appending, creating its directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::IoFailure`] if the directory or file cannot be
    /// created.
    pub fn open<P: AsRef<Path>>(path: P, policy: RotationPolicy) -> SinkResult<Self> {
        let path = path.as_ref().to_path_buf();
        let name = path.display().to_string();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| SinkError::io_failure(&name, "creating log directory", e))?;
        }

        let (file, current_size) = open_append(&path)
            .map_err(|e| SinkError::io_failure(&name, "opening log file", e))?;

        Ok(Self {
            path,
            name,
            policy,
            formatter: LineFormatter::detailed(),
            writer: Some(BufWriter::new(file)),
            current_size,
            rotations: 0,
            closed: false,
        })
    }

    #[must_use]
    pub fn with_formatter(mut self, formatter: LineFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// Bytes in the primary file, including buffered ones
    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    /// Rotations performed since the sink was opened
    #[must_use]
    pub fn rotations(&self) -> u64 {
        self.rotations
    }

    /// Path of backup `index`, e.g. `app.log.2`
    pub fn backup_path(&self, index: usize) -> PathBuf {
        with_suffix(&self.path, &format!(".{}", index))
    }

    fn should_rotate(&self, incoming: u64) -> bool {
        // An empty file takes any line, however long
        self.policy.max_bytes > 0
            && self.current_size > 0
            && self.current_size + incoming > self.policy.max_bytes
    }

    fn io_error(&self, operation: &str, source: io::Error) -> SinkError {
        SinkError::io_failure(&self.name, operation, source)
    }

    fn rotate(&mut self) -> SinkResult<()> {
        if let Some(mut writer) = self.writer.take() {
            writer
                .flush()
                .map_err(|e| self.io_error("flushing before rotation", e))?;
        }

        if self.policy.backup_count > 0 {
            self.shift_backups()?;

            let first = self.backup_path(1);
            fs::rename(&self.path, &first)
                .map_err(|e| self.io_error("renaming current log file", e))?;

            if self.policy.compress {
                if let Err(e) = compress_file(&first) {
                    eprintln!(
                        "[LOGGER WARNING] Failed to compress {}: {}. Keeping it uncompressed.",
                        first.display(),
                        e
                    );
                }
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)
            .map_err(|e| self.io_error("creating fresh log file", e))?;

        self.writer = Some(BufWriter::new(file));
        self.current_size = 0;
        self.rotations += 1;
        Ok(())
    }

    /// Drop the oldest backup and move `.k` to `.k+1`, plain and gzipped forms alike.
    fn shift_backups(&self) -> SinkResult<()> {
        let oldest = self.backup_path(self.policy.backup_count);
        for path in [with_suffix(&oldest, ".gz"), oldest] {
            remove_if_exists(&path).map_err(|e| self.io_error("removing oldest backup", e))?;
        }

        for index in (1..self.policy.backup_count).rev() {
            let from = self.backup_path(index);
            let to = self.backup_path(index + 1);
            for (from, to) in [
                (with_suffix(&from, ".gz"), with_suffix(&to, ".gz")),
                (from, to),
            ] {
                if from.exists() {
                    rename_replacing(&from, &to)
                        .map_err(|e| self.io_error("shifting backups", e))?;
                }
            }
        }
        Ok(())
    }

    /// Bring the primary file back after a failed rotation.
    fn reopen(&mut self) -> SinkResult<()> {
        let (file, size) =
            open_append(&self.path).map_err(|e| self.io_error("reopening log file", e))?;
        self.writer = Some(BufWriter::new(file));
        self.current_size = size;
        Ok(())
    }
}

impl Sink for RotatingFileSink {
    fn write(&mut self, record: &Record) -> SinkResult<()> {
        if self.closed {
            return Err(SinkError::closed(&self.name));
        }

        let mut line = self.formatter.format(record);
        line.push('\n');
        let len = line.len() as u64;

        if self.should_rotate(len) {
            if let Err(e) = self.rotate() {
                if self.writer.is_none() {
                    if let Err(reopen_err) = self.reopen() {
                        eprintln!("[LOGGER ERROR] {}", reopen_err);
                    }
                }
                return Err(e);
            }
        }

        if self.writer.is_none() {
            self.reopen()?;
        }
        let result = match self.writer.as_mut() {
            Some(writer) => writer.write_all(line.as_bytes()),
            None => return Err(SinkError::closed(&self.name)),
        };
        result.map_err(|e| self.io_error("writing record", e))?;

        self.current_size += len;
        Ok(())
    }

    fn flush(&mut self) -> SinkResult<()> {
        let result = match self.writer.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        };
        result.map_err(|e| self.io_error("flushing", e))
    }

    fn close(&mut self) -> SinkResult<()> {
        self.closed = true;
        match self.writer.take() {
            Some(mut writer) => writer.flush().map_err(|e| self.io_error("closing", e)),
            None => Ok(()),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for RotatingFileSink {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.flush();
        }
    }
}

fn open_append(path: &Path) -> io::Result<(File, u64)> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let size = file.metadata()?.len();
    Ok((file, size))
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// Rename, removing the destination first on platforms that refuse to overwrite.
fn rename_replacing(from: &Path, to: &Path) -> io::Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    remove_if_exists(to)?;
    fs::rename(from, to)
}

/// Gzip `path` into `path.gz` via a temporary file; the original is removed
/// only once the archive is complete.
fn compress_file(path: &Path) -> io::Result<()> {
    let gz_path = with_suffix(path, ".gz");
    let temp_path = with_suffix(path, ".gz.tmp");

    if let Err(e) = write_gzip(path, &temp_path).and_then(|()| fs::rename(&temp_path, &gz_path)) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    if let Err(e) = fs::remove_file(path) {
        eprintln!(
            "[LOGGER WARNING] Compressed {} but could not remove it: {}",
            path.display(),
            e
        );
    }
    Ok(())
}

fn write_gzip(source: &Path, destination: &Path) -> io::Result<()> {
    let mut reader = BufReader::with_capacity(64 * 1024, File::open(source)?);
    let output = BufWriter::with_capacity(64 * 1024, File::create(destination)?);
    let mut encoder = GzEncoder::new(output, Compression::default());
    io::copy(&mut reader, &mut encoder)?;
    encoder.finish()?.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Origin, Severity};
    use flate2::read::GzDecoder;
    use std::io::Read;
    use tempfile::tempdir;

    fn record(message: &str) -> Record {
        Record::new(Severity::Info, message, Origin::new("files", "files.rs", 1))
    }

    fn compact_sink(path: &Path, policy: RotationPolicy) -> RotatingFileSink {
        RotatingFileSink::open(path, policy)
            .unwrap()
            .with_formatter(LineFormatter::compact())
    }

    #[test]
    fn test_open_creates_directory_and_seeds_size() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/logs/app.log");

        let mut sink = compact_sink(&path, RotationPolicy::default());
        sink.write(&record("hello")).unwrap();
        sink.close().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "INFO: hello\n");

        let reopened = RotatingFileSink::open(&path, RotationPolicy::default()).unwrap();
        assert_eq!(reopened.current_size(), 12);
    }

    #[test]
    fn test_failed_rotation_reopens_primary_and_recovers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        let blocker = dir.path().join("app.log.1");
        fs::create_dir(&blocker).unwrap();
        fs::write(blocker.join("keep"), "x").unwrap();

        let policy = RotationPolicy::new().with_max_bytes(30).with_backup_count(1);
        let mut sink = compact_sink(&path, policy);
        sink.write(&record("line-0")).unwrap();
        sink.write(&record("line-1")).unwrap();

        let err = sink.write(&record("line-2")).unwrap_err();
        assert!(err.is_io_failure(), "{}", err);
        assert_eq!(sink.rotations(), 0);
        assert_eq!(sink.current_size(), 26);
        sink.flush().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "INFO: line-0\nINFO: line-1\n");

        fs::remove_dir_all(&blocker).unwrap();
        sink.write(&record("line-3")).unwrap();
        sink.close().unwrap();

        assert_eq!(sink.rotations(), 1);
        assert_eq!(fs::read_to_string(&blocker).unwrap(), "INFO: line-0\nINFO: line-1\n");
        assert_eq!(fs::read_to_string(&path).unwrap(), "INFO: line-3\n");
    }

    #[test]
    fn test_rotation_moves_primary_to_first_backup() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        // Each line is "INFO: line-N\n" = 13 bytes
        let mut sink = compact_sink(&path, RotationPolicy::new().with_max_bytes(30));

        for n in 0..3 {
            sink.write(&record(&format!("line-{}", n))).unwrap();
        }
        sink.flush().unwrap();

        assert_eq!(sink.rotations(), 1);
        assert_eq!(
            fs::read_to_string(sink.backup_path(1)).unwrap(),
            "INFO: line-0\nINFO: line-1\n"
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), "INFO: line-2\n");
        assert_eq!(sink.current_size(), 13);
    }

    #[test]
    fn test_oldest_backup_is_dropped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        let policy = RotationPolicy::new().with_max_bytes(13).with_backup_count(2);
        let mut sink = compact_sink(&path, policy);

        for n in 0..5 {
            sink.write(&record(&format!("line-{}", n))).unwrap();
        }
        sink.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "INFO: line-4\n");
        assert_eq!(fs::read_to_string(sink.backup_path(1)).unwrap(), "INFO: line-3\n");
        assert_eq!(fs::read_to_string(sink.backup_path(2)).unwrap(), "INFO: line-2\n");
        assert!(!sink.backup_path(3).exists());
    }

    #[test]
    fn test_zero_backups_truncates_in_place() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        let policy = RotationPolicy::new().with_max_bytes(13).with_backup_count(0);
        let mut sink = compact_sink(&path, policy);

        sink.write(&record("line-0")).unwrap();
        sink.write(&record("line-1")).unwrap();
        sink.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "INFO: line-1\n");
        assert!(!sink.backup_path(1).exists());
    }

    #[test]
    fn test_oversized_line_goes_into_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut sink = compact_sink(&path, RotationPolicy::new().with_max_bytes(8));

        sink.write(&record("much longer than eight bytes")).unwrap();
        assert_eq!(sink.rotations(), 0);

        sink.write(&record("next")).unwrap();
        assert_eq!(sink.rotations(), 1);
    }

    #[test]
    fn test_zero_max_bytes_never_rotates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut sink = compact_sink(&path, RotationPolicy::new().with_max_bytes(0));

        for n in 0..50 {
            sink.write(&record(&format!("line-{}", n))).unwrap();
        }
        assert_eq!(sink.rotations(), 0);
        assert_eq!(sink.current_size(), 50 * 13 + 40);
    }

    #[test]
    fn test_compressed_backup() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        let policy = RotationPolicy::new().with_max_bytes(13).with_compression(true);
        let mut sink = compact_sink(&path, policy);

        sink.write(&record("line-0")).unwrap();
        sink.write(&record("line-1")).unwrap();
        sink.write(&record("line-2")).unwrap();
        sink.close().unwrap();

        let first = with_suffix(&sink.backup_path(1), ".gz");
        let second = with_suffix(&sink.backup_path(2), ".gz");
        assert!(!sink.backup_path(1).exists());

        let mut contents = String::new();
        GzDecoder::new(File::open(&second).unwrap())
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "INFO: line-0\n");
        assert!(first.exists());
    }

    #[test]
    fn test_write_after_close_fails() {
        let dir = tempdir().unwrap();
        let mut sink = compact_sink(&dir.path().join("app.log"), RotationPolicy::default());
        sink.close().unwrap();
        assert!(matches!(
            sink.write(&record("late")),
            Err(SinkError::Closed { .. })
        ));
    }

    #[test]
    fn test_open_fails_when_parent_is_a_file() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, b"x").unwrap();

        let result = RotatingFileSink::open(blocker.join("app.log"), RotationPolicy::default());
        assert!(matches!(result, Err(ref e) if e.is_io_failure()));
    }
}
