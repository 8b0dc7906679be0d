//! Size-based rotating file sink
//!
//! The file is opened lazily on the first write. When a write would push the
//! file past its size limit, the file is renamed to
//! `<name>-<timestamp><ext>` and a fresh file is started. After each rotation
//! old backups are pruned by count and age and, when enabled, gzip-compressed.

use crate::config::RotationTargetConfig;
use crate::core::{LoggerError, Result, Sink};
use chrono::{DateTime, Duration as ChronoDuration, Local, NaiveDateTime, TimeZone, Utc};
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const MEGABYTE: u64 = 1024 * 1024;
const BACKUP_TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3f";
const COMPRESS_SUFFIX: &str = ".gz";

struct State {
    file: Option<File>,
    size: u64,
}

pub struct RotatingFileSink {
    path: PathBuf,
    name: String,
    max_bytes: u64,
    max_age_days: u32,
    max_backups: usize,
    local_time: bool,
    compress: bool,
    state: Mutex<State>,
}

/// A rotated file found next to the active log
#[derive(Debug)]
struct Backup {
    path: PathBuf,
    timestamp: DateTime<Utc>,
    compressed: bool,
}

impl RotatingFileSink {
    /// Create the sink without touching the filesystem
    pub fn new(config: &RotationTargetConfig) -> Self {
        let path = if config.filename.is_empty() {
            default_filename()
        } else {
            PathBuf::from(&config.filename)
        };
        let max_bytes = match config.max_size {
            0 => u64::from(RotationTargetConfig::DEFAULT_MAX_SIZE) * MEGABYTE,
            mb => u64::from(mb) * MEGABYTE,
        };

        Self {
            name: path.display().to_string(),
            path,
            max_bytes,
            max_age_days: config.max_age,
            max_backups: config.max_backups as usize,
            local_time: config.local_time,
            compress: config.compress,
            state: Mutex::new(State {
                file: None,
                size: 0,
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Bytes written to the active file so far
    pub fn current_size(&self) -> u64 {
        self.state.lock().size
    }

    /// Close the active file, move it aside and start a new one
    pub fn rotate(&self) -> Result<()> {
        let mut state = self.state.lock();
        self.rotate_locked(&mut state)
    }

    fn rotate_locked(&self, state: &mut State) -> Result<()> {
        if let Some(mut file) = state.file.take() {
            file.flush().map_err(|e| {
                LoggerError::file_rotation(
                    self.name.clone(),
                    format!("Failed to flush before rotation: {}", e),
                )
            })?;
        }
        self.open_new(state)?;
        self.mill();
        Ok(())
    }

    fn open_existing_or_new(&self, state: &mut State, write_len: u64) -> Result<()> {
        let metadata = match fs::metadata(&self.path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return self.open_new(state),
            Err(e) => {
                return Err(LoggerError::io_operation(
                    "inspect log file",
                    self.name.clone(),
                    e,
                ))
            }
        };

        if metadata.len() + write_len >= self.max_bytes {
            return self.rotate_locked(state);
        }

        match OpenOptions::new().append(true).open(&self.path) {
            Ok(file) => {
                state.file = Some(file);
                state.size = metadata.len();
                Ok(())
            }
            // unreadable or vanished in between: start over with a fresh file
            Err(_) => self.open_new(state),
        }
    }

    fn open_new(&self, state: &mut State) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        if self.path.exists() {
            let backup = self.backup_path(self.now());
            fs::rename(&self.path, &backup).map_err(|e| {
                LoggerError::file_rotation(
                    self.name.clone(),
                    format!("Failed to rename to '{}': {}", backup.display(), e),
                )
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)
            .map_err(|e| {
                LoggerError::file_rotation(
                    self.name.clone(),
                    format!("Failed to create new log file: {}", e),
                )
            })?;

        state.file = Some(file);
        state.size = 0;
        Ok(())
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn backup_path(&self, at: DateTime<Utc>) -> PathBuf {
        let timestamp = if self.local_time {
            at.with_timezone(&Local).format(BACKUP_TIME_FORMAT).to_string()
        } else {
            at.format(BACKUP_TIME_FORMAT).to_string()
        };
        let (stem, ext) = self.stem_and_ext();
        self.path
            .with_file_name(format!("{}-{}{}", stem, timestamp, ext))
    }

    /// `app.log` → (`app`, `.log`)
    fn stem_and_ext(&self) -> (String, String) {
        let stem = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("lumberjack")
            .to_string();
        let ext = self
            .path
            .extension()
            .and_then(|s| s.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();
        (stem, ext)
    }

    fn parse_backup_time(&self, text: &str) -> Option<DateTime<Utc>> {
        let naive = NaiveDateTime::parse_from_str(text, BACKUP_TIME_FORMAT).ok()?;
        if self.local_time {
            Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|t| t.with_timezone(&Utc))
        } else {
            Some(naive.and_utc())
        }
    }

    /// Rotated files belonging to this sink, newest first
    fn backups(&self) -> io::Result<Vec<Backup>> {
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => parent.to_path_buf(),
            None => PathBuf::from("."),
        };
        let (stem, ext) = self.stem_and_ext();
        let prefix = format!("{}-", stem);

        let mut backups = Vec::new();
        for dir_entry in fs::read_dir(&dir)? {
            let dir_entry = dir_entry?;
            if !dir_entry.file_type()?.is_file() {
                continue;
            }
            let file_name = dir_entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            let Some(rest) = file_name.strip_prefix(&prefix) else {
                continue;
            };
            let (rest, compressed) = match rest.strip_suffix(COMPRESS_SUFFIX) {
                Some(rest) => (rest, true),
                None => (rest, false),
            };
            let Some(timestamp) = rest.strip_suffix(ext.as_str()) else {
                continue;
            };
            if let Some(timestamp) = self.parse_backup_time(timestamp) {
                backups.push(Backup {
                    path: dir_entry.path(),
                    timestamp,
                    compressed,
                });
            }
        }

        backups.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(backups)
    }

    /// Prune and compress backups. Failures are reported, never returned.
    fn mill(&self) {
        if self.max_backups == 0 && self.max_age_days == 0 && !self.compress {
            return;
        }

        let backups = match self.backups() {
            Ok(backups) => backups,
            Err(e) => {
                eprintln!(
                    "[LOGGER WARN] Failed to list backups of {}: {}",
                    self.name, e
                );
                return;
            }
        };

        let cutoff = (self.max_age_days > 0)
            .then(|| self.now() - ChronoDuration::days(i64::from(self.max_age_days)));

        let mut kept = Vec::new();
        for (index, backup) in backups.into_iter().enumerate() {
            let over_count = self.max_backups > 0 && index >= self.max_backups;
            let too_old = cutoff.is_some_and(|cutoff| backup.timestamp < cutoff);
            if over_count || too_old {
                if let Err(e) = fs::remove_file(&backup.path) {
                    eprintln!(
                        "[LOGGER WARN] Failed to remove old backup {}: {}",
                        backup.path.display(),
                        e
                    );
                }
            } else {
                kept.push(backup);
            }
        }

        if self.compress {
            for backup in kept.iter().filter(|b| !b.compressed) {
                if let Err(e) = compress_file(&backup.path) {
                    eprintln!("[LOGGER WARN] {}", e);
                }
            }
        }
    }
}

impl Sink for RotatingFileSink {
    fn write(&self, buf: &[u8]) -> Result<()> {
        let write_len = buf.len() as u64;
        if write_len > self.max_bytes {
            return Err(LoggerError::WriteTooLarge {
                len: write_len,
                max: self.max_bytes,
            });
        }

        let mut state = self.state.lock();
        if state.file.is_none() {
            self.open_existing_or_new(&mut state, write_len)?;
        }
        if state.size + write_len > self.max_bytes {
            self.rotate_locked(&mut state)?;
        }

        let file = state
            .file
            .as_mut()
            .ok_or_else(|| LoggerError::writer("Writer not initialized"))?;
        file.write_all(buf).map_err(|e| {
            LoggerError::io_operation("writing log file", self.name.clone(), e)
        })?;
        state.size += write_len;
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        if let Some(file) = self.state.lock().file.as_mut() {
            file.flush().map_err(|e| {
                LoggerError::io_operation("flushing log file", self.name.clone(), e)
            })?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for RotatingFileSink {
    fn drop(&mut self) {
        if let Some(mut file) = self.state.get_mut().file.take() {
            let _ = file.flush();
        }
    }
}

/// `<tmpdir>/<process>-lumberjack.log`
fn default_filename() -> PathBuf {
    let process = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.file_name().and_then(|n| n.to_str()).map(String::from))
        .unwrap_or_else(|| "logger".to_string());
    std::env::temp_dir().join(format!("{}-lumberjack.log", process))
}

/// Gzip `path` into `path.gz`, removing the original only once the
/// compressed copy is complete.
fn compress_file(path: &Path) -> Result<()> {
    use std::io::{BufReader, BufWriter};

    let mut gz_name = path.as_os_str().to_owned();
    gz_name.push(COMPRESS_SUFFIX);
    let gz_path = PathBuf::from(gz_name);
    let mut temp_name = gz_path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    let input = File::open(path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to open file for compression: {}", path.display()),
            e,
        )
    })?;
    let mut reader = BufReader::with_capacity(64 * 1024, input);

    let output = File::create(&temp_path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to create temporary compressed file: {}", temp_path.display()),
            e,
        )
    })?;
    let mut encoder = flate2::write::GzEncoder::new(
        BufWriter::with_capacity(64 * 1024, output),
        flate2::Compression::default(),
    );

    let streamed = io::copy(&mut reader, &mut encoder)
        .and_then(|_| encoder.finish())
        .and_then(|mut writer| writer.flush());
    if let Err(e) = streamed {
        let _ = fs::remove_file(&temp_path);
        return Err(LoggerError::io_operation(
            "compress log file",
            format!("Failed to compress {}", path.display()),
            e,
        ));
    }

    fs::rename(&temp_path, &gz_path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to rename compressed file to: {}", gz_path.display()),
            e,
        )
    })?;

    if let Err(e) = fs::remove_file(path) {
        eprintln!(
            "[LOGGER WARN] Compression succeeded but failed to remove original file {}: {}",
            path.display(),
            e
        );
    }
    Ok(())
}
