//! Standard destinations: the process streams and plain append-mode files

use super::multi::MultiSink;
use crate::core::{LoggerError, Result, SharedSink, Sink};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

enum Target {
    Stdout,
    Stderr,
    File {
        path: PathBuf,
        file: Mutex<Option<File>>,
    },
}

/// A standard stream or an append-mode file
pub struct StreamSink {
    name: String,
    target: Target,
}

impl StreamSink {
    pub fn stdout() -> Self {
        Self {
            name: "stdout".to_string(),
            target: Target::Stdout,
        }
    }

    pub fn stderr() -> Self {
        Self {
            name: "stderr".to_string(),
            target: Target::Stderr,
        }
    }

    /// Open a file for appending, creating it if missing
    pub fn file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| LoggerError::open_sink(path.display().to_string(), e))?;

        Ok(Self {
            name: path.display().to_string(),
            target: Target::File {
                path,
                file: Mutex::new(Some(file)),
            },
        })
    }

    /// Open a destination by name: `stdout`, `stderr`, `file://<path>` or a file path
    pub fn open(path: &str) -> Result<Self> {
        match path {
            "stdout" => Ok(Self::stdout()),
            "stderr" => Ok(Self::stderr()),
            _ => {
                let file_path = path.strip_prefix("file://").unwrap_or(path);
                if file_path.is_empty() {
                    return Err(LoggerError::open_sink(
                        path,
                        io::Error::new(io::ErrorKind::InvalidInput, "empty path"),
                    ));
                }
                Self::file(file_path)
            }
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.target {
            Target::File { path, .. } => Some(path),
            Target::Stdout | Target::Stderr => None,
        }
    }

    /// Release the file handle. The process streams are never closed.
    pub fn close(&self) {
        if let Target::File { file, .. } = &self.target {
            if let Some(mut file) = file.lock().take() {
                let _ = file.flush();
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        match &self.target {
            Target::File { file, .. } => file.lock().is_none(),
            Target::Stdout | Target::Stderr => false,
        }
    }
}

impl Sink for StreamSink {
    fn write(&self, buf: &[u8]) -> Result<()> {
        match &self.target {
            Target::Stdout => io::stdout().lock().write_all(buf)?,
            Target::Stderr => io::stderr().lock().write_all(buf)?,
            Target::File { file, .. } => {
                let mut guard = file.lock();
                let file = guard
                    .as_mut()
                    .ok_or_else(|| LoggerError::sink_closed(&self.name))?;
                file.write_all(buf).map_err(|e| {
                    LoggerError::io_operation("writing log file", self.name.clone(), e)
                })?;
            }
        }
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        match &self.target {
            Target::Stdout => io::stdout().flush()?,
            Target::Stderr => io::stderr().flush()?,
            Target::File { file, .. } => {
                if let Some(file) = file.lock().as_mut() {
                    file.flush()?;
                    file.sync_data()?;
                }
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Releases the files opened by [`open_paths`]
#[derive(Default)]
pub struct Closer {
    sinks: Vec<Arc<StreamSink>>,
}

impl Closer {
    pub fn close(self) {
        for sink in &self.sinks {
            sink.close();
        }
    }
}

/// Open every path as one fan-out sink.
///
/// Either all paths open or none stay open: when a path fails, the ones
/// already opened by this call are closed before the error is returned.
pub fn open_paths<S: AsRef<str>>(paths: &[S]) -> Result<(SharedSink, Closer)> {
    let mut opened: Vec<Arc<StreamSink>> = Vec::with_capacity(paths.len());
    for path in paths {
        match StreamSink::open(path.as_ref()) {
            Ok(sink) => opened.push(Arc::new(sink)),
            Err(err) => {
                Closer { sinks: opened }.close();
                return Err(err);
            }
        }
    }

    let members: Vec<SharedSink> = opened
        .iter()
        .map(|sink| Arc::clone(sink) as SharedSink)
        .collect();
    Ok((MultiSink::shared(members), Closer { sinks: opened }))
}
