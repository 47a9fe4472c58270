//! Size-rotating file writer

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt::MakeWriter;

use crate::logger::config::{FileConfig, RotationConfig};
use crate::logger::error::LoggerError;

/// File writer that rotates `app.log` into `app.log.1 .. app.log.N`.
///
/// After a failed rotation or write the writer switches to stderr for the
/// rest of the process.
#[derive(Clone)]
pub struct RotatingFileWriter {
    state: Arc<Mutex<WriterState>>,
    path: PathBuf,
    rotation: RotationConfig,
}

struct WriterState {
    file: BufWriter<File>,
    current_size: u64,
    fallback_mode: bool,
}

impl RotatingFileWriter {
    pub fn new(config: &FileConfig) -> Result<Self, LoggerError> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = open_log_file(&config.path, config.append)?;
        let current_size = if config.append {
            fs::metadata(&config.path).map(|m| m.len()).unwrap_or(0)
        } else {
            0
        };

        Ok(Self {
            state: Arc::new(Mutex::new(WriterState {
                file,
                current_size,
                fallback_mode: false,
            })),
            path: config.path.clone(),
            rotation: config.rotation.clone(),
        })
    }

    pub fn is_in_fallback_mode(&self) -> bool {
        self.state.lock().map(|s| s.fallback_mode).unwrap_or(true)
    }
}

impl<'a> MakeWriter<'a> for RotatingFileWriter {
    type Writer = RotatingWriterGuard;

    fn make_writer(&'a self) -> Self::Writer {
        RotatingWriterGuard {
            writer: self.clone(),
        }
    }
}

/// Per-event handle returned by [`RotatingFileWriter::make_writer`].
pub struct RotatingWriterGuard {
    writer: RotatingFileWriter,
}

impl Write for RotatingWriterGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let writer = &self.writer;
        let mut state = writer
            .state
            .lock()
            .map_err(|_| io::Error::other("Failed to acquire writer lock"))?;

        if state.fallback_mode {
            return io::stderr().write(buf);
        }

        if state.current_size >= writer.rotation.max_size {
            let rotated = state
                .file
                .flush()
                .map_err(LoggerError::from)
                .and_then(|_| rotate_files(&writer.path, writer.rotation.max_files))
                .and_then(|_| open_log_file(&writer.path, false).map_err(LoggerError::from));

            match rotated {
                Ok(file) => {
                    state.file = file;
                    state.current_size = 0;
                }
                Err(e) => {
                    state.fallback_mode = true;
                    eprintln!("[Logger] Rotation failed, falling back to stderr: {}", e);
                    return io::stderr().write(buf);
                }
            }
        }

        match state.file.write(buf) {
            Ok(written) => {
                state.current_size += written as u64;
                Ok(written)
            }
            Err(e) => {
                state.fallback_mode = true;
                eprintln!("[Logger] File write failed, falling back to stderr: {}", e);
                io::stderr().write(buf)
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self
            .writer
            .state
            .lock()
            .map_err(|_| io::Error::other("Failed to acquire writer lock"))?;

        if state.fallback_mode {
            return io::stderr().flush();
        }
        state.file.flush()
    }
}

impl Drop for RotatingWriterGuard {
    fn drop(&mut self) {
        if let Ok(mut state) = self.writer.state.lock() {
            let _ = state.file.flush();
        }
    }
}

fn numbered(path: &Path, index: usize) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".{}", index));
    PathBuf::from(name)
}

/// Shifts `path.(i)` to `path.(i+1)`, dropping the oldest, then moves `path` to `path.1`.
fn rotate_files(path: &Path, max_files: usize) -> Result<(), LoggerError> {
    let oldest = numbered(path, max_files);
    if oldest.exists() {
        fs::remove_file(&oldest)
            .map_err(|e| LoggerError::rotation(format!("remove {}: {}", oldest.display(), e)))?;
    }

    for index in (1..max_files).rev() {
        let from = numbered(path, index);
        if from.exists() {
            fs::rename(&from, numbered(path, index + 1))
                .map_err(|e| LoggerError::rotation(format!("shift {}: {}", from.display(), e)))?;
        }
    }

    if path.exists() {
        fs::rename(path, numbered(path, 1))
            .map_err(|e| LoggerError::rotation(format!("rotate {}: {}", path.display(), e)))?;
    }
    Ok(())
}

fn open_log_file(path: &Path, append: bool) -> io::Result<BufWriter<File>> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)?;

    Ok(BufWriter::new(file))
}
