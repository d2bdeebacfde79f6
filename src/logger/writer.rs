//! `MakeWriter` over a rotating log file

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing_subscriber::fmt::MakeWriter;

use crate::logger::config::FileConfig;
use crate::logger::error::LoggerError;
use crate::logger::rotation::RotationManager;

/// Shared handle to the active log file.
///
/// After the first failed write or rotation the file is abandoned and every
/// later event goes to stderr; stdout is never used.
#[derive(Clone)]
pub struct RotatingFileWriter {
    state: Arc<Mutex<WriterState>>,
}

struct WriterState {
    path: PathBuf,
    /// `None` once the writer has fallen back to stderr
    file: Option<BufWriter<File>>,
    written: u64,
    rotation: RotationManager,
}

impl RotatingFileWriter {
    pub fn new(config: &FileConfig) -> Result<Self, LoggerError> {
        if let Some(parent) = config.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let file = open_log_file(&config.path, config.append)?;
        let written = match config.append {
            true => std::fs::metadata(&config.path).map(|m| m.len()).unwrap_or(0),
            false => 0,
        };

        Ok(Self {
            state: Arc::new(Mutex::new(WriterState {
                path: config.path.clone(),
                file: Some(file),
                written,
                rotation: RotationManager::new(config.rotation.clone()),
            })),
        })
    }

    #[cfg(test)]
    pub fn is_in_fallback_mode(&self) -> bool {
        self.state.lock().map(|s| s.file.is_none()).unwrap_or(false)
    }
}

impl<'a> MakeWriter<'a> for RotatingFileWriter {
    type Writer = EventWriter;

    fn make_writer(&'a self) -> Self::Writer {
        EventWriter {
            state: Arc::clone(&self.state),
        }
    }
}

/// Writer for a single event
pub struct EventWriter {
    state: Arc<Mutex<WriterState>>,
}

impl EventWriter {
    fn lock(&self) -> io::Result<MutexGuard<'_, WriterState>> {
        self.state
            .lock()
            .map_err(|_| io::Error::other("log writer lock poisoned"))
    }
}

impl Write for EventWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.lock()?;
        match state.write_to_file(buf) {
            Ok(Some(written)) => Ok(written),
            Ok(None) => io::stderr().write(buf),
            Err(e) => {
                state.file = None;
                eprintln!("[notify-relay] log file unusable, logging to stderr: {}", e);
                io::stderr().write(buf)
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.lock()?.file.as_mut() {
            Some(file) => file.flush(),
            None => io::stderr().flush(),
        }
    }
}

impl Drop for EventWriter {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock()
            && let Some(file) = state.file.as_mut()
        {
            let _ = file.flush();
        }
    }
}

impl WriterState {
    /// `Ok(None)` when already on stderr
    fn write_to_file(&mut self, buf: &[u8]) -> io::Result<Option<usize>> {
        if self.file.is_none() {
            return Ok(None);
        }

        if self.rotation.should_rotate(self.written) {
            self.rotate()?;
        }

        let Some(file) = self.file.as_mut() else {
            return Ok(None);
        };
        let written = file.write(buf)?;
        self.written += written as u64;
        Ok(Some(written))
    }

    fn rotate(&mut self) -> io::Result<()> {
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
        }
        // Close before renaming
        self.file = None;

        self.rotation
            .rotate(&self.path)
            .map_err(|e| io::Error::other(e.to_string()))?;
        self.file = Some(open_log_file(&self.path, false)?);
        self.written = 0;
        Ok(())
    }
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
