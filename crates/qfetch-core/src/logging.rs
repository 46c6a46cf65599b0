//! Logging init: size-rotated file under XDG state dir, or stderr.

use anyhow::Result;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Used when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "info,qfetch=debug,qfetch_core=debug";

/// Rotate the log once it grows past this size.
const MAX_LOG_BYTES: u64 = 1024 * 1024;

/// Number of rotated logs kept (`qfetch.log.1` .. `qfetch.log.10`).
const KEEP_ROTATED: usize = 10;

/// Writer that is either a file or stderr (used when file clone fails).
enum FileOrStderr {
    File(std::fs::File),
    Stderr,
}

impl io::Write for FileOrStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            FileOrStderr::File(f) => f.write(buf),
            FileOrStderr::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            FileOrStderr::File(f) => f.flush(),
            FileOrStderr::Stderr => io::stderr().lock().flush(),
        }
    }
}

fn rotated_name(path: &Path, n: usize) -> PathBuf {
    let mut o = path.as_os_str().to_owned();
    o.push(format!(".{n}"));
    PathBuf::from(o)
}

/// Shift `path` to `path.1`, `path.1` to `path.2`, and so on when `path` is
/// larger than `max_bytes`. The oldest of `keep` backups is dropped.
pub fn rotate_if_needed(path: &Path, max_bytes: u64, keep: usize) -> io::Result<bool> {
    let len = match fs::metadata(path) {
        Ok(m) => m.len(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };
    if len <= max_bytes || keep == 0 {
        return Ok(false);
    }
    for n in (1..keep).rev() {
        let from = rotated_name(path, n);
        if from.exists() {
            fs::rename(&from, rotated_name(path, n + 1))?;
        }
    }
    fs::rename(path, rotated_name(path, 1))?;
    Ok(true)
}

fn open_append(path: &Path) -> io::Result<fs::File> {
    fs::OpenOptions::new().create(true).append(true).open(path)
}

/// Log file that rotates itself once it grows past `max_bytes`. The size is
/// checked each time a writer is handed out, so long-running services
/// rotate too, not only at startup.
struct RotatingFile {
    path: PathBuf,
    max_bytes: u64,
    keep: usize,
    file: Mutex<Option<fs::File>>,
}

impl RotatingFile {
    fn open(path: PathBuf, max_bytes: u64, keep: usize) -> io::Result<(Self, bool)> {
        let rotated = rotate_if_needed(&path, max_bytes, keep)?;
        let file = open_append(&path)?;
        let this = Self {
            path,
            max_bytes,
            keep,
            file: Mutex::new(Some(file)),
        };
        Ok((this, rotated))
    }

    fn current(&self) -> io::Result<fs::File> {
        let mut guard = self
            .file
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))?;
        let full = match guard.as_ref() {
            Some(f) => f.metadata()?.len() > self.max_bytes,
            None => true,
        };
        if full {
            *guard = None;
            rotate_if_needed(&self.path, self.max_bytes, self.keep)?;
            *guard = Some(open_append(&self.path)?);
        }
        match guard.as_ref() {
            Some(f) => f.try_clone(),
            None => Err(io::Error::new(io::ErrorKind::Other, "log file not open")),
        }
    }
}

impl<'a> MakeWriter<'a> for RotatingFile {
    type Writer = FileOrStderr;

    fn make_writer(&'a self) -> Self::Writer {
        self.current()
            .map(FileOrStderr::File)
            .unwrap_or(FileOrStderr::Stderr)
    }
}

/// Initialize structured logging to `~/.local/state/qfetch/qfetch.log`.
/// On failure (e.g. log dir unwritable), returns Err so the caller can fall back to stderr.
pub fn init_logging() -> Result<()> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("qfetch")?;
    let log_dir = xdg_dirs.get_state_home().join("qfetch");

    fs::create_dir_all(&log_dir)?;
    let log_file_path: PathBuf = log_dir.join("qfetch.log");
    let (file, rotated) = RotatingFile::open(log_file_path.clone(), MAX_LOG_BYTES, KEEP_ROTATED)?;
    let writer: BoxMakeWriter = BoxMakeWriter::new(file);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    tracing::info!(rotated, "qfetch logging initialized at {}", log_file_path.display());

    Ok(())
}

/// Initialize logging to stderr only (no file). Used when init_logging() fails.
pub fn init_logging_stderr() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}
