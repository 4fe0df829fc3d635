//! Audit trail of a migration run.
//!
//! Every outcome is traced twice: once to `tracing` for live diagnostics and
//! once into the in-memory [`MigrationLog`], which is rendered and written to
//! `migration_log.txt` when the run ends.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use tempfile::NamedTempFile;

use crate::error::AppError;

/// Name of the persisted log file.
pub const LOG_FILE_NAME: &str = "migration_log.txt";

const LOG_NAME: &str = "Migration";
const NO_DATA_MESSAGE: &str = "No migrable content detected on existing database";
const LINE_SEPARATOR: &str = "\n";

/// Severity of a trace line, mapped onto `tracing` levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
}

/// One timestamped trace line.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    pub message: String,
}

/// Where the rendered log should be written.
///
/// The preferred directory wins when it is set and writable; otherwise the
/// fallback directory is used, defaulting to the platform data directory.
#[derive(Debug, Clone, Default)]
pub struct LogDestination {
    pub preferred: Option<PathBuf>,
    pub fallback: Option<PathBuf>,
}

impl LogDestination {
    pub fn new(preferred: Option<PathBuf>) -> Self {
        Self {
            preferred,
            fallback: None,
        }
    }

    /// Overrides the default fallback directory.
    pub fn with_fallback(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fallback = Some(dir.into());
        self
    }

    fn fallback_dir(&self) -> io::Result<PathBuf> {
        match &self.fallback {
            Some(dir) => {
                fs::create_dir_all(dir)?;
                Ok(dir.clone())
            }
            None => default_log_dir(),
        }
    }
}

/// Platform local data directory for shelfmove, created on demand.
pub fn default_log_dir() -> io::Result<PathBuf> {
    let dir = dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("shelfmove");
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Whether files can be created in `dir`.
pub fn is_writable(dir: &Path) -> bool {
    dir.is_dir() && tempfile::tempfile_in(dir).is_ok()
}

/// Ordered trace lines of a single run.
#[derive(Debug, Clone, Default)]
pub struct MigrationLog {
    entries: Vec<LogEntry>,
}

impl MigrationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a trace line and forwards it to `tracing`.
    pub fn trace(&mut self, severity: Severity, message: impl Into<String>) {
        let message = message.into();
        match severity {
            Severity::Debug => tracing::debug!("{}", message),
            Severity::Info => tracing::info!("{}", message),
            Severity::Warn => tracing::warn!("{}", message),
            Severity::Error => tracing::error!("{}", message),
        }
        self.entries.push(LogEntry {
            timestamp: Utc::now(),
            severity,
            message,
        });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the log as a single text block.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("{} log : begin{}", LOG_NAME, LINE_SEPARATOR));
        out.push_str(&format!(
            "shelfmove ver: {}{}",
            env!("CARGO_PKG_VERSION"),
            LINE_SEPARATOR
        ));

        let first = self.entries.iter().map(|e| e.timestamp).min();
        let last = self.entries.iter().map(|e| e.timestamp).max();

        match (first, last) {
            (Some(start), Some(end)) => {
                let duration = (end - start).num_seconds();
                out.push_str(&format!(
                    "Start : {}{}",
                    start.to_rfc3339_opts(SecondsFormat::Millis, true),
                    LINE_SEPARATOR
                ));
                out.push_str(&format!(
                    "End : {} ({} s){}",
                    end.to_rfc3339_opts(SecondsFormat::Millis, true),
                    duration,
                    LINE_SEPARATOR
                ));
                out.push_str("-----");
                out.push_str(LINE_SEPARATOR);
                for entry in &self.entries {
                    out.push_str(&entry.message);
                    out.push_str(LINE_SEPARATOR);
                }
            }
            _ => {
                out.push_str(&format!(
                    "No activity to report - {}{}",
                    NO_DATA_MESSAGE, LINE_SEPARATOR
                ));
            }
        }

        out.push_str(&format!("{} log : end", LOG_NAME));
        out
    }

    /// Writes the rendered log and returns its path.
    ///
    /// Never fails: I/O errors are logged and reported as `None`.
    pub fn persist<F>(&self, preferred_dir: Option<&Path>, fallback_dir: F) -> Option<PathBuf>
    where
        F: FnOnce() -> io::Result<PathBuf>,
    {
        match self.write_log(preferred_dir, fallback_dir) {
            Ok(path) => {
                tracing::info!("Migration log written to {}", path.display());
                Some(path)
            }
            Err(e) => {
                tracing::error!("{}", e);
                None
            }
        }
    }

    /// Writes the rendered log to `destination`.
    pub fn persist_to(&self, destination: &LogDestination) -> Option<PathBuf> {
        self.persist(destination.preferred.as_deref(), || {
            destination.fallback_dir()
        })
    }

    fn write_log<F>(&self, preferred_dir: Option<&Path>, fallback_dir: F) -> Result<PathBuf, AppError>
    where
        F: FnOnce() -> io::Result<PathBuf>,
    {
        let dir = match preferred_dir.filter(|dir| !dir.as_os_str().is_empty()) {
            Some(dir) if is_writable(dir) => dir.to_path_buf(),
            Some(dir) => {
                tracing::warn!(
                    "Log directory {} is not writable, using default location",
                    dir.display()
                );
                fallback_dir()?
            }
            None => fallback_dir()?,
        };

        let path = dir.join(LOG_FILE_NAME);
        let mut file = NamedTempFile::new_in(&dir)?;
        file.write_all(self.render().as_bytes())?;
        file.persist(&path).map_err(|e| e.error)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_empty_log() {
        let log = MigrationLog::new();
        let rendered = log.render();

        assert!(rendered.starts_with("Migration log : begin\n"));
        assert!(rendered.contains(
            "No activity to report - No migrable content detected on existing database"
        ));
        assert!(rendered.ends_with("Migration log : end"));
        assert!(!rendered.contains("-----"));
    }

    #[test]
    fn test_render_keeps_insertion_order() {
        let mut log = MigrationLog::new();
        log.trace(Severity::Info, "first");
        log.trace(Severity::Warn, "second");
        log.trace(Severity::Error, "third");

        let rendered = log.render();
        let first = rendered.find("first").unwrap();
        let second = rendered.find("second").unwrap();
        let third = rendered.find("third").unwrap();

        assert!(first < second && second < third);
        assert!(rendered.contains("Start : "));
        assert!(rendered.contains("-----\n"));
        assert!(!rendered.contains("No activity to report"));
        assert_eq!(log.entries().len(), 3);
        assert_eq!(log.entries()[1].severity, Severity::Warn);
    }

    #[test]
    fn test_persist_to_preferred_dir() {
        let preferred = tempfile::tempdir().unwrap();
        let fallback = tempfile::tempdir().unwrap();
        let mut log = MigrationLog::new();
        log.trace(Severity::Info, "hello");

        let path = log
            .persist(Some(preferred.path()), || Ok(fallback.path().to_path_buf()))
            .expect("log should be written");

        assert_eq!(path, preferred.path().join(LOG_FILE_NAME));
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, log.render());
    }

    #[test]
    fn test_persist_falls_back_when_preferred_missing() {
        let root = tempfile::tempdir().unwrap();
        let fallback = tempfile::tempdir().unwrap();
        let missing = root.path().join("does-not-exist");

        let path = MigrationLog::new()
            .persist(Some(&missing), || Ok(fallback.path().to_path_buf()))
            .expect("log should be written");

        assert_eq!(path, fallback.path().join(LOG_FILE_NAME));
        assert!(!missing.exists());
    }

    #[test]
    fn test_persist_falls_back_when_preferred_is_a_file() {
        let root = tempfile::tempdir().unwrap();
        let not_a_dir = root.path().join("file.txt");
        fs::write(&not_a_dir, b"x").unwrap();

        let destination = LogDestination::new(Some(not_a_dir)).with_fallback(root.path().join("logs"));
        let path = MigrationLog::new()
            .persist_to(&destination)
            .expect("log should be written");

        assert_eq!(path, root.path().join("logs").join(LOG_FILE_NAME));
    }

    #[test]
    fn test_persist_failure_returns_none() {
        let result = MigrationLog::new().persist(None, || {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "no storage"))
        });
        assert!(result.is_none());
    }

    #[test]
    fn test_persist_overwrites_previous_log() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = MigrationLog::new();
        log.trace(Severity::Info, "first run");
        log.persist(Some(dir.path()), || Ok(dir.path().to_path_buf()))
            .unwrap();

        let mut log = MigrationLog::new();
        log.trace(Severity::Info, "second run");
        let path = log
            .persist(Some(dir.path()), || Ok(dir.path().to_path_buf()))
            .unwrap();

        let content = fs::read_to_string(path).unwrap();
        assert!(content.contains("second run"));
        assert!(!content.contains("first run"));
    }
}
