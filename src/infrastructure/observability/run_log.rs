//! The append-only log artifact of training runs.

use crate::domain::errors::PipelineError;
use std::fs::{self, File, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::{DefaultFields, Format};
use tracing_subscriber::prelude::*;

#[derive(Debug, Clone)]
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Opens the log for appending, creating it and its directory if needed.
    pub fn open_append(&self) -> Result<File, PipelineError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| PipelineError::io(&self.path, e))
    }

    /// Last `n` lines of the log. A missing or unreadable log yields a single
    /// explanatory line.
    pub fn tail(&self, n: usize) -> Vec<String> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let lines: Vec<&str> = content.lines().collect();
                let start = lines.len().saturating_sub(n);
                lines[start..].iter().map(|l| l.to_string()).collect()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                vec![format!("No log file yet at {}", self.path.display())]
            }
            Err(e) => vec![format!("Log at {} unreadable: {}", self.path.display(), e)],
        }
    }
}

pub type FileLayer<S> = tracing_subscriber::fmt::Layer<S, DefaultFields, Format, Mutex<File>>;

/// Formatting layer for the log artifact: timestamped lines without ANSI
/// colours.
pub fn file_layer<S>(file: File) -> FileLayer<S> {
    tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
}

/// Installs the global subscriber: human-readable lines on stderr and, when a
/// log file is given, the same events without ANSI colours appended to it.
/// A second call is a no-op.
pub fn init_tracing(log_file: Option<File>) {
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let log_layer = log_file.map(file_layer);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(console_layer)
        .with(log_layer)
        .try_init()
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_tail_returns_last_lines() {
        let dir = tempfile::tempdir().unwrap();
        let log = RunLog::new(dir.path().join("artifacts").join("pipeline.log"));
        let mut file = log.open_append().unwrap();
        for i in 0..5 {
            writeln!(file, "line {i}").unwrap();
        }

        assert_eq!(log.tail(2), vec!["line 3".to_string(), "line 4".to_string()]);
        assert_eq!(log.tail(50).len(), 5);
    }

    #[test]
    fn test_append_keeps_previous_runs() {
        let dir = tempfile::tempdir().unwrap();
        let log = RunLog::new(dir.path().join("pipeline.log"));
        writeln!(log.open_append().unwrap(), "first run").unwrap();
        writeln!(log.open_append().unwrap(), "second run").unwrap();

        assert_eq!(log.tail(10), vec!["first run".to_string(), "second run".to_string()]);
    }

    #[test]
    fn test_tail_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let lines = RunLog::new(dir.path().join("absent.log")).tail(10);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("No log file yet"));
    }
}
