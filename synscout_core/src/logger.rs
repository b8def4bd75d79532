/*============================================================
  Synavera Project: Syn-Scout
  Module: synscout_core::logger
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1
  ------------------------------------------------------------
  Purpose:
    Provide structured, append-only logging for a scrape run
    and seal each session log with an integrity digest.

  Security / Safety Notes:
    Only run metadata (URLs, versions, paths) is logged; page
    markup is never written to the session log.

  Dependencies:
    std::fs::File, std::sync::Mutex, sha2 for integrity hashing.

  Operational Scope:
    Used by every runtime component to emit RFC-3339 UTC
    stamped entries and produce the session `.hash` digest.

  Revision History:
    2024-11-04 COD  Established logging module.
    2025-11-12 COD  Session log naming for scheduled scrapes.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Append-only logging with UTC timestamps
    - Deterministic formatting for auditability
    - Graceful error propagation on I/O failures
============================================================*/

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat, Utc};
use sha2::{Digest, Sha256};

use crate::error::{Result, SynscoutError};

/// Structured log level for Syn-Scout events.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Debug,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Debug => "DEBUG",
        }
    }

    fn always_echoed(self) -> bool {
        matches!(self, LogLevel::Warn | LogLevel::Error)
    }
}

/// Default session log location: `<dir>/scout_<stamp>.log`.
pub fn session_log_path(log_dir: &Path, started: DateTime<Utc>) -> PathBuf {
    let stamp = started.format("%Y-%m-%d_%H-%M-%S");
    log_dir.join(format!("scout_{stamp}.log"))
}

fn format_entry(at: DateTime<Utc>, level: LogLevel, code: &str, message: &str) -> String {
    format!(
        "{} [{}] [{}] {}",
        at.to_rfc3339_opts(SecondsFormat::Secs, true),
        level.as_str(),
        code,
        message
    )
}

/// Shared logger that emits append-only entries in Synavera format.
pub struct Logger {
    sink: Option<Mutex<BufWriter<File>>>,
    path: Option<PathBuf>,
    verbose: bool,
}

impl Logger {
    /// Build a logger that writes to stderr and optionally to a file.
    pub fn new(path: Option<PathBuf>, verbose: bool) -> Result<Self> {
        let sink = match path.as_deref() {
            Some(file_path) => Some(Mutex::new(BufWriter::new(open_append(file_path)?))),
            None => None,
        };
        Ok(Self {
            sink,
            path,
            verbose,
        })
    }

    /// Stderr-only logger.
    #[cfg(test)]
    pub fn quiet() -> Self {
        Self {
            sink: None,
            path: None,
            verbose: false,
        }
    }

    /// Emit a log entry with the given level, code, and message.
    pub fn log<S: AsRef<str>>(&self, level: LogLevel, code: &str, message: S) {
        let now = Utc::now();
        let payload = format_entry(now, level, code, message.as_ref());

        if self.verbose || level.always_echoed() {
            eprintln!("{payload}");
        }

        let Some(sink) = &self.sink else {
            return;
        };
        if let Ok(mut guard) = sink.lock() {
            let written = writeln!(guard, "{payload}").and_then(|_| guard.flush());
            if written.is_err() {
                eprintln!(
                    "{}",
                    format_entry(now, LogLevel::Error, "LOGGER", "Failed to write to log file")
                );
            }
        }
    }

    /// Convenience wrapper for `INFO` level events.
    pub fn info<S: AsRef<str>>(&self, code: &str, message: S) {
        self.log(LogLevel::Info, code, message);
    }

    /// Convenience wrapper for `WARN` level events.
    pub fn warn<S: AsRef<str>>(&self, code: &str, message: S) {
        self.log(LogLevel::Warn, code, message);
    }

    /// Convenience wrapper for `ERROR` level events.
    pub fn error<S: AsRef<str>>(&self, code: &str, message: S) {
        self.log(LogLevel::Error, code, message);
    }

    /// Convenience wrapper for `DEBUG` level events.
    pub fn debug<S: AsRef<str>>(&self, code: &str, message: S) {
        self.log(LogLevel::Debug, code, message);
    }

    /// Return the path backing this logger, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Compute and persist the SHA-256 digest of the session log.
    pub fn finalize(&self) -> Result<()> {
        let Some(path) = self.path() else {
            return Ok(());
        };
        let data = std::fs::read(path).map_err(|err| {
            SynscoutError::Filesystem(format!(
                "Failed to read log for hashing {}: {err}",
                path.display()
            ))
        })?;
        let digest = Sha256::digest(&data);

        let mut hash_os = path.as_os_str().to_os_string();
        hash_os.push(".hash");
        let hash_path = PathBuf::from(hash_os);
        let line = format!(
            "{:x}  {}\n",
            digest,
            path.file_name().unwrap_or_default().to_string_lossy()
        );
        std::fs::write(&hash_path, line).map_err(|err| {
            SynscoutError::Filesystem(format!(
                "Failed to write hash file {}: {err}",
                hash_path.display()
            ))
        })
    }
}

fn open_append(file_path: &Path) -> Result<File> {
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| {
            SynscoutError::Filesystem(format!(
                "Failed to create log directory {}: {err}",
                parent.display()
            ))
        })?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(file_path)
        .map_err(|err| {
            SynscoutError::Filesystem(format!(
                "Failed to open log file {}: {err}",
                file_path.display()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn entries_follow_synavera_cadence() {
        let at = Utc.with_ymd_and_hms(2025, 11, 12, 8, 30, 0).unwrap();
        let line = format_entry(at, LogLevel::Warn, "ARCHIVE", "corrupt file");
        assert_eq!(line, "2025-11-12T08:30:00Z [WARN] [ARCHIVE] corrupt file");
    }

    #[test]
    fn session_log_is_stamped() {
        let at = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let path = session_log_path(Path::new("/var/log/syn-scout"), at);
        assert_eq!(
            path,
            PathBuf::from("/var/log/syn-scout/scout_2025-01-02_03-04-05.log")
        );
    }

    #[test]
    fn finalize_writes_digest_next_to_log() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("nested").join("run.log");
        let logger = Logger::new(Some(log_path.clone()), false).unwrap();
        logger.info("INIT", "starting");
        logger.debug("FETCH", "loading page");
        logger.finalize().unwrap();

        let contents = std::fs::read_to_string(&log_path).unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.contains("[INFO] [INIT] starting"));

        let hash = std::fs::read_to_string(dir.path().join("nested").join("run.log.hash")).unwrap();
        let expected = format!("{:x}", Sha256::digest(contents.as_bytes()));
        assert_eq!(hash, format!("{expected}  run.log\n"));
    }

    #[test]
    fn finalize_without_file_is_noop() {
        assert!(Logger::quiet().finalize().is_ok());
    }
}
