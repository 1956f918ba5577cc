//! Status Reader (§4.6): derives run status and a log table from on-disk
//! artifacts.
//!

use crate::layout::PathResolver;
use chrono::{DateTime, Utc};
use regex::Regex;
use simrun_common::{ClientError, Result};
use std::fmt;
use std::sync::OnceLock;

/// Run status, forming the lattice `NotStarted <= Running <= {Done, Error}`
/// (§8, status monotonicity).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    NotStarted,
    Running,
    Done,
    Error,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::NotStarted => "NOT STARTED",
            Status::Running => "RUNNING",
            Status::Done => "DONE",
            Status::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// Log severity level (newer major's `logs.txt` format).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "DEBUG" => Some(LogLevel::Debug),
            "INFO" => Some(LogLevel::Info),
            "WARNING" => Some(LogLevel::Warning),
            "ERROR" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// One row of the `{level, time, message}` log table.
#[derive(Clone, Debug, PartialEq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub time: DateTime<Utc>,
    pub message: String,
}

/// Derive the run's status from its output directory and `return_code.txt`
/// artifact, per the state machine in §4.6.
pub fn read_status(resolver: &PathResolver) -> Status {
    if !resolver.output_dir().exists() {
        return Status::NotStarted;
    }
    let rc_path = resolver.return_code();
    let Ok(content) = std::fs::read_to_string(&rc_path) else {
        return Status::Running;
    };
    match content.trim().parse::<i32>() {
        Ok(0) => Status::Done,
        Ok(_) => Status::Error,
        Err(_) => Status::Running,
    }
}

/// Read the run's log table, per §4.6.
pub fn read_logs(resolver: &PathResolver) -> Result<Vec<LogEntry>> {
    if let Some(logs_path) = resolver.logs_file() {
        return read_newer_logs(&logs_path);
    }
    read_older_logs(resolver)
}

fn read_newer_logs(path: &std::path::Path) -> Result<Vec<LogEntry>> {
    static LINE_RE: OnceLock<Regex> = OnceLock::new();
    let re = LINE_RE.get_or_init(|| Regex::new(r"^\[(?P<ts>[^\]]+)\]\s+(?P<level>\w+):\s*(?P<msg>.*)$").unwrap());

    if !path.exists() {
        return Ok(vec![]);
    }
    let content = std::fs::read_to_string(path)?;
    let mut entries = Vec::new();
    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let caps = re
            .captures(line)
            .ok_or_else(|| ClientError::MalformedLog(line.to_string()))?;
        let ts = &caps["ts"];
        let time = DateTime::parse_from_rfc3339(ts)
            .map_err(|_| ClientError::MalformedLog(line.to_string()))?
            .with_timezone(&Utc);
        let level = LogLevel::parse(&caps["level"])
            .ok_or_else(|| ClientError::MalformedLog(line.to_string()))?;
        entries.push(LogEntry {
            level,
            time,
            message: caps["msg"].to_string(),
        });
    }
    Ok(entries)
}

fn read_older_logs(resolver: &PathResolver) -> Result<Vec<LogEntry>> {
    let mut entries = Vec::new();

    if let Some(status_path) = resolver.status_file() {
        if status_path.exists() {
            let time = mtime(&status_path)?;
            let content = std::fs::read_to_string(&status_path)?;
            for line in content.lines().filter(|l| !l.trim().is_empty()) {
                entries.push(LogEntry {
                    level: LogLevel::Info,
                    time,
                    message: line.to_string(),
                });
            }
        }
    }

    if let Some(errors_path) = resolver.errors_file() {
        if errors_path.exists() {
            let time = mtime(&errors_path)?;
            let content = std::fs::read_to_string(&errors_path)?;
            for record in content.split("FRED ERROR: ") {
                let record = record.trim();
                if record.is_empty() {
                    continue;
                }
                entries.push(LogEntry {
                    level: LogLevel::Error,
                    time,
                    message: record.to_string(),
                });
            }
        }
    }

    Ok(entries)
}

fn mtime(path: &std::path::Path) -> Result<DateTime<Utc>> {
    let meta = std::fs::metadata(path)?;
    let modified = meta.modified()?;
    Ok(DateTime::<Utc>::from(modified))
}

#[cfg(test)]
mod tests {
    use super::*;
    use simrun_submit::EngineVersion;
    use std::fs;

    fn resolver(dir: &std::path::Path, version: &str) -> PathResolver {
        PathResolver::new(dir, EngineVersion::parse(version).unwrap(), 1)
    }

    #[test]
    fn not_started_when_output_dir_absent() {
        let r = PathResolver::new("/no/such/dir", EngineVersion::parse("latest").unwrap(), 1);
        assert_eq!(read_status(&r), Status::NotStarted);
    }

    #[test]
    fn running_when_no_return_code() {
        let dir = tempfile::tempdir().unwrap();
        let r = resolver(dir.path(), "latest");
        assert_eq!(read_status(&r), Status::Running);
    }

    #[test]
    fn done_and_error_from_return_code() {
        let dir = tempfile::tempdir().unwrap();
        let r = resolver(dir.path(), "latest");
        fs::write(r.return_code(), "0").unwrap();
        assert_eq!(read_status(&r), Status::Done);

        fs::write(r.return_code(), "1").unwrap();
        assert_eq!(read_status(&r), Status::Error);
    }

    #[test]
    fn unparseable_return_code_is_running() {
        let dir = tempfile::tempdir().unwrap();
        let r = resolver(dir.path(), "latest");
        fs::write(r.return_code(), "").unwrap();
        assert_eq!(read_status(&r), Status::Running);
    }

    #[test]
    fn newer_logs_parse_iso_timestamp_lines() {
        let dir = tempfile::tempdir().unwrap();
        let r = resolver(dir.path(), "latest");
        fs::write(
            r.logs_file().unwrap(),
            "[2024-01-02T03:04:05Z] INFO: starting run\n[2024-01-02T03:05:00Z] ERROR: boom\n",
        )
        .unwrap();

        let entries = read_logs(&r).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].level, LogLevel::Info);
        assert_eq!(entries[1].level, LogLevel::Error);
        assert_eq!(entries[1].message, "boom");
    }

    #[test]
    fn newer_logs_reject_unknown_level() {
        let dir = tempfile::tempdir().unwrap();
        let r = resolver(dir.path(), "latest");
        fs::write(r.logs_file().unwrap(), "[2024-01-02T03:04:05Z] TRACE: huh\n").unwrap();

        let err = read_logs(&r).unwrap_err();
        assert!(matches!(err, ClientError::MalformedLog(_)));
    }

    #[test]
    fn older_logs_combine_status_and_errors() {
        let dir = tempfile::tempdir().unwrap();
        let r = resolver(dir.path(), "10.1.1");
        let run_dir = r.run_output_dir();
        fs::create_dir_all(&run_dir).unwrap();
        fs::write(r.status_file().unwrap(), "begin run\nfinished step 1\n").unwrap();
        fs::write(
            r.errors_file().unwrap(),
            "FRED ERROR: bad config\nFRED ERROR: missing file\n",
        )
        .unwrap();

        let entries = read_logs(&r).unwrap();
        assert_eq!(entries.len(), 4);
        assert!(entries[..2].iter().all(|e| e.level == LogLevel::Info));
        assert!(entries[2..].iter().all(|e| e.level == LogLevel::Error));
        assert_eq!(entries[2].message, "bad config");
    }

    #[test]
    fn older_logs_empty_when_status_missing() {
        let dir = tempfile::tempdir().unwrap();
        let r = resolver(dir.path(), "10.1.1");
        let entries = read_logs(&r).unwrap();
        assert!(entries.is_empty());
    }
}
