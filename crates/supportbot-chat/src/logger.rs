//! Conversation logger.
//!
//! Appends each exchange to `<log_dir>/conversation_YYYYMMDD.json`, a JSON
//! array rewritten on every append.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{Local, NaiveDate};
use tracing::{debug, warn};

use supportbot_core::types::LogEntry;

use crate::error::ChatError;
use crate::knowledge::to_pretty_json;

/// Writes exchanges to per-day JSON files.
#[derive(Debug)]
pub struct ConversationLogger {
    log_dir: Option<PathBuf>,
    // Serializes the read-modify-write of a day file.
    write_lock: Mutex<()>,
}

impl ConversationLogger {
    /// Logger writing into `log_dir` (created on first write).
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: Some(log_dir.into()),
            write_lock: Mutex::new(()),
        }
    }

    /// Logger that drops every entry.
    pub fn disabled() -> Self {
        Self {
            log_dir: None,
            write_lock: Mutex::new(()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.log_dir.is_some()
    }

    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }

    /// Path of the log file for `date`.
    pub fn file_for(&self, date: NaiveDate) -> Option<PathBuf> {
        self.log_dir
            .as_ref()
            .map(|dir| dir.join(format!("conversation_{}.json", date.format("%Y%m%d"))))
    }

    /// Append `entry` to today's file.
    ///
    /// Returns the file written, or `None` when logging is disabled.
    pub fn log(&self, entry: &LogEntry) -> Result<Option<PathBuf>, ChatError> {
        self.log_on(Local::now().date_naive(), entry)
    }

    /// Append `entry` to the file for `date`.
    pub fn log_on(&self, date: NaiveDate, entry: &LogEntry) -> Result<Option<PathBuf>, ChatError> {
        let Some(path) = self.file_for(date) else {
            return Ok(None);
        };
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| ChatError::Log(format!("log lock poisoned: {}", e)))?;

        if let Some(dir) = &self.log_dir {
            fs::create_dir_all(dir)
                .map_err(|e| ChatError::Log(format!("failed to create {}: {}", dir.display(), e)))?;
        }

        let mut entries = read_entries(&path)?;
        entries.push(entry.clone());

        let json = to_pretty_json(&entries)
            .map_err(|e| ChatError::Log(format!("failed to serialize log: {}", e)))?;
        fs::write(&path, json)
            .map_err(|e| ChatError::Log(format!("failed to write {}: {}", path.display(), e)))?;

        debug!(path = %path.display(), entries = entries.len(), "Exchange logged");
        Ok(Some(path))
    }

    /// Append `entry`, reporting failures as a warning instead of an error.
    pub fn log_or_warn(&self, entry: &LogEntry) {
        if let Err(e) = self.log(entry) {
            warn!(error = %e, "Could not save conversation log");
        }
    }

    /// All entries logged on `date`. Missing files yield an empty list.
    pub fn entries_for(&self, date: NaiveDate) -> Result<Vec<LogEntry>, ChatError> {
        match self.file_for(date) {
            Some(path) => read_entries(&path),
            None => Ok(Vec::new()),
        }
    }
}

fn read_entries(path: &Path) -> Result<Vec<LogEntry>, ChatError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path)
        .map_err(|e| ChatError::Log(format!("failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&content)
        .map_err(|e| ChatError::Log(format!("failed to parse {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use supportbot_core::types::ConversationContext;

    fn entry(input: &str) -> LogEntry {
        LogEntry::new(Some("Alice"), input, "reply", &ConversationContext::default())
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    #[test]
    fn test_file_name_format() {
        let logger = ConversationLogger::new("/var/log/bot");
        assert_eq!(
            logger.file_for(date()).unwrap(),
            PathBuf::from("/var/log/bot/conversation_20240309.json")
        );
    }

    #[test]
    fn test_log_creates_directory_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let logger = ConversationLogger::new(dir.path().join("logs"));
        let path = logger.log_on(date(), &entry("hello")).unwrap().unwrap();
        assert!(path.exists());

        let entries = logger.entries_for(date()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].user, "Alice");
        assert_eq!(entries[0].user_input, "hello");
    }

    #[test]
    fn test_log_appends_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let logger = ConversationLogger::new(dir.path());
        logger.log_on(date(), &entry("one")).unwrap();
        logger.log_on(date(), &entry("two")).unwrap();
        logger.log_on(date(), &entry("three")).unwrap();

        let inputs: Vec<String> = logger
            .entries_for(date())
            .unwrap()
            .into_iter()
            .map(|e| e.user_input)
            .collect();
        assert_eq!(inputs, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_log_separate_days_separate_files() {
        let dir = tempfile::tempdir().unwrap();
        let logger = ConversationLogger::new(dir.path());
        let next = date().succ_opt().unwrap();
        logger.log_on(date(), &entry("day one")).unwrap();
        logger.log_on(next, &entry("day two")).unwrap();
        assert_eq!(logger.entries_for(date()).unwrap().len(), 1);
        assert_eq!(logger.entries_for(next).unwrap().len(), 1);
    }

    #[test]
    fn test_log_file_is_indented_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let logger = ConversationLogger::new(dir.path());
        let path = logger.log_on(date(), &entry("hi")).unwrap().unwrap();
        let content = fs::read_to_string(path).unwrap();
        assert!(content.starts_with("[\n    {\n        \"timestamp\""));
    }

    #[test]
    fn test_log_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let logger = ConversationLogger::new(dir.path());
        fs::write(logger.file_for(date()).unwrap(), "not json").unwrap();
        let err = logger.log_on(date(), &entry("hi")).unwrap_err();
        assert!(matches!(err, ChatError::Log(_)));
    }

    #[test]
    fn test_disabled_logger_writes_nothing() {
        let logger = ConversationLogger::disabled();
        assert!(!logger.is_enabled());
        assert!(logger.log(&entry("hi")).unwrap().is_none());
        assert!(logger.entries_for(date()).unwrap().is_empty());
    }

    #[test]
    fn test_entries_for_missing_day() {
        let dir = tempfile::tempdir().unwrap();
        let logger = ConversationLogger::new(dir.path());
        assert!(logger.entries_for(date()).unwrap().is_empty());
    }
}
