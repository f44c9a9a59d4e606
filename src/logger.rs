//! Custom logging module.
//!
//! This module provides a logger that formats records from this crate and
//! keeps the most recent ones in a bounded buffer rendered by the log panel.

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Entries kept in the log buffer.
///
pub const LOG_CAPACITY: usize = 500;

const TARGET_PREFIX: &str = "syncho_tui";

/// Shared buffer of formatted log lines, oldest first.
///
pub type LogBuffer = Arc<Mutex<VecDeque<String>>>;

/// Return an empty log buffer.
///
pub fn log_buffer() -> LogBuffer {
    Arc::new(Mutex::new(VecDeque::with_capacity(LOG_CAPACITY)))
}

/// Format a log record into a string for display
///
pub fn format_log(record: &Record) -> String {
    let timestamp = chrono::Local::now().format("%H:%M:%S%.3f");
    let level_str = match record.level() {
        Level::Error => "ERROR",
        Level::Warn => "WARN",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    };
    format!("{} {:<5} {}", timestamp, level_str, record.args())
}

/// Custom logger that captures this crate's logs into a buffer
///
pub struct CustomLogger {
    buffer: LogBuffer,
    level: LevelFilter,
}

impl CustomLogger {
    pub fn new(buffer: LogBuffer, level: LevelFilter) -> Self {
        CustomLogger { buffer, level }
    }

    /// Install as the global logger.
    ///
    pub fn init(buffer: LogBuffer, verbose: bool) -> Result<(), SetLoggerError> {
        let level = if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        };
        log::set_boxed_logger(Box::new(CustomLogger::new(buffer, level)))?;
        log::set_max_level(level);
        Ok(())
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.target().starts_with(TARGET_PREFIX)
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        // A poisoned buffer only loses log lines
        if let Ok(mut buffer) = self.buffer.lock() {
            if buffer.len() == LOG_CAPACITY {
                buffer.pop_front();
            }
            buffer.push_back(format_log(record));
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_for<'a>(target: &'a str, level: Level, args: std::fmt::Arguments<'a>) -> Record<'a> {
        Record::builder()
            .target(target)
            .level(level)
            .args(args)
            .build()
    }

    #[test]
    fn keeps_only_own_records_at_or_above_level() {
        let buffer = log_buffer();
        let logger = CustomLogger::new(buffer.clone(), LevelFilter::Info);
        logger.log(&record_for("syncho_tui::sync", Level::Info, format_args!("saved")));
        logger.log(&record_for("syncho_tui::sync", Level::Debug, format_args!("noise")));
        logger.log(&record_for("hyper::client", Level::Error, format_args!("foreign")));

        let lines = buffer.lock().unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("INFO"));
        assert!(lines[0].ends_with("saved"));
    }

    #[test]
    fn buffer_is_bounded() {
        let buffer = log_buffer();
        let logger = CustomLogger::new(buffer.clone(), LevelFilter::Debug);
        for i in 0..LOG_CAPACITY + 10 {
            logger.log(&record_for("syncho_tui", Level::Warn, format_args!("line {}", i)));
        }
        let lines = buffer.lock().unwrap();
        assert_eq!(lines.len(), LOG_CAPACITY);
        assert!(lines[0].ends_with("line 10"));
    }
}
