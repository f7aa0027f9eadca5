//! Main parser API
//!
//! This module provides the primary interface for the engine. `LogParser`
//! holds the engine configuration and runs the whole pipeline:
//! text → tokens → movement events → motion sessions → statistics.

use crate::config::EngineConfig;
use crate::grouper::{group_events, GroupedEvents};
use crate::stats::compute_overall_stats;
use crate::tokenizer::Tokenizer;
use crate::types::{EngineError, ParsedLog, Result};
use std::path::Path;

/// The main parser struct - entry point for all parsing operations
#[derive(Debug, Clone, Default)]
pub struct LogParser {
    config: EngineConfig,
}

impl LogParser {
    /// Create a parser with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with a custom configuration
    ///
    /// # Example
    /// ```
    /// use accel_log_parser::{EngineConfig, LogParser};
    ///
    /// let config = EngineConfig::new().with_activation_threshold(0.2);
    /// let parser = LogParser::with_config(config).unwrap();
    /// assert_eq!(parser.config().activation_threshold, 0.2);
    /// ```
    pub fn with_config(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Parse a complete log buffer
    ///
    /// # Returns
    /// * `Ok(ParsedLog)` - events, overall statistics and diagnostics
    /// * `Err(EngineError::InvalidInput)` - empty buffer or binary content
    /// * `Err(EngineError::EmptyResult)` - no startup event holds any sample
    ///
    /// # Example
    /// ```
    /// use accel_log_parser::LogParser;
    ///
    /// let log = "DEVICE STARTUP: 2024-03-15 08:30:00\n\
    ///            2024-03-15 08:30:00.000, 0.0, 0.0\n\
    ///            2024-03-15 08:30:01.000, 0.9, 0.4\n\
    ///            2024-03-15 08:30:03.000, 0.0, 0.0\n";
    /// let parsed = LogParser::new().parse_str(log).unwrap();
    /// assert_eq!(parsed.overall_stats.total_sessions, 1);
    /// ```
    pub fn parse_str(&self, text: &str) -> Result<ParsedLog> {
        let grouped = self.group_str(text)?;

        if !grouped.has_samples() {
            return Err(EngineError::EmptyResult {
                events: grouped.total_events,
                malformed_lines: grouped.diagnostics.malformed_lines,
            });
        }

        let overall_stats = compute_overall_stats(&grouped.movement_events, &self.config);
        log::debug!(
            "Parsed {} events, {} motion sessions on {} day(s)",
            overall_stats.total_events,
            overall_stats.total_sessions,
            overall_stats.days_with_motion
        );

        Ok(ParsedLog {
            movement_events: grouped.movement_events,
            overall_stats,
            diagnostics: grouped.diagnostics,
            config: self.config.clone(),
        })
    }

    /// Parse a raw byte buffer, which must be UTF-8 text
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<ParsedLog> {
        let text = std::str::from_utf8(bytes).map_err(|e| {
            EngineError::InvalidInput(format!("buffer is not UTF-8 text: {}", e))
        })?;
        self.parse_str(text)
    }

    /// Read a log file fully into memory and parse it
    pub fn parse_file(&self, path: &Path) -> Result<ParsedLog> {
        log::info!("Parsing accelerometer log: {:?}", path);

        let bytes = std::fs::read(path)?;
        self.parse_bytes(&bytes)
    }

    /// Tokenize and group without escalating an empty result
    ///
    /// Only `InvalidInput` is returned as an error; a buffer with no usable
    /// events yields an empty `GroupedEvents`.
    pub fn group_str(&self, text: &str) -> Result<GroupedEvents> {
        let text = validate_text(text)?;

        let mut tokenizer = Tokenizer::new(text);
        let mut grouped = group_events(tokenizer.by_ref(), self.config.max_malformed_examples);

        let line_stats = tokenizer.stats();
        grouped.diagnostics.total_lines = line_stats.total_lines;
        grouped.diagnostics.blank_lines = line_stats.blank_lines;
        grouped.diagnostics.comment_lines = line_stats.comment_lines;

        Ok(grouped)
    }
}

/// Parse a buffer with the default configuration
pub fn parse_accel_log(text: &str) -> Result<ParsedLog> {
    LogParser::new().parse_str(text)
}

/// Reject buffers that are empty or binary; strips a UTF-8 BOM
fn validate_text(text: &str) -> Result<&str> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    if text.trim().is_empty() {
        return Err(EngineError::InvalidInput("buffer is empty".to_string()));
    }
    if text.contains('\0') {
        return Err(EngineError::InvalidInput(
            "buffer contains NUL bytes (binary data?)".to_string(),
        ));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const LOG: &str = "\
DEVICE STARTUP: 2024-03-15 08:30:00
2024-03-15 08:30:00.000, 0.00, 0.00
2024-03-15 08:30:01.000, 0.40, 0.30
2024-03-15 08:30:02.500, 0.02, 0.01
2024-03-15 08:30:04.000, 0.01, 0.00
";

    #[test]
    fn test_parse_simple_log() {
        let parsed = LogParser::new().parse_str(LOG).unwrap();
        assert_eq!(parsed.movement_events.len(), 1);
        assert_eq!(parsed.overall_stats.total_sessions, 1);
        assert_eq!(parsed.overall_stats.total_active_time, 1.5);
        assert_eq!(parsed.overall_stats.total_idle_time, 2.5);
        assert!(parsed.diagnostics.is_clean());
        assert_eq!(parsed.diagnostics.total_lines, 5);
    }

    #[test]
    fn test_empty_buffer_is_invalid() {
        for text in ["", "   \n\t\n"] {
            let err = LogParser::new().parse_str(text).unwrap_err();
            assert!(matches!(err, EngineError::InvalidInput(_)));
        }
    }

    #[test]
    fn test_binary_buffer_is_invalid() {
        let err = LogParser::new().parse_bytes(&[0xff, 0xfe, 0x00, 0x41]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));

        let err = LogParser::new().parse_str("DEVICE STARTUP\0").unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[test]
    fn test_bom_is_ignored() {
        let with_bom = format!("\u{feff}{}", LOG);
        let parsed = LogParser::new().parse_str(&with_bom).unwrap();
        assert_eq!(parsed.movement_events.len(), 1);
    }

    #[test]
    fn test_markers_without_samples_is_empty_result() {
        let err = LogParser::new()
            .parse_str("DEVICE STARTUP: 2024-03-15 08:30:00\nnoise\n")
            .unwrap_err();
        match err {
            EngineError::EmptyResult { events, malformed_lines } => {
                assert_eq!(events, 1);
                assert_eq!(malformed_lines, 1);
            }
            other => panic!("expected EmptyResult, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EngineConfig::new().with_min_session_duration(-1.0);
        assert!(matches!(
            LogParser::with_config(config),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_parse_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(LOG.as_bytes()).unwrap();

        let parsed = LogParser::new().parse_file(file.path()).unwrap();
        assert_eq!(parsed.overall_stats.total_samples, 4);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = LogParser::new()
            .parse_file(Path::new("does/not/exist.txt"))
            .unwrap_err();
        assert!(matches!(err, EngineError::IoError(_)));
    }
}
