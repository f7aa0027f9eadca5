//! Core types for the accelerometer log engine
//!
//! This module defines the values the engine produces when processing a log
//! buffer. Every stage returns new values; nothing here holds a reference back
//! into the raw text or into another stage's output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::stats::{EventStats, OverallStats};

/// Timestamp type used throughout the engine
///
/// Log timestamps carry no zone. They are read as wall-clock time of the
/// reporting zone and tagged UTC, so `date_naive()` is the reporting date.
pub type Timestamp = DateTime<Utc>;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Display format for a device start time (`MovementEvent::device_start_time_formatted`)
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Errors that can be returned by the engine
///
/// Malformed lines are not errors: they are skipped and counted in
/// [`ParseDiagnostics`].
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No motion data found: {events} startup event(s), none with samples ({malformed_lines} malformed line(s) skipped)")]
    EmptyResult {
        /// Startup markers seen (all of them empty)
        events: usize,
        /// Lines that were skipped as malformed
        malformed_lines: usize,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl EngineError {
    /// True for the "no motion found" condition rather than a real failure
    pub fn is_empty_result(&self) -> bool {
        matches!(self, EngineError::EmptyResult { .. })
    }
}

/// Seconds between two timestamps, at millisecond resolution
pub fn secs_between(start: Timestamp, stop: Timestamp) -> f64 {
    (stop - start).num_milliseconds() as f64 / 1000.0
}

/// One accelerometer reading inside a movement event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccelSample {
    /// Zero-based position within the owning event
    pub index: usize,
    /// Absolute sample time
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: Timestamp,
    /// X acceleration, as logged
    pub x: f64,
    /// Y acceleration, as logged
    pub y: f64,
}

impl AccelSample {
    /// Euclidean norm of the two logged components
    pub fn magnitude(&self) -> f64 {
        self.x.hypot(self.y)
    }
}

/// One device-startup session and the samples logged until the next startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementEvent {
    /// Timestamp of the startup marker
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub device_start_time: Timestamp,
    /// Display key for the startup (never reparsed)
    pub device_start_time_formatted: String,
    /// Samples in non-decreasing timestamp order
    pub accel_data: Vec<AccelSample>,
}

impl MovementEvent {
    pub fn new(device_start_time: Timestamp) -> Self {
        Self {
            device_start_time,
            device_start_time_formatted: device_start_time.format(DISPLAY_FORMAT).to_string(),
            accel_data: Vec::new(),
        }
    }

    pub fn first_sample_time(&self) -> Option<Timestamp> {
        self.accel_data.first().map(|s| s.timestamp)
    }

    pub fn last_sample_time(&self) -> Option<Timestamp> {
        self.accel_data.last().map(|s| s.timestamp)
    }

    pub fn is_empty(&self) -> bool {
        self.accel_data.is_empty()
    }
}

/// A detected interval of motion inside one movement event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionSession {
    /// 1-based number within the owning event, after filtering
    pub event_number: usize,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start: Timestamp,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub stop: Timestamp,
}

impl MotionSession {
    pub fn duration(&self) -> chrono::Duration {
        self.stop - self.start
    }

    pub fn duration_secs(&self) -> f64 {
        secs_between(self.start, self.stop)
    }

    /// Seconds from `base` (usually the first session's start) to this session's start
    pub fn offset_secs(&self, base: Timestamp) -> f64 {
        secs_between(base, self.start)
    }

    pub fn start_ms(&self) -> i64 {
        self.start.timestamp_millis()
    }

    pub fn stop_ms(&self) -> i64 {
        self.stop.timestamp_millis()
    }
}

/// Reason a log line was rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum LineIssue {
    #[error("not a startup marker or a sample line")]
    UnrecognizedShape,

    #[error("unparseable timestamp '{0}'")]
    InvalidTimestamp(String),

    #[error("unparseable numeric field '{0}'")]
    InvalidNumber(String),

    #[error("expected 2 or 3 axis values, found {0}")]
    FieldCount(usize),
}

/// A skipped line, kept for diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MalformedLine {
    /// 1-based line number in the buffer
    pub line_number: usize,
    /// The line as it appeared (trimmed)
    pub raw: String,
    pub reason: LineIssue,
}

/// Counters describing what the parse skipped or dropped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseDiagnostics {
    /// Lines read from the buffer
    pub total_lines: usize,
    /// Empty or whitespace-only lines
    pub blank_lines: usize,
    /// `//` or `;` comment lines
    pub comment_lines: usize,
    /// Lines that matched neither shape, or had bad fields
    pub malformed_lines: usize,
    /// First few malformed lines (bounded by `EngineConfig::max_malformed_examples`)
    pub malformed_examples: Vec<MalformedLine>,
    /// Samples logged before the first startup marker
    pub orphan_samples: usize,
    /// Samples dropped because their timestamp went backwards
    pub out_of_order_samples: usize,
}

impl ParseDiagnostics {
    /// True when every non-blank line was used
    pub fn is_clean(&self) -> bool {
        self.malformed_lines == 0 && self.orphan_samples == 0 && self.out_of_order_samples == 0
    }
}

/// Complete output of one parse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedLog {
    pub movement_events: Vec<MovementEvent>,
    pub overall_stats: OverallStats,
    pub diagnostics: ParseDiagnostics,
    /// Settings the log was segmented with
    pub config: EngineConfig,
}

impl ParsedLog {
    /// Statistics for one movement event (0-based)
    pub fn event_stats(&self, index: usize) -> Option<EventStats> {
        self.movement_events
            .get(index)
            .map(|event| crate::stats::compute_event_stats(event, &self.config))
    }

    /// Statistics for the merged "all sessions" view
    pub fn all_sessions(&self) -> EventStats {
        crate::stats::merge_all_sessions(&self.movement_events, &self.config)
    }
}
