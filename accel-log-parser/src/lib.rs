//! Accelerometer Log Parser Library
//!
//! A pure, reusable engine that turns a plain-text accelerometer log from a
//! wearable/embedded motion sensor into motion statistics.
//!
//! # Architecture
//!
//! The pipeline only moves forward, and every stage returns new values:
//! - Tokenizes log lines into startup markers, (x, y) samples or malformed lines
//! - Groups samples into movement events, one per device startup
//! - Detects motion sessions with a magnitude threshold and a minimum duration
//! - Aggregates per-event, file-wide and per-day statistics
//!
//! The library does NOT:
//! - Stream or watch files
//! - Persist results
//! - Render charts or reports
//!
//! Rendering lives in the application layer (accel-log-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use accel_log_parser::{EngineConfig, LogParser};
//! use std::path::Path;
//!
//! let config = EngineConfig::new()
//!     .with_activation_threshold(0.15)
//!     .with_min_session_duration(1.0);
//! let parser = LogParser::with_config(config).unwrap();
//!
//! let parsed = parser.parse_file(Path::new("accel_log.txt")).unwrap();
//! for (i, event) in parsed.movement_events.iter().enumerate() {
//!     let stats = parsed.event_stats(i).unwrap();
//!     println!(
//!         "{}: {} motion sessions, {:.2}s active",
//!         event.device_start_time_formatted, stats.total_sessions, stats.active_time
//!     );
//! }
//! println!("Days with motion: {:?}", parsed.overall_stats.days_with_motion_list);
//! ```

// Public modules
pub mod config;
pub mod grouper;
pub mod parser;
pub mod segmenter;
pub mod stats;
pub mod tokenizer;
pub mod types;

// Re-export main types for convenience
pub use config::EngineConfig;
pub use grouper::{group_events, GroupedEvents};
pub use parser::{parse_accel_log, LogParser};
pub use segmenter::{detect_candidates, filter_sessions, magnitude, segment_event, CandidateSession};
pub use stats::{
    compute_event_stats, compute_overall_stats, merge_all_sessions, EventStats, OverallStats,
};
pub use tokenizer::{Token, Tokenizer};
pub use types::{
    AccelSample, EngineError, LineIssue, MalformedLine, MotionSession, MovementEvent,
    ParseDiagnostics, ParsedLog, Result, Timestamp,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
