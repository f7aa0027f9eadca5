//! Motion session detection
//!
//! Scans an event's samples in time order with a two-state machine:
//! - Idle: a sample whose magnitude exceeds the threshold opens a session
//! - Active: the first sample at or below the threshold closes it
//!
//! A session still open at the end of the stream is closed at the last
//! sample. All noise rejection happens afterwards in [`filter_sessions`], so
//! zero-length candidates (equal timestamps) are not special-cased here.

use crate::config::EngineConfig;
use crate::types::{secs_between, AccelSample, MotionSession, MovementEvent, Timestamp};

/// A raw start/stop interval before the duration filter and numbering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateSession {
    pub start: Timestamp,
    pub stop: Timestamp,
}

impl CandidateSession {
    pub fn duration_secs(&self) -> f64 {
        secs_between(self.start, self.stop)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MotionState {
    Idle,
    Active { start: Timestamp },
}

/// Scalar motion magnitude of a sample
pub fn magnitude(sample: &AccelSample) -> f64 {
    sample.magnitude()
}

/// Run the Idle/Active state machine over `samples`
pub fn detect_candidates(samples: &[AccelSample], threshold: f64) -> Vec<CandidateSession> {
    // A session needs an opening and a closing sample
    if samples.len() < 2 {
        return Vec::new();
    }

    let mut candidates = Vec::new();
    let mut state = MotionState::Idle;

    for sample in samples {
        let moving = magnitude(sample) > threshold;
        state = match (state, moving) {
            (MotionState::Idle, true) => MotionState::Active {
                start: sample.timestamp,
            },
            (MotionState::Active { start }, false) => {
                candidates.push(CandidateSession {
                    start,
                    stop: sample.timestamp,
                });
                MotionState::Idle
            }
            (unchanged, _) => unchanged,
        };
    }

    if let (MotionState::Active { start }, Some(last)) = (state, samples.last()) {
        candidates.push(CandidateSession {
            start,
            stop: last.timestamp,
        });
    }

    candidates
}

/// Drop candidates shorter than `min_duration_secs` and number the rest 1..N
pub fn filter_sessions(candidates: &[CandidateSession], min_duration_secs: f64) -> Vec<MotionSession> {
    candidates
        .iter()
        .filter(|c| c.stop > c.start && c.duration_secs() >= min_duration_secs)
        .enumerate()
        .map(|(i, c)| MotionSession {
            event_number: i + 1,
            start: c.start,
            stop: c.stop,
        })
        .collect()
}

/// Detect and filter the motion sessions of one event
pub fn segment_event(event: &MovementEvent, config: &EngineConfig) -> Vec<MotionSession> {
    let candidates = detect_candidates(&event.accel_data, config.activation_threshold);
    let sessions = filter_sessions(&candidates, config.min_session_duration_secs);

    log::trace!(
        "Event {}: {} candidate session(s), {} kept",
        event.device_start_time_formatted,
        candidates.len(),
        sessions.len()
    );

    sessions
}
