//! Statistics aggregation
//!
//! Per-event statistics are derived on demand from a [`MovementEvent`]; the
//! file-wide [`OverallStats`] folds every event's statistics together. Duration
//! figures are always recomputed from the pooled session list rather than
//! averaged from per-event means.
//!
//! Every numeric field is always populated: with no sessions the duration
//! figures are `0.0`.

use crate::config::EngineConfig;
use crate::segmenter::segment_event;
use crate::types::{secs_between, MotionSession, MovementEvent};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Date key format for `OverallStats::daily_event_counts`
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Statistics for one movement event (or the merged "all sessions" view)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventStats {
    pub total_sessions: usize,
    /// Seconds spent inside motion sessions
    pub active_time: f64,
    /// Seconds of the event span outside motion sessions, never negative
    pub idle_time: f64,
    pub mean_duration: f64,
    pub max_duration: f64,
    pub min_duration: f64,
    pub total_samples: usize,
    /// Sessions that passed the minimum-duration filter
    pub filtered_sessions: Vec<MotionSession>,
}

impl EventStats {
    /// Active plus idle seconds
    pub fn total_time(&self) -> f64 {
        self.active_time + self.idle_time
    }

    /// Fraction of the total time spent moving (0 when there is no time at all)
    pub fn active_ratio(&self) -> f64 {
        let total = self.total_time();
        if total > 0.0 {
            self.active_time / total
        } else {
            0.0
        }
    }

    /// Session durations in seconds, in chronological order
    pub fn durations(&self) -> Vec<f64> {
        self.filtered_sessions.iter().map(MotionSession::duration_secs).collect()
    }
}

/// Statistics across every event of one parsed file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallStats {
    pub total_events: usize,
    pub total_sessions: usize,
    pub total_active_time: f64,
    pub total_idle_time: f64,
    pub mean_duration: f64,
    pub max_duration: f64,
    pub min_duration: f64,
    pub total_samples: usize,
    /// Sum of session durations (same value as `total_active_time`)
    pub total_session_length: f64,
    /// `YYYY-MM-DD` of a session's start -> number of sessions starting that day
    pub daily_event_counts: BTreeMap<String, usize>,
    pub days_with_motion: usize,
    /// Days with at least one session, ascending
    pub days_with_motion_list: Vec<String>,
}

impl OverallStats {
    /// Project the file-wide figures onto the per-event shape
    pub fn as_event_stats(&self, filtered_sessions: Vec<MotionSession>) -> EventStats {
        EventStats {
            total_sessions: self.total_sessions,
            active_time: self.total_active_time,
            idle_time: self.total_idle_time,
            mean_duration: self.mean_duration,
            max_duration: self.max_duration,
            min_duration: self.min_duration,
            total_samples: self.total_samples,
            filtered_sessions,
        }
    }
}

/// Mean, max and min of a set of durations
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DurationSummary {
    pub mean: f64,
    pub max: f64,
    pub min: f64,
}

/// Summarize durations; all zero when `durations` is empty
pub fn summarize_durations(durations: &[f64]) -> DurationSummary {
    if durations.is_empty() {
        return DurationSummary::default();
    }

    let sum: f64 = durations.iter().sum();
    DurationSummary {
        mean: sum / durations.len() as f64,
        max: durations.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        min: durations.iter().copied().fold(f64::INFINITY, f64::min),
    }
}

/// Time span of an event in seconds
///
/// First to last sample; if the event has no samples, the span of its
/// bounding sessions; otherwise zero.
pub fn event_span_secs(event: &MovementEvent, sessions: &[MotionSession]) -> f64 {
    if let (Some(first), Some(last)) = (event.first_sample_time(), event.last_sample_time()) {
        return secs_between(first, last);
    }
    match (sessions.first(), sessions.last()) {
        (Some(first), Some(last)) => secs_between(first.start, last.stop),
        _ => 0.0,
    }
}

/// Derive the statistics of one event
pub fn compute_event_stats(event: &MovementEvent, config: &EngineConfig) -> EventStats {
    let filtered_sessions = segment_event(event, config);
    let durations: Vec<f64> = filtered_sessions.iter().map(MotionSession::duration_secs).collect();
    let summary = summarize_durations(&durations);

    let active_time: f64 = durations.iter().sum();
    let span = event_span_secs(event, &filtered_sessions);

    EventStats {
        total_sessions: filtered_sessions.len(),
        active_time,
        idle_time: (span - active_time).max(0.0),
        mean_duration: summary.mean,
        max_duration: summary.max,
        min_duration: summary.min,
        total_samples: event.accel_data.len(),
        filtered_sessions,
    }
}

/// Fold already computed per-event statistics into file-wide statistics
pub fn fold_overall_stats(per_event: &[EventStats]) -> OverallStats {
    let mut overall = OverallStats {
        total_events: per_event.len(),
        ..OverallStats::default()
    };
    let mut pooled = Vec::new();

    for stats in per_event {
        overall.total_sessions += stats.total_sessions;
        overall.total_active_time += stats.active_time;
        overall.total_idle_time += stats.idle_time;
        overall.total_samples += stats.total_samples;

        for session in &stats.filtered_sessions {
            pooled.push(session.duration_secs());
            let day = session.start.date_naive().format(DAY_FORMAT).to_string();
            *overall.daily_event_counts.entry(day).or_insert(0) += 1;
        }
    }

    let summary = summarize_durations(&pooled);
    overall.mean_duration = summary.mean;
    overall.max_duration = summary.max;
    overall.min_duration = summary.min;
    overall.total_session_length = overall.total_active_time;
    overall.days_with_motion_list = overall.daily_event_counts.keys().cloned().collect();
    overall.days_with_motion = overall.days_with_motion_list.len();

    overall
}

/// Compute statistics across every event of a file
pub fn compute_overall_stats(events: &[MovementEvent], config: &EngineConfig) -> OverallStats {
    let per_event: Vec<EventStats> = events
        .iter()
        .map(|event| compute_event_stats(event, config))
        .collect();
    fold_overall_stats(&per_event)
}

/// The "all sessions" view: every event merged into one `EventStats`
///
/// Sessions keep the number they have inside their own event. The totals
/// match [`compute_overall_stats`] for the same events.
pub fn merge_all_sessions(events: &[MovementEvent], config: &EngineConfig) -> EventStats {
    let per_event: Vec<EventStats> = events
        .iter()
        .map(|event| compute_event_stats(event, config))
        .collect();
    let overall = fold_overall_stats(&per_event);

    let sessions = per_event
        .into_iter()
        .flat_map(|stats| stats.filtered_sessions)
        .collect();
    overall.as_event_stats(sessions)
}
