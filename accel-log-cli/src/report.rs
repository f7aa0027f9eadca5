//! Report generation
//!
//! Renders a parsed log as a plain-text report (ASCII tables) or as JSON.
//! The text layout follows the dashboard: file header, startup-session
//! selector, summary, motion timeline, and daily motion counts.

use accel_log_parser::{AccelSample, EventStats, MotionSession, ParsedLog};
use anyhow::{bail, Result};
use serde::Serialize;
use std::fmt::Write;

/// Which part of a parsed file a report shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Every device startup merged ("All Sessions")
    All,
    /// One device startup, 0-based
    Single(usize),
    /// Only the per-day motion counts
    Daily,
}

/// One parsed file ready for rendering
pub struct FileReport<'a> {
    pub file_name: String,
    pub parsed: &'a ParsedLog,
}

impl<'a> FileReport<'a> {
    pub fn new(file_name: impl Into<String>, parsed: &'a ParsedLog) -> Self {
        Self {
            file_name: file_name.into(),
            parsed,
        }
    }

    /// Statistics and display label for the selected view
    fn view_stats(&self, view: View) -> Result<(String, EventStats)> {
        match view {
            View::Single(index) => {
                let Some(event) = self.parsed.movement_events.get(index) else {
                    bail!(
                        "Session {} not found in {} (file has {} session(s))",
                        index + 1,
                        self.file_name,
                        self.parsed.movement_events.len()
                    );
                };
                let stats = self.parsed.event_stats(index).unwrap_or_default();
                Ok((event.device_start_time_formatted.clone(), stats))
            }
            View::All | View::Daily => Ok(("All Sessions".to_string(), self.parsed.all_sessions())),
        }
    }
}

const RULE: &str = "═══════════════════════════════════════════════";
const THIN_RULE: &str = "───────────────────────────────────────────────";

/// Render a plain-text report
pub fn render_txt(report: &FileReport<'_>, view: View) -> Result<String> {
    let mut out = String::new();
    let overall = &report.parsed.overall_stats;

    writeln!(out, "{}", RULE)?;
    writeln!(out, "  Analysis Results")?;
    writeln!(out, "{}", RULE)?;
    writeln!(
        out,
        "File: {} | {} session(s), {} event(s)\n",
        report.file_name, overall.total_events, overall.total_sessions
    )?;

    if view == View::Daily {
        write_daily_counts(&mut out, report.parsed)?;
        return Ok(out);
    }

    let (label, stats) = report.view_stats(view)?;

    writeln!(out, "Sessions:")?;
    for (i, event) in report.parsed.movement_events.iter().enumerate() {
        let event_sessions = report.parsed.event_stats(i).map(|s| s.total_sessions).unwrap_or(0);
        let marker = if view == View::Single(i) { '>' } else { ' ' };
        writeln!(
            out,
            " {} Session {}: {} ({} events)",
            marker,
            i + 1,
            event.device_start_time_formatted,
            event_sessions
        )?;
    }
    writeln!(out)?;

    write_summary(&mut out, &label, &stats, view, overall.total_events)?;
    write_timeline(&mut out, &stats.filtered_sessions)?;

    if view == View::All {
        write_daily_counts(&mut out, report.parsed)?;
    }
    write_diagnostics(&mut out, report.parsed)?;

    Ok(out)
}

fn write_summary(
    out: &mut String,
    label: &str,
    stats: &EventStats,
    view: View,
    total_startups: usize,
) -> Result<()> {
    writeln!(out, "Analysis Summary")?;
    writeln!(out, "{}", THIN_RULE)?;
    match view {
        View::Single(_) => writeln!(out, "Single Session")?,
        _ => writeln!(out, "All Sessions ({})", total_startups)?,
    }
    writeln!(out, "Session: {}\n", label)?;

    writeln!(out, "  {:<22} {:>12}", "Total Motion Events", stats.total_sessions)?;
    writeln!(out, "  {:<22} {:>12}", "Total Samples", stats.total_samples)?;
    writeln!(out)?;
    writeln!(out, "  Time Analysis")?;
    writeln!(out, "  {:<22} {:>11.2}s", "Active Time", stats.active_time)?;
    writeln!(out, "  {:<22} {:>11.2}s", "Idle Time", stats.idle_time)?;
    writeln!(out, "  {:<22} {:>11.2}s", "Total Time", stats.total_time())?;

    if stats.total_sessions > 0 {
        writeln!(out)?;
        writeln!(out, "  Event Statistics")?;
        writeln!(out, "  {:<22} {:>11.2}s", "Mean Duration", stats.mean_duration)?;
        writeln!(out, "  {:<22} {:>11.2}s", "Max Duration", stats.max_duration)?;
        writeln!(out, "  {:<22} {:>11.2}s", "Min Duration", stats.min_duration)?;
    }
    writeln!(out)?;
    Ok(())
}

fn write_timeline(out: &mut String, sessions: &[MotionSession]) -> Result<()> {
    writeln!(out, "Motion Timeline (seconds since first motion)")?;
    writeln!(out, "{}", THIN_RULE)?;

    let Some(base) = sessions.first().map(|s| s.start) else {
        writeln!(out, "  No motion events detected\n")?;
        return Ok(());
    };

    writeln!(out, "  {:>5}  {:>10}  {:>10}  {:>10}", "Event", "Offset", "End", "Duration")?;
    for session in sessions {
        let offset = session.offset_secs(base);
        let duration = session.duration_secs();
        writeln!(
            out,
            "  {:>5}  {:>9.2}s  {:>9.2}s  {:>9.2}s",
            session.event_number,
            offset,
            offset + duration,
            duration
        )?;
    }
    writeln!(out)?;
    Ok(())
}

fn write_daily_counts(out: &mut String, parsed: &ParsedLog) -> Result<()> {
    let overall = &parsed.overall_stats;
    writeln!(out, "Daily Motion Event Counts")?;
    writeln!(out, "{}", THIN_RULE)?;

    if overall.daily_event_counts.is_empty() {
        writeln!(out, "  No daily event data available\n")?;
        return Ok(());
    }
    for (day, count) in &overall.daily_event_counts {
        writeln!(out, "  {}  {:>6}", day, count)?;
    }
    writeln!(out, "  Days with motion: {}\n", overall.days_with_motion)?;
    Ok(())
}

fn write_diagnostics(out: &mut String, parsed: &ParsedLog) -> Result<()> {
    let diagnostics = &parsed.diagnostics;
    if diagnostics.is_clean() {
        return Ok(());
    }

    writeln!(out, "Diagnostics")?;
    writeln!(out, "{}", THIN_RULE)?;
    writeln!(out, "  Malformed lines skipped:   {}", diagnostics.malformed_lines)?;
    writeln!(out, "  Samples before startup:    {}", diagnostics.orphan_samples)?;
    writeln!(out, "  Out-of-order samples:      {}", diagnostics.out_of_order_samples)?;
    for line in &diagnostics.malformed_examples {
        writeln!(out, "    line {}: {} ({})", line.line_number, line.raw, line.reason)?;
    }
    writeln!(out)?;
    Ok(())
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    device_start_time: i64,
    device_start_time_formatted: &'a str,
    stats: EventStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    accel_data: Option<&'a [AccelSample]>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    file: &'a str,
    movement_events: Vec<JsonEvent<'a>>,
    overall_stats: &'a accel_log_parser::OverallStats,
    all_sessions: EventStats,
    diagnostics: &'a accel_log_parser::ParseDiagnostics,
    config: &'a accel_log_parser::EngineConfig,
}

fn json_report<'a>(report: &'a FileReport<'_>, include_samples: bool) -> JsonReport<'a> {
    let parsed = report.parsed;
    let movement_events = parsed
        .movement_events
        .iter()
        .enumerate()
        .map(|(i, event)| JsonEvent {
            device_start_time: event.device_start_time.timestamp_millis(),
            device_start_time_formatted: &event.device_start_time_formatted,
            stats: parsed.event_stats(i).unwrap_or_default(),
            accel_data: include_samples.then_some(event.accel_data.as_slice()),
        })
        .collect();

    JsonReport {
        file: &report.file_name,
        movement_events,
        overall_stats: &parsed.overall_stats,
        all_sessions: parsed.all_sessions(),
        diagnostics: &parsed.diagnostics,
        config: &parsed.config,
    }
}

/// Render one or more files as a pretty-printed JSON array
pub fn render_json(reports: &[FileReport<'_>], include_samples: bool) -> Result<String> {
    let values: Vec<JsonReport<'_>> = reports
        .iter()
        .map(|report| json_report(report, include_samples))
        .collect();
    Ok(serde_json::to_string_pretty(&values)?)
}
