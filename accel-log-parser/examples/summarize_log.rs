//! Standalone accelerometer log summarizer
//!
//! Parses one log file and prints each device startup with its motion
//! sessions, followed by the file-wide statistics.
//!
//! Usage:
//!   summarize_log <log_file.txt> [--threshold <g>] [--min-duration <secs>]
//!
//! Example:
//!   cargo run --example summarize_log -- samples/two_day_wear.txt --threshold 0.2

use accel_log_parser::{EngineConfig, EngineError, LogParser};
use std::env;
use std::path::PathBuf;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <log_file.txt> [--threshold <g>] [--min-duration <secs>]", args[0]);
        std::process::exit(1);
    }

    let log_path = PathBuf::from(&args[1]);
    let mut config = EngineConfig::new();

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--threshold" if i + 1 < args.len() => {
                config = config.with_activation_threshold(args[i + 1].parse().unwrap_or(0.1));
                i += 2;
            }
            "--min-duration" if i + 1 < args.len() => {
                config = config.with_min_session_duration(args[i + 1].parse().unwrap_or(1.0));
                i += 2;
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                std::process::exit(1);
            }
        }
    }

    let parser = match LogParser::with_config(config) {
        Ok(parser) => parser,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let parsed = match parser.parse_file(&log_path) {
        Ok(parsed) => parsed,
        Err(EngineError::EmptyResult { .. }) => {
            println!("No motion sessions found in {:?}", log_path);
            return;
        }
        Err(e) => {
            eprintln!("Failed to parse {:?}: {}", log_path, e);
            std::process::exit(1);
        }
    };

    for (i, event) in parsed.movement_events.iter().enumerate() {
        let Some(stats) = parsed.event_stats(i) else { continue };
        println!(
            "Session {}: {} ({} events, {} samples)",
            i + 1,
            event.device_start_time_formatted,
            stats.total_sessions,
            stats.total_samples
        );
        for session in &stats.filtered_sessions {
            println!(
                "  #{:<3} {} -> {}  {:.2}s",
                session.event_number,
                session.start.format("%H:%M:%S%.3f"),
                session.stop.format("%H:%M:%S%.3f"),
                session.duration_secs()
            );
        }
    }

    let overall = &parsed.overall_stats;
    println!("\n=== SUMMARY ===");
    println!("Startup sessions: {}", overall.total_events);
    println!("Motion events: {}", overall.total_sessions);
    println!("Samples: {}", overall.total_samples);
    println!("Active time: {:.2}s", overall.total_active_time);
    println!("Idle time: {:.2}s", overall.total_idle_time);
    println!("Mean duration: {:.2}s", overall.mean_duration);
    for (day, count) in &overall.daily_event_counts {
        println!("  {}: {} event(s)", day, count);
    }
    if parsed.diagnostics.malformed_lines > 0 {
        println!("Skipped {} malformed line(s)", parsed.diagnostics.malformed_lines);
    }
}
