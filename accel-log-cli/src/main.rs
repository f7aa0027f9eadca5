//! Accelerometer Log CLI Application
//!
//! This is the command-line interface for the accelerometer log analyzer.
//! It uses the accel-log-parser library and adds:
//! - TOML configuration with command-line overrides
//! - Parallel processing of several log files
//! - Report generation (TXT/JSON)

use anyhow::{bail, Context, Result};
use clap::Parser;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

mod config;
mod report;

use accel_log_parser::{EngineError, LogParser, ParsedLog};
use config::{AppConfig, OutputFormat};
use report::{FileReport, View};

/// AccelViz - Analyze accelerometer motion logs
#[derive(Parser, Debug)]
#[command(name = "accel-log-cli")]
#[command(about = "Detect motion sessions in accelerometer logs and report statistics", long_about = None)]
#[command(version)]
struct Args {
    /// Accelerometer log file(s) (.txt)
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Magnitude above which the device counts as moving
    #[arg(short, long, value_name = "G")]
    threshold: Option<f64>,

    /// Minimum motion session duration in seconds
    #[arg(short = 'm', long, value_name = "SECS")]
    min_duration: Option<f64>,

    /// Report format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Output file for the report (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Show a single device startup session (1-based) instead of all sessions
    #[arg(short, long, value_name = "N", conflicts_with = "daily")]
    event: Option<usize>,

    /// Only print the per-day motion event counts
    #[arg(long)]
    daily: bool,

    /// Fail if any file is invalid or contains no motion data
    #[arg(long)]
    strict: bool,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("AccelViz CLI v{}", env!("CARGO_PKG_VERSION"));
    log::debug!("Using parser library v{}", accel_log_parser::VERSION);

    let app_config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };

    let files = input_files(&args, &app_config);
    if files.is_empty() {
        println!("AccelViz - No input specified");
        println!("\nQuick Start:");
        println!("  accel-log-cli wear_log.txt");
        println!("  accel-log-cli wear_log.txt --threshold 0.2 --min-duration 1.5");
        println!("  accel-log-cli day1.txt day2.txt --format json -o report.json");
        println!("\nWith a configuration file:");
        println!("  accel-log-cli --config config.toml");
        println!("\nUse --help for more options");
        return Ok(());
    }

    run(&args, &app_config, &files)
}

/// Files from the command line first, then from the configuration
fn input_files(args: &Args, app_config: &AppConfig) -> Vec<PathBuf> {
    let mut files = args.files.clone();
    for file in &app_config.input.files {
        if !files.contains(file) {
            files.push(file.clone());
        }
    }
    files
}

fn run(args: &Args, app_config: &AppConfig, files: &[PathBuf]) -> Result<()> {
    let mut engine_config = app_config.segmentation.clone();
    if let Some(threshold) = args.threshold {
        engine_config = engine_config.with_activation_threshold(threshold);
    }
    if let Some(min_duration) = args.min_duration {
        engine_config = engine_config.with_min_session_duration(min_duration);
    }
    let parser = LogParser::with_config(engine_config).context("Invalid segmentation settings")?;

    let view = match (args.event, args.daily) {
        (Some(0), _) => bail!("--event is 1-based"),
        (Some(n), _) => View::Single(n - 1),
        (None, true) => View::Daily,
        (None, false) => View::All,
    };
    let format = args.format.unwrap_or(app_config.output.format);

    log::info!("Processing {} file(s)", files.len());

    // Files are independent; rayon keeps the results in input order
    let results: Vec<(&PathBuf, accel_log_parser::Result<ParsedLog>)> = files
        .par_iter()
        .map(|path| (path, parser.parse_file(path)))
        .collect();

    let mut parsed_files = Vec::new();
    let mut failures = 0;

    for (path, result) in results {
        match result {
            Ok(parsed) => {
                if parsed.diagnostics.malformed_lines > 0 {
                    log::warn!(
                        "{:?}: skipped {} malformed line(s)",
                        path,
                        parsed.diagnostics.malformed_lines
                    );
                }
                if parsed.diagnostics.orphan_samples > 0 {
                    log::warn!(
                        "{:?}: ignored {} sample(s) logged before the first device startup",
                        path,
                        parsed.diagnostics.orphan_samples
                    );
                }
                parsed_files.push((path, parsed));
            }
            Err(EngineError::EmptyResult { .. }) => {
                failures += 1;
                eprintln!("No motion sessions found in the file: {:?}", path);
            }
            Err(e) => {
                failures += 1;
                eprintln!(
                    "Error parsing {:?}. Please ensure it is a valid accelerometer data file: {}",
                    path, e
                );
            }
        }
    }

    if args.strict && failures > 0 {
        bail!("{} of {} file(s) could not be analyzed", failures, files.len());
    }

    let reports: Vec<FileReport<'_>> = parsed_files
        .iter()
        .map(|(path, parsed)| FileReport::new(display_name(path), parsed))
        .collect();

    if let Some(output_dir) = app_config.output.output_dir.as_deref().filter(|_| args.output.is_none()) {
        write_per_file(output_dir, &reports, view, format, app_config.output.include_samples)?;
    } else {
        let rendered = render(&reports, view, format, app_config.output.include_samples)?;
        emit(args.output.as_deref(), &rendered)?;
    }

    log::info!(
        "Analyzed {} file(s), {} without motion data or invalid",
        reports.len(),
        failures
    );
    Ok(())
}

fn render(reports: &[FileReport<'_>], view: View, format: OutputFormat, include_samples: bool) -> Result<String> {
    match format {
        OutputFormat::Json => report::render_json(reports, include_samples),
        OutputFormat::Txt => {
            let mut out = String::new();
            for report in reports {
                out.push_str(&report::render_txt(report, view)?);
            }
            Ok(out)
        }
    }
}

fn write_per_file(
    output_dir: &Path,
    reports: &[FileReport<'_>],
    view: View,
    format: OutputFormat,
    include_samples: bool,
) -> Result<()> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

    for report in reports {
        let rendered = render(std::slice::from_ref(report), view, format, include_samples)?;
        let stem = Path::new(&report.file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("report");
        let path = output_dir.join(format!("{}_report.{}", stem, format.extension()));
        emit(Some(&path), &rendered)?;
    }
    Ok(())
}

/// Write to a file, or to stdout when no path is given
fn emit(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, content)
                .with_context(|| format!("Failed to write report: {:?}", path))?;
            log::info!("Report written to {:?}", path);
        }
        None => print!("{}", content),
    }
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "accel-log-cli",
            "a.txt",
            "b.txt",
            "--threshold",
            "0.3",
            "-m",
            "2",
            "--format",
            "json",
            "-vv",
        ])
        .unwrap();

        assert_eq!(args.files.len(), 2);
        assert_eq!(args.threshold, Some(0.3));
        assert_eq!(args.min_duration, Some(2.0));
        assert_eq!(args.format, Some(OutputFormat::Json));
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_event_conflicts_with_daily() {
        let result = Args::try_parse_from(["accel-log-cli", "a.txt", "--event", "1", "--daily"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_input_files_merges_config() {
        let args = Args::try_parse_from(["accel-log-cli", "a.txt"]).unwrap();
        let mut app_config = AppConfig::default();
        app_config.input.files = vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")];

        let files = input_files(&args, &app_config);
        assert_eq!(files, vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]);
    }

    #[test]
    fn test_write_per_file() {
        let parsed = LogParser::new()
            .parse_str("DEVICE STARTUP: 2024-03-15 08:30:00\n2024-03-15 08:30:00.000, 0.5, 0.5\n2024-03-15 08:30:02.000, 0.0, 0.0\n")
            .unwrap();
        let reports = vec![FileReport::new("wear_day1.txt", &parsed)];
        let dir = tempfile::tempdir().unwrap();

        write_per_file(dir.path(), &reports, View::All, OutputFormat::Txt, false).unwrap();

        let written = fs::read_to_string(dir.path().join("wear_day1_report.txt")).unwrap();
        assert!(written.contains("File: wear_day1.txt | 1 session(s), 1 event(s)"));
    }
}
