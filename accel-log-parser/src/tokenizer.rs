//! Line tokenizer for plain-text accelerometer logs
//!
//! Turns each line of the buffer into a [`Token`]. The tokenizer is a lazy
//! iterator over `str::lines`, so it never holds more than the current line.
//!
//! ## Recognized lines
//! - Startup marker: optional decoration, a keyword (`device startup`,
//!   `device start`, `startup`, `boot`), an optional separator and a timestamp,
//!   e.g. `=== DEVICE STARTUP: 2024-03-15 08:30:00 ===`
//! - Sample: `timestamp, x, y` with `,` `;` tab or whitespace separators and an
//!   optional third axis that is ignored, e.g. `2024-03-15 08:30:00.250, 0.01, -0.03`
//!
//! Blank lines and `//` / `;` comments are skipped without being counted as
//! malformed. Everything else becomes [`Token::Malformed`].

use crate::types::{LineIssue, MalformedLine, Timestamp};
use chrono::{NaiveDateTime, SubsecRound};
use std::iter::Enumerate;
use std::str::Lines;

/// Timestamp layouts accepted in markers and samples
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
];

/// Longest keyword first so `device startup` wins over `device start`
const MARKER_KEYWORDS: &[&str] = &["device startup", "device start", "startup", "boot"];

const DECORATION: &[char] = &['#', '=', '-', '*', '>', '<', '[', ']', '|'];

/// One classified log line
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// The device powered on
    StartupMarker {
        line_number: usize,
        timestamp: Timestamp,
    },
    /// A timestamped (x, y) reading
    Sample {
        line_number: usize,
        timestamp: Timestamp,
        x: f64,
        y: f64,
    },
    /// A line that matched neither shape
    Malformed(MalformedLine),
}

impl Token {
    pub fn line_number(&self) -> usize {
        match self {
            Token::StartupMarker { line_number, .. } => *line_number,
            Token::Sample { line_number, .. } => *line_number,
            Token::Malformed(line) => line.line_number,
        }
    }
}

/// Running counts kept while tokenizing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenizerStats {
    pub total_lines: usize,
    pub blank_lines: usize,
    pub comment_lines: usize,
    pub markers: usize,
    pub samples: usize,
    pub malformed: usize,
}

/// Iterator over the tokens of a text buffer
pub struct Tokenizer<'a> {
    lines: Enumerate<Lines<'a>>,
    stats: TokenizerStats,
}

impl<'a> Tokenizer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().enumerate(),
            stats: TokenizerStats::default(),
        }
    }

    /// Counts for the lines consumed so far
    pub fn stats(&self) -> TokenizerStats {
        self.stats
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (idx, line) = self.lines.next()?;
            self.stats.total_lines += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                self.stats.blank_lines += 1;
                continue;
            }
            if trimmed.starts_with("//") || trimmed.starts_with(';') {
                self.stats.comment_lines += 1;
                continue;
            }

            let token = classify_line(idx + 1, trimmed);
            match &token {
                Token::StartupMarker { .. } => self.stats.markers += 1,
                Token::Sample { .. } => self.stats.samples += 1,
                Token::Malformed(bad) => {
                    log::trace!("Skipping line {}: {}", bad.line_number, bad.reason);
                    self.stats.malformed += 1;
                }
            }
            return Some(token);
        }
    }
}

/// Classify a single non-blank, trimmed line
pub fn classify_line(line_number: usize, line: &str) -> Token {
    let malformed = |reason: LineIssue| {
        Token::Malformed(MalformedLine {
            line_number,
            raw: line.to_string(),
            reason,
        })
    };

    if let Some(rest) = marker_body(line) {
        let text = strip_marker_separator(rest);
        return match parse_timestamp(text) {
            Some(timestamp) => Token::StartupMarker {
                line_number,
                timestamp,
            },
            None => malformed(LineIssue::InvalidTimestamp(text.to_string())),
        };
    }

    match parse_sample(line) {
        Ok((timestamp, x, y)) => Token::Sample {
            line_number,
            timestamp,
            x,
            y,
        },
        Err(issue) => malformed(issue),
    }
}

/// Parse a log timestamp, truncated to millisecond resolution
pub fn parse_timestamp(text: &str) -> Option<Timestamp> {
    let text = text.trim().trim_start_matches('[').trim_end_matches(']').trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| naive.and_utc().trunc_subsecs(3))
}

/// If `line` is a startup marker, return what follows the keyword
fn marker_body(line: &str) -> Option<&str> {
    let body = line.trim_start_matches(|c: char| DECORATION.contains(&c) || c.is_whitespace());
    let lower = body.to_ascii_lowercase();
    MARKER_KEYWORDS
        .iter()
        .find(|keyword| lower.starts_with(*keyword))
        .map(|keyword| &body[keyword.len()..])
}

fn strip_marker_separator(rest: &str) -> &str {
    let rest = rest.trim_start_matches(|c: char| {
        matches!(c, ':' | '@') || DECORATION.contains(&c) || c.is_whitespace()
    });
    let rest = match rest.get(..3) {
        Some(prefix) if prefix.eq_ignore_ascii_case("at ") => &rest[3..],
        _ => rest,
    };
    rest.trim_end_matches(|c: char| DECORATION.contains(&c) || c.is_whitespace())
}

fn parse_sample(line: &str) -> std::result::Result<(Timestamp, f64, f64), LineIssue> {
    let (timestamp, values) = split_sample_fields(line)?;

    if values.len() != 2 && values.len() != 3 {
        return Err(LineIssue::FieldCount(values.len()));
    }

    let x = parse_axis(values[0])?;
    let y = parse_axis(values[1])?;
    if let Some(z) = values.get(2) {
        // Third axis is validated but not used
        parse_axis(z)?;
    }

    Ok((timestamp, x, y))
}

/// Split a sample line into its timestamp and the remaining value fields
fn split_sample_fields(line: &str) -> std::result::Result<(Timestamp, Vec<&str>), LineIssue> {
    let delimited = line.contains(|c: char| matches!(c, ',' | ';' | '\t'));

    if delimited {
        let mut fields = line.split(|c: char| matches!(c, ',' | ';' | '\t')).map(str::trim);
        let first = fields.next().unwrap_or_default();
        let timestamp = parse_timestamp(first).ok_or_else(|| shape_or_timestamp(first))?;
        return Ok((timestamp, fields.collect()));
    }

    let words: Vec<&str> = line.split_whitespace().collect();
    let first = words.first().copied().unwrap_or_default();

    if let Some(timestamp) = parse_timestamp(first) {
        return Ok((timestamp, words[1..].to_vec()));
    }
    if words.len() >= 2 {
        let joined = format!("{} {}", words[0], words[1]);
        if let Some(timestamp) = parse_timestamp(&joined) {
            return Ok((timestamp, words[2..].to_vec()));
        }
        return Err(shape_or_timestamp(&joined));
    }
    Err(shape_or_timestamp(first))
}

/// Something that starts with a digit was meant to be a timestamp
fn shape_or_timestamp(text: &str) -> LineIssue {
    let looks_like_date = text
        .trim_start_matches('[')
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit());
    if looks_like_date {
        LineIssue::InvalidTimestamp(text.to_string())
    } else {
        LineIssue::UnrecognizedShape
    }
}

fn parse_axis(text: &str) -> std::result::Result<f64, LineIssue> {
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| LineIssue::InvalidNumber(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    fn expected(h: u32, m: u32, s: u32, ms: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_milli_opt(h, m, s, ms)
            .unwrap()
            .and_utc()
    }

    #[test]
    fn test_marker_variants() {
        let lines = [
            "=== DEVICE STARTUP: 2024-03-15 08:30:00 ===",
            "Device startup 2024-03-15 08:30:00",
            "# startup @ 2024-03-15T08:30:00",
            "[BOOT] at 2024/03/15 08:30:00",
            "--- Device Start - 2024-03-15 08:30:00.000 ---",
        ];
        for line in lines {
            match classify_line(1, line) {
                Token::StartupMarker { timestamp, .. } => {
                    assert_eq!(timestamp, expected(8, 30, 0, 0), "line: {}", line)
                }
                other => panic!("expected marker for {:?}, got {:?}", line, other),
            }
        }
    }

    #[test]
    fn test_marker_with_bad_timestamp_is_malformed() {
        match classify_line(4, "DEVICE STARTUP: yesterday") {
            Token::Malformed(bad) => {
                assert_eq!(bad.line_number, 4);
                assert_eq!(bad.reason, LineIssue::InvalidTimestamp("yesterday".into()));
            }
            other => panic!("expected malformed, got {:?}", other),
        }
    }

    #[test]
    fn test_sample_separators() {
        let lines = [
            "2024-03-15 08:30:00.250, 0.5, -1.25",
            "2024-03-15 08:30:00.250;0.5;-1.25",
            "2024-03-15 08:30:00.250\t0.5\t-1.25",
            "2024-03-15 08:30:00.250   0.5  -1.25",
            "2024-03-15T08:30:00.250 0.5 -1.25",
            "[2024-03-15 08:30:00.250] 0.5 -1.25",
        ];
        for line in lines {
            match classify_line(2, line) {
                Token::Sample { timestamp, x, y, .. } => {
                    assert_eq!(timestamp, expected(8, 30, 0, 250), "line: {}", line);
                    assert_eq!(x, 0.5);
                    assert_eq!(y, -1.25);
                }
                other => panic!("expected sample for {:?}, got {:?}", line, other),
            }
        }
    }

    #[test]
    fn test_third_axis_is_ignored() {
        match classify_line(1, "2024-03-15 08:30:01, 0.1, 0.2, 0.98") {
            Token::Sample { x, y, .. } => {
                assert_eq!(x, 0.1);
                assert_eq!(y, 0.2);
            }
            other => panic!("expected sample, got {:?}", other),
        }
    }

    #[test]
    fn test_timestamps_truncate_to_millis() {
        let ts = parse_timestamp("2024-03-15 08:30:00.123456").unwrap();
        assert_eq!(ts.nanosecond(), 123_000_000);
    }

    #[test]
    fn test_malformed_reasons() {
        let cases = [
            ("hello world", LineIssue::UnrecognizedShape),
            ("2024-13-45 08:30:00, 0.1, 0.2", LineIssue::InvalidTimestamp("2024-13-45 08:30:00".into())),
            ("2024-03-15 08:30:00, abc, 0.2", LineIssue::InvalidNumber("abc".into())),
            ("2024-03-15 08:30:00, NaN, 0.2", LineIssue::InvalidNumber("NaN".into())),
            ("2024-03-15 08:30:00, 0.2", LineIssue::FieldCount(1)),
            ("2024-03-15 08:30:00 1 2 3 4", LineIssue::FieldCount(4)),
        ];
        for (line, reason) in cases {
            match classify_line(9, line) {
                Token::Malformed(bad) => {
                    assert_eq!(bad.reason, reason, "line: {}", line);
                    assert_eq!(bad.raw, line);
                }
                other => panic!("expected malformed for {:?}, got {:?}", line, other),
            }
        }
    }

    #[test]
    fn test_blank_and_comment_lines_are_not_malformed() {
        let text = "\n   \n// exported by firmware 1.4\n; another comment\nDEVICE STARTUP: 2024-03-15 08:30:00\n\t\n2024-03-15 08:30:00.100, 0, 0\ngarbage\n";
        let mut tokenizer = Tokenizer::new(text);
        let tokens: Vec<Token> = tokenizer.by_ref().collect();

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].line_number(), 5);
        assert_eq!(tokens[1].line_number(), 7);

        let stats = tokenizer.stats();
        assert_eq!(stats.total_lines, 8);
        assert_eq!(stats.blank_lines, 3);
        assert_eq!(stats.comment_lines, 2);
        assert_eq!(stats.markers, 1);
        assert_eq!(stats.samples, 1);
        assert_eq!(stats.malformed, 1);
    }
}
