//! Event grouping
//!
//! Splits the token stream into movement events, one per startup marker.
//! Samples before the first marker have no device-start reference and are
//! discarded (counted as orphans).

use crate::tokenizer::Token;
use crate::types::{AccelSample, MovementEvent, ParseDiagnostics};

/// Movement events plus the running totals gathered while grouping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedEvents {
    pub movement_events: Vec<MovementEvent>,
    pub total_events: usize,
    pub total_samples: usize,
    /// Malformed/orphan/out-of-order counts (line counts are filled in by the caller)
    pub diagnostics: ParseDiagnostics,
}

impl GroupedEvents {
    /// True if at least one event holds a sample
    pub fn has_samples(&self) -> bool {
        self.movement_events.iter().any(|event| !event.is_empty())
    }
}

/// Group tokens into movement events
///
/// Never fails: a stream with no usable events yields an empty result and it
/// is up to the caller to treat that as "no motion found".
pub fn group_events<I>(tokens: I, max_malformed_examples: usize) -> GroupedEvents
where
    I: IntoIterator<Item = Token>,
{
    let mut grouped = GroupedEvents::default();
    let mut current: Option<MovementEvent> = None;

    for token in tokens {
        match token {
            Token::StartupMarker { timestamp, line_number } => {
                log::trace!("Startup marker at line {}: {}", line_number, timestamp);
                if let Some(done) = current.take() {
                    grouped.movement_events.push(done);
                }
                current = Some(MovementEvent::new(timestamp));
            }
            Token::Sample {
                timestamp, x, y, line_number,
            } => {
                let Some(event) = current.as_mut() else {
                    grouped.diagnostics.orphan_samples += 1;
                    continue;
                };

                if event.last_sample_time().is_some_and(|last| timestamp < last) {
                    log::trace!("Dropping out-of-order sample at line {}", line_number);
                    grouped.diagnostics.out_of_order_samples += 1;
                    continue;
                }

                event.accel_data.push(AccelSample {
                    index: event.accel_data.len(),
                    timestamp,
                    x,
                    y,
                });
                grouped.total_samples += 1;
            }
            Token::Malformed(line) => {
                grouped.diagnostics.malformed_lines += 1;
                if grouped.diagnostics.malformed_examples.len() < max_malformed_examples {
                    grouped.diagnostics.malformed_examples.push(line);
                }
            }
        }
    }

    if let Some(done) = current.take() {
        grouped.movement_events.push(done);
    }
    grouped.total_events = grouped.movement_events.len();

    log::debug!(
        "Grouped {} events with {} samples ({} orphan, {} out of order, {} malformed)",
        grouped.total_events,
        grouped.total_samples,
        grouped.diagnostics.orphan_samples,
        grouped.diagnostics.out_of_order_samples,
        grouped.diagnostics.malformed_lines
    );

    grouped
}
