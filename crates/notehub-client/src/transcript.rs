//! Chat transcript with sender grouping.
//!
//! Consecutive messages from the same sender within a bounded window
//! share one header line; a new header appears when the sender changes
//! or the gap exceeds the window.

use chrono::{DateTime, Duration, Utc};

/// Renders inbound chat messages as plain transcript lines.
#[derive(Debug)]
pub struct Transcript {
    window: Duration,
    prev_sender: Option<String>,
    prev_time: Option<DateTime<Utc>>,
}

impl Transcript {
    /// Creates a transcript with the given grouping window.
    pub fn new(window_seconds: u64) -> Self {
        Self {
            window: Duration::seconds(window_seconds as i64),
            prev_sender: None,
            prev_time: None,
        }
    }

    /// Appends one message, returning the rendered lines: an optional
    /// header followed by the text itself.
    pub fn push(&mut self, sender: &str, timestamp: DateTime<Utc>, text: &str) -> Vec<String> {
        let needs_header = match (self.prev_sender.as_deref(), self.prev_time) {
            (Some(prev_sender), Some(prev_time)) => {
                prev_sender != sender || timestamp > prev_time + self.window
            }
            _ => true,
        };

        let mut lines = Vec::with_capacity(2);
        if needs_header {
            lines.push(format!("{sender} - {}", timestamp.to_rfc2822()));
        }
        lines.push(text.to_string());

        self.prev_sender = Some(sender.to_string());
        self.prev_time = Some(timestamp);
        lines
    }
}
