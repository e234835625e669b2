//! Notification egress: forwarding per-row messages.

use tracing::info;

use crate::error::Result;
use crate::table::{MESSAGE, Table, Value};

/// A channel that transmits one message at a time.
pub trait NotificationSink {
    /// Transmit a single message.
    fn send(&mut self, message: &str) -> Result<()>;
}

/// Sink that logs each message at info level.
#[derive(Debug, Clone)]
pub struct TracingSink {
    source: String,
}

impl TracingSink {
    /// Create a sink that tags log lines with `source`.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl NotificationSink for TracingSink {
    fn send(&mut self, message: &str) -> Result<()> {
        info!(source = %self.source, "{}", message);
        Ok(())
    }
}

/// Send every row's `message` through `sink`, in row order.
///
/// Returns the number of messages sent. Null messages are skipped.
pub fn forward_messages(table: &Table, sink: &mut dyn NotificationSink) -> Result<usize> {
    let index = table.require_column(MESSAGE)?;
    let mut sent = 0;
    for row in table.rows() {
        match &row[index] {
            Value::Null => continue,
            Value::Text(s) => sink.send(s)?,
            other => sink.send(&other.to_string())?,
        }
        sent += 1;
    }
    Ok(sent)
}
