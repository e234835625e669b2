//! Egress boundary: delimited files and message notifications.

mod sink;
mod writer;

pub use sink::{NotificationSink, TracingSink, forward_messages};
pub use writer::{EGRESS_DELIMITER, to_delimited_string, write_delimited, write_table};
