//! The insert statement, rendered once per publisher.

use crate::domain::foundation::EventId;
use crate::domain::outbox::{Message, SqlIdentifier};
use crate::ports::StatementArg;

use super::config::PlaceholderStyle;

/// Destination columns, in bind order.
pub const OUTBOX_COLUMNS: [&str; 10] = [
    "event_id",
    "event_topic",
    "event_domain",
    "event_type",
    "object_type",
    "producer",
    "correlation_id",
    "payload",
    "metadata",
    "created_at",
];

/// Precompiled `INSERT` for one sanitized table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertStatement {
    sql: String,
}

impl InsertStatement {
    pub fn new(table: &SqlIdentifier, style: PlaceholderStyle) -> Self {
        let placeholders: Vec<String> = (1..=OUTBOX_COLUMNS.len())
            .map(|position| style.placeholder(position))
            .collect();

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            OUTBOX_COLUMNS.join(", "),
            placeholders.join(", ")
        );

        Self { sql }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Bind values for `message`, in [`OUTBOX_COLUMNS`] order.
    pub fn args_for(&self, message: &Message) -> Vec<StatementArg> {
        vec![
            StatementArg::Text(message.event_id().as_str().to_string()),
            StatementArg::Text(message.event_topic().to_string()),
            StatementArg::Text(message.event_domain().to_string()),
            StatementArg::Text(message.event_type().to_string()),
            StatementArg::Text(message.object_type().to_string()),
            StatementArg::NullableText(message.producer().map(str::to_string)),
            StatementArg::NullableText(message.correlation_id().map(str::to_string)),
            StatementArg::Json(message.payload().map(<[u8]>::to_vec)),
            StatementArg::Json(message.metadata().map(<[u8]>::to_vec)),
            StatementArg::Timestamp(*message.created_at().as_datetime()),
        ]
    }
}

/// Reads the event id back out of a bound argument list.
pub fn event_id_of(args: &[StatementArg]) -> Option<EventId> {
    match args.first() {
        Some(StatementArg::Text(id)) => Some(EventId::from_string(id.clone())),
        _ => None,
    }
}
