//! MessageBuilder - the sanctioned way to construct outbox messages.

use serde::Serialize;

use super::errors::MessageValidationError;
use super::message::Message;
use crate::domain::foundation::{EventId, Timestamp};

/// Topic that permission-tuple events are published on.
pub const ACL_EVENT_TOPIC: &str = "acls.events";

/// Fluent constructor for [`Message`].
///
/// Setters only record values; nothing is checked until [`build`](Self::build),
/// so half-filled builders never raise errors. `build` borrows the builder
/// and returns an independent snapshot, which keeps the builder reusable
/// after both success and failure.
///
/// # Example
///
/// ```
/// use event_outbox::domain::outbox::MessageBuilder;
///
/// let message = MessageBuilder::new()
///     .event_topic("orders.events")
///     .event_domain("orders")
///     .event_type("created")
///     .object_type("order")
///     .build()
///     .expect("all required fields are set");
///
/// assert!(!message.event_id().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MessageBuilder {
    event_id: Option<EventId>,
    event_topic: String,
    event_domain: String,
    event_type: String,
    object_type: String,
    producer: Option<String>,
    correlation_id: Option<String>,
    payload: Option<Vec<u8>>,
    metadata: Option<Vec<u8>>,
    created_at: Option<Timestamp>,
}

impl MessageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder preset for permission-tuple events.
    pub fn acl() -> Self {
        Self::new().event_topic(ACL_EVENT_TOPIC)
    }

    pub fn event_id(mut self, id: impl Into<EventId>) -> Self {
        self.event_id = Some(id.into());
        self
    }

    pub fn event_topic(mut self, topic: impl Into<String>) -> Self {
        self.event_topic = topic.into();
        self
    }

    pub fn event_domain(mut self, domain: impl Into<String>) -> Self {
        self.event_domain = domain.into();
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    pub fn object_type(mut self, object_type: impl Into<String>) -> Self {
        self.object_type = object_type.into();
        self
    }

    /// Sets the producing service. An empty string clears it.
    pub fn producer(mut self, producer: impl Into<String>) -> Self {
        self.producer = non_empty(producer.into());
        self
    }

    /// Sets the correlation id. An empty string clears it.
    pub fn correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = non_empty(correlation_id.into());
        self
    }

    /// Sets the already-serialized event body.
    pub fn payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Serializes `value` as JSON into the payload.
    pub fn json_payload<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, serde_json::Error> {
        self.payload = Some(serde_json::to_vec(value)?);
        Ok(self)
    }

    /// Sets the already-serialized auxiliary attributes.
    pub fn metadata(mut self, metadata: impl Into<Vec<u8>>) -> Self {
        self.metadata = Some(metadata.into());
        self
    }

    /// Serializes `value` as JSON into the metadata.
    pub fn json_metadata<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, serde_json::Error> {
        self.metadata = Some(serde_json::to_vec(value)?);
        Ok(self)
    }

    pub fn created_at(mut self, created_at: impl Into<Timestamp>) -> Self {
        self.created_at = Some(created_at.into());
        self
    }

    /// Materializes the message.
    ///
    /// Assigns a fresh identifier and the current time when they were not
    /// supplied, then validates. Every violated invariant is reported.
    pub fn build(&self) -> Result<Message, MessageValidationError> {
        let event_id = match &self.event_id {
            Some(id) if !id.is_empty() => id.clone(),
            _ => EventId::new(),
        };
        let created_at = match self.created_at {
            Some(ts) if !ts.is_zero() => ts,
            _ => Timestamp::now(),
        };

        let message = Message::from_parts(
            event_id,
            self.event_topic.clone(),
            self.event_domain.clone(),
            self.event_type.clone(),
            self.object_type.clone(),
            self.producer.clone(),
            self.correlation_id.clone(),
            self.payload.clone(),
            self.metadata.clone(),
            created_at,
        );

        message.validate()?;
        Ok(message)
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
