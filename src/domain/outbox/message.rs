//! Outbox message - one domain event awaiting relay.

use serde::{Deserialize, Serialize};

use super::errors::MessageValidationError;
use crate::domain::foundation::{EventId, Timestamp, ValidationError};

/// A single domain event destined for the outbox table.
///
/// Construct through [`MessageBuilder`](super::MessageBuilder), which fills
/// the identifier and timestamp and rejects incomplete messages. Messages
/// that arrive by deserialization skip the builder, which is why the
/// publisher validates again before writing.
///
/// `payload` and `metadata` are opaque serialized bytes. In JSON form they
/// are embedded verbatim rather than encoded as byte arrays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    event_id: EventId,

    #[serde(default)]
    event_topic: String,

    #[serde(default)]
    event_domain: String,

    #[serde(default)]
    event_type: String,

    #[serde(default)]
    object_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    producer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", with = "raw_json")]
    payload: Option<Vec<u8>>,

    #[serde(default, skip_serializing_if = "Option::is_none", with = "raw_json")]
    metadata: Option<Vec<u8>>,

    #[serde(default)]
    created_at: Timestamp,
}

impl Message {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        event_id: EventId,
        event_topic: String,
        event_domain: String,
        event_type: String,
        object_type: String,
        producer: Option<String>,
        correlation_id: Option<String>,
        payload: Option<Vec<u8>>,
        metadata: Option<Vec<u8>>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            event_id,
            event_topic,
            event_domain,
            event_type,
            object_type,
            producer,
            correlation_id,
            payload,
            metadata,
            created_at,
        }
    }

    pub fn event_id(&self) -> &EventId {
        &self.event_id
    }

    /// Channel the relay forwards this event to.
    pub fn event_topic(&self) -> &str {
        &self.event_topic
    }

    /// Bounded context that emitted the event.
    pub fn event_domain(&self) -> &str {
        &self.event_domain
    }

    /// Verb describing what happened (created, updated, deleted, ...).
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Noun describing the subject entity.
    pub fn object_type(&self) -> &str {
        &self.object_type
    }

    pub fn producer(&self) -> Option<&str> {
        self.producer.as_deref()
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn payload(&self) -> Option<&[u8]> {
        self.payload.as_deref()
    }

    pub fn metadata(&self) -> Option<&[u8]> {
        self.metadata.as_deref()
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Checks every required field and reports all violations together.
    ///
    /// A message is valid iff its id, topic, domain, event type and object
    /// type are non-empty and the creation timestamp is assigned.
    pub fn validate(&self) -> Result<(), MessageValidationError> {
        let mut violations = Vec::new();

        if self.event_id.is_empty() {
            violations.push(ValidationError::empty_field("event_id"));
        }
        if self.event_topic.is_empty() {
            violations.push(ValidationError::empty_field("event_topic"));
        }
        if self.event_domain.is_empty() {
            violations.push(ValidationError::empty_field("event_domain"));
        }
        if self.event_type.is_empty() {
            violations.push(ValidationError::empty_field("event_type"));
        }
        if self.object_type.is_empty() {
            violations.push(ValidationError::empty_field("object_type"));
        }
        if self.created_at.is_zero() {
            violations.push(ValidationError::empty_field("created_at"));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(MessageValidationError::new(violations))
        }
    }
}

/// Serde adapter that embeds already-serialized JSON bytes verbatim.
mod raw_json {
    use serde::de::Error as _;
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde_json::value::RawValue;

    pub fn serialize<S>(bytes: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match bytes {
            Some(bytes) => {
                let raw: &RawValue = serde_json::from_slice(bytes).map_err(S::Error::custom)?;
                raw.serialize(serializer)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Box<RawValue>>::deserialize(deserializer).map_err(D::Error::custom)?;
        Ok(raw.map(|r| r.get().as_bytes().to_vec()))
    }
}
