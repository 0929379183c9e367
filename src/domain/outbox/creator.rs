//! Derive an outbox message from any serializable domain value.
//!
//! `create_message` fills conventional defaults so call sites only name the
//! domain and the verb:
//!
//! | Field | Default |
//! |-------|---------|
//! | topic | `"{domain}.events"` |
//! | object type | snake_case of the value's type name |
//! | payload | JSON encoding of the value |

use std::any::type_name;

use serde::Serialize;
use thiserror::Error;

use super::builder::MessageBuilder;
use super::errors::MessageValidationError;
use super::message::Message;

/// Errors from [`MessageDraft::build`].
#[derive(Debug, Error)]
pub enum CreateMessageError {
    #[error("failed to serialize event payload: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] MessageValidationError),
}

/// Starts a message draft for `value`.
pub fn create_message<'a, T: Serialize>(
    event_domain: impl Into<String>,
    event_type: impl Into<String>,
    value: &'a T,
) -> MessageDraft<'a, T> {
    MessageDraft {
        value,
        event_domain: event_domain.into(),
        event_type: event_type.into(),
        topic: None,
        object_type: None,
        producer: None,
        correlation_id: None,
        payload: None,
        metadata: None,
    }
}

/// Pending message with overridable defaults.
///
/// Each field has a literal setter and a `*_from` variant that computes the
/// value from the domain object.
pub struct MessageDraft<'a, T> {
    value: &'a T,
    event_domain: String,
    event_type: String,
    topic: Option<String>,
    object_type: Option<String>,
    producer: Option<String>,
    correlation_id: Option<String>,
    payload: Option<Vec<u8>>,
    metadata: Option<Vec<u8>>,
}

impl<'a, T: Serialize> MessageDraft<'a, T> {
    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn topic_from(mut self, f: impl FnOnce(&T) -> String) -> Self {
        self.topic = Some(f(self.value));
        self
    }

    pub fn object_type(mut self, object_type: impl Into<String>) -> Self {
        self.object_type = Some(object_type.into());
        self
    }

    pub fn object_type_from(mut self, f: impl FnOnce(&T) -> String) -> Self {
        self.object_type = Some(f(self.value));
        self
    }

    pub fn producer(mut self, producer: impl Into<String>) -> Self {
        self.producer = Some(producer.into());
        self
    }

    pub fn producer_from(mut self, f: impl FnOnce(&T) -> String) -> Self {
        self.producer = Some(f(self.value));
        self
    }

    pub fn correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    pub fn correlation_id_from(mut self, f: impl FnOnce(&T) -> String) -> Self {
        self.correlation_id = Some(f(self.value));
        self
    }

    /// Replaces the default JSON encoding of the value.
    pub fn payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    pub fn payload_from(mut self, f: impl FnOnce(&T) -> Vec<u8>) -> Self {
        self.payload = Some(f(self.value));
        self
    }

    pub fn metadata(mut self, metadata: impl Into<Vec<u8>>) -> Self {
        self.metadata = Some(metadata.into());
        self
    }

    pub fn metadata_from(mut self, f: impl FnOnce(&T) -> Vec<u8>) -> Self {
        self.metadata = Some(f(self.value));
        self
    }

    /// Resolves defaults and builds through [`MessageBuilder`].
    pub fn build(self) -> Result<Message, CreateMessageError> {
        let payload = match self.payload {
            Some(payload) => payload,
            None => serde_json::to_vec(self.value)?,
        };
        let topic = self
            .topic
            .unwrap_or_else(|| format!("{}.events", self.event_domain));
        let object_type = self.object_type.unwrap_or_else(object_type_of::<T>);

        let mut builder = MessageBuilder::new()
            .event_topic(topic)
            .event_domain(self.event_domain)
            .event_type(self.event_type)
            .object_type(object_type)
            .payload(payload);
        if let Some(producer) = self.producer {
            builder = builder.producer(producer);
        }
        if let Some(correlation_id) = self.correlation_id {
            builder = builder.correlation_id(correlation_id);
        }
        if let Some(metadata) = self.metadata {
            builder = builder.metadata(metadata);
        }

        Ok(builder.build()?)
    }
}

/// Snake-cased short type name, e.g. `app::UserAccount<X>` -> `user_account`.
pub fn object_type_of<T: ?Sized>() -> String {
    let full = type_name::<T>();
    let without_generics = full.split('<').next().unwrap_or(full);
    let short = without_generics.rsplit("::").next().unwrap_or(without_generics);
    to_snake_case(short)
}

fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = if i > 0 { Some(chars[i - 1]) } else { None };
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.map_or(false, |n| n.is_lowercase()),
                _ => false,
            };
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct UserAccount {
        id: u32,
        email: String,
    }

    #[allow(dead_code)]
    #[derive(Serialize)]
    struct HTTPRoute {
        path: String,
    }

    fn account() -> UserAccount {
        UserAccount {
            id: 7,
            email: "a@example.com".to_string(),
        }
    }

    #[test]
    fn create_message_applies_defaults() {
        let value = account();
        let message = create_message("accounts", "created", &value).build().unwrap();

        assert_eq!(message.event_topic(), "accounts.events");
        assert_eq!(message.event_domain(), "accounts");
        assert_eq!(message.event_type(), "created");
        assert_eq!(message.object_type(), "user_account");

        let payload: serde_json::Value = serde_json::from_slice(message.payload().unwrap()).unwrap();
        assert_eq!(payload, json!({"id": 7, "email": "a@example.com"}));
    }

    #[test]
    fn create_message_honours_overrides() {
        let value = account();
        let message = create_message("accounts", "updated", &value)
            .topic("custom.events")
            .object_type("account")
            .producer("identity")
            .correlation_id_from(|a| format!("account-{}", a.id))
            .metadata(br#"{"v":2}"#.to_vec())
            .build()
            .unwrap();

        assert_eq!(message.event_topic(), "custom.events");
        assert_eq!(message.object_type(), "account");
        assert_eq!(message.producer(), Some("identity"));
        assert_eq!(message.correlation_id(), Some("account-7"));
        assert_eq!(message.metadata(), Some(br#"{"v":2}"#.as_slice()));
    }

    #[test]
    fn computed_fields_read_the_value() {
        let value = account();
        let message = create_message("accounts", "created", &value)
            .topic_from(|a| format!("accounts.{}", a.id))
            .payload_from(|a| a.email.clone().into_bytes())
            .build()
            .unwrap();

        assert_eq!(message.event_topic(), "accounts.7");
        assert_eq!(message.payload(), Some(b"a@example.com".as_slice()));
    }

    #[test]
    fn empty_domain_is_still_rejected() {
        let value = account();
        let err = create_message("", "", &value).build().unwrap_err();

        match err {
            CreateMessageError::Invalid(e) => {
                assert!(e.has_field("event_domain"));
                assert!(e.has_field("event_type"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn object_type_handles_acronyms_and_generics() {
        assert_eq!(object_type_of::<HTTPRoute>(), "http_route");
        assert_eq!(object_type_of::<Vec<u8>>(), "vec");
        assert_eq!(to_snake_case("OrderV2"), "order_v2");
        assert_eq!(to_snake_case("order"), "order");
    }
}
