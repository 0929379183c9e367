//! Outbox messages and the rules they must satisfy before persistence.
//!
//! - `Message` - the immutable event record written to the outbox table
//! - `MessageBuilder` - fluent construction with generated defaults
//! - `create_message` - derive a message from a serializable domain value
//! - `acl` - permission-tuple payloads published on [`ACL_EVENT_TOPIC`]
//! - `sql_identifier` - sanitizer for the configurable table name

mod acl;
mod builder;
mod creator;
mod errors;
mod message;
mod sql_identifier;

pub use acl::{
    AclPayload, AclPayloadBuilder, AclRelation, AclResource, AclSubject, AclTuple,
    AclTupleBuilder,
};
pub use builder::{MessageBuilder, ACL_EVENT_TOPIC};
pub use creator::{create_message, object_type_of, CreateMessageError, MessageDraft};
pub use errors::MessageValidationError;
pub use message::Message;
pub use sql_identifier::{
    is_sql_injection_attempt, validate_sql_identifier, IdentifierError, SqlIdentifier,
    MAX_IDENTIFIER_LEN,
};
