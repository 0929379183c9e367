//! Permission-tuple payloads.
//!
//! ACL events carry `resource#relation@subject` tuples for the permission
//! service to apply. The separators `:`, `#` and `@` have meaning in that
//! notation, so tuple parts may not contain them (nor whitespace).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

static OBJECT_PART: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^:#\s]+$").expect("object part pattern is valid"));

static RELATION_PART: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^:#@\s]+$").expect("relation pattern is valid"));

fn check(pattern: &Regex, field: &str, value: &str) -> Result<(), ValidationError> {
    if pattern.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::invalid_format(
            field,
            format!("'{}' must be non-empty without ':', '#' or whitespace", value),
        ))
    }
}

/// The object a permission applies to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclResource {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
}

impl AclResource {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check(&OBJECT_PART, "resource.type", &self.resource_type)?;
        check(&OBJECT_PART, "resource.id", &self.id)
    }
}

/// The principal a permission is granted to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclSubject {
    #[serde(rename = "type")]
    pub subject_type: String,
    pub id: String,
}

impl AclSubject {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check(&OBJECT_PART, "subject.type", &self.subject_type)?;
        check(&OBJECT_PART, "subject.id", &self.id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclRelation {
    pub name: String,
}

impl AclRelation {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check(&RELATION_PART, "relation.name", &self.name)
    }
}

/// One permission tuple. Absent parts are wildcards for the consumer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclTuple {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<AclResource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<AclSubject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<AclRelation>,
}

impl AclTuple {
    /// Validates each present part, stopping at the first defect.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(resource) = &self.resource {
            resource.validate()?;
        }
        if let Some(subject) = &self.subject {
            subject.validate()?;
        }
        if let Some(relation) = &self.relation {
            relation.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct AclTupleBuilder {
    tuple: AclTuple,
}

impl AclTupleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.tuple.resource.get_or_insert_with(Default::default).resource_type = resource_type.into();
        self
    }

    pub fn resource_id(mut self, id: impl Into<String>) -> Self {
        self.tuple.resource.get_or_insert_with(Default::default).id = id.into();
        self
    }

    pub fn subject_type(mut self, subject_type: impl Into<String>) -> Self {
        self.tuple.subject.get_or_insert_with(Default::default).subject_type = subject_type.into();
        self
    }

    pub fn subject_id(mut self, id: impl Into<String>) -> Self {
        self.tuple.subject.get_or_insert_with(Default::default).id = id.into();
        self
    }

    pub fn relation(mut self, name: impl Into<String>) -> Self {
        self.tuple.relation.get_or_insert_with(Default::default).name = name.into();
        self
    }

    pub fn build(self) -> Result<AclTuple, ValidationError> {
        self.tuple.validate()?;
        Ok(self.tuple)
    }
}

/// Body of an ACL event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclPayload {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tuples: Vec<AclTuple>,
}

impl AclPayload {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.tuples.iter().try_for_each(AclTuple::validate)
    }
}

#[derive(Debug, Clone, Default)]
pub struct AclPayloadBuilder {
    payload: AclPayload,
}

impl AclPayloadBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_tuples(mut self, tuples: impl IntoIterator<Item = AclTuple>) -> Self {
        self.payload.tuples.extend(tuples);
        self
    }

    pub fn build(self) -> Result<AclPayload, ValidationError> {
        self.payload.validate()?;
        Ok(self.payload)
    }
}
