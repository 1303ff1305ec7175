//! Structural validation of untrusted JSON into typed archive documents.
//!
//! Each document type has a `from_value` constructor that walks a
//! [`serde_json::Value`] field by field and stops at the first violation,
//! reporting it as a JSON path such as `messages[1].outputs`. Only shape and
//! type are checked here; cross-document references are the reader's job.

mod character;
mod manifest;
mod scenario;

use std::fmt;

use schemars::schema::RootSchema;
use schemars::schema_for;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::timestamp::Timestamp;
use crate::version::{SchemaVersion, SCHEMA_VERSION};

pub use character::{Character, ImageRef, LoreItem};
pub use manifest::{Author, Manifest};
pub use scenario::{AiMessage, AiOutput, ChatLine, HumanMessage, Message, PromptTemplate, Scenario};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Manifest,
    Character,
    Scenario,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Manifest => "manifest",
            EntityKind::Character => "character",
            EntityKind::Scenario => "scenario",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First structural violation found in a document.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("`{field}` {message}")]
pub struct ValidationError {
    pub entity: EntityKind,
    /// JSON path of the offending field; `$` for the document root.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub(crate) fn new(entity: EntityKind, field: &str, message: impl Into<String>) -> Self {
        Self {
            entity,
            field: if field.is_empty() {
                "$".to_string()
            } else {
                field.to_string()
            },
            message: message.into(),
        }
    }
}

/// A validated document of any kind.
#[derive(Clone, Debug, PartialEq)]
pub enum Entity {
    Manifest(Manifest),
    Character(Character),
    Scenario(Scenario),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Manifest(_) => EntityKind::Manifest,
            Entity::Character(_) => EntityKind::Character,
            Entity::Scenario(_) => EntityKind::Scenario,
        }
    }
}

/// Validates `raw` as a document of the given kind.
pub fn validate(kind: EntityKind, raw: &Value) -> Result<Entity, ValidationError> {
    match kind {
        EntityKind::Manifest => Manifest::from_value(raw).map(Entity::Manifest),
        EntityKind::Character => Character::from_value(raw).map(Entity::Character),
        EntityKind::Scenario => Scenario::from_value(raw).map(Entity::Scenario),
    }
}

/// JSON Schema describing the stored form of a document.
pub fn json_schema(kind: EntityKind) -> RootSchema {
    match kind {
        EntityKind::Manifest => schema_for!(Manifest),
        EntityKind::Character => schema_for!(Character),
        EntityKind::Scenario => schema_for!(Scenario),
    }
}

/// Field accessor over one JSON object, tracking its path for error messages.
pub(crate) struct Fields<'a> {
    entity: EntityKind,
    path: String,
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    pub(crate) fn new(
        entity: EntityKind,
        path: impl Into<String>,
        value: &'a Value,
    ) -> Result<Self, ValidationError> {
        let path = path.into();
        match value {
            Value::Object(map) => Ok(Self { entity, path, map }),
            other => Err(ValidationError::new(
                entity,
                &path,
                expected("object", other),
            )),
        }
    }

    pub(crate) fn map(&self) -> &'a Map<String, Value> {
        self.map
    }

    pub(crate) fn field_path(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.path)
        }
    }

    pub(crate) fn fail(&self, key: &str, message: impl Into<String>) -> ValidationError {
        ValidationError::new(self.entity, &self.field_path(key), message)
    }

    pub(crate) fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key)
    }

    pub(crate) fn required(&self, key: &str) -> Result<&'a Value, ValidationError> {
        self.get(key).ok_or_else(|| self.fail(key, "is required"))
    }

    pub(crate) fn string(&self, key: &str) -> Result<String, ValidationError> {
        match self.required(key)? {
            Value::String(value) => Ok(value.clone()),
            other => Err(self.fail(key, expected("string", other))),
        }
    }

    /// Absent is `None`; an explicit `null` is still a type error.
    pub(crate) fn optional_string(&self, key: &str) -> Result<Option<String>, ValidationError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(value)) => Ok(Some(value.clone())),
            Some(other) => Err(self.fail(key, expected("string", other))),
        }
    }

    /// Must be present; `null` is `None`.
    pub(crate) fn nullable_string(&self, key: &str) -> Result<Option<String>, ValidationError> {
        match self.required(key)? {
            Value::Null => Ok(None),
            Value::String(value) => Ok(Some(value.clone())),
            other => Err(self.fail(key, expected("string or null", other))),
        }
    }

    pub(crate) fn boolean(&self, key: &str) -> Result<bool, ValidationError> {
        match self.required(key)? {
            Value::Bool(value) => Ok(*value),
            other => Err(self.fail(key, expected("boolean", other))),
        }
    }

    pub(crate) fn number(&self, key: &str) -> Result<f64, ValidationError> {
        match self.required(key)? {
            Value::Number(value) => value
                .as_f64()
                .ok_or_else(|| self.fail(key, "must be a finite number")),
            other => Err(self.fail(key, expected("number", other))),
        }
    }

    pub(crate) fn timestamp(&self, key: &str) -> Result<Timestamp, ValidationError> {
        let raw = self.string(key)?;
        Timestamp::parse(&raw)
            .map_err(|_| self.fail(key, format!("must be an ISO-8601 UTC datetime, found {raw:?}")))
    }

    pub(crate) fn schema_version(&self) -> Result<SchemaVersion, ValidationError> {
        const KEY: &str = "schemaVersion";
        match self.required(KEY)? {
            Value::Number(value) if value.as_f64() == Some(f64::from(SCHEMA_VERSION)) => {
                Ok(SchemaVersion)
            }
            other => Err(self.fail(
                KEY,
                format!("must be {SCHEMA_VERSION}, found {other}"),
            )),
        }
    }

    pub(crate) fn array(&self, key: &str) -> Result<&'a [Value], ValidationError> {
        match self.required(key)? {
            Value::Array(items) => Ok(items),
            other => Err(self.fail(key, expected("array", other))),
        }
    }

    pub(crate) fn strings(&self, key: &str) -> Result<Vec<String>, ValidationError> {
        let base = self.field_path(key);
        self.array(key)?
            .iter()
            .enumerate()
            .map(|(position, item)| match item {
                Value::String(value) => Ok(value.clone()),
                other => Err(ValidationError::new(
                    self.entity,
                    &format!("{base}[{position}]"),
                    expected("string", other),
                )),
            })
            .collect()
    }

    /// Reads an array of objects, handing each element its own accessor.
    pub(crate) fn objects<T>(
        &self,
        key: &str,
        mut read: impl FnMut(&Fields<'a>) -> Result<T, ValidationError>,
    ) -> Result<Vec<T>, ValidationError> {
        let base = self.field_path(key);
        self.array(key)?
            .iter()
            .enumerate()
            .map(|(position, item)| {
                let fields = Fields::new(self.entity, format!("{base}[{position}]"), item)?;
                read(&fields)
            })
            .collect()
    }

    pub(crate) fn object(&self, key: &str) -> Result<Fields<'a>, ValidationError> {
        Fields::new(self.entity, self.field_path(key), self.required(key)?)
    }
}

fn expected(wanted: &str, found: &Value) -> String {
    format!("expected {wanted}, found {}", type_name(found))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[path = "../tests/schema_tests.rs"]
mod tests;
