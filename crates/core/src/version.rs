//! Format versioning constants and canonical entry names.
//!
//! Every document in an archive carries `schemaVersion: 1`. A future layout
//! change bumps [`SCHEMA_VERSION`] and adds a new reader path.

use schemars::gen::SchemaGenerator;
use schemars::schema::{InstanceType, Schema, SchemaObject};
use schemars::JsonSchema;
use serde::{Serialize, Serializer};

/// Schema version written to and accepted from every archive document.
pub const SCHEMA_VERSION: u32 = 1;

/// Name of the index entry at the container root.
pub const MANIFEST_PATH: &str = "manifest.json";

/// Conventional file extension for archives.
pub const ARCHIVE_EXTENSION: &str = "byaf";

/// Marker for the pinned `schemaVersion` field.
///
/// It has a single value, so documents can only be constructed at the
/// current version; it serializes as the number `1`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SchemaVersion;

impl SchemaVersion {
    pub fn get(self) -> u32 {
        SCHEMA_VERSION
    }
}

impl Serialize for SchemaVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(SCHEMA_VERSION)
    }
}

impl JsonSchema for SchemaVersion {
    fn schema_name() -> String {
        "SchemaVersion".to_string()
    }

    fn json_schema(_gen: &mut SchemaGenerator) -> Schema {
        SchemaObject {
            instance_type: Some(InstanceType::Integer.into()),
            const_value: Some(SCHEMA_VERSION.into()),
            ..Default::default()
        }
        .into()
    }
}
