//! ISO-8601 UTC instants as stored in archive documents.

use std::fmt;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use schemars::gen::SchemaGenerator;
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::{Serialize, Serializer};

/// A point in time written as `YYYY-MM-DDTHH:MM:SS[.fff]Z`.
///
/// Only the `Z` designator is accepted; explicit offsets are rejected so
/// every stored timestamp is already normalized to UTC.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("not an ISO-8601 UTC datetime: {0:?}")]
pub struct TimestampError(String);

impl Timestamp {
    /// Current time truncated to millisecond precision.
    pub fn now() -> Self {
        Timestamp(Utc::now().trunc_subsecs(3))
    }

    pub fn from_datetime(value: DateTime<Utc>) -> Self {
        Timestamp(value)
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    pub fn parse(input: &str) -> Result<Self, TimestampError> {
        let bytes = input.as_bytes();
        if bytes.len() < 20 || bytes[10] != b'T' || !input.ends_with('Z') {
            return Err(TimestampError(input.to_string()));
        }
        DateTime::parse_from_rfc3339(input)
            .map(|value| Timestamp(value.with_timezone(&Utc)))
            .map_err(|_| TimestampError(input.to_string()))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Timestamp(value)
    }
}

impl std::str::FromStr for Timestamp {
    type Err = TimestampError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Timestamp::parse(input)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl JsonSchema for Timestamp {
    fn schema_name() -> String {
        "Timestamp".to_string()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        let mut schema = String::json_schema(gen).into_object();
        schema.format = Some("date-time".to_string());
        schema.into()
    }
}
