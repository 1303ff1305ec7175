use schemars::JsonSchema;
use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

use super::{EntityKind, Fields, ValidationError};
use crate::paths;
use crate::timestamp::Timestamp;
use crate::version::SchemaVersion;

/// Top-level index naming the character and scenario documents of an archive.
#[derive(Clone, Debug, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub schema_version: SchemaVersion,
    pub created_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    /// Exactly one `characters/<id>/character.json` path.
    pub characters: Vec<String>,
    /// At least one `scenarios/<name>.json` path, in presentation order.
    pub scenarios: Vec<String>,
}

/// Archive author. Keys other than `name` and the profile URL are kept verbatim.
///
/// `profileURL` is read as the profile URL only when `backyardURL` is absent;
/// otherwise it is an ordinary extra key.
#[derive(Clone, Debug, PartialEq, Serialize, JsonSchema)]
pub struct Author {
    pub name: String,
    /// Canonical profile URL.
    #[serde(rename = "backyardURL")]
    pub profile_url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

const PROFILE_URL_KEY: &str = "backyardURL";
const PROFILE_URL_ALIAS: &str = "profileURL";

impl Author {
    pub fn new(name: impl Into<String>, profile_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            profile_url: profile_url.into(),
            extra: Map::new(),
        }
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// First `extra` key that would shadow `name` or the profile URL on the wire.
    pub fn reserved_extra_key(&self) -> Option<&str> {
        self.extra
            .keys()
            .map(String::as_str)
            .find(|key| matches!(*key, "name" | PROFILE_URL_KEY))
    }

    fn read(fields: &Fields<'_>) -> Result<Self, ValidationError> {
        let name = fields.string("name")?;
        let url_key =
            if fields.get(PROFILE_URL_KEY).is_none() && fields.get(PROFILE_URL_ALIAS).is_some() {
                PROFILE_URL_ALIAS
            } else {
                PROFILE_URL_KEY
            };
        let profile_url = fields.string(url_key)?;
        Url::parse(&profile_url)
            .map_err(|err| fields.fail(url_key, format!("must be a valid URL: {err}")))?;
        let extra = fields
            .map()
            .iter()
            .filter(|(key, _)| key.as_str() != "name" && key.as_str() != url_key)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Ok(Self {
            name,
            profile_url,
            extra,
        })
    }
}

impl Manifest {
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let fields = Fields::new(EntityKind::Manifest, "", value)?;
        let schema_version = fields.schema_version()?;
        let created_at = fields.timestamp("createdAt")?;
        let author = match fields.get("author") {
            None => None,
            Some(_) => Some(Author::read(&fields.object("author")?)?),
        };

        let characters = fields.strings("characters")?;
        if characters.len() != 1 {
            return Err(fields.fail(
                "characters",
                format!("must contain exactly 1 path, found {}", characters.len()),
            ));
        }
        for (position, path) in characters.iter().enumerate() {
            if !paths::is_character_path(path) {
                return Err(fields.fail(
                    &format!("characters[{position}]"),
                    format!("must match {}", paths::CHARACTER_PATH_PATTERN),
                ));
            }
        }

        let scenarios = fields.strings("scenarios")?;
        if scenarios.is_empty() {
            return Err(fields.fail("scenarios", "must contain at least 1 path"));
        }
        for (position, path) in scenarios.iter().enumerate() {
            if !paths::is_scenario_path(path) {
                return Err(fields.fail(
                    &format!("scenarios[{position}]"),
                    format!("must match {}", paths::SCENARIO_PATH_PATTERN),
                ));
            }
        }

        Ok(Self {
            schema_version,
            created_at,
            author,
            characters,
            scenarios,
        })
    }

    /// The single character path; only meaningful on a validated manifest.
    pub fn character_path(&self) -> Option<&str> {
        match self.characters.as_slice() {
            [path] => Some(path),
            _ => None,
        }
    }
}
