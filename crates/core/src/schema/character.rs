use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;

use super::{EntityKind, Fields, ValidationError};
use crate::timestamp::Timestamp;
use crate::version::SchemaVersion;

/// Persona definition.
///
/// `I` is the image representation: [`ImageRef`] in the stored document,
/// [`crate::CharacterImage`] when images travel as attachments.
#[derive(Clone, Debug, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Character<I = ImageRef> {
    pub schema_version: SchemaVersion,
    /// Non-empty; names the character's directory inside the archive.
    pub id: String,
    /// Shorthand name, often a nickname.
    pub name: String,
    /// Full name.
    pub display_name: String,
    #[serde(rename = "isNSFW")]
    pub is_nsfw: bool,
    pub persona: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub lore_items: Vec<LoreItem>,
    pub images: Vec<I>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, JsonSchema)]
pub struct LoreItem {
    pub key: String,
    pub value: String,
}

/// Image entry of a stored character; `path` is relative to the character's directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, JsonSchema)]
pub struct ImageRef {
    pub path: String,
    pub label: String,
}

impl<I> Character<I> {
    /// Copy of this character carrying a different image list.
    pub fn with_images<J>(&self, images: Vec<J>) -> Character<J> {
        Character {
            schema_version: self.schema_version,
            id: self.id.clone(),
            name: self.name.clone(),
            display_name: self.display_name.clone(),
            is_nsfw: self.is_nsfw,
            persona: self.persona.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            lore_items: self.lore_items.clone(),
            images,
        }
    }

    /// Consumes the character, replacing its images.
    pub fn into_images<J>(self, images: Vec<J>) -> (Character<J>, Vec<I>) {
        let Character {
            schema_version,
            id,
            name,
            display_name,
            is_nsfw,
            persona,
            created_at,
            updated_at,
            lore_items,
            images: previous,
        } = self;
        let character = Character {
            schema_version,
            id,
            name,
            display_name,
            is_nsfw,
            persona,
            created_at,
            updated_at,
            lore_items,
            images,
        };
        (character, previous)
    }
}

impl Character {
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let fields = Fields::new(EntityKind::Character, "", value)?;
        let schema_version = fields.schema_version()?;
        let id = fields.string("id")?;
        if id.is_empty() {
            return Err(fields.fail("id", "must not be empty"));
        }
        Ok(Self {
            schema_version,
            id,
            name: fields.string("name")?,
            display_name: fields.string("displayName")?,
            is_nsfw: fields.boolean("isNSFW")?,
            persona: fields.string("persona")?,
            created_at: fields.timestamp("createdAt")?,
            updated_at: fields.timestamp("updatedAt")?,
            lore_items: fields.objects("loreItems", |item| {
                Ok(LoreItem {
                    key: item.string("key")?,
                    value: item.string("value")?,
                })
            })?,
            images: fields.objects("images", |item| {
                Ok(ImageRef {
                    path: item.string("path")?,
                    label: item.string("label")?,
                })
            })?,
        })
    }
}
