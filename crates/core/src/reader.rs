//! Reconstructs archives from untrusted bytes.
//!
//! Reading is strictly sequential and stops at the first failure: manifest,
//! character, scenarios in manifest order, scenario backgrounds, then character
//! images. Every path taken from a document is checked against an allow-list
//! before it is looked up.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::attachment::{Attachment, CharacterImage};
use crate::config::ReaderLimits;
use crate::container::Container;
use crate::error::{ByafError, ByafResult};
use crate::paths;
use crate::schema::{Character, EntityKind, Manifest, Scenario, ValidationError};
use crate::version::MANIFEST_PATH;

/// A fully resolved archive. Attachments are owned copies of the entry bytes.
#[derive(Clone, Debug, PartialEq)]
pub struct Archive {
    pub manifest: Manifest,
    pub character: Character<CharacterImage>,
    /// In manifest order.
    pub scenarios: Vec<Scenario<Attachment>>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ArchiveReader {
    limits: ReaderLimits,
}

impl ArchiveReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: ReaderLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &ReaderLimits {
        &self.limits
    }

    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn read_path(&self, path: &Path) -> ByafResult<Archive> {
        let bytes = fs::read(path).map_err(|err| ByafError::io(path, err))?;
        self.read_bytes(&bytes)
    }

    pub fn read_bytes(&self, bytes: &[u8]) -> ByafResult<Archive> {
        let container = Container::deserialize_with_limits(bytes, &self.limits)?;
        self.read_container(&container)
    }

    #[instrument(skip_all, fields(entries = container.len()))]
    pub fn read_container(&self, container: &Container) -> ByafResult<Archive> {
        let manifest_value = load_json(container, MANIFEST_PATH, EntityKind::Manifest)?;
        check_manifest_references(&manifest_value)?;
        let manifest = Manifest::from_value(&manifest_value).map_err(|source| {
            ByafError::Validation {
                path: MANIFEST_PATH.to_string(),
                source,
            }
        })?;

        let character_path = manifest
            .character_path()
            .ok_or_else(|| ByafError::Cardinality {
                field: "characters",
                expected: "exactly 1",
                found: manifest.characters.len(),
            })?;
        paths::check_character_path(character_path)?;
        let stored_character = load_document(
            container,
            character_path,
            EntityKind::Character,
            Character::from_value,
        )?;
        debug!(entry = %character_path, "loaded character");

        let mut documents = Vec::with_capacity(manifest.scenarios.len());
        for path in &manifest.scenarios {
            paths::check_scenario_path(path)?;
            documents.push(load_document(
                container,
                path,
                EntityKind::Scenario,
                Scenario::from_value,
            )?);
            debug!(entry = %path, "loaded scenario");
        }

        let mut scenarios = Vec::with_capacity(documents.len());
        for document in documents {
            let background = match document.background_image.as_deref() {
                None => None,
                Some(reference) => {
                    let path = paths::sanitize_relative(reference)?;
                    Some(resolve(container, path, "background image")?)
                }
            };
            let (scenario, _) = document.into_background(background);
            scenarios.push(scenario);
        }

        let character_dir = paths::parent(character_path);
        let mut images = Vec::with_capacity(stored_character.images.len());
        for image in &stored_character.images {
            let relative = paths::sanitize_relative(&image.path)?;
            let path = paths::join(character_dir, relative);
            images.push(CharacterImage {
                file: resolve(container, &path, "character image")?,
                label: image.label.clone(),
            });
        }
        let (character, _) = stored_character.into_images(images);

        info!(
            character = %character.id,
            images = character.images.len(),
            scenarios = scenarios.len(),
            "archive parsed"
        );
        Ok(Archive {
            manifest,
            character,
            scenarios,
        })
    }
}

/// Reads and fully resolves the archive at `path` with default limits.
pub fn parse_archive(path: &Path) -> ByafResult<Archive> {
    ArchiveReader::new().read_path(path)
}

pub fn parse_archive_with(path: &Path, limits: ReaderLimits) -> ByafResult<Archive> {
    ArchiveReader::with_limits(limits).read_path(path)
}

pub fn parse_archive_bytes(bytes: &[u8], limits: &ReaderLimits) -> ByafResult<Archive> {
    ArchiveReader::with_limits(*limits).read_bytes(bytes)
}

/// Cardinality and path-shape checks on the raw manifest, ahead of schema
/// validation, so violations surface as their own error kinds.
fn check_manifest_references(manifest: &Value) -> ByafResult<()> {
    if let Some(Value::Array(characters)) = manifest.get("characters") {
        if characters.len() != 1 {
            warn!(found = characters.len(), "manifest must name exactly one character");
            return Err(ByafError::Cardinality {
                field: "characters",
                expected: "exactly 1",
                found: characters.len(),
            });
        }
        for path in characters.iter().filter_map(Value::as_str) {
            paths::check_character_path(path).inspect_err(|_| {
                warn!(path, "rejected character path");
            })?;
        }
    }
    if let Some(Value::Array(scenarios)) = manifest.get("scenarios") {
        if scenarios.is_empty() {
            warn!("manifest names no scenarios");
            return Err(ByafError::Cardinality {
                field: "scenarios",
                expected: "at least 1",
                found: 0,
            });
        }
        for path in scenarios.iter().filter_map(Value::as_str) {
            paths::check_scenario_path(path).inspect_err(|_| {
                warn!(path, "rejected scenario path");
            })?;
        }
    }
    Ok(())
}

fn load_json(container: &Container, path: &str, entity: EntityKind) -> ByafResult<Value> {
    let bytes = container.get(path).ok_or_else(|| ByafError::NotFound {
        what: entity.as_str(),
        path: path.to_string(),
    })?;
    serde_json::from_slice(bytes).map_err(|err| ByafError::InvalidJson {
        entity,
        path: path.to_string(),
        message: err.to_string(),
    })
}

fn load_document<T>(
    container: &Container,
    path: &str,
    entity: EntityKind,
    validate: fn(&Value) -> Result<T, ValidationError>,
) -> ByafResult<T> {
    let value = load_json(container, path, entity)?;
    validate(&value).map_err(|source| ByafError::Validation {
        path: path.to_string(),
        source,
    })
}

fn resolve(container: &Container, path: &str, what: &'static str) -> ByafResult<Attachment> {
    let data = container.get(path).ok_or_else(|| ByafError::NotFound {
        what,
        path: path.to_string(),
    })?;
    Ok(Attachment::new(paths::basename(path), data))
}
