//! Builds archives from in-memory documents and their attachments.
//!
//! Entries are emitted in a fixed order: the manifest, then each character
//! image followed by the character document, then for every scenario its
//! optional background followed by the scenario document. Together with the
//! container's stored entries and fixed entry timestamps this makes the output
//! a pure function of the input and the manifest's `createdAt`.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::attachment::{Attachment, CharacterImage};
use crate::config::WriterOptions;
use crate::container::{Container, EntryKind};
use crate::error::{ByafError, ByafResult};
use crate::paths;
use crate::schema::{Author, Character, ImageRef, Manifest, Scenario, ValidationError};
use crate::timestamp::Timestamp;
use crate::version::{SchemaVersion, MANIFEST_PATH};

/// Everything that goes into one archive.
#[derive(Clone, Debug, PartialEq)]
pub struct ArchiveInput {
    pub character: Character<CharacterImage>,
    /// Presentation order; scenario `i` is written as `scenarios/scenario{i+1}.json`.
    pub scenarios: Vec<Scenario<Attachment>>,
    pub author: Option<Author>,
}

impl ArchiveInput {
    pub fn new(character: Character<CharacterImage>, scenarios: Vec<Scenario<Attachment>>) -> Self {
        Self {
            character,
            scenarios,
            author: None,
        }
    }

    pub fn with_author(mut self, author: Author) -> Self {
        self.author = Some(author);
        self
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ArchiveWriter {
    options: WriterOptions,
}

struct PlannedScenario<'a> {
    path: String,
    document: Scenario,
    background: Option<(String, &'a [u8])>,
}

impl ArchiveWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: WriterOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &WriterOptions {
        &self.options
    }

    /// Builds the container in memory, stamping the manifest with the current time.
    pub fn build(&self, input: &ArchiveInput) -> ByafResult<Container> {
        self.build_at(input, Timestamp::now())
            .map(|(_, container)| container)
    }

    /// Builds the container with an explicit manifest `createdAt`.
    ///
    /// Nothing is emitted unless every document passes; on error the partial
    /// container is dropped.
    #[instrument(skip_all, fields(character = %input.character.id, scenarios = input.scenarios.len()))]
    pub fn build_at(
        &self,
        input: &ArchiveInput,
        created_at: Timestamp,
    ) -> ByafResult<(Manifest, Container)> {
        let id = input.character.id.as_str();
        if !paths::is_valid_character_id(id) {
            return Err(ByafError::InvalidCharacterId { id: id.to_string() });
        }
        if input.scenarios.is_empty() {
            return Err(ByafError::Cardinality {
                field: "scenarios",
                expected: "at least 1",
                found: 0,
            });
        }
        if let Some(key) = input.author.as_ref().and_then(Author::reserved_extra_key) {
            return Err(ByafError::ReservedAuthorKey {
                key: key.to_string(),
            });
        }
        let character_path = paths::character_path(id);

        let mut seen = HashSet::new();
        let mut images = Vec::with_capacity(input.character.images.len());
        let mut image_refs = Vec::with_capacity(input.character.images.len());
        for image in &input.character.images {
            let name = image
                .file
                .file_name()
                .ok_or_else(|| ByafError::MissingFileName {
                    label: format!("character image {:?}", image.label),
                })?;
            if !seen.insert(name) {
                return Err(ByafError::DuplicateImage {
                    name: name.to_string(),
                });
            }
            images.push((paths::character_image_path(id, name), image.file.data()));
            image_refs.push(ImageRef {
                path: paths::character_image_ref(name),
                label: image.label.clone(),
            });
        }
        let character = input.character.with_images(image_refs);

        let mut scenarios = Vec::with_capacity(input.scenarios.len());
        for (position, scenario) in input.scenarios.iter().enumerate() {
            let number = position + 1;
            let background = match &scenario.background_image {
                None => None,
                Some(file) => {
                    let name = file.file_name().ok_or_else(|| ByafError::MissingFileName {
                        label: format!("scenario {number} background"),
                    })?;
                    let path = paths::scenario_background_path(number, paths::extension(name));
                    Some((path, file.data()))
                }
            };
            let document =
                scenario.with_background(background.as_ref().map(|(path, _)| path.clone()));
            scenarios.push(PlannedScenario {
                path: paths::scenario_path(number),
                document,
                background,
            });
        }

        if self.options.validate_inputs {
            check_document(&character_path, &character, Character::from_value)?;
            for planned in &scenarios {
                check_document(&planned.path, &planned.document, Scenario::from_value)?;
            }
        }

        let manifest = Manifest {
            schema_version: SchemaVersion,
            created_at,
            author: input.author.clone(),
            characters: vec![character_path.clone()],
            scenarios: scenarios.iter().map(|planned| planned.path.clone()).collect(),
        };
        check_document(MANIFEST_PATH, &manifest, Manifest::from_value)?;

        let mut container = Container::new();
        container.set(MANIFEST_PATH, encode(MANIFEST_PATH, &manifest)?, EntryKind::Text);
        for (path, data) in images {
            debug!(entry = %path, bytes = data.len(), "emitting character image");
            container.set(path, data, EntryKind::Binary);
        }
        let character_json = encode(&character_path, &character)?;
        container.set(character_path, character_json, EntryKind::Text);
        for planned in scenarios {
            if let Some((path, data)) = planned.background {
                debug!(entry = %path, bytes = data.len(), "emitting scenario background");
                container.set(path, data, EntryKind::Binary);
            }
            let scenario_json = encode(&planned.path, &planned.document)?;
            container.set(planned.path, scenario_json, EntryKind::Text);
        }

        info!(entries = container.len(), "archive assembled");
        Ok((manifest, container))
    }

    /// Builds and writes the archive to `path` in one write.
    ///
    /// The file is not replaced atomically; an interrupted write leaves a file
    /// the reader rejects, and re-running regenerates it.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn write(&self, path: &Path, input: &ArchiveInput) -> ByafResult<Manifest> {
        let (manifest, container) = self.build_at(input, Timestamp::now())?;
        let bytes = container.serialize()?;
        if self.options.create_parent_dirs {
            if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|err| ByafError::io(parent, err))?;
            }
        }
        fs::write(path, &bytes).map_err(|err| ByafError::io(path, err))?;
        info!(bytes = bytes.len(), "archive written");
        Ok(manifest)
    }
}

/// Builds an archive container with default options.
pub fn build_container(input: &ArchiveInput) -> ByafResult<Container> {
    ArchiveWriter::new().build(input)
}

/// Writes an archive to `path` with default options.
pub fn create_archive(path: &Path, input: &ArchiveInput) -> ByafResult<Manifest> {
    ArchiveWriter::new().write(path, input)
}

fn check_document<T: Serialize, U>(
    path: &str,
    document: &T,
    validate: fn(&Value) -> Result<U, ValidationError>,
) -> ByafResult<()> {
    let value = serde_json::to_value(document).map_err(|err| ByafError::Encode {
        what: path.to_string(),
        message: err.to_string(),
    })?;
    validate(&value)
        .map(drop)
        .map_err(|source| ByafError::Validation {
            path: path.to_string(),
            source,
        })
}

fn encode<T: Serialize>(path: &str, document: &T) -> ByafResult<Vec<u8>> {
    serde_json::to_vec_pretty(document).map_err(|err| ByafError::Encode {
        what: path.to_string(),
        message: err.to_string(),
    })
}
