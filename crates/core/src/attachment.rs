//! Owned binary payloads travelling with archive documents.

use std::fs;
use std::path::Path;

use crate::error::{ByafError, ByafResult};
use crate::paths;

/// A named blob. The name supplies the basename and extension used when the
/// blob is written into an archive; any directory part is ignored.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    name: String,
    data: Vec<u8>,
}

impl Attachment {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    /// Reads a file from disk, naming the attachment after it.
    pub fn from_path(path: &Path) -> ByafResult<Self> {
        let data = fs::read(path).map_err(|err| ByafError::io(path, err))?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { name, data })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Basename of [`Attachment::name`], if it is usable as an entry name.
    pub fn file_name(&self) -> Option<&str> {
        paths::file_name(&self.name)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

impl std::fmt::Debug for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("name", &self.name)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// A labelled character image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharacterImage {
    pub file: Attachment,
    pub label: String,
}

impl CharacterImage {
    pub fn new(file: Attachment, label: impl Into<String>) -> Self {
        Self {
            file,
            label: label.into(),
        }
    }
}
