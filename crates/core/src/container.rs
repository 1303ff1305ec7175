//! Named-entry byte store serialized as a zip archive with stored entries.
//!
//! Entry names are POSIX-style, case-sensitive and taken verbatim: no
//! normalization happens here. Callers resolving names that came out of the
//! archive itself must check them first (see [`crate::paths`]).

use std::collections::HashMap;
use std::io::{Cursor, Read, Write};

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

use crate::config::ReaderLimits;
use crate::error::{ByafError, ByafResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    Text,
    Binary,
}

impl EntryKind {
    /// Kind assumed for entries read back from bytes.
    pub fn for_path(path: &str) -> Self {
        if path.ends_with(".json") {
            EntryKind::Text
        } else {
            EntryKind::Binary
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    path: String,
    kind: EntryKind,
    data: Vec<u8>,
}

impl Entry {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Ordered set of entries; serialization preserves insertion order.
#[derive(Clone, Debug, Default)]
pub struct Container {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an entry. A replaced entry keeps its original position.
    pub fn set(&mut self, path: impl Into<String>, data: impl Into<Vec<u8>>, kind: EntryKind) {
        let path = path.into();
        let data = data.into();
        if let Some(&position) = self.index.get(&path) {
            let entry = &mut self.entries[position];
            entry.kind = kind;
            entry.data = data;
            return;
        }
        self.index.insert(path.clone(), self.entries.len());
        self.entries.push(Entry { path, kind, data });
    }

    pub fn set_text(&mut self, path: impl Into<String>, text: impl Into<String>) {
        self.set(path, text.into().into_bytes(), EntryKind::Text);
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.entry(path).map(Entry::data)
    }

    pub fn entry(&self, path: &str) -> Option<&Entry> {
        self.index.get(path).map(|&position| &self.entries[position])
    }

    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(Entry::path)
    }

    /// Serializes every entry uncompressed with a fixed timestamp, so equal
    /// containers produce equal bytes.
    pub fn serialize(&self) -> ByafResult<Vec<u8>> {
        let payload: usize = self.entries.iter().map(|entry| entry.data.len()).sum();
        let mut writer = ZipWriter::new(Cursor::new(Vec::with_capacity(
            payload + 128 * self.entries.len() + 64,
        )));
        for entry in &self.entries {
            writer
                .start_file(entry.path.as_str(), stored_options())
                .map_err(|err| {
                    ByafError::container(format!("failed to start entry {}: {err}", entry.path))
                })?;
            writer.write_all(&entry.data).map_err(|err| {
                ByafError::container(format!("failed to write entry {}: {err}", entry.path))
            })?;
        }
        let cursor = writer
            .finish()
            .map_err(|err| ByafError::container(format!("failed to finish archive: {err}")))?;
        Ok(cursor.into_inner())
    }

    pub fn deserialize(bytes: &[u8]) -> ByafResult<Self> {
        Self::deserialize_with_limits(bytes, &ReaderLimits::default())
    }

    /// Decodes a container, refusing it outright if any limit is exceeded.
    pub fn deserialize_with_limits(bytes: &[u8], limits: &ReaderLimits) -> ByafResult<Self> {
        if bytes.len() as u64 > limits.max_archive_bytes {
            return Err(ByafError::container(format!(
                "archive is {} bytes (max {})",
                bytes.len(),
                limits.max_archive_bytes
            )));
        }
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|err| ByafError::container(format!("failed to parse archive as zip: {err}")))?;
        if archive.len() > limits.max_entries {
            return Err(ByafError::container(format!(
                "archive has {} entries (max {})",
                archive.len(),
                limits.max_entries
            )));
        }

        let mut container = Container::new();
        for position in 0..archive.len() {
            let mut file = archive.by_index(position).map_err(|err| {
                ByafError::container(format!("failed to open entry #{position}: {err}"))
            })?;
            if file.is_dir() {
                continue;
            }
            let path = file.name().to_string();
            let size = file.size();
            if size > limits.max_entry_bytes {
                return Err(ByafError::container(format!(
                    "entry {path} is {size} bytes (max {})",
                    limits.max_entry_bytes
                )));
            }
            // The declared size comes from the archive itself; bound the
            // decoded stream too.
            let mut data = Vec::with_capacity(size.min(DECODE_CAPACITY_HINT) as usize);
            (&mut file)
                .take(limits.max_entry_bytes.saturating_add(1))
                .read_to_end(&mut data)
                .map_err(|err| {
                    ByafError::container(format!("failed to read entry {path}: {err}"))
                })?;
            if data.len() as u64 > limits.max_entry_bytes {
                return Err(ByafError::container(format!(
                    "entry {path} decodes to more than {} bytes",
                    limits.max_entry_bytes
                )));
            }
            debug!(entry = %path, bytes = data.len(), "decoded container entry");
            let kind = EntryKind::for_path(&path);
            container.set(path, data, kind);
        }
        Ok(container)
    }
}

const DECODE_CAPACITY_HINT: u64 = 1024 * 1024;

fn stored_options() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Stored)
        .last_modified_time(DateTime::default())
}

#[cfg(test)]
#[path = "tests/container_tests.rs"]
mod tests;
