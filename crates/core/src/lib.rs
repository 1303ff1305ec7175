//! Portable character archives (`.byaf`).
//!
//! An archive is an uncompressed zip holding a manifest, exactly one
//! character with its images, and one or more scenarios with optional
//! backgrounds. [`ArchiveWriter`] builds archives deterministically and
//! [`ArchiveReader`] validates and resolves them from untrusted bytes.

mod attachment;
mod config;
mod container;
mod error;
pub mod paths;
mod reader;
mod schema;
mod timestamp;
mod version;
mod writer;

pub use attachment::{Attachment, CharacterImage};
pub use config::{ArchiveConfig, ReaderLimits, WriterOptions};
pub use container::{Container, Entry, EntryKind};
pub use error::{ByafError, ByafResult};
pub use reader::{parse_archive, parse_archive_bytes, parse_archive_with, Archive, ArchiveReader};
pub use schema::{
    json_schema, validate, AiMessage, AiOutput, Author, Character, ChatLine, Entity, EntityKind,
    HumanMessage, ImageRef, LoreItem, Manifest, Message, PromptTemplate, Scenario,
    ValidationError,
};
pub use timestamp::{Timestamp, TimestampError};
pub use version::{SchemaVersion, ARCHIVE_EXTENSION, MANIFEST_PATH, SCHEMA_VERSION};
pub use writer::{build_container, create_archive, ArchiveInput, ArchiveWriter};
