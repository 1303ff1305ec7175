use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::schema::{EntityKind, ValidationError};

pub type ByafResult<T> = Result<T, ByafError>;

#[derive(Debug, Error, Diagnostic)]
pub enum ByafError {
    #[error("failed to access {}: {source}", .path.display())]
    #[diagnostic(code(byaf::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid archive container: {message}")]
    #[diagnostic(
        code(byaf::container),
        help("the file is not a readable zip archive, or it was truncated while writing")
    )]
    Container { message: String },

    #[error("failed to parse {entity} file as JSON: {path}: {message}")]
    #[diagnostic(code(byaf::invalid_json))]
    InvalidJson {
        entity: EntityKind,
        path: String,
        message: String,
    },

    #[error("invalid {} data in {path}: {source}", .source.entity)]
    #[diagnostic(code(byaf::validation))]
    Validation {
        path: String,
        #[source]
        source: ValidationError,
    },

    #[error("manifest `{field}` must list {expected} path(s), found {found}")]
    #[diagnostic(code(byaf::cardinality))]
    Cardinality {
        field: &'static str,
        expected: &'static str,
        found: usize,
    },

    #[error("invalid file path: {path} (expected {expected})")]
    #[diagnostic(code(byaf::path_pattern))]
    PathPattern { path: String, expected: &'static str },

    #[error("{what} file not found in archive: {path}")]
    #[diagnostic(code(byaf::not_found))]
    NotFound { what: &'static str, path: String },

    #[error("duplicate character image name: {name}")]
    #[diagnostic(
        code(byaf::duplicate_image),
        help("every character image must have a distinct file name")
    )]
    DuplicateImage { name: String },

    #[error("author extra key `{key}` collides with a named author field")]
    #[diagnostic(
        code(byaf::reserved_author_key),
        help("`name` and `backyardURL` are written from the author's own fields")
    )]
    ReservedAuthorKey { key: String },

    #[error("attachment for {label} has no usable file name")]
    #[diagnostic(code(byaf::missing_file_name))]
    MissingFileName { label: String },

    #[error("character id {id:?} cannot be used as an archive directory")]
    #[diagnostic(
        code(byaf::invalid_character_id),
        help("use a non-empty id without '/' that is not '.' or '..'")
    )]
    InvalidCharacterId { id: String },

    #[error("failed to encode {what}: {message}")]
    #[diagnostic(code(byaf::encode))]
    Encode { what: String, message: String },

    #[error("invalid configuration: {message}")]
    #[diagnostic(code(byaf::config))]
    Config { message: String },
}

impl ByafError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ByafError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn container(message: impl Into<String>) -> Self {
        ByafError::Container {
            message: message.into(),
        }
    }
}
