//! Reader limits and writer options, optionally loaded from TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ByafError, ByafResult};

/// Upper bounds applied to untrusted containers before any document is read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderLimits {
    pub max_archive_bytes: u64,
    pub max_entries: usize,
    pub max_entry_bytes: u64,
}

impl Default for ReaderLimits {
    fn default() -> Self {
        Self {
            max_archive_bytes: 256 * 1024 * 1024,
            max_entries: 4_096,
            max_entry_bytes: 64 * 1024 * 1024,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterOptions {
    /// Validate the character and scenario documents before emitting anything.
    pub validate_inputs: bool,
    /// Create missing parent directories of the output path.
    pub create_parent_dirs: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            validate_inputs: true,
            create_parent_dirs: true,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    pub reader: ReaderLimits,
    pub writer: WriterOptions,
}

impl ArchiveConfig {
    pub fn from_toml_str(input: &str) -> ByafResult<Self> {
        toml::from_str(input).map_err(|err| ByafError::Config {
            message: err.to_string(),
        })
    }

    /// Loads a config file; missing keys fall back to defaults.
    pub fn load(path: &Path) -> ByafResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|err| ByafError::io(path, err))?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = ArchiveConfig::from_toml_str(
            r#"
[reader]
max_entries = 16

[writer]
validate_inputs = false
"#,
        )
        .expect("config should parse");

        assert_eq!(config.reader.max_entries, 16);
        assert_eq!(
            config.reader.max_entry_bytes,
            ReaderLimits::default().max_entry_bytes
        );
        assert!(!config.writer.validate_inputs);
        assert!(config.writer.create_parent_dirs);
    }

    #[test]
    fn empty_toml_is_default() {
        let config = ArchiveConfig::from_toml_str("").expect("empty config should parse");
        assert_eq!(config, ArchiveConfig::default());
    }

    #[test]
    fn malformed_toml_is_config_error() {
        let err = ArchiveConfig::from_toml_str("[reader]\nmax_entries = \"many\"")
            .expect_err("type mismatch must fail");
        assert!(matches!(err, ByafError::Config { .. }));
    }

    #[test]
    fn load_missing_file_names_path() {
        let err = ArchiveConfig::load(Path::new("/definitely/not/here/byaf.toml"))
            .expect_err("missing file must fail");
        match err {
            ByafError::Io { path, .. } => assert!(path.ends_with("byaf.toml")),
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
