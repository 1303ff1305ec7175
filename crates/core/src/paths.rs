//! Canonical entry naming and allow-list checks for paths taken from archives.
//!
//! The container never normalizes entry names, so any path read out of a
//! manifest, character or scenario document goes through one of these checks
//! before it is used for a lookup.

use crate::error::{ByafError, ByafResult};

pub const CHARACTER_PATH_PATTERN: &str = "characters/<id>/character.json";
pub const SCENARIO_PATH_PATTERN: &str = "scenarios/<name>.json";
pub const RELATIVE_PATH_PATTERN: &str = "a relative path without '.' or '..' segments";

const CHARACTER_FILE: &str = "character.json";

/// `characters/<id>/character.json`
pub fn character_path(id: &str) -> String {
    format!("characters/{id}/{CHARACTER_FILE}")
}

/// `characters/<id>/images/<name>`
pub fn character_image_path(id: &str, name: &str) -> String {
    format!("characters/{id}/{}", character_image_ref(name))
}

/// Image path as recorded inside the character document, relative to its directory.
pub fn character_image_ref(name: &str) -> String {
    format!("images/{name}")
}

/// `scenarios/scenario<n>.json`, with `n` starting at 1.
pub fn scenario_path(number: usize) -> String {
    format!("scenarios/scenario{number}.json")
}

/// `scenarios/scenario<n>-background<ext>`, where `ext` includes its dot.
pub fn scenario_background_path(number: usize, extension: &str) -> String {
    format!("scenarios/scenario{number}-background{extension}")
}

/// Whether `id` can name a single directory level.
pub fn is_valid_character_id(id: &str) -> bool {
    is_plain_segment(id) && !id.contains('\\')
}

/// Matches `characters/<segment>/character.json`.
pub fn is_character_path(path: &str) -> bool {
    let Some(rest) = path.strip_prefix("characters/") else {
        return false;
    };
    let Some(id) = rest.strip_suffix("/character.json") else {
        return false;
    };
    is_plain_segment(id)
}

/// Matches `scenarios/<segment>.json`.
pub fn is_scenario_path(path: &str) -> bool {
    path.strip_prefix("scenarios/")
        .and_then(|rest| rest.strip_suffix(".json"))
        .is_some_and(|stem| !stem.is_empty() && !stem.contains('/'))
}

pub fn check_character_path(path: &str) -> ByafResult<()> {
    if is_character_path(path) {
        Ok(())
    } else {
        Err(ByafError::PathPattern {
            path: path.to_string(),
            expected: CHARACTER_PATH_PATTERN,
        })
    }
}

pub fn check_scenario_path(path: &str) -> ByafResult<()> {
    if is_scenario_path(path) {
        Ok(())
    } else {
        Err(ByafError::PathPattern {
            path: path.to_string(),
            expected: SCENARIO_PATH_PATTERN,
        })
    }
}

/// Validates an untrusted relative entry path.
///
/// Rejects empty, absolute and backslash paths, and any `.`, `..` or empty
/// segment. The returned slice is the input unchanged.
pub fn sanitize_relative(path: &str) -> ByafResult<&str> {
    let rejected = || ByafError::PathPattern {
        path: path.to_string(),
        expected: RELATIVE_PATH_PATTERN,
    };
    if path.is_empty() || path.starts_with('/') || path.contains('\\') {
        return Err(rejected());
    }
    if path.split('/').all(is_plain_segment) {
        Ok(path)
    } else {
        Err(rejected())
    }
}

/// Directory part of `path`, without the trailing slash.
pub fn parent(path: &str) -> &str {
    path.rfind('/').map_or("", |index| &path[..index])
}

/// Joins a relative path onto a directory.
pub fn join(dir: &str, relative: &str) -> String {
    if dir.is_empty() {
        relative.to_string()
    } else {
        format!("{dir}/{relative}")
    }
}

/// Last segment of a `/` or `\` separated name.
pub fn basename(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

/// Basename usable as an entry file name, if any.
pub fn file_name(name: &str) -> Option<&str> {
    let base = basename(name);
    is_plain_segment(base).then_some(base)
}

/// Extension of a file name including its dot; empty for none or dotfiles.
pub fn extension(name: &str) -> &str {
    let base = basename(name);
    match base.rfind('.') {
        Some(0) | None => "",
        Some(index) => &base[index..],
    }
}

fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty() && segment != "." && segment != ".." && !segment.contains('/')
}
