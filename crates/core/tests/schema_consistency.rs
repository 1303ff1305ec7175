use std::env;
use std::fs;
use std::path::PathBuf;

use byaf::{json_schema, EntityKind};

fn verify_schema(kind: EntityKind) {
    let schema_json =
        serde_json::to_string_pretty(&json_schema(kind)).expect("failed to encode schema");

    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push(format!("schema_{}.json", kind.as_str()));

    if env::var("UPDATE_SCHEMA").is_ok() || !path.exists() {
        fs::write(&path, schema_json).expect("failed to write schema");
        return;
    }

    let existing_json = fs::read_to_string(&path).expect("failed to read existing schema");

    // Normalize newlines
    let schema_json = schema_json.replace("\r\n", "\n");
    let existing_json = existing_json.replace("\r\n", "\n");

    if schema_json != existing_json {
        panic!(
            "Schema mismatch for {}. Run with UPDATE_SCHEMA=1 to update.\nExpected:\n{}\nActual:\n{}",
            kind, existing_json, schema_json
        );
    }
}

#[test]
fn test_manifest_schema_snapshot() {
    verify_schema(EntityKind::Manifest);
}

#[test]
fn test_character_schema_snapshot() {
    verify_schema(EntityKind::Character);
}

#[test]
fn test_scenario_schema_snapshot() {
    verify_schema(EntityKind::Scenario);
}
