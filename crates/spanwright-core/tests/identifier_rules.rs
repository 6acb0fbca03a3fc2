//! Cross-module checks: identifier rules, resource paths, and config.

use std::collections::HashMap;
use std::path::PathBuf;

use spanwright_core::config::{
    ENV_EMULATOR_HOST, ENV_INSTANCE_ID, ENV_PRIMARY_DATABASE_ID, ENV_PRIMARY_SCHEMA_PATH,
    ENV_PROJECT_ID,
};
use spanwright_core::*;

/// Every combination of a few prefixes, bodies, and suffixes that match
/// `^[a-z][a-z0-9-]{4,28}[a-z0-9]$`.
fn valid_project_ids() -> Vec<String> {
    let long_body = "q".repeat(28);
    let mut ids = Vec::new();
    for first in ["a", "m", "z"] {
        for body in ["bcd", "0000", "-x-y", "test-project-abc", long_body.as_str()] {
            for last in ["1", "z"] {
                let id = format!("{first}{body}{last}");
                if (6..=30).contains(&id.len()) {
                    ids.push(id);
                }
            }
        }
    }
    ids
}

#[test]
fn generated_project_ids_are_accepted() {
    let ids = valid_project_ids();
    assert!(!ids.is_empty());
    for id in ids {
        validate_project_id(&id).unwrap_or_else(|e| panic!("{id}: {e}"));
    }
}

#[test]
fn mutated_project_ids_are_rejected() {
    for id in valid_project_ids() {
        let mutations = [
            format!("{id}-"),
            format!("9{id}"),
            id.to_uppercase(),
            format!("{id}_x"),
            id.chars().take(5).collect::<String>(),
            format!("{id}{}", "a".repeat(30)),
        ];
        for bad in mutations {
            assert!(validate_project_id(&bad).is_err(), "{bad} should be invalid");
        }
    }
}

#[test]
fn traversal_is_reported_even_when_otherwise_valid() {
    for suffix in ["..", "/x", "\\x"] {
        for kind in [
            IdentifierKind::Project,
            IdentifierKind::Instance,
            IdentifierKind::Database,
            IdentifierKind::Table,
        ] {
            let value = format!("valid-name{suffix}");
            let err = validate_identifier(kind, &value).unwrap_err();
            assert!(
                matches!(err, ValidationError::PathTraversal { .. }),
                "{kind} {value}: {err}"
            );
        }
    }
}

#[test]
fn dsn_is_empty_on_any_invalid_component() {
    let cases = [
        ("Test-Project", "test-instance", "test-db"),
        ("test-project", "i", "test-db"),
        ("test-project", "test-instance", "db;drop"),
    ];
    for (p, i, d) in cases {
        assert!(build_secure_dsn(p, i, d).is_err(), "{p}/{i}/{d}");
    }
}

#[test]
fn config_from_variables_builds_resource_paths() {
    let vars: HashMap<&str, &str> = HashMap::from([
        (ENV_PROJECT_ID, "test-project"),
        (ENV_INSTANCE_ID, "test-instance"),
        (ENV_EMULATOR_HOST, "127.0.0.1:9010"),
        (ENV_PRIMARY_DATABASE_ID, "test-db"),
        (ENV_PRIMARY_SCHEMA_PATH, "tests"),
    ]);
    let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
    config.validate().unwrap();

    assert_eq!(config.primary_schema, PathBuf::from("tests"));
    assert_eq!(
        config.primary_database().resource_path().unwrap(),
        "projects/test-project/instances/test-instance/databases/test-db"
    );
    assert!(config.secondary_database().is_none());
}
