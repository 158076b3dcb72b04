//! Table-driven tests for configuration loading and validation.

use std::io::Write;

use serial_test::serial;

use claimflow::config::{load_config, load_config_from_str, load_or_default};

/// Represents a single config loading test case.
struct ConfigTestCase {
    name: &'static str,
    config_json: &'static str,
    should_succeed: bool,
    /// Expected error substring (if should_succeed is false).
    expected_error: Option<&'static str>,
}

const CONFIG_TESTS: &[ConfigTestCase] = &[
    ConfigTestCase {
        name: "valid_minimal",
        config_json: r#"{ "version": "1.0" }"#,
        should_succeed: true,
        expected_error: None,
    },
    ConfigTestCase {
        name: "valid_postgres",
        config_json: r#"{
            "version": "1.0",
            "database_url": "postgres://claims:secret@db/claims",
            "server": { "port": 8443 }
        }"#,
        should_succeed: true,
        expected_error: None,
    },
    ConfigTestCase {
        name: "valid_german_default",
        config_json: r#"{ "version": "1.0", "default_culture": "de-CH" }"#,
        should_succeed: true,
        expected_error: None,
    },
    ConfigTestCase {
        name: "missing_version",
        config_json: r#"{ "server": { "port": 80 } }"#,
        should_succeed: false,
        expected_error: Some("Schema validation failed"),
    },
    ConfigTestCase {
        name: "port_out_of_range",
        config_json: r#"{ "version": "1.0", "server": { "port": 70000 } }"#,
        should_succeed: false,
        expected_error: Some("Schema validation failed"),
    },
    ConfigTestCase {
        name: "negative_delay",
        config_json: r#"{ "version": "1.0", "ingestion": { "extraction_delay_ms": -1 } }"#,
        should_succeed: false,
        expected_error: Some("Schema validation failed"),
    },
    ConfigTestCase {
        name: "unknown_logging_field",
        config_json: r#"{ "version": "1.0", "logging": { "colour": true } }"#,
        should_succeed: false,
        expected_error: Some("Schema validation failed"),
    },
    ConfigTestCase {
        name: "unsupported_culture",
        config_json: r#"{ "version": "1.0", "default_culture": "fr-FR" }"#,
        should_succeed: false,
        expected_error: Some("Unknown culture"),
    },
    ConfigTestCase {
        name: "mysql_url",
        config_json: r#"{ "version": "1.0", "database_url": "mysql://db/claims" }"#,
        should_succeed: false,
        expected_error: Some("Unsupported database URL scheme"),
    },
];

#[test]
fn config_loading_table() {
    for case in CONFIG_TESTS {
        let result = load_config_from_str(case.config_json);
        match (case.should_succeed, result) {
            (true, Ok(_)) => {}
            (true, Err(e)) => panic!("{}: expected success, got {}", case.name, e),
            (false, Ok(_)) => panic!("{}: expected failure", case.name),
            (false, Err(e)) => {
                if let Some(expected) = case.expected_error {
                    assert!(
                        e.to_string().contains(expected),
                        "{}: error '{}' does not contain '{}'",
                        case.name,
                        e,
                        expected
                    );
                }
            }
        }
    }
}

#[test]
fn loads_config_file_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    let mut file = std::fs::File::create(&path).unwrap();
    write!(
        file,
        r#"{{ "version": "1.0", "ingestion": {{ "queue_capacity": 25, "enabled": false }} }}"#
    )
    .unwrap();

    let config = load_config(&path).unwrap();
    assert_eq!(config.ingestion.queue_capacity, 25);
    assert!(!config.ingestion.enabled);
}

#[test]
#[serial]
fn falls_back_to_defaults_without_home_config() {
    let home = tempfile::tempdir().unwrap();
    let previous = std::env::var_os("HOME");
    std::env::set_var("HOME", home.path());

    let config = load_or_default(None);

    match previous {
        Some(value) => std::env::set_var("HOME", value),
        None => std::env::remove_var("HOME"),
    }

    let config = config.unwrap();
    assert_eq!(config.server.port, 8080);
    assert!(config.seed_default_stages);
}

#[test]
#[serial]
fn picks_up_home_config_when_present() {
    let home = tempfile::tempdir().unwrap();
    let config_dir = home.path().join(".claimflow");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.json"),
        r#"{ "version": "1.0", "server": { "port": 9191 } }"#,
    )
    .unwrap();

    let previous = std::env::var_os("HOME");
    std::env::set_var("HOME", home.path());

    let config = load_or_default(None);

    match previous {
        Some(value) => std::env::set_var("HOME", value),
        None => std::env::remove_var("HOME"),
    }

    assert_eq!(config.unwrap().server.port, 9191);
}
