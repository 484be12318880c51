//! Unit tests for configuration loading and the allowed-hosts overlay
//!
//! Note: Uses serial_test to prevent ENV variable race conditions. Tests
//! that manipulate HOST_CONTAINER_NAME or KATSU_* variables are marked with
//! #[serial] so they run sequentially, not in parallel.

use std::env;

use serial_test::serial;

use katsu_common::config::{
    overlay_container_host, ServerConfig, CONFIG_FILE_VAR, DATABASE_VAR, HOST_CONTAINER_NAME_VAR,
};

fn base_hosts() -> Vec<String> {
    vec!["localhost".to_string(), "127.0.0.1".to_string()]
}

#[test]
#[serial]
fn test_overlay_unset_env_leaves_base_list() {
    env::remove_var(HOST_CONTAINER_NAME_VAR);

    let hosts = overlay_container_host(base_hosts());
    assert_eq!(hosts, base_hosts());
}

#[test]
#[serial]
fn test_overlay_adds_new_host_exactly_once() {
    env::set_var(HOST_CONTAINER_NAME_VAR, "katsu.docker.internal");

    let hosts = overlay_container_host(base_hosts());
    let matches = hosts.iter().filter(|h| *h == "katsu.docker.internal").count();
    assert_eq!(matches, 1);
    assert_eq!(hosts.len(), 3);

    env::remove_var(HOST_CONTAINER_NAME_VAR);
}

#[test]
#[serial]
fn test_overlay_duplicate_host_does_not_grow_list() {
    env::set_var(HOST_CONTAINER_NAME_VAR, "localhost");

    let hosts = overlay_container_host(base_hosts());
    // Membership is unchanged; no duplicate entries appear
    assert_eq!(hosts.len(), base_hosts().len());
    assert_eq!(hosts.iter().filter(|h| *h == "localhost").count(), 1);

    env::remove_var(HOST_CONTAINER_NAME_VAR);
}

#[test]
#[serial]
fn test_overlay_empty_value_is_ignored() {
    env::set_var(HOST_CONTAINER_NAME_VAR, "");

    let hosts = overlay_container_host(base_hosts());
    assert_eq!(hosts, base_hosts());

    env::remove_var(HOST_CONTAINER_NAME_VAR);
}

#[test]
#[serial]
fn test_load_defaults_without_config_file() {
    env::remove_var(HOST_CONTAINER_NAME_VAR);
    env::remove_var(CONFIG_FILE_VAR);
    env::remove_var(DATABASE_VAR);

    // Point at a nonexistent file path: loader must fall back to defaults
    let missing = std::path::Path::new("/nonexistent/katsu/config.toml");
    let err = ServerConfig::load(Some(missing), None);
    // An explicitly named but unreadable file is a configuration error
    assert!(err.is_err());

    // With no explicit file and no env override, defaults apply
    let config = ServerConfig::load(None, None).unwrap();
    assert_eq!(config.port, 8008);
    assert!(config.allowed_hosts.contains(&"localhost".to_string()));
    assert!(config.allowed_hosts.contains(&"127.0.0.1".to_string()));
    assert!(!config.grants.is_empty());
}

#[test]
#[serial]
fn test_load_reads_toml_and_applies_overlay() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        r#"
host = "0.0.0.0"
port = 9123
allowed_hosts = ["katsu.example.org"]

[[tokens]]
token = "secret-token"
datasets = ["PROG-A"]
is_admin = true
"#,
    )
    .unwrap();

    env::set_var(HOST_CONTAINER_NAME_VAR, "container-7");
    env::remove_var(DATABASE_VAR);

    let config = ServerConfig::load(Some(&config_path), None).unwrap();
    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.port, 9123);
    assert!(config.allowed_hosts.contains(&"katsu.example.org".to_string()));
    assert!(config.allowed_hosts.contains(&"container-7".to_string()));

    let grant = config.grant_for_token("secret-token").unwrap();
    assert!(grant.is_admin);
    assert_eq!(grant.datasets, vec!["PROG-A".to_string()]);
    assert!(config.grant_for_token("unknown").is_none());

    env::remove_var(HOST_CONTAINER_NAME_VAR);
}

#[test]
#[serial]
fn test_database_path_env_override() {
    env::remove_var(CONFIG_FILE_VAR);
    env::set_var(DATABASE_VAR, "/tmp/katsu-test/override.db");

    let config = ServerConfig::load(None, None).unwrap();
    assert_eq!(
        config.database_path,
        std::path::PathBuf::from("/tmp/katsu-test/override.db")
    );

    env::remove_var(DATABASE_VAR);
}
