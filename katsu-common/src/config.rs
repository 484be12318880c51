//! Configuration loading and resolution
//!
//! One immutable [`ServerConfig`] is built at process start from, in
//! priority order: command-line overrides, environment variables, a TOML
//! config file, and compiled defaults. Nothing mutates it afterwards.

use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::schema::{ExtensionSchema, SchemaType};
use crate::{Error, Result};

/// Environment variable holding the container host name to allow (optional)
pub const HOST_CONTAINER_NAME_VAR: &str = "HOST_CONTAINER_NAME";
/// Environment variable overriding the config file path
pub const CONFIG_FILE_VAR: &str = "KATSU_CONFIG";
/// Environment variable overriding the database path
pub const DATABASE_VAR: &str = "KATSU_DATABASE";

/// Hosts always accepted, before any file or environment overlay
const BASE_ALLOWED_HOSTS: &[&str] = &["localhost", "127.0.0.1"];

/// A bearer token grant: which programs the token may read, and whether it
/// may write
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub token: String,
    pub datasets: Vec<String>,
    #[serde(default)]
    pub is_admin: bool,
}

/// On-disk TOML shape; every field optional so partial files work
#[derive(Debug, Default, Deserialize)]
struct TomlConfig {
    host: Option<String>,
    port: Option<u16>,
    database_path: Option<PathBuf>,
    #[serde(default)]
    allowed_hosts: Vec<String>,
    #[serde(default)]
    tokens: Vec<TokenGrant>,
    #[serde(default)]
    extension_schemas: Vec<TomlExtensionSchema>,
}

/// Extension schema reference in the TOML file: the schema body itself lives
/// in a JSON file next to the config
#[derive(Debug, Deserialize)]
struct TomlExtensionSchema {
    schema_type: SchemaType,
    #[serde(default)]
    required: bool,
    json_schema_file: PathBuf,
}

/// Immutable server configuration, built once at startup
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address for the HTTP listener
    pub host: String,
    pub port: u16,
    /// SQLite database location
    pub database_path: PathBuf,
    /// Host names the server accepts requests for
    pub allowed_hosts: Vec<String>,
    /// Bearer token grants
    pub grants: Vec<TokenGrant>,
    /// Extension schemas for extra_properties validation
    pub extension_schemas: Vec<ExtensionSchema>,
}

impl ServerConfig {
    /// Load configuration with optional command-line overrides.
    ///
    /// A missing config file is not fatal: defaults are used and a warning
    /// is logged, so a fresh checkout starts without any setup.
    pub fn load(config_file: Option<&Path>, database_override: Option<&Path>) -> Result<Self> {
        let toml_config = match resolve_config_file(config_file) {
            Some(path) => read_toml_config(&path)?,
            None => {
                warn!("No config file found, using compiled defaults");
                TomlConfig::default()
            }
        };

        let database_path = resolve_database_path(database_override, &toml_config);

        let mut allowed_hosts: Vec<String> = BASE_ALLOWED_HOSTS
            .iter()
            .map(|h| h.to_string())
            .collect();
        allowed_hosts.extend(toml_config.allowed_hosts.iter().cloned());
        let allowed_hosts = overlay_container_host(allowed_hosts);

        let grants = if toml_config.tokens.is_empty() {
            default_grants()
        } else {
            toml_config.tokens
        };

        let extension_schemas = load_extension_schemas(&toml_config.extension_schemas)?;

        Ok(ServerConfig {
            host: toml_config.host.unwrap_or_else(|| "127.0.0.1".to_string()),
            port: toml_config.port.unwrap_or(8008),
            database_path,
            allowed_hosts,
            grants,
            extension_schemas,
        })
    }

    /// Look up the grant for a presented bearer token
    pub fn grant_for_token(&self, token: &str) -> Option<&TokenGrant> {
        self.grants.iter().find(|g| g.token == token)
    }
}

/// Append the container host name from the environment, then collapse
/// duplicates.
///
/// First occurrence wins, but callers must not rely on ordering of the
/// resulting list; membership is the contract.
pub fn overlay_container_host(mut hosts: Vec<String>) -> Vec<String> {
    if let Ok(name) = env::var(HOST_CONTAINER_NAME_VAR) {
        if !name.is_empty() {
            hosts.push(name);
        }
    }

    let mut seen = HashSet::new();
    hosts.retain(|h| seen.insert(h.clone()));
    hosts
}

/// Config file resolution: explicit path, then environment, then the
/// platform config directory, then /etc on unix
fn resolve_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = env::var(CONFIG_FILE_VAR) {
        return Some(PathBuf::from(path));
    }

    if let Some(user_config) = dirs::config_dir().map(|d| d.join("katsu").join("config.toml")) {
        if user_config.exists() {
            return Some(user_config);
        }
    }

    let system_config = PathBuf::from("/etc/katsu/config.toml");
    if system_config.exists() {
        return Some(system_config);
    }

    None
}

fn read_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("cannot parse {}: {}", path.display(), e)))
}

/// Database path priority: CLI argument, environment variable, config file,
/// OS data directory default
fn resolve_database_path(explicit: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }

    if let Ok(path) = env::var(DATABASE_VAR) {
        return PathBuf::from(path);
    }

    if let Some(path) = &toml_config.database_path {
        return path.clone();
    }

    dirs::data_local_dir()
        .map(|d| d.join("katsu").join("katsu.db"))
        .unwrap_or_else(|| PathBuf::from("./katsu_data/katsu.db"))
}

/// Development grants used when the config file defines none.
///
/// token_1 may write and sees SYNTHETIC-1; token_2 is read-only across both
/// synthetic programs. Deployments define real tokens in the config file.
fn default_grants() -> Vec<TokenGrant> {
    vec![
        TokenGrant {
            token: "token_1".to_string(),
            datasets: vec!["SYNTHETIC-1".to_string()],
            is_admin: true,
        },
        TokenGrant {
            token: "token_2".to_string(),
            datasets: vec!["SYNTHETIC-1".to_string(), "SYNTHETIC-2".to_string()],
            is_admin: false,
        },
    ]
}

fn load_extension_schemas(entries: &[TomlExtensionSchema]) -> Result<Vec<ExtensionSchema>> {
    let mut schemas = Vec::with_capacity(entries.len());
    for entry in entries {
        let content = std::fs::read_to_string(&entry.json_schema_file).map_err(|e| {
            Error::Config(format!(
                "cannot read schema file {}: {}",
                entry.json_schema_file.display(),
                e
            ))
        })?;
        let json_schema = serde_json::from_str(&content).map_err(|e| {
            Error::Config(format!(
                "cannot parse schema file {}: {}",
                entry.json_schema_file.display(),
                e
            ))
        })?;
        schemas.push(ExtensionSchema {
            json_schema,
            required: entry.required,
            schema_type: entry.schema_type,
        });
    }
    Ok(schemas)
}
