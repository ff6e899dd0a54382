use serde::Deserialize;

use std::{
    env, fs,
    path::{Path, PathBuf},
};

const CONFIG_PATH_ENV: &str = "NOTES_API_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    pub database_url: String,
    /// Connect over TLS without verifying the server certificate.
    #[serde(default)]
    pub database_ssl: bool,
    #[serde(default = "default_pool_size")]
    pub database_pool_size: usize,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Built frontend bundle served for non-API paths.
    #[serde(default)]
    pub client_dist: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },

    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("failed to parse {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    4000
}

const fn default_pool_size() -> usize {
    10
}

fn check_pool_size(size: usize) -> Result<usize, ConfigError> {
    if size == 0 {
        return Err(ConfigError::Invalid {
            name: "DATABASE_POOL_SIZE",
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(size)
}

fn parse_flag(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid {
            name,
            reason: format!("expected a boolean, got '{other}'"),
        }),
    }
}

/// `DATABASE_SSL` decides when set. Otherwise hosted-production markers turn TLS on:
/// `NODE_ENV=production`, `RENDER=true`, or any `PGSSLMODE` other than `disable`.
fn ssl_from_lookup<F>(lookup: &F) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup("DATABASE_SSL").filter(|raw| !raw.is_empty()) {
        return parse_flag("DATABASE_SSL", &raw);
    }

    let sslmode = lookup("PGSSLMODE").is_some_and(|mode| !mode.is_empty() && mode != "disable");
    let render = lookup("RENDER").as_deref() == Some("true");
    let production = lookup("NODE_ENV").as_deref() == Some("production");

    Ok(sslmode || render || production)
}

fn load_from_file(path: &Path) -> Result<Config, ConfigError> {
    let display = path.display().to_string();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: display.clone(),
        source,
    })?;
    let config: Config = serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: display,
        source,
    })?;
    check_pool_size(config.database_pool_size)?;
    Ok(config)
}

/// Builds the config from environment-style key lookups.
fn load_from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let database_url = lookup("DATABASE_URL")
        .or_else(|| lookup("PG_DSN"))
        .ok_or(ConfigError::Missing("DATABASE_URL"))?;

    let database_ssl = ssl_from_lookup(&lookup)?;

    let database_pool_size = match lookup("DATABASE_POOL_SIZE") {
        Some(raw) => check_pool_size(raw.parse::<usize>().map_err(|e| ConfigError::Invalid {
            name: "DATABASE_POOL_SIZE",
            reason: e.to_string(),
        })?)?,
        None => default_pool_size(),
    };

    let host = lookup("HOST").unwrap_or_else(default_host);

    let port = match lookup("PORT") {
        Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
            name: "PORT",
            reason: e.to_string(),
        })?,
        None => default_port(),
    };

    let client_dist = lookup("CLIENT_DIST")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from);

    Ok(Config {
        database_url,
        database_ssl,
        database_pool_size,
        host,
        port,
        client_dist,
    })
}

pub fn load_config() -> Result<Config, ConfigError> {
    let config_path =
        env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    if Path::new(&config_path).exists() {
        tracing::info!("Loading configuration from '{}'", config_path);
        return load_from_file(Path::new(&config_path));
    }

    tracing::info!(
        "Config file '{}' not found, loading configuration from environment variables",
        config_path
    );
    load_from_lookup(|key| env::var(key).ok())
}
