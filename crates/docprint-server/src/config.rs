//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{net::SocketAddr, path::PathBuf, str::FromStr};

use clap::{builder::BoolishValueParser, Args, Parser};
use config::{Config, Environment, File};
use docprint::CacheConfig;
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

const LOCAL_CONFIG_BASENAME: &str = "docprint";
const ENV_PREFIX: &str = "DOCPRINT";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_BODY_BYTES: u64 = 1024 * 1024;
const DEFAULT_STORAGE_PATH: &str = "docprint.db";

/// Storage path that selects the in-memory store.
pub const MEMORY_STORAGE_PATH: &str = ":memory:";

/// Command-line arguments for the docprint server.
#[derive(Debug, Parser)]
#[command(name = "docprint-server", version, about = "Content-addressed invoice rendering service")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "DOCPRINT_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Override the listener host.
    #[arg(long = "host", value_name = "HOST")]
    pub host: Option<String>,

    /// Override the listener port.
    #[arg(long = "port", value_name = "PORT")]
    pub port: Option<u16>,

    /// Override the maximum request body size in bytes.
    #[arg(long = "max-body-bytes", value_name = "BYTES")]
    pub max_body_bytes: Option<u64>,

    /// Override the SQLite database path (`:memory:` keeps artifacts in memory).
    #[arg(long = "storage-path", value_name = "PATH")]
    pub storage_path: Option<String>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(long = "log-json", value_name = "BOOL", value_parser = BoolishValueParser::new())]
    pub log_json: Option<bool>,

    /// Toggle request validation before rendering.
    #[arg(long = "cache-validate", value_name = "BOOL", value_parser = BoolishValueParser::new())]
    pub cache_validate: Option<bool>,

    /// Toggle coalescing of concurrent renders for the same request.
    #[arg(long = "cache-coalesce", value_name = "BOOL", value_parser = BoolishValueParser::new())]
    pub cache_coalesce: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub logging: LoggingSettings,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageSettings {
    Memory,
    Sqlite { path: PathBuf },
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder =
        Config::builder().add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    storage: RawStorageSettings,
    logging: RawLoggingSettings,
    cache: RawCacheSettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    max_body_bytes: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawStorageSettings {
    path: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    validate: Option<bool>,
    coalesce: Option<bool>,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.port {
            self.server.port = Some(port);
        }
        if let Some(limit) = overrides.max_body_bytes {
            self.server.max_body_bytes = Some(limit);
        }
        if let Some(path) = overrides.storage_path.as_ref() {
            self.storage.path = Some(path.clone());
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(validate) = overrides.cache_validate {
            self.cache.validate = Some(validate);
        }
        if let Some(coalesce) = overrides.cache_coalesce {
            self.cache.coalesce = Some(coalesce);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            storage,
            logging,
            cache,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            storage: build_storage_settings(storage)?,
            logging: build_logging_settings(logging)?,
            cache: build_cache_config(cache),
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.host", reason))?;

    let max_body_bytes = server.max_body_bytes.unwrap_or(DEFAULT_MAX_BODY_BYTES);
    if max_body_bytes == 0 {
        return Err(LoadError::invalid(
            "server.max_body_bytes",
            "must be greater than zero",
        ));
    }
    let max_body_bytes = usize::try_from(max_body_bytes).map_err(|_| {
        LoadError::invalid(
            "server.max_body_bytes",
            "value exceeds supported range for usize",
        )
    })?;

    Ok(ServerSettings {
        addr,
        max_body_bytes,
    })
}

fn build_storage_settings(storage: RawStorageSettings) -> Result<StorageSettings, LoadError> {
    let path = storage
        .path
        .unwrap_or_else(|| DEFAULT_STORAGE_PATH.to_string());

    match path.trim() {
        "" => Err(LoadError::invalid("storage.path", "path must not be empty")),
        MEMORY_STORAGE_PATH => Ok(StorageSettings::Memory),
        _ => Ok(StorageSettings::Sqlite {
            path: PathBuf::from(path),
        }),
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level.as_ref() {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_cache_config(cache: RawCacheSettings) -> CacheConfig {
    let defaults = CacheConfig::default();
    CacheConfig {
        validate_requests: cache.validate.unwrap_or(defaults.validate_requests),
        coalesce_in_flight: cache.coalesce.unwrap_or(defaults.coalesce_in_flight),
    }
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_applied() {
        let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

        assert_eq!(settings.server.addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(settings.server.max_body_bytes, 1024 * 1024);
        assert_eq!(
            settings.storage,
            StorageSettings::Sqlite {
                path: PathBuf::from("docprint.db")
            }
        );
        assert_eq!(settings.logging.level, LevelFilter::INFO);
        assert_eq!(settings.logging.format, LogFormat::Compact);
        assert!(settings.cache.validate_requests);
        assert!(settings.cache.coalesce_in_flight);
    }

    #[test]
    fn cli_overrides_take_highest_precedence() {
        let mut raw = RawSettings::default();
        raw.server.port = Some(4000);
        raw.logging.level = Some("info".to_string());

        let overrides = ServeOverrides {
            port: Some(4321),
            log_level: Some("debug".to_string()),
            cache_coalesce: Some(false),
            ..Default::default()
        };

        raw.apply_overrides(&overrides);
        let settings = Settings::from_raw(raw).expect("valid settings");

        assert_eq!(settings.server.addr.port(), 4321);
        assert_eq!(settings.logging.level, LevelFilter::DEBUG);
        assert!(!settings.cache.coalesce_in_flight);
        assert!(settings.cache.validate_requests);
    }

    #[test]
    fn memory_path_selects_memory_store() {
        let mut raw = RawSettings::default();
        raw.apply_overrides(&ServeOverrides {
            storage_path: Some(":memory:".to_string()),
            ..Default::default()
        });

        let settings = Settings::from_raw(raw).expect("valid settings");
        assert_eq!(settings.storage, StorageSettings::Memory);
    }

    #[test]
    fn cli_json_logging_enforces_format() {
        let mut raw = RawSettings::default();
        raw.apply_overrides(&ServeOverrides {
            log_json: Some(true),
            ..Default::default()
        });

        let settings = Settings::from_raw(raw).expect("valid settings");
        assert_eq!(settings.logging.format, LogFormat::Json);
    }

    #[test]
    fn zero_port_is_rejected() {
        let mut raw = RawSettings::default();
        raw.server.port = Some(0);

        let err = Settings::from_raw(raw).unwrap_err();
        assert!(matches!(err, LoadError::Invalid { key: "server.port", .. }));
    }

    #[test]
    fn zero_body_limit_is_rejected() {
        let mut raw = RawSettings::default();
        raw.server.max_body_bytes = Some(0);

        let err = Settings::from_raw(raw).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Invalid {
                key: "server.max_body_bytes",
                ..
            }
        ));
    }

    #[test]
    fn bad_log_level_is_rejected() {
        let mut raw = RawSettings::default();
        raw.logging.level = Some("chatty".to_string());

        let err = Settings::from_raw(raw).unwrap_err();
        assert!(matches!(err, LoadError::Invalid { key: "logging.level", .. }));
    }

    #[test]
    fn bad_host_is_rejected() {
        let mut raw = RawSettings::default();
        raw.server.host = Some("not a host".to_string());

        let err = Settings::from_raw(raw).unwrap_err();
        assert!(matches!(err, LoadError::Invalid { key: "server.host", .. }));
    }

    #[test]
    fn empty_storage_path_is_rejected() {
        let mut raw = RawSettings::default();
        raw.storage.path = Some("  ".to_string());

        let err = Settings::from_raw(raw).unwrap_err();
        assert!(matches!(err, LoadError::Invalid { key: "storage.path", .. }));
    }

    #[test]
    fn config_file_layer_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docprint.toml");
        let toml = "[server]\nport = 9090\n\n\
                    [storage]\npath = \":memory:\"\n\n\
                    [cache]\nvalidate = false\n";
        std::fs::write(&path, toml).unwrap();

        let cli = CliArgs {
            config_file: Some(path),
            overrides: ServeOverrides::default(),
        };
        let settings = load(&cli).expect("valid settings");

        assert_eq!(settings.server.addr.port(), 9090);
        assert_eq!(settings.storage, StorageSettings::Memory);
        assert!(!settings.cache.validate_requests);
    }

    #[test]
    fn cli_parses_flags() {
        let cli = CliArgs::parse_from([
            "docprint-server",
            "--port",
            "9000",
            "--log-json",
            "yes",
            "--storage-path",
            ":memory:",
        ]);

        assert_eq!(cli.overrides.port, Some(9000));
        assert_eq!(cli.overrides.log_json, Some(true));
        assert_eq!(cli.overrides.storage_path.as_deref(), Some(":memory:"));
    }
}
