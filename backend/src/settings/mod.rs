//! Environment-driven application settings.
//!
//! Every key is read through [`mockable::Env`] so parsing can be tested
//! without touching the process environment. Unset and blank values fall back
//! to defaults; values that are present but malformed are reported rather than
//! silently replaced.

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use mockable::Env;

use crate::domain::{AccessKey, AccessKeyError};
use crate::inbound::http::drawings::DEFAULT_MAX_BODY_BYTES;
use crate::middleware::{AuthConfig, CorsConfig};
use crate::middleware::auth::DEFAULT_PUBLIC_PATHS;
use crate::middleware::cors::{
    DEFAULT_ALLOWED_HEADERS, DEFAULT_ALLOWED_METHODS, DEFAULT_ALLOWED_ORIGINS,
    DEFAULT_MAX_AGE_SECS,
};
use crate::outbound::persistence::PoolConfig;

const SERVER_HOST_ENV: &str = "SERVER_HOST";
const SERVER_PORT_ENV: &str = "SERVER_PORT";
const SERVER_SHUTDOWN_TIMEOUT_ENV: &str = "SERVER_SHUTDOWN_TIMEOUT";
const SERVER_WORKERS_ENV: &str = "SERVER_WORKERS";
const SERVER_MAX_BODY_BYTES_ENV: &str = "SERVER_MAX_BODY_BYTES";
const CORS_ALLOWED_ORIGINS_ENV: &str = "CORS_ALLOWED_ORIGINS";
const CORS_ALLOWED_METHODS_ENV: &str = "CORS_ALLOWED_METHODS";
const CORS_ALLOWED_HEADERS_ENV: &str = "CORS_ALLOWED_HEADERS";
const CORS_MAX_AGE_ENV: &str = "CORS_MAX_AGE";
const AUTH_ENABLED_ENV: &str = "AUTH_ENABLED";
const AUTH_ACCESS_KEY_ENV: &str = "AUTH_ACCESS_KEY";
const AUTH_PUBLIC_PATHS_ENV: &str = "AUTH_PUBLIC_PATHS";
const DATABASE_URL_ENV: &str = "DATABASE_URL";
const DATABASE_MAX_CONNECTIONS_ENV: &str = "DATABASE_MAX_CONNECTIONS";
const DATABASE_MIN_IDLE_ENV: &str = "DATABASE_MIN_IDLE";
const DATABASE_CONNECT_TIMEOUT_ENV: &str = "DATABASE_CONNECT_TIMEOUT";
const DATABASE_RUN_MIGRATIONS_ENV: &str = "DATABASE_RUN_MIGRATIONS";
const LOG_LEVEL_ENV: &str = "LOG_LEVEL";
const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const UINT_EXPECTED: &str = "a non-negative integer";
const POSITIVE_EXPECTED: &str = "a positive integer";
const HOST_EXPECTED: &str = "an IP address";
const LOG_FORMAT_EXPECTED: &str = "text|json";

const DEFAULT_HOST: IpAddr = IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED);
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MIN_IDLE: u32 = 2;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Errors raised while reading settings.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SettingsError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// The configured access key was rejected.
    #[error("invalid {AUTH_ACCESS_KEY_ENV}: {0}")]
    AccessKey(#[from] AccessKeyError),
}

/// Listener settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub bind_addr: SocketAddr,
    /// Grace period for in-flight requests after a stop signal.
    pub shutdown_timeout: Duration,
    /// Worker count; `None` uses the actix default of one per core.
    pub workers: Option<usize>,
    /// Largest JSON request body accepted, in bytes.
    pub max_body_bytes: usize,
}

/// Output encoding for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(()),
        }
    }
}

/// Logging settings consumed by the binary when installing the subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    pub format: LogFormat,
}

/// PostgreSQL connection settings. `Debug` redacts the password.
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub pool: PoolConfig,
    pub run_migrations: bool,
}

/// Complete, immutable application configuration.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub server: ServerSettings,
    pub cors: CorsConfig,
    pub auth: AuthConfig,
    /// `None` selects the in-memory repository.
    pub database: Option<DatabaseSettings>,
    pub logging: LoggingSettings,
}

impl AppSettings {
    /// Read every setting from `env`.
    ///
    /// # Errors
    /// Returns the first [`SettingsError`] encountered.
    ///
    /// # Examples
    /// ```
    /// use drawings::settings::AppSettings;
    /// use mockable::MockEnv;
    ///
    /// let mut env = MockEnv::new();
    /// env.expect_string().returning(|name| match name {
    ///     "SERVER_PORT" => Some("9000".to_owned()),
    ///     _ => None,
    /// });
    ///
    /// let settings = AppSettings::from_env(&env).expect("valid settings");
    /// assert_eq!(settings.server.bind_addr.port(), 9000);
    /// assert!(settings.database.is_none());
    /// ```
    pub fn from_env<E: Env>(env: &E) -> Result<Self, SettingsError> {
        Ok(Self {
            server: server_from_env(env)?,
            cors: cors_from_env(env)?,
            auth: auth_from_env(env)?,
            database: database_from_env(env)?,
            logging: logging_from_env(env)?,
        })
    }
}

/// Non-blank value of `name`, trimmed.
fn read<E: Env>(env: &E, name: &'static str) -> Option<String> {
    env.string(name)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

fn read_bool<E: Env>(env: &E, name: &'static str, default: bool) -> Result<bool, SettingsError> {
    read(env, name).map_or(Ok(default), |value| {
        parse_bool(&value).ok_or(SettingsError::InvalidEnv {
            name,
            value,
            expected: BOOL_EXPECTED,
        })
    })
}

fn read_parsed<E, T>(
    env: &E,
    name: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, SettingsError>
where
    E: Env,
    T: FromStr,
{
    read(env, name).map_or(Ok(default), |value| {
        value.parse().map_err(|_| SettingsError::InvalidEnv {
            name,
            value,
            expected,
        })
    })
}

/// Comma separated list; entries are trimmed, blanks dropped, and an empty
/// result falls back to `default`.
fn read_list<E: Env>(env: &E, name: &'static str, default: &[&str]) -> Vec<String> {
    let parsed: Vec<String> = read(env, name)
        .map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default();
    if parsed.is_empty() {
        default.iter().map(|entry| (*entry).to_owned()).collect()
    } else {
        parsed
    }
}

fn server_from_env<E: Env>(env: &E) -> Result<ServerSettings, SettingsError> {
    let host: IpAddr = read_parsed(env, SERVER_HOST_ENV, DEFAULT_HOST, HOST_EXPECTED)?;
    let port: u16 = read_parsed(env, SERVER_PORT_ENV, DEFAULT_PORT, UINT_EXPECTED)?;
    let shutdown_secs: u64 = read_parsed(
        env,
        SERVER_SHUTDOWN_TIMEOUT_ENV,
        DEFAULT_SHUTDOWN_TIMEOUT_SECS,
        UINT_EXPECTED,
    )?;
    let workers = match read(env, SERVER_WORKERS_ENV) {
        None => None,
        Some(value) => match value.parse::<usize>() {
            Ok(count) if count > 0 => Some(count),
            _ => {
                return Err(SettingsError::InvalidEnv {
                    name: SERVER_WORKERS_ENV,
                    value,
                    expected: POSITIVE_EXPECTED,
                });
            }
        },
    };

    let max_body_bytes: usize = read_parsed(
        env,
        SERVER_MAX_BODY_BYTES_ENV,
        DEFAULT_MAX_BODY_BYTES,
        POSITIVE_EXPECTED,
    )?;
    if max_body_bytes == 0 {
        return Err(SettingsError::InvalidEnv {
            name: SERVER_MAX_BODY_BYTES_ENV,
            value: max_body_bytes.to_string(),
            expected: POSITIVE_EXPECTED,
        });
    }

    Ok(ServerSettings {
        bind_addr: SocketAddr::new(host, port),
        shutdown_timeout: Duration::from_secs(shutdown_secs),
        workers,
        max_body_bytes,
    })
}

fn cors_from_env<E: Env>(env: &E) -> Result<CorsConfig, SettingsError> {
    let max_age: u32 = read_parsed(env, CORS_MAX_AGE_ENV, DEFAULT_MAX_AGE_SECS, UINT_EXPECTED)?;
    Ok(CorsConfig::default()
        .with_allowed_origins(read_list(env, CORS_ALLOWED_ORIGINS_ENV, DEFAULT_ALLOWED_ORIGINS))
        .with_allowed_methods(read_list(env, CORS_ALLOWED_METHODS_ENV, DEFAULT_ALLOWED_METHODS))
        .with_allowed_headers(read_list(env, CORS_ALLOWED_HEADERS_ENV, DEFAULT_ALLOWED_HEADERS))
        .with_max_age_secs(max_age))
}

fn auth_from_env<E: Env>(env: &E) -> Result<AuthConfig, SettingsError> {
    let config = if read_bool(env, AUTH_ENABLED_ENV, false)? {
        let secret = env
            .string(AUTH_ACCESS_KEY_ENV)
            .ok_or(SettingsError::MissingEnv {
                name: AUTH_ACCESS_KEY_ENV,
            })?;
        AuthConfig::enabled(AccessKey::new(secret)?)
    } else {
        AuthConfig::disabled()
    };
    Ok(config.with_public_paths(read_list(env, AUTH_PUBLIC_PATHS_ENV, DEFAULT_PUBLIC_PATHS)))
}

fn database_from_env<E: Env>(env: &E) -> Result<Option<DatabaseSettings>, SettingsError> {
    let Some(url) = read(env, DATABASE_URL_ENV) else {
        return Ok(None);
    };
    let max_size = read_parsed(
        env,
        DATABASE_MAX_CONNECTIONS_ENV,
        DEFAULT_MAX_CONNECTIONS,
        POSITIVE_EXPECTED,
    )?;
    if max_size == 0 {
        return Err(SettingsError::InvalidEnv {
            name: DATABASE_MAX_CONNECTIONS_ENV,
            value: max_size.to_string(),
            expected: POSITIVE_EXPECTED,
        });
    }
    let min_idle: u32 = read_parsed(env, DATABASE_MIN_IDLE_ENV, DEFAULT_MIN_IDLE, UINT_EXPECTED)?;
    let timeout_secs: u64 = read_parsed(
        env,
        DATABASE_CONNECT_TIMEOUT_ENV,
        DEFAULT_CONNECT_TIMEOUT_SECS,
        UINT_EXPECTED,
    )?;
    let run_migrations = read_bool(env, DATABASE_RUN_MIGRATIONS_ENV, true)?;

    Ok(Some(DatabaseSettings {
        pool: PoolConfig::new(url)
            .with_max_size(max_size)
            .with_min_idle(Some(min_idle.min(max_size)))
            .with_connection_timeout(Duration::from_secs(timeout_secs)),
        run_migrations,
    }))
}

fn logging_from_env<E: Env>(env: &E) -> Result<LoggingSettings, SettingsError> {
    let level = read(env, LOG_LEVEL_ENV).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_owned());
    let format = read_parsed(env, LOG_FORMAT_ENV, LogFormat::Text, LOG_FORMAT_EXPECTED)?;
    Ok(LoggingSettings { level, format })
}

#[cfg(test)]
mod tests;
