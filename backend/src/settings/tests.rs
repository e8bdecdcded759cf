//! Unit tests for environment-driven settings.

use super::*;
use crate::middleware::AuthMode;
use mockable::MockEnv;
use rstest::rstest;
use std::collections::HashMap;

fn mock_env(vars: HashMap<String, String>) -> MockEnv {
    let mut env = MockEnv::new();
    env.expect_string()
        .times(0..)
        .returning(move |key| vars.get(key).cloned());
    env
}

fn env_with(pairs: &[(&str, &str)]) -> MockEnv {
    mock_env(
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect(),
    )
}

fn expect_error(result: Result<AppSettings, SettingsError>, label: &str) -> SettingsError {
    match result {
        Ok(_) => panic!("{label}"),
        Err(error) => error,
    }
}

#[rstest]
fn empty_environment_yields_defaults() {
    let settings = AppSettings::from_env(&mock_env(HashMap::new())).expect("defaults are valid");

    assert_eq!(
        settings.server.bind_addr,
        "0.0.0.0:8080".parse::<SocketAddr>().expect("valid address")
    );
    assert_eq!(settings.server.shutdown_timeout, Duration::from_secs(10));
    assert_eq!(settings.server.workers, None);
    assert_eq!(settings.server.max_body_bytes, 32 * 1024 * 1024);
    assert_eq!(settings.cors.allowed_origins(), ["http://localhost:5173"]);
    assert_eq!(
        settings.cors.allowed_methods(),
        ["GET", "POST", "PUT", "DELETE", "OPTIONS"]
    );
    assert_eq!(
        settings.cors.allowed_headers(),
        ["Content-Type", "Authorization"]
    );
    assert_eq!(settings.cors.max_age_secs(), 3600);
    assert!(!settings.auth.is_enabled());
    assert_eq!(settings.auth.public_paths(), ["/health"]);
    assert!(settings.database.is_none());
    assert_eq!(settings.logging.level, "info");
    assert_eq!(settings.logging.format, LogFormat::Text);
}

#[rstest]
fn explicit_values_override_defaults() {
    let env = env_with(&[
        (SERVER_HOST_ENV, "127.0.0.1"),
        (SERVER_PORT_ENV, "9090"),
        (SERVER_SHUTDOWN_TIMEOUT_ENV, "3"),
        (SERVER_WORKERS_ENV, "4"),
        (SERVER_MAX_BODY_BYTES_ENV, "1048576"),
        (CORS_MAX_AGE_ENV, "60"),
        (LOG_LEVEL_ENV, "debug"),
        (LOG_FORMAT_ENV, "JSON"),
    ]);

    let settings = AppSettings::from_env(&env).expect("valid settings");

    assert_eq!(
        settings.server.bind_addr,
        "127.0.0.1:9090".parse::<SocketAddr>().expect("valid address")
    );
    assert_eq!(settings.server.shutdown_timeout, Duration::from_secs(3));
    assert_eq!(settings.server.workers, Some(4));
    assert_eq!(settings.server.max_body_bytes, 1_048_576);
    assert_eq!(settings.cors.max_age_secs(), 60);
    assert_eq!(settings.logging.level, "debug");
    assert_eq!(settings.logging.format, LogFormat::Json);
}

#[rstest]
#[case("https://a.example, https://b.example", vec!["https://a.example", "https://b.example"])]
#[case(" https://a.example ,, ", vec!["https://a.example"])]
#[case(" , ,", vec!["http://localhost:5173"])]
#[case("", vec!["http://localhost:5173"])]
fn origin_lists_are_trimmed_and_fall_back(#[case] raw: &str, #[case] expected: Vec<&str>) {
    let settings = AppSettings::from_env(&env_with(&[(CORS_ALLOWED_ORIGINS_ENV, raw)]))
        .expect("valid settings");
    assert_eq!(settings.cors.allowed_origins(), expected.as_slice());
}

#[rstest]
fn public_paths_are_configurable() {
    let settings =
        AppSettings::from_env(&env_with(&[(AUTH_PUBLIC_PATHS_ENV, "/health, /auth/validate")]))
            .expect("valid settings");
    assert_eq!(settings.auth.public_paths(), ["/health", "/auth/validate"]);
}

#[rstest]
#[case("1")]
#[case("true")]
#[case("YES")]
#[case("y")]
fn auth_enabled_with_key(#[case] flag: &str) {
    let env = env_with(&[(AUTH_ENABLED_ENV, flag), (AUTH_ACCESS_KEY_ENV, "s3cret")]);
    let settings = AppSettings::from_env(&env).expect("valid settings");

    match settings.auth.mode() {
        AuthMode::Enabled(key) => assert!(key.verify("s3cret")),
        AuthMode::Disabled => panic!("expected auth to be enabled"),
    }
}

#[rstest]
fn enabled_auth_without_key_is_rejected() {
    let err = expect_error(
        AppSettings::from_env(&env_with(&[(AUTH_ENABLED_ENV, "true")])),
        "expected missing access key to fail",
    );
    assert_eq!(
        err,
        SettingsError::MissingEnv {
            name: AUTH_ACCESS_KEY_ENV
        }
    );
}

#[rstest]
fn enabled_auth_with_blank_key_is_rejected() {
    let env = env_with(&[(AUTH_ENABLED_ENV, "1"), (AUTH_ACCESS_KEY_ENV, "   ")]);
    let err = expect_error(AppSettings::from_env(&env), "expected blank key to fail");
    assert_eq!(err, SettingsError::AccessKey(AccessKeyError::Empty));
}

#[rstest]
fn disabled_auth_ignores_the_key() {
    let env = env_with(&[(AUTH_ENABLED_ENV, "no"), (AUTH_ACCESS_KEY_ENV, "")]);
    let settings = AppSettings::from_env(&env).expect("valid settings");
    assert!(!settings.auth.is_enabled());
}

#[rstest]
#[case(AUTH_ENABLED_ENV, "maybe", BOOL_EXPECTED)]
#[case(SERVER_PORT_ENV, "eighty", UINT_EXPECTED)]
#[case(SERVER_PORT_ENV, "70000", UINT_EXPECTED)]
#[case(SERVER_HOST_ENV, "localhost", HOST_EXPECTED)]
#[case(SERVER_WORKERS_ENV, "0", POSITIVE_EXPECTED)]
#[case(SERVER_MAX_BODY_BYTES_ENV, "0", POSITIVE_EXPECTED)]
#[case(SERVER_MAX_BODY_BYTES_ENV, "lots", POSITIVE_EXPECTED)]
#[case(CORS_MAX_AGE_ENV, "-1", UINT_EXPECTED)]
#[case(LOG_FORMAT_ENV, "xml", LOG_FORMAT_EXPECTED)]
fn invalid_values_name_the_key(
    #[case] name: &'static str,
    #[case] value: &str,
    #[case] expected: &'static str,
) {
    let err = expect_error(
        AppSettings::from_env(&env_with(&[(name, value)])),
        "expected invalid value to fail",
    );
    assert_eq!(
        err,
        SettingsError::InvalidEnv {
            name,
            value: value.to_owned(),
            expected,
        }
    );
    assert!(err.to_string().contains(name));
}

#[rstest]
fn blank_values_count_as_unset() {
    let env = env_with(&[(SERVER_PORT_ENV, "  "), (DATABASE_URL_ENV, "")]);
    let settings = AppSettings::from_env(&env).expect("valid settings");
    assert_eq!(settings.server.bind_addr.port(), 8080);
    assert!(settings.database.is_none());
}

#[rstest]
fn database_url_selects_postgres_with_defaults() {
    let env = env_with(&[(DATABASE_URL_ENV, "postgres://app:pw@db/drawings")]);
    let database = AppSettings::from_env(&env)
        .expect("valid settings")
        .database
        .expect("database configured");

    assert_eq!(database.pool.database_url(), "postgres://app:pw@db/drawings");
    assert_eq!(database.pool.max_size(), 10);
    assert_eq!(database.pool.min_idle(), Some(2));
    assert_eq!(database.pool.connection_timeout(), Duration::from_secs(30));
    assert!(database.run_migrations);
    assert!(!format!("{database:?}").contains("pw@"));
}

#[rstest]
fn database_overrides_apply_and_min_idle_is_capped() {
    let env = env_with(&[
        (DATABASE_URL_ENV, "postgres://db/drawings"),
        (DATABASE_MAX_CONNECTIONS_ENV, "3"),
        (DATABASE_MIN_IDLE_ENV, "8"),
        (DATABASE_CONNECT_TIMEOUT_ENV, "5"),
        (DATABASE_RUN_MIGRATIONS_ENV, "false"),
    ]);
    let database = AppSettings::from_env(&env)
        .expect("valid settings")
        .database
        .expect("database configured");

    assert_eq!(database.pool.max_size(), 3);
    assert_eq!(database.pool.min_idle(), Some(3));
    assert_eq!(database.pool.connection_timeout(), Duration::from_secs(5));
    assert!(!database.run_migrations);
}

#[rstest]
fn zero_max_connections_is_rejected() {
    let env = env_with(&[
        (DATABASE_URL_ENV, "postgres://db/drawings"),
        (DATABASE_MAX_CONNECTIONS_ENV, "0"),
    ]);
    let err = expect_error(AppSettings::from_env(&env), "expected zero pool size to fail");
    assert!(matches!(
        err,
        SettingsError::InvalidEnv {
            name: DATABASE_MAX_CONNECTIONS_ENV,
            ..
        }
    ));
}

#[rstest]
fn database_settings_are_ignored_without_a_url() {
    let env = env_with(&[(DATABASE_MAX_CONNECTIONS_ENV, "not-a-number")]);
    assert!(AppSettings::from_env(&env).expect("valid settings").database.is_none());
}
