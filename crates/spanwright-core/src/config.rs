//! Environment-derived configuration with an emulator-only guard.
//!
//! A [`Config`] is built once at process start (from the process
//! environment, optionally seeded by a `.env` file) and validated before
//! anything touches a database. Validation stops at the first problem so
//! the caller gets one actionable message.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ConfigError, ConfigResult, ValidationError};
use crate::identifier::{validate_database_id, validate_instance_id, validate_project_id};
use crate::path::{build_secure_dsn, validate_schema_path};

pub const ENV_PROJECT_ID: &str = "PROJECT_ID";
pub const ENV_INSTANCE_ID: &str = "INSTANCE_ID";
pub const ENV_EMULATOR_HOST: &str = "SPANNER_EMULATOR_HOST";
pub const ENV_PRIMARY_DATABASE_ID: &str = "PRIMARY_DATABASE_ID";
pub const ENV_SECONDARY_DATABASE_ID: &str = "SECONDARY_DATABASE_ID";
pub const ENV_PRIMARY_SCHEMA_PATH: &str = "PRIMARY_SCHEMA_PATH";
pub const ENV_SECONDARY_SCHEMA_PATH: &str = "SECONDARY_SCHEMA_PATH";
pub const ENV_ENVIRONMENT: &str = "ENVIRONMENT";
pub const ENV_TIMEOUT_SECONDS: &str = "TIMEOUT_SECONDS";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
pub const MAX_TIMEOUT_SECS: u64 = 3600;

/// Substrings that mark a project or instance ID as production-like.
///
/// `stage` and `staging` are listed even though `staging` is an accepted
/// [`Environment`]; a staging run therefore needs neutral resource IDs.
pub const PRODUCTION_PATTERNS: &[&str] = &[
    "prod",
    "production",
    "live",
    "main",
    "master",
    "real",
    "actual",
    "staging",
    "stage",
];

const LOCAL_HOSTS: &[&str] = &["localhost", "127.0.0.1"];

/// Deployment environment the tooling runs in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Test,
    Staging,
}

impl Environment {
    /// Parse an environment name (case-insensitive).
    ///
    /// Production-like names are refused outright rather than reported as
    /// merely unknown.
    pub fn parse(value: &str) -> ConfigResult<Self> {
        match value.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "test" | "testing" => Ok(Environment::Test),
            "staging" => Ok(Environment::Staging),
            "production" | "prod" | "live" => {
                Err(ConfigError::ProductionEnvironment(value.to_string()))
            }
            _ => Err(ConfigError::InvalidEnvironment(value.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Test => "test",
            Environment::Staging => "staging",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated tooling configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub project_id: String,
    pub instance_id: String,
    /// Spanner emulator address, e.g. `localhost:9010`.
    pub emulator_host: String,
    pub primary_db: String,
    pub secondary_db: Option<String>,
    pub primary_schema: PathBuf,
    pub secondary_schema: Option<PathBuf>,
    pub environment: Environment,
    pub timeout: Duration,
}

/// The `(project, instance, database)` triple for one logical database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub project_id: String,
    pub instance_id: String,
    pub database_id: String,
}

impl DatabaseConfig {
    /// Canonical `projects/…/instances/…/databases/…` path.
    pub fn resource_path(&self) -> Result<String, ValidationError> {
        build_secure_dsn(&self.project_id, &self.instance_id, &self.database_id)
    }
}

impl Config {
    /// Build a config from an arbitrary key/value source, applying defaults.
    ///
    /// Empty values are treated as unset. The result is not validated.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = match get(ENV_ENVIRONMENT) {
            Some(raw) => Environment::parse(&raw)?,
            None => Environment::default(),
        };

        let timeout = match get(ENV_TIMEOUT_SECONDS) {
            Some(raw) => parse_timeout(&raw)?,
            None => DEFAULT_TIMEOUT,
        };

        Ok(Config {
            project_id: get(ENV_PROJECT_ID).unwrap_or_default(),
            instance_id: get(ENV_INSTANCE_ID).unwrap_or_default(),
            emulator_host: get(ENV_EMULATOR_HOST).unwrap_or_default(),
            primary_db: get(ENV_PRIMARY_DATABASE_ID).unwrap_or_default(),
            secondary_db: get(ENV_SECONDARY_DATABASE_ID),
            primary_schema: get(ENV_PRIMARY_SCHEMA_PATH)
                .map(PathBuf::from)
                .unwrap_or_default(),
            secondary_schema: get(ENV_SECONDARY_SCHEMA_PATH).map(PathBuf::from),
            environment,
            timeout,
        })
    }

    /// Build a config from the process environment, loading `.env` first.
    ///
    /// Variables already set in the process take precedence over `.env`.
    pub fn from_env() -> ConfigResult<Self> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "loaded .env file"),
            Err(e) if e.not_found() => debug!("no .env file found"),
            Err(e) => return Err(e.into()),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Check the config against identifier rules and the emulator-only policy.
    ///
    /// Returns the first failure only.
    pub fn validate(&self) -> ConfigResult<()> {
        let required = [
            (ENV_PROJECT_ID, self.project_id.is_empty()),
            (ENV_INSTANCE_ID, self.instance_id.is_empty()),
            (ENV_PRIMARY_DATABASE_ID, self.primary_db.is_empty()),
            (
                ENV_PRIMARY_SCHEMA_PATH,
                self.primary_schema.as_os_str().is_empty(),
            ),
        ];
        if let Some((field, _)) = required.iter().find(|(_, missing)| *missing) {
            return Err(ConfigError::MissingField(*field));
        }

        validate_project_id(&self.project_id).map_err(identifier_error(ENV_PROJECT_ID))?;
        validate_instance_id(&self.instance_id).map_err(identifier_error(ENV_INSTANCE_ID))?;
        validate_database_id(&self.primary_db)
            .map_err(identifier_error(ENV_PRIMARY_DATABASE_ID))?;
        if let Some(db) = &self.secondary_db {
            validate_database_id(db).map_err(identifier_error(ENV_SECONDARY_DATABASE_ID))?;
        }

        validate_schema_path(&self.primary_schema)
            .map_err(schema_path_error(ENV_PRIMARY_SCHEMA_PATH))?;
        if let Some(path) = &self.secondary_schema {
            validate_schema_path(path).map_err(schema_path_error(ENV_SECONDARY_SCHEMA_PATH))?;
        }

        if !is_local_host(&self.emulator_host) {
            return Err(ConfigError::ProductionHostRejected(
                self.emulator_host.clone(),
            ));
        }

        for (field, value) in [
            (ENV_PROJECT_ID, &self.project_id),
            (ENV_INSTANCE_ID, &self.instance_id),
        ] {
            if let Some(pattern) = production_pattern(value) {
                return Err(ConfigError::ProductionLikeIdentifier {
                    field,
                    value: value.clone(),
                    pattern,
                });
            }
        }

        let secs = self.timeout.as_secs();
        if secs == 0 || secs > MAX_TIMEOUT_SECS || self.timeout.subsec_nanos() != 0 {
            return Err(ConfigError::InvalidTimeout(format!("{:?}", self.timeout)));
        }

        Ok(())
    }

    /// Database triple for an arbitrary database ID in this project/instance.
    pub fn database_config(&self, database_id: &str) -> DatabaseConfig {
        DatabaseConfig {
            project_id: self.project_id.clone(),
            instance_id: self.instance_id.clone(),
            database_id: database_id.to_string(),
        }
    }

    pub fn primary_database(&self) -> DatabaseConfig {
        self.database_config(&self.primary_db)
    }

    pub fn secondary_database(&self) -> Option<DatabaseConfig> {
        self.secondary_db.as_deref().map(|db| self.database_config(db))
    }

    /// One-line description, safe to log.
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "project={} instance={} emulator={} primary={}",
            self.project_id, self.instance_id, self.emulator_host, self.primary_db
        );
        if let Some(db) = &self.secondary_db {
            summary.push_str(" secondary=");
            summary.push_str(db);
        }
        summary.push_str(&format!(
            " environment={} timeout={}s",
            self.environment,
            self.timeout.as_secs()
        ));
        summary
    }
}

/// Load and validate configuration from the environment.
pub fn load_config() -> ConfigResult<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    info!(
        project = %config.project_id,
        instance = %config.instance_id,
        environment = %config.environment,
        "configuration loaded"
    );
    Ok(config)
}

/// Load configuration and check that every configured database yields a
/// well-formed resource path.
pub fn load_secure_config() -> ConfigResult<Config> {
    let config = load_config()?;
    config
        .primary_database()
        .resource_path()
        .map_err(identifier_error(ENV_PRIMARY_DATABASE_ID))?;
    if let Some(db) = config.secondary_database() {
        db.resource_path()
            .map_err(identifier_error(ENV_SECONDARY_DATABASE_ID))?;
    }
    Ok(config)
}

fn identifier_error(field: &'static str) -> impl Fn(ValidationError) -> ConfigError {
    move |source| ConfigError::InvalidIdentifier { field, source }
}

fn schema_path_error(field: &'static str) -> impl Fn(ValidationError) -> ConfigError {
    move |source| ConfigError::InvalidSchemaPath { field, source }
}

fn parse_timeout(raw: &str) -> ConfigResult<Duration> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidTimeout(raw.to_string()))?;
    if secs == 0 || secs > MAX_TIMEOUT_SECS {
        return Err(ConfigError::InvalidTimeout(raw.to_string()));
    }
    Ok(Duration::from_secs(secs))
}

/// Whether an emulator address points at the local machine.
///
/// Accepts an optional `http://` scheme and `:port` suffix.
pub fn is_local_host(address: &str) -> bool {
    let address = address.trim();
    let address = address
        .strip_prefix("http://")
        .or_else(|| address.strip_prefix("https://"))
        .unwrap_or(address);
    let host = address.split([':', '/']).next().unwrap_or_default();
    LOCAL_HOSTS.iter().any(|local| host.eq_ignore_ascii_case(local))
}

fn production_pattern(value: &str) -> Option<&'static str> {
    let lower = value.to_lowercase();
    PRODUCTION_PATTERNS
        .iter()
        .copied()
        .find(|pattern| lower.contains(pattern))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn valid_config() -> Config {
        Config {
            project_id: "test-project".to_string(),
            instance_id: "test-instance".to_string(),
            emulator_host: "localhost:9010".to_string(),
            primary_db: "primary-db".to_string(),
            secondary_db: Some("secondary-db".to_string()),
            primary_schema: PathBuf::from("src"),
            secondary_schema: None,
            environment: Environment::Test,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn valid_config_passes() {
        valid_config().validate().unwrap();
    }

    #[test]
    fn local_emulator_hosts_accepted() {
        for host in ["localhost:9010", "127.0.0.1:9010", "http://localhost:9020", "LOCALHOST"] {
            let config = Config {
                emulator_host: host.to_string(),
                ..valid_config()
            };
            assert!(config.validate().is_ok(), "{host} should be accepted");
        }
    }

    #[test]
    fn remote_emulator_hosts_rejected() {
        for host in [
            "spanner.googleapis.com",
            "spanner.googleapis.com:443",
            "10.0.0.5:9010",
            "localhost.evil.com:9010",
            "",
        ] {
            let config = Config {
                emulator_host: host.to_string(),
                ..valid_config()
            };
            assert!(
                matches!(config.validate(), Err(ConfigError::ProductionHostRejected(_))),
                "{host} should be rejected"
            );
        }
    }

    #[test]
    fn production_like_identifiers_rejected() {
        let config = Config {
            project_id: "prod-project".to_string(),
            ..valid_config()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ProductionLikeIdentifier { field: ENV_PROJECT_ID, pattern: "prod", .. })
        ));

        let config = Config {
            instance_id: "main-instance".to_string(),
            ..valid_config()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ProductionLikeIdentifier { field: ENV_INSTANCE_ID, pattern: "main", .. })
        ));
    }

    #[test]
    fn staging_environment_with_stage_instance_is_rejected() {
        let config = Config {
            environment: Environment::Staging,
            instance_id: "stage-instance".to_string(),
            ..valid_config()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ProductionLikeIdentifier { .. })
        ));

        let config = Config {
            environment: Environment::Staging,
            ..valid_config()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_fields_reported_in_order() {
        let config = Config {
            project_id: String::new(),
            instance_id: String::new(),
            ..valid_config()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingField(ENV_PROJECT_ID))
        ));

        let config = Config {
            primary_schema: PathBuf::new(),
            ..valid_config()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingField(ENV_PRIMARY_SCHEMA_PATH))
        ));
    }

    #[test]
    fn invalid_identifier_names_field() {
        let config = Config {
            secondary_db: Some("Bad DB".to_string()),
            ..valid_config()
        };
        match config.validate() {
            Err(ConfigError::InvalidIdentifier { field, .. }) => {
                assert_eq!(field, ENV_SECONDARY_DATABASE_ID)
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn identifier_checks_run_before_host_policy() {
        let config = Config {
            project_id: "x".to_string(),
            emulator_host: "spanner.googleapis.com".to_string(),
            ..valid_config()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidIdentifier { field: ENV_PROJECT_ID, .. })
        ));
    }

    #[test]
    fn invalid_schema_path_rejected() {
        let config = Config {
            secondary_schema: Some(PathBuf::from("../outside")),
            ..valid_config()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSchemaPath { field: ENV_SECONDARY_SCHEMA_PATH, .. })
        ));
    }

    #[test]
    fn timeout_out_of_range_rejected() {
        let config = Config {
            timeout: Duration::from_secs(3601),
            ..valid_config()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTimeout(_))));
    }

    #[test]
    fn from_lookup_applies_defaults() {
        let config = Config::from_lookup(lookup(&[
            (ENV_PROJECT_ID, "test-project"),
            (ENV_INSTANCE_ID, "test-instance"),
            (ENV_EMULATOR_HOST, "localhost:9010"),
            (ENV_PRIMARY_DATABASE_ID, "primary-db"),
            (ENV_PRIMARY_SCHEMA_PATH, "src"),
            (ENV_SECONDARY_DATABASE_ID, ""),
        ]))
        .unwrap();

        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert_eq!(config.secondary_db, None);
        config.validate().unwrap();
    }

    #[test]
    fn from_lookup_parses_environment_and_timeout() {
        let config = Config::from_lookup(lookup(&[
            (ENV_ENVIRONMENT, "Test"),
            (ENV_TIMEOUT_SECONDS, "30"),
        ]))
        .unwrap();
        assert_eq!(config.environment, Environment::Test);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn production_environment_rejected() {
        let err = Config::from_lookup(lookup(&[(ENV_ENVIRONMENT, "production")])).unwrap_err();
        assert!(matches!(err, ConfigError::ProductionEnvironment(_)));

        let err = Config::from_lookup(lookup(&[(ENV_ENVIRONMENT, "qa")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvironment(_)));
    }

    #[test]
    fn bad_timeouts_rejected() {
        for raw in ["0", "3601", "ten", "-5"] {
            let err = Config::from_lookup(lookup(&[(ENV_TIMEOUT_SECONDS, raw)])).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidTimeout(_)), "{raw}");
        }
    }

    #[test]
    fn database_configs_share_project_and_instance() {
        let config = valid_config();
        let primary = config.primary_database();
        assert_eq!(primary.database_id, "primary-db");
        assert_eq!(
            primary.resource_path().unwrap(),
            "projects/test-project/instances/test-instance/databases/primary-db"
        );
        let secondary = config.secondary_database().unwrap();
        assert_eq!(secondary.database_id, "secondary-db");
        assert_eq!(config.database_config("other-db").instance_id, "test-instance");
    }

    #[test]
    fn summary_mentions_databases() {
        let summary = valid_config().summary();
        assert!(summary.contains("primary=primary-db"));
        assert!(summary.contains("secondary=secondary-db"));
        assert!(summary.contains("timeout=120s"));
    }
}
