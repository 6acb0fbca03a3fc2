//! spanwright-core — identifier validation, resource paths, and configuration.
//!
//! Everything that decides whether a project/instance/database/table name or
//! a schema directory is safe to use lives here, together with the
//! environment-driven [`Config`] that refuses to point at anything but a
//! local Spanner emulator.
//!
//! ```text
//! load_config()
//!   ├── Config::from_env()        (.env fallback, defaults)
//!   └── Config::validate()
//!         ├── identifier::validate_*      (naming rules, traversal, keywords)
//!         ├── path::validate_schema_path  (relative, existing, no traversal)
//!         ├── emulator host must be local
//!         └── production-pattern denylist
//! ```

pub mod config;
pub mod error;
pub mod identifier;
pub mod path;

pub use config::{Config, DatabaseConfig, Environment, load_config, load_secure_config};
pub use error::{ConfigError, ConfigResult, ValidationError, ValidationResult};
pub use identifier::{
    IdentifierKind, validate_database_id, validate_identifier, validate_instance_id,
    validate_project_id, validate_table_name,
};
pub use path::{build_secure_dsn, clean_path, validate_schema_path};
