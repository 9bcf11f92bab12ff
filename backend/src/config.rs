//! Application settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, environment variables prefixed with `APP_`,
//! and an optional configuration file, in that precedence order. The broker
//! URL, the signing secret, and the hook list are mandatory; everything else
//! has a default or switches the subsystem to its in-memory fallback when
//! absent.

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::BootstrapSeed;

const SEED_KEY: &str = "bootstrap-v1";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MONGO_DATABASE: &str = "backend";
const DEFAULT_MAIL_FROM: &str = "no-reply@example.com";
const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60;
const DEFAULT_DB_POOL_SIZE: u32 = 10;
const DEFAULT_SEED_ADMIN_NAME: &str = "Admin";
const DEFAULT_SEED_ADMIN_EMAIL: &str = "admin@example.com";
const DEFAULT_SEED_ADMIN_PASSWORD: &str = "change-me-please";

/// Configuration problems that abort startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing required setting: {key}")]
    Missing { key: &'static str },
    #[error("unknown hook name: {name}")]
    UnknownHook { name: String },
}

/// Cross-cutting request hooks that can be enabled by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookName {
    /// Request-scoped trace identifiers plus the `Trace-Id` header.
    Trace,
    /// One structured log line per completed request.
    RequestLog,
}

impl std::str::FromStr for HookName {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trace" => Ok(Self::Trace),
            "request-log" => Ok(Self::RequestLog),
            other => Err(ConfigError::UnknownHook {
                name: other.to_owned(),
            }),
        }
    }
}

/// Settings for both the HTTP server and the worker process.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "APP")]
pub struct AppSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// Redis connection string for notifications and the task queue.
    pub broker_url: Option<String>,
    /// HS256 secret used to sign identity tokens.
    pub jwt_secret: Option<String>,
    /// Comma-separated hook names installed at startup.
    pub hooks: Option<String>,
    /// Identity token lifetime in minutes.
    pub token_ttl_minutes: Option<i64>,
    /// PostgreSQL connection string; in-memory stores are used when absent.
    pub database_url: Option<String>,
    /// Maximum size of the relational connection pool.
    pub db_pool_size: Option<u32>,
    /// MongoDB connection string; audit writes are dropped when absent.
    pub mongo_url: Option<String>,
    /// MongoDB database name for the audit collection.
    pub mongo_database: Option<String>,
    /// SMTP connection URL; mail is dropped when absent.
    pub smtp_url: Option<String>,
    /// Sender address for outbound mail.
    pub mail_from: Option<String>,
    /// Display name of the seeded admin user.
    pub seed_admin_name: Option<String>,
    /// Email of the seeded admin user.
    pub seed_admin_email: Option<String>,
    /// Initial password of the seeded admin user.
    pub seed_admin_password: Option<String>,
}

impl AppSettings {
    pub fn bind_addr(&self) -> &str {
        self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    }

    pub fn broker_url(&self) -> Result<&str, ConfigError> {
        self.broker_url
            .as_deref()
            .ok_or(ConfigError::Missing { key: "broker_url" })
    }

    pub fn jwt_secret(&self) -> Result<&str, ConfigError> {
        self.jwt_secret
            .as_deref()
            .ok_or(ConfigError::Missing { key: "jwt_secret" })
    }

    /// Parse the configured hook list. The setting itself is mandatory; an
    /// empty value explicitly disables every hook.
    pub fn hooks(&self) -> Result<Vec<HookName>, ConfigError> {
        let raw = self
            .hooks
            .as_deref()
            .ok_or(ConfigError::Missing { key: "hooks" })?;
        raw.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::parse)
            .collect()
    }

    pub fn token_ttl_minutes(&self) -> i64 {
        self.token_ttl_minutes
            .unwrap_or(DEFAULT_TOKEN_TTL_MINUTES)
    }

    pub fn db_pool_size(&self) -> u32 {
        self.db_pool_size.unwrap_or(DEFAULT_DB_POOL_SIZE)
    }

    pub fn mongo_database(&self) -> &str {
        self.mongo_database
            .as_deref()
            .unwrap_or(DEFAULT_MONGO_DATABASE)
    }

    pub fn mail_from(&self) -> &str {
        self.mail_from.as_deref().unwrap_or(DEFAULT_MAIL_FROM)
    }

    /// Admin account applied by the idempotent seed step.
    pub fn bootstrap_seed(&self) -> BootstrapSeed {
        BootstrapSeed {
            seed_key: SEED_KEY.to_owned(),
            admin_name: self
                .seed_admin_name
                .clone()
                .unwrap_or_else(|| DEFAULT_SEED_ADMIN_NAME.to_owned()),
            admin_email: self
                .seed_admin_email
                .clone()
                .unwrap_or_else(|| DEFAULT_SEED_ADMIN_EMAIL.to_owned()),
            admin_password: self
                .seed_admin_password
                .clone()
                .unwrap_or_else(|| DEFAULT_SEED_ADMIN_PASSWORD.to_owned()),
        }
    }
}
