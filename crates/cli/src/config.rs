//! Process configuration read from the environment.

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use db::DbConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),

    #[error("environment variable {name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Everything `carzone serve` needs.
#[derive(Debug, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub operation_timeout: Duration,
    pub admin_user: String,
    pub admin_password: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(&lookup);
        Ok(Self {
            db: db_config(&env)?,
            port: env.required("PORT")?,
            jwt_secret: env.required("JWT_SECRET")?,
            token_ttl: token_ttl(&env)?,
            operation_timeout: Duration::from_millis(env.or("OPERATION_TIMEOUT_MS", 5000u64)?),
            admin_user: env.or("ADMIN_USER", "admin".to_owned())?,
            admin_password: env.or("ADMIN_PASSWORD", "admin123".to_owned())?,
        })
    }
}

fn token_ttl<F>(env: &Env<'_, F>) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let hours: u64 = env.or("TOKEN_TTL_HOURS", 24)?;
    hours
        .checked_mul(3600)
        .filter(|secs| i64::try_from(*secs).is_ok())
        .map(Duration::from_secs)
        .ok_or(ConfigError::Invalid { name: "TOKEN_TTL_HOURS", value: hours.to_string() })
}

/// Database settings alone, for commands that do not serve HTTP.
pub fn db_config_from_env() -> Result<DbConfig, ConfigError> {
    db_config(&Env(&|name: &str| std::env::var(name).ok()))
}

fn db_config<F>(env: &Env<'_, F>) -> Result<DbConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = DbConfig::default();
    Ok(DbConfig {
        host: env.or("DB_HOST", defaults.host)?,
        port: env.or("DB_PORT", defaults.port)?,
        user: env.or("DB_USER", defaults.user)?,
        password: env.or("DB_PASSWORD", defaults.password)?,
        database: env.or("DB_NAME", defaults.database)?,
        max_connections: env.or("DB_MAX_CONNECTIONS", defaults.max_connections)?,
        connect_timeout: Duration::from_secs(
            env.or("DB_CONNECT_TIMEOUT_SECS", defaults.connect_timeout.as_secs())?,
        ),
    })
}

struct Env<'a, F>(&'a F);

impl<F> Env<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn parse<T: FromStr>(&self, name: &'static str) -> Result<Option<T>, ConfigError> {
        match (self.0)(name) {
            None => Ok(None),
            Some(value) => value
                .parse()
                .map(Some)
                .map_err(|_| ConfigError::Invalid { name, value }),
        }
    }

    fn required<T: FromStr>(&self, name: &'static str) -> Result<T, ConfigError> {
        self.parse(name)?.ok_or(ConfigError::Missing(name))
    }

    fn or<T: FromStr>(&self, name: &'static str, default: T) -> Result<T, ConfigError> {
        Ok(self.parse(name)?.unwrap_or(default))
    }
}
