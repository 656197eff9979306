use crate::config::logging::Environment;
use crate::config::parameter::{ParameterError, Parameters};
use chrono::{DateTime, Duration, Utc};
use tracing::Level;

/// Development-only signing secret used when `JWT_SECRET` is not configured.
const DEFAULT_JWT_SECRET: &str = "defaultSecretKeyThatIsLongEnoughForHS256AndShouldBeChanged";

/// HS256 keys shorter than this are rejected at startup.
pub const MIN_JWT_SECRET_BYTES: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub idle_timeout_seconds: u64,
    pub max_lifetime_seconds: u64,
}

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
}

impl JwtConfig {
    /// True when `JWT_SECRET` was not set and the development fallback is in use.
    pub fn uses_default_secret(&self) -> bool {
        self.secret == DEFAULT_JWT_SECRET
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .finish()
    }
}

/// Failed-login lockout policy
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LockoutPolicy {
    pub max_failed_attempts: i32,
    pub lock_duration: Duration,
}

impl LockoutPolicy {
    /// End of a lock starting at `now`, or `None` when it falls outside the representable range.
    pub fn lock_deadline(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        now.checked_add_signed(self.lock_duration)
    }
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_failed_attempts: 5,
            lock_duration: Duration::minutes(15),
        }
    }
}

/// Typed application configuration, built once at startup and passed to constructors.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub environment: Environment,
    pub log_level: Level,
    pub server: ServerConfig,
    pub storage: StorageBackend,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub bcrypt_cost: u32,
    pub lockout: LockoutPolicy,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Parameter(#[from] ParameterError),
    #[error("{0}")]
    Invalid(String),
}

impl AppConfig {
    pub fn from_parameters(params: &Parameters) -> Result<Self, ConfigError> {
        let environment = Environment::from_str(&params.get("ENV")?);
        let log_level = parse_level(&params.get("LOG_LEVEL")?);

        let port = params.get_u64("SERVER_PORT")?;
        let port = u16::try_from(port)
            .map_err(|_| ConfigError::Invalid(format!("SERVER_PORT out of range: {port}")))?;

        let storage = match params.get("STORAGE_BACKEND")?.to_lowercase().as_str() {
            "postgres" | "postgresql" => StorageBackend::Postgres,
            "memory" | "in-memory" => StorageBackend::Memory,
            other => {
                return Err(ConfigError::Invalid(format!(
                    "STORAGE_BACKEND must be 'postgres' or 'memory', got '{other}'"
                )));
            }
        };

        let database = DatabaseConfig {
            url: params.get_optional("DATABASE_URL"),
            max_connections: params.get_u32("DB_MAX_CONNECTIONS")?,
            min_connections: params.get_u32("DB_MIN_CONNECTIONS")?,
            acquire_timeout_seconds: params.get_u64("DB_ACQUIRE_TIMEOUT_SECONDS")?,
            idle_timeout_seconds: params.get_u64("DB_IDLE_TIMEOUT_SECONDS")?,
            max_lifetime_seconds: params.get_u64("DB_MAX_LIFETIME_SECONDS")?,
        };

        if storage == StorageBackend::Postgres && database.url.is_none() {
            return Err(ParameterError::Missing("DATABASE_URL".to_string()).into());
        }

        let secret = match params.get_optional("JWT_SECRET") {
            Some(secret) => secret,
            None if environment == Environment::Production => {
                return Err(ParameterError::Missing("JWT_SECRET".to_string()).into());
            }
            None => DEFAULT_JWT_SECRET.to_string(),
        };

        if secret.len() < MIN_JWT_SECRET_BYTES {
            return Err(ConfigError::Invalid(format!(
                "JWT secret must be at least {MIN_JWT_SECRET_BYTES} bytes (256 bits). Current length: {}",
                secret.len()
            )));
        }

        let jwt = JwtConfig {
            secret,
            access_token_ttl: positive_duration(params, "JWT_ACCESS_TTL_MINUTES", Duration::try_minutes)?,
            refresh_token_ttl: positive_duration(params, "JWT_REFRESH_TTL_DAYS", Duration::try_days)?,
        };

        let bcrypt_cost = params.get_u32("BCRYPT_COST")?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid(format!(
                "BCRYPT_COST must be between 4 and 31, got {bcrypt_cost}"
            )));
        }

        let max_failed_attempts = i32::try_from(params.get_u32("LOCKOUT_MAX_ATTEMPTS")?)
            .map_err(|_| ConfigError::Invalid("LOCKOUT_MAX_ATTEMPTS out of range".to_string()))?;
        if max_failed_attempts == 0 {
            return Err(ConfigError::Invalid(
                "LOCKOUT_MAX_ATTEMPTS must be at least 1".to_string(),
            ));
        }

        let lockout = LockoutPolicy {
            max_failed_attempts,
            lock_duration: positive_duration(params, "LOCKOUT_DURATION_MINUTES", Duration::try_minutes)?,
        };

        Ok(Self {
            environment,
            log_level,
            server: ServerConfig {
                address: params.get("SERVER_ADDRESS")?,
                port,
            },
            storage,
            database,
            jwt,
            bcrypt_cost,
            lockout,
        })
    }
}

/// Reads a whole-unit duration that must be positive and representable.
fn positive_duration(
    params: &Parameters,
    key: &str,
    from_units: fn(i64) -> Option<Duration>,
) -> Result<Duration, ConfigError> {
    let value = params.get_i64(key)?;
    if value <= 0 {
        return Err(ConfigError::Invalid(format!("{key} must be greater than 0, got {value}")));
    }
    from_units(value).ok_or_else(|| ConfigError::Invalid(format!("{key} is out of range: {value}")))
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "error" => Level::ERROR,
        "warn" => Level::WARN,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    }
}
