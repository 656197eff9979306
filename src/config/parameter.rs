use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// Default configuration values
const DEFAULTS: &[(&str, &str)] = &[
    ("ENV", "development"),
    ("LOG_LEVEL", "info"),
    ("SERVER_ADDRESS", "127.0.0.1"),
    ("SERVER_PORT", "8081"),
    ("STORAGE_BACKEND", "postgres"),
    ("DB_MAX_CONNECTIONS", "20"),
    ("DB_MIN_CONNECTIONS", "5"),
    ("DB_ACQUIRE_TIMEOUT_SECONDS", "30"),
    ("DB_IDLE_TIMEOUT_SECONDS", "600"),
    ("DB_MAX_LIFETIME_SECONDS", "1800"),
    ("JWT_ACCESS_TTL_MINUTES", "1440"), // 24 hours
    ("JWT_REFRESH_TTL_DAYS", "7"),
    ("BCRYPT_COST", "12"),
    ("LOCKOUT_MAX_ATTEMPTS", "5"),
    ("LOCKOUT_DURATION_MINUTES", "15"),
];

/// Keys read from the environment without a default.
const OPTIONAL_KEYS: &[&str] = &["DATABASE_URL", "JWT_SECRET"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParameterError {
    #[error("Required configuration parameter '{0}' is missing")]
    Missing(String),
    #[error("Configuration parameter '{key}' is not a valid {expected}: {value}")]
    Invalid {
        key: String,
        expected: &'static str,
        value: String,
    },
}

/// Raw key/value configuration: defaults overridden by the process environment.
#[derive(Clone, Debug, Default)]
pub struct Parameters {
    values: HashMap<String, String>,
    env_file: Option<PathBuf>,
}

impl Parameters {
    /// Load `.env` (if any) and merge the environment over the defaults.
    pub fn from_env() -> Self {
        let env_file = dotenv::dotenv().ok();

        let keys = DEFAULTS
            .iter()
            .map(|(key, _)| *key)
            .chain(OPTIONAL_KEYS.iter().copied());

        let overrides = keys
            .filter_map(|key| std::env::var(key).ok().map(|value| (key.to_string(), value)));

        Self {
            env_file,
            ..Self::with_overrides(overrides)
        }
    }

    /// Defaults plus the given overrides, without touching the environment.
    pub fn with_overrides<I, K, V>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut values: HashMap<String, String> = DEFAULTS
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();

        for (key, value) in overrides {
            values.insert(key.into(), value.into());
        }

        Self {
            values,
            env_file: None,
        }
    }

    pub fn get(&self, parameter: &str) -> Result<String, ParameterError> {
        self.get_optional(parameter)
            .ok_or_else(|| ParameterError::Missing(parameter.to_string()))
    }

    pub fn get_optional(&self, parameter: &str) -> Option<String> {
        self.values
            .get(parameter)
            .filter(|value| !value.trim().is_empty())
            .cloned()
    }

    pub fn get_i64(&self, parameter: &str) -> Result<i64, ParameterError> {
        self.parse(parameter, "i64")
    }

    pub fn get_u64(&self, parameter: &str) -> Result<u64, ParameterError> {
        self.parse(parameter, "u64")
    }

    pub fn get_u32(&self, parameter: &str) -> Result<u32, ParameterError> {
        self.parse(parameter, "u32")
    }

    fn parse<T: std::str::FromStr>(
        &self,
        parameter: &str,
        expected: &'static str,
    ) -> Result<T, ParameterError> {
        let value = self.get(parameter)?;
        value.trim().parse::<T>().map_err(|_| ParameterError::Invalid {
            key: parameter.to_string(),
            expected,
            value,
        })
    }

    /// The `.env` file that was loaded, if one was found.
    pub fn env_file(&self) -> Option<&PathBuf> {
        self.env_file.as_ref()
    }

    /// Number of known parameters, defaults included
    pub fn len(&self) -> usize {
        self.values.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_loaded() {
        let params = Parameters::with_overrides(Vec::<(String, String)>::new());

        assert_eq!(params.get("SERVER_PORT").unwrap(), "8081");
        assert_eq!(params.get_u32("LOCKOUT_MAX_ATTEMPTS").unwrap(), 5);
        assert_eq!(params.get_optional("JWT_SECRET"), None);
    }

    #[test]
    fn overrides_replace_defaults() {
        let params = Parameters::with_overrides([("SERVER_PORT", "9000"), ("JWT_SECRET", "abc")]);

        assert_eq!(params.get_u64("SERVER_PORT").unwrap(), 9000);
        assert_eq!(params.get("JWT_SECRET").unwrap(), "abc");
    }

    #[test]
    fn invalid_numbers_are_reported() {
        let params = Parameters::with_overrides([("BCRYPT_COST", "twelve")]);

        assert_eq!(
            params.get_u32("BCRYPT_COST"),
            Err(ParameterError::Invalid {
                key: "BCRYPT_COST".to_string(),
                expected: "u32",
                value: "twelve".to_string(),
            })
        );
    }

    #[test]
    fn blank_values_count_as_missing() {
        let params = Parameters::with_overrides([("DATABASE_URL", "  ")]);

        assert_eq!(
            params.get("DATABASE_URL"),
            Err(ParameterError::Missing("DATABASE_URL".to_string()))
        );
    }
}
