use crate::config::logging::secure_log;
use crate::error::AppError;

const MIN_PASSWORD_LENGTH: usize = 8;

const POLICY_MESSAGE: &str = "Password must be at least 8 characters long and contain at least one uppercase letter, one lowercase letter, and one number";

/// Password strength rules: at least 8 characters with an ASCII lowercase letter,
/// an ASCII uppercase letter and an ASCII digit.
pub struct PasswordPolicy;

impl PasswordPolicy {
    pub fn is_valid(password: &str) -> bool {
        password.chars().count() >= MIN_PASSWORD_LENGTH
            && password.chars().any(|c| c.is_ascii_lowercase())
            && password.chars().any(|c| c.is_ascii_uppercase())
            && password.chars().any(|c| c.is_ascii_digit())
    }

    pub fn validation_message() -> &'static str {
        POLICY_MESSAGE
    }
}

/// Salted one-way hashing. bcrypt runs on the blocking pool so request tasks are not stalled.
#[derive(Clone, Copy, Debug)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub async fn hash(&self, password: &str) -> Result<String, AppError> {
        let password = password.to_owned();
        let cost = self.cost;

        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?
            .map_err(|e| {
                secure_log::secure_error!("Failed to hash password", e);
                AppError::Internal("Password hashing failed".to_string())
            })
    }

    /// Constant-time comparison against a stored hash. A malformed hash verifies as `false`.
    pub async fn verify(&self, password: &str, password_hash: &str) -> Result<bool, AppError> {
        let password = password.to_owned();
        let password_hash = password_hash.to_owned();

        let result = tokio::task::spawn_blocking(move || bcrypt::verify(password, &password_hash))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;

        match result {
            Ok(is_valid) => Ok(is_valid),
            Err(e) => {
                secure_log::secure_error!("SECURITY: Password verification system error", e);
                Ok(false)
            }
        }
    }
}
