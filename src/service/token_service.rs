use crate::config::logging::secure_log;
use crate::config::settings::JwtConfig;
use crate::dto::token_dto::TokenClaimsDto;
use crate::entity::user::User;
use crate::error::token_error::TokenError;
use crate::repository::user_repository::UserRepositoryTrait;
use crate::service::clock::Clock;
use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation};
use std::sync::Arc;
use tracing::warn;

/// Issues and checks HS256 access tokens. Read-only after construction.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_ttl: Duration,
    clock: Arc<dyn Clock>,
    user_repo: Arc<dyn UserRepositoryTrait>,
}

impl TokenService {
    pub fn new(config: &JwtConfig, clock: Arc<dyn Clock>, user_repo: Arc<dyn UserRepositoryTrait>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            access_token_ttl: config.access_token_ttl,
            clock,
            user_repo,
        }
    }

    pub fn issue_access_token(&self, user: &User) -> Result<String, TokenError> {
        let now = self.clock.now();
        let exp = now
            .checked_add_signed(self.access_token_ttl)
            .ok_or_else(|| TokenError::TokenCreationError("Token expiration calculation overflow".to_string()))?;

        let claims = TokenClaimsDto {
            sub: user.email.clone(),
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::TokenCreationError(e.to_string()))
    }

    /// Signature check only; expiry is judged against the injected clock in `verify`.
    pub fn retrieve_token_claims(&self, token: &str) -> jsonwebtoken::errors::Result<TokenData<TokenClaimsDto>> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;

        decode::<TokenClaimsDto>(token, &self.decoding_key, &validation)
    }

    /// Valid signature and `now < exp`. Never errors.
    pub fn verify(&self, token: &str) -> bool {
        self.valid_claims(token).is_some()
    }

    /// The user the token was issued to, or `None` if the token is invalid or the user is gone.
    pub async fn principal_from_token(&self, token: &str) -> Option<User> {
        let claims = self.valid_claims(token)?;

        match self.user_repo.find(claims.user_id).await {
            Ok(user) => user,
            Err(e) => {
                secure_log::secure_error!("Principal lookup failed", e);
                None
            }
        }
    }

    fn valid_claims(&self, token: &str) -> Option<TokenClaimsDto> {
        let claims = match self.retrieve_token_claims(token) {
            Ok(data) => data.claims,
            Err(e) => {
                secure_log::sensitive_debug!("JWT rejected: {}", e);
                return None;
            }
        };

        if self.clock.now().timestamp() >= claims.exp {
            warn!("SECURITY: Expired access token presented for user ID: {}", claims.user_id);
            return None;
        }
        Some(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::tests::test_config;
    use crate::repository::memory::InMemoryStore;
    use crate::service::clock::ManualClock;
    use chrono::Utc;

    async fn fixture() -> (TokenService, Arc<ManualClock>, User) {
        let clock = ManualClock::starting_now();
        let store = InMemoryStore::new_shared();
        let user = User::new("Jane Doe".to_string(), "jane@example.com".to_string(), "hash".to_string(), Utc::now());
        UserRepositoryTrait::insert(store.as_ref(), &user).await.unwrap();

        let service = TokenService::new(&test_config().jwt, clock.clone(), store);
        (service, clock, user)
    }

    #[tokio::test]
    async fn fresh_token_verifies_and_resolves_principal() {
        let (service, _clock, user) = fixture().await;
        let token = service.issue_access_token(&user).unwrap();

        assert!(service.verify(&token));
        let principal = service.principal_from_token(&token).await.unwrap();
        assert_eq!(principal.id, user.id);

        let claims = service.retrieve_token_claims(&token).unwrap().claims;
        assert_eq!(claims.sub, "jane@example.com");
        assert_eq!(claims.exp - claims.iat, 1440 * 60);
    }

    #[tokio::test]
    async fn token_stops_verifying_once_lifetime_passes() {
        let (service, clock, user) = fixture().await;
        let token = service.issue_access_token(&user).unwrap();

        clock.advance(Duration::minutes(1439));
        assert!(service.verify(&token));

        clock.advance(Duration::minutes(1));
        assert!(!service.verify(&token));
        assert!(service.principal_from_token(&token).await.is_none());
    }

    #[tokio::test]
    async fn tampered_or_foreign_tokens_are_rejected() {
        let (service, _clock, user) = fixture().await;
        let token = service.issue_access_token(&user).unwrap();

        let mut other = test_config().jwt;
        other.secret = "another-secret-that-is-long-enough-for-hs256".to_string();
        let foreign = TokenService::new(&other, ManualClock::starting_now(), InMemoryStore::new_shared());

        assert!(!foreign.verify(&token));
        assert!(!service.verify("not.a.jwt"));
        assert!(!service.verify(""));
    }

    #[tokio::test]
    async fn deleted_user_has_no_principal() {
        let clock = ManualClock::starting_now();
        let store = InMemoryStore::new_shared();
        let ghost = User::new("Ghost".to_string(), "ghost@example.com".to_string(), "hash".to_string(), Utc::now());
        let service = TokenService::new(&test_config().jwt, clock, store);

        let token = service.issue_access_token(&ghost).unwrap();

        assert!(service.verify(&token));
        assert!(service.principal_from_token(&token).await.is_none());
    }
}
