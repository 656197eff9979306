use crate::config::logging::secure_log;
use crate::entity::user::User;
use crate::error::{token_error::TokenError, AppError};
use crate::repository::user_repository::UserRepositoryTrait;
use crate::service::clock::Clock;
use crate::service::token_service::TokenService;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Duration;
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{info, warn};

const REFRESH_TOKEN_BYTES: usize = 32;

/// Opaque refresh tokens: one per user, stored as a SHA-256 digest with an absolute expiry.
#[derive(Clone)]
pub struct RefreshTokenService {
    refresh_token_ttl: Duration,
    token_service: TokenService,
    clock: Arc<dyn Clock>,
    user_repo: Arc<dyn UserRepositoryTrait>,
}

impl RefreshTokenService {
    pub fn new(
        refresh_token_ttl: Duration,
        token_service: TokenService,
        clock: Arc<dyn Clock>,
        user_repo: Arc<dyn UserRepositoryTrait>,
    ) -> Self {
        Self {
            refresh_token_ttl,
            token_service,
            clock,
            user_repo,
        }
    }

    pub fn generate_refresh_token() -> String {
        let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    pub fn hash_refresh_token(token: &str) -> String {
        format!("{:x}", Sha256::digest(token.as_bytes()))
    }

    /// Replaces whatever refresh token the user had and returns the new raw value.
    pub async fn issue_refresh_token(&self, user: &User) -> Result<String, AppError> {
        let token = Self::generate_refresh_token();
        let now = self.clock.now();
        let expires_at = now
            .checked_add_signed(self.refresh_token_ttl)
            .ok_or_else(|| TokenError::TokenCreationError("Refresh expiration calculation overflow".to_string()))?;

        self.user_repo
            .store_refresh_token(user.id, &Self::hash_refresh_token(&token), expires_at, now)
            .await?;

        info!("SECURITY: Refresh token issued for user ID: {}", user.id);
        Ok(token)
    }

    /// New access token for a live refresh token. The refresh token itself is not rotated.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_refresh_token_hash(&Self::hash_refresh_token(refresh_token))
            .await?
            .ok_or_else(|| {
                warn!("SECURITY: Refresh attempted with unknown token");
                TokenError::InvalidRefreshToken
            })?;

        let now = self.clock.now();
        let expired = user.refresh_token_expires_at.is_none_or(|expires_at| expires_at <= now);
        if expired {
            self.user_repo.clear_refresh_token(user.id, now).await?;
            warn!("SECURITY: Expired refresh token cleared for user ID: {}", user.id);
            return Err(TokenError::RefreshTokenExpired.into());
        }

        let access_token = self.token_service.issue_access_token(&user)?;
        info!("SECURITY: Access token refreshed for user ID: {}", user.id);
        Ok(access_token)
    }

    /// Clears the owner's refresh state. Failures are logged, never returned.
    pub async fn logout(&self, refresh_token: Option<&str>) {
        let Some(refresh_token) = refresh_token.filter(|token| !token.is_empty()) else {
            return;
        };

        let owner = match self
            .user_repo
            .find_by_refresh_token_hash(&Self::hash_refresh_token(refresh_token))
            .await
        {
            Ok(Some(user)) => user,
            Ok(None) => return,
            Err(e) => {
                secure_log::secure_error!("Logout lookup failed", e);
                return;
            }
        };

        match self.user_repo.clear_refresh_token(owner.id, self.clock.now()).await {
            Ok(()) => info!("SECURITY: User ID: {} logged out", owner.id),
            Err(e) => {
                secure_log::secure_error!("Logout failed to clear refresh token", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::tests::test_config;
    use crate::repository::memory::InMemoryStore;
    use crate::service::clock::ManualClock;
    use chrono::Utc;

    struct Fixture {
        service: RefreshTokenService,
        clock: Arc<ManualClock>,
        store: Arc<InMemoryStore>,
        user: User,
    }

    async fn fixture() -> Fixture {
        let config = test_config();
        let clock = ManualClock::starting_now();
        let store = InMemoryStore::new_shared();
        let user = User::new("Jane Doe".to_string(), "jane@example.com".to_string(), "hash".to_string(), Utc::now());
        UserRepositoryTrait::insert(store.as_ref(), &user).await.unwrap();

        let token_service = TokenService::new(&config.jwt, clock.clone(), store.clone());
        let service = RefreshTokenService::new(config.jwt.refresh_token_ttl, token_service, clock.clone(), store.clone());
        Fixture { service, clock, store, user }
    }

    #[test]
    fn generated_tokens_are_url_safe_and_unique() {
        let first = RefreshTokenService::generate_refresh_token();
        let second = RefreshTokenService::generate_refresh_token();

        assert_eq!(first.len(), 43);
        assert!(first.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_ne!(first, second);
    }

    #[test]
    fn hash_is_hex_sha256() {
        assert_eq!(
            RefreshTokenService::hash_refresh_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn refresh_issues_access_token_while_live() {
        let f = fixture().await;
        let refresh_token = f.service.issue_refresh_token(&f.user).await.unwrap();

        let stored = UserRepositoryTrait::find(f.store.as_ref(), f.user.id).await.unwrap().unwrap();
        assert_eq!(stored.refresh_token_hash, Some(RefreshTokenService::hash_refresh_token(&refresh_token)));

        let access_token = f.service.refresh(&refresh_token).await.unwrap();
        assert!(f.service.token_service.verify(&access_token));
    }

    #[tokio::test]
    async fn expired_refresh_is_cleared_then_unknown() {
        let f = fixture().await;
        let refresh_token = f.service.issue_refresh_token(&f.user).await.unwrap();

        f.clock.advance(Duration::days(7) + Duration::seconds(1));

        let first = f.service.refresh(&refresh_token).await;
        assert!(matches!(first, Err(AppError::Token(TokenError::RefreshTokenExpired))));

        let stored = UserRepositoryTrait::find(f.store.as_ref(), f.user.id).await.unwrap().unwrap();
        assert!(stored.refresh_token_hash.is_none());
        assert!(stored.refresh_token_expires_at.is_none());

        let second = f.service.refresh(&refresh_token).await;
        assert!(matches!(second, Err(AppError::Token(TokenError::InvalidRefreshToken))));
    }

    #[tokio::test]
    async fn issuing_again_invalidates_the_previous_token() {
        let f = fixture().await;
        let old = f.service.issue_refresh_token(&f.user).await.unwrap();
        let new = f.service.issue_refresh_token(&f.user).await.unwrap();

        assert!(matches!(
            f.service.refresh(&old).await,
            Err(AppError::Token(TokenError::InvalidRefreshToken))
        ));
        assert!(f.service.refresh(&new).await.is_ok());
    }

    #[tokio::test]
    async fn logout_clears_state_and_tolerates_garbage() {
        let f = fixture().await;
        let refresh_token = f.service.issue_refresh_token(&f.user).await.unwrap();

        f.service.logout(None).await;
        f.service.logout(Some("garbage")).await;
        f.service.logout(Some(&refresh_token)).await;

        let stored = UserRepositoryTrait::find(f.store.as_ref(), f.user.id).await.unwrap().unwrap();
        assert!(stored.refresh_token_hash.is_none());
        assert!(f.service.refresh(&refresh_token).await.is_err());
    }
}
