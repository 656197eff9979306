use crate::service::authentication_service::AuthenticationService;
use crate::service::refresh_token_service::RefreshTokenService;
use crate::service::token_service::TokenService;

#[derive(Clone)]
pub struct AuthState {
    pub(crate) authentication_service: AuthenticationService,
    pub(crate) token_service: TokenService,
    pub(crate) refresh_token_service: RefreshTokenService,
}

impl AuthState {
    pub fn new(
        authentication_service: AuthenticationService,
        token_service: TokenService,
        refresh_token_service: RefreshTokenService,
    ) -> Self {
        Self {
            authentication_service,
            token_service,
            refresh_token_service,
        }
    }
}
