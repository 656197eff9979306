use crate::service::token_service::TokenService;

/// State for the session gate
#[derive(Clone)]
pub struct TokenState {
    pub token_service: TokenService,
}

impl TokenState {
    pub fn new(token_service: TokenService) -> Self {
        Self { token_service }
    }
}
