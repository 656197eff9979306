use crate::service::authentication_service::AuthenticationService;
use crate::service::user_service::UserService;

#[derive(Clone)]
pub struct UserState {
    pub user_service: UserService,
    pub authentication_service: AuthenticationService,
}

impl UserState {
    pub fn new(user_service: UserService, authentication_service: AuthenticationService) -> Self {
        Self {
            user_service,
            authentication_service,
        }
    }
}
