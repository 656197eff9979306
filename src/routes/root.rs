use super::{addresses, admin, auth, health, profile};
use crate::config::settings::AppConfig;
use crate::middleware::auth as auth_middleware;
use crate::repository::Stores;
use crate::service::address_service::AddressService;
use crate::service::authentication_service::AuthenticationService;
use crate::service::clock::Clock;
use crate::service::password_service::PasswordHasher;
use crate::service::refresh_token_service::RefreshTokenService;
use crate::service::token_service::TokenService;
use crate::service::user_service::UserService;
use crate::state::address_state::AddressState;
use crate::state::auth_state::AuthState;
use crate::state::health_state::HealthState;
use crate::state::token_state::TokenState;
use crate::state::user_state::UserState;
use axum::{middleware, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub fn routes(config: &AppConfig, stores: Stores, clock: Arc<dyn Clock>) -> Router {
    let token_service = TokenService::new(&config.jwt, clock.clone(), stores.users.clone());
    let refresh_token_service = RefreshTokenService::new(
        config.jwt.refresh_token_ttl,
        token_service.clone(),
        clock.clone(),
        stores.users.clone(),
    );
    let authentication_service = AuthenticationService::new(
        stores.users.clone(),
        PasswordHasher::new(config.bcrypt_cost),
        config.lockout,
        clock.clone(),
    );
    let user_service = UserService::new(stores.users.clone(), config.lockout, clock.clone());
    let address_service = AddressService::new(stores.addresses.clone(), clock);

    let merged_router = {
        let auth_state = AuthState::new(
            authentication_service.clone(),
            token_service.clone(),
            refresh_token_service,
        );
        let user_state = UserState::new(user_service, authentication_service);
        let token_state = TokenState::new(token_service);

        auth::routes()
            .with_state(auth_state)
            .merge(profile::routes().merge(admin::routes()).with_state(user_state))
            .merge(addresses::routes().with_state(AddressState::new(address_service)))
            .merge(health::routes().with_state(HealthState::new(stores.database.clone())))
            .layer(ServiceBuilder::new().layer(middleware::from_fn_with_state(
                token_state,
                auth_middleware::auth,
            )))
    };

    Router::new()
        .nest("/api", merged_router)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::tests::test_config;
    use crate::entity::user::{AdminUserChanges, UserRole};
    use crate::repository::user_repository::UserRepositoryTrait;
    use crate::service::clock::ManualClock;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use chrono::Duration;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    const PASSWORD: &str = "Passw0rd";

    struct TestApp {
        router: Router,
        clock: Arc<ManualClock>,
        stores: Stores,
    }

    fn app() -> TestApp {
        let clock = ManualClock::starting_now();
        let stores = Stores::in_memory();
        let router = routes(&test_config(), stores.clone(), clock.clone());
        TestApp { router, clock, stores }
    }

    impl TestApp {
        async fn call(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
            }
            let request = match body {
                Some(body) => builder
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };

            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (status, value)
        }

        async fn register(&self, email: &str) -> Value {
            let (status, body) = self
                .call(
                    Method::POST,
                    "/api/auth/register",
                    None,
                    Some(json!({"fullName": "Jane Doe", "email": email, "password": PASSWORD})),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED, "{body}");
            body["data"].clone()
        }

        async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
            self.call(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({"email": email, "password": password})),
            )
            .await
        }

        async fn access_token(&self, email: &str) -> String {
            let (status, body) = self.login(email, PASSWORD).await;
            assert_eq!(status, StatusCode::OK, "{body}");
            body["data"]["accessToken"].as_str().unwrap().to_string()
        }

        async fn make_admin(&self, user: &Value) {
            let id: Uuid = user["id"].as_str().unwrap().parse().unwrap();
            let changes = AdminUserChanges {
                role: Some(UserRole::Admin),
                ..Default::default()
            };
            self.stores.users.admin_update(id, &changes, self.clock.now()).await.unwrap();
        }
    }

    fn address(name: &str, is_default: bool) -> Value {
        json!({
            "recipientName": name,
            "phoneNumber": "555-0100",
            "streetAddress": "1 Main St",
            "city": "Springfield",
            "isDefault": is_default
        })
    }

    #[tokio::test]
    async fn register_returns_profile_without_secrets() {
        let app = app();

        let user = app.register("jane@example.com").await;

        assert_eq!(user["email"], "jane@example.com");
        assert_eq!(user["role"], "USER");
        assert_eq!(user["status"], "ACTIVE");
        assert!(user.get("passwordHash").is_none());
        assert!(user.get("failedLoginAttempts").is_none());
    }

    #[tokio::test]
    async fn duplicate_and_invalid_registrations_are_rejected() {
        let app = app();
        app.register("jane@example.com").await;

        let (status, body) = app
            .call(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({"fullName": "Jane", "email": "jane@example.com", "password": PASSWORD})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Email already exists");
        assert_eq!(body["success"], false);
        assert_eq!(body["status"], 400);

        let (status, body) = app
            .call(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({"fullName": "Jane", "email": "not-an-email", "password": PASSWORD})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"]["email"], "Email format is invalid");

        let (status, body) = app
            .call(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({"fullName": "Jane", "email": "weak@example.com", "password": "password"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().starts_with("Password must be at least 8 characters"));
    }

    #[tokio::test]
    async fn login_issues_tokens_accepted_by_verify() {
        let app = app();
        app.register("jane@example.com").await;

        let (status, body) = app.login("jane@example.com", PASSWORD).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Login successful");
        assert_eq!(body["data"]["user"]["email"], "jane@example.com");
        assert!(body["data"]["refreshToken"].as_str().is_some());
        let token = body["data"]["accessToken"].as_str().unwrap();

        let (status, body) = app.call(Method::GET, "/api/auth/verify", Some(token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["email"], "jane@example.com");
    }

    #[tokio::test]
    async fn protected_routes_need_a_valid_bearer_token() {
        let app = app();

        let (status, body) = app.call(Method::GET, "/api/users/profile", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);

        let (status, _) = app.call(Method::GET, "/api/auth/verify", Some("garbage"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = app.call(Method::GET, "/api/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn access_token_expires_with_the_clock() {
        let app = app();
        app.register("jane@example.com").await;
        let token = app.access_token("jane@example.com").await;

        let (status, _) = app.call(Method::GET, "/api/users/profile", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);

        app.clock.advance(Duration::minutes(1440));
        let (status, _) = app.call(Method::GET, "/api/users/profile", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn five_wrong_passwords_lock_until_fifteen_minutes_pass() {
        let app = app();
        app.register("jane@example.com").await;

        for _ in 0..4 {
            let (status, body) = app.login("jane@example.com", "wrong").await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body["message"], "Invalid email or password");
        }
        let (status, body) = app.login("jane@example.com", "wrong").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["message"].as_str().unwrap().contains("locked"));

        let (status, body) = app.login("jane@example.com", PASSWORD).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["message"].as_str().unwrap().contains("locked"));

        app.clock.advance(Duration::minutes(15));
        let (status, _) = app.login("jane@example.com", PASSWORD).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn expired_refresh_token_is_reported_then_forgotten() {
        let app = app();
        app.register("jane@example.com").await;
        let (_, body) = app.login("jane@example.com", PASSWORD).await;
        let refresh_token = body["data"]["refreshToken"].as_str().unwrap().to_string();

        let (status, body) = app
            .call(Method::POST, "/api/auth/refresh", None, Some(json!({"refreshToken": refresh_token})))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"]["accessToken"].as_str().is_some());

        app.clock.advance(Duration::days(7) + Duration::seconds(1));

        let (status, body) = app
            .call(Method::POST, "/api/auth/refresh", None, Some(json!({"refreshToken": refresh_token})))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Refresh token has expired. Please log in again.");

        let (status, body) = app
            .call(Method::POST, "/api/auth/refresh", None, Some(json!({"refreshToken": refresh_token})))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid refresh token");
    }

    #[tokio::test]
    async fn logout_always_succeeds() {
        let app = app();
        app.register("jane@example.com").await;
        let (_, body) = app.login("jane@example.com", PASSWORD).await;
        let refresh_token = body["data"]["refreshToken"].as_str().unwrap().to_string();

        let (status, _) = app.call(Method::POST, "/api/auth/logout", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = app
            .call(Method::POST, "/api/auth/logout", None, Some(json!({"refreshToken": "garbage"})))
            .await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = app
            .call(Method::POST, "/api/auth/logout", None, Some(json!({"refreshToken": refresh_token})))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Logged out successfully");
        assert!(body.get("data").is_none());

        let (status, _) = app
            .call(Method::POST, "/api/auth/refresh", None, Some(json!({"refreshToken": refresh_token})))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn profile_update_and_password_change() {
        let app = app();
        app.register("jane@example.com").await;
        let token = app.access_token("jane@example.com").await;

        let (status, body) = app
            .call(
                Method::PUT,
                "/api/users/profile",
                Some(&token),
                Some(json!({"fullName": "Jane Q. Doe", "phoneNumber": "555-0199"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["fullName"], "Jane Q. Doe");
        assert_eq!(body["data"]["phoneNumber"], "555-0199");

        let (status, body) = app
            .call(
                Method::PUT,
                "/api/users/change-password",
                Some(&token),
                Some(json!({"currentPassword": "Wrong1234", "newPassword": "NewPassw0rd"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Current password is incorrect");

        let (status, _) = app
            .call(
                Method::PUT,
                "/api/users/change-password",
                Some(&token),
                Some(json!({"currentPassword": PASSWORD, "newPassword": "NewPassw0rd"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = app.login("jane@example.com", "NewPassw0rd").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn admin_routes_are_gated_by_role() {
        let app = app();
        let admin = app.register("admin@example.com").await;
        let jane = app.register("jane@example.com").await;
        app.make_admin(&admin).await;
        let admin_token = app.access_token("admin@example.com").await;
        let user_token = app.access_token("jane@example.com").await;

        let (status, body) = app.call(Method::GET, "/api/users", Some(&user_token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Access denied. Admin role required.");

        let (status, body) = app.call(Method::GET, "/api/users", Some(&admin_token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 2);

        let jane_uri = format!("/api/users/{}", jane["id"].as_str().unwrap());
        let (status, body) = app
            .call(Method::PUT, &jane_uri, Some(&admin_token), Some(json!({"status": "DISABLED"})))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "DISABLED");

        let (status, body) = app.login("jane@example.com", PASSWORD).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Account is disabled");

        let admin_uri = format!("/api/users/{}", admin["id"].as_str().unwrap());
        let (status, _) = app.call(Method::DELETE, &admin_uri, Some(&admin_token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app.call(Method::DELETE, &jane_uri, Some(&admin_token), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = app.call(Method::DELETE, &jane_uri, Some(&admin_token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn address_book_crud_and_single_default() {
        let app = app();
        app.register("jane@example.com").await;
        let token = app.access_token("jane@example.com").await;

        let (status, body) = app
            .call(Method::POST, "/api/addresses", Some(&token), Some(address("home", true)))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let home_id = body["data"]["id"].as_str().unwrap().to_string();

        let (_, body) = app
            .call(Method::POST, "/api/addresses", Some(&token), Some(address("work", false)))
            .await;
        let work_id = body["data"]["id"].as_str().unwrap().to_string();

        for _ in 0..2 {
            let (status, body) = app
                .call(
                    Method::POST,
                    "/api/addresses/set-default",
                    Some(&token),
                    Some(json!({"addressId": work_id})),
                )
                .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["data"]["isDefault"], true);
        }

        let (status, body) = app.call(Method::GET, "/api/addresses", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let listed = body["data"].as_array().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0]["id"], work_id.as_str());
        assert_eq!(listed.iter().filter(|a| a["isDefault"] == true).count(), 1);

        let (status, _) = app
            .call(Method::DELETE, &format!("/api/addresses/{home_id}"), Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = app
            .call(Method::GET, &format!("/api/addresses/{home_id}"), Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn addresses_are_private_to_their_owner() {
        let app = app();
        app.register("jane@example.com").await;
        app.register("john@example.com").await;
        let jane = app.access_token("jane@example.com").await;
        let john = app.access_token("john@example.com").await;

        let (_, body) = app
            .call(Method::POST, "/api/addresses", Some(&jane), Some(address("home", true)))
            .await;
        let uri = format!("/api/addresses/{}", body["data"]["id"].as_str().unwrap());

        let (status, _) = app.call(Method::GET, &uri, Some(&john), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = app
            .call(Method::PUT, &uri, Some(&john), Some(address("mine now", false)))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app.call(Method::GET, "/api/addresses", Some(&john), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_address_fields_fail_validation() {
        let app = app();
        app.register("jane@example.com").await;
        let token = app.access_token("jane@example.com").await;

        let mut payload = address("home", false);
        payload["city"] = json!("   ");
        let (status, body) = app.call(Method::POST, "/api/addresses", Some(&token), Some(payload)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Validation failed");
        assert_eq!(body["errors"]["city"], "City is required");
    }
}
