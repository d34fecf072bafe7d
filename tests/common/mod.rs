#![allow(dead_code)]

use axum_test::TestServer;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use user_accounts::application::services::{
    AccountManager, AccountService, JwtTokenService, Registration, TokenService,
};
use user_accounts::domain::entities::{Account, AccountView, Role};
use user_accounts::domain::repositories::AccountRepository;
use user_accounts::infrastructure::cache::{CacheService, MemoryCache};
use user_accounts::infrastructure::persistence::MemoryAccountRepository;
use user_accounts::routes;
use user_accounts::state::AppState;

pub const TEST_SECRET: &[u8] = b"test-signing-secret-0123456789abcdef";

pub fn token_service() -> Arc<JwtTokenService> {
    Arc::new(JwtTokenService::new(TEST_SECRET, Duration::from_secs(3600)))
}

/// Uncached state over a fresh in-memory repository.
pub fn create_test_state() -> AppState {
    let repository: Arc<dyn AccountRepository> = Arc::new(MemoryAccountRepository::new());
    AppState::new(repository, token_service())
}

/// State with the in-memory cache attached.
pub fn create_cached_test_state() -> (AppState, Arc<MemoryCache>) {
    let cache = Arc::new(MemoryCache::new(Duration::from_secs(60)));
    let state = create_test_state().with_cache(
        Arc::clone(&cache) as Arc<dyn CacheService>,
        Duration::from_secs(60),
        2,
    );
    (state, cache)
}

pub fn test_server(state: AppState) -> TestServer {
    TestServer::new(routes::router(state)).unwrap()
}

/// Registers an account directly through the service, bypassing HTTP.
pub async fn seed_account(state: &AppState, name: &str, email: &str, role: Role) -> AccountView {
    let manager = AccountManager::new(
        Arc::clone(&state.repository),
        Arc::clone(&state.tokens),
    );
    manager
        .register(Registration {
            name: name.to_string(),
            email: email.to_string(),
            password: "secret12".to_string(),
            role: Some(role),
        })
        .await
        .unwrap()
}

pub async fn login(server: &TestServer, email: &str, password: &str) -> String {
    let response = server
        .post("/auth/login")
        .json(&json!({ "email": email, "password": password }))
        .await;
    response.assert_status_ok();
    response.json::<Value>()["token"]
        .as_str()
        .unwrap()
        .to_string()
}

pub fn token_for(state: &AppState, account: &AccountView, role: Role) -> String {
    let now = chrono::Utc::now();
    state
        .tokens
        .issue(&Account {
            id: account.id.clone(),
            name: account.name.clone(),
            email: account.email.clone(),
            password_hash: String::new(),
            role,
            created_at: now,
            updated_at: now,
        })
        .unwrap()
}
