//! Account lifecycle: registration, login, profile management.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument};
use validator::Validate;

use super::token_service::TokenService;
use crate::domain::entities::{
    Account, AccountPatch, AccountView, NewAccount, Role, normalize_email,
};
use crate::domain::repositories::AccountRepository;
use crate::error::AppError;
use crate::infrastructure::security::{hash_password, verify_password};

pub const DEFAULT_PAGE_LIMIT: usize = 10;
pub const MAX_PAGE_LIMIT: usize = 100;

/// Registration input. Name and email are trimmed (email lower-cased)
/// before validation.
#[derive(Debug, Clone, Validate)]
pub struct Registration {
    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, max = 128, message = "Password must be 6-128 characters"))]
    pub password: String,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Validate)]
pub struct Credentials {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Partial profile update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Validate)]
pub struct ProfileUpdate {
    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    pub role: Option<Role>,
}

/// A freshly issued token together with the account it was issued for.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub expires_in: u64,
    pub account: AccountView,
}

#[derive(Debug, Clone)]
pub struct AccountPage {
    pub accounts: Vec<AccountView>,
    pub total: u64,
    pub limit: usize,
    pub offset: usize,
}

/// Business operations on accounts.
///
/// Implemented by [`AccountManager`] and wrapped by
/// [`crate::application::services::CachedAccountService`], so handlers never
/// know whether caching is active.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountService: Send + Sync {
    async fn register(&self, registration: Registration) -> Result<AccountView, AppError>;

    /// Verifies credentials and issues a token.
    ///
    /// # Errors
    ///
    /// Unknown email and wrong password both yield [`AppError::InvalidCredentials`].
    async fn authenticate(&self, credentials: Credentials) -> Result<AuthSession, AppError>;

    async fn get_profile(&self, id: &str) -> Result<AccountView, AppError>;

    async fn update_profile(&self, id: &str, update: ProfileUpdate)
    -> Result<AccountView, AppError>;

    /// Lists accounts newest first. `limit <= 0` means the default page size;
    /// larger values are capped. Negative offsets are treated as zero.
    async fn list(&self, limit: i64, offset: i64) -> Result<AccountPage, AppError>;

    async fn get_by_id(&self, id: &str) -> Result<AccountView, AppError>;

    async fn delete(&self, id: &str) -> Result<(), AppError>;

    /// Issues a new token for an existing account. Older tokens stay valid.
    async fn refresh_token(&self, id: &str) -> Result<AuthSession, AppError>;
}

/// Clamps raw pagination input to `1..=MAX_PAGE_LIMIT` and a non-negative offset.
pub fn clamp_page(limit: i64, offset: i64) -> (usize, usize) {
    let limit = if limit <= 0 {
        DEFAULT_PAGE_LIMIT
    } else {
        (limit as u64).min(MAX_PAGE_LIMIT as u64) as usize
    };
    let offset = usize::try_from(offset.max(0)).unwrap_or(usize::MAX);
    (limit, offset)
}

fn blocking_failure(message: &str, e: impl std::fmt::Display) -> AppError {
    AppError::internal(message, json!({ "reason": e.to_string() }))
}

async fn hash_blocking(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| blocking_failure("Password hashing task failed", e))?
        .map_err(|e| blocking_failure("Failed to hash password", e))
}

async fn verify_blocking(password: String, hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| blocking_failure("Password verification task failed", e))?
        .map_err(|e| blocking_failure("Stored password hash is malformed", e))
}

/// Repository-backed [`AccountService`].
///
/// Validates input before touching the repository, hashes passwords with
/// Argon2id and issues tokens through the configured [`TokenService`].
pub struct AccountManager<R: AccountRepository + ?Sized> {
    repository: Arc<R>,
    tokens: Arc<dyn TokenService>,
}

impl<R: AccountRepository + ?Sized> AccountManager<R> {
    pub fn new(repository: Arc<R>, tokens: Arc<dyn TokenService>) -> Self {
        Self { repository, tokens }
    }

    fn session(&self, account: &Account) -> Result<AuthSession, AppError> {
        let token = self.tokens.issue(account)?;
        Ok(AuthSession {
            token,
            expires_in: self.tokens.lifetime().as_secs(),
            account: account.view(),
        })
    }
}

#[async_trait]
impl<R: AccountRepository + ?Sized> AccountService for AccountManager<R> {
    #[instrument(skip(self, registration), fields(component = "account_service"))]
    async fn register(&self, registration: Registration) -> Result<AccountView, AppError> {
        let registration = Registration {
            name: registration.name.trim().to_string(),
            email: normalize_email(&registration.email),
            ..registration
        };
        registration.validate()?;

        let password_hash = hash_blocking(registration.password).await?;

        let account = self
            .repository
            .create(NewAccount {
                name: registration.name,
                email: registration.email,
                password_hash,
                role: registration.role.unwrap_or_default(),
            })
            .await?;

        info!(account_id = %account.id, role = %account.role, "account registered");
        Ok(account.view())
    }

    #[instrument(skip(self, credentials), fields(component = "account_service"))]
    async fn authenticate(&self, credentials: Credentials) -> Result<AuthSession, AppError> {
        let credentials = Credentials {
            email: normalize_email(&credentials.email),
            ..credentials
        };
        credentials.validate()?;

        let account = match self.repository.get_by_email(&credentials.email).await {
            Ok(account) => account,
            Err(AppError::NotFound { .. }) => return Err(AppError::invalid_credentials()),
            Err(e) => return Err(e),
        };

        if !verify_blocking(credentials.password, account.password_hash.clone()).await? {
            return Err(AppError::invalid_credentials());
        }

        info!(account_id = %account.id, "account authenticated");
        self.session(&account)
    }

    async fn get_profile(&self, id: &str) -> Result<AccountView, AppError> {
        Ok(self.repository.get_by_id(id).await?.view())
    }

    #[instrument(skip(self, update), fields(component = "account_service"))]
    async fn update_profile(
        &self,
        id: &str,
        update: ProfileUpdate,
    ) -> Result<AccountView, AppError> {
        let update = ProfileUpdate {
            name: update.name.map(|n| n.trim().to_string()),
            email: update.email.map(|e| normalize_email(&e)),
            role: update.role,
        };
        update.validate()?;

        let account = self
            .repository
            .update(
                id,
                AccountPatch {
                    name: update.name,
                    email: update.email,
                    role: update.role,
                },
            )
            .await?;

        info!(account_id = %account.id, "profile updated");
        Ok(account.view())
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<AccountPage, AppError> {
        let (limit, offset) = clamp_page(limit, offset);

        let accounts = self.repository.list(limit, offset).await?;
        let total = self.repository.count().await?;

        Ok(AccountPage {
            accounts: accounts.iter().map(|a| a.view()).collect(),
            total,
            limit,
            offset,
        })
    }

    async fn get_by_id(&self, id: &str) -> Result<AccountView, AppError> {
        Ok(self.repository.get_by_id(id).await?.view())
    }

    #[instrument(skip(self), fields(component = "account_service"))]
    async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.repository.delete(id).await?;
        info!(account_id = %id, "account deleted");
        Ok(())
    }

    async fn refresh_token(&self, id: &str) -> Result<AuthSession, AppError> {
        let account = self.repository.get_by_id(id).await?;
        self.session(&account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::JwtTokenService;
    use crate::domain::repositories::MockAccountRepository;
    use chrono::Utc;
    use std::time::Duration;

    fn tokens() -> Arc<dyn TokenService> {
        Arc::new(JwtTokenService::new(
            b"0123456789abcdef0123456789abcdef",
            Duration::from_secs(60),
        ))
    }

    fn stored(id: &str, email: &str, password: &str) -> Account {
        let now = Utc::now();
        Account {
            id: id.to_string(),
            name: "Alice".to_string(),
            email: email.to_string(),
            password_hash: hash_password(password).unwrap(),
            role: Role::Standard,
            created_at: now,
            updated_at: now,
        }
    }

    fn registration(name: &str, email: &str, password: &str) -> Registration {
        Registration {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: None,
        }
    }

    #[test]
    fn test_clamp_page() {
        assert_eq!(clamp_page(0, 0), (DEFAULT_PAGE_LIMIT, 0));
        assert_eq!(clamp_page(-5, -3), (DEFAULT_PAGE_LIMIT, 0));
        assert_eq!(clamp_page(1000, 20), (MAX_PAGE_LIMIT, 20));
        assert_eq!(clamp_page(25, 5), (25, 5));
    }

    #[tokio::test]
    async fn test_register_normalizes_and_defaults_role() {
        let mut repo = MockAccountRepository::new();
        repo.expect_create()
            .withf(|new| {
                new.email == "alice@x.com"
                    && new.name == "Alice"
                    && new.role == Role::Standard
                    && new.password_hash.starts_with("$argon2id$")
            })
            .times(1)
            .returning(|new| {
                let now = Utc::now();
                Ok(Account {
                    id: "1".to_string(),
                    name: new.name,
                    email: new.email,
                    password_hash: new.password_hash,
                    role: new.role,
                    created_at: now,
                    updated_at: now,
                })
            });

        let service = AccountManager::new(Arc::new(repo), tokens());
        let view = service
            .register(registration("  Alice ", " Alice@X.com ", "secret12"))
            .await
            .unwrap();

        assert_eq!(view.email, "alice@x.com");
        assert_eq!(view.role, Role::Standard);
    }

    #[tokio::test]
    async fn test_invalid_registration_never_reaches_repository() {
        let mut repo = MockAccountRepository::new();
        repo.expect_create().never();
        let service = AccountManager::new(Arc::new(repo), tokens());

        for input in [
            registration("A", "alice@x.com", "secret12"),
            registration("Alice", "not-an-email", "secret12"),
            registration("Alice", "alice@x.com", "short"),
        ] {
            let err = service.register(input).await.unwrap_err();
            assert!(matches!(err, AppError::Validation { .. }));
        }
    }

    #[tokio::test]
    async fn test_unknown_email_and_wrong_password_are_indistinguishable() {
        let mut repo = MockAccountRepository::new();
        repo.expect_get_by_email()
            .withf(|email| email == "alice@x.com")
            .returning(|email| Ok(stored("1", email, "secret12")));
        repo.expect_get_by_email()
            .returning(|email| Err(AppError::not_found("User not found", json!({ "email": email }))));

        let service = AccountManager::new(Arc::new(repo), tokens());

        let wrong_password = service
            .authenticate(Credentials {
                email: "alice@x.com".to_string(),
                password: "nope-nope".to_string(),
            })
            .await
            .unwrap_err();
        let unknown_email = service
            .authenticate(Credentials {
                email: "bob@x.com".to_string(),
                password: "secret12".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(wrong_password.code(), "INVALID_CREDENTIALS");
        assert_eq!(unknown_email.code(), "INVALID_CREDENTIALS");
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn test_authenticate_issues_token_for_account() {
        let mut repo = MockAccountRepository::new();
        repo.expect_get_by_email()
            .returning(|email| Ok(stored("42", email, "secret12")));

        let tokens = tokens();
        let service = AccountManager::new(Arc::new(repo), Arc::clone(&tokens));

        let session = service
            .authenticate(Credentials {
                email: "ALICE@x.com".to_string(),
                password: "secret12".to_string(),
            })
            .await
            .unwrap();

        let claims = tokens.validate(&session.token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(session.account.id, "42");
        assert_eq!(session.expires_in, 60);
    }

    #[tokio::test]
    async fn test_list_clamps_before_repository_call() {
        let mut repo = MockAccountRepository::new();
        repo.expect_list()
            .withf(|limit, offset| *limit == MAX_PAGE_LIMIT && *offset == 0)
            .times(1)
            .returning(|_, _| Ok(Vec::new()));
        repo.expect_count().times(1).returning(|| Ok(0));

        let service = AccountManager::new(Arc::new(repo), tokens());
        let page = service.list(500, -1).await.unwrap();

        assert_eq!(page.limit, MAX_PAGE_LIMIT);
        assert_eq!(page.total, 0);
    }
}
