//! PostgreSQL implementation of the account repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{FromRow, PgPool};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::domain::entities::{Account, AccountPatch, NewAccount, Role};
use crate::domain::repositories::AccountRepository;
use crate::error::{AppError, map_sqlx_error};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS accounts (
        id            TEXT PRIMARY KEY,
        name          TEXT NOT NULL,
        email         TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        role          TEXT NOT NULL DEFAULT 'standard',
        created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

const CREATE_EMAIL_INDEX: &str =
    "CREATE UNIQUE INDEX IF NOT EXISTS accounts_email_key ON accounts (email)";

const CREATE_LISTING_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS accounts_created_at_idx ON accounts (created_at DESC, id)";

#[derive(FromRow)]
struct AccountRow {
    id: String,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = AppError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let role = row.role.parse::<Role>().map_err(|reason| {
            AppError::internal(
                "Stored account has an unknown role",
                json!({ "id": row.id, "reason": reason }),
            )
        })?;

        Ok(Account {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// PostgreSQL repository for user accounts.
///
/// Every statement is bounded by `op_timeout`; an expired deadline surfaces as
/// [`AppError::Timeout`]. Uniqueness of `email` is enforced by a unique index
/// and translated into [`AppError::AlreadyExists`].
pub struct PgAccountRepository {
    pool: Arc<PgPool>,
    op_timeout: Duration,
}

impl PgAccountRepository {
    /// Creates the repository and ensures the `accounts` table and its
    /// indexes exist.
    pub async fn new(pool: Arc<PgPool>, op_timeout: Duration) -> Result<Self, AppError> {
        let repo = Self { pool, op_timeout };
        repo.ensure_schema().await?;
        Ok(repo)
    }

    async fn ensure_schema(&self) -> Result<(), AppError> {
        for statement in [CREATE_TABLE, CREATE_EMAIL_INDEX, CREATE_LISTING_INDEX] {
            self.bounded("ensure_schema", async {
                sqlx::query(statement).execute(self.pool.as_ref()).await
            })
            .await?;
        }

        tracing::debug!(component = "pg_repository", "accounts schema ensured");
        Ok(())
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(result) => result.map_err(map_sqlx_error),
            Err(_) => {
                tracing::warn!(
                    component = "pg_repository",
                    operation,
                    timeout_ms = self.op_timeout.as_millis() as u64,
                    "database operation timed out"
                );
                Err(AppError::timeout(
                    "Database operation timed out",
                    json!({ "operation": operation }),
                ))
            }
        }
    }
}

fn not_found(id: &str) -> AppError {
    AppError::not_found("User not found", json!({ "id": id }))
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    #[tracing::instrument(skip(self, new_account), fields(component = "pg_repository"))]
    async fn create(&self, new_account: NewAccount) -> Result<Account, AppError> {
        let id = Uuid::new_v4().to_string();

        let row = self
            .bounded("create", async {
                sqlx::query_as::<_, AccountRow>(
                    r#"
                    INSERT INTO accounts (id, name, email, password_hash, role)
                    VALUES ($1, $2, $3, $4, $5)
                    RETURNING id, name, email, password_hash, role, created_at, updated_at
                    "#,
                )
                .bind(&id)
                .bind(&new_account.name)
                .bind(&new_account.email)
                .bind(&new_account.password_hash)
                .bind(new_account.role.as_str())
                .fetch_one(self.pool.as_ref())
                .await
            })
            .await?;

        row.try_into()
    }

    async fn get_by_id(&self, id: &str) -> Result<Account, AppError> {
        let row = self
            .bounded("get_by_id", async {
                sqlx::query_as::<_, AccountRow>(
                    r#"
                    SELECT id, name, email, password_hash, role, created_at, updated_at
                    FROM accounts
                    WHERE id = $1
                    "#,
                )
                .bind(id)
                .fetch_optional(self.pool.as_ref())
                .await
            })
            .await?;

        row.ok_or_else(|| not_found(id))?.try_into()
    }

    async fn get_by_email(&self, email: &str) -> Result<Account, AppError> {
        let row = self
            .bounded("get_by_email", async {
                sqlx::query_as::<_, AccountRow>(
                    r#"
                    SELECT id, name, email, password_hash, role, created_at, updated_at
                    FROM accounts
                    WHERE email = $1
                    "#,
                )
                .bind(email)
                .fetch_optional(self.pool.as_ref())
                .await
            })
            .await?;

        row.ok_or_else(|| AppError::not_found("User not found", json!({ "email": email })))?
            .try_into()
    }

    #[tracing::instrument(skip(self, patch), fields(component = "pg_repository"))]
    async fn update(&self, id: &str, patch: AccountPatch) -> Result<Account, AppError> {
        let row = self
            .bounded("update", async {
                sqlx::query_as::<_, AccountRow>(
                    r#"
                    UPDATE accounts
                    SET name = COALESCE($2, name),
                        email = COALESCE($3, email),
                        role = COALESCE($4, role),
                        updated_at = NOW()
                    WHERE id = $1
                    RETURNING id, name, email, password_hash, role, created_at, updated_at
                    "#,
                )
                .bind(id)
                .bind(patch.name.as_deref())
                .bind(patch.email.as_deref())
                .bind(patch.role.map(|r| r.as_str()))
                .fetch_optional(self.pool.as_ref())
                .await
            })
            .await?;

        row.ok_or_else(|| not_found(id))?.try_into()
    }

    #[tracing::instrument(skip(self), fields(component = "pg_repository"))]
    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = self
            .bounded("delete", async {
                sqlx::query("DELETE FROM accounts WHERE id = $1")
                    .bind(id)
                    .execute(self.pool.as_ref())
                    .await
            })
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }

        Ok(())
    }

    async fn list(&self, limit: usize, offset: usize) -> Result<Vec<Account>, AppError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);

        let rows = self
            .bounded("list", async {
                sqlx::query_as::<_, AccountRow>(
                    r#"
                    SELECT id, name, email, password_hash, role, created_at, updated_at
                    FROM accounts
                    ORDER BY created_at DESC, id ASC
                    LIMIT $1 OFFSET $2
                    "#,
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(self.pool.as_ref())
                .await
            })
            .await?;

        rows.into_iter().map(Account::try_from).collect()
    }

    async fn count(&self) -> Result<u64, AppError> {
        let total: i64 = self
            .bounded("count", async {
                sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
                    .fetch_one(self.pool.as_ref())
                    .await
            })
            .await?;

        Ok(total.max(0) as u64)
    }
}
