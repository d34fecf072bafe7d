//! In-process implementation of the account repository.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use serde_json::json;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::domain::entities::{Account, AccountPatch, NewAccount};
use crate::domain::repositories::AccountRepository;
use crate::error::AppError;

/// Both indices live behind a single lock so they can never diverge.
#[derive(Default)]
struct Tables {
    accounts: HashMap<String, Account>,
    by_email: HashMap<String, String>,
    next_id: u64,
}

/// In-memory account repository.
///
/// Accounts are keyed by id with a secondary email → id index. Reads take the
/// shared lock, writes the exclusive one; the lock is only held for map
/// access and never across an `.await`. Identifiers are assigned from a
/// monotonically increasing counter starting at 1.
pub struct MemoryAccountRepository {
    tables: RwLock<Tables>,
}

impl MemoryAccountRepository {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables {
                next_id: 1,
                ..Default::default()
            }),
        }
    }
}

impl Default for MemoryAccountRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found(id: &str) -> AppError {
    AppError::not_found("User not found", json!({ "id": id }))
}

fn email_taken(email: &str) -> AppError {
    AppError::already_exists(
        "User with this email already exists",
        json!({ "email": email }),
    )
}

/// Orders ids numerically when both are integers, lexically otherwise.
fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

#[async_trait]
impl AccountRepository for MemoryAccountRepository {
    async fn create(&self, new_account: NewAccount) -> Result<Account, AppError> {
        let mut tables = self.tables.write();

        if tables.by_email.contains_key(&new_account.email) {
            return Err(email_taken(&new_account.email));
        }

        let id = tables.next_id.to_string();
        tables.next_id += 1;

        let now = Utc::now();
        let account = Account {
            id: id.clone(),
            name: new_account.name,
            email: new_account.email,
            password_hash: new_account.password_hash,
            role: new_account.role,
            created_at: now,
            updated_at: now,
        };

        tables.by_email.insert(account.email.clone(), id.clone());
        tables.accounts.insert(id, account.clone());

        Ok(account)
    }

    async fn get_by_id(&self, id: &str) -> Result<Account, AppError> {
        self.tables
            .read()
            .accounts
            .get(id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    async fn get_by_email(&self, email: &str) -> Result<Account, AppError> {
        let tables = self.tables.read();
        tables
            .by_email
            .get(email)
            .and_then(|id| tables.accounts.get(id))
            .cloned()
            .ok_or_else(|| AppError::not_found("User not found", json!({ "email": email })))
    }

    async fn update(&self, id: &str, patch: AccountPatch) -> Result<Account, AppError> {
        let mut tables = self.tables.write();

        let current_email = match tables.accounts.get(id) {
            Some(existing) => existing.email.clone(),
            None => return Err(not_found(id)),
        };

        if let Some(new_email) = &patch.email
            && *new_email != current_email
        {
            if tables.by_email.contains_key(new_email) {
                return Err(email_taken(new_email));
            }
            tables.by_email.remove(&current_email);
            tables.by_email.insert(new_email.clone(), id.to_string());
        }

        let account = tables
            .accounts
            .get_mut(id)
            .ok_or_else(|| not_found(id))?;
        patch.apply_to(account);
        account.updated_at = Utc::now();

        Ok(account.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let mut tables = self.tables.write();

        let account = tables.accounts.remove(id).ok_or_else(|| not_found(id))?;
        tables.by_email.remove(&account.email);

        Ok(())
    }

    async fn list(&self, limit: usize, offset: usize) -> Result<Vec<Account>, AppError> {
        let mut accounts: Vec<Account> = self.tables.read().accounts.values().cloned().collect();

        accounts.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| compare_ids(&a.id, &b.id))
        });

        Ok(accounts.into_iter().skip(offset).take(limit).collect())
    }

    async fn count(&self) -> Result<u64, AppError> {
        Ok(self.tables.read().accounts.len() as u64)
    }
}
