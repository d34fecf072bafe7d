//! CLI administration tool for user-accounts.
//!
//! Provides commands for bootstrapping admin accounts, inspecting accounts,
//! purging the account cache and checking the database without going
//! through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Create an admin account
//! cargo run --bin admin -- account create --admin
//!
//! # Promote an existing account
//! cargo run --bin admin -- account promote alice@x.com
//!
//! # List accounts
//! cargo run --bin admin -- account list --limit 20
//!
//! # Drop every cached account projection
//! cargo run --bin admin -- cache purge
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Reads the same variables as the server. Account and database commands
//! need `DATABASE_URL` (or `DB_USER`/`DB_PASSWORD`/...), cache commands need
//! `CACHE_BACKEND=redis` and `REDIS_URL`.

use user_accounts::application::services::{
    AccountManager, AccountService, JwtTokenService, ProfileUpdate, Registration,
};
use user_accounts::config::{self, Config};
use user_accounts::domain::entities::{Role, normalize_email};
use user_accounts::domain::repositories::AccountRepository;
use user_accounts::infrastructure::cache::ACCOUNT_KEY_PATTERN;
use user_accounts::infrastructure::persistence::PgAccountRepository;
use user_accounts::server;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input, Password};
use std::sync::Arc;

/// CLI tool for managing user-accounts.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage accounts
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },

    /// Manage the account cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum AccountAction {
    /// Create an account
    Create {
        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        email: Option<String>,

        /// Grant the admin role
        #[arg(long)]
        admin: bool,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List accounts, newest first
    List {
        #[arg(short, long, default_value_t = 20)]
        limit: i64,

        #[arg(short, long, default_value_t = 0)]
        offset: i64,
    },

    /// Grant the admin role to an existing account
    Promote {
        /// Account email
        email: String,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Remove every cached account projection
    Purge,
}

#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_from_env()?;

    match cli.command {
        Commands::Account { action } => handle_account_action(action, &config).await?,
        Commands::Cache { action } => handle_cache_action(action, &config).await?,
        Commands::Db { action } => handle_db_action(action, &config).await?,
    }

    Ok(())
}

async fn connect_repository(config: &Config) -> Result<Arc<PgAccountRepository>> {
    let pool = server::connect_pool(config).await?;
    let repo = PgAccountRepository::new(Arc::new(pool), config.db_timeout())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to prepare accounts schema: {}", e))?;
    Ok(Arc::new(repo))
}

/// Dispatches account commands through the same service the API uses, so
/// validation and email normalization match.
async fn handle_account_action(action: AccountAction, config: &Config) -> Result<()> {
    let repo = connect_repository(config).await?;
    let tokens = Arc::new(JwtTokenService::new(
        config.jwt_secret.expose().as_bytes(),
        config.jwt_expiration(),
    ));
    let service = AccountManager::new(Arc::clone(&repo), tokens);

    match action {
        AccountAction::Create {
            name,
            email,
            admin,
            yes,
        } => create_account(&service, name, email, admin, yes).await?,
        AccountAction::List { limit, offset } => list_accounts(&service, limit, offset).await?,
        AccountAction::Promote { email } => promote_account(&service, repo.as_ref(), &email).await?,
    }

    Ok(())
}

/// Creates an account with interactive prompts.
///
/// # Flow
///
/// 1. Prompt for name and email (or use provided)
/// 2. Prompt for password twice
/// 3. Confirm creation (unless `--yes` flag)
/// 4. Register through [`AccountManager`]
async fn create_account(
    service: &AccountManager<PgAccountRepository>,
    name: Option<String>,
    email: Option<String>,
    admin: bool,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "👤 Create Account".bright_blue().bold());
    println!();

    let name = match name {
        Some(n) => n,
        None => Input::new().with_prompt("Name").interact_text()?,
    };

    let email = match email {
        Some(e) => e,
        None => Input::new().with_prompt("Email").interact_text()?,
    };

    let password = Password::new()
        .with_prompt("Password")
        .with_confirmation("Repeat password", "Passwords do not match")
        .interact()?;

    let role = if admin { Role::Admin } else { Role::Standard };

    println!();
    println!("{}", "Account details:".bright_white().bold());
    println!("  Name:  {}", name.cyan());
    println!("  Email: {}", email.cyan());
    println!("  Role:  {}", role.to_string().bright_yellow().bold());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this account?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let view = service
        .register(Registration {
            name,
            email,
            password,
            role: Some(role),
        })
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create account: {}", e))?;

    println!();
    println!("{}", "✅ Account created successfully!".green().bold());
    println!("  ID:    {}", view.id.bright_black());
    println!("  Email: {}", view.email.cyan());
    println!();

    Ok(())
}

/// Lists accounts, newest first.
///
/// # Output Format
///
/// ```text
/// 📋 Accounts
///
///   ID                                    Email                          Role       Created
///   ─────────────────────────────────────────────────────────────────────────────────────
///   1b4e28ba-2fa1-11d2-883f-0016d3cca427  alice@x.com                    admin      2024-01-15 10:30
/// ```
async fn list_accounts(
    service: &AccountManager<PgAccountRepository>,
    limit: i64,
    offset: i64,
) -> Result<()> {
    println!("{}", "📋 Accounts".bright_blue().bold());
    println!();

    let page = service
        .list(limit, offset)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list accounts: {}", e))?;

    if page.accounts.is_empty() {
        println!("{}", "  No accounts found".yellow());
        println!();
        println!(
            "  Create one with: {} admin account create --admin",
            "cargo run --bin".bright_cyan()
        );
        return Ok(());
    }

    println!(
        "  {:<37} {:<30} {:<10} {:<16}",
        "ID".bright_white().bold(),
        "Email".bright_white().bold(),
        "Role".bright_white().bold(),
        "Created".bright_white().bold()
    );
    println!("  {}", "─".repeat(96).bright_black());

    for account in &page.accounts {
        let role = match account.role {
            Role::Admin => account.role.to_string().yellow(),
            Role::Standard => account.role.to_string().normal(),
        };

        println!(
            "  {:<37} {:<30} {:<10} {}",
            account.id.bright_black(),
            account.email.cyan(),
            role,
            account
                .created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black()
        );
    }

    println!();
    println!(
        "  Showing {}-{} of {}",
        page.offset + 1,
        page.offset + page.accounts.len(),
        page.total.to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Grants the admin role after a confirmation prompt (default: No).
async fn promote_account(
    service: &AccountManager<PgAccountRepository>,
    repo: &PgAccountRepository,
    email: &str,
) -> Result<()> {
    println!("{}", "🔑 Promote Account".bright_blue().bold());
    println!();

    let account = repo
        .get_by_email(&normalize_email(email))
        .await
        .map_err(|e| anyhow::anyhow!("Account lookup failed: {}", e))?;

    if account.role == Role::Admin {
        println!("{}", "⚠️  This account is already an admin".yellow());
        return Ok(());
    }

    println!("  Account: {}", account.email.cyan());
    println!("  ID:      {}", account.id.bright_black());
    println!();

    let confirmed = Confirm::new()
        .with_prompt("Grant admin role?")
        .default(false)
        .interact()?;

    if !confirmed {
        println!("{}", "❌ Cancelled".red());
        return Ok(());
    }

    service
        .update_profile(
            &account.id,
            ProfileUpdate {
                role: Some(Role::Admin),
                ..Default::default()
            },
        )
        .await
        .map_err(|e| anyhow::anyhow!("Failed to promote account: {}", e))?;

    println!();
    println!("{}", "✅ Account promoted!".green().bold());
    println!(
        "  {}",
        "Existing tokens keep the old role until they expire.".bright_black()
    );
    println!();

    Ok(())
}

async fn handle_cache_action(action: CacheAction, config: &Config) -> Result<()> {
    match action {
        CacheAction::Purge => {
            println!("{}", "🧹 Purge Account Cache".bright_blue().bold());
            println!();

            let cache = server::build_cache(config)
                .await
                .context("No cache backend is reachable (check CACHE_BACKEND / REDIS_URL)")?;

            let removed = cache
                .invalidate_pattern(ACCOUNT_KEY_PATTERN)
                .await
                .map_err(|e| anyhow::anyhow!("Cache purge failed: {}", e))?;

            println!(
                "  Removed {} entries from {}",
                removed.to_string().bright_white().bold(),
                cache.backend().cyan()
            );
            println!();
        }
    }

    Ok(())
}

async fn handle_db_action(action: DbAction, config: &Config) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            let pool = server::connect_pool(config).await?;
            let one: i32 = sqlx::query_scalar("SELECT 1").fetch_one(&pool).await?;

            if one == 1 {
                println!("{}", "✅ Database connection OK".green().bold());
            }

            let accounts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
                .fetch_one(&pool)
                .await
                .unwrap_or(0);

            println!("  Accounts: {}", accounts.to_string().bright_white());
            println!();
        }
    }

    Ok(())
}
