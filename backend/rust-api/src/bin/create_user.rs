// Create a user or reset an existing user's password.
// Usage: cargo run --bin create_user -- <username> --password <password>

use bcrypt::{hash, DEFAULT_COST};
use clap::Parser;
use uuid::Uuid;

use ledger_api::{database, Config};

#[derive(Parser)]
#[command(about = "Create a ledger API user or reset its password")]
struct Args {
    username: String,

    #[arg(long, env = "LEDGER_USER_PASSWORD")]
    password: String,

    /// Deactivate instead of (re)activating the account
    #[arg(long)]
    inactive: bool,
}

const MIN_PASSWORD_LEN: usize = 8;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let username = args.username.trim();
    if username.is_empty() {
        anyhow::bail!("username must not be blank");
    }
    if args.password.len() < MIN_PASSWORD_LEN {
        anyhow::bail!("password must be at least {} characters", MIN_PASSWORD_LEN);
    }

    let config = Config::from_env()?;
    let pool = database::create_pool(&config.database_url).await?;
    database::run_migrations(&pool).await?;

    let password_hash = hash(&args.password, DEFAULT_COST)?;
    let is_active = !args.inactive;

    let created: bool = sqlx::query_scalar(
        "INSERT INTO users (id, username, password_hash, is_active)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (username) DO UPDATE SET password_hash = EXCLUDED.password_hash, is_active = EXCLUDED.is_active
         RETURNING (xmax = 0)",
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(&password_hash)
    .bind(is_active)
    .fetch_one(&pool)
    .await?;

    if created {
        println!("User created: {}", username);
    } else {
        println!("Password updated for user: {}", username);
    }
    if !is_active {
        println!("Account is inactive and cannot log in.");
    }

    Ok(())
}
