use sqlx::PgPool;
use std::sync::Arc;

pub type DatabasePool = Arc<PgPool>;

pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    // TLS follows the sslmode in DATABASE_URL.
    let pool = PgPool::connect(database_url).await?;

    if !database_url.contains("sslmode=") && !database_url.contains("localhost") && !database_url.contains("127.0.0.1") {
        tracing::warn!("Connecting to remote database without explicit sslmode. Consider adding sslmode=require");
    }

    Ok(pool)
}

pub async fn new_pool(database_url: &str) -> anyhow::Result<DatabasePool> {
    let pool = create_pool(database_url).await?;
    run_migrations(&pool).await?;
    Ok(Arc::new(pool))
}

pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}
