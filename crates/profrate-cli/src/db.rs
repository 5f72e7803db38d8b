//! Database maintenance commands.

use profrate_core::AppConfig;

pub(crate) async fn connect(config: &AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = profrate_db::PoolConfig::from_app_config(config);
    let pool = profrate_db::connect_pool(&config.database_url, pool_config).await?;
    Ok(pool)
}

pub(crate) async fn migrate(config: &AppConfig) -> anyhow::Result<()> {
    let pool = connect(config).await?;
    profrate_db::run_migrations(&pool).await?;
    tracing::info!("migrations applied");
    println!("migrations applied");
    Ok(())
}

pub(crate) async fn stats(config: &AppConfig) -> anyhow::Result<()> {
    let pool = connect(config).await?;
    let stats = profrate_db::professor_stats(&pool).await?;

    let report = serde_json::json!({
        "total": stats.total,
        "with_ratings": stats.with_ratings,
        "from_remote": stats.from_remote,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
