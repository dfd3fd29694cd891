use anyhow::{Context, Result};
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::telemetry::{self};
use crate::telemetry::ops::init::Phase as InitPhase;

pub async fn connect(dsn: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(dsn)
        .await
        .context("connect to Postgres")?;
    Ok(pool)
}

/// Create the catalog and queue tables (idempotent).
pub async fn run(pool: &PgPool) -> Result<()> {
    let log = telemetry::init();
    let _g = log.root_span().entered();
    {
        let _s = log.span(&InitPhase::Connect).entered();
        sqlx::query("SELECT 1").execute(pool).await.context("database not reachable")?;
    }
    let _s = log.span(&InitPhase::Migrate).entered();
    sqlx::migrate!().run(pool).await?;
    log.info("✅ Database initialized");
    Ok(())
}
