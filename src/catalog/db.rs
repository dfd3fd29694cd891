use anyhow::Result;
use sqlx::{postgres::PgRow, PgPool, Row};

use super::SourceRecord;

fn to_record(row: &PgRow) -> SourceRecord {
    SourceRecord {
        source_id: row.get("source_id"),
        source: row.get("source"),
        newfeedname: row.get("newfeedname"),
        newfeedtitle: row.get("newfeedtitle"),
        filter: row.get("filter"),
    }
}

// Keyset page over one catalog, ordered by source_id.
pub async fn scan_sources(pool: &PgPool, catalog: &str, after: Option<i64>, limit: i64) -> Result<Vec<SourceRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT source_id, source, newfeedname, newfeedtitle, filter
        FROM rssfan.source
        WHERE catalog = $1
          AND ($2::bigint IS NULL OR source_id > $2)
        ORDER BY source_id
        LIMIT $3
        "#,
    )
    .bind(catalog)
    .bind(after)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows.iter().map(to_record).collect())
}

pub async fn upsert_source(
    pool: &PgPool,
    catalog: &str,
    source: &str,
    newfeedname: Option<&str>,
    newfeedtitle: Option<&str>,
    filter: Option<&[String]>,
) -> Result<bool> {
    let row = sqlx::query(
        r#"
        INSERT INTO rssfan.source (catalog, source, newfeedname, newfeedtitle, filter)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (catalog, source)
        DO UPDATE SET newfeedname = EXCLUDED.newfeedname,
                      newfeedtitle = EXCLUDED.newfeedtitle,
                      filter = EXCLUDED.filter
        RETURNING (xmax = 0) AS inserted
        "#,
    )
    .bind(catalog)
    .bind(source)
    .bind(newfeedname)
    .bind(newfeedtitle)
    .bind(filter)
    .fetch_one(pool)
    .await?;
    Ok(row.get::<bool, _>("inserted"))
}

pub async fn remove_source(pool: &PgPool, catalog: &str, source: &str) -> Result<bool> {
    let res = sqlx::query("DELETE FROM rssfan.source WHERE catalog = $1 AND source = $2")
        .bind(catalog)
        .bind(source)
        .execute(pool)
        .await?;
    Ok(res.rows_affected() == 1)
}

pub async fn list_sources(pool: &PgPool, catalog: &str) -> Result<Vec<SourceRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT source_id, source, newfeedname, newfeedtitle, filter
        FROM rssfan.source
        WHERE catalog = $1
        ORDER BY source_id
        "#,
    )
    .bind(catalog)
    .fetch_all(pool)
    .await?;
    Ok(rows.iter().map(to_record).collect())
}
