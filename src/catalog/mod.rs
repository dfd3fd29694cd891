use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use sqlx::PgPool;

pub(crate) mod db;

/// One catalog row. `source` stays optional because rows are operator-edited
/// and a malformed one must be rejected per record, not at scan time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceRecord {
    pub source_id: i64,
    pub source: Option<String>,
    pub newfeedname: Option<String>,
    pub newfeedtitle: Option<String>,
    pub filter: Option<Vec<String>>,
}

/// Continuation token: the last `source_id` of the previous page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageToken(pub i64);

#[derive(Debug, Clone, Default)]
pub struct CatalogPage {
    pub records: Vec<SourceRecord>,
    pub next: Option<PageToken>,
}

#[async_trait]
pub trait SourceCatalog: Send + Sync {
    async fn scan_page(&self, token: Option<PageToken>) -> Result<CatalogPage>;
}

pub struct PgSourceCatalog {
    pool: PgPool,
    catalog: String,
    page_size: i64,
}

impl PgSourceCatalog {
    pub fn new(pool: PgPool, catalog: impl Into<String>, page_size: i64) -> Self {
        Self { pool, catalog: catalog.into(), page_size: page_size.max(1) }
    }
}

#[async_trait]
impl SourceCatalog for PgSourceCatalog {
    async fn scan_page(&self, token: Option<PageToken>) -> Result<CatalogPage> {
        let after = token.map(|t| t.0);
        // one extra row tells us whether another page exists
        let mut records = db::scan_sources(&self.pool, &self.catalog, after, self.page_size.saturating_add(1))
            .await
            .with_context(|| format!("scan catalog={} after={:?}", self.catalog, after))?;
        let next = if records.len() as i64 > self.page_size {
            records.truncate(self.page_size as usize);
            records.last().map(|r| PageToken(r.source_id))
        } else {
            None
        };
        Ok(CatalogPage { records, next })
    }
}
