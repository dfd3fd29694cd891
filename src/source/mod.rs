use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use sqlx::PgPool;
use url::Url;

use crate::catalog::db;
use crate::config::AppConfig;
use crate::feed::EntryFilter;
use crate::telemetry::{self};
use crate::telemetry::ops::source::Phase as SourcePhase;

pub mod types;

/// rssfan source add/rm/ls
#[derive(Args)]
pub struct SourceCmd {
    #[command(subcommand)]
    pub cmd: SourceSub,
}

#[derive(Subcommand)]
pub enum SourceSub {
    // add or update a source (plan-only by default; use --apply to write)
    Add {
        source: String,
        /// Output key becomes feed/<name>
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        title: Option<String>,
        /// Regex matched against entry descriptions; repeatable
        #[arg(long = "filter")]
        filters: Vec<String>,
        #[arg(long, default_value_t = false)]
        apply: bool,
    },
    // remove a source
    Rm {
        source: String,
        #[arg(long, default_value_t = false)]
        apply: bool,
    },
    // list sources in the configured catalog
    Ls,
}

pub async fn run(pool: &PgPool, cfg: &AppConfig, args: SourceCmd) -> Result<()> {
    let log = telemetry::source();
    let _g = log.root_span_kv([("catalog", cfg.catalog.clone())]).entered();
    match args.cmd {
        SourceSub::Add { source, name, title, filters, apply } => {
            let add = types::SourceAdd { catalog: cfg.catalog.clone(), source, name, title, filter: filters };
            add_source(pool, add, apply).await?
        }
        SourceSub::Rm { source, apply } => rm_source(pool, &cfg.catalog, source, apply).await?,
        SourceSub::Ls => ls_sources(pool, &cfg.catalog).await?,
    }
    Ok(())
}

/// Sources are URLs or local paths; filters must compile.
pub fn validate(add: &types::SourceAdd) -> Result<()> {
    let looks_like_url = add.source.contains("://");
    if looks_like_url && Url::parse(&add.source).is_err() { bail!("Invalid URL: {}", add.source); }
    if add.source.trim().is_empty() { bail!("source must not be empty"); }
    EntryFilter::compile(&add.filter)?;
    Ok(())
}

async fn add_source(pool: &PgPool, add: types::SourceAdd, apply: bool) -> Result<()> {
    let log = telemetry::source();
    let _g = log.root_span_kv([
        ("mode", if apply { "apply".to_string() } else { "plan".to_string() }),
        ("source", add.source.clone()),
        ("name", format!("{:?}", add.name)),
        ("filters", add.filter.len().to_string()),
    ]).entered();

    // friendly error before DB I/O
    validate(&add)?;

    if !apply {
        let _s = log.span(&SourcePhase::Plan).entered();
        log.info(format!("📝 Source plan — add source={} name={:?} title={:?} filter={:?}", add.source, add.name, add.title, add.filter));
        log.info("   Use --apply to execute.");
        if telemetry::config::json_mode() {
            let plan = types::SourceAddPlan { action: "add", source: &add };
            log.plan(&add.catalog, &plan)?;
        }
        return Ok(());
    }
    let _s = log.span(&SourcePhase::Add).entered();
    let filter = if add.filter.is_empty() { None } else { Some(add.filter.as_slice()) };
    let inserted = db::upsert_source(pool, &add.catalog, &add.source, add.name.as_deref(), add.title.as_deref(), filter).await?;
    if inserted { log.info("➕ Source added"); } else { log.info("♻️ Source updated"); }
    if telemetry::config::json_mode() {
        let result = types::SourceAddResult { inserted, source: add.source };
        log.result(&add.catalog, &result)?;
    }
    Ok(())
}

async fn rm_source(pool: &PgPool, catalog: &str, source: String, apply: bool) -> Result<()> {
    let log = telemetry::source();
    if !apply {
        let _s = log.span(&SourcePhase::Plan).entered();
        log.info(format!("📝 Source plan — remove source={} from catalog={}", source, catalog));
        log.info("   Use --apply to execute.");
        return Ok(());
    }
    let _s = log.span(&SourcePhase::Remove).entered();
    let removed = db::remove_source(pool, catalog, &source).await?;
    if removed { log.info(format!("🗑️ Source removed: {source}")); } else { log.warn(format!("Source not found: {source}")); }
    if telemetry::config::json_mode() {
        let result = types::SourceRmResult { removed, source };
        log.result(catalog, &result)?;
    }
    Ok(())
}

async fn ls_sources(pool: &PgPool, catalog: &str) -> Result<()> {
    let log = telemetry::source();
    let _s = log.span(&SourcePhase::List).entered();
    let sources = db::list_sources(pool, catalog).await?;
    log.info(format!("📡 Sources in {catalog}:"));
    for row in &sources {
        log.info(format!(
            "[{}] {} name={:?} title={:?} filter={:?}",
            row.source_id, row.source.as_deref().unwrap_or("<missing>"), row.newfeedname, row.newfeedtitle, row.filter
        ));
    }
    if telemetry::config::json_mode() {
        let list = types::SourceList { sources };
        log.result(catalog, &list)?;
    }
    Ok(())
}
