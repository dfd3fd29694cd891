use std::io::Write;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::config::AppConfig;
use crate::feed::{self, fetch::HttpFetcher, EntryFilter};
use crate::telemetry::{self};
use crate::telemetry::ops::preview::Phase as PreviewPhase;
use crate::work_item::WorkItem;

/// rssfan preview: run one source through fetch/filter/render and print the
/// XML; nothing is queued or uploaded.
#[derive(Args)]
pub struct PreviewCmd {
    pub source: String,
    #[arg(long)] pub name: Option<String>,
    #[arg(long)] pub title: Option<String>,
    #[arg(long = "filter")] pub filters: Vec<String>,
}

#[derive(Serialize)]
struct PreviewResult {
    key: String,
    title: String,
    kept: usize,
    total: usize,
    xml: String,
}

pub async fn run(cfg: &AppConfig, args: PreviewCmd) -> Result<()> {
    let log = telemetry::preview();
    let _g = log.root_span_kv([("source", args.source.clone()), ("filters", args.filters.len().to_string())]).entered();

    let item = WorkItem {
        source: args.source,
        newfeedname: args.name,
        newfeedtitle: args.title,
        filter: if args.filters.is_empty() { None } else { Some(args.filters) },
    };

    let fetcher = HttpFetcher::new(cfg.fetch_timeout)?;
    let parsed = { let _s = log.span(&PreviewPhase::Parse).entered(); feed::load(&fetcher, &item.source).await? };
    let generated = {
        let _s = log.span(&PreviewPhase::Filter).entered();
        let filter = EntryFilter::compile(item.patterns())?;
        feed::generate(&parsed, &filter, item.title_override())?
    };
    let xml = { let _s = log.span(&PreviewPhase::Render).entered(); generated.render()? };
    let key = item.output_key(&generated.title);
    log.info(format!("🔎 {} → {} ({} of {} entries)", item.source, key, generated.kept(), generated.source_entries));

    if telemetry::config::json_mode() {
        let res = PreviewResult {
            key,
            title: generated.title.clone(),
            kept: generated.kept(),
            total: generated.source_entries,
            xml: String::from_utf8_lossy(&xml).into_owned(),
        };
        log.result(&item.source, &res)?;
    } else {
        let mut out = std::io::stdout();
        out.write_all(&xml)?;
        writeln!(out)?;
    }
    Ok(())
}
