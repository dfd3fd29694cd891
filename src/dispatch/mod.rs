mod fanout;
pub mod types;

use std::time::Instant;

use anyhow::Result;
use clap::Args;
use sqlx::PgPool;

use crate::catalog::PgSourceCatalog;
use crate::config::AppConfig;
use crate::queue::PgWorkQueue;
use crate::telemetry::{self};
use crate::telemetry::ops::dispatch::Phase as DispatchPhase;

pub use fanout::{fan_out, Target};

/// rssfan dispatch: one work item per catalog record
#[derive(Args)]
pub struct DispatchCmd {
    #[arg(long, default_value_t = false)] pub apply: bool,
    #[arg(long, default_value_t = 10)] pub plan_limit: usize,
}

pub async fn run(pool: &PgPool, cfg: &AppConfig, args: DispatchCmd) -> Result<()> {
    let started = Instant::now();
    let log = telemetry::dispatch();
    let _g = log.root_span_kv([
        ("mode", if args.apply { "apply".to_string() } else { "plan".to_string() }),
        ("catalog", cfg.catalog.clone()),
        ("queue", cfg.dispatch_queue.clone()),
        ("page_size", cfg.page_size.to_string()),
    ]).entered();

    let catalog = PgSourceCatalog::new(pool.clone(), cfg.catalog.clone(), cfg.page_size);

    if !args.apply {
        let report = fan_out(&catalog, Target::Plan { sample_limit: args.plan_limit }).await?;
        let _p = log.span(&DispatchPhase::Plan).entered();
        log.info(format!(
            "📝 Dispatch plan — catalog={} queue={} records={} invalid={}",
            cfg.catalog, cfg.dispatch_queue, report.scanned, report.failed.len()
        ));
        for item in &report.sample { log.info(format!("  source={} name={:?} title={:?} filter={:?}", item.source, item.newfeedname, item.newfeedtitle, item.filter)); }
        if report.scanned > report.sample.len() + report.failed.len() {
            log.info(format!("  ... ({} more)", report.scanned - report.sample.len() - report.failed.len()));
        }
        log.info("   Use --apply to execute.");
        if telemetry::config::json_mode() {
            let plan = types::DispatchPlan {
                catalog: &cfg.catalog,
                queue: &cfg.dispatch_queue,
                records: report.scanned,
                invalid: report.failed.len(),
                sample: &report.sample,
            };
            log.plan(&cfg.catalog, &plan)?;
        }
        return Ok(());
    }

    let queue = PgWorkQueue::new(pool.clone());
    let report = fan_out(&catalog, Target::Queue { queue: &queue, name: &cfg.dispatch_queue }).await?;
    if telemetry::config::json_mode() {
        log.result_timed(&cfg.dispatch_queue, &report, started)?;
    }
    Ok(())
}
