use anyhow::{Context, Result};

use crate::catalog::{PageToken, SourceCatalog, SourceRecord};
use crate::queue::WorkQueue;
use crate::telemetry::{self};
use crate::telemetry::ops::dispatch::Phase as DispatchPhase;
use crate::work_item::WorkItem;

use super::types::{DispatchReport, RecordFailure};

/// Where built work items go. `Plan` only validates and samples them.
pub enum Target<'a> {
    Plan { sample_limit: usize },
    Queue { queue: &'a dyn WorkQueue, name: &'a str },
}

/// Scan the whole catalog page by page and turn every record into a queued
/// work item. A page read error aborts the run; anything that goes wrong
/// with a single record is logged, counted and skipped.
pub async fn fan_out(catalog: &dyn SourceCatalog, target: Target<'_>) -> Result<DispatchReport> {
    let log = telemetry::dispatch();
    let mut report = DispatchReport::default();
    let mut token: Option<PageToken> = None;

    loop {
        let page = {
            let _s = log.span_kv(&DispatchPhase::ScanPage, [("token", format!("{:?}", token.map(|t| t.0)))]).entered();
            catalog
                .scan_page(token)
                .await
                .with_context(|| format!("catalog page {} (token={:?})", report.pages + 1, token))?
        };
        report.pages += 1;

        for rec in &page.records {
            report.scanned += 1;
            let _r = log.span(&DispatchPhase::Record).entered();
            log.debug_kv("record", [("source_id", rec.source_id.to_string()), ("source", format!("{:?}", rec.source))]);
            match dispatch_record(rec, &target).await {
                Ok(Some(item)) => {
                    if let Target::Plan { sample_limit } = &target {
                        if report.sample.len() < *sample_limit { report.sample.push(item); }
                    }
                }
                Ok(None) => report.enqueued += 1,
                Err(e) => {
                    log.error(format!("⚠️ record {} skipped: {e:#} (record={:?})", rec.source_id, rec));
                    report.failed.push(RecordFailure { source_id: rec.source_id, source: rec.source.clone(), error: format!("{e:#}") });
                }
            }
        }

        match page.next {
            Some(next) => token = Some(next),
            None => break,
        }
    }

    log.totals(report.pages, report.scanned, report.enqueued, report.failed.len());
    Ok(report)
}

// Ok(Some(item)) in plan mode, Ok(None) once published.
async fn dispatch_record(rec: &SourceRecord, target: &Target<'_>) -> Result<Option<WorkItem>> {
    let item = WorkItem::from_record(rec)?;
    let body = item.to_body().context("serialize work item")?;
    match target {
        Target::Plan { .. } => Ok(Some(item)),
        Target::Queue { queue, name } => {
            let _p = telemetry::dispatch().span(&DispatchPhase::Publish).entered();
            let message_id = queue.publish(name, body).await?;
            tracing::debug!(source_id = rec.source_id, message_id = %message_id, queue = %name, "enqueued");
            Ok(None)
        }
    }
}
