mod handler;
mod publish;
pub mod types;

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Args;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;
use crate::feed::fetch::HttpFetcher;
use crate::queue::{PgWorkQueue, WorkQueue};
use crate::telemetry::{self};
use crate::telemetry::ops::process::Phase as ProcessPhase;

pub use handler::FeedProcessor;
use types::BatchReport;

/// rssfan process: consume work items from the channel queue
#[derive(Args)]
pub struct ProcessCmd {
    #[arg(long, default_value_t = 10)] pub batch: usize,
    #[arg(long, default_value_t = 300)] pub visibility_secs: u64,
    /// Keep polling until Ctrl-C instead of handling a single batch
    #[arg(long, default_value_t = false)] pub follow: bool,
    #[arg(long, default_value_t = 2000)] pub poll_ms: u64,
}

#[derive(Clone, Copy, Debug)]
pub struct PollOptions {
    pub batch: usize,
    pub visibility: Duration,
    pub follow: bool,
    pub poll: Duration,
}

impl From<&ProcessCmd> for PollOptions {
    fn from(args: &ProcessCmd) -> Self {
        PollOptions {
            batch: args.batch.max(1),
            visibility: Duration::from_secs(args.visibility_secs),
            follow: args.follow,
            poll: Duration::from_millis(args.poll_ms),
        }
    }
}

pub async fn run(pool: &PgPool, cfg: &AppConfig, args: ProcessCmd) -> Result<()> {
    let started = Instant::now();
    let log = telemetry::process();
    let _g = log.root_span_kv([
        ("queue", cfg.channel_queue.clone()),
        ("blob", format!("{:?}:{}", cfg.blob_backend, cfg.blob_bucket)),
        ("batch", args.batch.to_string()),
        ("follow", args.follow.to_string()),
    ]).entered();

    let queue: Arc<dyn WorkQueue> = Arc::new(PgWorkQueue::new(pool.clone()));
    let fetcher = Arc::new(HttpFetcher::new(cfg.fetch_timeout)?);
    let blob = cfg.blob_store().await?;
    let processor = FeedProcessor::new(fetcher, blob, queue.clone(), cfg.channel_queue.clone());

    let ct = CancellationToken::new();
    if args.follow {
        let ct = ct.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() { ct.cancel(); }
        });
    }

    let report = poll_loop(queue.as_ref(), &processor, PollOptions::from(&args), &ct).await?;
    if telemetry::config::json_mode() {
        log.result_timed(&cfg.channel_queue, &report, started)?;
    }
    Ok(())
}

/// Receive and handle batches. Without `follow` a single receive is made;
/// with it, empty polls sleep and cancellation is honored between batches.
pub async fn poll_loop(queue: &dyn WorkQueue, processor: &FeedProcessor, opts: PollOptions, ct: &CancellationToken) -> Result<BatchReport> {
    let log = telemetry::process();
    let mut totals = BatchReport::default();

    loop {
        if ct.is_cancelled() { break; }
        let messages = {
            let _s = log.span(&ProcessPhase::Receive).entered();
            queue.receive(processor.queue_name(), opts.batch, opts.visibility).await?
        };

        if messages.is_empty() {
            log.debug("queue empty");
            if !opts.follow { break; }
            tokio::select! {
                _ = ct.cancelled() => break,
                _ = tokio::time::sleep(opts.poll) => continue,
            }
        }

        let report = processor.handle_batch(messages).await?;
        log.batch_totals(report.received, report.published, report.failed);
        totals.merge(report);
        if !opts.follow { break; }
    }

    Ok(totals)
}
