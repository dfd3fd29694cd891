use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::blob::BlobStore;
use crate::error::PipelineError;
use crate::feed::{self, fetch::FeedFetcher, EntryFilter};
use crate::queue::{ReceivedMessage, WorkQueue};
use crate::telemetry::{self};
use crate::telemetry::ops::process::Phase as ProcessPhase;
use crate::work_item::WorkItem;

use super::publish::publish;
use super::types::{BatchReport, ItemOutcome, ItemStatus};

struct Published {
    key: String,
    location: String,
    kept: usize,
    total: usize,
}

/// Turns one work item into a republished feed. Collaborators are injected so
/// the pipeline runs the same against Postgres/S3 or in-memory fakes.
pub struct FeedProcessor {
    fetcher: Arc<dyn FeedFetcher>,
    blob: Arc<dyn BlobStore>,
    queue: Arc<dyn WorkQueue>,
    queue_name: String,
    staging_dir: PathBuf,
}

impl FeedProcessor {
    pub fn new(fetcher: Arc<dyn FeedFetcher>, blob: Arc<dyn BlobStore>, queue: Arc<dyn WorkQueue>, queue_name: impl Into<String>) -> Self {
        Self { fetcher, blob, queue, queue_name: queue_name.into(), staging_dir: std::env::temp_dir() }
    }

    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = dir.into();
        self
    }

    pub fn queue_name(&self) -> &str {
        &self.queue_name
    }

    /// Items are handled one after another; only an ack failure stops the batch.
    pub async fn handle_batch(&self, messages: Vec<ReceivedMessage>) -> Result<BatchReport> {
        let mut report = BatchReport::default();
        for msg in &messages {
            report.push(self.handle(msg).await?);
        }
        Ok(report)
    }

    /// received -> parsing -> filtering -> publishing -> acknowledged.
    /// The ack runs on every path; pipeline failures are logged and folded
    /// into the outcome, ack failures propagate.
    pub async fn handle(&self, msg: &ReceivedMessage) -> Result<ItemOutcome> {
        let log = telemetry::process();
        let _item = log.span_kv(&ProcessPhase::Item, [("message_id", msg.message_id.clone())]).entered();
        log.info(format!("📨 Received message {}: {}", msg.message_id, msg.body));

        let mut source = None;
        let result = self.run_pipeline(msg, &mut source).await;

        let outcome = match result {
            Ok(p) => {
                log.item_summary(&msg.message_id, &p.location, p.kept, p.total);
                ItemOutcome {
                    message_id: msg.message_id.clone(),
                    status: ItemStatus::Published,
                    source,
                    key: Some(p.key),
                    kept: p.kept,
                    total: p.total,
                    failed_in: None,
                    error: None,
                }
            }
            Err(e) => {
                log.error(format!("❌ Message {} failed while {}: {} (body={})", msg.message_id, e.phase(), e, msg.body));
                ItemOutcome {
                    message_id: msg.message_id.clone(),
                    status: ItemStatus::Failed,
                    source,
                    key: None,
                    kept: 0,
                    total: 0,
                    failed_in: Some(e.phase()),
                    error: Some(e.to_string()),
                }
            }
        };

        // reached on success and on every PipelineError; a panic above skips it
        // and the message comes back after its visibility timeout
        {
            let _a = log.span(&ProcessPhase::Ack).entered();
            self.queue
                .ack(&self.queue_name, &msg.receipt)
                .await
                .with_context(|| format!("ack message {} on {}", msg.message_id, self.queue_name))?;
        }
        Ok(outcome)
    }

    async fn run_pipeline(&self, msg: &ReceivedMessage, source: &mut Option<String>) -> Result<Published, PipelineError> {
        let log = telemetry::process();
        let item = WorkItem::from_body(&msg.body)?;
        *source = Some(item.source.clone());

        let parsed = {
            let _s = log.span_kv(&ProcessPhase::Parse, [("source", item.source.clone())]).entered();
            feed::load(self.fetcher.as_ref(), &item.source).await?
        };

        let generated = {
            let _s = log.span_kv(&ProcessPhase::Filter, [("patterns", item.patterns().len().to_string())]).entered();
            let filter = EntryFilter::compile(item.patterns())?;
            feed::generate(&parsed, &filter, item.title_override())?
        };

        let key = item.output_key(&generated.title);
        let location = {
            let _s = log.span_kv(&ProcessPhase::Publish, [("key", key.clone())]).entered();
            log.info(format!("⬆️ Upload {} ({} of {} entries)", self.blob.describe(&key), generated.kept(), generated.source_entries));
            publish(self.blob.as_ref(), &self.staging_dir, &key, &generated).await?
        };

        Ok(Published { key, location, kept: generated.kept(), total: generated.source_entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::testing::{MapFetcher, MemoryBlobStore, MemoryQueue, SAMPLE_RSS};

    const Q: &str = "channels";

    struct Harness {
        queue: Arc<MemoryQueue>,
        blob: Arc<MemoryBlobStore>,
        processor: FeedProcessor,
    }

    fn harness_with(queue: MemoryQueue, blob: MemoryBlobStore) -> Harness {
        let queue = Arc::new(queue);
        let blob = Arc::new(blob);
        let fetcher = Arc::new(MapFetcher::default().with("https://example.com/rss", SAMPLE_RSS));
        let processor = FeedProcessor::new(fetcher, blob.clone(), queue.clone(), Q);
        Harness { queue, blob, processor }
    }

    fn harness() -> Harness {
        harness_with(MemoryQueue::new(), MemoryBlobStore::new())
    }

    async fn deliver(h: &Harness, body: &str) -> ReceivedMessage {
        h.queue.publish(Q, body.to_string()).await.unwrap();
        h.queue.receive(Q, 1, Duration::from_secs(30)).await.unwrap().remove(0)
    }

    fn entry_count(xml: &[u8]) -> usize {
        rss::Channel::read_from(xml).unwrap().items().len()
    }

    #[tokio::test]
    async fn filtered_feed_is_published_under_newfeedname() {
        let h = harness();
        let msg = deliver(&h, r#"{"source":"https://example.com/rss","newfeedname":"tech","filter":["tokio","1\\.80"]}"#).await;

        let out = h.processor.handle(&msg).await.unwrap();

        assert_eq!(out.status, ItemStatus::Published);
        assert_eq!(out.key.as_deref(), Some("feed/tech"));
        assert_eq!((out.kept, out.total), (2, 3));
        let puts = h.blob.puts();
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].0, "feed/tech");
        assert_eq!(entry_count(&puts[0].1), 2);
        assert_eq!(h.queue.acked(), vec![msg.receipt.clone()]);
        assert!(h.queue.pending(Q).is_empty());
    }

    #[tokio::test]
    async fn missing_filter_keeps_all_and_key_uses_title() {
        let h = harness();
        let msg = deliver(&h, r#"{"source":"https://example.com/rss","newfeedtitle":"My Feed"}"#).await;

        let out = h.processor.handle(&msg).await.unwrap();

        assert_eq!(out.key.as_deref(), Some("rss/MyFeed"));
        assert_eq!(out.kept, 3);
        let channel = rss::Channel::read_from(&h.blob.puts()[0].1[..]).unwrap();
        assert_eq!(channel.title(), "My Feed");
    }

    #[tokio::test]
    async fn unreachable_source_writes_nothing_and_acks_once() {
        let h = harness();
        let msg = deliver(&h, r#"{"source":"https://down.example/rss"}"#).await;

        let out = h.processor.handle(&msg).await.unwrap();

        assert_eq!(out.status, ItemStatus::Failed);
        assert_eq!(out.failed_in, Some("parsing"));
        assert!(h.blob.puts().is_empty());
        assert_eq!(h.queue.acked().len(), 1);
        assert!(h.queue.pending(Q).is_empty());
    }

    #[tokio::test]
    async fn category_without_scheme_fails_item_but_acks() {
        let xml = SAMPLE_RSS.replace("<category>lang:rust</category>", "<category>rust</category>");
        let queue = Arc::new(MemoryQueue::new());
        let blob = Arc::new(MemoryBlobStore::new());
        let fetcher = Arc::new(MapFetcher::default().with("https://example.com/rss", &xml));
        let processor = FeedProcessor::new(fetcher, blob.clone(), queue.clone(), Q);
        queue.publish(Q, r#"{"source":"https://example.com/rss"}"#.into()).await.unwrap();
        let msg = queue.receive(Q, 1, Duration::from_secs(30)).await.unwrap().remove(0);

        let out = processor.handle(&msg).await.unwrap();

        assert_eq!(out.failed_in, Some("filtering"));
        assert!(blob.puts().is_empty());
        assert_eq!(queue.acked(), vec![msg.receipt]);
    }

    #[tokio::test]
    async fn invalid_filter_pattern_fails_item_but_acks_once() {
        let h = harness();
        let msg = deliver(&h, r#"{"source":"https://example.com/rss","filter":["rust","(unclosed"]}"#).await;

        let out = h.processor.handle(&msg).await.unwrap();

        assert_eq!(out.status, ItemStatus::Failed);
        assert_eq!(out.failed_in, Some("filtering"));
        assert!(out.error.as_deref().unwrap_or_default().contains("invalid filter pattern"));
        assert!(h.blob.puts().is_empty());
        assert_eq!(h.queue.acked(), vec![msg.receipt.clone()]);
        assert!(h.queue.pending(Q).is_empty());
    }

    #[tokio::test]
    async fn unusual_feed_names_reach_the_blob_store_unchanged() {
        let h = harness();
        let msg = deliver(&h, r#"{"source":"https://example.com/rss","newfeedname":"a\\b/../c"}"#).await;

        let out = h.processor.handle(&msg).await.unwrap();

        assert_eq!(out.status, ItemStatus::Published);
        assert_eq!(h.blob.puts()[0].0, "feed/a\\b/../c");
    }

    #[tokio::test]
    async fn malformed_body_is_acked() {
        let h = harness();
        let msg = deliver(&h, "not json").await;
        let out = h.processor.handle(&msg).await.unwrap();
        assert_eq!(out.failed_in, Some("received"));
        assert_eq!(out.source, None);
        assert_eq!(h.queue.acked().len(), 1);
    }

    #[tokio::test]
    async fn upload_failure_is_acked() {
        let h = harness_with(MemoryQueue::new(), MemoryBlobStore::failing());
        let msg = deliver(&h, r#"{"source":"https://example.com/rss"}"#).await;
        let out = h.processor.handle(&msg).await.unwrap();
        assert_eq!(out.failed_in, Some("publishing"));
        assert_eq!(h.queue.acked().len(), 1);
    }

    #[tokio::test]
    async fn ack_failure_propagates() {
        let h = harness_with(MemoryQueue::new().failing_ack(), MemoryBlobStore::new());
        let msg = deliver(&h, r#"{"source":"https://example.com/rss"}"#).await;
        let err = h.processor.handle(&msg).await.unwrap_err();
        assert!(format!("{err:#}").contains("ack refused"));
        // the document was still written before the ack attempt
        assert_eq!(h.blob.puts().len(), 1);
    }

    #[tokio::test]
    async fn reprocessing_is_idempotent() {
        let h = harness();
        let body = r#"{"source":"https://example.com/rss","filter":["rust"]}"#;
        let first = deliver(&h, body).await;
        h.processor.handle(&first).await.unwrap();
        let second = deliver(&h, body).await;
        h.processor.handle(&second).await.unwrap();

        let puts = h.blob.puts();
        assert_eq!(puts.len(), 2);
        assert_eq!(puts[0].0, puts[1].0);
        assert_eq!(puts[0].1, puts[1].1);
    }

    #[tokio::test]
    async fn batch_continues_past_failures() {
        let h = harness();
        h.queue.publish(Q, r#"{"source":"https://down.example/rss"}"#.into()).await.unwrap();
        h.queue.publish(Q, r#"{"source":"https://example.com/rss"}"#.into()).await.unwrap();
        let msgs = h.queue.receive(Q, 10, Duration::from_secs(30)).await.unwrap();

        let report = h.processor.handle_batch(msgs).await.unwrap();

        assert_eq!((report.received, report.published, report.failed), (2, 1, 1));
        assert_eq!(h.queue.acked().len(), 2);
    }
}
