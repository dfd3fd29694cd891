// In-memory collaborators for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use bytes::Bytes;

use crate::blob::BlobStore;
use crate::catalog::{CatalogPage, PageToken, SourceCatalog, SourceRecord};
use crate::feed::fetch::FeedFetcher;
use crate::queue::{ReceivedMessage, WorkQueue};

pub fn record(id: i64, source: &str) -> SourceRecord {
    SourceRecord {
        source_id: id,
        source: Some(source.to_string()),
        newfeedname: None,
        newfeedtitle: None,
        filter: None,
    }
}

pub struct MemoryCatalog {
    records: Vec<SourceRecord>,
    page_size: usize,
    fail_on_page: Option<usize>,
    pages_served: AtomicUsize,
}

impl MemoryCatalog {
    pub fn new(records: Vec<SourceRecord>, page_size: usize) -> Self {
        Self { records, page_size: page_size.max(1), fail_on_page: None, pages_served: AtomicUsize::new(0) }
    }

    /// Page `n` (0-based) returns an error instead of records.
    pub fn failing_on_page(mut self, n: usize) -> Self {
        self.fail_on_page = Some(n);
        self
    }

    pub fn pages_served(&self) -> usize {
        self.pages_served.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceCatalog for MemoryCatalog {
    async fn scan_page(&self, token: Option<PageToken>) -> Result<CatalogPage> {
        let page_no = self.pages_served.fetch_add(1, Ordering::SeqCst);
        if self.fail_on_page == Some(page_no) { bail!("catalog unavailable"); }
        let start = match token {
            Some(PageToken(last)) => self.records.iter().position(|r| r.source_id == last).map(|i| i + 1).unwrap_or(self.records.len()),
            None => 0,
        };
        let end = (start + self.page_size).min(self.records.len());
        let records = self.records[start..end].to_vec();
        let next = if end < self.records.len() { records.last().map(|r| PageToken(r.source_id)) } else { None };
        Ok(CatalogPage { records, next })
    }
}

#[derive(Debug, Clone)]
pub struct StoredMessage {
    pub message_id: String,
    pub queue: String,
    pub body: String,
    pub receipt: Option<String>,
}

#[derive(Default)]
pub struct MemoryQueue {
    messages: Mutex<Vec<StoredMessage>>,
    acked: Mutex<Vec<String>>,
    next_id: AtomicUsize,
    fail_publish_containing: Option<String>,
    fail_ack: bool,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishing a body that contains `needle` fails.
    pub fn failing_publish(mut self, needle: &str) -> Self {
        self.fail_publish_containing = Some(needle.to_string());
        self
    }

    pub fn failing_ack(mut self) -> Self {
        self.fail_ack = true;
        self
    }

    pub fn pending(&self, queue: &str) -> Vec<StoredMessage> {
        self.messages.lock().unwrap().iter().filter(|m| m.queue == queue).cloned().collect()
    }

    pub fn acked(&self) -> Vec<String> {
        self.acked.lock().unwrap().clone()
    }
}

#[async_trait]
impl WorkQueue for MemoryQueue {
    async fn publish(&self, queue: &str, body: String) -> Result<String> {
        if let Some(needle) = &self.fail_publish_containing {
            if body.contains(needle.as_str()) { bail!("queue rejected message"); }
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
        self.messages.lock().unwrap().push(StoredMessage {
            message_id: id.clone(),
            queue: queue.to_string(),
            body,
            receipt: None,
        });
        Ok(id)
    }

    async fn receive(&self, queue: &str, max: usize, _visibility: Duration) -> Result<Vec<ReceivedMessage>> {
        let mut msgs = self.messages.lock().unwrap();
        let out: Vec<ReceivedMessage> = msgs
            .iter_mut()
            .filter(|m| m.queue == queue && m.receipt.is_none())
            .take(max)
            .map(|m| {
                let receipt = format!("rcpt-{}", m.message_id);
                m.receipt = Some(receipt.clone());
                ReceivedMessage { message_id: m.message_id.clone(), body: m.body.clone(), receipt }
            })
            .collect();
        Ok(out)
    }

    async fn ack(&self, queue: &str, receipt: &str) -> Result<()> {
        if self.fail_ack { bail!("ack refused"); }
        let mut msgs = self.messages.lock().unwrap();
        let before = msgs.len();
        msgs.retain(|m| !(m.queue == queue && m.receipt.as_deref() == Some(receipt)));
        if msgs.len() == before { return Err(anyhow!("unknown receipt {receipt}")); }
        self.acked.lock().unwrap().push(receipt.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryBlobStore {
    puts: Mutex<Vec<(String, Bytes)>>,
    fail: bool,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self { puts: Mutex::new(Vec::new()), fail: true }
    }

    pub fn puts(&self) -> Vec<(String, Bytes)> {
        self.puts.lock().unwrap().clone()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, body: Bytes) -> Result<()> {
        if self.fail { bail!("bucket is read-only"); }
        self.puts.lock().unwrap().push((key.to_string(), body));
        Ok(())
    }

    fn describe(&self, key: &str) -> String {
        format!("mem://{key}")
    }
}

/// Serves fixed documents; any other source is unreachable.
#[derive(Default)]
pub struct MapFetcher {
    docs: HashMap<String, Bytes>,
}

impl MapFetcher {
    pub fn with(mut self, source: &str, xml: &str) -> Self {
        self.docs.insert(source.to_string(), Bytes::from(xml.to_string()));
        self
    }
}

#[async_trait]
impl FeedFetcher for MapFetcher {
    async fn fetch(&self, source: &str) -> Result<Bytes> {
        self.docs.get(source).cloned().ok_or_else(|| anyhow!("connection refused: {source}"))
    }
}

pub const SAMPLE_RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>Source Feed</title>
    <link>https://example.com/</link>
    <description>All the news</description>
    <item>
      <title>one</title>
      <guid>g1</guid>
      <description>rust 1.80 released</description>
      <category>lang:rust</category>
    </item>
    <item>
      <title>two</title>
      <guid>g2</guid>
      <description>gardening tips</description>
    </item>
    <item>
      <title>three</title>
      <guid>g3</guid>
      <description>async rust with tokio</description>
      <category>lang:rust,topic:async</category>
    </item>
  </channel>
</rss>"#;
