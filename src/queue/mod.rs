use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

mod pg;

pub use pg::PgWorkQueue;

/// A delivered message and the handle needed to delete it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedMessage {
    pub message_id: String,
    pub body: String,
    pub receipt: String,
}

/// At-least-once queue with delete-to-ack semantics.
///
/// A received message stays invisible for `visibility`; if it is not acked in
/// that window it is delivered again.
#[async_trait]
pub trait WorkQueue: Send + Sync {
    async fn publish(&self, queue: &str, body: String) -> Result<String>;
    async fn receive(&self, queue: &str, max: usize, visibility: Duration) -> Result<Vec<ReceivedMessage>>;
    async fn ack(&self, queue: &str, receipt: &str) -> Result<()>;
}
