use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::{ReceivedMessage, WorkQueue};

pub struct PgWorkQueue {
    pool: PgPool,
}

impl PgWorkQueue {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WorkQueue for PgWorkQueue {
    async fn publish(&self, queue: &str, body: String) -> Result<String> {
        let row = sqlx::query(
            r#"
            INSERT INTO rssfan.queue_message (queue, body)
            VALUES ($1, $2)
            RETURNING message_id
            "#,
        )
        .bind(queue)
        .bind(body)
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("publish to queue={queue}"))?;
        Ok(row.get::<i64, _>("message_id").to_string())
    }

    async fn receive(&self, queue: &str, max: usize, visibility: Duration) -> Result<Vec<ReceivedMessage>> {
        // claim visible rows; every delivery gets a fresh receipt
        let rows = sqlx::query(
            r#"
            UPDATE rssfan.queue_message m
               SET visible_at    = now() + make_interval(secs => $3),
                   receipt       = gen_random_uuid(),
                   receive_count = m.receive_count + 1
             WHERE m.message_id IN (
                   SELECT message_id
                     FROM rssfan.queue_message
                    WHERE queue = $1 AND visible_at <= now()
                    ORDER BY message_id
                    LIMIT $2
                      FOR UPDATE SKIP LOCKED)
            RETURNING m.message_id, m.body, m.receipt
            "#,
        )
        .bind(queue)
        .bind(max as i64)
        .bind(visibility.as_secs_f64())
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("receive from queue={queue}"))?;

        let mut out: Vec<ReceivedMessage> = rows
            .into_iter()
            .map(|r| ReceivedMessage {
                message_id: r.get::<i64, _>("message_id").to_string(),
                body: r.get("body"),
                receipt: r.get::<Uuid, _>("receipt").to_string(),
            })
            .collect();
        out.sort_by_key(|m| m.message_id.parse::<i64>().unwrap_or(i64::MAX));
        Ok(out)
    }

    async fn ack(&self, queue: &str, receipt: &str) -> Result<()> {
        let receipt_id = Uuid::parse_str(receipt).with_context(|| format!("invalid receipt handle {receipt}"))?;
        let res = sqlx::query("DELETE FROM rssfan.queue_message WHERE queue = $1 AND receipt = $2")
            .bind(queue)
            .bind(receipt_id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("ack on queue={queue}"))?;
        if res.rows_affected() == 0 {
            // stale handle: the message was redelivered or already removed
            tracing::warn!(queue, receipt, "ack matched no message");
        }
        Ok(())
    }
}
