use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

pub const SCHEMA_VERSION: &str = "rssfan.v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Dry run: nothing was written.
    Plan,
    Result,
}

/// One `--json` document per command invocation.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    pub schema_version: &'static str,
    pub op: &'static str,
    pub stage: Stage,
    pub request_id: Uuid,
    pub time: DateTime<Utc>,
    /// Catalog, queue or source the command ran against.
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    pub data: Value,
}

impl Envelope {
    pub fn new<T: Serialize>(op: &'static str, stage: Stage, target: &str, data: &T) -> serde_json::Result<Self> {
        Ok(Envelope {
            schema_version: SCHEMA_VERSION,
            op,
            stage,
            request_id: Uuid::new_v4(),
            time: Utc::now(),
            target: target.to_string(),
            duration_ms: None,
            data: serde_json::to_value(data)?,
        })
    }

    pub fn timed(mut self, started: Instant) -> Self {
        self.duration_ms = Some(u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX));
        self
    }
}
