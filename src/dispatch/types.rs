use serde::Serialize;

use crate::work_item::WorkItem;

#[derive(Debug, Clone, Serialize)]
pub struct RecordFailure {
    pub source_id: i64,
    pub source: Option<String>,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DispatchReport {
    pub pages: usize,
    pub scanned: usize,
    pub enqueued: usize,
    pub failed: Vec<RecordFailure>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sample: Vec<WorkItem>,
}

#[derive(Serialize)]
pub struct DispatchPlan<'a> {
    pub catalog: &'a str,
    pub queue: &'a str,
    pub records: usize,
    pub invalid: usize,
    pub sample: &'a [WorkItem],
}
