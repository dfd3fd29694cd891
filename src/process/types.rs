use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Published,
    Failed,
}

/// What happened to one work item. Every outcome was acknowledged.
#[derive(Debug, Clone, Serialize)]
pub struct ItemOutcome {
    pub message_id: String,
    pub status: ItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub kept: usize,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_in: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub received: usize,
    pub published: usize,
    pub failed: usize,
    pub items: Vec<ItemOutcome>,
}

impl BatchReport {
    pub fn push(&mut self, outcome: ItemOutcome) {
        self.received += 1;
        match outcome.status {
            ItemStatus::Published => self.published += 1,
            ItemStatus::Failed => self.failed += 1,
        }
        self.items.push(outcome);
    }

    pub fn merge(&mut self, other: BatchReport) {
        for item in other.items { self.push(item); }
    }
}
