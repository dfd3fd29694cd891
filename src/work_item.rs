use serde::{Deserialize, Serialize};

use crate::catalog::SourceRecord;
use crate::error::PipelineError;

/// Queue message body: one per catalog record as of dispatch time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub newfeedname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub newfeedtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingSource {
    pub source_id: i64,
}

impl std::fmt::Display for MissingSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "catalog record {} has no source", self.source_id)
    }
}

impl std::error::Error for MissingSource {}

impl WorkItem {
    /// Copies `source` plus every optional field that is present and non-empty.
    pub fn from_record(rec: &SourceRecord) -> Result<Self, MissingSource> {
        let source = rec
            .source
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(MissingSource { source_id: rec.source_id })?;
        Ok(WorkItem {
            source: source.to_string(),
            newfeedname: non_empty(&rec.newfeedname),
            newfeedtitle: non_empty(&rec.newfeedtitle),
            filter: rec.filter.clone().filter(|f| !f.is_empty()),
        })
    }

    pub fn to_body(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_body(body: &str) -> Result<Self, PipelineError> {
        serde_json::from_str(body).map_err(PipelineError::Decode)
    }

    /// Patterns to apply; `None` and `Some([])` both mean "keep every entry".
    pub fn patterns(&self) -> &[String] {
        self.filter.as_deref().unwrap_or(&[])
    }

    pub fn title_override(&self) -> Option<&str> {
        self.newfeedtitle.as_deref().filter(|s| !s.is_empty())
    }

    /// Blob key for the generated document.
    pub fn output_key(&self, generated_title: &str) -> String {
        output_key(self.newfeedname.as_deref(), generated_title)
    }
}

pub fn output_key(newfeedname: Option<&str>, generated_title: &str) -> String {
    match newfeedname.filter(|s| !s.is_empty()) {
        Some(name) => format!("feed/{name}"),
        None => format!("rss/{}", generated_title.replace(' ', "")),
    }
}

fn non_empty(v: &Option<String>) -> Option<String> {
    v.as_ref().filter(|s| !s.is_empty()).cloned()
}
