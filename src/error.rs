// Per work item failure taxonomy. Everything here is caught at the item
// boundary; only acknowledgment errors escape the processor (as anyhow).

#[derive(Debug)]
pub enum PipelineError {
    Decode(serde_json::Error),
    Fetch(anyhow::Error),
    Parse(String),
    Pattern(regex::Error),
    Category { raw: String, term: String },
    Render(rss::Error),
    Upload(anyhow::Error),
}

impl PipelineError {
    /// State of the item state machine the failure belongs to.
    pub fn phase(&self) -> &'static str {
        match self {
            PipelineError::Decode(_) => "received",
            PipelineError::Fetch(_) | PipelineError::Parse(_) => "parsing",
            PipelineError::Pattern(_) | PipelineError::Category { .. } => "filtering",
            PipelineError::Render(_) | PipelineError::Upload(_) => "publishing",
        }
    }
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::Decode(err) => write!(f, "work item decode error: {err}"),
            PipelineError::Fetch(err) => write!(f, "fetch error: {err:#}"),
            PipelineError::Parse(msg) => write!(f, "feed parse error: {msg}"),
            PipelineError::Pattern(err) => write!(f, "invalid filter pattern: {err}"),
            PipelineError::Category { raw, term } => {
                write!(f, "category term {term:?} in {raw:?} has no scheme (expected term:scheme)")
            }
            PipelineError::Render(err) => write!(f, "feed render error: {err}"),
            PipelineError::Upload(err) => write!(f, "upload error: {err:#}"),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Decode(err) => Some(err),
            PipelineError::Pattern(err) => Some(err),
            PipelineError::Render(err) => Some(err),
            PipelineError::Fetch(err) | PipelineError::Upload(err) => Some(&**err),
            PipelineError::Parse(_) | PipelineError::Category { .. } => None,
        }
    }
}
