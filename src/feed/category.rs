use serde::Serialize;

use crate::error::PipelineError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTerm {
    pub term: String,
    pub scheme: String,
}

/// `"a:b,c:d"` -> `[(a, b), (c, d)]`. Each comma-separated term is split on its
/// first colon; a term without one is an error.
pub fn parse_categories(raw: &str) -> Result<Vec<CategoryTerm>, PipelineError> {
    raw.split(',')
        .map(|pair| {
            let (term, scheme) = pair.split_once(':').ok_or_else(|| PipelineError::Category {
                raw: raw.to_string(),
                term: pair.to_string(),
            })?;
            Ok(CategoryTerm { term: term.to_string(), scheme: scheme.to_string() })
        })
        .collect()
}
