use regex::Regex;

use crate::error::PipelineError;

/// Description filter for one work item. Patterns are compiled once and tried
/// in listed order; an empty filter keeps every entry.
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    patterns: Vec<Regex>,
}

impl EntryFilter {
    pub fn compile(patterns: &[String]) -> Result<Self, PipelineError> {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()
            .map_err(PipelineError::Pattern)?;
        Ok(Self { patterns })
    }

    pub fn is_identity(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Index of the first pattern found anywhere in `text`.
    pub fn first_match(&self, text: &str) -> Option<usize> {
        self.patterns.iter().position(|re| re.is_match(text))
    }

    /// Entries without a description are matched as the empty string.
    pub fn keeps(&self, description: Option<&str>) -> bool {
        self.is_identity() || self.first_match(description.unwrap_or("")).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(p: &[&str]) -> EntryFilter {
        let owned: Vec<String> = p.iter().map(|s| s.to_string()).collect();
        EntryFilter::compile(&owned).unwrap()
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let f = filter(&[]);
        assert!(f.keeps(Some("anything")));
        assert!(f.keeps(None));
    }

    #[test]
    fn search_is_unanchored() {
        let f = filter(&["rust"]);
        assert!(f.keeps(Some("a new rust release")));
        assert!(!f.keeps(Some("Rust with a capital R")));
        assert!(!f.keeps(None));
    }

    #[test]
    fn first_listed_pattern_wins() {
        let f = filter(&["tokio", "rust", "r.st"]);
        assert_eq!(f.first_match("rust and tokio"), Some(0));
        assert_eq!(f.first_match("rest"), Some(2));
        assert_eq!(f.first_match("python"), None);
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = EntryFilter::compile(&["(unclosed".to_string()]).unwrap_err();
        assert!(matches!(err, PipelineError::Pattern(_)));
    }
}
