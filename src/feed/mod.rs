pub mod category;
pub mod fetch;
pub mod filter;
pub mod generate;
pub mod parse;
pub mod types;

use crate::error::PipelineError;

use self::fetch::FeedFetcher;
use self::types::ParsedFeed;

pub use self::filter::EntryFilter;
pub use self::generate::{generate, GeneratedFeed};

/// Fetch `source` and parse it into the normalized feed model.
pub async fn load(fetcher: &dyn FeedFetcher, source: &str) -> Result<ParsedFeed, PipelineError> {
    let xml = fetcher.fetch(source).await.map_err(PipelineError::Fetch)?;
    parse::parse_feed(&xml)
}
