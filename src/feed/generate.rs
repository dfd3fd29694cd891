use rss::{Category, Channel, Enclosure, Guid, Item};

use crate::error::PipelineError;

use super::category::parse_categories;
use super::filter::EntryFilter;
use super::types::{ParsedEntry, ParsedFeed};

const GENERATOR: &str = concat!("rssfan ", env!("CARGO_PKG_VERSION"));

/// Republished document plus the bookkeeping the processor logs.
#[derive(Debug, Clone)]
pub struct GeneratedFeed {
    pub title: String,
    pub channel: Channel,
    pub source_entries: usize,
}

impl GeneratedFeed {
    pub fn kept(&self) -> usize {
        self.channel.items().len()
    }

    pub fn render(&self) -> Result<Vec<u8>, PipelineError> {
        self.channel.pretty_write_to(Vec::new(), b' ', 2).map_err(PipelineError::Render)
    }
}

/// Rebuild `feed` keeping only the entries `filter` accepts, in source order.
/// No wall-clock values are added, so equal inputs render byte-identical.
pub fn generate(feed: &ParsedFeed, filter: &EntryFilter, title_override: Option<&str>) -> Result<GeneratedFeed, PipelineError> {
    let src = &feed.channel;
    let title = title_override.unwrap_or(src.title.as_str()).to_string();

    let mut items = Vec::new();
    for entry in &feed.entries {
        if filter.keeps(entry.description.as_deref()) {
            items.push(to_item(entry)?);
        }
    }

    let mut channel = Channel::default();
    channel.set_title(title.clone());
    channel.set_link(src.link.clone());
    channel.set_description(src.description.clone());
    channel.set_managing_editor(src.author.clone());
    channel.set_last_build_date(src.last_build_date.clone());
    channel.set_pub_date(src.pub_date.clone());
    channel.set_docs(src.docs.clone());
    channel.set_generator(Some(GENERATOR.to_string()));
    channel.set_items(items);

    Ok(GeneratedFeed { title, channel, source_entries: feed.entries.len() })
}

fn to_item(entry: &ParsedEntry) -> Result<Item, PipelineError> {
    let categories = match entry.category.as_deref() {
        Some(raw) => parse_categories(raw)?
            .into_iter()
            .map(|c| {
                let mut cat = Category::default();
                cat.set_name(c.term);
                cat.set_domain(Some(c.scheme));
                cat
            })
            .collect(),
        None => Vec::new(),
    };

    let mut item = Item::default();
    item.set_title(entry.title.clone());
    item.set_guid(entry.guid.as_ref().map(|g| {
        let mut guid = Guid::default();
        guid.set_value(g.value.clone());
        guid.set_permalink(g.permalink);
        guid
    }));
    item.set_link(entry.links.iter().find(|l| l.rel == "alternate").map(|l| l.href.clone()));
    item.set_enclosure(entry.links.iter().find(|l| l.rel == "enclosure").map(|l| {
        let mut enc = Enclosure::default();
        enc.set_url(l.href.clone());
        enc.set_length(l.length.clone().unwrap_or_else(|| "0".to_string()));
        enc.set_mime_type(l.mime_type.clone().unwrap_or_default());
        enc
    }));
    item.set_description(entry.description.clone());
    item.set_pub_date(entry.pub_date.clone());
    item.set_categories(categories);
    item.set_author(entry.author.clone());
    Ok(item)
}
