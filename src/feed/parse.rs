use atom_syndication::Feed as AtomFeed;
use rss::Channel;

use crate::error::PipelineError;

use super::types::{EntryGuid, EntryLink, ParsedChannel, ParsedEntry, ParsedFeed};

/// Best-effort parse: RSS 2.0 first, then Atom.
pub fn parse_feed(xml: &[u8]) -> Result<ParsedFeed, PipelineError> {
    let rss_err = match Channel::read_from(xml) {
        Ok(ch) => return Ok(from_rss(&ch)),
        Err(e) => e,
    };
    match AtomFeed::read_from(xml) {
        Ok(feed) => Ok(from_atom(&feed)),
        Err(atom_err) => Err(PipelineError::Parse(format!("not RSS ({rss_err}) nor Atom ({atom_err})"))),
    }
}

fn from_rss(ch: &Channel) -> ParsedFeed {
    let author = ch
        .managing_editor()
        .map(str::to_string)
        .or_else(|| ch.dublin_core_ext().and_then(|dc| dc.creators().first().cloned()));
    let channel = ParsedChannel {
        title: ch.title().to_string(),
        link: ch.link().to_string(),
        description: ch.description().to_string(),
        author,
        last_build_date: ch.last_build_date().map(str::to_string),
        pub_date: ch.pub_date().map(str::to_string),
        docs: ch.docs().map(str::to_string),
    };

    let entries = ch
        .items()
        .iter()
        .map(|item| {
            let mut links = Vec::new();
            if let Some(link) = item.link() { links.push(EntryLink::alternate(link)); }
            if let Some(enc) = item.enclosure() {
                links.push(EntryLink {
                    href: enc.url().to_string(),
                    rel: "enclosure".into(),
                    mime_type: Some(enc.mime_type().to_string()),
                    length: Some(enc.length().to_string()),
                });
            }
            let author = item
                .author()
                .map(str::to_string)
                .or_else(|| item.dublin_core_ext().and_then(|dc| dc.creators().first().cloned()));
            ParsedEntry {
                title: item.title().map(str::to_string),
                guid: item.guid().map(|g| EntryGuid { value: g.value().to_string(), permalink: g.is_permalink() }),
                links,
                description: item.description().map(str::to_string),
                pub_date: item.pub_date().map(str::to_string),
                category: item.categories().first().map(|c| c.name().to_string()),
                author,
            }
        })
        .collect();

    ParsedFeed { channel, entries }
}

fn from_atom(feed: &AtomFeed) -> ParsedFeed {
    let alternate = |links: &[atom_syndication::Link]| {
        links
            .iter()
            .find(|l| l.rel() == "alternate")
            .or_else(|| links.first())
            .map(|l| l.href().to_string())
    };
    let channel = ParsedChannel {
        title: feed.title().value.clone(),
        link: alternate(feed.links()).unwrap_or_default(),
        description: feed.subtitle().map(|t| t.value.clone()).unwrap_or_default(),
        author: feed.authors().first().map(|p| p.email().unwrap_or(p.name()).to_string()),
        last_build_date: Some(feed.updated().to_rfc2822()),
        pub_date: None,
        docs: None,
    };

    let entries = feed
        .entries()
        .iter()
        .map(|entry| ParsedEntry {
            title: Some(entry.title().value.clone()),
            guid: Some(EntryGuid { value: entry.id().to_string(), permalink: false }),
            links: entry
                .links()
                .iter()
                .map(|l| EntryLink {
                    href: l.href().to_string(),
                    rel: l.rel().to_string(),
                    mime_type: l.mime_type().map(str::to_string),
                    length: l.length().map(str::to_string),
                })
                .collect(),
            description: entry
                .summary()
                .map(|t| t.value.clone())
                .or_else(|| entry.content().and_then(|c| c.value()).map(str::to_string)),
            pub_date: entry.published().map(|d| d.to_rfc2822()),
            category: entry.categories().first().map(|c| c.term().to_string()),
            author: entry.authors().first().map(|p| p.email().unwrap_or(p.name()).to_string()),
        })
        .collect();

    ParsedFeed { channel, entries }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>Source Feed</title>
    <link>https://example.com/</link>
    <description>All the news</description>
    <managingEditor>editor@example.com</managingEditor>
    <lastBuildDate>Mon, 01 Jan 2024 12:00:00 GMT</lastBuildDate>
    <docs>https://www.rssboard.org/rss-specification</docs>
    <item>
      <title>First</title>
      <link>https://example.com/1</link>
      <guid isPermaLink="false">id-1</guid>
      <description>rust release notes</description>
      <category>lang:rust,topic:release</category>
      <enclosure url="https://example.com/1.mp3" length="42" type="audio/mpeg"/>
    </item>
    <item>
      <title>Second</title>
      <description>gardening</description>
    </item>
  </channel>
</rss>"#;

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom Source</title>
  <link href="https://example.org/" rel="alternate"/>
  <updated>2024-01-01T12:00:00Z</updated>
  <id>urn:feed</id>
  <entry>
    <title>Entry</title>
    <id>urn:entry:1</id>
    <updated>2024-01-01T12:00:00Z</updated>
    <summary>atom summary</summary>
    <category term="a"/>
  </entry>
</feed>"#;

    #[test]
    fn parses_rss_channel_and_items() {
        let feed = parse_feed(RSS.as_bytes()).unwrap();
        assert_eq!(feed.channel.title, "Source Feed");
        assert_eq!(feed.channel.author.as_deref(), Some("editor@example.com"));
        assert_eq!(feed.channel.docs.as_deref(), Some("https://www.rssboard.org/rss-specification"));
        assert_eq!(feed.entries.len(), 2);

        let first = &feed.entries[0];
        assert_eq!(first.category.as_deref(), Some("lang:rust,topic:release"));
        assert_eq!(first.guid, Some(EntryGuid { value: "id-1".into(), permalink: false }));
        assert_eq!(first.links.len(), 2);
        assert_eq!(first.links[1].rel, "enclosure");
        assert_eq!(feed.entries[1].category, None);
    }

    #[test]
    fn falls_back_to_atom() {
        let feed = parse_feed(ATOM.as_bytes()).unwrap();
        assert_eq!(feed.channel.title, "Atom Source");
        assert_eq!(feed.channel.link, "https://example.org/");
        assert_eq!(feed.entries[0].description.as_deref(), Some("atom summary"));
        assert_eq!(feed.entries[0].category.as_deref(), Some("a"));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let err = parse_feed(b"<html><body>nope</body></html>").unwrap_err();
        assert!(matches!(err, PipelineError::Parse(_)));
    }
}
