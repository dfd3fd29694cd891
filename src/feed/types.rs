use serde::Serialize;

/// Channel metadata of a fetched feed, normalized across RSS and Atom.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedChannel {
    pub title: String,
    pub link: String,
    pub description: String,
    pub author: Option<String>,
    pub last_build_date: Option<String>,
    pub pub_date: Option<String>,
    pub docs: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryGuid {
    pub value: String,
    pub permalink: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryLink {
    pub href: String,
    pub rel: String,
    pub mime_type: Option<String>,
    pub length: Option<String>,
}

impl EntryLink {
    pub fn alternate(href: impl Into<String>) -> Self {
        Self { href: href.into(), rel: "alternate".into(), mime_type: None, length: None }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedEntry {
    pub title: Option<String>,
    pub guid: Option<EntryGuid>,
    pub links: Vec<EntryLink>,
    pub description: Option<String>,
    pub pub_date: Option<String>,
    /// First category as written in the source, e.g. `"a:b,c:d"`.
    pub category: Option<String>,
    pub author: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedFeed {
    pub channel: ParsedChannel,
    pub entries: Vec<ParsedEntry>,
}
