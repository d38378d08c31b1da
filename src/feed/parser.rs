use chrono::{DateTime, Utc};
use feed_rs::model::Entry;
use feed_rs::parser::{self, ParseFeedError};
use url::Url;

/// One entry as it appears in the feed, before enrichment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEntry {
    /// Source-provided identifier; empty when the feed has none.
    pub guid: String,
    pub title: String,
    /// Raw (unsanitized) entry body.
    pub description: String,
    /// Link to the full article; empty when the entry has none.
    pub link: String,
    pub published: Option<DateTime<Utc>>,
}

/// Feed-level metadata plus its entries in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFeed {
    pub title: String,
    pub entries: Vec<FeedEntry>,
}

/// Parses an RSS, Atom or JSON Feed document.
///
/// feed-rs normally invents an id for entries that lack one. That is
/// disabled here so a missing GUID stays empty and the content hash
/// identifier applies instead.
///
/// Relative entry links are resolved against `base_url`, normally the URL
/// the document was fetched from.
pub fn parse_feed(bytes: &[u8], base_url: Option<&str>) -> Result<ParsedFeed, ParseFeedError> {
    let feed = parser::Builder::new()
        .id_generator(|_links, _title, _uri| String::new())
        .build()
        .parse(bytes)?;

    let base = base_url.and_then(|u| Url::parse(u).ok());
    let entries = feed
        .entries
        .into_iter()
        .map(|entry| to_entry(entry, base.as_ref()))
        .collect();
    let title = feed.title.map(|t| t.content).unwrap_or_default();

    Ok(ParsedFeed { title, entries })
}

fn to_entry(entry: Entry, base: Option<&Url>) -> FeedEntry {
    let link = entry
        .links
        .iter()
        .find(|l| l.rel.as_deref().map_or(true, |rel| rel == "alternate"))
        .or_else(|| entry.links.first())
        .map(|l| resolve_link(&l.href, base))
        .unwrap_or_default();
    let published = entry.published.or(entry.updated);
    let description = entry
        .summary
        .map(|s| s.content)
        .or_else(|| entry.content.and_then(|c| c.body))
        .unwrap_or_default();
    let title = entry.title.map(|t| t.content).unwrap_or_default();

    FeedEntry {
        guid: entry.id,
        title,
        description,
        link,
        published,
    }
}

fn resolve_link(href: &str, base: Option<&Url>) -> String {
    let href = href.trim();
    if href.is_empty() || Url::parse(href).is_ok() {
        return href.to_string();
    }
    match base.map(|b| b.join(href)) {
        Some(Ok(resolved)) => resolved.to_string(),
        _ => href.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
    <title>Example News</title>
    <link>https://example.com</link>
    <item>
        <guid>item-1</guid>
        <title>First</title>
        <link>https://example.com/1</link>
        <description>&lt;p&gt;Hello&lt;/p&gt;</description>
        <pubDate>Mon, 01 Jan 2024 10:00:00 GMT</pubDate>
    </item>
    <item>
        <title>No guid</title>
        <description>Plain body</description>
    </item>
</channel></rss>"#;

    #[test]
    fn test_parse_rss() {
        let feed = parse_feed(RSS.as_bytes(), None).unwrap();
        assert_eq!(feed.title, "Example News");
        assert_eq!(feed.entries.len(), 2);

        let first = &feed.entries[0];
        assert_eq!(first.guid, "item-1");
        assert_eq!(first.title, "First");
        assert_eq!(first.link, "https://example.com/1");
        assert_eq!(first.description, "<p>Hello</p>");
        assert_eq!(
            first.published.map(|d| d.timestamp()),
            Some(1_704_103_200)
        );
    }

    #[test]
    fn test_missing_guid_and_link_stay_empty() {
        let feed = parse_feed(RSS.as_bytes(), None).unwrap();
        let second = &feed.entries[1];
        assert_eq!(second.guid, "");
        assert_eq!(second.link, "");
        assert_eq!(second.description, "Plain body");
        assert_eq!(second.published, None);
    }

    #[test]
    fn test_parse_atom() {
        let atom = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom Blog</title>
  <id>urn:uuid:feed</id>
  <updated>2024-02-01T00:00:00Z</updated>
  <entry>
    <title>Post</title>
    <id>urn:uuid:post-1</id>
    <link rel="edit" href="https://example.com/edit/1"/>
    <link rel="alternate" href="https://example.com/post/1"/>
    <updated>2024-02-01T00:00:00Z</updated>
    <content type="html">&lt;p&gt;Atom body&lt;/p&gt;</content>
  </entry>
</feed>"#;
        let feed = parse_feed(atom.as_bytes(), None).unwrap();
        assert_eq!(feed.title, "Atom Blog");
        let entry = &feed.entries[0];
        assert_eq!(entry.guid, "urn:uuid:post-1");
        assert_eq!(entry.link, "https://example.com/post/1");
        assert_eq!(entry.description, "<p>Atom body</p>");
        assert!(entry.published.is_some());
    }

    #[test]
    fn test_parse_json_feed() {
        let json = r#"{
  "version": "https://jsonfeed.org/version/1.1",
  "title": "JSON Blog",
  "items": [
    {
      "id": "json-1",
      "url": "https://example.com/json/1",
      "title": "JSON post",
      "content_html": "<p>JSON body</p>"
    }
  ]
}"#;
        let feed = parse_feed(json.as_bytes(), None).unwrap();
        assert_eq!(feed.title, "JSON Blog");
        let entry = &feed.entries[0];
        assert_eq!(entry.guid, "json-1");
        assert_eq!(entry.link, "https://example.com/json/1");
        assert_eq!(entry.description, "<p>JSON body</p>");
    }

    #[test]
    fn test_relative_links_resolved_against_feed_url() {
        let rss = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
    <title>Relative</title>
    <item><guid>a</guid><link>/posts/1</link></item>
    <item><guid>b</guid><link>posts/2</link></item>
    <item><guid>c</guid><link>https://other.example.org/3</link></item>
</channel></rss>"#;
        let feed = parse_feed(rss.as_bytes(), Some("https://example.com/blog/feed.xml")).unwrap();
        let links: Vec<_> = feed.entries.iter().map(|e| e.link.as_str()).collect();
        assert_eq!(
            links,
            vec![
                "https://example.com/posts/1",
                "https://example.com/blog/posts/2",
                "https://other.example.org/3",
            ]
        );
    }

    #[test]
    fn test_relative_link_kept_without_base() {
        let rss = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>T</title>
    <item><guid>a</guid><link>/posts/1</link></item>
</channel></rss>"#;
        let feed = parse_feed(rss.as_bytes(), None).unwrap();
        assert_eq!(feed.entries[0].link, "/posts/1");
    }

    #[test]
    fn test_parse_invalid_document() {
        assert!(parse_feed(b"<not valid xml", None).is_err());
        assert!(parse_feed(b"", None).is_err());
    }
}
