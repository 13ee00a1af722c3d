//! Persistence of the RSS feed file.
//!
//! The feed is stored as a single RSS 2.0 document with the Media-RSS
//! namespace bound to `media`:
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
//!   <channel>
//!     <title>…</title>
//!     <link>…</link>
//!     <description>…</description>
//!     <item>
//!       <title>…</title>
//!       <link>…</link>
//!       <description>…</description>
//!       <pubDate>Mon, 02 Jan 2006 15:04:05 -0700</pubDate>
//!       <media:content url="…" medium="image"/>
//!     </item>
//!   </channel>
//! </rss>
//! ```
//!
//! Every save rewrites the whole file. Loading is tolerant of files written
//! by older versions: a missing namespace declaration is backfilled, media
//! elements are matched by local name, empty media references are dropped
//! and unknown elements are skipped.

use crate::errors::FeedError;
use crate::models::{Channel, Feed, Item, MEDIA_NAMESPACE, MediaContent, RSS_VERSION};
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument, warn};

/// Load the feed at `path`, or synthesize an empty one if the file is absent.
///
/// # Errors
///
/// Returns [`FeedError::Read`] if the file exists but cannot be read, and
/// [`FeedError::Parse`] if its content is not a well-formed RSS document.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load(path: &Path) -> Result<Feed, FeedError> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("Feed file absent; starting a new feed");
            return Ok(Feed::new());
        }
        Err(source) => {
            return Err(FeedError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let content = String::from_utf8(bytes).map_err(|e| FeedError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let mut feed = parse_feed(&content).map_err(|reason| FeedError::Parse {
        path: path.to_path_buf(),
        reason,
    })?;

    if feed.xmlns_media.is_empty() {
        warn!("Feed file has no media namespace; backfilling");
        feed.xmlns_media = MEDIA_NAMESPACE.to_string();
    }

    info!(items = feed.channel.items.len(), "Loaded feed");
    Ok(feed)
}

/// Serialize `feed` and replace the file at `path` with it.
///
/// The document is written to a sibling temporary file first and then
/// renamed over `path`, so readers never observe a half-written feed.
///
/// # Errors
///
/// Returns [`FeedError::Write`] if serialization, the write, or the rename
/// fails.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn save(path: &Path, feed: &Feed) -> Result<(), FeedError> {
    let write_err = |source| FeedError::Write {
        path: path.to_path_buf(),
        source,
    };

    let bytes = to_xml(feed).map_err(write_err)?;
    let tmp_path = temp_path(path);

    if let Err(e) = fs::write(&tmp_path, &bytes).await {
        return Err(write_err(e));
    }
    if let Err(e) = fs::rename(&tmp_path, path).await {
        let _ = fs::remove_file(&tmp_path).await;
        return Err(write_err(e));
    }

    info!(
        items = feed.channel.items.len(),
        bytes = bytes.len(),
        "Wrote feed"
    );
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "feed.xml".into());
    name.push(".tmp");
    path.with_file_name(name)
}

/// Render a feed as an indented XML document with a declaration header.
pub fn to_xml(feed: &Feed) -> io::Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let namespace = if feed.xmlns_media.is_empty() {
        MEDIA_NAMESPACE
    } else {
        feed.xmlns_media.as_str()
    };
    let mut rss = BytesStart::new("rss");
    rss.push_attribute(("version", feed.version.as_str()));
    rss.push_attribute(("xmlns:media", namespace));
    writer.write_event(Event::Start(rss))?;

    writer.write_event(Event::Start(BytesStart::new("channel")))?;
    write_text_element(&mut writer, "title", &feed.channel.title)?;
    write_text_element(&mut writer, "link", &feed.channel.link)?;
    write_text_element(&mut writer, "description", &feed.channel.description)?;
    for item in &feed.channel.items {
        write_item(&mut writer, item)?;
    }
    writer.write_event(Event::End(BytesEnd::new("channel")))?;
    writer.write_event(Event::End(BytesEnd::new("rss")))?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}

fn write_item(writer: &mut Writer<Vec<u8>>, item: &Item) -> io::Result<()> {
    writer.write_event(Event::Start(BytesStart::new("item")))?;
    write_text_element(writer, "title", &item.title)?;
    write_text_element(writer, "link", &item.link)?;
    write_text_element(writer, "description", &item.description)?;
    write_text_element(writer, "pubDate", &item.pub_date)?;
    if let Some(media) = &item.media {
        let mut content = BytesStart::new("media:content");
        content.push_attribute(("url", media.url.as_str()));
        content.push_attribute(("medium", media.medium.as_str()));
        writer.write_event(Event::Empty(content))?;
    }
    writer.write_event(Event::End(BytesEnd::new("item")))
}

// Start, text, end: the text event keeps the indenter from breaking the
// line, so even empty values come back as empty strings.
fn write_text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> io::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))
}

/// Where the reader currently is inside the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Document,
    Rss,
    Channel,
    Item,
}

/// Parse a feed document. Errors are returned as human-readable reasons.
pub fn parse_feed(content: &str) -> Result<Feed, String> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut feed: Option<Feed> = None;
    let mut item = empty_item();
    let mut root_closed = false;
    let mut scope = Scope::Document;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("{e} (at byte {})", reader.buffer_position()))?;

        match event {
            Event::Start(e) => match scope {
                Scope::Document => {
                    feed = Some(parse_root(&reader, &e, feed.is_some())?);
                    scope = Scope::Rss;
                }
                Scope::Rss if e.name().as_ref() == b"channel" => scope = Scope::Channel,
                Scope::Rss => skip_element(&mut reader, &e)?,
                Scope::Channel => {
                    let channel = &mut feed.as_mut().ok_or("missing <rss> root")?.channel;
                    match e.name().as_ref() {
                        b"item" => {
                            item = empty_item();
                            scope = Scope::Item;
                        }
                        b"title" => channel.title = read_text(&mut reader, &e)?,
                        b"link" => channel.link = read_text(&mut reader, &e)?,
                        b"description" => channel.description = read_text(&mut reader, &e)?,
                        _ => skip_element(&mut reader, &e)?,
                    }
                }
                Scope::Item => match e.name().as_ref() {
                    b"title" => item.title = read_text(&mut reader, &e)?,
                    b"link" => item.link = read_text(&mut reader, &e)?,
                    b"description" => item.description = read_text(&mut reader, &e)?,
                    b"pubDate" => item.pub_date = read_text(&mut reader, &e)?,
                    _ if e.local_name().as_ref() == b"content" => {
                        item.media = parse_media(&reader, &e)?;
                        skip_element(&mut reader, &e)?;
                    }
                    _ => skip_element(&mut reader, &e)?,
                },
            },
            Event::Empty(e) => match scope {
                Scope::Document => {
                    feed = Some(parse_root(&reader, &e, feed.is_some())?);
                    root_closed = true;
                }
                Scope::Item if e.local_name().as_ref() == b"content" => {
                    item.media = parse_media(&reader, &e)?;
                }
                _ => {}
            },
            Event::End(e) => match (scope, e.name().as_ref()) {
                (Scope::Item, b"item") => {
                    feed.as_mut()
                        .ok_or("missing <rss> root")?
                        .channel
                        .items
                        .push(std::mem::replace(&mut item, empty_item()));
                    scope = Scope::Channel;
                }
                (Scope::Channel, b"channel") => scope = Scope::Rss,
                (Scope::Rss, b"rss") => {
                    root_closed = true;
                    scope = Scope::Document;
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    match feed {
        Some(feed) if root_closed => Ok(feed),
        Some(_) => Err("unexpected end of document inside <rss>".to_string()),
        None => Err("missing <rss> root element".to_string()),
    }
}

fn empty_item() -> Item {
    Item {
        title: String::new(),
        link: String::new(),
        description: String::new(),
        pub_date: String::new(),
        media: None,
    }
}

fn parse_root(
    reader: &Reader<&[u8]>,
    e: &BytesStart<'_>,
    seen_root: bool,
) -> Result<Feed, String> {
    if e.name().as_ref() != b"rss" {
        return Err(format!(
            "unexpected root element <{}>",
            String::from_utf8_lossy(e.name().as_ref())
        ));
    }
    if seen_root {
        return Err("more than one <rss> element".to_string());
    }

    let mut version = RSS_VERSION.to_string();
    let mut xmlns_media = String::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| err.to_string())?;
        let value = attr
            .decode_and_unescape_value(reader.decoder())
            .map_err(|err| err.to_string())?;
        match attr.key.as_ref() {
            b"version" => version = value.into_owned(),
            b"xmlns:media" => xmlns_media = value.into_owned(),
            _ => {}
        }
    }

    Ok(Feed {
        version,
        xmlns_media,
        channel: Channel {
            title: String::new(),
            link: String::new(),
            description: String::new(),
            items: Vec::new(),
        },
    })
}

fn parse_media(reader: &Reader<&[u8]>, e: &BytesStart<'_>) -> Result<Option<MediaContent>, String> {
    let mut url = String::new();
    let mut medium = String::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| err.to_string())?;
        let value = attr
            .decode_and_unescape_value(reader.decoder())
            .map_err(|err| err.to_string())?;
        match attr.key.as_ref() {
            b"url" => url = value.into_owned(),
            b"medium" => medium = value.into_owned(),
            _ => {}
        }
    }

    if url.is_empty() {
        debug!("Dropping media element without url");
        return Ok(None);
    }
    Ok(Some(MediaContent { url, medium }))
}

/// Read the text content of the element opened by `start`, consuming its end tag.
fn read_text(reader: &mut Reader<&[u8]>, start: &BytesStart<'_>) -> Result<String, String> {
    let raw = reader
        .read_text(start.name())
        .map_err(|e| format!("{e} (at byte {})", reader.buffer_position()))?;

    let trimmed = raw.trim();
    if let Some(inner) = trimmed
        .strip_prefix("<![CDATA[")
        .and_then(|s| s.strip_suffix("]]>"))
    {
        return Ok(inner.to_string());
    }
    unescape(&raw)
        .map(|text| text.into_owned())
        .map_err(|e| e.to_string())
}

fn skip_element(reader: &mut Reader<&[u8]>, start: &BytesStart<'_>) -> Result<(), String> {
    reader
        .read_to_end(start.name())
        .map(|_| ())
        .map_err(|e| format!("{e} (at byte {})", reader.buffer_position()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn sample_feed() -> Feed {
        let mut feed = Feed::new();
        feed.channel.items = vec![
            Item {
                title: "Tom & Jerry <3".to_string(),
                link: "https://x.com/a?x=1&y=2".to_string(),
                description: "Quotes \"here\" and 'there'".to_string(),
                pub_date: "Mon, 02 Jan 2006 15:04:05 -0700".to_string(),
                media: Some(MediaContent::image("https://x.com/a.png?w=1&h=2")),
            },
            Item {
                title: String::new(),
                link: "https://x.com/b".to_string(),
                description: String::new(),
                pub_date: "Tue, 03 Jan 2006 10:00:00 +0000".to_string(),
                media: None,
            },
        ];
        feed
    }

    #[test]
    fn test_to_xml_layout() {
        let mut feed = Feed::new();
        feed.channel.items.push(Item {
            title: "A".to_string(),
            link: "https://x.com/a".to_string(),
            description: "D".to_string(),
            pub_date: "Mon, 02 Jan 2006 15:04:05 -0700".to_string(),
            media: Some(MediaContent::image("https://x.com/a.png")),
        });

        let xml = String::from_utf8(to_xml(&feed).unwrap()).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains(
            "<rss version=\"2.0\" xmlns:media=\"http://search.yahoo.com/mrss/\">"
        ));
        assert!(xml.contains("\n  <channel>"));
        assert!(xml.contains("\n    <title>Web Scraper Feed</title>"));
        assert!(xml.contains("\n    <item>"));
        assert!(xml.contains("\n      <pubDate>Mon, 02 Jan 2006 15:04:05 -0700</pubDate>"));
        assert!(xml.contains("<media:content url=\"https://x.com/a.png\" medium=\"image\"/>"));
    }

    #[test]
    fn test_to_xml_omits_missing_media() {
        let mut feed = Feed::new();
        feed.channel.items.push(Item {
            media: None,
            ..sample_feed().channel.items[1].clone()
        });
        let xml = String::from_utf8(to_xml(&feed).unwrap()).unwrap();
        assert!(!xml.contains("media:content"));
    }

    #[test]
    fn test_to_xml_never_writes_blank_namespace() {
        let feed = Feed {
            xmlns_media: String::new(),
            ..Feed::new()
        };
        let xml = String::from_utf8(to_xml(&feed).unwrap()).unwrap();
        assert!(xml.contains("xmlns:media=\"http://search.yahoo.com/mrss/\""));
    }

    #[test]
    fn test_parse_defaults_missing_version() {
        let feed = parse_feed("<rss><channel><title>Old</title></channel></rss>").unwrap();
        assert_eq!(feed.version, RSS_VERSION);

        let xml = String::from_utf8(to_xml(&feed).unwrap()).unwrap();
        assert!(xml.contains("<rss version=\"2.0\""));
    }

    #[test]
    fn test_parse_round_trip() {
        let feed = sample_feed();
        let xml = String::from_utf8(to_xml(&feed).unwrap()).unwrap();
        assert_eq!(parse_feed(&xml).unwrap(), feed);
    }

    #[test]
    fn test_parse_legacy_default_namespace_media() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Web Scraper Feed</title>
    <link></link>
    <description>Automatically generated RSS feed</description>
    <item>
      <title>With image</title>
      <link>https://x.com/a</link>
      <description></description>
      <pubDate>02 Jan 06 15:04 MST</pubDate>
      <content xmlns="http://search.yahoo.com/mrss/" url="https://x.com/a.png" medium="image"></content>
    </item>
    <item>
      <title>Without image</title>
      <link>https://x.com/b</link>
      <description></description>
      <pubDate>02 Jan 06 15:04 MST</pubDate>
      <content xmlns="http://search.yahoo.com/mrss/" url="" medium=""></content>
    </item>
  </channel>
</rss>"#;

        let feed = parse_feed(xml).unwrap();
        assert_eq!(feed.xmlns_media, "");
        assert_eq!(feed.channel.items.len(), 2);
        assert_eq!(
            feed.channel.items[0].media,
            Some(MediaContent::image("https://x.com/a.png"))
        );
        assert_eq!(feed.channel.items[1].media, None);
        assert_eq!(feed.channel.items[1].pub_date, "02 Jan 06 15:04 MST");
    }

    #[test]
    fn test_parse_skips_unknown_elements() {
        let xml = r#"<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
  <channel>
    <title>Blog</title>
    <image><title>Logo</title><url>https://x.com/logo.png</url><link>https://x.com</link></image>
    <link>https://x.com</link>
    <description>d</description>
    <item>
      <guid isPermaLink="true">https://x.com/a</guid>
      <title>A</title>
      <link>https://x.com/a</link>
      <category><title>nested</title></category>
    </item>
  </channel>
</rss>"#;

        let feed = parse_feed(xml).unwrap();
        assert_eq!(feed.channel.title, "Blog");
        assert_eq!(feed.channel.link, "https://x.com");
        assert_eq!(feed.channel.items.len(), 1);
        assert_eq!(feed.channel.items[0].title, "A");
        assert_eq!(feed.channel.items[0].link, "https://x.com/a");
    }

    #[test]
    fn test_parse_cdata_text() {
        let xml = r#"<rss version="2.0"><channel><title>t</title><item>
            <title><![CDATA[Fish & Chips]]></title><link>https://x.com/f</link>
        </item></channel></rss>"#;
        let feed = parse_feed(xml).unwrap();
        assert_eq!(feed.channel.items[0].title, "Fish & Chips");
    }

    #[test]
    fn test_parse_rejects_malformed_documents() {
        assert!(parse_feed("").is_err());
        assert!(parse_feed("this is not xml").is_err());
        assert!(parse_feed("<feed></feed>").is_err());
        assert!(parse_feed("<rss version=\"2.0\"><channel><title>x</title>").is_err());
        assert!(parse_feed("<rss><channel></item></channel></rss>").is_err());
    }

    #[tokio::test]
    async fn test_load_missing_file_synthesizes_feed() {
        let dir = tempdir().unwrap();
        let feed = load(&dir.path().join("feed.xml")).await.unwrap();
        assert_eq!(feed, Feed::new());
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("feed.xml");
        let feed = sample_feed();

        save(&path, &feed).await.unwrap();
        assert_eq!(load(&path).await.unwrap(), feed);
        assert!(!temp_path(&path).exists());
    }

    #[tokio::test]
    async fn test_save_replaces_previous_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("feed.xml");

        save(&path, &sample_feed()).await.unwrap();
        save(&path, &Feed::new()).await.unwrap();

        let loaded = load(&path).await.unwrap();
        assert!(loaded.channel.items.is_empty());
    }

    #[tokio::test]
    async fn test_load_backfills_namespace() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("feed.xml");
        std::fs::write(
            &path,
            "<rss version=\"2.0\"><channel><title>Old</title></channel></rss>",
        )
        .unwrap();

        let feed = load(&path).await.unwrap();
        assert_eq!(feed.xmlns_media, MEDIA_NAMESPACE);
        assert_eq!(feed.channel.title, "Old");
    }

    #[tokio::test]
    async fn test_load_corrupt_file_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("feed.xml");
        std::fs::write(&path, "<rss><channel><item>").unwrap();

        let err = load(&path).await.unwrap_err();
        assert!(matches!(err, FeedError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_load_directory_is_read_error() {
        let dir = tempdir().unwrap();
        let err = load(dir.path()).await.unwrap_err();
        assert!(matches!(err, FeedError::Read { .. }));
    }

    #[tokio::test]
    async fn test_save_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("feed.xml");
        let err = save(&path, &Feed::new()).await.unwrap_err();
        assert!(matches!(err, FeedError::Write { .. }));
    }
}
