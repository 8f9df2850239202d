// src/ingest/feed.rs
//! RSS parsing and normalization into canonical [`Article`] records.
//!
//! Entries are keyed by their native `<guid>`, falling back to `<link>`;
//! entries with neither cannot be keyed and are skipped. A malformed
//! document yields an empty batch for that source, never a cycle failure.

use anyhow::{Context, Result};
use metrics::histogram;
use quick_xml::de::from_str;
use serde::Deserialize;
use tracing::warn;

use crate::ingest::types::Article;

pub const DEFAULT_TITLE: &str = "Untitled";
pub const DEFAULT_URL: &str = "about:blank";

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    guid: Option<Guid>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

// <guid isPermaLink="..."> carries an attribute, so it needs its own shape.
#[derive(Debug, Deserialize)]
struct Guid {
    #[serde(rename = "@isPermaLink")]
    _is_perma_link: Option<String>,
    #[serde(rename = "$text")]
    value: Option<String>,
}

/// Parse a raw feed document into Articles attributed to `source_name`.
pub fn parse_feed(xml: &str, source_name: &str) -> Result<Vec<Article>> {
    let t0 = std::time::Instant::now();
    let xml_clean = scrub_html_entities_for_xml(xml);
    let rss: Rss = from_str(&xml_clean).context("parsing rss xml")?;

    let mut out = Vec::with_capacity(rss.channel.item.len());
    for it in rss.channel.item {
        let guid = it
            .guid
            .as_ref()
            .and_then(|g| g.value.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let link = it.link.as_deref().map(str::trim).filter(|s| !s.is_empty());

        // No native id and no link: the entry cannot be keyed.
        let Some(id) = guid.or(link) else {
            continue;
        };

        let title = match clean_text(it.title.as_deref().unwrap_or_default()) {
            t if t.is_empty() => DEFAULT_TITLE.to_string(),
            t => t,
        };
        let summary = it
            .description
            .as_deref()
            .map(clean_text)
            .filter(|s| !s.is_empty());

        out.push(Article {
            id: id.to_string(),
            title,
            source: source_name.to_string(),
            published_at: it.pub_date.unwrap_or_default(),
            url: link.unwrap_or(DEFAULT_URL).to_string(),
            summary,
        });
    }

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("ingest_parse_ms").record(ms);
    Ok(out)
}

/// The parser contract the pipeline relies on: a document that does not
/// parse contributes zero articles, logged but not propagated.
pub fn parse_or_empty(xml: &str, source_name: &str) -> Vec<Article> {
    match parse_feed(xml, source_name) {
        Ok(articles) => articles,
        Err(e) => {
            warn!(error = ?e, source = source_name, "malformed feed document");
            Vec::new()
        }
    }
}

/// Normalize feed text: decode HTML entities, strip tags, collapse whitespace.
pub fn clean_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();

    out.trim().to_string()
}

// Feeds routinely embed HTML entities that are not valid XML; scrub the
// usual offenders before handing the document to the XML parser.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_decodes_strips_and_collapses() {
        let s = "  Markets&nbsp;rally <b>hard</b>\n\n after data  ";
        assert_eq!(clean_text(s), "Markets rally hard after data");
    }

    #[test]
    fn guid_wins_over_link() {
        let xml = r#"<rss><channel>
            <item><guid isPermaLink="false">abc</guid><link>http://x/y</link><title>T</title></item>
        </channel></rss>"#;
        let out = parse_feed(xml, "S").unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "abc");
        assert_eq!(out[0].url, "http://x/y");
    }

    #[test]
    fn empty_channel_parses_to_no_articles() {
        let xml = r#"<rss><channel><title>empty</title></channel></rss>"#;
        assert!(parse_feed(xml, "S").unwrap().is_empty());
    }

    #[test]
    fn malformed_document_yields_empty_batch() {
        assert!(parse_or_empty("this is not xml <<<", "S").is_empty());
    }
}
