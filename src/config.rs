// src/config.rs
//! Startup configuration: listener address, store address, TTLs, and the
//! feed-source registry. All of it is static input; nothing here is
//! re-validated or reloaded by the core.

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ingest::types::FeedSource;

const ENV_SOURCES_PATH: &str = "FEED_SOURCES_PATH";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` selects the in-process store (local dev).
    pub redis_url: Option<String>,
    pub article_ttl_secs: u64,
    pub fetch_timeout_secs: u64,
    pub sources: Vec<FeedSource>,
}

impl AppConfig {
    /// Read configuration from the environment, with the feed registry
    /// resolved through [`load_sources_default`].
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env_parse("PORT", 8083u16)?;
        let redis_url = std::env::var("REDIS_URL").ok().filter(|s| !s.is_empty());
        let article_ttl_secs = env_parse("ARTICLE_TTL_SECS", 3600u64)?;
        let fetch_timeout_secs = env_parse("FEED_TIMEOUT_SECS", 10u64)?;
        let sources = load_sources_default()?;

        Ok(Self {
            host,
            port,
            redis_url,
            article_ttl_secs,
            fetch_timeout_secs,
            sources,
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow!("invalid {key}={raw}: {e}")),
        Err(_) => Ok(default),
    }
}

/// Load the feed registry from an explicit path. Supports TOML or JSON.
pub fn load_sources_from(path: &Path) -> Result<Vec<FeedSource>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading feed sources from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_sources(&content, ext.as_str())
}

/// Load the feed registry using env var + fallbacks:
/// 1) $FEED_SOURCES_PATH
/// 2) config/feed_sources.toml
/// 3) config/feed_sources.json
/// 4) built-in defaults
pub fn load_sources_default() -> Result<Vec<FeedSource>> {
    if let Ok(p) = std::env::var(ENV_SOURCES_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_sources_from(&pb);
        } else {
            return Err(anyhow!("FEED_SOURCES_PATH points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/feed_sources.toml");
    if toml_p.exists() {
        return load_sources_from(&toml_p);
    }
    let json_p = PathBuf::from("config/feed_sources.json");
    if json_p.exists() {
        return load_sources_from(&json_p);
    }
    Ok(default_sources())
}

/// Registry used when no config file is present.
pub fn default_sources() -> Vec<FeedSource> {
    vec![
        FeedSource::new("BBC World", "https://feeds.bbci.co.uk/news/world/rss.xml"),
        FeedSource::new("Al Jazeera", "https://www.aljazeera.com/xml/rss/all.xml"),
        FeedSource::new(
            "The Guardian World",
            "https://www.theguardian.com/world/rss",
        ),
    ]
}

fn parse_sources(s: &str, hint_ext: &str) -> Result<Vec<FeedSource>> {
    // Try TOML first if hinted or content looks like toml.
    let try_toml = hint_ext == "toml" || s.contains("[[sources]]");
    if try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    // Try JSON array
    if let Ok(v) = parse_json(s) {
        return Ok(v);
    }
    // Fallback: also try TOML if not attempted
    if !try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    Err(anyhow!("unsupported feed sources format"))
}

fn parse_toml(s: &str) -> Result<Vec<FeedSource>> {
    #[derive(serde::Deserialize)]
    struct TomlSources {
        sources: Vec<FeedSource>,
    }
    let v: TomlSources = toml::from_str(s)?;
    Ok(clean_list(v.sources))
}

fn parse_json(s: &str) -> Result<Vec<FeedSource>> {
    let v: Vec<FeedSource> = serde_json::from_str(s)?;
    Ok(clean_list(v))
}

fn clean_list(items: Vec<FeedSource>) -> Vec<FeedSource> {
    let mut out: Vec<FeedSource> = Vec::with_capacity(items.len());
    for it in items {
        let name = it.name.trim();
        let url = it.url.trim();
        if name.is_empty() || url.is_empty() {
            continue;
        }
        // Same name listed twice: keep the first occurrence.
        if out.iter().any(|s| s.name == name) {
            continue;
        }
        out.push(FeedSource::new(name, url));
    }
    out
}
