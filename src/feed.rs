//! Per-series RSS feeds.
//!
//! Every listed series gets `/series/{slug}/feed-fringe.xml`: an RSS 2.0
//! channel with the `atom:`, `content:` and `itunes:` extensions. Podcast
//! apps that still poll the old feeds see a leading tombstone item that
//! announces the archive, followed by every episode of the series plus the
//! fringe episodes it links to in other series.
//!
//! The XML is assembled with plain string formatting. All text nodes go
//! through [`escape_xml`]; episode bodies are wrapped with [`cdata`].

use crate::config::SiteConfig;
use crate::resolve::Index;
use crate::types::{Episode, Series};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Escape the five XML special characters.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap HTML in a CDATA section, splitting any `]]>` it contains.
pub fn cdata(html: &str) -> String {
    format!("<![CDATA[{}]]>", html.replace("]]>", "]]]]><![CDATA[>"))
}

/// RFC 2822 date in the `Tue, 04 Mar 2012 05:06:07 GMT` form.
pub fn rfc2822(at: &DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Episodes carried by a series feed: its own plus distinct fringe targets, newest first.
pub fn feed_episodes<'a>(index: &'a Index, series_slug: &str) -> Vec<&'a Episode> {
    let mut episodes = index.episodes_by_series(series_slug);
    let mut seen: HashSet<&str> = episodes.iter().map(|e| e.slug.as_str()).collect();
    let mut fringe = Vec::new();
    for ep in &episodes {
        let Some(target) = ep.fringe_slug.as_deref() else {
            continue;
        };
        if seen.contains(target) {
            continue;
        }
        if let Some(found) = index.episode_by_slug(target) {
            seen.insert(found.slug.as_str());
            fringe.push(found);
        }
    }
    episodes.extend(fringe);
    episodes.sort_by(|a, b| b.created_at.at.cmp(&a.created_at.at));
    episodes
}

/// Render the fringe feed for one series.
///
/// `generated_at` is only used as `lastBuildDate` when the series has no
/// dated episodes at all.
pub fn render_series_feed(
    index: &Index,
    series: &Series,
    config: &SiteConfig,
    generated_at: DateTime<Utc>,
) -> String {
    let site = &config.base_url;
    let episodes = feed_episodes(index, &series.slug);
    let feed_url = format!("{site}/series/{}/feed-fringe.xml", series.slug);
    let series_link = format!("{site}/series/{}/", series.slug);

    let last_build = episodes
        .first()
        .map(|e| e.created_at.at)
        .or_else(|| series.last_episode_date.as_ref().map(|t| t.at))
        .unwrap_or(generated_at);
    let last_build = rfc2822(&last_build);

    let mut xml = String::new();
    xml.push_str(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"
  xmlns:atom="http://www.w3.org/2005/Atom"
  xmlns:content="http://purl.org/rss/1.0/modules/content/"
  xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd">
  <channel>
"#,
    );
    let channel_title = escape_xml(&format!("{} (with Fringe)", series.name));
    let author = escape_xml(&config.feed.author);
    xml.push_str(&format!(
        r#"    <title>{channel_title}</title>
    <link>{series_link}</link>
    <description>{description}</description>
    <language>{language}</language>
    <lastBuildDate>{last_build}</lastBuildDate>
    <atom:link href="{feed_url}" rel="self" type="application/rss+xml" />
    <itunes:author>{author}</itunes:author>
    <itunes:owner>
      <itunes:name>{author}</itunes:name>
    </itunes:owner>
    <itunes:explicit>false</itunes:explicit>
    <itunes:category text="{category}" />
"#,
        description = escape_xml(&series.description),
        language = escape_xml(&config.feed.language),
        category = escape_xml(&config.feed.category),
    ));

    // Tombstone
    xml.push_str(&format!(
        r#"    <item>
      <title>{title}</title>
      <link>{series_link}</link>
      <guid isPermaLink="false">tombstone-{slug}</guid>
      <pubDate>{last_build}</pubDate>
      <description>{notice}</description>
    </item>
"#,
        title = escape_xml(&format!("{} has been archived", series.name)),
        slug = escape_xml(&series.slug),
        notice = escape_xml(&format!("{} {}", series.name, config.feed.archive_notice)),
    ));

    for ep in &episodes {
        xml.push_str(&render_item(ep, site));
    }

    xml.push_str("  </channel>\n</rss>\n");
    xml
}

fn render_item(ep: &Episode, site: &str) -> String {
    let link = format!("{site}/episodes/{}/", ep.slug);
    let mut item = String::new();
    item.push_str(&format!(
        r#"    <item>
      <title>{title}</title>
      <link>{link}</link>
      <guid isPermaLink="true">{link}</guid>
      <pubDate>{pub_date}</pubDate>
      <description>{description}</description>
      <content:encoded>{body}</content:encoded>
"#,
        title = escape_xml(&ep.formatted_title),
        pub_date = rfc2822(&ep.created_at.at),
        description = escape_xml(&ep.description),
        body = cdata(&ep.content),
    ));
    if let Some(media) = &ep.media {
        item.push_str(&format!(
            r#"      <enclosure url="{url}" length="{size}" type="audio/mpeg" />
      <itunes:duration>{duration}</itunes:duration>
"#,
            url = escape_xml(&media.url),
            size = escape_xml(&media.size),
            duration = escape_xml(&media.length),
        ));
    }
    let hosts = ep.host_names().join(", ");
    if !hosts.is_empty() {
        item.push_str(&format!(
            "      <itunes:author>{}</itunes:author>\n",
            escape_xml(&hosts)
        ));
    }
    item.push_str("    </item>\n");
    item
}
