//! HTML site generation.
//!
//! Renders the resolved [`Index`] into a static site. Every page is a
//! directory with an `index.html` so URLs stay slash-terminated.
//!
//! ## Generated Pages
//!
//! - **Home** (`/index.html`): newest episodes, same as listing page 1
//! - **Episode listing** (`/episodes/`, `/episodes/page/{n}/`): paginated,
//!   newest first, `episodes_per_page` per page
//! - **Episode pages** (`/episodes/{slug}/`): player, show notes, people,
//!   fringe/parent links and older/newer navigation
//! - **Series** (`/series/`, `/series/{slug}/`): listing plus per-series
//!   episode list and fringe feed link
//! - **People** (`/people/`, `/people/{slug}/`): most active first; person
//!   pages list appearances with their role
//!
//! Alongside the HTML the generator writes each series' fringe feed and the
//! `_redirects` table for legacy URLs, then copies the assets directory
//! verbatim to the output root.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── episodes/
//! │   ├── index.html
//! │   ├── page/2/index.html
//! │   └── atn1/index.html
//! ├── series/
//! │   ├── index.html
//! │   └── atn/
//! │       ├── index.html
//! │       └── feed-fringe.xml
//! ├── people/
//! │   ├── index.html
//! │   └── ryan-rampersad/index.html
//! └── _redirects
//! ```
//!
//! ## CSS
//!
//! `static/style.css` is embedded at compile time and prefixed with the
//! color custom properties generated from config.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Episode and person bodies are trusted export HTML and are inserted with
//! `PreEscaped`; everything else is escaped by maud.

use crate::config::{self, SiteConfig};
use crate::feed;
use crate::player::{PlayerKind, file_size_mb, format_time, parse_duration, preference};
use crate::redirect::{Redirects, render_redirects_file};
use crate::resolve::Index;
use crate::types::{Episode, Person, PersonEpisode, Series};
use chrono::{DateTime, Utc};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use rayon::prelude::*;
use std::fs;
use std::path::Path;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to read assets: {0}")]
    Walk(#[from] walkdir::Error),
}

/// What a build wrote, for the CLI summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateSummary {
    pub listing_pages: usize,
    pub episode_pages: usize,
    pub series_pages: usize,
    pub person_pages: usize,
    pub feeds: usize,
    pub redirects: usize,
    pub assets: usize,
}

const CSS_STATIC: &str = include_str!("../static/style.css");

/// Top-level site section, used to highlight the header nav.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Episodes,
    Series,
    People,
}

pub fn generate(
    index: &Index,
    config: &SiteConfig,
    output_dir: &Path,
    assets_dir: &Path,
    generated_at: DateTime<Utc>,
) -> Result<GenerateSummary, GenerateError> {
    let color_css = config::generate_color_css(&config.colors);
    let css = format!("{}\n\n{}", color_css, CSS_STATIC);
    let mut summary = GenerateSummary::default();

    fs::create_dir_all(output_dir)?;

    // Episode listing, page 1 doubling as the home page
    let episodes = index.all_episodes();
    let per_page = config.episodes_per_page.max(1);
    let pages = page_count(episodes.len(), per_page);
    for page in 1..=pages {
        let start = (page - 1) * per_page;
        let end = (start + per_page).min(episodes.len());
        let chunk = &episodes[start..end];
        let markup = render_episode_listing(chunk, page, pages, config, &css);
        if page == 1 {
            write_page(output_dir, "", markup.clone())?;
            write_page(output_dir, "episodes", markup)?;
        } else {
            write_page(output_dir, &format!("episodes/page/{page}"), markup)?;
        }
    }
    summary.listing_pages = pages;
    tracing::info!(pages, "Generated episode listing");

    summary.episode_pages = episodes
        .par_iter()
        .map(|episode| {
            let markup = render_episode_page(index, episode, config, &css);
            write_page(output_dir, &format!("episodes/{}", episode.slug), markup)
        })
        .collect::<Result<Vec<()>, GenerateError>>()?
        .len();
    tracing::info!(count = summary.episode_pages, "Generated episode pages");

    // Series pages and feeds
    let all_series = index.all_series();
    write_page(
        output_dir,
        "series",
        render_series_index(&all_series, config, &css),
    )?;
    for series in &all_series {
        let dir = format!("series/{}", series.slug);
        let episodes = index.episodes_by_series(&series.slug);
        write_page(
            output_dir,
            &dir,
            render_series_page(series, &episodes, config, &css),
        )?;
        let xml = feed::render_series_feed(index, series, config, generated_at);
        fs::write(output_dir.join(&dir).join("feed-fringe.xml"), xml)?;
        summary.feeds += 1;
        tracing::debug!(series = %series.slug, "Generated series page and feed");
    }
    summary.series_pages = all_series.len();
    tracing::info!(count = summary.series_pages, "Generated series pages");

    // People
    write_page(
        output_dir,
        "people",
        render_people_index(index.all_people(), config, &css),
    )?;
    for person in index.all_people() {
        let appearances = index.episodes_by_person(&person.slug);
        write_page(
            output_dir,
            &format!("people/{}", person.slug),
            render_person_page(person, &appearances, config, &css),
        )?;
    }
    summary.person_pages = index.all_people().len();
    tracing::info!(count = summary.person_pages, "Generated person pages");

    let table = Redirects::new(index).table();
    fs::write(output_dir.join("_redirects"), render_redirects_file(&table))?;
    summary.redirects = table.len();

    summary.assets = copy_assets(assets_dir, output_dir)?;

    tracing::info!(output = %output_dir.display(), "Site generated");
    Ok(summary)
}

/// Number of listing pages for `total` episodes. Never zero.
pub fn page_count(total: usize, per_page: usize) -> usize {
    total.div_ceil(per_page.max(1)).max(1)
}

/// URL of listing page `page` (1-based).
pub fn page_href(page: usize) -> String {
    if page <= 1 {
        "/episodes/".to_string()
    } else {
        format!("/episodes/page/{page}/")
    }
}

fn write_page(output_dir: &Path, rel_dir: &str, markup: Markup) -> Result<(), GenerateError> {
    let dir = output_dir.join(rel_dir);
    fs::create_dir_all(&dir)?;
    fs::write(dir.join("index.html"), markup.into_string())?;
    Ok(())
}

/// Copy the assets tree into the output root. A missing directory is fine.
fn copy_assets(src: &Path, dst: &Path) -> Result<usize, GenerateError> {
    if !src.is_dir() {
        tracing::debug!(assets = %src.display(), "No assets directory");
        return Ok(0);
    }
    let mut copied = 0;
    for entry in WalkDir::new(src) {
        let entry = entry?;
        let Ok(rel) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    tracing::info!(count = copied, "Copied assets");
    Ok(copied)
}

fn display_date(episode_date: &DateTime<Utc>) -> String {
    episode_date.format("%B %-d, %Y").to_string()
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, config: &SiteConfig, css: &str, content: Markup) -> Markup {
    let full_title = if title == config.site_title {
        title.to_string()
    } else {
        format!("{} · {}", title, config.site_title)
    };
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (full_title) }
                style { (PreEscaped(css)) }
            }
            body {
                (content)
            }
        }
    }
}

/// Renders the site header with the section links
fn site_header(config: &SiteConfig, current: Option<Section>) -> Markup {
    let links = [
        (Section::Episodes, "/episodes/", "Episodes"),
        (Section::Series, "/series/", "Series"),
        (Section::People, "/people/", "People"),
    ];
    html! {
        header.site-header {
            a.site-title href="/" { (config.site_title) }
            nav.site-nav {
                @for (section, href, label) in links {
                    a href=(href) class=[(current == Some(section)).then_some("current")] { (label) }
                }
            }
        }
    }
}

fn episode_list(episodes: &[&Episode]) -> Markup {
    html! {
        ul.episode-list {
            @for ep in episodes {
                li {
                    a href={ "/episodes/" (ep.slug) "/" } { (ep.formatted_title) }
                    div.meta {
                        time datetime=(ep.created_at.at.to_rfc3339()) { (display_date(&ep.created_at.at)) }
                    }
                }
            }
        }
    }
}

/// Custom player widget with the native element as fallback.
///
/// A platform adapter drives the widget from the `data-*` attributes; the
/// native `<audio>` element works without it.
fn render_player(episode: &Episode) -> Markup {
    let Some(media) = &episode.media else {
        return html! {};
    };
    let duration = parse_duration(Some(&media.length));
    let size_mb = file_size_mb(&media.size);
    html! {
        div.player role="region" tabindex="0"
            aria-label={ "Audio player for " (episode.formatted_title) }
            data-src=(media.url)
            data-duration=(duration)
            data-storage-key=(preference::STORAGE_KEY) {
            // Shown only once a script adapter takes over the native element
            div.player-custom hidden {
                canvas.player-wave aria-hidden="true" height="80" {}
                div.player-controls {
                    button type="button" data-skip="-15" aria-label="Rewind 15 seconds" { "-15" }
                    button type="button" data-action="toggle" aria-label="Play" { "Play" }
                    button type="button" data-skip="15" aria-label="Forward 15 seconds" { "+15" }
                    span.player-time aria-live="off" { "0:00 / " (format_time(duration)) }
                    span.player-spacer {}
                    a href=(media.url) download { "Download" }
                    button type="button" data-action="switch-player" {
                        (PlayerKind::Custom.switch_label())
                    }
                }
            }
            audio controls preload="none" src=(media.url) {}
            p.player-meta {
                @if duration > 0.0 {
                    span { "Duration: " (format_time(duration)) }
                }
                @if let Some(mb) = &size_mb {
                    span { "Size: " (mb) " MB" }
                }
            }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

fn render_episode_listing(
    episodes: &[Episode],
    page: usize,
    total_pages: usize,
    config: &SiteConfig,
    css: &str,
) -> Markup {
    let refs: Vec<&Episode> = episodes.iter().collect();
    let title = if page == 1 {
        "Episodes".to_string()
    } else {
        format!("Episodes · Page {page}")
    };
    let content = html! {
        (site_header(config, Some(Section::Episodes)))
        main.listing-page {
            h1 { "Episodes" }
            @if refs.is_empty() {
                p.muted { "No episodes." }
            }
            (episode_list(&refs))
            @if total_pages > 1 {
                nav.pagination {
                    @if page > 1 {
                        a rel="prev" href=(page_href(page - 1)) { "← Newer" }
                    } @else {
                        span {}
                    }
                    span.muted { "Page " (page) " of " (total_pages) }
                    @if page < total_pages {
                        a rel="next" href=(page_href(page + 1)) { "Older →" }
                    } @else {
                        span {}
                    }
                }
            }
        }
    };
    base_document(&title, config, css, content)
}

fn render_episode_page(index: &Index, episode: &Episode, config: &SiteConfig, css: &str) -> Markup {
    let neighbors = index.episode_neighbors(&episode.slug);
    let fringe = episode
        .fringe_slug
        .as_deref()
        .and_then(|slug| index.episode_by_slug(slug));
    let parent = episode
        .parent_slug
        .as_deref()
        .and_then(|slug| index.episode_by_slug(slug));

    let content = html! {
        (site_header(config, Some(Section::Episodes)))
        main.episode-page {
            article {
                h1 { (episode.formatted_title) }
                p.meta {
                    a href={ "/series/" (episode.series_slug) "/" } { (episode.series_name) }
                    " · "
                    time datetime=(episode.created_at.at.to_rfc3339()) { (display_date(&episode.created_at.at)) }
                }
                (render_player(episode))
                @if !episode.people.is_empty() {
                    ul.people-list {
                        @for person in &episode.people {
                            li {
                                a href={ "/people/" (person.slug) "/" } { (person.name) }
                                " "
                                span.role { (person.role.as_str()) }
                            }
                        }
                    }
                }
                @if fringe.is_some() || parent.is_some() {
                    div.related {
                        @if let Some(parent) = parent {
                            span { "Fringe of " a href={ "/episodes/" (parent.slug) "/" } { (parent.formatted_title) } }
                        }
                        @if let Some(fringe) = fringe {
                            span { "Fringe: " a href={ "/episodes/" (fringe.slug) "/" } { (fringe.formatted_title) } }
                        }
                    }
                }
                div.episode-content {
                    (PreEscaped(&episode.content))
                }
            }
            nav.episode-nav {
                @if let Some(prev) = &neighbors.prev {
                    a rel="prev" href={ "/episodes/" (prev.slug) "/" } { "← #" (prev.number) ": " (prev.name) }
                } @else {
                    span {}
                }
                @if let Some(next) = &neighbors.next {
                    a rel="next" href={ "/episodes/" (next.slug) "/" } { "#" (next.number) ": " (next.name) " →" }
                }
            }
        }
    };
    base_document(&episode.formatted_title, config, css, content)
}

fn render_series_index(series: &[&Series], config: &SiteConfig, css: &str) -> Markup {
    let content = html! {
        (site_header(config, Some(Section::Series)))
        main.series-index {
            h1 { "Series" }
            ul.series-list {
                @for s in series {
                    li {
                        a href={ "/series/" (s.slug) "/" } { (s.name) }
                        div.meta {
                            (s.episode_count) " episodes"
                            @if let (Some(first), Some(last)) = (&s.first_episode_date, &s.last_episode_date) {
                                " · " (first.at.format("%Y")) "–" (last.at.format("%Y"))
                            }
                        }
                    }
                }
            }
        }
    };
    base_document("Series", config, css, content)
}

fn render_series_page(series: &Series, episodes: &[&Episode], config: &SiteConfig, css: &str) -> Markup {
    let content = html! {
        (site_header(config, Some(Section::Series)))
        main.series-page {
            h1 { (series.name) }
            @if !series.description.is_empty() {
                p { (series.description) }
            }
            p.meta {
                (series.episode_count) " episodes · "
                a href={ "/series/" (series.slug) "/feed-fringe.xml" } { "RSS feed (with Fringe)" }
            }
            (episode_list(episodes))
        }
    };
    base_document(&series.name, config, css, content)
}

fn render_people_index(people: &[Person], config: &SiteConfig, css: &str) -> Markup {
    let content = html! {
        (site_header(config, Some(Section::People)))
        main.people-index {
            h1 { "People" }
            ul.people-list {
                @for person in people {
                    li {
                        @if let Some(url) = &person.gravatar_url {
                            img src=(url) alt="" loading="lazy";
                        }
                        a href={ "/people/" (person.slug) "/" } { (person.name) }
                        " "
                        span.role { (person.global_role.as_str()) }
                        span.muted { " " (person.episode_count) " episodes" }
                    }
                }
            }
        }
    };
    base_document("People", config, css, content)
}

fn render_person_page(
    person: &Person,
    appearances: &[PersonEpisode],
    config: &SiteConfig,
    css: &str,
) -> Markup {
    let content = html! {
        (site_header(config, Some(Section::People)))
        main.person-page {
            @if let Some(url) = &person.gravatar_url {
                img.avatar src=(url) alt=(person.name);
            }
            h1 { (person.name) }
            p.meta { span.role { (person.global_role.as_str()) } " · " (person.episode_count) " episodes" }
            @if !person.content.is_empty() {
                div.person-content { (PreEscaped(&person.content)) }
            }
            ul.episode-list {
                @for ep in appearances {
                    li {
                        a href={ "/episodes/" (ep.slug) "/" } { (ep.series_name) " #" (ep.number) ": " (ep.name) }
                        " "
                        span.role { (ep.role.as_str()) }
                        div.meta { (display_date(&ep.created_at.at)) }
                    }
                }
            }
        }
    };
    base_document(&person.name, config, css, content)
}

// ============================================================================
// Tests
// ============================================================================
