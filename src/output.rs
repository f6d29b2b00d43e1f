//! CLI output formatting.
//!
//! Output is **information-centric**: every entity is shown by its identity
//! (positional index and name) with slugs and paths as indented context
//! lines underneath.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Export
//!     Source: exports/nexus-export-1700000000.json
//!     Fingerprint: 9f86d081884c7d65...
//!
//! Series
//! 001 At The Nexus (3 episodes)
//!     Slug: atn
//!     Description: All about At The Nexus.
//! 002 The Fringe (1 episode)
//!     Slug: tf
//!
//! People
//! 001 Ryan Rampersad (host, 4 episodes)
//!
//! Resolved 3 series, 5 episodes, 4 people
//! ```
//!
//! ## Build
//!
//! ```text
//! Listing → episodes/ (1 page)
//! Episodes → episodes/{slug}/ (5 pages)
//! Series → series/{slug}/ (3 pages, 3 feeds)
//! People → people/{slug}/ (4 pages)
//! Redirects → _redirects (16 rules)
//! Assets → 2 files
//!
//! Site generated at dist
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::export::LoadedExport;
use crate::generate::GenerateSummary;
use crate::redirect::Redirect;
use crate::resolve::Index;
use std::path::Path;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

/// Strip HTML tags from a string (simple angle-bracket stripping).
fn strip_html_tags(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    result
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format the export summary and resolved catalogue.
pub fn format_check_output(export: &LoadedExport, index: &Index) -> Vec<String> {
    let mut lines = vec![
        "Export".to_string(),
        format!("{}Source: {}", indent(1), export.path.display()),
        format!("{}Fingerprint: {}", indent(1), export.fingerprint),
        String::new(),
        "Series".to_string(),
    ];

    let series = index.all_series();
    for (i, s) in series.iter().enumerate() {
        lines.push(format!(
            "{} {} ({})",
            format_index(i + 1),
            s.name,
            plural(s.episode_count, "episode")
        ));
        lines.push(format!("{}Slug: {}", indent(1), s.slug));
        let desc = strip_html_tags(&s.description);
        let desc = desc.trim();
        if !desc.is_empty() {
            lines.push(format!("{}Description: {}", indent(1), truncate_desc(desc, 60)));
        }
    }

    lines.push(String::new());
    lines.push("People".to_string());
    for (i, person) in index.all_people().iter().enumerate() {
        lines.push(format!(
            "{} {} ({}, {})",
            format_index(i + 1),
            person.name,
            person.global_role.as_str(),
            plural(person.episode_count, "episode")
        ));
    }

    lines.push(String::new());
    let people = match index.all_people().len() {
        1 => "1 person".to_string(),
        n => format!("{n} people"),
    };
    lines.push(format!(
        "Resolved {} series, {}, {}",
        series.len(),
        plural(index.all_episodes().len(), "episode"),
        people
    ));
    lines
}

pub fn print_check_output(export: &LoadedExport, index: &Index) {
    for line in format_check_output(export, index) {
        println!("{}", line);
    }
}

// ============================================================================
// Build
// ============================================================================

/// Format what a build wrote.
pub fn format_build_output(summary: &GenerateSummary, output_dir: &Path) -> Vec<String> {
    vec![
        format!("Listing → episodes/ ({})", plural(summary.listing_pages, "page")),
        format!(
            "Episodes → episodes/{{slug}}/ ({})",
            plural(summary.episode_pages, "page")
        ),
        format!(
            "Series → series/{{slug}}/ ({}, {})",
            plural(summary.series_pages, "page"),
            plural(summary.feeds, "feed")
        ),
        format!(
            "People → people/{{slug}}/ ({})",
            plural(summary.person_pages, "page")
        ),
        format!("Redirects → _redirects ({})", plural(summary.redirects, "rule")),
        format!("Assets → {}", plural(summary.assets, "file")),
        String::new(),
        format!("Site generated at {}", output_dir.display()),
    ]
}

pub fn print_build_output(summary: &GenerateSummary, output_dir: &Path) {
    for line in format_build_output(summary, output_dir) {
        println!("{}", line);
    }
}

// ============================================================================
// Redirect
// ============================================================================

pub fn format_redirect_output(path: &str, redirect: Option<&Redirect>) -> String {
    match redirect {
        Some(r) => format!("{} {} → {}", r.status, path, r.location),
        None => format!("No redirect for {}", path),
    }
}

pub fn print_redirect_output(path: &str, redirect: Option<&Redirect>) {
    println!("{}", format_redirect_output(path, redirect));
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{fixture_export, fixture_index};
    use std::path::PathBuf;

    fn loaded() -> LoadedExport {
        LoadedExport {
            path: PathBuf::from("exports/nexus-export-1.json"),
            fingerprint: "abc123".to_string(),
            data: fixture_export(),
        }
    }

    #[test]
    fn strip_html_tags_removes_tags() {
        assert_eq!(strip_html_tags("<p>Hello <b>world</b></p>"), "Hello world");
    }

    #[test]
    fn truncate_desc_short() {
        assert_eq!(truncate_desc("Short text", 40), "Short text");
    }

    #[test]
    fn truncate_desc_long() {
        let text = "a".repeat(50);
        assert_eq!(truncate_desc(&text, 40), format!("{}...", "a".repeat(40)));
    }

    #[test]
    fn truncate_desc_respects_char_boundaries() {
        assert_eq!(truncate_desc("ééééé", 2), "éé...");
    }

    #[test]
    fn plural_forms() {
        assert_eq!(plural(1, "episode"), "1 episode");
        assert_eq!(plural(0, "episode"), "0 episodes");
    }

    #[test]
    fn check_output_lists_export_series_and_people() {
        let lines = format_check_output(&loaded(), &fixture_index());
        assert_eq!(lines[0], "Export");
        assert_eq!(lines[1], "    Source: exports/nexus-export-1.json");
        assert_eq!(lines[2], "    Fingerprint: abc123");
        assert!(lines.contains(&"001 At The Nexus (3 episodes)".to_string()));
        assert!(lines.contains(&"002 The Fringe (1 episode)".to_string()));
        assert!(lines.contains(&"    Slug: tf".to_string()));
        assert!(lines.contains(&"    Description: All about At The Nexus.".to_string()));
        assert!(lines.contains(&"001 Ryan Rampersad (host, 4 episodes)".to_string()));
        assert_eq!(
            lines.last().unwrap(),
            "Resolved 3 series, 5 episodes, 4 people"
        );
    }

    #[test]
    fn check_output_omits_empty_series() {
        let lines = format_check_output(&loaded(), &fixture_index());
        assert!(!lines.iter().any(|l| l.contains("Empty Show")));
    }

    #[test]
    fn build_output_summarizes_counts() {
        let summary = GenerateSummary {
            listing_pages: 1,
            episode_pages: 5,
            series_pages: 3,
            person_pages: 4,
            feeds: 3,
            redirects: 16,
            assets: 0,
        };
        let lines = format_build_output(&summary, Path::new("dist"));
        assert_eq!(lines[0], "Listing → episodes/ (1 page)");
        assert_eq!(lines[1], "Episodes → episodes/{slug}/ (5 pages)");
        assert_eq!(lines[2], "Series → series/{slug}/ (3 pages, 3 feeds)");
        assert_eq!(lines[4], "Redirects → _redirects (16 rules)");
        assert_eq!(lines[5], "Assets → 0 files");
        assert_eq!(lines.last().unwrap(), "Site generated at dist");
    }

    #[test]
    fn redirect_output() {
        let r = Redirect {
            location: "/episodes/atn1/".to_string(),
            status: 301,
        };
        assert_eq!(
            format_redirect_output("/episode/atn-1", Some(&r)),
            "301 /episode/atn-1 → /episodes/atn1/"
        );
        assert_eq!(format_redirect_output("/nope", None), "No redirect for /nope");
    }
}
