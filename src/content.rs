//! Presentation-safe transforms applied to exported fields.
//!
//! Episode bodies come out of the export as raw HTML written in an old CMS.
//! Before they are rendered (or embedded in a feed) external links are made
//! to open in a new browsing context without leaking the referrer.

use md5::{Digest, Md5};
use regex::Regex;
use std::sync::LazyLock;

static ANCHOR_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<a\b[^>]*>").expect("anchor pattern is valid"));

static ABSOLUTE_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\shref\s*=\s*["']?https?://"#).expect("href pattern is valid")
});

static TARGET_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\starget\s*=").expect("target pattern is valid"));

static REL_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\srel\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>"']+))"#)
        .expect("rel pattern is valid")
});

const REL_TOKENS: [&str; 2] = ["noopener", "noreferrer"];

/// Force external links to open in a new tab with `noopener noreferrer`.
///
/// Only anchors whose `href` is an absolute `http(s)` URL and that carry no
/// `target` attribute are touched. Everything else is left byte-for-byte as
/// it was. An existing `rel` keeps its tokens and gains `noopener
/// noreferrer` where missing.
pub fn process_content(html: &str) -> String {
    ANCHOR_TAG
        .replace_all(html, |caps: &regex::Captures| {
            let tag = &caps[0];
            if !ABSOLUTE_HREF.is_match(tag) || TARGET_ATTR.is_match(tag) {
                return tag.to_string();
            }
            let (tag, injected) = if REL_ATTR.is_match(tag) {
                (merge_rel(tag), r#" target="_blank""#)
            } else {
                (tag.to_string(), r#" target="_blank" rel="noopener noreferrer""#)
            };
            let body = tag.trim_end_matches('>');
            match body.strip_suffix('/') {
                Some(open) => format!("{}{injected} />", open.trim_end()),
                None => format!("{body}{injected}>"),
            }
        })
        .into_owned()
}

/// Rewrite the first `rel` attribute of `tag` to include `noopener noreferrer`.
fn merge_rel(tag: &str) -> String {
    REL_ATTR
        .replacen(tag, 1, |caps: &regex::Captures| {
            let value = caps
                .get(1)
                .or_else(|| caps.get(2))
                .or_else(|| caps.get(3))
                .map_or("", |m| m.as_str());
            let mut tokens: Vec<&str> = value.split_whitespace().collect();
            for token in REL_TOKENS {
                if !tokens.iter().any(|t| t.eq_ignore_ascii_case(token)) {
                    tokens.push(token);
                }
            }
            format!(r#" rel="{}""#, tokens.join(" "))
        })
        .into_owned()
}

/// Gravatar image URL for an email address.
///
/// The hash is the MD5 of the trimmed, lowercased address. Missing or blank
/// addresses produce no URL.
pub fn gravatar_url(email: Option<&str>) -> Option<String> {
    let normalized = email?.trim().to_lowercase();
    if normalized.is_empty() {
        return None;
    }
    let hash = Md5::digest(normalized.as_bytes());
    Some(format!("https://www.gravatar.com/avatar/{hash:x}?s=160&d=mp"))
}

/// Upgrade a plain-`http` media URL to `https`.
pub fn normalize_media_url(url: &str) -> String {
    match url.strip_prefix("http://") {
        Some(rest) => format!("https://{rest}"),
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_link_gets_target_and_rel() {
        let out = process_content(r#"<a href="https://example.com">link</a>"#);
        assert_eq!(
            out,
            r#"<a href="https://example.com" target="_blank" rel="noopener noreferrer">link</a>"#
        );
    }

    #[test]
    fn existing_target_is_untouched() {
        let input = r#"<a href="https://example.com" target="_self">link</a>"#;
        assert_eq!(process_content(input), input);
    }

    #[test]
    fn relative_link_is_untouched() {
        let input = r#"<a href="/about">link</a>"#;
        assert_eq!(process_content(input), input);
    }

    #[test]
    fn every_external_anchor_is_rewritten() {
        let input = r#"<a href="https://a.com">A</a> and <a href="https://b.com">B</a>"#;
        let out = process_content(input);
        assert_eq!(out.matches(r#"target="_blank""#).count(), 2);
    }

    #[test]
    fn plain_http_and_uppercase_tags_count_as_external() {
        let out = process_content(r#"<A HREF='http://old.example.com/x'>x</A>"#);
        assert!(out.contains(r#"target="_blank""#));
    }

    #[test]
    fn existing_rel_gains_noopener_noreferrer() {
        let out = process_content(r#"<a rel="nofollow" href="https://e.com">e</a>"#);
        assert_eq!(
            out,
            r#"<a rel="nofollow noopener noreferrer" href="https://e.com" target="_blank">e</a>"#
        );
        assert_eq!(out.matches("rel=").count(), 1);
    }

    #[test]
    fn existing_rel_tokens_are_not_repeated() {
        let out = process_content(r#"<a href='https://e.com' rel='noopener'>e</a>"#);
        assert!(out.contains(r#"rel="noopener noreferrer""#));
        assert!(out.contains(r#"target="_blank""#));
    }

    #[test]
    fn unquoted_rel_is_merged() {
        let out = process_content(r#"<a href=https://e.com rel=external>e</a>"#);
        assert!(out.contains(r#"rel="external noopener noreferrer""#));
    }

    #[test]
    fn other_tags_are_ignored() {
        let input = r#"<abbr title="x">x</abbr><img src="https://e.com/i.png">"#;
        assert_eq!(process_content(input), input);
    }

    #[test]
    fn mixed_document_only_rewrites_external() {
        let input = r#"<p><a href="/local">l</a> <a href="https://e.com">e</a></p>"#;
        let out = process_content(input);
        assert!(out.contains(r#"<a href="/local">l</a>"#));
        assert_eq!(out.matches(r#"target="_blank""#).count(), 1);
    }

    #[test]
    fn gravatar_absent_for_missing_or_empty_email() {
        assert_eq!(gravatar_url(None), None);
        assert_eq!(gravatar_url(Some("")), None);
        assert_eq!(gravatar_url(Some("   ")), None);
    }

    #[test]
    fn gravatar_normalizes_case_and_whitespace() {
        assert_eq!(
            gravatar_url(Some("Test@Example.com")),
            gravatar_url(Some("  test@example.com  "))
        );
    }

    #[test]
    fn gravatar_url_shape() {
        let url = gravatar_url(Some("test@example.com")).unwrap();
        let hash = url
            .strip_prefix("https://www.gravatar.com/avatar/")
            .and_then(|rest| rest.strip_suffix("?s=160&d=mp"))
            .unwrap();
        assert_eq!(hash.len(), 32);
        assert!(hash.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)));
        assert_eq!(hash, "55502f40dc8b7c769880b10874abc9d0");
    }

    #[test]
    fn media_url_upgraded_to_https() {
        assert_eq!(
            normalize_media_url("http://cdn.example.com/a.mp3"),
            "https://cdn.example.com/a.mp3"
        );
        assert_eq!(
            normalize_media_url("https://cdn.example.com/a.mp3"),
            "https://cdn.example.com/a.mp3"
        );
    }
}
