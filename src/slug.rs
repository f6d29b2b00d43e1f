//! URL slug construction.
//!
//! Two different schemes are in use and they must not be mixed up:
//!
//! - **People** get a slug derived from their name with [`slugify`]:
//!   `"Ryan Rampersad"` → `ryan-rampersad`.
//! - **Episodes** get the series slug and the episode number glued together
//!   with no separator, see [`episode_slug`]: series `atn`, number `1` → `atn1`.
//!   The number is used verbatim, never slugified.
//!
//! Old URLs used a dashed episode form (`atn-1`); [`normalize_legacy_slug`]
//! maps those onto the canonical dashless form.

/// Slugify a display name.
///
/// Lowercases, collapses every run of characters outside `[a-z0-9]` into a
/// single `-`, and trims leading/trailing dashes.
///
/// - `"O'Brien-Smith"` → `"o-brien-smith"`
/// - `"--hello--"` → `"hello"`
/// - `"foo   bar"` → `"foo-bar"`
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Canonical episode slug: series slug immediately followed by the number.
pub fn episode_slug(series_slug: &str, number: &str) -> String {
    format!("{series_slug}{number}")
}

/// Normalize an old-style episode slug to the canonical dashless form.
///
/// `known_prefixes` must be sorted longest-first so that a series slug that
/// is a prefix of another (`tf` vs `tfs`) does not shadow it.
///
/// - `"atn-123"` → `Some("atn123")` (dashed legacy form)
/// - `"atn123"` → `Some("atn123")` if `atn` is a known prefix
/// - anything else → `None`
pub fn normalize_legacy_slug(raw: &str, known_prefixes: &[String]) -> Option<String> {
    if let Some((prefix, number)) = raw.split_once('-') {
        if is_letters(prefix) && is_digits(number) {
            return Some(episode_slug(prefix, number));
        }
    }

    known_prefixes
        .iter()
        .filter_map(|prefix| raw.strip_prefix(prefix.as_str()))
        .any(is_digits)
        .then(|| raw.to_string())
}

fn is_letters(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_lowercase())
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_lowercases_and_hyphenates_spaces() {
        assert_eq!(slugify("Ryan Rampersad"), "ryan-rampersad");
    }

    #[test]
    fn slugify_strips_punctuation() {
        assert_eq!(slugify("O'Brien-Smith"), "o-brien-smith");
    }

    #[test]
    fn slugify_trims_edge_hyphens() {
        assert_eq!(slugify("--hello--"), "hello");
    }

    #[test]
    fn slugify_collapses_runs() {
        assert_eq!(slugify("foo   bar"), "foo-bar");
    }

    #[test]
    fn slugify_drops_non_ascii_letters() {
        assert_eq!(slugify("José Núñez"), "jos-n-ez");
    }

    #[test]
    fn slugify_of_only_symbols_is_empty() {
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn episode_slug_has_no_separator() {
        assert_eq!(episode_slug("atn", "1"), "atn1");
        assert_eq!(episode_slug("tf", "130"), "tf130");
    }

    #[test]
    fn episode_slug_keeps_number_verbatim() {
        assert_eq!(episode_slug("atn", "12b"), "atn12b");
    }

    fn prefixes() -> Vec<String> {
        vec!["tfs".to_string(), "atn".to_string(), "tf".to_string()]
    }

    #[test]
    fn legacy_dashed_slug_is_normalized() {
        assert_eq!(
            normalize_legacy_slug("atn-123", &prefixes()),
            Some("atn123".to_string())
        );
    }

    #[test]
    fn dashed_slug_needs_no_known_prefix() {
        assert_eq!(
            normalize_legacy_slug("xyz-4", &[]),
            Some("xyz4".to_string())
        );
    }

    #[test]
    fn dashless_slug_needs_known_prefix() {
        assert_eq!(
            normalize_legacy_slug("tfs12", &prefixes()),
            Some("tfs12".to_string())
        );
        assert_eq!(normalize_legacy_slug("zzz12", &prefixes()), None);
    }

    #[test]
    fn prefix_without_number_is_rejected() {
        assert_eq!(normalize_legacy_slug("atn", &prefixes()), None);
        assert_eq!(normalize_legacy_slug("atn-", &prefixes()), None);
        assert_eq!(normalize_legacy_slug("atn12x", &prefixes()), None);
    }
}
