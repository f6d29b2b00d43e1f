//! Legacy URL redirects.
//!
//! The previous site served episodes at `/episode/atn-123` and at the root
//! (`/atn123`). The archive serves them at `/episodes/atn123/`. [`Redirects`]
//! decides, for an incoming path, whether a permanent redirect applies:
//!
//! | Request | Redirect |
//! |---------|----------|
//! | `/episode`, `/episode/` | `/episodes/` |
//! | `/episode/atn-123`, `/episode/atn123` | `/episodes/atn123/` |
//! | `/atn123`, `/atn123/` | `/episodes/atn123/` |
//!
//! Episode redirects are only issued when the canonical slug names a real
//! episode; any other request falls through untouched.
//!
//! A static host cannot run this per request, so the build also writes the
//! table of every legacy path that resolves (see [`Redirects::table`]).

use crate::resolve::Index;
use crate::slug::normalize_legacy_slug;

pub const PERMANENT: u16 = 301;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub location: String,
    pub status: u16,
}

impl Redirect {
    fn permanent(location: String) -> Self {
        Self {
            location,
            status: PERMANENT,
        }
    }
}

/// Redirect rules bound to an index.
pub struct Redirects<'a> {
    index: &'a Index,
    /// Known series slugs, longest first.
    prefixes: Vec<String>,
}

impl<'a> Redirects<'a> {
    pub fn new(index: &'a Index) -> Self {
        Self {
            index,
            prefixes: index.series_slugs_longest_first(),
        }
    }

    /// Redirect for a request path, if one applies.
    pub fn resolve(&self, path: &str) -> Option<Redirect> {
        if path == "/episode" || path == "/episode/" {
            return Some(Redirect::permanent("/episodes/".to_string()));
        }

        let trimmed = path.strip_suffix('/').unwrap_or(path);
        if let Some(raw) = trimmed.strip_prefix("/episode/") {
            if !raw.is_empty() && !raw.contains('/') {
                return self.episode_redirect(raw);
            }
            return None;
        }

        let raw = trimmed.strip_prefix('/')?;
        if is_root_episode_path(raw) {
            return self.episode_redirect(raw);
        }
        None
    }

    fn episode_redirect(&self, raw: &str) -> Option<Redirect> {
        let slug = normalize_legacy_slug(raw, &self.prefixes)?;
        let episode = self.index.episode_by_slug(&slug)?;
        Some(Redirect::permanent(format!("/episodes/{}/", episode.slug)))
    }

    /// Every legacy path that redirects, with its target, in episode order.
    ///
    /// Covers the listing redirect plus, for each episode with a numeric
    /// number, the dashed, dashless and root-level legacy forms.
    pub fn table(&self) -> Vec<(String, Redirect)> {
        let mut candidates = vec!["/episode".to_string()];
        for ep in self.index.all_episodes() {
            candidates.push(format!("/episode/{}-{}", ep.series_slug, ep.number));
            candidates.push(format!("/episode/{}", ep.slug));
            candidates.push(format!("/{}", ep.slug));
        }
        candidates
            .into_iter()
            .filter_map(|path| {
                let redirect = self.resolve(&path)?;
                Some((path, redirect))
            })
            .collect()
    }
}

/// `[a-z]+[0-9]+`, the shape of a root-level legacy episode path.
fn is_root_episode_path(raw: &str) -> bool {
    let letters = raw.bytes().take_while(u8::is_ascii_lowercase).count();
    let digits = &raw[letters..];
    letters > 0 && !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Render a redirect table in the `_redirects` format understood by static hosts.
pub fn render_redirects_file(table: &[(String, Redirect)]) -> String {
    table
        .iter()
        .map(|(from, to)| format!("{from} {} {}\n", to.location, to.status))
        .collect()
}
