//! # Nexus Archive
//!
//! Static archive of a podcast network. A single JSON export of the network's
//! database is resolved into an immutable, cross-referenced catalogue of
//! series, episodes, people and media, which is then rendered as a static
//! site with per-series RSS feeds and a redirect table for legacy URLs.
//!
//! # Architecture
//!
//! ```text
//! 1. Load      nexus-export-N.json  →  RawExport   (serde, validated types)
//! 2. Resolve   RawExport            →  Index       (joins, slugs, ordering)
//! 3. Render    Index                →  dist/       (pages, feeds, _redirects)
//! ```
//!
//! Loading fails fast on malformed input. Resolution is a pure function:
//! relations pointing at missing rows are skipped, and the resulting
//! [`resolve::Index`] is read-only and shared freely between render threads.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`export`] | Export file discovery, JSON parsing, raw row types |
//! | [`resolve`] | Builds the [`resolve::Index`] and answers catalogue queries |
//! | [`types`] | Resolved entities (`Series`, `Episode`, `Person`, ...) |
//! | [`slug`] | Name slugification and legacy slug normalization |
//! | [`content`] | Show-notes link rewriting, Gravatar URLs, media URL upgrade |
//! | [`feed`] | Per-series "with Fringe" RSS feed |
//! | [`redirect`] | Legacy URL → canonical URL redirects |
//! | [`player`] | Audio player state machine and waveform visualizer |
//! | [`generate`] | HTML rendering of the whole site using Maud |
//! | [`config`] | `config.toml` loading, validation, merging and CSS generation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## One Index, Built Once
//!
//! Every query the pages need is answered from maps built in
//! [`resolve::Index::build`]. There is no lazy state and no interior
//! mutability, so the index is `Sync` and page rendering can fan out across
//! a rayon pool without locks.
//!
//! ## Canonical Episode Slugs
//!
//! Episodes live at `/episodes/{series}{number}/` (`atn123`). The dashed form
//! used by the old site (`atn-123`) is only ever accepted as redirect input.
//!
//! ## Platform-Free Player
//!
//! The player's behavior (fallbacks, shortcuts, seeking, visualizer geometry)
//! is plain Rust behind the [`player::MediaBackend`] and [`player::FrameSink`]
//! traits, so it is tested without a browser.

pub mod config;
pub mod content;
pub mod export;
pub mod feed;
pub mod generate;
pub mod output;
pub mod player;
pub mod redirect;
pub mod resolve;
pub mod slug;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
