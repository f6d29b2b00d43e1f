//! Resolved entities handed to renderers.
//!
//! Every value here is produced once by [`Index::build`](crate::resolve::Index::build)
//! and only ever read afterwards.

use crate::export::Timestamp;

pub use crate::export::Role;

/// A series with its episode aggregates.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub id: u64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub episode_count: usize,
    /// Oldest `created_at` among the series' episodes.
    pub first_episode_date: Option<Timestamp>,
    /// Newest `created_at` among the series' episodes.
    pub last_episode_date: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeMedia {
    pub kind: String,
    /// Display duration as exported (`"1:02:03"`, `"45:30"`, `"90"`).
    pub length: String,
    /// Size in bytes, as exported text.
    pub size: String,
    /// Always `https`.
    pub url: String,
}

/// A person as credited on one episode.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodePerson {
    pub id: u64,
    pub name: String,
    pub slug: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Episode {
    pub id: u64,
    pub name: String,
    /// `"{series name} #{number}: {name}"`
    pub formatted_title: String,
    pub number: String,
    pub slug: String,
    /// Body HTML with external links rewritten.
    pub content: String,
    pub description: String,
    pub series_id: u64,
    pub series_slug: String,
    pub series_name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub media: Option<EpisodeMedia>,
    pub people: Vec<EpisodePerson>,
    pub fringe_slug: Option<String>,
    pub parent_slug: Option<String>,
}

impl Episode {
    /// Names of everyone credited as host, in credit order.
    pub fn host_names(&self) -> Vec<&str> {
        self.people
            .iter()
            .filter(|p| p.role == Role::Host)
            .map(|p| p.name.as_str())
            .collect()
    }
}

/// Minimal link data for previous/next navigation.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeNeighbor {
    pub slug: String,
    pub name: String,
    pub number: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpisodeNeighbors {
    /// Chronologically older episode in the same series.
    pub prev: Option<EpisodeNeighbor>,
    /// Chronologically newer episode in the same series.
    pub next: Option<EpisodeNeighbor>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub id: u64,
    pub name: String,
    pub slug: String,
    pub content: String,
    pub gravatar_url: Option<String>,
    /// `Host` if the person hosted any episode, otherwise `Guest`.
    pub global_role: Role,
    /// Number of resolvable credits; always the length of `episodes_by_person`.
    pub episode_count: usize,
}

/// An episode from the point of view of one participant.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonEpisode {
    pub id: u64,
    pub name: String,
    pub slug: String,
    pub number: String,
    pub series_name: String,
    pub series_slug: String,
    pub role: Role,
    pub created_at: Timestamp,
}
