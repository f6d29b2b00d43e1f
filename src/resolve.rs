//! The content resolver.
//!
//! Joins the six raw export tables into fully resolved [`Series`],
//! [`Episode`] and [`Person`] values and answers read-only queries over them.
//!
//! ## Build Once, Read Everywhere
//!
//! [`Index::build`] is a pure function from a [`RawExport`] to an [`Index`].
//! All joins, derived fields and sort orders are computed up front, so every
//! query is a lookup or a filter over immutable data. The index is `Sync` and
//! is shared by reference with every renderer, including the parallel ones.
//!
//! ## Missing References
//!
//! - An episode whose `series_id` does not resolve is a hard error
//!   ([`ResolveError::MissingSeries`]): the export is corrupt.
//! - Episode relations, person relations and media rows that point at
//!   something missing are skipped one by one. The rest of the export still
//!   loads.
//!
//! ## Orderings
//!
//! | Query | Order |
//! |-------|-------|
//! | [`Index::all_series`] | name ascending, case-insensitive, lowercase first on ties |
//! | [`Index::all_episodes`] | `created_at` descending, export order on ties |
//! | [`Index::all_people`] | episode count descending, export order on ties |
//! | [`Index::episodes_by_person`] | `created_at` descending |

use crate::content::{gravatar_url, normalize_media_url, process_content};
use crate::export::{RawEpisode, RawExport, RawPerson, RawSeries, RelationKind, Role};
use crate::slug::{episode_slug, slugify};
use crate::types::{
    Episode, EpisodeMedia, EpisodeNeighbor, EpisodeNeighbors, EpisodePerson, Person,
    PersonEpisode, Series,
};
use std::cmp::Ordering;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug, PartialEq)]
pub enum ResolveError {
    #[error("Episode {episode_id} references missing series {series_id}")]
    MissingSeries { episode_id: u64, series_id: u64 },
}

/// Immutable, fully joined view of an export.
#[derive(Debug)]
pub struct Index {
    /// All series in export order, including ones without episodes.
    series: Vec<Series>,
    series_by_slug: HashMap<String, usize>,
    /// Positions into `series` of listable series, in display order.
    listed_series: Vec<usize>,
    /// Newest first.
    episodes: Vec<Episode>,
    episode_by_slug: HashMap<String, usize>,
    /// Most prolific first.
    people: Vec<Person>,
    person_by_slug: HashMap<String, usize>,
    /// Keyed by person id, newest first.
    person_episodes: HashMap<u64, Vec<PersonEpisode>>,
}

/// Raw-table lookups used while joining.
struct Lookups<'a> {
    series_by_id: HashMap<u64, &'a RawSeries>,
    episode_by_id: HashMap<u64, &'a RawEpisode>,
    person_by_id: HashMap<u64, &'a RawPerson>,
    /// Canonical slug of every episode whose series resolves.
    slug_by_episode: HashMap<u64, String>,
}

impl Index {
    /// Join the raw export into a queryable index.
    pub fn build(raw: RawExport) -> Result<Self, ResolveError> {
        let lookups = Lookups::new(&raw)?;

        let mut media_by_episode: HashMap<u64, EpisodeMedia> = HashMap::new();
        for media in &raw.episode_medias {
            if !lookups.episode_by_id.contains_key(&media.episode_id) {
                debug!(episode_id = media.episode_id, "skipping media for missing episode");
                continue;
            }
            media_by_episode.insert(
                media.episode_id,
                EpisodeMedia {
                    kind: media.kind.clone(),
                    length: media.length.clone(),
                    size: media.size.clone(),
                    url: normalize_media_url(&media.url),
                },
            );
        }

        let mut fringe_by_episode: HashMap<u64, String> = HashMap::new();
        let mut parent_by_episode: HashMap<u64, String> = HashMap::new();
        for rel in &raw.episode_relations {
            let Some(related_slug) = lookups.slug_by_episode.get(&rel.episode_related_id) else {
                debug!(
                    episode_id = rel.episode_id,
                    related_id = rel.episode_related_id,
                    "skipping relation to missing episode"
                );
                continue;
            };
            let target = match rel.kind {
                RelationKind::Fringe => &mut fringe_by_episode,
                RelationKind::Parent => &mut parent_by_episode,
            };
            target.insert(rel.episode_id, related_slug.clone());
        }

        let mut credits_by_episode: HashMap<u64, Vec<(u64, Role)>> = HashMap::new();
        let mut credits_by_person: HashMap<u64, Vec<(u64, Role)>> = HashMap::new();
        for rel in &raw.people_relations {
            credits_by_episode
                .entry(rel.episode_id)
                .or_default()
                .push((rel.person_id, rel.role));
            credits_by_person
                .entry(rel.person_id)
                .or_default()
                .push((rel.episode_id, rel.role));
        }

        let person_slugs: HashMap<u64, String> = raw
            .people
            .iter()
            .map(|p| (p.id, person_slug(p)))
            .collect();

        // Episodes
        let mut episodes: Vec<Episode> = raw
            .episodes
            .iter()
            .map(|ep| {
                let series = lookups.series_by_id[&ep.series_id];
                let people = credits_by_episode
                    .get(&ep.id)
                    .into_iter()
                    .flatten()
                    .filter_map(|&(person_id, role)| {
                        let person = lookups.person_by_id.get(&person_id)?;
                        Some(EpisodePerson {
                            id: person.id,
                            name: person.name.clone(),
                            slug: person_slugs[&person.id].clone(),
                            role,
                        })
                    })
                    .collect();
                Episode {
                    id: ep.id,
                    name: ep.name.clone(),
                    formatted_title: format!("{} #{}: {}", series.name, ep.number, ep.name),
                    number: ep.number.clone(),
                    slug: lookups.slug_by_episode[&ep.id].clone(),
                    content: process_content(&ep.content),
                    description: ep.description.clone(),
                    series_id: series.id,
                    series_slug: series.slug.clone(),
                    series_name: series.name.clone(),
                    created_at: ep.created_at.clone(),
                    updated_at: ep.updated_at.clone(),
                    media: media_by_episode.remove(&ep.id),
                    people,
                    fringe_slug: fringe_by_episode.get(&ep.id).cloned(),
                    parent_slug: parent_by_episode.get(&ep.id).cloned(),
                }
            })
            .collect();
        episodes.sort_by(|a, b| b.created_at.at.cmp(&a.created_at.at));
        let episode_by_slug = slug_positions(episodes.iter().map(|e| e.slug.as_str()), "episode");

        // Series aggregates
        let mut series: Vec<Series> = raw
            .series
            .iter()
            .map(|s| Series {
                id: s.id,
                name: s.name.clone(),
                slug: s.slug.clone(),
                description: s.description.clone(),
                episode_count: 0,
                first_episode_date: None,
                last_episode_date: None,
            })
            .collect();
        let series_pos: HashMap<u64, usize> = series
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id, i))
            .collect();
        // Iterating newest-first: the first date seen is the last episode date.
        for ep in &episodes {
            let s = &mut series[series_pos[&ep.series_id]];
            s.episode_count += 1;
            if s.last_episode_date.is_none() {
                s.last_episode_date = Some(ep.created_at.clone());
            }
            s.first_episode_date = Some(ep.created_at.clone());
        }
        let series_by_slug = first_positions(series.iter().map(|s| s.slug.as_str()));
        let mut listed_series: Vec<usize> = (0..series.len())
            .filter(|&i| series[i].episode_count > 0)
            .collect();
        listed_series.sort_by(|&a, &b| locale_cmp(&series[a].name, &series[b].name));

        // People
        let mut person_episodes: HashMap<u64, Vec<PersonEpisode>> = HashMap::new();
        let mut people: Vec<Person> = raw
            .people
            .iter()
            .map(|p| {
                let credits = credits_by_person.get(&p.id).map(Vec::as_slice).unwrap_or(&[]);
                let global_role = if credits.iter().any(|&(_, role)| role == Role::Host) {
                    Role::Host
                } else {
                    Role::Guest
                };

                let mut appearances: Vec<PersonEpisode> = credits
                    .iter()
                    .filter_map(|&(episode_id, role)| {
                        let ep = &episodes[*episode_by_slug.get(lookups.slug_by_episode.get(&episode_id)?)?];
                        Some(PersonEpisode {
                            id: ep.id,
                            name: ep.name.clone(),
                            slug: ep.slug.clone(),
                            number: ep.number.clone(),
                            series_name: ep.series_name.clone(),
                            series_slug: ep.series_slug.clone(),
                            role,
                            created_at: ep.created_at.clone(),
                        })
                    })
                    .collect();
                appearances.sort_by(|a, b| b.created_at.at.cmp(&a.created_at.at));
                let episode_count = appearances.len();
                person_episodes.insert(p.id, appearances);

                Person {
                    id: p.id,
                    name: p.name.clone(),
                    slug: person_slugs[&p.id].clone(),
                    content: process_content(&p.content),
                    gravatar_url: gravatar_url(p.email.as_deref()),
                    global_role,
                    episode_count,
                }
            })
            .collect();
        people.sort_by(|a, b| b.episode_count.cmp(&a.episode_count));
        let person_by_slug = slug_positions(people.iter().map(|p| p.slug.as_str()), "person");

        info!(
            series = listed_series.len(),
            episodes = episodes.len(),
            people = people.len(),
            "index built"
        );

        Ok(Self {
            series,
            series_by_slug,
            listed_series,
            episodes,
            episode_by_slug,
            people,
            person_by_slug,
            person_episodes,
        })
    }

    /// Series with at least one episode, sorted by name.
    pub fn all_series(&self) -> Vec<&Series> {
        self.listed_series.iter().map(|&i| &self.series[i]).collect()
    }

    /// Any series by exact slug, including series without episodes.
    pub fn series_by_slug(&self, slug: &str) -> Option<&Series> {
        self.series_by_slug.get(slug).map(|&i| &self.series[i])
    }

    /// Every episode, newest first.
    pub fn all_episodes(&self) -> &[Episode] {
        &self.episodes
    }

    pub fn episode_by_slug(&self, slug: &str) -> Option<&Episode> {
        self.episode_by_slug.get(slug).map(|&i| &self.episodes[i])
    }

    /// Episodes of one series, newest first.
    pub fn episodes_by_series(&self, series_slug: &str) -> Vec<&Episode> {
        self.episodes
            .iter()
            .filter(|e| e.series_slug == series_slug)
            .collect()
    }

    /// Older (`prev`) and newer (`next`) episodes within the same series.
    pub fn episode_neighbors(&self, slug: &str) -> EpisodeNeighbors {
        let Some(episode) = self.episode_by_slug(slug) else {
            return EpisodeNeighbors::default();
        };
        let siblings = self.episodes_by_series(&episode.series_slug);
        let Some(pos) = siblings.iter().position(|e| e.id == episode.id) else {
            return EpisodeNeighbors::default();
        };
        let neighbor = |e: &Episode| EpisodeNeighbor {
            slug: e.slug.clone(),
            name: e.name.clone(),
            number: e.number.clone(),
        };
        EpisodeNeighbors {
            prev: siblings.get(pos + 1).map(|e| neighbor(e)),
            next: pos.checked_sub(1).map(|i| neighbor(siblings[i])),
        }
    }

    /// Everyone in the export, most episodes first.
    pub fn all_people(&self) -> &[Person] {
        &self.people
    }

    pub fn person_by_slug(&self, slug: &str) -> Option<&Person> {
        self.person_by_slug.get(slug).map(|&i| &self.people[i])
    }

    /// Episodes a person appeared on with the role they held, newest first.
    ///
    /// Unknown slugs yield an empty list.
    pub fn episodes_by_person(&self, person_slug: &str) -> Vec<PersonEpisode> {
        self.person_by_slug(person_slug)
            .and_then(|p| self.person_episodes.get(&p.id))
            .cloned()
            .unwrap_or_default()
    }

    /// Slugs of all series, longest first. Used for legacy URL matching.
    pub fn series_slugs_longest_first(&self) -> Vec<String> {
        let mut slugs: Vec<String> = self.all_series().iter().map(|s| s.slug.clone()).collect();
        slugs.sort_by(|a, b| b.len().cmp(&a.len()));
        slugs
    }
}

impl<'a> Lookups<'a> {
    fn new(raw: &'a RawExport) -> Result<Self, ResolveError> {
        let series_by_id: HashMap<u64, &RawSeries> = raw.series.iter().map(|s| (s.id, s)).collect();
        let mut slug_by_episode = HashMap::with_capacity(raw.episodes.len());
        for ep in &raw.episodes {
            let series = series_by_id
                .get(&ep.series_id)
                .ok_or(ResolveError::MissingSeries {
                    episode_id: ep.id,
                    series_id: ep.series_id,
                })?;
            slug_by_episode.insert(ep.id, episode_slug(&series.slug, &ep.number));
        }
        Ok(Self {
            series_by_id,
            episode_by_id: raw.episodes.iter().map(|e| (e.id, e)).collect(),
            person_by_id: raw.people.iter().map(|p| (p.id, p)).collect(),
            slug_by_episode,
        })
    }
}

/// Slug for a person page. Names with no slug-able characters fall back to
/// `person-{id}` so the page never lands on the people index.
fn person_slug(person: &RawPerson) -> String {
    let slug = slugify(&person.name);
    if slug.is_empty() {
        warn!(id = person.id, name = %person.name, "person name has no slug; using id");
        return format!("person-{}", person.id);
    }
    slug
}

/// Map slugs to their first position, logging collisions.
fn slug_positions<'a>(slugs: impl Iterator<Item = &'a str>, what: &str) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (i, slug) in slugs.enumerate() {
        if map.contains_key(slug) {
            warn!(slug, kind = what, "duplicate slug; keeping the first");
            continue;
        }
        map.insert(slug.to_string(), i);
    }
    map
}

fn first_positions<'a>(slugs: impl Iterator<Item = &'a str>) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (i, slug) in slugs.enumerate() {
        map.entry(slug.to_string()).or_insert(i);
    }
    map
}

/// Case-insensitive name ordering; on a tie lowercase sorts before uppercase.
fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}
