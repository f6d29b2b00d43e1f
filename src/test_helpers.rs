//! Shared test fixtures.
//!
//! [`fixture_export`] builds a small network in memory that exercises every
//! join the resolver performs:
//!
//! ```text
//! atn   At The Nexus   atn1 (2011-01-01)  atn2 (2011-02-01)  atn3 (2011-03-01)
//! tf    The Fringe     tf1  (2011-01-15)
//! lab   the lab        lab1 (2011-02-01)   same timestamp as atn2
//! empty Empty Show     (no episodes)
//!
//! atn1 --fringe--> tf1      tf1 --parent--> atn1
//! atn3 --fringe--> tf1      atn2 --fringe--> (missing episode)
//! ```
//!
//! People: Ryan Rampersad hosts atn and guests on lab1, O'Brien-Smith only
//! guests, Jo Host hosts tf1 and lab1, Lurker has no credits at all.

use crate::export::{
    RawEpisode, RawEpisodeMedia, RawEpisodeRelation, RawExport, RawPerson, RawPersonRelation,
    RawSeries, RelationKind, Role, Timestamp,
};
use crate::resolve::Index;

pub fn ts(raw: &str) -> Timestamp {
    Timestamp::parse(raw).unwrap_or_else(|| panic!("bad fixture timestamp {raw:?}"))
}

pub fn raw_series(id: u64, name: &str, slug: &str) -> RawSeries {
    RawSeries {
        id,
        name: name.to_string(),
        slug: slug.to_string(),
        description: format!("All about {name}."),
    }
}

pub fn raw_episode(id: u64, name: &str, number: &str, series_id: u64, created: &str) -> RawEpisode {
    RawEpisode {
        id,
        name: name.to_string(),
        number: number.to_string(),
        content: String::new(),
        description: format!("{name} description"),
        series_id,
        created_at: ts(created),
        updated_at: ts(created),
    }
}

pub fn raw_media(episode_id: u64, url: &str, length: &str, size: &str) -> RawEpisodeMedia {
    RawEpisodeMedia {
        kind: "audio".to_string(),
        episode_id,
        length: length.to_string(),
        size: size.to_string(),
        url: url.to_string(),
    }
}

pub fn raw_person(id: u64, name: &str, email: Option<&str>) -> RawPerson {
    RawPerson {
        id,
        name: name.to_string(),
        content: String::new(),
        email: email.map(str::to_string),
        created_at: ts("2010-01-01 00:00:00"),
        updated_at: ts("2010-01-01 00:00:00"),
    }
}

pub fn relation(kind: RelationKind, episode_id: u64, related: u64) -> RawEpisodeRelation {
    RawEpisodeRelation {
        kind,
        episode_id,
        episode_related_id: related,
    }
}

pub fn credit(role: Role, person_id: u64, episode_id: u64) -> RawPersonRelation {
    RawPersonRelation {
        role,
        person_id,
        episode_id,
    }
}

pub fn fixture_export() -> RawExport {
    let mut pilot = raw_episode(1, "Pilot", "1", 1, "2011-01-01 10:00:00");
    pilot.content = r#"<p>See <a href="https://example.com">this</a> and <a href="/about">that</a>.</p>"#.to_string();

    let mut third = raw_episode(3, "Third", "3", 1, "2011-03-01 10:00:00");
    third.content = "<p>Use <code>a[b[0]]></code> carefully</p>".to_string();

    RawExport {
        series: vec![
            raw_series(1, "At The Nexus", "atn"),
            raw_series(2, "The Fringe", "tf"),
            raw_series(3, "the lab", "lab"),
            raw_series(4, "Empty Show", "empty"),
        ],
        episodes: vec![
            pilot,
            raw_episode(2, "Second", "2", 1, "2011-02-01 10:00:00"),
            third,
            raw_episode(4, "Fringe One", "1", 2, "2011-01-15 10:00:00"),
            raw_episode(5, "Lab One", "1", 3, "2011-02-01 10:00:00"),
        ],
        episode_relations: vec![
            relation(RelationKind::Fringe, 1, 4),
            relation(RelationKind::Parent, 4, 1),
            relation(RelationKind::Fringe, 2, 999),
            relation(RelationKind::Fringe, 3, 4),
        ],
        episode_medias: vec![
            raw_media(1, "http://cdn.example.com/atn1.mp3", "1:02:03", "52428800"),
            raw_media(3, "https://cdn.example.com/atn3.mp3", "45:30", "1048576"),
            raw_media(4, "https://cdn.example.com/tf1.mp3", "90", "2048"),
            raw_media(999, "https://cdn.example.com/ghost.mp3", "1", "1"),
        ],
        people: vec![
            raw_person(10, "Ryan Rampersad", Some("Ryan@Example.com")),
            raw_person(11, "O'Brien-Smith", Some("")),
            raw_person(12, "Lurker", None),
            raw_person(13, "Jo Host", Some("jo@example.com")),
        ],
        people_relations: vec![
            credit(Role::Host, 10, 1),
            credit(Role::Guest, 11, 1),
            credit(Role::Host, 10, 2),
            credit(Role::Guest, 777, 2),
            credit(Role::Host, 10, 3),
            credit(Role::Guest, 10, 5),
            credit(Role::Host, 13, 4),
            credit(Role::Guest, 11, 4),
            credit(Role::Host, 13, 5),
        ],
    }
}

pub fn fixture_index() -> Index {
    Index::build(fixture_export()).expect("fixture export resolves")
}
