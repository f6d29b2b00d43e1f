//! Raw export loading.
//!
//! The site is built from a single JSON export of the network's database.
//! The export is trusted build input: it is read once, validated while it is
//! deserialized, and never written back.
//!
//! ## Format
//!
//! ```json
//! {
//!   "series":            [{ "id": 1, "name": "At The Nexus", "slug": "atn", "description": "..." }],
//!   "episodes":          [{ "id": 10, "name": "Pilot", "number": "1", "series_id": 1, ... }],
//!   "episode_relations": [{ "type": "fringe", "episode_id": 10, "episode_related_id": 22 }],
//!   "episode_medias":    [{ "type": "audio", "episode_id": 10, "length": "1:02:03", "size": "5000", "url": "..." }],
//!   "people":            [{ "id": 3, "name": "Ryan Rampersad", "email": "...", ... }],
//!   "people_relations":  [{ "role": "host", "person_id": 3, "episode_id": 10 }]
//! }
//! ```
//!
//! ## Versioned Filenames
//!
//! Exports are named `nexus-export-<unix-timestamp>.json`. When the CLI is
//! pointed at a directory, [`find_latest_export`] picks the export with the
//! highest timestamp so a fresh dump can be dropped next to the old ones.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No nexus-export-*.json file found in {0}")]
    NotFound(PathBuf),
}

const EXPORT_PREFIX: &str = "nexus-export-";

/// The six top-level arrays of an export.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawExport {
    #[serde(default)]
    pub series: Vec<RawSeries>,
    #[serde(default)]
    pub episodes: Vec<RawEpisode>,
    #[serde(default)]
    pub episode_relations: Vec<RawEpisodeRelation>,
    #[serde(default)]
    pub episode_medias: Vec<RawEpisodeMedia>,
    #[serde(default)]
    pub people: Vec<RawPerson>,
    #[serde(default)]
    pub people_relations: Vec<RawPersonRelation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSeries {
    pub id: u64,
    pub name: String,
    pub slug: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawEpisode {
    pub id: u64,
    pub name: String,
    /// Kept as text: numbers like `"12b"` exist and must survive verbatim.
    #[serde(deserialize_with = "string_or_number")]
    pub number: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    pub series_id: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    Fringe,
    Parent,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawEpisodeRelation {
    #[serde(rename = "type")]
    pub kind: RelationKind,
    pub episode_id: u64,
    pub episode_related_id: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawEpisodeMedia {
    #[serde(rename = "type", default, deserialize_with = "null_as_empty")]
    pub kind: String,
    pub episode_id: u64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub length: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub size: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPerson {
    pub id: u64,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
    #[serde(default)]
    pub email: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Role a person held on one episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Host,
    Guest,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Host => "host",
            Role::Guest => "guest",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPersonRelation {
    pub role: Role,
    pub person_id: u64,
    pub episode_id: u64,
}

/// A timestamp from the export: the parsed instant plus the text it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp {
    pub at: DateTime<Utc>,
    pub raw: String,
}

impl Timestamp {
    /// Parse the timestamp forms found in exports.
    ///
    /// - RFC 3339 (`2012-03-04T05:06:07Z`, `2012-03-04T05:06:07.000+00:00`)
    /// - Naive datetimes (`2012-03-04 05:06:07`, `2012-03-04T05:06:07.123`), read as UTC
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let at = DateTime::parse_from_rfc3339(trimmed)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
                    .iter()
                    .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
                    .map(|naive| naive.and_utc())
            })?;
        Some(Self {
            at,
            raw: raw.to_string(),
        })
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Timestamp::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unrecognized timestamp: {raw:?}")))
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// A loaded export together with where it came from.
#[derive(Debug)]
pub struct LoadedExport {
    pub path: PathBuf,
    /// SHA-256 of the file contents, hex encoded.
    pub fingerprint: String,
    pub data: RawExport,
}

/// Parse an export from a JSON string.
pub fn parse_export(json: &str) -> Result<RawExport, ExportError> {
    Ok(serde_json::from_str(json)?)
}

/// Load an export from a file, or from the newest export in a directory.
pub fn load_export(path: &Path) -> Result<LoadedExport, ExportError> {
    let path = if path.is_dir() {
        find_latest_export(path)?
    } else {
        path.to_path_buf()
    };
    let bytes = fs::read(&path)?;
    let fingerprint = format!("{:x}", Sha256::digest(&bytes));
    let data: RawExport = serde_json::from_slice(&bytes)?;
    tracing::info!(
        export = %path.display(),
        series = data.series.len(),
        episodes = data.episodes.len(),
        people = data.people.len(),
        "loaded export"
    );
    Ok(LoadedExport {
        path,
        fingerprint,
        data,
    })
}

/// Find the `nexus-export-<N>.json` with the highest `N` in `dir`.
pub fn find_latest_export(dir: &Path) -> Result<PathBuf, ExportError> {
    let mut best: Option<(u64, PathBuf)> = None;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(version) = export_version(&path) else {
            continue;
        };
        if best.as_ref().is_none_or(|(v, _)| version > *v) {
            best = Some((version, path));
        }
    }
    best.map(|(_, path)| path)
        .ok_or_else(|| ExportError::NotFound(dir.to_path_buf()))
}

/// Timestamp suffix of an export filename, if it follows the naming scheme.
fn export_version(path: &Path) -> Option<u64> {
    if path.extension()? != "json" {
        return None;
    }
    path.file_stem()?
        .to_str()?
        .strip_prefix(EXPORT_PREFIX)?
        .parse()
        .ok()
}
