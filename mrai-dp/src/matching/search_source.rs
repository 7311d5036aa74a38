//! Catalog search sources and album identity resolution
//!
//! The network fetcher lives outside this crate. [`AlbumSearch`] is the seam
//! it plugs into; [`JsonSearchCache`] replays previously fetched responses
//! from disk so resolution can run offline.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use mrai_common::Result;

use super::fuzzy_matcher::FuzzyMatcher;
use crate::models::{AlbumRecord, SearchCandidate, SearchMatchRow};

/// Source of catalog search candidates for a chart (artist, album) pair
pub trait AlbumSearch {
    /// Candidates in API order; an empty list is a valid answer
    fn search(&self, artist: &str, album: &str) -> Result<Vec<SearchCandidate>>;
}

/// One cached search response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedSearch {
    pub artist: String,
    pub album: String,
    #[serde(default)]
    pub candidates: Vec<SearchCandidate>,
}

/// Search responses loaded from a JSON array of [`CachedSearch`]
#[derive(Debug, Clone, Default)]
pub struct JsonSearchCache {
    entries: HashMap<(String, String), Vec<SearchCandidate>>,
}

impl JsonSearchCache {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let cached: Vec<CachedSearch> = serde_json::from_str(&content)?;
        debug!(path = %path.display(), responses = cached.len(), "Loaded search cache");
        Ok(Self::from_entries(cached))
    }

    /// Later entries for the same query replace earlier ones
    pub fn from_entries(entries: impl IntoIterator<Item = CachedSearch>) -> Self {
        let entries = entries
            .into_iter()
            .map(|e| ((e.artist, e.album), e.candidates))
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AlbumSearch for JsonSearchCache {
    fn search(&self, artist: &str, album: &str) -> Result<Vec<SearchCandidate>> {
        let key = (artist.to_string(), album.to_string());
        match self.entries.get(&key) {
            Some(candidates) => Ok(candidates.clone()),
            None => {
                debug!(artist, album, "No cached search response");
                Ok(Vec::new())
            }
        }
    }
}

/// Resolve every chart album against the catalog
///
/// Emits one search-match row per record, in input order. Records without
/// candidates produce a row with no `album_id` and score 0.
pub fn resolve_identities(
    records: &[AlbumRecord],
    source: &dyn AlbumSearch,
    matcher: &FuzzyMatcher,
) -> Result<Vec<SearchMatchRow>> {
    let mut rows = Vec::with_capacity(records.len());
    let mut unmatched = 0usize;

    for record in records {
        let candidates = source.search(&record.artist, &record.album)?;
        let result = matcher.best_match(&record.artist, &record.album, &candidates);
        if result.is_empty() {
            unmatched += 1;
        }
        rows.push(SearchMatchRow::from_match(&record.artist, &record.album, result));
    }

    info!(
        albums = records.len(),
        unmatched,
        "Resolved album identities"
    );
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(artist: &str, album: &str) -> AlbumRecord {
        AlbumRecord {
            artist: artist.into(),
            album: album.into(),
            release_date: NaiveDate::from_ymd_opt(1979, 11, 30).unwrap(),
            rating: 3.9,
            rating_count: 1000,
            genre_tags: vec!["Progressive Rock".into()],
        }
    }

    #[test]
    fn resolves_cached_and_missing_queries() {
        let cache = JsonSearchCache::from_entries(vec![CachedSearch {
            artist: "Pink Floyd".into(),
            album: "The Wall".into(),
            candidates: vec![SearchCandidate::new(
                "5Dbax7G8SWrP9xyzkOvy2F",
                vec!["Pink Floyd".into()],
                "The Wall",
            )],
        }]);
        let records = vec![record("Pink Floyd", "The Wall"), record("Nobody", "Nothing")];

        let rows = resolve_identities(&records, &cache, &FuzzyMatcher::new()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].album_id.as_deref(), Some("5Dbax7G8SWrP9xyzkOvy2F"));
        assert_eq!(rows[0].precision_match, Some(4));
        assert_eq!(rows[1].album_id, None);
        assert_eq!(rows[1].precision_match, Some(0));
        assert_eq!(rows[1].artist, "Nobody");
    }

    #[test]
    fn loads_cache_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("search_cache.json");
        std::fs::write(
            &path,
            r#"[
                {"artist": "Kino", "album": "Gruppa krovi",
                 "candidates": [{"external_id": "x1", "artist_names": ["Кино"], "album_name": "Группа крови"}]},
                {"artist": "Nobody", "album": "Nothing"}
            ]"#,
        )
        .unwrap();

        let cache = JsonSearchCache::from_json_file(&path).unwrap();
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.search("Kino", "Gruppa krovi").unwrap().len(), 1);
        assert!(cache.search("Nobody", "Nothing").unwrap().is_empty());
    }

    #[test]
    fn malformed_cache_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            JsonSearchCache::from_json_file(&path),
            Err(mrai_common::Error::Json(_))
        ));
    }
}
