//! Chart-side feature encoding
//!
//! Chart albums are joined with trusted search matches on (artist, album) to
//! pick up their catalog `album_id`, then encoded as:
//! - `decade`: `floor((year - 1959) / 10) / 6`
//! - one 0/1 column per genre, alphabetically ordered
//! - target: discretized rating

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::Datelike;
use tracing::{debug, info};

use mrai_common::columns::DECADE_CLASS;

use crate::features::{discretize, GenreMapper};
use crate::models::{round_to, AlbumRecord, ProcessedSearchRow, RymFeatureRow, RymFeatureTable};

/// First year of decade class 0
pub const DECADE_ORIGIN_YEAR: i32 = 1959;
/// Decade classes are scaled into [0, 1] by this many decades
pub const DECADE_SPAN: f64 = 6.0;

const DECADE_DECIMALS: i32 = 4;

/// Normalized decade bucket of a release year
pub fn decade_class(year: i32) -> f64 {
    let bucket = (year - DECADE_ORIGIN_YEAR).div_euclid(10);
    round_to(f64::from(bucket) / DECADE_SPAN, DECADE_DECIMALS)
}

/// Genre set of one album: mapped when a table is available, else the
/// trimmed lower-cased raw tags
fn album_genres(record: &AlbumRecord, mapper: Option<&GenreMapper>) -> BTreeSet<String> {
    match mapper {
        Some(mapper) => mapper.map_many(&record.genre_tags),
        None => record
            .genre_tags
            .iter()
            .map(|tag| tag.trim().to_lowercase())
            .filter(|tag| !tag.is_empty())
            .collect(),
    }
}

/// Encode the chart-side features of every resolved album
pub fn select_rym_features(
    records: &[AlbumRecord],
    searches: &[ProcessedSearchRow],
    mapper: Option<&GenreMapper>,
) -> RymFeatureTable {
    let album_ids: HashMap<(&str, &str), &str> = searches
        .iter()
        .map(|s| ((s.artist.as_str(), s.album.as_str()), s.album_id.as_str()))
        .collect();

    let mut seen = HashSet::new();
    let mut joined: Vec<(&str, &AlbumRecord, BTreeSet<String>, u8)> = Vec::new();
    for record in records {
        let Some(&album_id) = album_ids.get(&(record.artist.as_str(), record.album.as_str()))
        else {
            continue;
        };
        if !seen.insert(album_id) {
            debug!(
                album_id,
                artist = %record.artist,
                album = %record.album,
                "Album already selected"
            );
            continue;
        }
        let Some(target) = discretize(record.rating) else {
            debug!(album_id, rating = record.rating, "Rating has no class");
            continue;
        };
        joined.push((album_id, record, album_genres(record, mapper), target));
    }

    let genre_columns: Vec<String> = joined
        .iter()
        .flat_map(|(_, _, genres, _)| genres.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let rows: Vec<RymFeatureRow> = joined
        .into_iter()
        .map(|(album_id, record, genres, target)| {
            let mut features = Vec::with_capacity(genre_columns.len() + 1);
            features.push(decade_class(record.release_date.year()));
            features.extend(
                genre_columns
                    .iter()
                    .map(|g| if genres.contains(g) { 1.0 } else { 0.0 }),
            );
            RymFeatureRow {
                album_id: album_id.to_string(),
                features,
                target,
            }
        })
        .collect();

    let mut columns = Vec::with_capacity(genre_columns.len() + 1);
    columns.push(DECADE_CLASS.to_string());
    columns.extend(genre_columns);

    info!(
        chart_albums = records.len(),
        resolved = searches.len(),
        selected = rows.len(),
        genres = columns.len() - 1,
        "Selected chart features"
    );
    RymFeatureTable { columns, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::GenreTable;
    use chrono::NaiveDate;

    fn record(artist: &str, album: &str, year: i32, rating: f64, genres: &[&str]) -> AlbumRecord {
        AlbumRecord {
            artist: artist.into(),
            album: album.into(),
            release_date: NaiveDate::from_ymd_opt(year, 6, 1).unwrap(),
            rating,
            rating_count: 500,
            genre_tags: genres.iter().map(|g| g.to_string()).collect(),
        }
    }

    fn search(artist: &str, album: &str, album_id: &str) -> ProcessedSearchRow {
        ProcessedSearchRow {
            album: album.into(),
            artist: artist.into(),
            album_id: album_id.into(),
            spotify_album: album.into(),
            spotify_artist: artist.into(),
            precision_match: 4,
            num_tracks: 10,
            num_features: 10,
        }
    }

    #[test]
    fn decade_buckets() {
        assert_eq!(decade_class(1959), 0.0);
        assert_eq!(decade_class(1968), 0.0);
        assert_eq!(decade_class(1969), round_to(1.0 / 6.0, 4));
        assert_eq!(decade_class(2019), 1.0);
        assert!(decade_class(1950) < 0.0);
    }

    #[test]
    fn encodes_joined_albums_only() {
        let records = vec![
            record("Pink Floyd", "The Wall", 1979, 3.9, &["Progressive Rock", "Art Rock"]),
            record("Talking Heads", "Remain in Light", 1980, 3.6, &["New Wave", "Art Rock"]),
            record("Unresolved", "Nowhere", 1990, 3.0, &["Noise"]),
        ];
        let searches = vec![
            search("Pink Floyd", "The Wall", "wall"),
            search("Talking Heads", "Remain in Light", "light"),
        ];

        let table = select_rym_features(&records, &searches, None);

        assert_eq!(
            table.columns,
            vec!["decade", "art rock", "new wave", "progressive rock"]
        );
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].album_id, "wall");
        assert_eq!(table.rows[0].features, vec![round_to(2.0 / 6.0, 4), 1.0, 0.0, 1.0]);
        assert_eq!(table.rows[0].target, 5);
        assert_eq!(table.rows[1].features, vec![round_to(2.0 / 6.0, 4), 1.0, 1.0, 0.0]);
        assert_eq!(table.rows[1].target, 4);
    }

    #[test]
    fn uses_genre_table_when_configured() {
        let mut table = GenreTable::new();
        table.insert(
            "progressive rock".into(),
            BTreeSet::from(["progressive".to_string(), "rock".to_string()]),
        );
        let mapper = GenreMapper::from_mapping(table);

        let records = vec![record(
            "Yes",
            "Close to the Edge",
            1972,
            4.2,
            &["Progressive Rock", "Symphonic Prog"],
        )];
        let searches = vec![search("Yes", "Close to the Edge", "edge")];

        let out = select_rym_features(&records, &searches, Some(&mapper));
        assert_eq!(out.columns, vec!["decade", "progressive", "rock"]);
        assert_eq!(out.rows[0].features, vec![decade_class(1972), 1.0, 1.0]);
    }
}
