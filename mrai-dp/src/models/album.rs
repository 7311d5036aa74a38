//! Chart-scrape album records

use chrono::{Month, NaiveDate};
use serde::{Deserialize, Serialize};

/// Row of the raw chart-scrape table
///
/// Every field is optional: rows with any missing value are dropped by the
/// chart processor rather than failing the batch.
#[derive(Debug, Clone, Deserialize)]
pub struct RymRawRow {
    pub artist: Option<String>,
    pub album: Option<String>,
    pub date: Option<String>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub rating: Option<f64>,
    pub rating_number: Option<String>,
    pub genres: Option<String>,
}

/// Album scraped from the rating chart
#[derive(Debug, Clone, PartialEq)]
pub struct AlbumRecord {
    pub artist: String,
    pub album: String,
    /// Partial dates are completed with day 1 / January
    pub release_date: NaiveDate,
    /// Average rating in [0, 5]
    pub rating: f64,
    pub rating_count: u64,
    /// Genre tags in chart order
    pub genre_tags: Vec<String>,
}

impl AlbumRecord {
    /// Key used for deduplication and for joining with search results
    pub fn identity(&self) -> (&str, &str) {
        (&self.artist, &self.album)
    }
}

/// Row of the processed chart table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RymProcessedRow {
    pub artist: String,
    pub album: String,
    pub date: NaiveDate,
    pub rating: f64,
    pub rating_number: u64,
    pub genres: String,
}

impl From<&AlbumRecord> for RymProcessedRow {
    fn from(record: &AlbumRecord) -> Self {
        Self {
            artist: record.artist.clone(),
            album: record.album.clone(),
            date: record.release_date,
            rating: record.rating,
            rating_number: record.rating_count,
            genres: record.genre_tags.join(", "),
        }
    }
}

impl From<RymProcessedRow> for AlbumRecord {
    fn from(row: RymProcessedRow) -> Self {
        Self {
            genre_tags: split_genres(&row.genres),
            artist: row.artist,
            album: row.album,
            release_date: row.date,
            rating: row.rating,
            rating_count: row.rating_number,
        }
    }
}

/// Split comma-separated genre text into trimmed, non-empty tags
pub fn split_genres(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a chart release date
///
/// Accepts `"1 September 1990"`, `"September 1990"` and `"1990"`. A missing
/// day defaults to 1 and a missing month to January.
pub fn parse_release_date(text: &str) -> Option<NaiveDate> {
    let mut parts = text.split_whitespace().rev();

    let year: i32 = parts.next()?.parse().ok()?;
    let month = match parts.next() {
        Some(name) => name.parse::<Month>().ok()?.number_from_month(),
        None => 1,
    };
    let day = match parts.next() {
        Some(day) => day.parse().ok()?,
        None => 1,
    };

    if parts.next().is_some() {
        return None;
    }

    NaiveDate::from_ymd_opt(year, month, day)
}
