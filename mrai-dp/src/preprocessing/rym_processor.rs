//! Chart-scrape cleaning
//!
//! Raw rows → [`AlbumRecord`]s:
//! 1. drop rows with any empty field
//! 2. parse the textual date, the rating and the rating count
//! 3. keep the last scraped row per (artist, album)
//! 4. drop albums below the rating-count threshold
//! 5. stable sort by release date

use std::collections::HashMap;

use tracing::{debug, info};

use crate::features::rating_discretizer::{MAX_RATING, MIN_RATING};
use crate::models::{parse_release_date, split_genres, AlbumRecord, RymRawRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RymStats {
    pub input: usize,
    pub dropped_incomplete: usize,
    pub dropped_unparsable: usize,
    pub dropped_duplicates: usize,
    pub dropped_low_count: usize,
    pub output: usize,
}

/// `"1,234"` → 1234
pub fn parse_rating_count(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
    digits.parse().ok()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

enum RowOutcome {
    Record(AlbumRecord),
    Incomplete,
    Unparsable,
}

fn to_record(row: RymRawRow) -> RowOutcome {
    let (Some(artist), Some(album), Some(date), Some(rating), Some(count), Some(genres)) = (
        non_empty(row.artist),
        non_empty(row.album),
        non_empty(row.date),
        row.rating,
        non_empty(row.rating_number),
        non_empty(row.genres),
    ) else {
        return RowOutcome::Incomplete;
    };

    let Some(release_date) = parse_release_date(&date) else {
        debug!(artist = %artist, album = %album, date = %date, "Unparsable release date");
        return RowOutcome::Unparsable;
    };
    let Some(rating_count) = parse_rating_count(&count) else {
        debug!(artist = %artist, album = %album, count = %count, "Unparsable rating count");
        return RowOutcome::Unparsable;
    };
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        debug!(artist = %artist, album = %album, rating, "Rating out of range");
        return RowOutcome::Unparsable;
    }

    RowOutcome::Record(AlbumRecord {
        artist,
        album,
        release_date,
        rating,
        rating_count,
        genre_tags: split_genres(&genres),
    })
}

/// Clean a raw chart scrape
pub fn process_rym(rows: Vec<RymRawRow>, min_rating_count: u64) -> (Vec<AlbumRecord>, RymStats) {
    let mut stats = RymStats {
        input: rows.len(),
        ..Default::default()
    };

    let mut parsed = Vec::with_capacity(rows.len());
    for row in rows {
        match to_record(row) {
            RowOutcome::Record(record) => parsed.push(record),
            RowOutcome::Incomplete => stats.dropped_incomplete += 1,
            RowOutcome::Unparsable => stats.dropped_unparsable += 1,
        }
    }

    // Last occurrence wins and keeps its position
    let parsed_len = parsed.len();
    let mut last_index: HashMap<(&str, &str), usize> = HashMap::new();
    for (i, record) in parsed.iter().enumerate() {
        last_index.insert(record.identity(), i);
    }
    let keep: Vec<bool> = parsed
        .iter()
        .enumerate()
        .map(|(i, record)| last_index.get(&record.identity()) == Some(&i))
        .collect();
    let deduped: Vec<AlbumRecord> = parsed
        .into_iter()
        .zip(keep)
        .filter_map(|(record, keep)| keep.then_some(record))
        .collect();
    stats.dropped_duplicates = parsed_len - deduped.len();
    let deduped_len = deduped.len();

    let mut records: Vec<AlbumRecord> = deduped
        .into_iter()
        .filter(|record| {
            let keep = record.rating_count >= min_rating_count;
            if !keep {
                debug!(
                    artist = %record.artist,
                    album = %record.album,
                    count = record.rating_count,
                    "Too few ratings"
                );
            }
            keep
        })
        .collect();
    stats.dropped_low_count = deduped_len - records.len();

    records.sort_by_key(|record| record.release_date);
    stats.output = records.len();

    info!(
        input = stats.input,
        incomplete = stats.dropped_incomplete,
        unparsable = stats.dropped_unparsable,
        duplicates = stats.dropped_duplicates,
        low_count = stats.dropped_low_count,
        output = stats.output,
        "Processed chart albums"
    );
    (records, stats)
}
