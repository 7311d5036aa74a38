//! Column names and table schemas shared by every pipeline stage
//!
//! Stages communicate only through persisted tables, so these constants are
//! the data contract between them. Readers validate headers against the
//! schemas here before deserializing a single row.

use crate::{Error, Result};

// ============================================================================
// Chart scrape
// ============================================================================

pub const ARTIST: &str = "artist";
pub const ALBUM: &str = "album";
pub const DATE: &str = "date";
pub const RATING: &str = "rating";
pub const RATING_NUMBER: &str = "rating_number";
pub const GENRES: &str = "genres";

/// Columns of the raw chart-scrape table, in order.
pub const RYM_COLS: [&str; 6] = [ARTIST, ALBUM, DATE, RATING, RATING_NUMBER, GENRES];

// ============================================================================
// Catalog search
// ============================================================================

pub const ALBUM_ID: &str = "album_id";
pub const SPOTIFY_ALBUM: &str = "spotify_album";
pub const SPOTIFY_ARTIST: &str = "spotify_artist";
pub const PREC_MATCH: &str = "precision_match";
pub const NUM_TRACKS: &str = "num_tracks";
pub const NUM_FEATURES: &str = "num_features";

/// Columns of the search-match table.
pub const SPOTIFY_SEARCH_COLS: [&str; 6] =
    [ALBUM, ARTIST, ALBUM_ID, SPOTIFY_ALBUM, SPOTIFY_ARTIST, PREC_MATCH];

// ============================================================================
// Audio features
// ============================================================================

pub const DANCEABILITY: &str = "danceability";
pub const ENERGY: &str = "energy";
pub const KEY: &str = "key";
pub const LOUDNESS: &str = "loudness";
pub const MODE: &str = "mode";
pub const SPEECHINESS: &str = "speechiness";
pub const ACOUSTICNESS: &str = "acousticness";
pub const INSTRUMENTALNESS: &str = "instrumentalness";
pub const LIVENESS: &str = "liveness";
pub const VALENCE: &str = "valence";
pub const TEMPO: &str = "tempo";
pub const DURATION_MS: &str = "duration_ms";
pub const TIME_SIGNATURE: &str = "time_signature";

/// The 13 audio descriptors, in the positional order used by every
/// flattened feature vector.
pub const SPOTIFY_FEATURES: [&str; 13] = [
    DANCEABILITY,
    ENERGY,
    KEY,
    LOUDNESS,
    MODE,
    SPEECHINESS,
    ACOUSTICNESS,
    INSTRUMENTALNESS,
    LIVENESS,
    VALENCE,
    TEMPO,
    DURATION_MS,
    TIME_SIGNATURE,
];

// ============================================================================
// Track identities
// ============================================================================

pub const SONG_ID: &str = "song_id";
pub const SONG_NAME: &str = "song_name";
pub const SONG_NUMBER: &str = "song_number";
pub const SONG_ARTISTS_NUMBER: &str = "song_artists_number";

/// Columns of the per-track identity table.
pub const SPOTIFY_TRACKS_IDS_COLS: [&str; 5] =
    [ALBUM_ID, SONG_ID, SONG_NAME, SONG_NUMBER, SONG_ARTISTS_NUMBER];

// ============================================================================
// Derived features
// ============================================================================

pub const DECADE_CLASS: &str = "decade";
pub const FEATURE: &str = "feature";

// ============================================================================
// Composite schemas
// ============================================================================

/// Processed search table: search-match columns plus track counts.
pub fn processed_search_cols() -> Vec<&'static str> {
    let mut cols = SPOTIFY_SEARCH_COLS.to_vec();
    cols.extend([NUM_TRACKS, NUM_FEATURES]);
    cols
}

/// Per-track feature table: `song_id` followed by the descriptors.
pub fn track_features_cols() -> Vec<&'static str> {
    let mut cols = vec![SONG_ID];
    cols.extend(SPOTIFY_FEATURES);
    cols
}

/// Processed track table: features joined with the identity columns.
pub fn processed_track_cols() -> Vec<&'static str> {
    let mut cols = track_features_cols();
    cols.extend([ALBUM_ID, SONG_NAME, SONG_NUMBER, SONG_ARTISTS_NUMBER]);
    cols
}

/// Selected track table: album position followed by rescaled descriptors.
pub fn selected_track_cols() -> Vec<&'static str> {
    let mut cols = vec![ALBUM_ID, SONG_NUMBER];
    cols.extend(SPOTIFY_FEATURES);
    cols
}

// ============================================================================
// Structural validation
// ============================================================================

/// Require `found` to equal `expected` exactly, including order.
pub fn validate_exact(table: &str, found: &[String], expected: &[&str]) -> Result<()> {
    if found.len() != expected.len() {
        return Err(Error::Schema(format!(
            "{}: expected {} columns {:?}, found {} {:?}",
            table,
            expected.len(),
            expected,
            found.len(),
            found
        )));
    }

    for (position, (got, want)) in found.iter().zip(expected).enumerate() {
        if got != want {
            return Err(Error::Schema(format!(
                "{}: column {} is '{}', expected '{}'",
                table, position, got, want
            )));
        }
    }

    Ok(())
}

/// Require every column of `required` to appear in `found` (any order,
/// extra columns allowed).
pub fn validate_present(table: &str, found: &[String], required: &[&str]) -> Result<()> {
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|col| !found.iter().any(|f| f == col))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::Schema(format!(
            "{}: missing required columns {:?}",
            table, missing
        )))
    }
}
