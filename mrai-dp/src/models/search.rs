//! Catalog search candidates and match results

use serde::{Deserialize, Serialize};

/// Album returned by the catalog search API
///
/// Transient: consumed once by the fuzzy matcher, never persisted beyond the
/// chosen best match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchCandidate {
    pub external_id: String,
    /// All credited artists; collaborations carry several names
    pub artist_names: Vec<String>,
    pub album_name: String,
}

impl SearchCandidate {
    pub fn new(
        external_id: impl Into<String>,
        artist_names: Vec<String>,
        album_name: impl Into<String>,
    ) -> Self {
        Self {
            external_id: external_id.into(),
            artist_names,
            album_name: album_name.into(),
        }
    }

    /// Artist credit as persisted in the search table (`"A / B"`)
    pub fn joined_artists(&self) -> String {
        self.artist_names.join(" / ")
    }
}

/// Outcome of resolving one chart album against the catalog
///
/// `precision_score` counts the true sub-matches (exact artist, contains
/// artist, exact album, contains album). A score of 0 means no textual
/// evidence; the result is still kept so a downstream threshold decides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub external_id: Option<String>,
    pub matched_artist: Option<String>,
    pub matched_album: Option<String>,
    pub precision_score: u8,
}

impl MatchResult {
    /// Result for an empty candidate list
    pub fn none() -> Self {
        Self {
            external_id: None,
            matched_artist: None,
            matched_album: None,
            precision_score: 0,
        }
    }

    pub fn from_candidate(candidate: &SearchCandidate, precision_score: u8) -> Self {
        Self {
            external_id: Some(candidate.external_id.clone()),
            matched_artist: Some(candidate.joined_artists()),
            matched_album: Some(candidate.album_name.clone()),
            precision_score,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.external_id.is_none()
    }

    /// Whether the match clears the downstream confidence gate
    pub fn is_trusted(&self, min_precision: u8) -> bool {
        !self.is_empty() && self.precision_score >= min_precision
    }
}

/// Row of the search-match table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchMatchRow {
    pub album: String,
    pub artist: String,
    pub album_id: Option<String>,
    pub spotify_album: Option<String>,
    pub spotify_artist: Option<String>,
    /// Empty for rows that were never searched
    pub precision_match: Option<u8>,
}

impl SearchMatchRow {
    pub fn from_match(artist: &str, album: &str, result: MatchResult) -> Self {
        Self {
            album: album.to_string(),
            artist: artist.to_string(),
            album_id: result.external_id,
            spotify_album: result.matched_album,
            spotify_artist: result.matched_artist,
            precision_match: Some(result.precision_score),
        }
    }
}

/// Row of the processed search table: a trusted match with its track counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedSearchRow {
    pub album: String,
    pub artist: String,
    pub album_id: String,
    pub spotify_album: String,
    pub spotify_artist: String,
    pub precision_match: u8,
    /// Tracks listed for the album in the identity table
    pub num_tracks: usize,
    /// Tracks left after feature cleaning and selection
    pub num_features: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_match_is_never_trusted() {
        let none = MatchResult::none();
        assert!(none.is_empty());
        assert!(!none.is_trusted(0));
    }

    #[test]
    fn candidate_match_uses_joined_artist_credit() {
        let candidate = SearchCandidate::new(
            "4LH4d3cOWNNsVw41Gqt2kv",
            vec!["David Bowie".into(), "Queen".into()],
            "Under Pressure",
        );
        let result = MatchResult::from_candidate(&candidate, 3);
        assert_eq!(result.matched_artist.as_deref(), Some("David Bowie / Queen"));
        assert!(result.is_trusted(3));
        assert!(!result.is_trusted(4));

        let row = SearchMatchRow::from_match("David Bowie & Queen", "Under Pressure", result);
        assert_eq!(row.album_id.as_deref(), Some("4LH4d3cOWNNsVw41Gqt2kv"));
        assert_eq!(row.precision_match, Some(3));
    }
}
