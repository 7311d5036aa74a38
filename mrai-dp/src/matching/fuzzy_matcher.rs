//! Best-candidate selection for chart albums
//!
//! Each candidate gets four boolean sub-scores on canonical names:
//! exact artist, artist containment, exact album, album containment. The
//! candidate with the highest sum wins; on ties the earliest candidate (in
//! API order) is kept.

use tracing::{debug, warn};

use super::canonicalizer::{canonical_contains, canonicalize, NameRole};
use crate::models::{MatchResult, SearchCandidate};

/// Highest achievable precision score
pub const MAX_PRECISION: u8 = 4;

/// Sub-scores of one candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchScore {
    pub exact_artist: bool,
    pub contains_artist: bool,
    pub exact_album: bool,
    pub contains_album: bool,
}

impl MatchScore {
    /// Number of true sub-scores, 0..=4
    pub fn total(&self) -> u8 {
        [
            self.exact_artist,
            self.contains_artist,
            self.exact_album,
            self.contains_album,
        ]
        .iter()
        .filter(|hit| **hit)
        .count() as u8
    }
}

/// Scores catalog search candidates against a chart (artist, album) pair
#[derive(Debug, Clone, Copy, Default)]
pub struct FuzzyMatcher;

impl FuzzyMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Score a single candidate against already-canonical query names
    ///
    /// The candidate's artist credit is compared both as the joined
    /// `"A / B"` string and per credited artist, so a query naming only one
    /// collaborator still counts as an exact artist match.
    pub fn score_candidate(
        &self,
        query_artist: &str,
        query_album: &str,
        candidate: &SearchCandidate,
    ) -> MatchScore {
        let joined_artist = canonicalize(&candidate.joined_artists(), NameRole::Artist);
        let candidate_album = canonicalize(&candidate.album_name, NameRole::Album);

        let credited: Vec<String> = candidate
            .artist_names
            .iter()
            .map(|name| canonicalize(name, NameRole::Artist))
            .collect();

        let exact_artist = !query_artist.is_empty()
            && (joined_artist == query_artist || credited.iter().any(|name| name == query_artist));
        let contains_artist = canonical_contains(query_artist, &joined_artist)
            || credited
                .iter()
                .any(|name| canonical_contains(query_artist, name));

        MatchScore {
            exact_artist,
            contains_artist,
            exact_album: !query_album.is_empty() && candidate_album == query_album,
            contains_album: canonical_contains(query_album, &candidate_album),
        }
    }

    /// Pick the best candidate for a chart album
    ///
    /// Returns [`MatchResult::none`] for an empty list. A best score of 0
    /// still returns the first candidate and logs a warning.
    pub fn best_match(
        &self,
        artist: &str,
        album: &str,
        candidates: &[SearchCandidate],
    ) -> MatchResult {
        if candidates.is_empty() {
            debug!(artist, album, "No search candidates");
            return MatchResult::none();
        }

        let query_artist = canonicalize(artist, NameRole::Artist);
        let query_album = canonicalize(album, NameRole::Album);

        let mut best: Option<(&SearchCandidate, u8)> = None;
        for candidate in candidates {
            let score = self
                .score_candidate(&query_artist, &query_album, candidate)
                .total();
            // Strictly greater keeps the earliest candidate on ties
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((candidate, score));
            }
            if score == MAX_PRECISION {
                break;
            }
        }

        match best {
            Some((candidate, score)) => {
                if score == 0 {
                    warn!(
                        artist,
                        album,
                        candidate = %candidate.external_id,
                        "No textual evidence for any search candidate"
                    );
                }
                MatchResult::from_candidate(candidate, score)
            }
            None => MatchResult::none(),
        }
    }
}
