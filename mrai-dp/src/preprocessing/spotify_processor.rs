//! Catalog-side cleaning: track features, track identities, search matches
//!
//! **Order:**
//! 1. dedupe identity rows by `song_id`
//! 2. clean descriptors ([`AudioFeatureNormalizer::clean`])
//! 3. inner-join descriptors with identities on `song_id`
//! 4. drop albums with fewer than `min_album_tracks` tracks
//! 5. keep the first `album_track_count` tracks per album
//! 6. keep trusted, matched, unique search rows for albums that still have
//!    tracks, with their track counts attached

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, info};

use mrai_common::config::ThresholdsConfig;

use crate::features::AudioFeatureNormalizer;
use crate::models::{
    ProcessedSearchRow, ProcessedTrackRow, RawTrackFeatures, SearchMatchRow, TrackIdentity,
};

/// Cleaned catalog tables
#[derive(Debug, Clone, Default)]
pub struct SpotifyOutput {
    /// Sorted by `(album_id, song_number)`
    pub tracks: Vec<ProcessedTrackRow>,
    pub searches: Vec<ProcessedSearchRow>,
}

#[derive(Debug, Clone, Copy)]
pub struct SpotifyProcessor {
    normalizer: AudioFeatureNormalizer,
    min_album_tracks: usize,
    album_track_count: usize,
    min_precision_match: u8,
}

impl SpotifyProcessor {
    pub fn new(thresholds: &ThresholdsConfig) -> Self {
        Self {
            normalizer: AudioFeatureNormalizer::new(),
            min_album_tracks: thresholds.min_album_tracks,
            album_track_count: thresholds.album_track_count,
            min_precision_match: thresholds.min_precision_match,
        }
    }

    pub fn process(
        &self,
        features: Vec<RawTrackFeatures>,
        identities: Vec<TrackIdentity>,
        searches: Vec<SearchMatchRow>,
    ) -> SpotifyOutput {
        let identities = dedupe_identities(identities);
        let (cleaned, _) = self.normalizer.clean(features);
        let tracks = self.join_and_select(cleaned, &identities);
        let searches = self.clean_searches(searches, &identities, &tracks);

        info!(
            tracks = tracks.len(),
            albums = searches.len(),
            "Processed catalog tables"
        );
        SpotifyOutput { tracks, searches }
    }

    fn join_and_select(
        &self,
        features: Vec<RawTrackFeatures>,
        identities: &[TrackIdentity],
    ) -> Vec<ProcessedTrackRow> {
        let by_song: HashMap<&str, &TrackIdentity> = identities
            .iter()
            .map(|identity| (identity.song_id.as_str(), identity))
            .collect();

        let mut by_album: BTreeMap<String, Vec<ProcessedTrackRow>> = BTreeMap::new();
        let mut orphans = 0usize;
        for raw in &features {
            match by_song.get(raw.song_id.as_str()) {
                Some(identity) => by_album
                    .entry(identity.album_id.clone())
                    .or_default()
                    .push(ProcessedTrackRow::new(raw, identity)),
                None => orphans += 1,
            }
        }
        if orphans > 0 {
            debug!(orphans, "Track features without identity row");
        }

        let mut out = Vec::new();
        for (album_id, mut tracks) in by_album {
            if tracks.len() < self.min_album_tracks {
                debug!(
                    album_id = %album_id,
                    tracks = tracks.len(),
                    "Excluding album with too few cleaned tracks"
                );
                continue;
            }
            tracks.sort_by(|a, b| {
                a.song_number
                    .cmp(&b.song_number)
                    .then_with(|| a.song_id.cmp(&b.song_id))
            });
            tracks.truncate(self.album_track_count);
            out.extend(tracks);
        }
        out
    }

    fn clean_searches(
        &self,
        searches: Vec<SearchMatchRow>,
        identities: &[TrackIdentity],
        tracks: &[ProcessedTrackRow],
    ) -> Vec<ProcessedSearchRow> {
        let mut listed: HashMap<&str, usize> = HashMap::new();
        for identity in identities {
            *listed.entry(identity.album_id.as_str()).or_default() += 1;
        }
        let mut kept: HashMap<&str, usize> = HashMap::new();
        for track in tracks {
            *kept.entry(track.album_id.as_str()).or_default() += 1;
        }

        let input = searches.len();
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for row in searches {
            let (Some(album_id), Some(spotify_album), Some(spotify_artist), Some(precision)) = (
                row.album_id.filter(|id| !id.is_empty()),
                row.spotify_album,
                row.spotify_artist,
                row.precision_match,
            ) else {
                continue;
            };
            if !seen.insert(album_id.clone()) {
                debug!(album_id = %album_id, "Duplicate search match");
                continue;
            }
            if precision < self.min_precision_match {
                continue;
            }
            let Some(&num_features) = kept.get(album_id.as_str()) else {
                continue;
            };

            out.push(ProcessedSearchRow {
                num_tracks: listed.get(album_id.as_str()).copied().unwrap_or(0),
                num_features,
                album: row.album,
                artist: row.artist,
                album_id,
                spotify_album,
                spotify_artist,
                precision_match: precision,
            });
        }

        info!(
            input,
            output = out.len(),
            min_precision = self.min_precision_match,
            "Cleaned search matches"
        );
        out
    }
}

/// First identity row per `song_id`
fn dedupe_identities(identities: Vec<TrackIdentity>) -> Vec<TrackIdentity> {
    let mut seen = HashSet::new();
    identities
        .into_iter()
        .filter(|identity| seen.insert(identity.song_id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AudioFeatures;

    fn features(song_id: &str, speechiness: f64) -> RawTrackFeatures {
        RawTrackFeatures {
            song_id: song_id.into(),
            features: AudioFeatures {
                danceability: 0.5,
                energy: 0.6,
                key: 2.0,
                loudness: -9.0,
                mode: 1.0,
                speechiness,
                acousticness: 0.3,
                instrumentalness: 0.1,
                liveness: 0.2,
                valence: 0.5,
                tempo: 110.0,
                duration_ms: 200_000.0,
                time_signature: 4.0,
            },
        }
    }

    fn identity(album_id: &str, song_id: &str, number: u32) -> TrackIdentity {
        TrackIdentity {
            album_id: album_id.into(),
            song_id: song_id.into(),
            song_name: format!("Song {}", number),
            song_number: number,
            song_artists_number: 1,
        }
    }

    fn search(album_id: Option<&str>, precision: u8) -> SearchMatchRow {
        SearchMatchRow {
            album: format!("Album {}", album_id.unwrap_or("?")),
            artist: "Artist".into(),
            album_id: album_id.map(String::from),
            spotify_album: album_id.map(|id| format!("Album {}", id)),
            spotify_artist: album_id.map(|_| "Artist".to_string()),
            precision_match: Some(precision),
        }
    }

    fn thresholds() -> ThresholdsConfig {
        ThresholdsConfig {
            min_rating_count: 50,
            min_precision_match: 3,
            min_album_tracks: 4,
            album_track_count: 5,
        }
    }

    #[test]
    fn builds_track_and_search_tables() {
        let mut feats = Vec::new();
        let mut ids = Vec::new();
        // "big": 7 tracks, truncated to 5
        for n in 1..=7 {
            let song = format!("big-{}", n);
            feats.push(features(&song, 0.05));
            ids.push(identity("big", &song, n));
        }
        // "small": 4 listed tracks, one outlier leaves 3
        for n in 1..=4 {
            let song = format!("small-{}", n);
            feats.push(features(&song, if n == 2 { 0.9 } else { 0.05 }));
            ids.push(identity("small", &song, n));
        }
        // Duplicate identity row is ignored
        ids.push(identity("other", "big-1", 1));

        let searches = vec![
            search(Some("big"), 4),
            search(Some("big"), 4),
            search(Some("small"), 4),
            search(None, 0),
            search(Some("weak"), 2),
        ];

        let out = SpotifyProcessor::new(&thresholds()).process(feats, ids, searches);

        assert_eq!(out.tracks.len(), 5);
        assert!(out.tracks.iter().all(|t| t.album_id == "big"));
        let numbers: Vec<u32> = out.tracks.iter().map(|t| t.song_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);

        assert_eq!(out.searches.len(), 1);
        assert_eq!(out.searches[0].album_id, "big");
        assert_eq!(out.searches[0].num_tracks, 7);
        assert_eq!(out.searches[0].num_features, 5);
    }

    #[test]
    fn precision_gate_is_inclusive() {
        let mut feats = Vec::new();
        let mut ids = Vec::new();
        for n in 1..=4 {
            let song = format!("s-{}", n);
            feats.push(features(&song, 0.05));
            ids.push(identity("a", &song, n));
        }
        let out = SpotifyProcessor::new(&thresholds()).process(feats, ids, vec![search(Some("a"), 3)]);
        assert_eq!(out.searches.len(), 1);
        assert_eq!(out.searches[0].precision_match, 3);
    }
}
