//! Fixed-length track sequences per album
//!
//! Every album leaves with exactly `target_len` tracks ordered by
//! `track_number`:
//! - more tracks than needed: keep the smallest track numbers
//! - fewer: pad after the last real track, either by cycling the real
//!   tracks' descriptors (`repeat`) or with their column-wise mean (`mean`)
//!
//! Padding rows get fresh track numbers following the real ones and are
//! flagged `padded`. Albums are independent, so [`TrackSetReshaper::reshape_all`]
//! partitions by `album_id` and reshapes in parallel.

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::{debug, info};

use mrai_common::config::{FeaturesConfig, PaddingPolicy, ThresholdsConfig};

use crate::models::{round_to, AudioFeatures, TrackFeatureVector, FEATURE_COUNT};

/// Decimal digits kept for mean padding rows
const MEAN_DECIMALS: i32 = 4;

#[derive(Debug, Clone, Copy)]
pub struct TrackSetReshaper {
    target_len: usize,
    min_tracks: usize,
    policy: PaddingPolicy,
}

impl TrackSetReshaper {
    pub fn new(target_len: usize, min_tracks: usize, policy: PaddingPolicy) -> Self {
        Self {
            target_len,
            min_tracks,
            policy,
        }
    }

    pub fn from_config(thresholds: &ThresholdsConfig, features: &FeaturesConfig) -> Self {
        Self::new(
            thresholds.album_track_count,
            thresholds.min_album_tracks,
            features.padding,
        )
    }

    /// Keep at most `target_len` tracks with the smallest track numbers
    ///
    /// Ties on `track_number` fall back to `track_id` so the choice does not
    /// depend on input order.
    pub fn select_first(&self, mut tracks: Vec<TrackFeatureVector>) -> Vec<TrackFeatureVector> {
        tracks.sort_by(|a, b| {
            a.track_number
                .cmp(&b.track_number)
                .then_with(|| a.track_id.cmp(&b.track_id))
        });
        tracks.truncate(self.target_len);
        tracks
    }

    /// Reshape one album's tracks to exactly `target_len` entries
    ///
    /// Returns `None` only for an empty input; the minimum-track gate is
    /// applied by [`reshape_all`](Self::reshape_all).
    pub fn reshape(&self, tracks: Vec<TrackFeatureVector>) -> Option<Vec<TrackFeatureVector>> {
        let mut selected = self.select_first(tracks);
        let count = selected.len();
        if count == 0 {
            return None;
        }
        if count == self.target_len {
            return Some(selected);
        }

        let album_id = selected[0].album_id.clone();
        // Numbers are normally 1..=count; a gappy album still never reuses one
        let last_number = selected
            .iter()
            .map(|t| t.track_number)
            .max()
            .unwrap_or(0)
            .max(count as u32);
        let deficit = self.target_len - count;

        let padding: Vec<TrackFeatureVector> = match self.policy {
            PaddingPolicy::Repeat => (0..deficit)
                .map(|i| {
                    let source = &selected[i % count];
                    TrackFeatureVector {
                        album_id: album_id.clone(),
                        track_id: source.track_id.clone(),
                        track_number: last_number + i as u32 + 1,
                        features: source.features,
                        padded: true,
                    }
                })
                .collect(),
            PaddingPolicy::Mean => {
                let mean = mean_features(&selected);
                (0..deficit)
                    .map(|i| TrackFeatureVector {
                        album_id: album_id.clone(),
                        track_id: String::new(),
                        track_number: last_number + i as u32 + 1,
                        features: mean,
                        padded: true,
                    })
                    .collect()
            }
        };

        selected.extend(padding);
        Some(selected)
    }

    /// Reshape every album in a batch
    ///
    /// Albums with fewer than `min_tracks` tracks are excluded. Output is
    /// sorted by `(album_id, track_number)`.
    pub fn reshape_all(&self, tracks: Vec<TrackFeatureVector>) -> Vec<TrackFeatureVector> {
        let mut by_album: BTreeMap<String, Vec<TrackFeatureVector>> = BTreeMap::new();
        for track in tracks {
            by_album.entry(track.album_id.clone()).or_default().push(track);
        }
        let albums_in = by_album.len();
        let groups: Vec<(String, Vec<TrackFeatureVector>)> = by_album.into_iter().collect();

        let reshaped: Vec<Vec<TrackFeatureVector>> = groups
            .into_par_iter()
            .filter_map(|(album_id, album_tracks)| {
                if album_tracks.len() < self.min_tracks {
                    debug!(
                        album_id = %album_id,
                        tracks = album_tracks.len(),
                        min = self.min_tracks,
                        "Excluding album with too few tracks"
                    );
                    return None;
                }
                self.reshape(album_tracks)
            })
            .collect();

        info!(
            albums_in,
            albums_out = reshaped.len(),
            target_len = self.target_len,
            policy = ?self.policy,
            "Reshaped album track sets"
        );

        let mut out: Vec<TrackFeatureVector> = reshaped.into_iter().flatten().collect();
        out.sort_by(|a, b| {
            a.album_id
                .cmp(&b.album_id)
                .then_with(|| a.track_number.cmp(&b.track_number))
        });
        out
    }
}

/// Column-wise mean, rounded
fn mean_features(tracks: &[TrackFeatureVector]) -> AudioFeatures {
    let mut sums = [0.0; FEATURE_COUNT];
    for track in tracks {
        for (sum, v) in sums.iter_mut().zip(track.features.to_array()) {
            *sum += v;
        }
    }
    let n = tracks.len().max(1) as f64;
    AudioFeatures::from_array(sums.map(|s| round_to(s / n, MEAN_DECIMALS)))
}
