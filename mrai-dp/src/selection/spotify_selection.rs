//! Catalog-side feature encoding: rescale, then reshape each album to a
//! fixed track count

use tracing::info;

use crate::features::{AudioFeatureNormalizer, TrackSetReshaper};
use crate::models::{ProcessedTrackRow, TrackFeatureVector};

/// Rescaled, fixed-length track sequences sorted by `(album_id, track_number)`
pub fn select_spotify_features(
    tracks: &[ProcessedTrackRow],
    normalizer: &AudioFeatureNormalizer,
    reshaper: &TrackSetReshaper,
) -> Vec<TrackFeatureVector> {
    let rescaled: Vec<TrackFeatureVector> = tracks
        .iter()
        .map(|track| {
            let mut vector = track.to_vector();
            vector.features = normalizer.rescale(&vector.features);
            vector
        })
        .collect();

    let reshaped = reshaper.reshape_all(rescaled);
    info!(
        tracks_in = tracks.len(),
        tracks_out = reshaped.len(),
        "Selected catalog features"
    );
    reshaped
}
