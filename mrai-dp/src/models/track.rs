//! Per-track audio descriptors and identities

use serde::{Deserialize, Serialize};

/// Number of audio descriptors carried per track
pub const FEATURE_COUNT: usize = 13;

/// Round to a fixed number of decimal digits
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// The 13 audio descriptors of one track
///
/// Field order matches [`mrai_common::columns::SPOTIFY_FEATURES`], which is
/// also the order of [`AudioFeatures::to_array`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub danceability: f64,
    pub energy: f64,
    pub key: f64,
    pub loudness: f64,
    pub mode: f64,
    pub speechiness: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    pub valence: f64,
    pub tempo: f64,
    pub duration_ms: f64,
    pub time_signature: f64,
}

impl AudioFeatures {
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.danceability,
            self.energy,
            self.key,
            self.loudness,
            self.mode,
            self.speechiness,
            self.acousticness,
            self.instrumentalness,
            self.liveness,
            self.valence,
            self.tempo,
            self.duration_ms,
            self.time_signature,
        ]
    }

    pub fn from_array(v: [f64; FEATURE_COUNT]) -> Self {
        Self {
            danceability: v[0],
            energy: v[1],
            key: v[2],
            loudness: v[3],
            mode: v[4],
            speechiness: v[5],
            acousticness: v[6],
            instrumentalness: v[7],
            liveness: v[8],
            valence: v[9],
            tempo: v[10],
            duration_ms: v[11],
            time_signature: v[12],
        }
    }

    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }

    /// Every descriptor rounded to `decimals` digits
    pub fn rounded(&self, decimals: i32) -> Self {
        Self::from_array(self.to_array().map(|v| round_to(v, decimals)))
    }
}

/// Raw descriptors of one catalog track, before cleaning
#[derive(Debug, Clone, PartialEq)]
pub struct RawTrackFeatures {
    pub song_id: String,
    pub features: AudioFeatures,
}

/// Row of the per-track feature table
///
/// Descriptors are optional so rows with gaps can be dropped instead of
/// failing deserialization of the whole batch.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackFeaturesRow {
    pub song_id: String,
    pub danceability: Option<f64>,
    pub energy: Option<f64>,
    pub key: Option<f64>,
    pub loudness: Option<f64>,
    pub mode: Option<f64>,
    pub speechiness: Option<f64>,
    pub acousticness: Option<f64>,
    pub instrumentalness: Option<f64>,
    pub liveness: Option<f64>,
    pub valence: Option<f64>,
    pub tempo: Option<f64>,
    pub duration_ms: Option<f64>,
    pub time_signature: Option<f64>,
}

impl TrackFeaturesRow {
    /// Complete row as raw features, `None` if any descriptor is missing
    pub fn into_raw(self) -> Option<RawTrackFeatures> {
        if self.song_id.trim().is_empty() {
            return None;
        }
        let features = AudioFeatures {
            danceability: self.danceability?,
            energy: self.energy?,
            key: self.key?,
            loudness: self.loudness?,
            mode: self.mode?,
            speechiness: self.speechiness?,
            acousticness: self.acousticness?,
            instrumentalness: self.instrumentalness?,
            liveness: self.liveness?,
            valence: self.valence?,
            tempo: self.tempo?,
            duration_ms: self.duration_ms?,
            time_signature: self.time_signature?,
        };
        Some(RawTrackFeatures {
            song_id: self.song_id,
            features,
        })
    }
}

/// Row of the per-track identity table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackIdentity {
    pub album_id: String,
    pub song_id: String,
    pub song_name: String,
    pub song_number: u32,
    pub song_artists_number: u32,
}

/// Cleaned descriptors joined with the track identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedTrackRow {
    pub song_id: String,
    pub danceability: f64,
    pub energy: f64,
    pub key: f64,
    pub loudness: f64,
    pub mode: f64,
    pub speechiness: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    pub valence: f64,
    pub tempo: f64,
    pub duration_ms: f64,
    pub time_signature: f64,
    pub album_id: String,
    pub song_name: String,
    pub song_number: u32,
    pub song_artists_number: u32,
}

impl ProcessedTrackRow {
    pub fn new(features: &RawTrackFeatures, identity: &TrackIdentity) -> Self {
        let f = &features.features;
        Self {
            song_id: features.song_id.clone(),
            danceability: f.danceability,
            energy: f.energy,
            key: f.key,
            loudness: f.loudness,
            mode: f.mode,
            speechiness: f.speechiness,
            acousticness: f.acousticness,
            instrumentalness: f.instrumentalness,
            liveness: f.liveness,
            valence: f.valence,
            tempo: f.tempo,
            duration_ms: f.duration_ms,
            time_signature: f.time_signature,
            album_id: identity.album_id.clone(),
            song_name: identity.song_name.clone(),
            song_number: identity.song_number,
            song_artists_number: identity.song_artists_number,
        }
    }

    pub fn features(&self) -> AudioFeatures {
        AudioFeatures {
            danceability: self.danceability,
            energy: self.energy,
            key: self.key,
            loudness: self.loudness,
            mode: self.mode,
            speechiness: self.speechiness,
            acousticness: self.acousticness,
            instrumentalness: self.instrumentalness,
            liveness: self.liveness,
            valence: self.valence,
            tempo: self.tempo,
            duration_ms: self.duration_ms,
            time_signature: self.time_signature,
        }
    }

    pub fn to_vector(&self) -> TrackFeatureVector {
        TrackFeatureVector {
            album_id: self.album_id.clone(),
            track_id: self.song_id.clone(),
            track_number: self.song_number,
            features: self.features(),
            padded: false,
        }
    }
}

/// One track's descriptors positioned within its album
#[derive(Debug, Clone, PartialEq)]
pub struct TrackFeatureVector {
    pub album_id: String,
    pub track_id: String,
    /// 1-based position; padding rows continue after the real tracks
    pub track_number: u32,
    pub features: AudioFeatures,
    /// True for synthetic rows created by padding
    pub padded: bool,
}

/// Row of the selected (rescaled, reshaped) feature table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedTrackRow {
    pub album_id: String,
    pub song_number: u32,
    pub danceability: f64,
    pub energy: f64,
    pub key: f64,
    pub loudness: f64,
    pub mode: f64,
    pub speechiness: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    pub valence: f64,
    pub tempo: f64,
    pub duration_ms: f64,
    pub time_signature: f64,
}

impl From<&TrackFeatureVector> for SelectedTrackRow {
    fn from(track: &TrackFeatureVector) -> Self {
        let f = &track.features;
        Self {
            album_id: track.album_id.clone(),
            song_number: track.track_number,
            danceability: f.danceability,
            energy: f.energy,
            key: f.key,
            loudness: f.loudness,
            mode: f.mode,
            speechiness: f.speechiness,
            acousticness: f.acousticness,
            instrumentalness: f.instrumentalness,
            liveness: f.liveness,
            valence: f.valence,
            tempo: f.tempo,
            duration_ms: f.duration_ms,
            time_signature: f.time_signature,
        }
    }
}

impl From<SelectedTrackRow> for TrackFeatureVector {
    fn from(row: SelectedTrackRow) -> Self {
        let features = AudioFeatures {
            danceability: row.danceability,
            energy: row.energy,
            key: row.key,
            loudness: row.loudness,
            mode: row.mode,
            speechiness: row.speechiness,
            acousticness: row.acousticness,
            instrumentalness: row.instrumentalness,
            liveness: row.liveness,
            valence: row.valence,
            tempo: row.tempo,
            duration_ms: row.duration_ms,
            time_signature: row.time_signature,
        };
        Self {
            track_id: String::new(),
            album_id: row.album_id,
            track_number: row.song_number,
            features,
            padded: false,
        }
    }
}
