//! Outlier handling and rescaling of the 13 audio descriptors
//!
//! **Cleaning** (per row, before dedup and rescaling):
//! - clamp: tempo to [45, 220], duration_ms to at most 600000,
//!   time_signature below 3 replaced by 4
//! - drop: any descriptor outside its domain (see [`within_bounds`])
//! - dedup: first row per `song_id` wins
//!
//! **Rescaling** maps every descriptor into [0, 1] and rounds to 4 decimals.
//! Rescaling never drops rows.
//!
//! [`within_bounds`]: AudioFeatureNormalizer::within_bounds

use std::collections::HashSet;

use tracing::{debug, info};

use crate::models::{AudioFeatures, RawTrackFeatures};

pub const TEMPO_MIN: f64 = 45.0;
pub const TEMPO_MAX: f64 = 220.0;
pub const DURATION_MIN_MS: f64 = 20_000.0;
pub const DURATION_MAX_MS: f64 = 600_000.0;
pub const KEY_MAX: f64 = 11.0;
pub const LOUDNESS_FLOOR_DB: f64 = -35.0;
pub const SPEECHINESS_MAX: f64 = 0.66;
pub const TIME_SIGNATURE_MIN: f64 = 3.0;
pub const TIME_SIGNATURE_MAX: f64 = 7.0;
/// Replacement for implausible (< 3) time signatures
pub const TIME_SIGNATURE_DEFAULT: f64 = 4.0;

/// Decimal digits kept after rescaling
pub const RESCALE_DECIMALS: i32 = 4;

/// Row counts of one cleaning pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CleaningStats {
    pub input: usize,
    pub dropped_non_finite: usize,
    pub dropped_out_of_bounds: usize,
    pub dropped_duplicates: usize,
    pub output: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AudioFeatureNormalizer;

impl AudioFeatureNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Row-independent clamping and imputation
    pub fn clamp(&self, f: &AudioFeatures) -> AudioFeatures {
        let mut out = *f;
        out.tempo = f.tempo.clamp(TEMPO_MIN, TEMPO_MAX);
        out.duration_ms = f.duration_ms.min(DURATION_MAX_MS);
        if f.time_signature < TIME_SIGNATURE_MIN {
            out.time_signature = TIME_SIGNATURE_DEFAULT;
        }
        out
    }

    /// Whether a clamped row lies inside every descriptor's domain
    pub fn within_bounds(&self, f: &AudioFeatures) -> bool {
        let unit = |v: f64| (0.0..=1.0).contains(&v);

        f.danceability > 0.0
            && f.danceability < 1.0
            && unit(f.energy)
            && (0.0..=KEY_MAX).contains(&f.key)
            && f.loudness >= LOUDNESS_FLOOR_DB
            && f.loudness < 0.0
            && (f.mode == 0.0 || f.mode == 1.0)
            && f.speechiness > 0.0
            && f.speechiness < SPEECHINESS_MAX
            && unit(f.acousticness)
            && unit(f.instrumentalness)
            && unit(f.liveness)
            && unit(f.valence)
            && f.duration_ms >= DURATION_MIN_MS
            && (TIME_SIGNATURE_MIN..=TIME_SIGNATURE_MAX).contains(&f.time_signature)
    }

    /// Clamp, drop out-of-domain rows, then deduplicate by `song_id`
    pub fn clean(&self, batch: Vec<RawTrackFeatures>) -> (Vec<RawTrackFeatures>, CleaningStats) {
        let mut stats = CleaningStats {
            input: batch.len(),
            ..Default::default()
        };

        let mut in_bounds = Vec::with_capacity(batch.len());
        for raw in batch {
            if !raw.features.is_finite() {
                debug!(song_id = %raw.song_id, "Dropping track with non-finite descriptor");
                stats.dropped_non_finite += 1;
                continue;
            }
            let features = self.clamp(&raw.features);
            if !self.within_bounds(&features) {
                debug!(song_id = %raw.song_id, "Dropping out-of-bounds track");
                stats.dropped_out_of_bounds += 1;
                continue;
            }
            in_bounds.push(RawTrackFeatures {
                song_id: raw.song_id,
                features,
            });
        }

        let mut seen = HashSet::new();
        let mut cleaned = Vec::with_capacity(in_bounds.len());
        for track in in_bounds {
            if seen.insert(track.song_id.clone()) {
                cleaned.push(track);
            } else {
                stats.dropped_duplicates += 1;
            }
        }
        stats.output = cleaned.len();

        info!(
            input = stats.input,
            non_finite = stats.dropped_non_finite,
            out_of_bounds = stats.dropped_out_of_bounds,
            duplicates = stats.dropped_duplicates,
            output = stats.output,
            "Cleaned track features"
        );
        (cleaned, stats)
    }

    /// Map a cleaned row into [0, 1] per descriptor
    pub fn rescale(&self, f: &AudioFeatures) -> AudioFeatures {
        AudioFeatures {
            key: f.key / KEY_MAX,
            loudness: rescale_loudness(f.loudness),
            speechiness: f.speechiness / SPEECHINESS_MAX,
            tempo: (f.tempo - TEMPO_MIN) / (TEMPO_MAX - TEMPO_MIN),
            duration_ms: (f.duration_ms - DURATION_MIN_MS) / (DURATION_MAX_MS - DURATION_MIN_MS),
            time_signature: if f.time_signature == 4.0 { 1.0 } else { 0.0 },
            ..*f
        }
        .rounded(RESCALE_DECIMALS)
    }
}

/// Decibels to linear amplitude, then linear between the -35 dB floor and 0 dB
fn rescale_loudness(db: f64) -> f64 {
    let floor = 10f64.powf(LOUDNESS_FLOOR_DB / 20.0);
    let linear = 10f64.powf(db / 20.0);
    (linear - floor) / (1.0 - floor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn typical() -> AudioFeatures {
        AudioFeatures {
            danceability: 0.55,
            energy: 0.7,
            key: 5.0,
            loudness: -8.0,
            mode: 1.0,
            speechiness: 0.05,
            acousticness: 0.2,
            instrumentalness: 0.0,
            liveness: 0.1,
            valence: 0.4,
            tempo: 120.0,
            duration_ms: 240_000.0,
            time_signature: 4.0,
        }
    }

    fn raw(id: &str, features: AudioFeatures) -> RawTrackFeatures {
        RawTrackFeatures {
            song_id: id.into(),
            features,
        }
    }

    #[test]
    fn clamps_tempo_duration_and_time_signature() {
        let n = AudioFeatureNormalizer::new();
        let f = AudioFeatures {
            tempo: 250.0,
            duration_ms: 900_000.0,
            time_signature: 1.0,
            ..typical()
        };
        let clamped = n.clamp(&f);
        assert_eq!(clamped.tempo, TEMPO_MAX);
        assert_eq!(clamped.duration_ms, DURATION_MAX_MS);
        assert_eq!(clamped.time_signature, 4.0);

        let slow = n.clamp(&AudioFeatures { tempo: 10.0, ..typical() });
        assert_eq!(slow.tempo, TEMPO_MIN);
    }

    #[test]
    fn drops_outliers_then_duplicates() {
        let n = AudioFeatureNormalizer::new();
        let batch = vec![
            raw("a", typical()),
            raw("short", AudioFeatures { duration_ms: 15_000.0, ..typical() }),
            raw("talky", AudioFeatures { speechiness: 0.9, ..typical() }),
            raw("flat", AudioFeatures { danceability: 0.0, ..typical() }),
            raw("odd-mode", AudioFeatures { mode: 0.5, ..typical() }),
            raw("nan", AudioFeatures { energy: f64::NAN, ..typical() }),
            raw("a", AudioFeatures { energy: 0.1, ..typical() }),
            raw("b", typical()),
        ];

        let (cleaned, stats) = n.clean(batch);

        let ids: Vec<&str> = cleaned.iter().map(|t| t.song_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(cleaned[0].features.energy, 0.7, "first occurrence wins");
        assert_eq!(stats.input, 8);
        assert_eq!(stats.dropped_non_finite, 1);
        assert_eq!(stats.dropped_out_of_bounds, 4);
        assert_eq!(stats.dropped_duplicates, 1);
        assert_eq!(stats.output, 2);
    }

    #[test]
    fn outlier_duplicate_does_not_shadow_valid_row() {
        // Outlier removal runs first, so the later valid row survives
        let n = AudioFeatureNormalizer::new();
        let batch = vec![
            raw("x", AudioFeatures { speechiness: 0.95, ..typical() }),
            raw("x", typical()),
        ];
        let (cleaned, _) = n.clean(batch);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].features.speechiness, 0.05);
    }

    #[test]
    fn rescales_known_values() {
        let n = AudioFeatureNormalizer::new();
        let r = n.rescale(&AudioFeatures {
            key: 11.0,
            loudness: 0.0,
            speechiness: 0.33,
            tempo: 132.5,
            duration_ms: 310_000.0,
            time_signature: 3.0,
            ..typical()
        });
        assert_eq!(r.key, 1.0);
        assert_eq!(r.loudness, 1.0);
        assert_eq!(r.speechiness, 0.5);
        assert_eq!(r.tempo, 0.5);
        assert_eq!(r.duration_ms, 0.5);
        assert_eq!(r.time_signature, 0.0);
        assert_eq!(r.danceability, 0.55);

        let quiet = n.rescale(&AudioFeatures { loudness: -35.0, ..typical() });
        assert_eq!(quiet.loudness, 0.0);
        assert_eq!(quiet.time_signature, 1.0);
    }

    fn in_domain() -> impl Strategy<Value = AudioFeatures> {
        (
            (0.001f64..0.999, 0.0f64..=1.0, 0u8..=11, -35.0f64..-0.001),
            (0u8..=1, 0.001f64..0.659, 0.0f64..=1.0, 0.0f64..=1.0),
            (0.0f64..=1.0, 0.0f64..=1.0, 0.0f64..400.0),
            (20_000.0f64..=1_000_000.0, 0u8..=7),
        )
            .prop_map(|(a, b, c, d)| AudioFeatures {
                danceability: a.0,
                energy: a.1,
                key: f64::from(a.2),
                loudness: a.3,
                mode: f64::from(b.0),
                speechiness: b.1,
                acousticness: b.2,
                instrumentalness: b.3,
                liveness: c.0,
                valence: c.1,
                tempo: c.2,
                duration_ms: d.0,
                time_signature: f64::from(d.1),
            })
    }

    proptest! {
        #[test]
        fn cleaned_rows_rescale_into_unit_range(features in in_domain()) {
            let n = AudioFeatureNormalizer::new();
            let (cleaned, _) = n.clean(vec![raw("t", features)]);
            prop_assert_eq!(cleaned.len(), 1);

            let r = n.rescale(&cleaned[0].features);
            for v in r.to_array() {
                prop_assert!((0.0..=1.0).contains(&v), "{} out of range", v);
            }
            prop_assert!(r.time_signature == 0.0 || r.time_signature == 1.0);
        }
    }
}
