//! Final per-album rows
//!
//! Inner join of the chart-side feature table with the reshaped catalog
//! tracks on `album_id`. The catalog block comes first, followed by the
//! chart block, in every layout:
//!
//! | layout | catalog block | names |
//! |---|---|---|
//! | `flatten` | all tracks' descriptors, track by track | `{feature}{track}` |
//! | `aggregate` | mean, min, max, std per descriptor | `{feature}_{stat}` |
//! | `single` | lowest-numbered track | `{feature}0` |

use std::collections::BTreeMap;

use tracing::{debug, info};

use mrai_common::columns::SPOTIFY_FEATURES;
use mrai_common::config::AssemblyLayout;
use mrai_common::{Error, Result};

use crate::models::{
    round_to, AlbumFeatureRow, FeatureDataset, RymFeatureTable, TrackFeatureVector, FEATURE_COUNT,
};

/// Aggregate statistics, in output order
pub const AGGREGATE_STATS: [&str; 4] = ["mean", "min", "max", "std"];

const AGGREGATE_DECIMALS: i32 = 4;

#[derive(Debug, Clone, Copy)]
pub struct DatasetAssembler {
    track_count: usize,
}

impl DatasetAssembler {
    pub fn new(track_count: usize) -> Self {
        Self { track_count }
    }

    /// Positional names of the assembled feature vector
    pub fn feature_names(&self, layout: AssemblyLayout, rym_columns: &[String]) -> Vec<String> {
        let mut names: Vec<String> = match layout {
            AssemblyLayout::Flatten => (0..self.track_count)
                .flat_map(|i| SPOTIFY_FEATURES.iter().map(move |f| format!("{}{}", f, i)))
                .collect(),
            AssemblyLayout::Aggregate => AGGREGATE_STATS
                .iter()
                .flat_map(|stat| SPOTIFY_FEATURES.iter().map(move |f| format!("{}_{}", f, stat)))
                .collect(),
            AssemblyLayout::Single => SPOTIFY_FEATURES.iter().map(|f| format!("{}0", f)).collect(),
        };
        names.extend(rym_columns.iter().cloned());
        names
    }

    pub fn assemble(
        &self,
        layout: AssemblyLayout,
        rym: &RymFeatureTable,
        tracks: &[TrackFeatureVector],
    ) -> Result<FeatureDataset> {
        let mut by_album: BTreeMap<&str, Vec<&TrackFeatureVector>> = BTreeMap::new();
        for track in tracks {
            by_album.entry(track.album_id.as_str()).or_default().push(track);
        }
        for album_tracks in by_album.values_mut() {
            album_tracks.sort_by_key(|t| t.track_number);
        }

        let feature_names = self.feature_names(layout, &rym.columns);
        let mut rows = Vec::with_capacity(rym.rows.len());
        for rym_row in &rym.rows {
            if rym_row.features.len() != rym.columns.len() {
                return Err(Error::InvalidInput(format!(
                    "album {}: {} chart features for {} columns",
                    rym_row.album_id,
                    rym_row.features.len(),
                    rym.columns.len()
                )));
            }
            let Some(album_tracks) = by_album.get(rym_row.album_id.as_str()) else {
                debug!(album_id = %rym_row.album_id, "No catalog tracks for album");
                continue;
            };

            let mut features = self.catalog_block(layout, &rym_row.album_id, album_tracks)?;
            features.extend_from_slice(&rym_row.features);
            rows.push(AlbumFeatureRow {
                album_id: rym_row.album_id.clone(),
                features,
                target: rym_row.target,
            });
        }

        info!(
            layout = layout.dir_name(),
            chart_albums = rym.rows.len(),
            catalog_albums = by_album.len(),
            rows = rows.len(),
            width = feature_names.len(),
            "Assembled dataset"
        );
        Ok(FeatureDataset {
            layout,
            feature_names,
            rows,
        })
    }

    fn catalog_block(
        &self,
        layout: AssemblyLayout,
        album_id: &str,
        tracks: &[&TrackFeatureVector],
    ) -> Result<Vec<f64>> {
        match layout {
            AssemblyLayout::Flatten => {
                if tracks.len() != self.track_count {
                    return Err(Error::InvalidInput(format!(
                        "album {}: expected {} tracks, found {}",
                        album_id,
                        self.track_count,
                        tracks.len()
                    )));
                }
                Ok(tracks.iter().flat_map(|t| t.features.to_array()).collect())
            }
            AssemblyLayout::Aggregate => Ok(aggregate(tracks)),
            AssemblyLayout::Single => Ok(tracks
                .first()
                .map(|t| t.features.to_array().to_vec())
                .unwrap_or_default()),
        }
    }
}

/// Column-wise mean, min, max and sample std, stat by stat
fn aggregate(tracks: &[&TrackFeatureVector]) -> Vec<f64> {
    let rows: Vec<[f64; FEATURE_COUNT]> = tracks.iter().map(|t| t.features.to_array()).collect();
    let n = rows.len() as f64;

    let mut mean = [0.0; FEATURE_COUNT];
    let mut min = [f64::INFINITY; FEATURE_COUNT];
    let mut max = [f64::NEG_INFINITY; FEATURE_COUNT];
    for row in &rows {
        for (col, v) in row.iter().enumerate() {
            mean[col] += v / n;
            min[col] = min[col].min(*v);
            max[col] = max[col].max(*v);
        }
    }

    let mut std = [0.0; FEATURE_COUNT];
    if rows.len() > 1 {
        for (col, s) in std.iter_mut().enumerate() {
            let sum_sq: f64 = rows.iter().map(|row| (row[col] - mean[col]).powi(2)).sum();
            *s = (sum_sq / (n - 1.0)).sqrt();
        }
    }

    [mean, min, max, std]
        .iter()
        .flat_map(|stat| stat.iter().map(|v| round_to(*v, AGGREGATE_DECIMALS)))
        .collect()
}
