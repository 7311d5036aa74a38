//! Feature tables feeding the final dataset

use mrai_common::config::AssemblyLayout;

/// Chart-side features of one album
#[derive(Debug, Clone, PartialEq)]
pub struct RymFeatureRow {
    pub album_id: String,
    /// Values aligned with [`RymFeatureTable::columns`]
    pub features: Vec<f64>,
    /// Discretized rating class 0..=5
    pub target: u8,
}

/// Chart-side feature table: decade class followed by genre columns
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RymFeatureTable {
    pub columns: Vec<String>,
    pub rows: Vec<RymFeatureRow>,
}

/// Final unit of the dataset; immutable once assembled
#[derive(Debug, Clone, PartialEq)]
pub struct AlbumFeatureRow {
    pub album_id: String,
    /// Spotify-side block followed by the chart-side block
    pub features: Vec<f64>,
    pub target: u8,
}

/// Assembled dataset plus the positional names of its feature vector
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureDataset {
    pub layout: AssemblyLayout,
    pub feature_names: Vec<String>,
    pub rows: Vec<AlbumFeatureRow>,
}

impl FeatureDataset {
    /// Width of every feature vector in this dataset
    pub fn width(&self) -> usize {
        self.feature_names.len()
    }
}
