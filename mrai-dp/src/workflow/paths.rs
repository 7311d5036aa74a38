//! On-disk layout of the data directory
//!
//! ```text
//! <data_dir>/
//!   raw/rym/rym_charts.csv
//!   raw/spotify/search_cache.json
//!   raw/spotify/search_album_id.csv
//!   raw/spotify/tracks_feature.csv
//!   raw/spotify/track_ids.csv
//!   processed/rym/rym_charts.csv
//!   processed/spotify/search_album_id.csv
//!   processed/spotify/tracks_feature.csv
//!   feature/rym.csv
//!   feature/spotify.csv
//!   final/{flatten,agg_flatten,single}/
//! ```

use std::path::{Path, PathBuf};

use mrai_common::config::AssemblyLayout;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    root: PathBuf,
}

impl DataPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a configured path: absolute paths as-is, others under the root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn raw(&self, source: &str, file: &str) -> PathBuf {
        self.root.join("raw").join(source).join(file)
    }

    fn processed(&self, source: &str, file: &str) -> PathBuf {
        self.root.join("processed").join(source).join(file)
    }

    pub fn raw_rym(&self) -> PathBuf {
        self.raw("rym", "rym_charts.csv")
    }

    pub fn search_cache(&self) -> PathBuf {
        self.raw("spotify", "search_cache.json")
    }

    pub fn raw_search(&self) -> PathBuf {
        self.raw("spotify", "search_album_id.csv")
    }

    pub fn raw_track_features(&self) -> PathBuf {
        self.raw("spotify", "tracks_feature.csv")
    }

    pub fn raw_track_ids(&self) -> PathBuf {
        self.raw("spotify", "track_ids.csv")
    }

    pub fn processed_rym(&self) -> PathBuf {
        self.processed("rym", "rym_charts.csv")
    }

    pub fn processed_search(&self) -> PathBuf {
        self.processed("spotify", "search_album_id.csv")
    }

    pub fn processed_tracks(&self) -> PathBuf {
        self.processed("spotify", "tracks_feature.csv")
    }

    pub fn rym_features(&self) -> PathBuf {
        self.root.join("feature").join("rym.csv")
    }

    pub fn spotify_features(&self) -> PathBuf {
        self.root.join("feature").join("spotify.csv")
    }

    pub fn final_dir(&self, layout: AssemblyLayout) -> PathBuf {
        self.root.join("final").join(layout.dir_name())
    }
}
