//! Record types exchanged between pipeline stages
//!
//! Each stage owns its table until it is written; the types here are the
//! in-memory form of those tables (domain records) plus the flat row structs
//! used to persist them as CSV.

pub mod album;
pub mod dataset;
pub mod search;
pub mod track;

pub use album::{parse_release_date, split_genres, AlbumRecord, RymProcessedRow, RymRawRow};
pub use dataset::{AlbumFeatureRow, FeatureDataset, RymFeatureRow, RymFeatureTable};
pub use search::{MatchResult, ProcessedSearchRow, SearchCandidate, SearchMatchRow};
pub use track::{
    round_to, AudioFeatures, ProcessedTrackRow, RawTrackFeatures, SelectedTrackRow,
    TrackFeatureVector, TrackFeaturesRow, TrackIdentity, FEATURE_COUNT,
};
